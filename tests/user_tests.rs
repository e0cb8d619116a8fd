use pocketfin::service::users::{NewUser, UserPatch};
use pocketfin::service::{Service, ServiceError, Session};
use pocketfin::store::memory::MemoryStore;

fn profile() -> NewUser {
    NewUser {
        name: "Ana".to_string(),
        email: "ana@example.com".to_string(),
        phone: "5551234".to_string(),
    }
}

#[test]
fn create_and_get_user() {
    let service = Service::new(MemoryStore::new());
    let session = Session::authenticated("u1");
    let created = service.create_user(&session, profile()).unwrap();
    assert_eq!(created.user.id, "u1");
    assert!(created.user.accounts.is_empty());
    assert!(created.user.tasks.is_empty());

    let found = service.get_user(&session).unwrap();
    assert_eq!(found.user, created.user);
}

#[test]
fn anonymous_sessions_are_rejected() {
    let service = Service::new(MemoryStore::new());
    let err = service.get_user(&Session::Anonymous).unwrap_err();
    assert_eq!(err, ServiceError::Unauthenticated);
    assert_eq!(err.kind(), "unauthenticated");
}

#[test]
fn get_user_without_record() {
    let service = Service::new(MemoryStore::new());
    let session = Session::authenticated("ghost");
    let err = service.get_user(&session).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn update_user_merges_partial_fields() {
    let service = Service::new(MemoryStore::new());
    let session = Session::authenticated("u1");
    service.create_user(&session, profile()).unwrap();

    let patch = UserPatch {
        email: Some("new@example.com".to_string()),
        ..UserPatch::default()
    };
    let updated = service.update_user(&session, patch).unwrap();
    assert_eq!(updated.user.email, "new@example.com");
    assert_eq!(updated.user.name, "Ana");

    let found = service.get_user(&session).unwrap();
    assert_eq!(found.user.email, "new@example.com");
    assert_eq!(found.user.phone, "5551234");
}

#[test]
fn delete_user_cascades() {
    let service = Service::new(MemoryStore::new());
    let session = Session::authenticated("u1");
    service.create_user(&session, profile()).unwrap();
    let deleted = service.delete_user(&session).unwrap();
    assert_eq!(deleted.uid, "u1");

    let err = service.get_user(&session).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}
