use pocketfin::core::Category;
use pocketfin::service::users::NewUser;
use pocketfin::service::{Service, ServiceError, Session};
use pocketfin::store::memory::MemoryStore;

fn setup() -> (Service<MemoryStore>, Session) {
    let service = Service::new(MemoryStore::new());
    let session = Session::authenticated("u1");
    service
        .create_user(
            &session,
            NewUser {
                name: "Ana".to_string(),
                email: "ana@example.com".to_string(),
                phone: "5551234".to_string(),
            },
        )
        .unwrap();
    (service, session)
}

fn category(name: &str) -> Category {
    Category {
        name: name.to_string(),
        kind: "expense".to_string(),
    }
}

#[test]
fn create_and_list_categories() {
    let (service, session) = setup();
    service.create_category(&session, category("Food")).unwrap();
    service.create_category(&session, category("Rent")).unwrap();

    let all = service.get_all_categories(&session).unwrap();
    assert_eq!(all.categories.len(), 2);
    assert_eq!(all.categories[0].name, "Food");
}

#[test]
fn duplicate_names_differ_only_by_case() {
    let (service, session) = setup();
    service.create_category(&session, category("Food")).unwrap();

    let err = service.create_category(&session, category("food")).unwrap_err();
    assert!(matches!(err, ServiceError::AlreadyExists(_)));
    assert_eq!(err.kind(), "already-exists");

    let all = service.get_all_categories(&session).unwrap();
    assert_eq!(all.categories.len(), 1);
}

#[test]
fn create_category_requires_name_and_kind() {
    let (service, session) = setup();
    let err = service.create_category(&session, category(" ")).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));
}

#[test]
fn delete_category_matches_exact_name() {
    let (service, session) = setup();
    service.create_category(&session, category("Food")).unwrap();

    let err = service.delete_category(&session, "FOOD").unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    service.delete_category(&session, "Food").unwrap();
    let all = service.get_all_categories(&session).unwrap();
    assert!(all.categories.is_empty());
}
