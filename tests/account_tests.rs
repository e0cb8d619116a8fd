use pocketfin::service::accounts::{AccountPatch, NewAccount};
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

fn checking(balance: f64) -> NewAccount {
    NewAccount {
        name: "Checking".to_string(),
        kind: "checking".to_string(),
        bank: "Acme Bank".to_string(),
        balance,
    }
}

#[test]
fn create_account_assigns_id_and_empty_sequences() {
    let (service, session) = setup();
    let created = service.create_account(&session, checking(1000.0)).unwrap();
    assert!(!created.account.id.is_empty());
    assert_eq!(created.account.balance, 1000.0);
    assert!(created.account.expenses.is_empty());
    assert!(created.account.incomes.is_empty());

    let found = service.get_account(&session, &created.account.id).unwrap();
    assert_eq!(found.account, created.account);
}

#[test]
fn create_account_requires_fields() {
    let (service, session) = setup();
    let mut account = checking(0.0);
    account.bank = "  ".to_string();
    let err = service.create_account(&session, account).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidArgument(_)));
}

#[test]
fn update_account_applies_only_supplied_fields() {
    let (service, session) = setup();
    let id = service.create_account(&session, checking(1000.0)).unwrap().account.id;

    let patch = AccountPatch {
        name: Some("Daily".to_string()),
        balance: Some(250.0),
        ..AccountPatch::default()
    };
    let updated = service.update_account(&session, &id, patch).unwrap();
    assert_eq!(updated.account.name, "Daily");
    assert_eq!(updated.account.balance, 250.0);
    assert_eq!(updated.account.bank, "Acme Bank");
}

#[test]
fn update_missing_account() {
    let (service, session) = setup();
    let err = service
        .update_account(&session, "nope", AccountPatch::default())
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn delete_account_removes_it() {
    let (service, session) = setup();
    let id = service.create_account(&session, checking(10.0)).unwrap().account.id;
    service.delete_account(&session, &id).unwrap();

    let err = service.get_account(&session, &id).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
    let err = service.delete_account(&session, &id).unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[test]
fn get_all_accounts_lists_every_account() {
    let (service, session) = setup();
    service.create_account(&session, checking(1.0)).unwrap();
    let mut savings = checking(2.0);
    savings.name = "Savings".to_string();
    service.create_account(&session, savings).unwrap();

    let all = service.get_all_accounts(&session).unwrap();
    assert_eq!(all.accounts.len(), 2);
}
