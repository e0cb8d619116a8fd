use chrono::{Datelike, Months, NaiveDate, Utc};
use pocketfin::service::accounts::NewAccount;
use pocketfin::service::transactions::{DeleteTransactionsRequest, NewTransaction};
use pocketfin::service::users::NewUser;
use pocketfin::service::{OneOrMany, Service, ServiceError, Session};
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

fn open_account(service: &Service<MemoryStore>, session: &Session, balance: f64) -> String {
    service
        .create_account(
            session,
            NewAccount {
                name: "Checking".to_string(),
                kind: "checking".to_string(),
                bank: "Acme Bank".to_string(),
                balance,
            },
        )
        .unwrap()
        .account
        .id
}

fn income(name: &str, value: f64, paid: bool) -> NewTransaction {
    NewTransaction {
        name: name.to_string(),
        category: "Salary".to_string(),
        value,
        date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
        fixed: false,
        start_date: None,
        paid,
    }
}

fn balance_of(service: &Service<MemoryStore>, session: &Session, account_id: &str) -> f64 {
    service.get_account(session, account_id).unwrap().account.balance
}

#[test]
fn paid_income_adds_to_balance() {
    let (service, session) = setup();
    let account_id = open_account(&service, &session, 100.0);

    service
        .create_income(&session, &account_id, OneOrMany::One(income("Salary", 900.0, true)))
        .unwrap();
    assert_eq!(balance_of(&service, &session, &account_id), 1000.0);
}

#[test]
fn fixed_income_expands_from_start_through_current_month() {
    let (service, session) = setup();
    let account_id = open_account(&service, &session, 0.0);

    let today = Utc::now().date_naive();
    let start = today.checked_sub_months(Months::new(2)).unwrap();
    let template = NewTransaction {
        name: "Salary".to_string(),
        category: "Salary".to_string(),
        value: 500.0,
        date: start,
        fixed: true,
        start_date: Some(start),
        paid: true,
    };
    let created = service
        .create_income(&session, &account_id, OneOrMany::One(template))
        .unwrap();
    assert_eq!(created.transactions.len(), 3);

    // Every instance lands on the first of its month.
    for (offset, instance) in created.transactions.iter().enumerate() {
        assert_eq!(instance.date.day(), 1);
        let expected = start
            .with_day(1)
            .unwrap()
            .checked_add_months(Months::new(offset as u32))
            .unwrap();
        assert_eq!(instance.date, expected);
    }

    // Only the first instance keeps paid, so the balance moves once.
    assert!(created.transactions[0].paid);
    assert!(created.transactions[1..].iter().all(|t| !t.paid));
    assert_eq!(balance_of(&service, &session, &account_id), 500.0);
}

#[test]
fn fixed_income_starting_this_month_yields_one_instance() {
    let (service, session) = setup();
    let account_id = open_account(&service, &session, 0.0);

    let today = Utc::now().date_naive();
    let template = NewTransaction {
        name: "Salary".to_string(),
        category: "Salary".to_string(),
        value: 500.0,
        date: today,
        fixed: true,
        start_date: Some(today),
        paid: false,
    };
    let created = service
        .create_income(&session, &account_id, OneOrMany::One(template))
        .unwrap();
    assert_eq!(created.transactions.len(), 1);
    assert_eq!(created.transactions[0].date, today.with_day(1).unwrap());
}

#[test]
fn fixed_income_starting_in_the_future_yields_nothing() {
    let (service, session) = setup();
    let account_id = open_account(&service, &session, 0.0);

    let start = Utc::now()
        .date_naive()
        .checked_add_months(Months::new(1))
        .unwrap();
    let template = NewTransaction {
        name: "Salary".to_string(),
        category: "Salary".to_string(),
        value: 500.0,
        date: start,
        fixed: true,
        start_date: Some(start),
        paid: true,
    };
    let created = service
        .create_income(&session, &account_id, OneOrMany::One(template))
        .unwrap();
    assert!(created.transactions.is_empty());
    assert_eq!(balance_of(&service, &session, &account_id), 0.0);
}

#[test]
fn delete_income_reverses_paid_amount() {
    let (service, session) = setup();
    let account_id = open_account(&service, &session, 100.0);
    let created = service
        .create_income(&session, &account_id, OneOrMany::One(income("Salary", 900.0, true)))
        .unwrap();

    let request = DeleteTransactionsRequest {
        account_id: account_id.clone(),
        id: Some(created.transactions[0].id.clone()),
        ids: None,
    };
    service.delete_income(&session, &request).unwrap();
    assert_eq!(balance_of(&service, &session, &account_id), 100.0);
}

#[test]
fn incomes_and_expenses_are_separate_sequences() {
    let (service, session) = setup();
    let account_id = open_account(&service, &session, 0.0);
    let created = service
        .create_income(&session, &account_id, OneOrMany::One(income("Salary", 900.0, false)))
        .unwrap();

    // Looking the id up on the expense side finds nothing.
    let err = service
        .get_expense(&session, &created.transactions[0].id)
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));

    let found = service
        .get_income(&session, &created.transactions[0].id)
        .unwrap();
    assert_eq!(found.transaction.name, "Salary");

    let all = service.get_all_incomes(&session).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].transactions.len(), 1);
}
