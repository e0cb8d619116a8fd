//! Domain model for the per-user finance and task document.

pub mod balance;
pub mod recurrence;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use balance::{Direction, TransactionKind, paid_delta};
pub use recurrence::{RecurrenceError, expand_fixed_expense, expand_fixed_income};

/// Root aggregate, persisted as one document per identity.
///
/// Created on signup with empty collections and deleted wholesale; embedded
/// entities have no life outside this document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl User {
    /// Creates a fresh user record with empty collections.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
            accounts: Vec::new(),
            categories: Vec::new(),
            tasks: Vec::new(),
        }
    }
}

/// A bank account embedded in a user document.
///
/// `balance` caches the net of all transactions marked paid (expenses
/// subtracted, incomes added); the service layer maintains it incrementally
/// instead of recomputing it from the sequences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub bank: String,
    pub balance: f64,
    #[serde(default)]
    pub expenses: Vec<Transaction>,
    #[serde(default)]
    pub incomes: Vec<Transaction>,
}

impl Account {
    /// The transaction sequence for the given side of the account.
    pub fn transactions(&self, kind: TransactionKind) -> &Vec<Transaction> {
        match kind {
            TransactionKind::Expense => &self.expenses,
            TransactionKind::Income => &self.incomes,
        }
    }

    pub fn transactions_mut(&mut self, kind: TransactionKind) -> &mut Vec<Transaction> {
        match kind {
            TransactionKind::Expense => &mut self.expenses,
            TransactionKind::Income => &mut self.incomes,
        }
    }
}

/// A single expense or income entry.
///
/// One struct serves both sequences; which side it sits on is carried by
/// [`TransactionKind`] at the operation layer. A transaction with
/// `fixed = true` is a recurring template that the service expands into dated
/// instances on creation; `start_date` is required for those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub name: String,
    pub category: String,
    pub value: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Whether this transaction has already been applied to the account
    /// balance.
    #[serde(default)]
    pub paid: bool,
}

/// A user-defined transaction category. Names are unique per user,
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub kind: String,
}

/// A to-do item owned by the user document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    /// 1 (low), 2 (medium) or 3 (high).
    pub priority: u8,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
}

/// A subtask nested under a [`Task`]. Titles are not required to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubTask {
    pub title: String,
    pub description: String,
    pub priority: u8,
    #[serde(default)]
    pub done: bool,
}
