//! Expense and income endpoints.
//!
//! Both sides share one engine parameterized by [`TransactionKind`]; the
//! directions applied to the cached balance are exact mirrors. Every mutating
//! endpoint exists twice: a public operation taking a [`Session`] and an
//! `_as` variant taking the caller identity explicitly, used when operations
//! compose (a cross-account move runs a delete leg and a create leg under the
//! identity the outer call already verified).

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{OneOrMany, Service, ServiceError, Session};
use crate::core::{
    Transaction, TransactionKind, expand_fixed_expense, expand_fixed_income, paid_delta,
};
use crate::store::DocumentStore;

/// Transaction payload for creation; the id is assigned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTransaction {
    pub name: String,
    pub category: String,
    pub value: f64,
    pub date: NaiveDate,
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub paid: bool,
}

impl NewTransaction {
    fn into_transaction(self, id: String) -> Transaction {
        Transaction {
            id,
            name: self.name,
            category: self.category,
            value: self.value,
            date: self.date,
            fixed: self.fixed,
            start_date: self.start_date,
            paid: self.paid,
        }
    }
}

impl From<&Transaction> for NewTransaction {
    fn from(tx: &Transaction) -> Self {
        Self {
            name: tx.name.clone(),
            category: tx.category.clone(),
            value: tx.value,
            date: tx.date,
            fixed: tx.fixed,
            start_date: tx.start_date,
            paid: tx.paid,
        }
    }
}

/// Deletion selector: a single id, a batch of ids, or both (merged).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeleteTransactionsRequest {
    pub account_id: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub ids: Option<Vec<String>>,
}

impl DeleteTransactionsRequest {
    fn selection(&self) -> Result<Vec<String>, ServiceError> {
        match (&self.ids, &self.id) {
            (Some(ids), _) if !ids.is_empty() => Ok(ids.clone()),
            (_, Some(id)) if !id.trim().is_empty() => Ok(vec![id.clone()]),
            _ => Err(ServiceError::InvalidArgument(
                "a transaction id or a non-empty id list is required".to_string(),
            )),
        }
    }
}

/// Update request. When `old_account_id` is present and differs from
/// `new_account_id` the transaction is moved: deleted from the old account
/// and recreated (with a fresh id) in the new one.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTransactionRequest {
    #[serde(default)]
    pub old_account_id: Option<String>,
    pub new_account_id: String,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionsCreated {
    pub message: String,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionsDeleted {
    pub message: String,
    pub removed_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionUpdated {
    pub message: String,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionFound {
    pub account_id: String,
    pub transaction: Transaction,
}

/// One account's full transaction sequence, as returned by the get-all
/// endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AccountTransactions {
    pub account_id: String,
    pub account_name: String,
    pub transactions: Vec<Transaction>,
}

impl<S: DocumentStore> Service<S> {
    pub fn create_expense(
        &self,
        session: &Session,
        account_id: &str,
        expenses: OneOrMany<NewTransaction>,
    ) -> Result<TransactionsCreated, ServiceError> {
        let uid = session.uid()?;
        self.create_expense_as(uid, account_id, expenses.into_vec())
    }

    pub fn create_expense_as(
        &self,
        uid: &str,
        account_id: &str,
        expenses: Vec<NewTransaction>,
    ) -> Result<TransactionsCreated, ServiceError> {
        self.create_transactions(uid, account_id, expenses, TransactionKind::Expense)
    }

    pub fn create_income(
        &self,
        session: &Session,
        account_id: &str,
        incomes: OneOrMany<NewTransaction>,
    ) -> Result<TransactionsCreated, ServiceError> {
        let uid = session.uid()?;
        self.create_income_as(uid, account_id, incomes.into_vec())
    }

    pub fn create_income_as(
        &self,
        uid: &str,
        account_id: &str,
        incomes: Vec<NewTransaction>,
    ) -> Result<TransactionsCreated, ServiceError> {
        self.create_transactions(uid, account_id, incomes, TransactionKind::Income)
    }

    pub fn delete_expense(
        &self,
        session: &Session,
        request: &DeleteTransactionsRequest,
    ) -> Result<TransactionsDeleted, ServiceError> {
        let uid = session.uid()?;
        let ids = request.selection()?;
        self.delete_expense_as(uid, &request.account_id, &ids)
    }

    pub fn delete_expense_as(
        &self,
        uid: &str,
        account_id: &str,
        ids: &[String],
    ) -> Result<TransactionsDeleted, ServiceError> {
        self.delete_transactions(uid, account_id, ids, TransactionKind::Expense)
    }

    pub fn delete_income(
        &self,
        session: &Session,
        request: &DeleteTransactionsRequest,
    ) -> Result<TransactionsDeleted, ServiceError> {
        let uid = session.uid()?;
        let ids = request.selection()?;
        self.delete_income_as(uid, &request.account_id, &ids)
    }

    pub fn delete_income_as(
        &self,
        uid: &str,
        account_id: &str,
        ids: &[String],
    ) -> Result<TransactionsDeleted, ServiceError> {
        self.delete_transactions(uid, account_id, ids, TransactionKind::Income)
    }

    pub fn update_expense(
        &self,
        session: &Session,
        request: UpdateTransactionRequest,
    ) -> Result<TransactionUpdated, ServiceError> {
        let uid = session.uid()?;
        self.update_transaction(uid, request, TransactionKind::Expense)
    }

    pub fn update_income(
        &self,
        session: &Session,
        request: UpdateTransactionRequest,
    ) -> Result<TransactionUpdated, ServiceError> {
        let uid = session.uid()?;
        self.update_transaction(uid, request, TransactionKind::Income)
    }

    /// Scans every account for the expense with the given id.
    pub fn get_expense(
        &self,
        session: &Session,
        expense_id: &str,
    ) -> Result<TransactionFound, ServiceError> {
        let uid = session.uid()?;
        self.find_transaction(uid, expense_id, TransactionKind::Expense)
    }

    pub fn get_income(
        &self,
        session: &Session,
        income_id: &str,
    ) -> Result<TransactionFound, ServiceError> {
        let uid = session.uid()?;
        self.find_transaction(uid, income_id, TransactionKind::Income)
    }

    pub fn get_all_expenses(
        &self,
        session: &Session,
    ) -> Result<Vec<AccountTransactions>, ServiceError> {
        let uid = session.uid()?;
        self.list_transactions(uid, TransactionKind::Expense)
    }

    pub fn get_all_incomes(
        &self,
        session: &Session,
    ) -> Result<Vec<AccountTransactions>, ServiceError> {
        let uid = session.uid()?;
        self.list_transactions(uid, TransactionKind::Income)
    }

    fn create_transactions(
        &self,
        uid: &str,
        account_id: &str,
        inputs: Vec<NewTransaction>,
        kind: TransactionKind,
    ) -> Result<TransactionsCreated, ServiceError> {
        if account_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "account id is required".to_string(),
            ));
        }
        if inputs.is_empty() {
            return Err(ServiceError::InvalidArgument(format!(
                "no {} payloads provided",
                kind.label()
            )));
        }
        for input in &inputs {
            validate_payload(input, kind)?;
        }

        let (mut user, revision) = self.load_user(uid)?;

        let mut created: Vec<Transaction> = Vec::new();
        for input in inputs {
            if input.fixed {
                let template = input.into_transaction(String::new());
                let expanded = match kind {
                    TransactionKind::Expense => {
                        expand_fixed_expense(&template, || self.allocate_id())
                    }
                    TransactionKind::Income => expand_fixed_income(
                        &template,
                        Utc::now().date_naive(),
                        || self.allocate_id(),
                    ),
                }
                .map_err(|e| ServiceError::InvalidArgument(e.to_string()))?;
                created.extend(expanded);
            } else {
                created.push(input.into_transaction(self.allocate_id()));
            }
        }

        // Account existence is checked only after expansion, so a broken
        // template fails as InvalidArgument even when the account id is also
        // wrong.
        let Some(account) = user.accounts.iter_mut().find(|a| a.id == account_id) else {
            return Err(ServiceError::NotFound(format!(
                "account {account_id} not found"
            )));
        };
        let paid_total: f64 = created.iter().filter(|t| t.paid).map(|t| t.value).sum();
        account.transactions_mut(kind).extend(created.iter().cloned());

        self.write_field(uid, "accounts", &user.accounts, revision)?;
        if paid_total > 0.0 {
            self.reconcile_balance(uid, account_id, paid_total, kind.on_create())?;
        }
        tracing::info!(
            uid,
            account_id,
            kind = kind.label(),
            count = created.len(),
            "transactions created"
        );
        Ok(TransactionsCreated {
            message: format!("{}s created", kind.label()),
            transactions: created,
        })
    }

    fn delete_transactions(
        &self,
        uid: &str,
        account_id: &str,
        ids: &[String],
        kind: TransactionKind,
    ) -> Result<TransactionsDeleted, ServiceError> {
        if account_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "account id is required".to_string(),
            ));
        }
        if ids.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "a transaction id or a non-empty id list is required".to_string(),
            ));
        }
        let (mut user, revision) = self.load_user(uid)?;
        let Some(account) = user.accounts.iter_mut().find(|a| a.id == account_id) else {
            return Err(ServiceError::NotFound(format!(
                "account {account_id} not found"
            )));
        };

        let mut removed_ids = Vec::new();
        let mut reversal = 0.0;
        account.transactions_mut(kind).retain(|tx| {
            if ids.contains(&tx.id) {
                if tx.paid {
                    reversal += tx.value;
                }
                removed_ids.push(tx.id.clone());
                false
            } else {
                true
            }
        });
        if removed_ids.is_empty() {
            return Err(ServiceError::NotFound(format!(
                "no matching {} found",
                kind.label()
            )));
        }

        self.write_field(uid, "accounts", &user.accounts, revision)?;
        if reversal > 0.0 {
            self.reconcile_balance(uid, account_id, reversal, kind.on_remove())?;
        }
        tracing::info!(
            uid,
            account_id,
            kind = kind.label(),
            count = removed_ids.len(),
            "transactions deleted"
        );
        Ok(TransactionsDeleted {
            message: format!("{}s deleted", kind.label()),
            removed_ids,
        })
    }

    fn update_transaction(
        &self,
        uid: &str,
        request: UpdateTransactionRequest,
        kind: TransactionKind,
    ) -> Result<TransactionUpdated, ServiceError> {
        if request.new_account_id.trim().is_empty() || request.transaction.id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "account id and transaction id are required".to_string(),
            ));
        }
        if !(request.transaction.value >= 0.0) {
            return Err(ServiceError::InvalidArgument(
                "transaction value must be non-negative".to_string(),
            ));
        }
        match &request.old_account_id {
            Some(old_account_id) if *old_account_id != request.new_account_id => {
                let old_account_id = old_account_id.clone();
                self.move_transaction(
                    uid,
                    &old_account_id,
                    &request.new_account_id,
                    request.transaction,
                    kind,
                )
            }
            _ => self.update_transaction_in_place(
                uid,
                &request.new_account_id,
                request.transaction,
                kind,
            ),
        }
    }

    fn update_transaction_in_place(
        &self,
        uid: &str,
        account_id: &str,
        incoming: Transaction,
        kind: TransactionKind,
    ) -> Result<TransactionUpdated, ServiceError> {
        let (mut user, revision) = self.load_user(uid)?;
        let Some(account) = user.accounts.iter_mut().find(|a| a.id == account_id) else {
            return Err(ServiceError::NotFound(format!(
                "account {account_id} not found"
            )));
        };
        let Some(existing) = account
            .transactions_mut(kind)
            .iter_mut()
            .find(|t| t.id == incoming.id)
        else {
            return Err(ServiceError::NotFound(format!(
                "{} {} not found in account {account_id}",
                kind.label(),
                incoming.id
            )));
        };

        let mut delta = 0.0;
        if existing.paid != incoming.paid || existing.value != incoming.value {
            delta = paid_delta(existing.paid, existing.value, incoming.paid, incoming.value);
        }
        let id = existing.id.clone();
        *existing = Transaction { id, ..incoming };
        let updated = existing.clone();

        self.write_field(uid, "accounts", &user.accounts, revision)?;
        if delta != 0.0 {
            self.reconcile_balance(uid, account_id, delta.abs(), kind.for_delta(delta))?;
        }
        Ok(TransactionUpdated {
            message: format!("{} updated", kind.label()),
            transactions: vec![updated],
        })
    }

    /// Moves a transaction between accounts as a delete leg followed by a
    /// create leg; the recreated transaction gets a fresh id.
    ///
    /// If the create leg fails after the delete leg committed, the exact
    /// deleted transaction is restored to the source account (including its
    /// balance contribution) and the create leg's error propagates unchanged.
    /// Only when that restoration also fails is the transaction reported as
    /// lost.
    fn move_transaction(
        &self,
        uid: &str,
        old_account_id: &str,
        new_account_id: &str,
        transaction: Transaction,
        kind: TransactionKind,
    ) -> Result<TransactionUpdated, ServiceError> {
        let (user, _) = self.load_user(uid)?;
        let stored = user
            .accounts
            .iter()
            .find(|a| a.id == old_account_id)
            .and_then(|a| {
                a.transactions(kind)
                    .iter()
                    .find(|t| t.id == transaction.id)
                    .cloned()
            });

        let ids = [transaction.id.clone()];
        self.delete_transactions(uid, old_account_id, &ids, kind)?;

        let payload = NewTransaction::from(&transaction);
        match self.create_transactions(uid, new_account_id, vec![payload], kind) {
            Ok(created) => Ok(TransactionUpdated {
                message: format!("{} moved to account {new_account_id}", kind.label()),
                transactions: created.transactions,
            }),
            Err(create_err) => {
                if let Some(original) = stored {
                    let original_id = original.id.clone();
                    match self.restore_transaction(uid, old_account_id, original, kind) {
                        Ok(()) => {
                            tracing::warn!(
                                uid,
                                old_account_id,
                                new_account_id,
                                transaction_id = %original_id,
                                "move create leg failed; transaction restored to source account"
                            );
                        }
                        Err(restore_err) => {
                            tracing::error!(
                                uid,
                                old_account_id,
                                transaction_id = %original_id,
                                "move create leg and rollback both failed; transaction lost"
                            );
                            return Err(ServiceError::Internal(format!(
                                "{} {original_id} was removed from account {old_account_id} but \
                                 could not be recreated ({create_err}) nor restored ({restore_err})",
                                kind.label()
                            )));
                        }
                    }
                }
                Err(create_err)
            }
        }
    }

    /// Puts an exact previously stored transaction back, keeping its id and
    /// reapplying its paid contribution to the balance.
    fn restore_transaction(
        &self,
        uid: &str,
        account_id: &str,
        transaction: Transaction,
        kind: TransactionKind,
    ) -> Result<(), ServiceError> {
        let (mut user, revision) = self.load_user(uid)?;
        let Some(account) = user.accounts.iter_mut().find(|a| a.id == account_id) else {
            return Err(ServiceError::NotFound(format!(
                "account {account_id} not found"
            )));
        };
        let paid_value = if transaction.paid {
            transaction.value
        } else {
            0.0
        };
        account.transactions_mut(kind).push(transaction);
        self.write_field(uid, "accounts", &user.accounts, revision)?;
        if paid_value > 0.0 {
            self.reconcile_balance(uid, account_id, paid_value, kind.on_create())?;
        }
        Ok(())
    }

    fn find_transaction(
        &self,
        uid: &str,
        transaction_id: &str,
        kind: TransactionKind,
    ) -> Result<TransactionFound, ServiceError> {
        if transaction_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "transaction id is required".to_string(),
            ));
        }
        let (user, _) = self.load_user(uid)?;
        for account in &user.accounts {
            if let Some(tx) = account
                .transactions(kind)
                .iter()
                .find(|t| t.id == transaction_id)
            {
                return Ok(TransactionFound {
                    account_id: account.id.clone(),
                    transaction: tx.clone(),
                });
            }
        }
        Err(ServiceError::NotFound(format!(
            "{} {transaction_id} not found",
            kind.label()
        )))
    }

    fn list_transactions(
        &self,
        uid: &str,
        kind: TransactionKind,
    ) -> Result<Vec<AccountTransactions>, ServiceError> {
        let (user, _) = self.load_user(uid)?;
        Ok(user
            .accounts
            .into_iter()
            .map(|account| {
                let transactions = match kind {
                    TransactionKind::Expense => account.expenses,
                    TransactionKind::Income => account.incomes,
                };
                AccountTransactions {
                    account_id: account.id,
                    account_name: account.name,
                    transactions,
                }
            })
            .collect())
    }
}

fn validate_payload(input: &NewTransaction, kind: TransactionKind) -> Result<(), ServiceError> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::InvalidArgument(format!(
            "{} name is required",
            kind.label()
        )));
    }
    if !(input.value >= 0.0) {
        return Err(ServiceError::InvalidArgument(format!(
            "{} value must be non-negative",
            kind.label()
        )));
    }
    Ok(())
}
