//! Account endpoints and the balance reconciler.

use serde::{Deserialize, Serialize};

use super::{Service, ServiceError, Session};
use crate::core::{Account, Direction};
use crate::store::DocumentStore;

/// Account fields supplied on creation; id and transaction sequences are
/// assigned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    pub kind: String,
    pub bank: String,
    pub balance: f64,
}

/// Partial account update; omitted fields keep their stored value. The
/// transaction sequences are never patchable through this type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub balance: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountResponse {
    pub message: String,
    pub account: Account,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountDeleted {
    pub message: String,
    pub account_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AccountsResponse {
    pub message: String,
    pub accounts: Vec<Account>,
}

impl<S: DocumentStore> Service<S> {
    pub fn create_account(
        &self,
        session: &Session,
        account: NewAccount,
    ) -> Result<AccountResponse, ServiceError> {
        let uid = session.uid()?;
        if account.name.trim().is_empty()
            || account.kind.trim().is_empty()
            || account.bank.trim().is_empty()
        {
            return Err(ServiceError::InvalidArgument(
                "account name, kind and bank are required".to_string(),
            ));
        }
        let (mut user, revision) = self.load_user(uid)?;
        let account = Account {
            id: self.allocate_id(),
            name: account.name,
            kind: account.kind,
            bank: account.bank,
            balance: account.balance,
            expenses: Vec::new(),
            incomes: Vec::new(),
        };
        user.accounts.push(account.clone());
        self.write_field(uid, "accounts", &user.accounts, revision)?;
        tracing::info!(uid, account_id = %account.id, "account created");
        Ok(AccountResponse {
            message: "account created".to_string(),
            account,
        })
    }

    pub fn update_account(
        &self,
        session: &Session,
        account_id: &str,
        patch: AccountPatch,
    ) -> Result<AccountResponse, ServiceError> {
        let uid = session.uid()?;
        if account_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "account id is required".to_string(),
            ));
        }
        let (mut user, revision) = self.load_user(uid)?;
        let Some(account) = user.accounts.iter_mut().find(|a| a.id == account_id) else {
            return Err(ServiceError::NotFound(format!(
                "account {account_id} not found"
            )));
        };
        if let Some(name) = patch.name {
            account.name = name;
        }
        if let Some(kind) = patch.kind {
            account.kind = kind;
        }
        if let Some(bank) = patch.bank {
            account.bank = bank;
        }
        if let Some(balance) = patch.balance {
            account.balance = balance;
        }
        let account = account.clone();
        self.write_field(uid, "accounts", &user.accounts, revision)?;
        Ok(AccountResponse {
            message: "account updated".to_string(),
            account,
        })
    }

    pub fn delete_account(
        &self,
        session: &Session,
        account_id: &str,
    ) -> Result<AccountDeleted, ServiceError> {
        let uid = session.uid()?;
        if account_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "account id is required".to_string(),
            ));
        }
        let (mut user, revision) = self.load_user(uid)?;
        let before = user.accounts.len();
        user.accounts.retain(|a| a.id != account_id);
        if user.accounts.len() == before {
            return Err(ServiceError::NotFound(format!(
                "account {account_id} not found"
            )));
        }
        self.write_field(uid, "accounts", &user.accounts, revision)?;
        tracing::info!(uid, account_id, "account deleted");
        Ok(AccountDeleted {
            message: "account deleted".to_string(),
            account_id: account_id.to_string(),
        })
    }

    pub fn get_account(
        &self,
        session: &Session,
        account_id: &str,
    ) -> Result<AccountResponse, ServiceError> {
        let uid = session.uid()?;
        if account_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "account id is required".to_string(),
            ));
        }
        let (user, _) = self.load_user(uid)?;
        let account = user
            .accounts
            .into_iter()
            .find(|a| a.id == account_id)
            .ok_or_else(|| ServiceError::NotFound(format!("account {account_id} not found")))?;
        Ok(AccountResponse {
            message: "account found".to_string(),
            account,
        })
    }

    pub fn get_all_accounts(&self, session: &Session) -> Result<AccountsResponse, ServiceError> {
        let uid = session.uid()?;
        let (user, _) = self.load_user(uid)?;
        Ok(AccountsResponse {
            message: "accounts found".to_string(),
            accounts: user.accounts,
        })
    }

    /// Applies an unsigned `amount` to one account's cached balance in the
    /// given direction.
    ///
    /// This is the second, independent write of the two-write pattern: the
    /// transaction sequences have already been rewritten when it runs, and a
    /// failure in between leaves the balance invariant violated until the
    /// caller retries. The account is re-resolved here, so a concurrent
    /// account deletion surfaces as `NotFound`.
    pub fn reconcile_balance(
        &self,
        uid: &str,
        account_id: &str,
        amount: f64,
        direction: Direction,
    ) -> Result<(), ServiceError> {
        let (mut user, revision) = self.load_user(uid)?;
        let Some(account) = user.accounts.iter_mut().find(|a| a.id == account_id) else {
            return Err(ServiceError::NotFound(format!(
                "account {account_id} not found"
            )));
        };
        account.balance = direction.apply(account.balance, amount);
        let balance = account.balance;
        self.write_field(uid, "accounts", &user.accounts, revision)?;
        tracing::debug!(uid, account_id, balance, "balance reconciled");
        Ok(())
    }
}
