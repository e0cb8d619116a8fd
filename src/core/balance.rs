//! Pure arithmetic behind the cached account-balance invariant.

/// Direction of a cached-balance adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Add,
    Subtract,
}

impl Direction {
    /// Applies `amount` to `balance` in this direction.
    pub fn apply(self, balance: f64, amount: f64) -> f64 {
        match self {
            Direction::Add => balance + amount,
            Direction::Subtract => balance - amount,
        }
    }
}

/// The side of an account a transaction lives on.
///
/// Paid expenses subtract from the cached balance; paid incomes add to it.
/// All direction rules below are mirrored between the two sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionKind {
    Expense,
    Income,
}

impl TransactionKind {
    /// Label used in response messages and log events.
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Income => "income",
        }
    }

    /// Direction applied when newly created paid instances land on an account.
    pub fn on_create(self) -> Direction {
        match self {
            TransactionKind::Expense => Direction::Subtract,
            TransactionKind::Income => Direction::Add,
        }
    }

    /// Direction that reverses previously applied paid instances.
    pub fn on_remove(self) -> Direction {
        match self {
            TransactionKind::Expense => Direction::Add,
            TransactionKind::Income => Direction::Subtract,
        }
    }

    /// Direction for a signed net change in the paid amount of an edited
    /// transaction, where `delta` is the new paid amount minus the old one.
    pub fn for_delta(self, delta: f64) -> Direction {
        if delta >= 0.0 {
            self.on_create()
        } else {
            self.on_remove()
        }
    }
}

/// Net change in an account's paid amount implied by editing one transaction.
///
/// An unpaid transaction contributes nothing regardless of its value, so the
/// delta is simply the new paid contribution minus the old one. Callers pass
/// `delta.abs()` and [`TransactionKind::for_delta`] to the reconciler.
pub fn paid_delta(old_paid: bool, old_value: f64, new_paid: bool, new_value: f64) -> f64 {
    let old = if old_paid { old_value } else { 0.0 };
    let new = if new_paid { new_value } else { 0.0 };
    new - old
}
