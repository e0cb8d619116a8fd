//! Expansion of fixed (recurring) transaction templates into dated monthly
//! instances.

use chrono::{Datelike, Months, NaiveDate};

use super::Transaction;

/// Fixed expenses expand over a fixed twelve-month horizon.
pub const EXPENSE_HORIZON_MONTHS: u32 = 12;

/// Errors produced while expanding a fixed transaction template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// The template is marked fixed but carries no start date.
    MissingStartDate,
    /// Month arithmetic walked outside the supported calendar range.
    DateOutOfRange,
}

impl std::fmt::Display for RecurrenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrenceError::MissingStartDate => {
                write!(f, "fixed transactions require a valid start date")
            }
            RecurrenceError::DateOutOfRange => {
                write!(f, "generated date falls outside the supported calendar range")
            }
        }
    }
}

impl std::error::Error for RecurrenceError {}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

fn instance(template: &Transaction, date: NaiveDate, token: String, first: bool) -> Transaction {
    Transaction {
        id: format!("{token}-{}-{}", date.month(), date.year()),
        name: template.name.clone(),
        category: template.category.clone(),
        value: template.value,
        date,
        fixed: template.fixed,
        start_date: template.start_date,
        // Only the chronologically first instance keeps the template's paid
        // flag; the rest have not touched the balance yet.
        paid: if first { template.paid } else { false },
    }
}

/// Expands a fixed expense template into [`EXPENSE_HORIZON_MONTHS`] monthly
/// instances starting at the template's start date.
///
/// Instances keep the start date's day-of-month, clamped to the last day of
/// shorter months (a start on January 31 yields February 29 in a leap year,
/// April 30, and so on). Each instance receives a distinct id of the form
/// `<token>-<month>-<year>` drawn from `next_id`.
pub fn expand_fixed_expense<F>(
    template: &Transaction,
    mut next_id: F,
) -> Result<Vec<Transaction>, RecurrenceError>
where
    F: FnMut() -> String,
{
    let start = template.start_date.ok_or(RecurrenceError::MissingStartDate)?;
    let mut instances = Vec::with_capacity(EXPENSE_HORIZON_MONTHS as usize);
    for offset in 0..EXPENSE_HORIZON_MONTHS {
        let date = start
            .checked_add_months(Months::new(offset))
            .ok_or(RecurrenceError::DateOutOfRange)?;
        instances.push(instance(template, date, next_id(), offset == 0));
    }
    Ok(instances)
}

/// Expands a fixed income template from its start month through the month of
/// `today`, inclusive.
///
/// Instance dates are normalized to the first of each month, so the horizon
/// depends on the clock the caller passes in: a start in month `M` expands to
/// `month_index(today) - month_index(M) + 1` instances, and a start in a
/// future month yields none at all.
pub fn expand_fixed_income<F>(
    template: &Transaction,
    today: NaiveDate,
    mut next_id: F,
) -> Result<Vec<Transaction>, RecurrenceError>
where
    F: FnMut() -> String,
{
    let start = template.start_date.ok_or(RecurrenceError::MissingStartDate)?;
    let months = month_index(today) - month_index(start);
    if months < 0 {
        return Ok(Vec::new());
    }
    let first_of_month = NaiveDate::from_ymd_opt(start.year(), start.month(), 1)
        .ok_or(RecurrenceError::DateOutOfRange)?;
    let mut instances = Vec::with_capacity(months as usize + 1);
    for offset in 0..=months as u32 {
        let date = first_of_month
            .checked_add_months(Months::new(offset))
            .ok_or(RecurrenceError::DateOutOfRange)?;
        instances.push(instance(template, date, next_id(), offset == 0));
    }
    Ok(instances)
}
