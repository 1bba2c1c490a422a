//! Merge several statements into one chronological ledger with a running
//! balance.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ReconError, Result};
use crate::model::{Statement, Transaction};
use crate::period::Period;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction: Transaction,
    /// Period label of the statement the transaction came from.
    pub source_period: String,
    pub running_balance: Decimal,
}

impl LedgerEntry {
    pub fn date(&self) -> NaiveDate {
        self.transaction.date
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    pub initial_balance: Decimal,
    pub entries: Vec<LedgerEntry>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub final_balance: Decimal,
}

impl Ledger {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Merge `selection`, starting from the opening balance of its first
/// statement.
pub fn merge_statements(selection: &[&Statement]) -> Result<Ledger> {
    let first = selection.first().ok_or(ReconError::EmptySelection)?;
    merge_statements_from(selection, first.opening_balance)
}

/// Merge `selection` starting from an explicit initial balance.
///
/// Transactions are sorted by date; ties keep source period order, then
/// selection and original order.
pub fn merge_statements_from(selection: &[&Statement], initial_balance: Decimal) -> Result<Ledger> {
    if selection.is_empty() {
        return Err(ReconError::EmptySelection);
    }

    let mut tagged: Vec<(Period, &Statement, &Transaction)> = selection
        .iter()
        .flat_map(|&s| {
            let period = s.resolved_period();
            s.transactions.iter().map(move |t| (period, s, t))
        })
        .collect();
    tagged.sort_by_key(|(period, _, t)| (t.date, *period));

    let mut balance = initial_balance;
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    let mut entries = Vec::with_capacity(tagged.len());

    for (_, statement, t) in tagged {
        balance += t.signed_amount();
        total_debit += t.debit;
        total_credit += t.credit;
        entries.push(LedgerEntry {
            transaction: t.clone(),
            source_period: statement.period.clone(),
            running_balance: balance,
        });
    }

    log::debug!(
        "merged {} statement(s) into {} ledger entries, final balance {}",
        selection.len(),
        entries.len(),
        balance
    );

    Ok(Ledger {
        initial_balance,
        entries,
        total_debit,
        total_credit,
        final_balance: balance,
    })
}
