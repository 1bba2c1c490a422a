//! Reporting summaries over a set of transactions: headline KPIs, expenses
//! per category, and debit/credit totals per month.

use std::collections::BTreeMap;

use recon_core::{Period, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::category_rules::CategoryRules;

/// Headline figures for a transaction set. Averages and maxima only look at
/// the non-zero side of each transaction; all amounts are rounded to 2 places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionSummary {
    pub transaction_count: usize,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// Credits minus debits.
    pub net_balance: Decimal,
    pub average_debit: Decimal,
    pub average_credit: Decimal,
    pub max_debit: Decimal,
    pub max_credit: Decimal,
    pub top_expense_category: Option<String>,
}

fn average(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    values.iter().sum::<Decimal>() / Decimal::from(values.len())
}

impl TransactionSummary {
    pub fn from_transactions(transactions: &[Transaction], rules: &CategoryRules) -> Self {
        let debits: Vec<Decimal> = transactions
            .iter()
            .map(|t| t.debit)
            .filter(|d| !d.is_zero())
            .collect();
        let credits: Vec<Decimal> = transactions
            .iter()
            .map(|t| t.credit)
            .filter(|c| !c.is_zero())
            .collect();

        let total_debit: Decimal = debits.iter().sum();
        let total_credit: Decimal = credits.iter().sum();

        // Ties go to the category that sorts first.
        let mut top: Option<(String, Decimal)> = None;
        for (name, amount) in expenses_by_category(transactions, rules) {
            if top.as_ref().is_none_or(|(_, best)| amount > *best) {
                top = Some((name, amount));
            }
        }

        Self {
            transaction_count: transactions.len(),
            total_debit: total_debit.round_dp(2),
            total_credit: total_credit.round_dp(2),
            net_balance: (total_credit - total_debit).round_dp(2),
            average_debit: average(&debits).round_dp(2),
            average_credit: average(&credits).round_dp(2),
            max_debit: debits.iter().copied().max().unwrap_or_default().round_dp(2),
            max_credit: credits.iter().copied().max().unwrap_or_default().round_dp(2),
            top_expense_category: top.map(|(name, _)| name),
        }
    }
}

/// Debit totals per category. Categories with no debit are omitted.
pub fn expenses_by_category(
    transactions: &[Transaction],
    rules: &CategoryRules,
) -> BTreeMap<String, Decimal> {
    let mut out: BTreeMap<String, Decimal> = BTreeMap::new();
    for t in transactions.iter().filter(|t| !t.debit.is_zero()) {
        *out.entry(rules.categorize_transaction(t).to_string()).or_default() += t.debit;
    }
    out
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotals {
    pub debit: Decimal,
    pub credit: Decimal,
}

impl MonthlyTotals {
    pub fn net(&self) -> Decimal {
        self.credit - self.debit
    }
}

/// Debit and credit totals keyed by the calendar month of each transaction.
pub fn monthly_totals(transactions: &[Transaction]) -> BTreeMap<Period, MonthlyTotals> {
    let mut out: BTreeMap<Period, MonthlyTotals> = BTreeMap::new();
    for t in transactions {
        let entry = out.entry(Period::from_date(t.date)).or_default();
        entry.debit += t.debit;
        entry.credit += t.credit;
    }
    log::debug!("monthly totals over {} month(s)", out.len());
    out
}
