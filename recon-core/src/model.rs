//! Canonical statement records.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::period::Period;

/// One operation on a statement. Both sides are always present; the inactive
/// one is zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub description: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            debit,
            credit,
        }
    }

    pub fn debit(date: NaiveDate, description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(date, description, amount, Decimal::ZERO)
    }

    pub fn credit(date: NaiveDate, description: impl Into<String>, amount: Decimal) -> Self {
        Self::new(date, description, Decimal::ZERO, amount)
    }

    /// Build from sides that may carry a sign. A negative debit is money in
    /// and moves to the credit side (and vice versa), so both stored sides
    /// are non-negative and `signed_amount` keeps its meaning.
    pub fn from_signed_sides(
        date: NaiveDate,
        description: impl Into<String>,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        let (mut out, mut inflow) = (Decimal::ZERO, Decimal::ZERO);
        if debit.is_sign_negative() {
            inflow += debit.abs();
        } else {
            out += debit;
        }
        if credit.is_sign_negative() {
            out += credit.abs();
        } else {
            inflow += credit;
        }
        Self::new(date, description, out, inflow)
    }

    /// Credit minus debit: negative for money leaving the account.
    pub fn signed_amount(&self) -> Decimal {
        self.credit - self.debit
    }
}

/// One account's record for one calendar period, as printed on the source
/// document. Balances are declared values and may disagree with the
/// transactions; see [`crate::coherence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    pub bank_name: String,
    pub account_id: String,
    pub holder_name: String,
    /// Raw or canonical (`MM/YYYY`) period label.
    pub period: String,
    pub opening_balance: Decimal,
    pub closing_balance: Decimal,
    pub transactions: Vec<Transaction>,
}

/// Natural key of a persisted statement: (bank, account, period).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StatementKey {
    pub bank_name: String,
    pub account_id: String,
    pub period: String,
}

/// Statements sharing a holder and account number belong to one account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountKey {
    pub holder_name: String,
    pub account_id: String,
}

impl Statement {
    pub fn resolved_period(&self) -> Period {
        Period::resolve(&self.period)
    }

    pub fn total_debit(&self) -> Decimal {
        self.transactions.iter().map(|t| t.debit).sum()
    }

    pub fn total_credit(&self) -> Decimal {
        self.transactions.iter().map(|t| t.credit).sum()
    }

    /// Opening balance plus every signed movement.
    pub fn computed_closing_balance(&self) -> Decimal {
        self.opening_balance
            + self
                .transactions
                .iter()
                .map(Transaction::signed_amount)
                .sum::<Decimal>()
    }

    /// Upsert key. Resolvable period labels are canonicalized so that
    /// `01-2025` and `Janvier 2025` name the same statement.
    pub fn key(&self) -> StatementKey {
        let period = match Period::parse(&self.period) {
            Some(p) => p.to_string(),
            None => self.period.trim().to_string(),
        };
        StatementKey {
            bank_name: self.bank_name.trim().to_string(),
            account_id: self.account_id.trim().to_string(),
            period,
        }
    }

    pub fn account_key(&self) -> AccountKey {
        AccountKey {
            holder_name: self.holder_name.trim().to_string(),
            account_id: self.account_id.trim().to_string(),
        }
    }
}
