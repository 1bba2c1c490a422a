//! Internal arithmetic check of one statement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::model::Statement;

/// Absolute tolerance (0.01 currency units) for balance comparisons.
pub const BALANCE_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoherenceCheck {
    pub computed_closing_balance: Decimal,
    pub declared_closing_balance: Decimal,
    /// computed - declared
    pub gap: Decimal,
    pub is_coherent: bool,
}

pub fn within_tolerance(gap: Decimal) -> bool {
    gap.abs() < BALANCE_TOLERANCE
}

/// Compare `opening + Σ(credit - debit)` against the declared closing balance.
pub fn check_coherence(statement: &Statement) -> CoherenceCheck {
    let computed = statement.computed_closing_balance();
    let gap = computed - statement.closing_balance;
    CoherenceCheck {
        computed_closing_balance: computed,
        declared_closing_balance: statement.closing_balance,
        gap,
        is_coherent: within_tolerance(gap),
    }
}
