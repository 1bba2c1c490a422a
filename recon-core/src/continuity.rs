//! Balance continuity across successive statements of one account.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::coherence::within_tolerance;
use crate::model::{AccountKey, Statement};
use crate::period::Period;

/// Comparison of two chronologically adjacent statements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsistencyReport {
    pub earlier_period: Period,
    pub later_period: Period,
    pub earlier_closing_balance: Decimal,
    pub later_opening_balance: Decimal,
    /// later opening - earlier closing
    pub gap: Decimal,
    pub is_consistent: bool,
    pub months_between: i32,
    pub is_consecutive: bool,
}

impl ConsistencyReport {
    pub fn between(earlier: &Statement, later: &Statement) -> Self {
        let earlier_period = earlier.resolved_period();
        let later_period = later.resolved_period();
        let gap = later.opening_balance - earlier.closing_balance;
        let months_between = earlier_period.months_until(&later_period);

        Self {
            earlier_period,
            later_period,
            earlier_closing_balance: earlier.closing_balance,
            later_opening_balance: later.opening_balance,
            gap,
            is_consistent: within_tolerance(gap),
            months_between,
            is_consecutive: months_between == 1,
        }
    }
}

/// Sort statements by resolved period and compare each adjacent pair.
///
/// Fewer than two statements yield no reports.
pub fn analyze_continuity(statements: &[&Statement]) -> Vec<ConsistencyReport> {
    let mut ordered: Vec<&Statement> = statements.to_vec();
    ordered.sort_by_key(|s| s.resolved_period());

    let reports: Vec<ConsistencyReport> = ordered
        .windows(2)
        .map(|pair| ConsistencyReport::between(pair[0], pair[1]))
        .collect();

    for r in reports.iter().filter(|r| !r.is_consistent || !r.is_consecutive) {
        log::warn!(
            "continuity break {} -> {}: gap {}, {} month(s) apart",
            r.earlier_period,
            r.later_period,
            r.gap,
            r.months_between
        );
    }

    reports
}

/// Group statements by (holder, account) so continuity can run per account.
pub fn group_by_account(statements: &[Statement]) -> BTreeMap<AccountKey, Vec<&Statement>> {
    let mut groups: BTreeMap<AccountKey, Vec<&Statement>> = BTreeMap::new();
    for s in statements {
        groups.entry(s.account_key()).or_default().push(s);
    }
    groups
}
