//! recon-finance: transaction categories and reporting summaries over canonical statements.

pub mod category_rules;
pub mod summary;

pub use category_rules::{CategoryRule, CategoryRules, OTHER_CATEGORY};
pub use summary::{expenses_by_category, monthly_totals, MonthlyTotals, TransactionSummary};
