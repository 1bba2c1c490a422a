//! recon-core: canonical statement model, amount/period normalization, and
//! the reconciliation checks run over parsed statements.

pub mod amount;
pub mod coherence;
pub mod continuity;
pub mod error;
pub mod ledger;
pub mod model;
pub mod period;

pub use amount::{format_amount, parse_amount};
pub use coherence::{check_coherence, CoherenceCheck, BALANCE_TOLERANCE};
pub use continuity::{analyze_continuity, group_by_account, ConsistencyReport};
pub use error::{ReconError, Result};
pub use ledger::{merge_statements, merge_statements_from, Ledger, LedgerEntry};
pub use model::{AccountKey, Statement, StatementKey, Transaction};
pub use period::Period;
