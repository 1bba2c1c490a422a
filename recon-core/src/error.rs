//! Error taxonomy shared by the parsing and reconciliation layers.
//!
//! Only structural failures are errors. Coherence and continuity mismatches
//! are reported as booleans on their result types, and unresolvable periods
//! degrade to [`crate::period::Period::UNKNOWN`].

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReconError {
    /// A token shaped like a monetary value is not a valid decimal number.
    #[error("invalid amount '{token}'")]
    InvalidAmount { token: String },

    /// A merge was requested over zero statements.
    #[error("no statements selected for merge")]
    EmptySelection,

    /// The document carried no usable text at all.
    #[error("document contains no text")]
    EmptyDocument,

    #[error("invalid date '{value}': expected DD/MM/YYYY")]
    InvalidDate { value: String },
}

pub type Result<T> = std::result::Result<T, ReconError>;
