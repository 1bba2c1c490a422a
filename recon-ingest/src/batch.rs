//! Assemble many documents in parallel.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::parsers::assembler::{AssembledStatement, StatementAssembler};
use crate::types::{DocumentHints, ExtractionInput};

/// One uploaded document awaiting assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Caller-chosen identifier, usually the original filename.
    pub id: String,
    pub input: ExtractionInput,
}

impl Document {
    /// Raw text keyed by filename; hints are read from the name.
    pub fn from_text(filename: impl Into<String>, text: impl Into<String>) -> Self {
        let id = filename.into();
        let hints = DocumentHints::from_filename(&id);
        Self {
            input: ExtractionInput::raw_text(text, hints),
            id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResult {
    pub id: String,
    pub result: recon_core::Result<AssembledStatement>,
}

/// Summary counts over a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    pub assembled: usize,
    pub failed: usize,
    pub with_warnings: usize,
}

impl BatchStats {
    pub fn from_results(results: &[BatchResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, r| {
            match &r.result {
                Ok(a) => {
                    acc.assembled += 1;
                    if a.has_warnings() {
                        acc.with_warnings += 1;
                    }
                }
                Err(_) => acc.failed += 1,
            }
            acc
        })
    }
}

/// Documents are independent; results come back in input order.
pub fn assemble_batch(
    assembler: &StatementAssembler,
    documents: Vec<Document>,
) -> Vec<BatchResult> {
    let results: Vec<BatchResult> = documents
        .into_par_iter()
        .map(|doc| {
            let result = assembler.assemble(doc.input);
            if let Err(e) = &result {
                log::warn!("{}: {e}", doc.id);
            }
            BatchResult { id: doc.id, result }
        })
        .collect();

    let stats = BatchStats::from_results(&results);
    log::info!(
        "batch done: {} assembled, {} failed, {} with warnings",
        stats.assembled,
        stats.failed,
        stats.with_warnings
    );
    results
}
