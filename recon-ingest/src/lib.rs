//! recon-ingest: turn OCR text or structured extractions into canonical statements.

pub mod batch;
pub mod config;
pub mod parsers;
pub mod types;

pub use batch::{assemble_batch, BatchResult, BatchStats, Document};
pub use config::AssemblerConfig;
pub use parsers::assembler::{AssembledStatement, RejectedLine, StatementAssembler};
pub use parsers::line::{LineContext, TransactionLineParser};
pub use types::{
    DocumentHints, ExtractionInput, RawAmount, StructuredExtraction, StructuredTransaction,
};
