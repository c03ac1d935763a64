//! Purpose: Define the stable public Rust API boundary for querydiff.
//! Exports: Types and operations needed by the CLI and integration tests.
//! Role: Public, additive-only surface over the core modules.
//! Invariants: Callers compare reports only through these re-exports.

pub use crate::core::cell::{Cell, CellKind};
pub use crate::core::diff::{
    DiffResult, FLOAT_TOLERANCE, Mismatch, MismatchCategory, diff, diff_all,
};
#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind, MISMATCH_EXIT_CODE};
pub use crate::core::filter::ReportFormat;
pub use crate::core::ingest::{
    IngestOutcome, Ingested, Row, RowSequence, STDIN_PATH, ingest, ingest_path, parse_row,
};
