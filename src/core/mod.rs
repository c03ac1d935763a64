// Core modules implementing cell classification, report ingestion, diffing, and error modeling.
pub mod cell;
pub mod diff;
pub mod error;
pub mod filter;
pub mod ingest;
