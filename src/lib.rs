//! Purpose: Library crate behind the `querydiff` CLI and its tests.
//! Exports: `core` (cells, filters, ingestion, diffing, errors), `api`, `report`.
//! Role: Compare two engines' tabular reports for result-set equivalence.
//! Invariants: `api` is the stable surface; `core` layout may change.
//! Invariants: Library code never prints; rendering lives in `report` and the binary.
pub mod api;
pub mod core;
pub mod report;
