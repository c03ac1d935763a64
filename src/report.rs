//! Purpose: Define the stable stdout schema for mismatch reports.
//! Exports: `mismatch_json`, `mismatch_text`.
//! Role: Shared rendering for the CLI; one line per mismatch in either format.
//! Invariants: Rows and columns are 1-based in every rendering.
//! Invariants: JSON schema is additive-only; `kind` values match `MismatchCategory`.
use serde_json::{Map, Value, json};

use crate::core::cell::Cell;
use crate::core::diff::Mismatch;

fn row_json(row: &[Cell]) -> Value {
    Value::Array(row.iter().map(Cell::to_json).collect())
}

pub fn mismatch_json(mismatch: &Mismatch) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(mismatch.category()));
    match mismatch {
        Mismatch::RowCount { lhs, rhs } => {
            inner.insert("lhs".to_string(), json!(lhs));
            inner.insert("rhs".to_string(), json!(rhs));
        }
        Mismatch::ColumnCount { row, lhs, rhs } => {
            inner.insert("row".to_string(), json!(row + 1));
            inner.insert("lhs".to_string(), json!(lhs));
            inner.insert("rhs".to_string(), json!(rhs));
        }
        Mismatch::Kind {
            row,
            column,
            lhs,
            rhs,
        } => {
            inner.insert("row".to_string(), json!(row + 1));
            inner.insert("column".to_string(), json!(column + 1));
            inner.insert("lhs".to_string(), lhs.to_json());
            inner.insert("rhs".to_string(), rhs.to_json());
            inner.insert("lhs_kind".to_string(), json!(lhs.kind()));
            inner.insert("rhs_kind".to_string(), json!(rhs.kind()));
        }
        Mismatch::Value {
            row,
            column,
            lhs,
            rhs,
            lhs_row,
            rhs_row,
        } => {
            inner.insert("row".to_string(), json!(row + 1));
            inner.insert("column".to_string(), json!(column + 1));
            inner.insert("lhs".to_string(), lhs.to_json());
            inner.insert("rhs".to_string(), rhs.to_json());
            inner.insert("lhs_row".to_string(), row_json(lhs_row));
            inner.insert("rhs_row".to_string(), row_json(rhs_row));
        }
    }
    inner.insert("message".to_string(), json!(mismatch.to_string()));

    let mut outer = Map::new();
    outer.insert("mismatch".to_string(), Value::Object(inner));
    Value::Object(outer)
}

pub fn mismatch_text(mismatch: &Mismatch) -> String {
    mismatch.to_string()
}
