//! Purpose: Decide whether two row sequences describe the same result set.
//! Exports: `DiffResult`, `Mismatch`, `MismatchCategory`, `diff`, `diff_all`, `FLOAT_TOLERANCE`.
//! Role: Positional structural/value comparison; lhs is the reference, rhs the engine under test.
//! Invariants: Row i pairs only with row i; column j only with column j.
//! Invariants: Scan order is rows top-to-bottom, then columns left-to-right.
//! Invariants: Integer vs float is a kind mismatch, never coerced.
//! Invariants: Inputs are only borrowed; neither sequence is mutated.
use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::cell::Cell;
use super::ingest::{Row, RowSequence};

/// Floats are equivalent when their absolute difference is strictly below this.
pub const FLOAT_TOLERANCE: f64 = 1e-2;

#[derive(Clone, Debug, PartialEq)]
pub enum DiffResult {
    Equivalent,
    NotEquivalent(Mismatch),
}

impl DiffResult {
    pub fn is_equivalent(&self) -> bool {
        matches!(self, DiffResult::Equivalent)
    }

    pub fn mismatch(&self) -> Option<&Mismatch> {
        match self {
            DiffResult::Equivalent => None,
            DiffResult::NotEquivalent(mismatch) => Some(mismatch),
        }
    }
}

/// One discrepancy. `row` and `column` are zero-based.
#[derive(Clone, Debug, PartialEq)]
pub enum Mismatch {
    RowCount {
        lhs: usize,
        rhs: usize,
    },
    ColumnCount {
        row: usize,
        lhs: usize,
        rhs: usize,
    },
    Kind {
        row: usize,
        column: usize,
        lhs: Cell,
        rhs: Cell,
    },
    Value {
        row: usize,
        column: usize,
        lhs: Cell,
        rhs: Cell,
        lhs_row: Row,
        rhs_row: Row,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchCategory {
    RowCount,
    ColumnCount,
    Kind,
    Value,
}

impl Mismatch {
    pub fn category(&self) -> MismatchCategory {
        match self {
            Mismatch::RowCount { .. } => MismatchCategory::RowCount,
            Mismatch::ColumnCount { .. } => MismatchCategory::ColumnCount,
            Mismatch::Kind { .. } => MismatchCategory::Kind,
            Mismatch::Value { .. } => MismatchCategory::Value,
        }
    }
}

fn format_row(row: &[Cell]) -> String {
    let cells: Vec<String> = row.iter().map(Cell::quoted).collect();
    format!("[{}]", cells.join(", "))
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::RowCount { lhs, rhs } => {
                write!(f, "row count mismatch (lhs = {lhs}, rhs = {rhs})")
            }
            Mismatch::ColumnCount { row, lhs, rhs } => write!(
                f,
                "column count mismatch at row {} (lhs = {lhs}, rhs = {rhs})",
                row + 1
            ),
            Mismatch::Kind {
                row,
                column,
                lhs,
                rhs,
            } => write!(
                f,
                "type mismatch at row {}, column {} (lhs = {lhs} [{}], rhs = {rhs} [{}])",
                row + 1,
                column + 1,
                lhs.kind(),
                rhs.kind()
            ),
            Mismatch::Value {
                row,
                column,
                lhs,
                rhs,
                lhs_row,
                rhs_row,
            } => write!(
                f,
                "value mismatch at row {}, column {} (lhs_value = {lhs}, rhs_value = {rhs}) [lhs = {}, rhs = {}]",
                row + 1,
                column + 1,
                format_row(lhs_row),
                format_row(rhs_row)
            ),
        }
    }
}

/// Per-cell verdict, applied identically by `diff` and `diff_all`.
fn compare_cells(row: usize, column: usize, lhs_row: &Row, rhs_row: &Row) -> Option<Mismatch> {
    let (lhs, rhs) = (&lhs_row[column], &rhs_row[column]);
    let equal = match (lhs, rhs) {
        // Equal infinities subtract to NaN, so compare them directly.
        (Cell::Float(a), Cell::Float(b)) => a == b || (a - b).abs() < FLOAT_TOLERANCE,
        (Cell::Integer(a), Cell::Integer(b)) => a == b,
        (Cell::Text(a), Cell::Text(b)) => a == b,
        _ => {
            return Some(Mismatch::Kind {
                row,
                column,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            });
        }
    };
    if equal {
        return None;
    }
    Some(Mismatch::Value {
        row,
        column,
        lhs: lhs.clone(),
        rhs: rhs.clone(),
        lhs_row: lhs_row.clone(),
        rhs_row: rhs_row.clone(),
    })
}

/// Visit discrepancies in scan order; stop as soon as `on_mismatch` returns false.
fn scan<F>(lhs: &RowSequence, rhs: &RowSequence, mut on_mismatch: F)
where
    F: FnMut(Mismatch) -> bool,
{
    if lhs.len() != rhs.len() {
        on_mismatch(Mismatch::RowCount {
            lhs: lhs.len(),
            rhs: rhs.len(),
        });
        return;
    }
    for (row, (lhs_row, rhs_row)) in lhs.iter().zip(rhs.iter()).enumerate() {
        if lhs_row.len() != rhs_row.len() {
            let keep_going = on_mismatch(Mismatch::ColumnCount {
                row,
                lhs: lhs_row.len(),
                rhs: rhs_row.len(),
            });
            if !keep_going {
                return;
            }
            continue;
        }
        for column in 0..lhs_row.len() {
            if let Some(mismatch) = compare_cells(row, column, lhs_row, rhs_row) {
                if !on_mismatch(mismatch) {
                    return;
                }
            }
        }
    }
}

/// Compare two sequences and report the first discrepancy.
pub fn diff(lhs: &RowSequence, rhs: &RowSequence) -> DiffResult {
    let mut first = None;
    scan(lhs, rhs, |mismatch| {
        first = Some(mismatch);
        false
    });
    match first {
        Some(mismatch) => {
            debug!(category = ?mismatch.category(), "reports differ");
            DiffResult::NotEquivalent(mismatch)
        }
        None => {
            debug!(rows = lhs.len(), "reports are equivalent");
            DiffResult::Equivalent
        }
    }
}

/// Collect every discrepancy in scan order.
///
/// A row-count mismatch is still terminal. A row whose column count differs is
/// reported once and its cells are not compared.
pub fn diff_all(lhs: &RowSequence, rhs: &RowSequence) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    scan(lhs, rhs, |mismatch| {
        mismatches.push(mismatch);
        true
    });
    debug!(count = mismatches.len(), "collected mismatches");
    mismatches
}

#[cfg(test)]
mod tests {
    use super::{DiffResult, Mismatch, MismatchCategory, diff, diff_all};
    use crate::core::cell::Cell;
    use crate::core::ingest::{RowSequence, parse_row};

    fn seq(lines: &[&str]) -> RowSequence {
        RowSequence::from(lines.iter().map(|line| parse_row(line)).collect::<Vec<_>>())
    }

    #[test]
    fn identical_sequences_are_equivalent() {
        let rows = seq(&["1|2.50|abc", "3|4.40|def"]);
        assert_eq!(diff(&rows, &rows.clone()), DiffResult::Equivalent);
        assert!(diff_all(&rows, &rows).is_empty());
    }

    #[test]
    fn empty_sequences_are_equivalent() {
        assert!(diff(&RowSequence::default(), &RowSequence::default()).is_equivalent());
    }

    #[test]
    fn length_mismatch_wins_regardless_of_content() {
        let lhs = seq(&["1", "2", "3"]);
        let rhs = seq(&["x|y"]);
        assert_eq!(
            diff(&lhs, &rhs),
            DiffResult::NotEquivalent(Mismatch::RowCount { lhs: 3, rhs: 1 })
        );
        assert_eq!(
            diff(&rhs, &lhs),
            DiffResult::NotEquivalent(Mismatch::RowCount { lhs: 1, rhs: 3 })
        );
        assert_eq!(diff_all(&lhs, &rhs).len(), 1);
    }

    #[test]
    fn column_count_mismatch_short_circuits() {
        let lhs = seq(&["1|2", "1|2|3", "9|9"]);
        let rhs = seq(&["1|2", "1|2", "0|0"]);
        assert_eq!(
            diff(&lhs, &rhs),
            DiffResult::NotEquivalent(Mismatch::ColumnCount {
                row: 1,
                lhs: 3,
                rhs: 2,
            })
        );
    }

    #[test]
    fn float_tolerance_boundary() {
        assert!(diff(&seq(&["1.00"]), &seq(&["1.009"])).is_equivalent());
        assert!(diff(&seq(&["1.00"]), &seq(&["1.009999"])).is_equivalent());
        assert!(diff(&seq(&["-3.5"]), &seq(&["-3.505"])).is_equivalent());

        let result = diff(&seq(&["1.00"]), &seq(&["1.02"]));
        assert_eq!(
            result.mismatch().map(Mismatch::category),
            Some(MismatchCategory::Value)
        );
        assert!(!diff(&seq(&["1.00"]), &seq(&["1.25"])).is_equivalent());
    }

    #[test]
    fn exponent_floats_get_tolerance() {
        assert!(diff(&seq(&["1.5e+20"]), &seq(&["1.5e+20"])).is_equivalent());
        assert!(diff(&seq(&["2.5E-3"]), &seq(&["2.4E-3"])).is_equivalent());
        assert_eq!(
            diff(&seq(&["1.50000000001e+20"]), &seq(&["1.5e+20"]))
                .mismatch()
                .map(Mismatch::category),
            Some(MismatchCategory::Value)
        );
    }

    #[test]
    fn identical_infinite_floats_are_equivalent() {
        let huge = format!("1{}.0", "0".repeat(400));
        assert!(diff(&seq(&[huge.as_str()]), &seq(&[huge.as_str()])).is_equivalent());

        let negative = format!("-{huge}");
        assert!(!diff(&seq(&[huge.as_str()]), &seq(&[negative.as_str()])).is_equivalent());
    }

    #[test]
    fn overflowing_integer_against_text_is_a_value_mismatch() {
        let big = "99999999999999999999999";
        assert_eq!(
            diff(&seq(&[big]), &seq(&["abc"]))
                .mismatch()
                .map(Mismatch::category),
            Some(MismatchCategory::Value)
        );
        assert!(diff(&seq(&[big]), &seq(&[big])).is_equivalent());
    }

    #[test]
    fn integer_never_equals_float() {
        let result = diff(&seq(&["42"]), &seq(&["42.0"]));
        assert_eq!(
            result,
            DiffResult::NotEquivalent(Mismatch::Kind {
                row: 0,
                column: 0,
                lhs: Cell::Integer(42),
                rhs: Cell::Float(42.0),
            })
        );
    }

    #[test]
    fn text_and_integers_compare_exactly() {
        assert!(diff(&seq(&["abc|7"]), &seq(&["abc|7"])).is_equivalent());
        assert!(!diff(&seq(&["abc|7"]), &seq(&["abd|7"])).is_equivalent());
        assert!(!diff(&seq(&["abc|7"]), &seq(&["abc|8"])).is_equivalent());
        // "007" and "7" differ in kind.
        assert_eq!(
            diff(&seq(&["007"]), &seq(&["7"]))
                .mismatch()
                .map(Mismatch::category),
            Some(MismatchCategory::Kind)
        );
    }

    #[test]
    fn value_mismatch_carries_both_rows() {
        let lhs = seq(&["a|b", "1|2.50"]);
        let rhs = seq(&["a|b", "1|2.52"]);
        match diff(&lhs, &rhs) {
            DiffResult::NotEquivalent(Mismatch::Value {
                row,
                column,
                lhs,
                rhs,
                lhs_row,
                rhs_row,
            }) => {
                assert_eq!((row, column), (1, 1));
                assert_eq!(lhs, Cell::Float(2.5));
                assert_eq!(rhs, Cell::Float(2.52));
                assert_eq!(lhs_row, vec![Cell::Integer(1), Cell::Float(2.5)]);
                assert_eq!(rhs_row, vec![Cell::Integer(1), Cell::Float(2.52)]);
            }
            other => panic!("expected value mismatch, got {other:?}"),
        }
    }

    #[test]
    fn first_mismatch_follows_scan_order() {
        let lhs = seq(&["1|x|3", "4|5|6"]);
        let rhs = seq(&["1|y|3.0", "0|5|6"]);
        let first = diff(&lhs, &rhs);
        assert_eq!(
            first.mismatch().map(Mismatch::category),
            Some(MismatchCategory::Value)
        );
        match first.mismatch() {
            Some(Mismatch::Value { row, column, .. }) => assert_eq!((*row, *column), (0, 1)),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn diff_all_preserves_scan_order() {
        let lhs = seq(&["1|x|3", "1|2", "4|5|6"]);
        let rhs = seq(&["1|y|3.0", "1|2|3", "7|5|6"]);
        let all = diff_all(&lhs, &rhs);
        let positions: Vec<(MismatchCategory, usize)> = all
            .iter()
            .map(|mismatch| match mismatch {
                Mismatch::Value { row, .. }
                | Mismatch::Kind { row, .. }
                | Mismatch::ColumnCount { row, .. } => (mismatch.category(), *row),
                Mismatch::RowCount { .. } => (mismatch.category(), usize::MAX),
            })
            .collect();
        assert_eq!(
            positions,
            vec![
                (MismatchCategory::Value, 0),
                (MismatchCategory::Kind, 0),
                (MismatchCategory::ColumnCount, 1),
                (MismatchCategory::Value, 2),
            ]
        );
        assert_eq!(Some(&all[0]), diff(&lhs, &rhs).mismatch());
    }

    #[test]
    fn messages_use_one_based_positions() {
        let value = diff(&seq(&["1|2.50"]), &seq(&["1|2.52"]));
        assert_eq!(
            value.mismatch().map(ToString::to_string).as_deref(),
            Some(
                "value mismatch at row 1, column 2 (lhs_value = 2.5, rhs_value = 2.52) [lhs = [1, 2.5], rhs = [1, 2.52]]"
            )
        );

        let kind = diff(&seq(&["42"]), &seq(&["42.0"]));
        assert_eq!(
            kind.mismatch().map(ToString::to_string).as_deref(),
            Some("type mismatch at row 1, column 1 (lhs = 42 [integer], rhs = 42.0 [float])")
        );

        let count = diff(&seq(&["1"]), &seq(&[]));
        assert_eq!(
            count.mismatch().map(ToString::to_string).as_deref(),
            Some("row count mismatch (lhs = 1, rhs = 0)")
        );

        let text = diff(&seq(&["x|1"]), &seq(&["y|1"]));
        assert!(
            text.mismatch()
                .map(ToString::to_string)
                .unwrap_or_default()
                .ends_with("[lhs = ['x', 1], rhs = ['y', 1]]")
        );
    }
}
