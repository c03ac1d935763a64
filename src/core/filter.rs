//! Purpose: Recognize engine-specific boilerplate lines in a report.
//! Exports: `ReportFormat`.
//! Role: Per-format noise rules and header shape consumed by ingestion.
//! Invariants: Patterns match at the start of a trimmed line only.
//! Invariants: Blank lines are not a filter concern; ingestion drops them first.
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

const TIMING_TOGGLE_PREFIX: &str = "Timing is on.";
const ELAPSED_TIME_PREFIX: &str = "Time:";

static ROW_COUNT_FOOTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\([0-9]+ rows\)").expect("Invalid row-count footer regex"));

static TYPE_ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^TYPE_[A-Z]+:").expect("Invalid type annotation regex"));

/// Which engine produced a report.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ReportFormat {
    /// Reference engine: header + separator, timing notices, row-count footer.
    Plaintext,
    /// Engine under test: no header, per-column type annotations, row-count footer.
    Engine,
}

impl ReportFormat {
    /// Returns true if `line` is structural noise that never becomes a row.
    pub fn is_noise(self, line: &str) -> bool {
        match self {
            ReportFormat::Plaintext => {
                line.starts_with(TIMING_TOGGLE_PREFIX)
                    || line.starts_with(ELAPSED_TIME_PREFIX)
                    || ROW_COUNT_FOOTER_RE.is_match(line)
            }
            ReportFormat::Engine => {
                ROW_COUNT_FOOTER_RE.is_match(line) || TYPE_ANNOTATION_RE.is_match(line)
            }
        }
    }

    /// Number of surviving lines at the top of the report that are column headers.
    pub fn header_lines(self) -> usize {
        match self {
            ReportFormat::Plaintext => 2,
            ReportFormat::Engine => 0,
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportFormat::Plaintext => f.write_str("plaintext"),
            ReportFormat::Engine => f.write_str("engine"),
        }
    }
}
