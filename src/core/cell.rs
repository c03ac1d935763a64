//! Purpose: Classify one report token into a typed cell.
//! Exports: `Cell`, `CellKind`.
//! Role: Leaf of the ingestion pipeline; shared by both report formats.
//! Invariants: Classification depends only on the token text (never position or file).
//! Invariants: Fixed-point is tried before integer; anything else is text. Never fails.
//! Invariants: Shapes match a token prefix; the whole token must still convert, else it is text.
//! Invariants: The integer shape needs a nonzero leading digit, so "0" and "007" are text.
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static FIXED_POINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?[0-9]+\.[0-9]*").expect("Invalid fixed-point regex pattern")
});

static INTEGER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[1-9][0-9]*").expect("Invalid integer regex pattern"));

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Float,
    Integer,
    Text,
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CellKind::Float => "float",
            CellKind::Integer => "integer",
            CellKind::Text => "text",
        };
        f.write_str(label)
    }
}

/// A single classified value from a report row.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Float(f64),
    Integer(i64),
    Text(String),
}

impl Cell {
    /// Classify an already-trimmed token.
    ///
    /// A fixed-point prefix admits exponent forms such as `1.5e+20`; a prefix that does
    /// not convert as a whole (`1.5abc`, `12abc`) leaves the token as text.
    pub fn parse(token: &str) -> Self {
        if FIXED_POINT_RE.is_match(token) {
            if let Ok(value) = token.parse::<f64>() {
                return Cell::Float(value);
            }
        } else if INTEGER_RE.is_match(token) {
            // Out-of-range integers keep their text so equal tokens still compare equal.
            if let Ok(value) = token.parse::<i64>() {
                return Cell::Integer(value);
            }
        }
        Cell::Text(token.to_string())
    }

    pub fn kind(&self) -> CellKind {
        match self {
            Cell::Float(_) => CellKind::Float,
            Cell::Integer(_) => CellKind::Integer,
            Cell::Text(_) => CellKind::Text,
        }
    }

    /// Render the cell for a row listing; text is quoted so `'1'` and `1` stay distinguishable.
    pub fn quoted(&self) -> String {
        match self {
            Cell::Text(value) => format!("'{value}'"),
            other => other.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Cell::Float(value) => serde_json::Number::from_f64(*value)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| serde_json::Value::String(self.to_string())),
            Cell::Integer(value) => serde_json::Value::from(*value),
            Cell::Text(value) => serde_json::Value::String(value.clone()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole floats keep a trailing ".0" so they never read as integers.
            Cell::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{value:.1}")
            }
            Cell::Float(value) => write!(f, "{value}"),
            Cell::Integer(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
        }
    }
}
