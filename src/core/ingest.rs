//! Purpose: Turn one engine report into an ordered sequence of typed rows.
//! Exports: `Row`, `RowSequence`, `IngestOutcome`, `Ingested`, `ingest`, `ingest_path`, `STDIN_PATH`.
//! Role: Ingestion pipeline shared by both formats; format decides noise and header shape.
//! Invariants: Whole input is consumed before returning; no partial sequences escape.
//! Invariants: Blank, noise, and header lines never become rows.
//! Invariants: A returned `RowSequence` has no mutating API.
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use bstr::ByteSlice;
use tracing::{debug, trace};

use super::cell::Cell;
use super::error::{Error, ErrorKind};
use super::filter::ReportFormat;

/// Cell delimiter shared by both report formats.
pub const CELL_SEPARATOR: char = '|';

/// Path spelling that reads the report from standard input.
pub const STDIN_PATH: &str = "-";

pub type Row = Vec<Cell>;

/// Rows of one report, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowSequence {
    rows: Vec<Row>,
}

impl RowSequence {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }
}

impl From<Vec<Row>> for RowSequence {
    fn from(rows: Vec<Row>) -> Self {
        Self { rows }
    }
}

impl<'a> IntoIterator for &'a RowSequence {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Line accounting for one ingestion call.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct IngestOutcome {
    pub lines_total: u64,
    pub blank: u64,
    pub noise: u64,
    pub header: u64,
    pub rows: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Ingested {
    pub rows: RowSequence,
    pub outcome: IngestOutcome,
}

fn io_error(err: io::Error, message: &str) -> Error {
    Error::new(ErrorKind::Io)
        .with_message(message)
        .with_source(err)
}

/// Split a surviving data line into classified cells.
pub fn parse_row(line: &str) -> Row {
    line.split(CELL_SEPARATOR)
        .map(|token| Cell::parse(token.trim()))
        .collect()
}

pub fn ingest<R: Read>(reader: R, format: ReportFormat) -> Result<Ingested, Error> {
    let mut reader = BufReader::new(reader);
    let mut outcome = IngestOutcome::default();
    let mut rows = Vec::new();
    let mut buf = Vec::new();
    let header_lines = format.header_lines() as u64;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|err| io_error(err, "failed to read report"))?;
        if read == 0 {
            break;
        }
        outcome.lines_total += 1;

        let text = buf.to_str_lossy();
        let line = text.trim();
        if line.is_empty() {
            outcome.blank += 1;
            continue;
        }
        if format.is_noise(line) {
            trace!(%format, line_no = outcome.lines_total, line, "discarding noise line");
            outcome.noise += 1;
            continue;
        }
        if outcome.header < header_lines {
            trace!(%format, line_no = outcome.lines_total, line, "skipping header line");
            outcome.header += 1;
            continue;
        }
        rows.push(parse_row(line));
        outcome.rows += 1;
    }

    debug!(
        %format,
        lines = outcome.lines_total,
        blank = outcome.blank,
        noise = outcome.noise,
        header = outcome.header,
        rows = outcome.rows,
        "ingested report"
    );

    Ok(Ingested {
        rows: RowSequence::from(rows),
        outcome,
    })
}

/// Ingest the report at `path`, or standard input when `path` is `-`.
pub fn ingest_path(path: &Path, format: ReportFormat) -> Result<Ingested, Error> {
    if path.as_os_str() == STDIN_PATH {
        return ingest(io::stdin().lock(), format).map_err(|err| err.with_path(path));
    }
    let file = File::open(path).map_err(|err| Error::from_io(err, path))?;
    ingest(file, format).map_err(|err| err.with_path(path))
}
