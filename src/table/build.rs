// src/table/build.rs

use anyhow::Result;
use std::mem;
use tracing::warn;

use super::header::sanitize_headers;
use super::{FieldId, Row, Table};

/// Split one delimited line into a row of string cells.
///
/// Splitting is a plain comma split. Quoting and embedded delimiters are
/// not interpreted; the inspection service sees cells exactly as they sit
/// between commas.
pub fn row_from_line(line: &str) -> Row {
    Row {
        values: line.split(',').map(|v| v.to_string()).collect(),
    }
}

/// Build a single table from raw header labels and body lines.
///
/// Headers are sanitized into identifier-safe names first. Body lines are
/// split with [`row_from_line`] and kept in input order. No width check is
/// applied here; callers that need one go through [`TableBatcher`].
pub fn build_table(raw_headers: &[String], lines: &[String]) -> Result<Table> {
    let headers = sanitize_headers(raw_headers)?
        .into_iter()
        .map(FieldId::new)
        .collect();
    let rows = lines.iter().map(|l| row_from_line(l)).collect();
    Ok(Table { headers, rows })
}

/// Bounds for a single batch. `max_rows` always applies; `max_bytes`
/// additionally caps the summed line bytes when set.
#[derive(Debug, Clone, Copy)]
pub struct BatchLimits {
    pub max_rows: usize,
    pub max_bytes: Option<usize>,
}

impl Default for BatchLimits {
    fn default() -> Self {
        BatchLimits {
            max_rows: 100,
            max_bytes: None,
        }
    }
}

/// Groups incoming body lines into bounded [`Table`] batches that all share
/// one header. Lines whose cell count does not match the header width are
/// skipped with a warning rather than padded or truncated.
pub struct TableBatcher {
    headers: Vec<FieldId>,
    limits: BatchLimits,
    pending: Vec<Row>,
    pending_bytes: usize,
    lines_seen: u64,
    rows_batched: u64,
    rows_skipped: u64,
}

impl TableBatcher {
    pub fn new(headers: Vec<FieldId>, limits: BatchLimits) -> Self {
        TableBatcher {
            headers,
            limits,
            pending: Vec::new(),
            pending_bytes: 0,
            lines_seen: 0,
            rows_batched: 0,
            rows_skipped: 0,
        }
    }

    /// How many body rows have been placed into batches so far.
    pub fn rows_batched(&self) -> u64 {
        self.rows_batched
    }

    /// How many body lines were rejected for not matching the header width.
    pub fn rows_skipped(&self) -> u64 {
        self.rows_skipped
    }

    /// Feed one body line. Returns a full batch when a bound is reached,
    /// otherwise `None`.
    pub fn push(&mut self, line: &str) -> Option<Table> {
        self.lines_seen += 1;

        let row = row_from_line(line);
        if row.values.len() != self.headers.len() {
            warn!(
                line = self.lines_seen,
                expected = self.headers.len(),
                actual = row.values.len(),
                "skipping row that does not match header width"
            );
            self.rows_skipped += 1;
            return None;
        }

        self.pending_bytes += line.len();
        self.pending.push(row);
        self.rows_batched += 1;

        let over_rows = self.pending.len() >= self.limits.max_rows;
        let over_bytes = self
            .limits
            .max_bytes
            .map(|max| self.pending_bytes >= max)
            .unwrap_or(false);

        if over_rows || over_bytes {
            return Some(self.take_batch());
        }
        None
    }

    /// Flush whatever rows remain once the input is exhausted.
    pub fn finish(&mut self) -> Option<Table> {
        if self.pending.is_empty() {
            return None;
        }
        Some(self.take_batch())
    }

    fn take_batch(&mut self) -> Table {
        self.pending_bytes = 0;
        Table {
            headers: self.headers.clone(),
            rows: mem::take(&mut self.pending),
        }
    }
}
