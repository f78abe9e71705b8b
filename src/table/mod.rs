// src/table/mod.rs

use serde::{Deserialize, Serialize};

pub mod build;
pub mod header;

pub use build::{build_table, row_from_line, BatchLimits, TableBatcher};
pub use header::{sanitize_header, sanitize_headers};

/// A named field in a table header.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct FieldId {
    pub name: String,
}

impl FieldId {
    pub fn new(name: impl Into<String>) -> Self {
        FieldId { name: name.into() }
    }
}

/// One row of cell values. Cells are always strings; downstream typing
/// happens in the destination warehouse, not here.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Default)]
pub struct Row {
    pub values: Vec<String>,
}

/// A header plus a block of rows, the unit handed to an inspection sink.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq)]
pub struct Table {
    pub headers: Vec<FieldId>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
