// src/schema/types.rs

use serde::{Deserialize, Serialize};

/// A single column in the derived destination schema.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct ColumnSpec {
    pub name: String,
    pub ty: String,
}
