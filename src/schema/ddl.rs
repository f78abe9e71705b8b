// src/schema/ddl.rs

use std::path::Path;

use super::types::ColumnSpec;
use crate::table::sanitize_header;

/// Render the `CREATE TABLE` statement for an object's derived schema.
///
/// Columns the deriver emits are all `text`, which lands as `STRING` in the
/// destination warehouse; anything else in a column spec passes through
/// untouched.
pub fn create_table_ddl(dataset: &str, table: &str, cols: &[ColumnSpec]) -> String {
    let column_lines = cols
        .iter()
        .map(|col| {
            let sql_ty = match col.ty.as_str() {
                "text" => "STRING",
                other => other,
            };
            format!("  `{}` {}", col.name, sql_ty)
        })
        .collect::<Vec<_>>()
        .join(",\n");

    format!(
        "CREATE TABLE IF NOT EXISTS `{dataset}.{table}` (\n{column_lines}\n);\n",
        dataset = dataset,
        table = table,
        column_lines = column_lines,
    )
}

/// Derive a destination table name from an object path. Each path component
/// is made identifier-safe and the extension is dropped; components join
/// with `_`, so objects sharing a file name under different prefixes map to
/// distinct tables. A path that sanitizes away entirely falls back to
/// `object`.
pub fn table_name_for_object(object: &str) -> String {
    let path = Path::new(object);

    let mut parts: Vec<String> = Vec::new();
    if let Some(parent) = path.parent() {
        for component in parent.components() {
            parts.push(sanitize_header(&component.as_os_str().to_string_lossy()));
        }
    }
    if let Some(stem) = path.file_stem() {
        parts.push(sanitize_header(&stem.to_string_lossy()));
    }
    parts.retain(|part| !part.is_empty());

    if parts.is_empty() {
        "object".to_string()
    } else {
        parts.join("_")
    }
}
