// src/inspect/jsonl.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use super::TableSink;
use crate::table::Table;

/// Appends one JSON record per submitted batch to a local file, for runs
/// without an inspection endpoint and for auditing what would be sent.
pub struct JsonlSink {
    out: Mutex<File>,
}

#[derive(Serialize)]
struct BatchRecord<'a> {
    bucket: &'a str,
    object: &'a str,
    submitted_at: DateTime<Utc>,
    table: &'a Table,
}

impl JsonlSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("opening {:?}", path))?;
        Ok(JsonlSink {
            out: Mutex::new(file),
        })
    }
}

impl TableSink for JsonlSink {
    fn submit(&self, bucket: &str, object: &str, table: Table) -> Result<()> {
        let record = BatchRecord {
            bucket,
            object,
            submitted_at: Utc::now(),
            table: &table,
        };
        let mut line = serde_json::to_string(&record).context("encoding batch record")?;
        line.push('\n');

        let mut out = self.out.lock().unwrap();
        out.write_all(line.as_bytes())
            .with_context(|| format!("{}/{}: appending batch record", bucket, object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{FieldId, Row};
    use serde_json::Value;
    use tempfile::tempdir;

    fn table(cell: &str) -> Table {
        Table {
            headers: vec![FieldId::new("h")],
            rows: vec![Row {
                values: vec![cell.to_string()],
            }],
        }
    }

    #[test]
    fn appends_one_record_per_batch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested/out/batches.jsonl");

        let sink = JsonlSink::create(&path).unwrap();
        sink.submit("bucket", "a.csv", table("first")).unwrap();
        sink.submit("bucket", "b.csv", table("second")).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let records: Vec<Value> = contents
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["bucket"], "bucket");
        assert_eq!(records[0]["object"], "a.csv");
        assert_eq!(records[0]["table"]["rows"][0]["values"][0], "first");
        assert_eq!(records[1]["object"], "b.csv");
        assert!(records[0]["submitted_at"].is_string());
    }
}
