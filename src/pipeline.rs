// src/pipeline.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Read;
use tracing::{info, instrument};

use crate::config::DecryptionOptions;
use crate::inspect::TableSink;
use crate::schema::{build_schema, ColumnSpec};
use crate::source::{is_encrypted, KeyMaterialProvider, ObjectLines};
use crate::table::{row_from_line, sanitize_headers, BatchLimits, FieldId, TableBatcher};

/// Summary of one fully processed object.
#[derive(Debug, Serialize)]
pub struct ObjectOutcome {
    pub bucket: String,
    pub object: String,
    pub schema: Vec<ColumnSpec>,
    pub lines_read: u64,
    pub rows_submitted: u64,
    pub rows_skipped: u64,
    pub batches: u64,
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
}

/// Run one object end to end and hand each full batch of body rows to the
/// sink. The first line becomes the sanitized header and drives the schema.
/// A failed submission abandons the object; rows still pending for it are
/// never re-sent.
#[instrument(level = "info", skip(limits, decryption, stream, keys, sink))]
pub fn process_object(
    limits: BatchLimits,
    decryption: &DecryptionOptions,
    bucket: &str,
    object: &str,
    stream: impl Read,
    keys: Option<&dyn KeyMaterialProvider>,
    sink: &dyn TableSink,
) -> Result<ObjectOutcome> {
    let started = Utc::now();

    let encrypted = is_encrypted(
        decryption.key_name.as_deref(),
        decryption.wrapped_key.as_deref(),
        decryption.key_hash.as_deref(),
        decryption.kms_project.as_deref(),
    );

    let mut lines = ObjectLines::open(
        encrypted,
        bucket,
        object,
        stream,
        decryption.key_name.as_deref(),
        keys,
    )?;

    let header_line = lines
        .next_line()
        .with_context(|| format!("{}/{}: reading header", bucket, object))?
        .with_context(|| format!("{}/{}: object is empty, no header row", bucket, object))?;

    let raw_headers = row_from_line(&header_line).values;
    let headers = sanitize_headers(&raw_headers)
        .with_context(|| format!("{}/{}: sanitizing header", bucket, object))?;
    let schema = build_schema(&headers);
    let field_ids: Vec<FieldId> = headers.into_iter().map(FieldId::new).collect();

    let mut batcher = TableBatcher::new(field_ids, limits);
    let mut lines_read: u64 = 1;
    let mut batches: u64 = 0;

    while let Some(line) = lines
        .next_line()
        .with_context(|| format!("{}/{}: reading body", bucket, object))?
    {
        lines_read += 1;
        if let Some(table) = batcher.push(&line) {
            sink.submit(bucket, object, table)
                .with_context(|| format!("{}/{}: submitting batch", bucket, object))?;
            batches += 1;
        }
    }

    if let Some(table) = batcher.finish() {
        sink.submit(bucket, object, table)
            .with_context(|| format!("{}/{}: submitting final batch", bucket, object))?;
        batches += 1;
    }

    let outcome = ObjectOutcome {
        bucket: bucket.to_string(),
        object: object.to_string(),
        schema,
        lines_read,
        rows_submitted: batcher.rows_batched(),
        rows_skipped: batcher.rows_skipped(),
        batches,
        started,
        finished: Utc::now(),
    };

    info!(
        rows = outcome.rows_submitted,
        skipped = outcome.rows_skipped,
        batches = outcome.batches,
        "object processed"
    );

    Ok(outcome)
}
