use anyhow::Result;

use crate::table::Table;

pub mod http;
pub mod jsonl;

pub use http::HttpSink;
pub use jsonl::JsonlSink;

/// Destination for built table batches. Sinks are shared across workers and
/// may be called concurrently, one call per batch.
pub trait TableSink: Send + Sync {
    fn submit(&self, bucket: &str, object: &str, table: Table) -> Result<()>;
}
