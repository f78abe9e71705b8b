//! Streaming ingestion core for delimited-text objects headed to a
//! record-inspection service: decryption-aware line reading, header
//! sanitization, bounded Table batching, and text-typed schema derivation.
//! One object is processed at a time per worker; the binary in `main.rs`
//! owns the worker pool.

pub mod config;
pub mod inspect;
pub mod pipeline;
pub mod schema;
pub mod source;
pub mod table;
