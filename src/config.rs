// src/config.rs

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::source::parse_bucket_name;
use crate::table::BatchLimits;

/// Decryption context for source objects. All values are optional; leaving
/// the bundle empty reads every object as plaintext.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DecryptionOptions {
    pub key_name: Option<String>,
    pub wrapped_key: Option<String>,
    pub key_hash: Option<String>,
    pub kms_project: Option<String>,
}

fn default_object_glob() -> String {
    "**/*.csv".to_string()
}

fn default_batch_size() -> usize {
    100
}

fn default_workers() -> usize {
    4
}

fn default_dataset() -> String {
    "inspection".to_string()
}

/// Run configuration, loaded from a YAML file.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineOptions {
    /// Source location, e.g. `gs://bucket/` or a local directory.
    pub source: String,
    /// Bucket name override; derived from `source` when absent.
    pub bucket: Option<String>,
    #[serde(default = "default_object_glob")]
    pub object_glob: String,
    /// Rows per outbound table batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Optional byte cap per batch, on top of the row cap.
    pub max_batch_bytes: Option<usize>,
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Inspection endpoint; when absent, batches go to `output_file`.
    pub inspect_url: Option<String>,
    pub inspect_template: Option<String>,
    pub deidentify_template: Option<String>,
    /// JSONL destination for batches when no endpoint is configured.
    pub output_file: Option<String>,
    /// Directory for generated CREATE TABLE statements, one per object.
    pub ddl_dir: Option<String>,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default)]
    pub decryption: DecryptionOptions,
}

impl PipelineOptions {
    /// Load options from a YAML file and validate them.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("reading configuration {:?}", path))?;
        let opts: PipelineOptions = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing configuration {:?}", path))?;
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.batch_size >= 1, "batch_size must be at least 1");
        ensure!(self.workers >= 1, "workers must be at least 1");
        if let Some(max) = self.max_batch_bytes {
            ensure!(max >= 1, "max_batch_bytes must be at least 1 when set");
        }
        ensure!(
            self.inspect_url.is_some() || self.output_file.is_some(),
            "configure at least one of inspect_url or output_file"
        );
        Ok(())
    }

    /// Bucket name for logging and submission metadata.
    pub fn bucket_name(&self) -> String {
        self.bucket
            .clone()
            .unwrap_or_else(|| parse_bucket_name(&self.source))
    }

    pub fn limits(&self) -> BatchLimits {
        BatchLimits {
            max_rows: self.batch_size,
            max_bytes: self.max_batch_bytes,
        }
    }
}
