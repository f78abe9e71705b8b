// src/inspect/http.rs

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::TableSink;
use crate::table::Table;

/// Submits batches to a content-inspection endpoint as JSON.
pub struct HttpSink {
    client: Client,
    url: String,
    inspect_template: Option<String>,
    deidentify_template: Option<String>,
}

#[derive(Serialize)]
struct InspectRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    inspect_template: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    deidentify_template: Option<&'a str>,
    item: Item,
}

#[derive(Serialize)]
struct Item {
    table: Table,
}

impl HttpSink {
    pub fn new(
        url: impl Into<String>,
        inspect_template: Option<String>,
        deidentify_template: Option<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("building HTTP client")?;
        Ok(HttpSink {
            client,
            url: url.into(),
            inspect_template,
            deidentify_template,
        })
    }
}

impl TableSink for HttpSink {
    fn submit(&self, bucket: &str, object: &str, table: Table) -> Result<()> {
        let rows = table.row_count();
        let request = InspectRequest {
            inspect_template: self.inspect_template.as_deref(),
            deidentify_template: self.deidentify_template.as_deref(),
            item: Item { table },
        };

        self.client
            .post(&self.url)
            .json(&request)
            .send()
            .with_context(|| format!("{}/{}: POST {} failed", bucket, object, self.url))?
            .error_for_status()
            .with_context(|| format!("{}/{}: inspection endpoint rejected batch", bucket, object))?;

        debug!(bucket, object, rows, "submitted batch");
        Ok(())
    }
}
