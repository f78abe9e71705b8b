use anyhow::{bail, Context, Result};
use scrubline::{
    config::PipelineOptions,
    inspect::{HttpSink, JsonlSink, TableSink},
    pipeline::{self, ObjectOutcome},
    schema::{create_table_ddl, table_name_for_object},
    source::{FsObjectStore, KeyMaterialProvider, StaticKeyProvider},
};
use std::{env, fs, path::PathBuf, sync::Arc};
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) load configuration ───────────────────────────────────────
    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "scrubline.yaml".to_string());
    let cfg = PipelineOptions::load(&config_path)?;
    let bucket = cfg.bucket_name();
    info!(config = %config_path, bucket = %bucket, "configured");

    // ─── 3) build store, keys and sink ───────────────────────────────
    let store = Arc::new(
        FsObjectStore::new(&cfg.source)
            .with_context(|| format!("opening source {}", cfg.source))?,
    );
    let keys = build_key_provider(&cfg);
    let sink = build_sink(&cfg)?;

    // ─── 4) list objects ─────────────────────────────────────────────
    let objects = store.list(&cfg.object_glob)?;
    if objects.is_empty() {
        info!("no objects match {}; exit", cfg.object_glob);
        return Ok(());
    }
    info!("{} objects to process", objects.len());

    // ─── 5) spawn one worker per object ──────────────────────────────
    let (tx, mut rx) = mpsc::channel::<Result<ObjectOutcome, (String, String)>>(100);
    let sem = Arc::new(Semaphore::new(cfg.workers));
    let mut handles = Vec::with_capacity(objects.len());

    for object in objects {
        let tx = tx.clone();
        let sem = sem.clone();
        let store = store.clone();
        let sink = sink.clone();
        let keys = keys.clone();
        let decryption = cfg.decryption.clone();
        let limits = cfg.limits();
        let bucket = bucket.clone();

        handles.push(tokio::spawn(async move {
            let _permit = sem.acquire().await.unwrap();
            info!(object = %object, "processing");

            let task_object = object.clone();
            let outcome = tokio::task::spawn_blocking(move || {
                let stream = store.open(&task_object)?;
                pipeline::process_object(
                    limits,
                    &decryption,
                    &bucket,
                    &task_object,
                    stream,
                    keys.as_deref(),
                    sink.as_ref(),
                )
            })
            .await;

            match outcome {
                Ok(Ok(outcome)) => {
                    let _ = tx.send(Ok(outcome)).await;
                }
                Ok(Err(err)) => {
                    error!("{} failed: {:#}", object, err);
                    let _ = tx.send(Err((object, format!("{:#}", err)))).await;
                }
                Err(join_err) => {
                    error!("{} worker panicked: {}", object, join_err);
                    let _ = tx.send(Err((object, join_err.to_string()))).await;
                }
            }
        }));
    }
    // drop the original sender so `rx.recv()` ends once all workers finish
    drop(tx);

    // ─── 6) gather outcomes, write DDL ───────────────────────────────
    let ddl_dir = cfg.ddl_dir.as_ref().map(PathBuf::from);
    if let Some(dir) = &ddl_dir {
        fs::create_dir_all(dir).with_context(|| format!("creating {:?}", dir))?;
    }

    let mut succeeded = 0usize;
    let mut failed = 0usize;

    while let Some(msg) = rx.recv().await {
        match msg {
            Ok(outcome) => {
                info!(
                    object = %outcome.object,
                    rows = outcome.rows_submitted,
                    skipped = outcome.rows_skipped,
                    batches = outcome.batches,
                    "done"
                );

                if let Some(dir) = &ddl_dir {
                    let table = table_name_for_object(&outcome.object);
                    let ddl = create_table_ddl(&cfg.dataset, &table, &outcome.schema);
                    let path = dir.join(format!("{}.sql", table));
                    if let Err(e) = fs::write(&path, ddl) {
                        error!("writing {} failed: {}", path.display(), e);
                    }
                }
                succeeded += 1;
            }
            Err((object, err)) => {
                error!("{} not processed: {}", object, err);
                failed += 1;
            }
        }
    }

    // ─── 7) await workers ────────────────────────────────────────────
    for h in handles {
        let _ = h.await;
    }

    info!(succeeded, failed, "all objects handled");
    if succeeded == 0 {
        bail!("no objects processed successfully");
    }
    Ok(())
}

/// Key material comes from configuration: the wrapped key is the default
/// material, additionally registered under the configured key name when one
/// is set. No wrapped key means no provider, and encrypted objects fail.
fn build_key_provider(cfg: &PipelineOptions) -> Option<Arc<dyn KeyMaterialProvider>> {
    let wrapped = cfg.decryption.wrapped_key.as_ref()?;
    let mut provider = StaticKeyProvider::new();
    provider.set_default(wrapped.clone());
    if let Some(name) = &cfg.decryption.key_name {
        provider.insert(name.clone(), wrapped.clone());
    }
    Some(Arc::new(provider))
}

fn build_sink(cfg: &PipelineOptions) -> Result<Arc<dyn TableSink>> {
    if let Some(url) = &cfg.inspect_url {
        info!(url = %url, "submitting batches to inspection endpoint");
        return Ok(Arc::new(HttpSink::new(
            url.clone(),
            cfg.inspect_template.clone(),
            cfg.deidentify_template.clone(),
        )?));
    }
    let path = cfg
        .output_file
        .as_ref()
        .context("no inspect_url and no output_file configured")?;
    info!(path = %path, "writing batches to local file");
    Ok(Arc::new(JsonlSink::create(path)?))
}
