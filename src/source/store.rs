// src/source/store.rs

use anyhow::{ensure, Context, Result};
use glob::{glob, Pattern};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::warn;
use url::Url;

/// Extract the bucket name from a source location such as `gs://name/` or
/// `s3://name/prefix`. Plain paths fall back to their final component, and
/// a bare name comes back unchanged.
pub fn parse_bucket_name(location: &str) -> String {
    if let Ok(url) = Url::parse(location) {
        if let Some(host) = url.host_str() {
            return host.to_string();
        }
    }
    Path::new(location.trim_end_matches('/'))
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| location.to_string())
}

/// Object store rooted at a local directory, standing in for a bucket:
/// object names are slash-separated paths relative to the root.
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure!(root.is_dir(), "source root {:?} is not a directory", root);
        Ok(FsObjectStore { root })
    }

    /// List object names under the root matching `pattern`, sorted so runs
    /// are deterministic.
    pub fn list(&self, pattern: &str) -> Result<Vec<String>> {
        // the root is a literal path, only the caller's pattern globs
        let root = Pattern::escape(&self.root.display().to_string());
        let full = format!("{}/{}", root, pattern);

        let mut objects = Vec::new();
        for entry in glob(&full).with_context(|| format!("invalid object pattern {}", pattern))? {
            let path = match entry {
                Ok(p) => p,
                Err(e) => {
                    warn!("cannot read listing entry: {:?}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }
            let rel = path.strip_prefix(&self.root).unwrap_or(&path);
            objects.push(rel.to_string_lossy().into_owned());
        }
        objects.sort();
        Ok(objects)
    }

    /// Open one object for reading.
    pub fn open(&self, object: &str) -> Result<File> {
        let path = self.root.join(object);
        File::open(&path).with_context(|| format!("opening object {:?}", path))
    }
}
