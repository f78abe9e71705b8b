// src/source/detect.rs

use tracing::debug;

/// Decide whether an object must be decrypted before reading.
///
/// Only the configuration values that prove encryption is in use count:
/// the wrapped key, the key hash, and the key-management project. The key
/// name merely identifies which key to fetch, so on its own it never
/// triggers decryption. Absent values are a plaintext signal, not an error.
pub fn is_encrypted(
    key_name: Option<&str>,
    wrapped_key: Option<&str>,
    key_hash: Option<&str>,
    kms_project: Option<&str>,
) -> bool {
    let present = |v: Option<&str>| v.map(|s| !s.is_empty()).unwrap_or(false);
    let encrypted = present(wrapped_key) || present(key_hash) || present(kms_project);

    if encrypted {
        match key_name {
            Some(name) => debug!(key = name, "object carries encryption context"),
            None => debug!("object carries encryption context without a named key"),
        }
    }
    encrypted
}
