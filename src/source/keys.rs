// src/source/keys.rs

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::collections::HashMap;

/// Source of decryption key material. Providers are shared read-only across
/// workers, so `fetch` must be safe to call concurrently.
pub trait KeyMaterialProvider: Send + Sync {
    /// Fetch raw key bytes. `key_name` selects a named key when given;
    /// providers may fall back to a default when the name is absent or
    /// not registered with them.
    fn fetch(&self, key_name: Option<&str>) -> Result<Vec<u8>>;
}

/// In-memory provider for base64-encoded key material, covering
/// customer-supplied keys carried in configuration.
#[derive(Debug, Default)]
pub struct StaticKeyProvider {
    named: HashMap<String, String>,
    default_material: Option<String>,
}

impl StaticKeyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register base64 key material under a name.
    pub fn insert(&mut self, name: impl Into<String>, material_b64: impl Into<String>) {
        self.named.insert(name.into(), material_b64.into());
    }

    /// Material handed out when no named key matches.
    pub fn set_default(&mut self, material_b64: impl Into<String>) {
        self.default_material = Some(material_b64.into());
    }
}

impl KeyMaterialProvider for StaticKeyProvider {
    fn fetch(&self, key_name: Option<&str>) -> Result<Vec<u8>> {
        let material = key_name
            .and_then(|name| self.named.get(name))
            .or(self.default_material.as_ref())
            .with_context(|| match key_name {
                Some(name) => format!("no key material registered for key {}", name),
                None => "no default key material registered".to_string(),
            })?;

        STANDARD
            .decode(material)
            .context("key material is not valid base64")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;

    #[test]
    fn named_lookup_returns_decoded_bytes() {
        let mut keys = StaticKeyProvider::new();
        keys.insert("primary", STANDARD.encode(b"0123456789abcdef"));

        let material = keys.fetch(Some("primary")).unwrap();
        assert_eq!(material, b"0123456789abcdef");
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        let mut keys = StaticKeyProvider::new();
        keys.set_default(STANDARD.encode(b"fallback-material"));

        let material = keys.fetch(Some("not-registered")).unwrap();
        assert_eq!(material, b"fallback-material");
    }

    #[test]
    fn no_material_at_all_is_an_error() {
        let keys = StaticKeyProvider::new();
        let err = keys.fetch(Some("ghost")).unwrap_err();
        assert!(err.to_string().contains("ghost"));

        assert!(keys.fetch(None).is_err());
    }

    #[test]
    fn invalid_base64_is_an_error() {
        let mut keys = StaticKeyProvider::new();
        keys.insert("bad", "!!not base64!!");
        let err = keys.fetch(Some("bad")).unwrap_err();
        assert!(err.to_string().contains("base64"));
    }
}
