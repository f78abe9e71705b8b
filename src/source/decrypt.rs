// src/source/decrypt.rs

use aes::Aes256;
use anyhow::{anyhow, bail, Context, Result};
use ctr::cipher::{KeyIvInit, StreamCipher};
use std::io::Read;

pub(crate) type Aes256Ctr = ctr::Ctr128BE<Aes256>;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;

/// Streaming decryption over any byte source. The first [`IV_LEN`] bytes of
/// the stream are the initialization vector; everything after is AES-256-CTR
/// ciphertext, decrypted in place as it is read.
pub struct DecryptingReader<R: Read> {
    inner: R,
    cipher: Aes256Ctr,
}

impl<R: Read> DecryptingReader<R> {
    pub fn new(mut inner: R, key: &[u8]) -> Result<Self> {
        if key.len() != KEY_LEN {
            bail!(
                "decryption key must be {} bytes, got {}",
                KEY_LEN,
                key.len()
            );
        }

        let mut iv = [0u8; IV_LEN];
        inner
            .read_exact(&mut iv)
            .context("reading initialization vector from stream head")?;

        let cipher = Aes256Ctr::new_from_slices(key, &iv)
            .map_err(|e| anyhow!("initializing cipher: {}", e))?;

        Ok(DecryptingReader { inner, cipher })
    }
}

impl<R: Read> Read for DecryptingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.cipher.apply_keystream(&mut buf[..n]);
        Ok(n)
    }
}
