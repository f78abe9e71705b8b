// src/source/reader.rs

use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read};

use super::decrypt::DecryptingReader;
use super::keys::KeyMaterialProvider;

enum Decoded<R: Read> {
    Plain(R),
    Decrypted(DecryptingReader<R>),
}

impl<R: Read> Read for Decoded<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self {
            Decoded::Plain(r) => r.read(buf),
            Decoded::Decrypted(r) => r.read(buf),
        }
    }
}

/// Line-oriented view over one object's byte stream, decrypting on the way
/// through when the caller's encryption verdict requires it.
pub struct ObjectLines<R: Read> {
    reader: BufReader<Decoded<R>>,
    buf: Vec<u8>,
}

impl<R: Read> ObjectLines<R> {
    /// Open a decoded line reader over `stream`.
    ///
    /// `encrypted` is the caller-computed verdict from `is_encrypted`. When
    /// true, a key-material provider is required and the stream is wrapped
    /// in decryption; fetch or cipher setup failure makes the whole object
    /// unreadable, there is no plaintext fallback. When false the stream is
    /// read as-is and any provider goes unused.
    pub fn open(
        encrypted: bool,
        bucket: &str,
        object: &str,
        stream: R,
        key_name: Option<&str>,
        keys: Option<&dyn KeyMaterialProvider>,
    ) -> Result<Self> {
        let decoded = if encrypted {
            let keys = keys.with_context(|| {
                format!(
                    "{}/{}: object is encrypted but no key material provider was supplied",
                    bucket, object
                )
            })?;
            let material = keys
                .fetch(key_name)
                .with_context(|| format!("{}/{}: fetching key material", bucket, object))?;
            let inner = DecryptingReader::new(stream, &material)
                .with_context(|| format!("{}/{}: starting decryption", bucket, object))?;
            Decoded::Decrypted(inner)
        } else {
            Decoded::Plain(stream)
        };

        Ok(ObjectLines {
            reader: BufReader::new(decoded),
            buf: Vec::new(),
        })
    }

    /// Pull the next line, without its terminator. Returns `Ok(None)` at end
    /// of stream. Bytes that are not valid UTF-8 are replaced rather than
    /// dropped so cell positions stay stable.
    pub fn next_line(&mut self) -> Result<Option<String>> {
        self.buf.clear();
        let n = self
            .reader
            .read_until(b'\n', &mut self.buf)
            .context("reading line from object stream")?;
        if n == 0 {
            return Ok(None);
        }
        if self.buf.last() == Some(&b'\n') {
            self.buf.pop();
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
        }
        Ok(Some(String::from_utf8_lossy(&self.buf).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::super::decrypt::{Aes256Ctr, IV_LEN, KEY_LEN};
    use super::super::keys::StaticKeyProvider;
    use super::*;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use ctr::cipher::{KeyIvInit, StreamCipher};
    use std::io::Cursor;

    fn drain<R: Read>(mut lines: ObjectLines<R>) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = lines.next_line().unwrap() {
            out.push(line);
        }
        out
    }

    #[test]
    fn plaintext_lines_with_mixed_terminators() {
        let stream = Cursor::new(b"id,name\n1,ada\r\n2,grace".to_vec());
        let lines = ObjectLines::open(false, "b", "o", stream, None, None).unwrap();
        assert_eq!(drain(lines), vec!["id,name", "1,ada", "2,grace"]);
    }

    #[test]
    fn blank_lines_are_preserved() {
        let stream = Cursor::new(b"a\n\nb\n".to_vec());
        let lines = ObjectLines::open(false, "b", "o", stream, None, None).unwrap();
        assert_eq!(drain(lines), vec!["a", "", "b"]);
    }

    #[test]
    fn eof_is_stable() {
        let stream = Cursor::new(Vec::new());
        let mut lines = ObjectLines::open(false, "b", "o", stream, None, None).unwrap();
        assert!(lines.next_line().unwrap().is_none());
        assert!(lines.next_line().unwrap().is_none());
    }

    #[test]
    fn invalid_utf8_is_replaced_not_dropped() {
        let stream = Cursor::new(b"caf\xff,x\n".to_vec());
        let mut lines = ObjectLines::open(false, "b", "o", stream, None, None).unwrap();
        let line = lines.next_line().unwrap().unwrap();
        assert!(line.contains('\u{FFFD}'));
        assert_eq!(line.split(',').count(), 2);
    }

    #[test]
    fn encrypted_without_provider_is_fatal() {
        let stream = Cursor::new(vec![0u8; 32]);
        let err = ObjectLines::open(true, "b", "o", stream, Some("k"), None)
            .map(|_| ())
            .unwrap_err();
        assert!(err.to_string().contains("no key material provider"));
    }

    #[test]
    fn encrypted_stream_round_trips() {
        let key = [5u8; KEY_LEN];
        let iv = [2u8; IV_LEN];
        let mut body = b"h1,h2\nv1,v2\n".to_vec();
        Aes256Ctr::new_from_slices(&key, &iv)
            .unwrap()
            .apply_keystream(&mut body);
        let mut ciphertext = iv.to_vec();
        ciphertext.extend_from_slice(&body);

        let mut keys = StaticKeyProvider::new();
        keys.insert("data-key", STANDARD.encode(key));

        let lines = ObjectLines::open(
            true,
            "b",
            "o",
            Cursor::new(ciphertext),
            Some("data-key"),
            Some(&keys),
        )
        .unwrap();
        assert_eq!(drain(lines), vec!["h1,h2", "v1,v2"]);
    }
}
