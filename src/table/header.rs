// src/table/header.rs

use std::collections::HashSet;

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static NON_IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Turn a raw column label into an identifier that is valid both in the
/// inspection service's table schema and in a destination table schema.
///
/// Each run of whitespace collapses to a single underscore, then every
/// character outside `[A-Za-z0-9_]` is dropped:
/// `"Column 1"` → `"Column_1"`, `"bucket/object"` → `"bucketobject"`,
/// `"'@twitterhandle'"` → `"twitterhandle"`.
///
/// Never fails and is idempotent. An all-punctuation label sanitizes to the
/// empty string; [`sanitize_headers`] treats that as a schema-validity error.
pub fn sanitize_header(raw: &str) -> String {
    let underscored = WHITESPACE_RUN.replace_all(raw, "_");
    NON_IDENTIFIER.replace_all(&underscored, "").into_owned()
}

/// Sanitize every header of one object.
///
/// A label that sanitizes to the empty string fails the whole object rather
/// than producing an unnamed column. Duplicate sanitized names get the first
/// free ordinal suffix (`name`, `name_2`, `name_3`, ...), stepping past
/// already-assigned names, so the output is unique and deterministic and the
/// Table headers always agree with the derived schema.
pub fn sanitize_headers(raws: &[String]) -> Result<Vec<String>> {
    let mut assigned: HashSet<String> = HashSet::with_capacity(raws.len());
    let mut out = Vec::with_capacity(raws.len());

    for (idx, raw) in raws.iter().enumerate() {
        let name = sanitize_header(raw);
        if name.is_empty() {
            bail!(
                "header column {} ({:?}) sanitized to an empty identifier",
                idx + 1,
                raw
            );
        }

        let unique = if assigned.contains(&name) {
            let mut ordinal = 2usize;
            loop {
                let candidate = format!("{}_{}", name, ordinal);
                if !assigned.contains(&candidate) {
                    break candidate;
                }
                ordinal += 1;
            }
        } else {
            name
        };

        assigned.insert(unique.clone());
        out.push(unique);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_known_labels() {
        assert_eq!(sanitize_header("Column 1"), "Column_1");
        assert_eq!(sanitize_header("bucket/object"), "bucketobject");
        assert_eq!(sanitize_header("'@twitterhandle'"), "twitterhandle");
    }

    #[test]
    fn collapses_whitespace_runs_to_one_underscore() {
        assert_eq!(sanitize_header("a \t  b"), "a_b");
        assert_eq!(sanitize_header("  leading"), "_leading");
    }

    #[test]
    fn output_is_identifier_safe_and_idempotent() {
        let samples = [
            "Column 1",
            "bucket/object",
            "'@twitterhandle'",
            "weird!@#$%^&*() name",
            "müller straße",
            "tab\there",
            "",
        ];
        for raw in samples {
            let once = sanitize_header(raw);
            assert!(
                once.chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '_'),
                "{:?} produced {:?}",
                raw,
                once
            );
            assert_eq!(sanitize_header(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn all_punctuation_sanitizes_to_empty() {
        assert_eq!(sanitize_header("'@/#!'"), "");
    }

    #[test]
    fn empty_identifier_fails_the_header_row() {
        let raws = vec!["ok".to_string(), "'@/'".to_string()];
        let err = sanitize_headers(&raws).unwrap_err();
        assert!(err.to_string().contains("column 2"), "got: {}", err);
    }

    #[test]
    fn duplicates_get_ordinal_suffixes() {
        let raws = vec![
            "name".to_string(),
            "name".to_string(),
            "name".to_string(),
        ];
        let out = sanitize_headers(&raws).unwrap();
        assert_eq!(out, vec!["name", "name_2", "name_3"]);
    }

    #[test]
    fn suffixing_steps_past_taken_names() {
        // the duplicate "a" cannot claim a_2, a raw header already holds it
        let raws = vec!["a_2".to_string(), "a".to_string(), "a".to_string()];
        let out = sanitize_headers(&raws).unwrap();
        assert_eq!(out, vec!["a_2", "a", "a_3"]);

        // and the reverse order pushes the later literal a_2 off its name
        let raws = vec!["a".to_string(), "a".to_string(), "a_2".to_string()];
        let out = sanitize_headers(&raws).unwrap();
        assert_eq!(out, vec!["a", "a_2", "a_2_2"]);
    }

    #[test]
    fn distinct_raws_colliding_after_sanitization_are_disambiguated() {
        let raws = vec!["user id".to_string(), "user_id".to_string()];
        let out = sanitize_headers(&raws).unwrap();
        assert_eq!(out, vec!["user_id", "user_id_2"]);
    }
}
