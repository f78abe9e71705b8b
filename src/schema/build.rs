// src/schema/build.rs

use super::types::ColumnSpec;

/// Every derived column carries this type. Cell values stay strings all the
/// way through inspection, so the destination schema never guesses at
/// numerics or dates.
pub const TEXT_TYPE: &str = "text";

/// Derive the destination schema for a set of sanitized header names, one
/// text column per header, in header order.
pub fn build_schema(headers: &[String]) -> Vec<ColumnSpec> {
    headers
        .iter()
        .map(|name| ColumnSpec {
            name: name.clone(),
            ty: TEXT_TYPE.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_text_column_per_header() {
        let headers = vec!["Column1".to_string(), "Column2".to_string()];
        let schema = build_schema(&headers);

        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0].name, "Column1");
        assert_eq!(schema[1].name, "Column2");
        assert_eq!(schema[0].ty, "text");
        assert_eq!(schema[1].ty, "text");
    }

    #[test]
    fn empty_headers_give_empty_schema() {
        assert!(build_schema(&[]).is_empty());
    }
}
