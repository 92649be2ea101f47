//! Lenient field access on semi-structured documents.

use serde_json::Value;

use crate::source::Document;

/// Read a numeric field. Numeric strings are accepted; anything else
/// (missing, `null`, `""`, objects) reads as `None`.
pub fn number(doc: &Document, field: &str) -> Option<f64> {
    match doc.get(field)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Like [`number`] but folds a missing value into `NaN`.
pub fn number_or_nan(doc: &Document, field: &str) -> f64 {
    number(doc, field).unwrap_or(f64::NAN)
}

/// The nested object stored under `key`, if there is one.
pub fn sub_record<'a>(doc: &'a Document, key: &str) -> Option<&'a Document> {
    doc.get(key)?.as_object()
}

/// Text field, if present and a string.
pub fn text<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.get(field)?.as_str()
}

/// Whether `field` holds exactly the empty string.
pub fn is_blank(doc: &Document, field: &str) -> bool {
    matches!(doc.get(field), Some(Value::String(s)) if s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_number_variants() {
        let d = doc(json!({ "a": 3, "b": 2.5, "c": " 7.25 ", "d": "", "e": null, "f": {} }));
        assert_eq!(number(&d, "a"), Some(3.0));
        assert_eq!(number(&d, "b"), Some(2.5));
        assert_eq!(number(&d, "c"), Some(7.25));
        assert_eq!(number(&d, "d"), None);
        assert_eq!(number(&d, "e"), None);
        assert_eq!(number(&d, "f"), None);
        assert_eq!(number(&d, "missing"), None);
        assert!(number_or_nan(&d, "missing").is_nan());
    }

    #[test]
    fn test_sub_record_and_blank() {
        let d = doc(json!({ "smp": { "consumed_sus": 10 }, "gpu": "", "label": "x" }));
        assert_eq!(sub_record(&d, "smp").and_then(|s| number(s, "consumed_sus")), Some(10.0));
        assert!(sub_record(&d, "gpu").is_none());
        assert!(is_blank(&d, "gpu"));
        assert!(!is_blank(&d, "smp"));
        assert!(!is_blank(&d, "missing"));
        assert_eq!(text(&d, "label"), Some("x"));
    }
}
