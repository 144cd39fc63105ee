//! Raw, already-decoded input records.

use indexmap::IndexMap;
use serde_json::Value;

/// One decoded source row: field name to JSON value, in source key order.
pub type RawRecord = IndexMap<String, Value>;

/// Check whether a value counts as absent.
///
/// `null`, blank strings and common NA spellings are treated as missing.
pub fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => is_null_text(s),
        _ => false,
    }
}

/// Check if a text cell represents a missing value.
pub fn is_null_text(value: &str) -> bool {
    let trimmed = value.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("n/a")
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("nan")
}

/// Look up a key literally (`"account.Charges.Monthly"` is one key).
pub fn get_literal<'a>(record: &'a RawRecord, key: &str) -> Option<&'a Value> {
    record.get(key)
}

/// Walk a dotted path through nested objects (`"account.Charges.Monthly"` is
/// three hops). A path without dots is a plain top-level lookup.
pub fn get_path<'a>(record: &'a RawRecord, path: &str) -> Option<&'a Value> {
    let mut parts = path.split('.');
    let first = parts.next()?;
    let mut current = record.get(first)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// Look up a field path, preferring a literal dotted key and falling back to a walk.
pub fn get_any<'a>(record: &'a RawRecord, path: &str) -> Option<&'a Value> {
    get_literal(record, path).or_else(|| get_path(record, path))
}

/// All leaf field paths of a record, expanding nested objects into dotted paths.
pub fn leaf_paths(record: &RawRecord) -> Vec<String> {
    let mut paths = Vec::new();
    for (key, value) in record {
        collect_leaves(key, value, &mut paths);
    }
    paths
}

fn collect_leaves(prefix: &str, value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                collect_leaves(&format!("{}.{}", prefix, key), child, out);
            }
        }
        _ => out.push(prefix.to_string()),
    }
}

/// Render a scalar value as text for messages and coercion.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> RawRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_get_path_walks_objects() {
        let r = record(json!({"account": {"Charges": {"Monthly": 29.85}}}));
        assert_eq!(get_path(&r, "account.Charges.Monthly"), Some(&json!(29.85)));
        assert_eq!(get_path(&r, "account.Charges.Total"), None);
        assert_eq!(get_literal(&r, "account.Charges.Monthly"), None);
    }

    #[test]
    fn test_get_any_prefers_literal() {
        let r = record(json!({"account.Contract": "One year"}));
        assert_eq!(get_any(&r, "account.Contract"), Some(&json!("One year")));
    }

    #[test]
    fn test_leaf_paths() {
        let r = record(json!({
            "customerID": "A",
            "customer": {"gender": "F", "tenure": 3},
            "empty": {}
        }));
        let mut paths = leaf_paths(&r);
        paths.sort();
        assert_eq!(
            paths,
            vec!["customer.gender", "customer.tenure", "customerID", "empty"]
        );
    }

    #[test]
    fn test_is_missing() {
        assert!(is_missing(&Value::Null));
        assert!(is_missing(&json!("  ")));
        assert!(is_missing(&json!("N/A")));
        assert!(!is_missing(&json!(0)));
        assert!(!is_missing(&json!(false)));
        assert!(!is_missing(&json!("No")));
    }
}
