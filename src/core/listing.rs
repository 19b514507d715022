// ReqScope - core/listing.rs
//
// Log file name bookkeeping shared by the poller and the log sources.
//
// The backend names each log `<epoch-millis>_<hash>.json`, so the newest
// file is the one with the greatest numeric prefix. The listing endpoint
// returns either a bare JSON array of names or `{ "files": [...] }`.
// Core layer: pure logic, no I/O.

use serde_json::Value;

/// Numeric timestamp prefix of a log file name (the part before the first
/// `_`). Names without a numeric prefix count as 0.
pub fn file_timestamp(name: &str) -> u64 {
    name.split('_')
        .next()
        .and_then(|prefix| prefix.parse::<u64>().ok())
        .unwrap_or(0)
}

/// The newest name in `names` by [`file_timestamp`].
///
/// On a tie the earlier-listed name wins. Returns `None` for an empty list.
pub fn latest_file_name(names: &[String]) -> Option<&str> {
    let mut iter = names.iter();
    let mut latest = iter.next()?;
    for current in iter {
        if file_timestamp(current) > file_timestamp(latest) {
            latest = current;
        }
    }
    Some(latest.as_str())
}

/// Names that come after `latest` in sorted order.
///
/// `latest = None` returns every name; a `latest` that is not in the list
/// also returns every name, so a client whose newest file was deleted
/// re-synchronises instead of stalling.
pub fn newer_files(mut all: Vec<String>, latest: Option<&str>) -> Vec<String> {
    all.sort();
    let Some(latest) = latest else {
        return all;
    };
    match all.iter().position(|name| name == latest) {
        Some(idx) => all.split_off(idx + 1),
        None => all,
    }
}

/// Decode a listing response body into file names.
///
/// Accepts a bare array or an object with a `files` array. Non-string items
/// are skipped; any other shape yields an empty list.
pub fn parse_listing(value: &Value) -> Vec<String> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(map) => match map.get("files") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    items
        .iter()
        .filter_map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Whether `name` can be joined onto the logs directory or URL safely.
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && !name.contains("..")
        && !name.contains('/')
        && !name.contains('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_file_timestamp() {
        assert_eq!(file_timestamp("1714557600000_123.json"), 1714557600000);
        assert_eq!(file_timestamp("1714557600000.json"), 0);
        assert_eq!(file_timestamp("abc_1.json"), 0);
        assert_eq!(file_timestamp(""), 0);
    }

    #[test]
    fn test_latest_file_name_by_numeric_prefix() {
        // "900_x" sorts after "1000_y" as text but is older numerically.
        let list = names(&["1000_y.json", "900_x.json", "1500_z.json", "1200_a.json"]);
        assert_eq!(latest_file_name(&list), Some("1500_z.json"));
    }

    #[test]
    fn test_latest_file_name_tie_keeps_first() {
        let list = names(&["100_a.json", "100_b.json"]);
        assert_eq!(latest_file_name(&list), Some("100_a.json"));
    }

    #[test]
    fn test_latest_file_name_empty() {
        assert_eq!(latest_file_name(&[]), None);
    }

    #[test]
    fn test_newer_files_without_latest_returns_all_sorted() {
        let all = names(&["3_c.json", "1_a.json", "2_b.json"]);
        assert_eq!(
            newer_files(all, None),
            names(&["1_a.json", "2_b.json", "3_c.json"])
        );
    }

    #[test]
    fn test_newer_files_after_latest() {
        let all = names(&["3_c.json", "1_a.json", "2_b.json"]);
        assert_eq!(newer_files(all, Some("1_a.json")), names(&["2_b.json", "3_c.json"]));
    }

    #[test]
    fn test_newer_files_latest_is_last() {
        let all = names(&["1_a.json", "2_b.json"]);
        assert!(newer_files(all, Some("2_b.json")).is_empty());
    }

    #[test]
    fn test_newer_files_unknown_latest_returns_all() {
        let all = names(&["1_a.json", "2_b.json"]);
        assert_eq!(
            newer_files(all, Some("9_gone.json")),
            names(&["1_a.json", "2_b.json"])
        );
    }

    #[test]
    fn test_parse_listing_shapes() {
        assert_eq!(parse_listing(&json!(["a.json", "b.json"])), names(&["a.json", "b.json"]));
        assert_eq!(parse_listing(&json!({"files": ["a.json"]})), names(&["a.json"]));
        assert_eq!(parse_listing(&json!({"files": ["a.json", 3, null]})), names(&["a.json"]));
        assert!(parse_listing(&json!({"error": "boom"})).is_empty());
        assert!(parse_listing(&json!({"files": "a.json"})).is_empty());
        assert!(parse_listing(&json!("a.json")).is_empty());
    }

    #[test]
    fn test_is_safe_file_name() {
        assert!(is_safe_file_name("1714557600000_42.json"));
        assert!(!is_safe_file_name(""));
        assert!(!is_safe_file_name("."));
        assert!(!is_safe_file_name("../secret.json"));
        assert!(!is_safe_file_name("sub/a.json"));
        assert!(!is_safe_file_name("sub\\a.json"));
    }
}
