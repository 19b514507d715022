// ReqScope - core/filter.rs
//
// Text filter over recorded exchanges plus the remembered filter history.
// An entry matches when its URL, request body, or response body contains
// the filter text. Non-string bodies are searched in their serialised JSON
// form.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::model::HttpLogEntry;
use crate::util::constants::{DEFAULT_FILTER_HISTORY_LIMIT, MAX_REGEX_PATTERN_LENGTH};
use crate::util::error::FilterError;
use regex::Regex;
use serde_json::Value;
use std::borrow::Cow;

/// Current filter configuration.
#[derive(Debug, Clone, Default)]
pub struct FilterState {
    /// Filter text as typed. Empty = no filter.
    pub text: String,

    /// Interpret `text` as a regular expression instead of a substring.
    pub use_regex: bool,

    /// Compiled form of `text` when `use_regex` is set.
    regex: Option<Regex>,
}

impl FilterState {
    /// Substring filter (case-insensitive).
    pub fn substring(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    /// Returns true if no filter is active.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Replace the filter text, recompiling the regex in regex mode.
    ///
    /// On an invalid pattern the previous filter stays in effect and the
    /// error is returned for display.
    pub fn set_text(&mut self, text: &str) -> Result<(), FilterError> {
        if self.use_regex {
            self.regex = compile(text)?;
        }
        self.text = text.to_string();
        Ok(())
    }

    /// Switch between substring and regex matching.
    pub fn set_use_regex(&mut self, use_regex: bool) -> Result<(), FilterError> {
        if use_regex {
            self.regex = compile(&self.text)?;
        } else {
            self.regex = None;
        }
        self.use_regex = use_regex;
        Ok(())
    }

    /// Check a single entry against the filter.
    pub fn matches(&self, entry: &HttpLogEntry) -> bool {
        if self.is_empty() {
            return true;
        }
        if self.use_regex {
            return match &self.regex {
                Some(re) => searchable_fields(entry).any(|field| re.is_match(&field)),
                None => true,
            };
        }
        let needle = self.text.to_lowercase();
        searchable_fields(entry).any(|field| field.to_lowercase().contains(&needle))
    }
}

fn compile(pattern: &str) -> Result<Option<Regex>, FilterError> {
    if pattern.is_empty() {
        return Ok(None);
    }
    if pattern.len() > MAX_REGEX_PATTERN_LENGTH {
        return Err(FilterError::RegexTooLong {
            length: pattern.len(),
            max_length: MAX_REGEX_PATTERN_LENGTH,
        });
    }
    Regex::new(pattern)
        .map(Some)
        .map_err(|e| FilterError::InvalidRegex {
            pattern: pattern.to_string(),
            source: e,
        })
}

/// The text fields a filter is matched against, in order.
fn searchable_fields(entry: &HttpLogEntry) -> impl Iterator<Item = Cow<'_, str>> {
    [
        Cow::Borrowed(entry.full_url.as_str()),
        body_text(&entry.body),
        body_text(&entry.response.body),
    ]
    .into_iter()
}

/// A body as searchable text: strings directly, other values as JSON.
pub fn body_text(body: &Value) -> Cow<'_, str> {
    match body {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Null => Cow::Borrowed(""),
        other => Cow::Owned(other.to_string()),
    }
}

/// Apply the filter to a slice of entries, returning indices of matches.
pub fn apply_filters(entries: &[HttpLogEntry], filter: &FilterState) -> Vec<usize> {
    if filter.is_empty() {
        return (0..entries.len()).collect();
    }
    entries
        .iter()
        .enumerate()
        .filter(|(_, entry)| filter.matches(entry))
        .map(|(idx, _)| idx)
        .collect()
}

// =============================================================================
// Filter history
// =============================================================================

/// Most-recent-first list of committed filter strings, capped at `limit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterHistory {
    items: Vec<String>,
    limit: usize,
}

impl FilterHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            items: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Rebuild a history from persisted items, re-applying the cap.
    pub fn from_items(items: Vec<String>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        // Oldest first so the persisted head ends up at the front again.
        for item in items.iter().rev() {
            history.record(item);
        }
        history
    }

    /// Remember `text`. Blank input is ignored; a repeat moves to the front.
    pub fn record(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        self.items.retain(|item| item != text);
        self.items.insert(0, text.to_string());
        self.items.truncate(self.limit);
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl Default for FilterHistory {
    fn default() -> Self {
        Self::new(DEFAULT_FILTER_HISTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::ResponseRecord;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn make_entry(ts: &str, url: &str, body: Value, response_body: Value) -> HttpLogEntry {
        HttpLogEntry {
            timestamp: ts.to_string(),
            method: "POST".to_string(),
            full_url: url.to_string(),
            path: None,
            headers: BTreeMap::new(),
            body,
            response: ResponseRecord {
                status_code: Some(200),
                headers: BTreeMap::new(),
                body: response_body,
            },
            cost: None,
        }
    }

    fn sample() -> Vec<HttpLogEntry> {
        vec![
            make_entry("1", "http://h/api/login", json!({"user": "alice"}), json!("OK")),
            make_entry("2", "http://h/api/orders", Value::Null, json!("<p>Order 77</p>")),
            make_entry("3", "http://h/health", json!("ping"), json!({"status": "up"})),
        ]
    }

    #[test]
    fn test_empty_filter_returns_all() {
        let result = apply_filters(&sample(), &FilterState::default());
        assert_eq!(result, vec![0, 1, 2]);
    }

    #[test]
    fn test_matches_url_case_insensitive() {
        let result = apply_filters(&sample(), &FilterState::substring("API/ORDERS"));
        assert_eq!(result, vec![1]);
    }

    #[test]
    fn test_matches_request_body_serialised_json() {
        // Object bodies are searched in their JSON form, keys included.
        let result = apply_filters(&sample(), &FilterState::substring("\"user\":\"alice\""));
        assert_eq!(result, vec![0]);
    }

    #[test]
    fn test_matches_response_body_string_and_json() {
        assert_eq!(apply_filters(&sample(), &FilterState::substring("order 77")), vec![1]);
        assert_eq!(apply_filters(&sample(), &FilterState::substring("\"up\"")), vec![2]);
    }

    #[test]
    fn test_null_body_does_not_match_null_text() {
        let result = apply_filters(&sample(), &FilterState::substring("null"));
        assert!(result.is_empty());
    }

    #[test]
    fn test_regex_filter() {
        let mut filter = FilterState::default();
        filter.set_use_regex(true).unwrap();
        filter.set_text(r"orders|health$").unwrap();
        assert_eq!(apply_filters(&sample(), &filter), vec![1, 2]);
    }

    #[test]
    fn test_invalid_regex_keeps_previous_filter() {
        let mut filter = FilterState::default();
        filter.set_use_regex(true).unwrap();
        filter.set_text("login").unwrap();
        assert!(filter.set_text("[invalid").is_err());
        assert_eq!(filter.text, "login");
        assert_eq!(apply_filters(&sample(), &filter), vec![0]);
    }

    #[test]
    fn test_enabling_regex_with_invalid_text_fails() {
        let mut filter = FilterState::substring("(");
        assert!(filter.set_use_regex(true).is_err());
        assert!(!filter.use_regex);
    }

    #[test]
    fn test_overlong_regex_rejected() {
        let mut filter = FilterState::default();
        filter.set_use_regex(true).unwrap();
        filter.set_text("login").unwrap();

        let long = "a".repeat(MAX_REGEX_PATTERN_LENGTH + 1);
        match filter.set_text(&long) {
            Err(FilterError::RegexTooLong { length, max_length }) => {
                assert_eq!(length, MAX_REGEX_PATTERN_LENGTH + 1);
                assert_eq!(max_length, MAX_REGEX_PATTERN_LENGTH);
            }
            other => panic!("expected RegexTooLong, got {other:?}"),
        }
        assert_eq!(filter.text, "login");

        // The cap is inclusive.
        let max = "a".repeat(MAX_REGEX_PATTERN_LENGTH);
        assert!(filter.set_text(&max).is_ok());

        // Substring mode has no length cap.
        let mut plain = FilterState::default();
        assert!(plain.set_text(&long).is_ok());
        assert!(matches!(
            plain.set_use_regex(true),
            Err(FilterError::RegexTooLong { .. })
        ));
    }

    #[test]
    fn test_history_default_limit() {
        let mut h = FilterHistory::default();
        assert_eq!(h.limit(), DEFAULT_FILTER_HISTORY_LIMIT);
        for i in 0..=DEFAULT_FILTER_HISTORY_LIMIT {
            h.record(&format!("q{i}"));
        }
        assert_eq!(h.items().len(), DEFAULT_FILTER_HISTORY_LIMIT);
        assert_eq!(h.items()[0], format!("q{DEFAULT_FILTER_HISTORY_LIMIT}"));
        assert!(!h.items().contains(&"q0".to_string()));
    }

    #[test]
    fn test_history_most_recent_first_and_dedup() {
        let mut h = FilterHistory::new(10);
        h.record("login");
        h.record("orders");
        h.record("login");
        assert_eq!(h.items(), &["login".to_string(), "orders".to_string()]);
    }

    #[test]
    fn test_history_ignores_blank_and_trims() {
        let mut h = FilterHistory::new(10);
        h.record("   ");
        h.record("  health ");
        assert_eq!(h.items(), &["health".to_string()]);
    }

    #[test]
    fn test_history_capped() {
        let mut h = FilterHistory::new(3);
        for q in ["a", "b", "c", "d"] {
            h.record(q);
        }
        assert_eq!(h.items(), &["d".to_string(), "c".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_history_from_items_keeps_order_and_cap() {
        let items = vec!["x".to_string(), "y".to_string(), "z".to_string()];
        let h = FilterHistory::from_items(items, 2);
        assert_eq!(h.items(), &["x".to_string(), "y".to_string()]);
        assert_eq!(h.limit(), 2);
    }
}
