// ReqScope - core/model.rs
//
// Core data model types. Pure data definitions with no I/O, no UI,
// no platform dependencies.
//
// These types are the shared vocabulary across all layers.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::BTreeMap;

// =============================================================================
// HTTP log entry (one log file written by the backend)
// =============================================================================

/// A single recorded request/response exchange.
///
/// Field names follow the JSON written by the log backend; `full-url` is the
/// only hyphenated key. Everything except `timestamp` is optional on the wire
/// so a partially written record still loads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpLogEntry {
    /// Start time of the request. Used as the unique identifier and sort key.
    pub timestamp: String,

    /// HTTP method of the recorded request.
    #[serde(default)]
    pub method: String,

    /// URL the client called, including query string.
    #[serde(rename = "full-url", default)]
    pub full_url: String,

    /// Request path relative to the proxy root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Request headers.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Request body: a string or any JSON value.
    #[serde(default)]
    pub body: Value,

    /// The upstream response.
    #[serde(default)]
    pub response: ResponseRecord,

    /// Seconds the forwarded call took.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
}

/// The response half of an [`HttpLogEntry`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,

    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub body: Value,
}

impl HttpLogEntry {
    /// Identifier of this entry. Timestamps are assumed unique.
    pub fn id(&self) -> &str {
        &self.timestamp
    }

    /// Parse the timestamp.
    ///
    /// Accepts ISO-8601 without an offset (as written by the backend, with
    /// or without fractional seconds) and RFC 3339 with an offset, which is
    /// converted to UTC.
    pub fn parsed_time(&self) -> Option<NaiveDateTime> {
        parse_timestamp(&self.timestamp)
    }

    /// Human-readable timestamp for list rows; falls back to the raw string.
    pub fn display_time(&self) -> String {
        match self.parsed_time() {
            Some(t) => t.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => self.timestamp.clone(),
        }
    }
}

/// Parse a backend timestamp string. See [`HttpLogEntry::parsed_time`].
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(t);
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(t);
    }
    DateTime::parse_from_rfc3339(raw).ok().map(|t| t.naive_utc())
}

/// Chronological comparison of two entries.
///
/// Parseable timestamps sort before unparseable ones; two unparseable
/// timestamps compare as raw strings.
pub fn compare_by_timestamp(a: &HttpLogEntry, b: &HttpLogEntry) -> Ordering {
    match (a.parsed_time(), b.parsed_time()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.timestamp.cmp(&b.timestamp),
    }
}

/// Stable ascending sort by timestamp.
pub fn sort_by_timestamp(entries: &mut [HttpLogEntry]) {
    entries.sort_by(compare_by_timestamp);
}

// =============================================================================
// Detail segments
// =============================================================================

/// Which half of a request or response the detail pane shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Segment {
    #[default]
    Body,
    Headers,
}

impl Segment {
    pub fn label(&self) -> &'static str {
        match self {
            Segment::Body => "Body",
            Segment::Headers => "Header",
        }
    }
}

// =============================================================================
// Poll progress (background thread -> UI)
// =============================================================================

/// Messages sent from the poll thread to the UI thread.
#[derive(Debug)]
pub enum PollProgress {
    /// The poller thread is running against the named source.
    Started { source: String },

    /// The backend listed file names the client has not seen yet.
    FilesListed { files: Vec<String> },

    /// Entries fetched for the most recently listed files, sorted ascending.
    NewEntries { entries: Vec<HttpLogEntry> },

    /// A single log file could not be fetched or decoded; it is skipped.
    FetchWarning { file: String, message: String },

    /// A poll tick found nothing new.
    Idle,

    /// The listing request failed. Polling continues on the next tick.
    ListFailed { error: String },

    /// The poller stopped after a cancel request.
    Stopped,
}
