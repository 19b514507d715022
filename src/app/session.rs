// ReqScope - app/session.rs
//
// Session persistence: the selected request, filter text and history, the
// detail pane segments, and the theme survive restarts.
//
// - Saved atomically (write temp, rename) so a crash mid-save never
//   corrupts the previous good session.
// - Load errors are logged and discarded; the app simply starts fresh.
// - Log entries are NOT persisted. They are re-fetched from the source on
//   every start, and the saved selection is re-applied once its entry shows
//   up again.

use crate::core::model::Segment;
use crate::util::constants::SESSION_FILE_NAME;
use crate::util::error::ReqScopeError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Version stamp for forward-compatibility checks.
///
/// Bump when `SessionData` changes incompatibly. Mismatches are discarded.
pub const SESSION_VERSION: u32 = 1;

/// Complete persistent session snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Schema version; must equal `SESSION_VERSION` to be accepted.
    pub version: u32,

    /// Timestamp id of the request selected when the app closed.
    #[serde(default)]
    pub selected_log_id: Option<String>,

    #[serde(default)]
    pub filter: PersistedFilter,

    /// Most-recent-first committed filter strings.
    #[serde(default)]
    pub filter_history: Vec<String>,

    #[serde(default)]
    pub response_segment: Segment,

    #[serde(default)]
    pub request_segment: Segment,

    /// `None` = use the configured theme.
    #[serde(default)]
    pub dark_mode: Option<bool>,
}

impl Default for SessionData {
    fn default() -> Self {
        Self {
            version: SESSION_VERSION,
            selected_log_id: None,
            filter: PersistedFilter::default(),
            filter_history: Vec::new(),
            response_segment: Segment::Body,
            request_segment: Segment::Body,
            dark_mode: None,
        }
    }
}

/// Serialisable subset of the filter state. The compiled regex is rebuilt
/// on restore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedFilter {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub use_regex: bool,
}

/// Resolve the session file path from the platform data directory.
pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join(SESSION_FILE_NAME)
}

/// Save `data` to `path` atomically, creating parent directories as needed.
pub fn save(data: &SessionData, path: &Path) -> Result<(), ReqScopeError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ReqScopeError::Io {
            path: parent.to_path_buf(),
            operation: "create session directory",
            source: e,
        })?;
    }

    let json = serde_json::to_string_pretty(data).map_err(|e| ReqScopeError::Io {
        path: path.to_path_buf(),
        operation: "serialise session",
        source: e.into(),
    })?;

    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json.as_bytes()).map_err(|e| ReqScopeError::Io {
        path: tmp.clone(),
        operation: "write session temp file",
        source: e,
    })?;

    std::fs::rename(&tmp, path).map_err(|e| {
        let _ = std::fs::remove_file(&tmp);
        ReqScopeError::Io {
            path: path.to_path_buf(),
            operation: "finalise session file",
            source: e,
        }
    })?;

    tracing::debug!(path = %path.display(), "Session saved");
    Ok(())
}

/// Load and validate a session. `None` means "start fresh".
pub fn load(path: &Path) -> Option<SessionData> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::debug!(path = %path.display(), error = %e, "Cannot read session file");
            }
        })
        .ok()?;

    let data: SessionData = serde_json::from_str(&content)
        .map_err(|e| {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "Session file is malformed, starting fresh"
            );
        })
        .ok()?;

    if data.version != SESSION_VERSION {
        tracing::warn!(
            found = data.version,
            expected = SESSION_VERSION,
            "Session file version mismatch, starting fresh"
        );
        return None;
    }

    tracing::info!(path = %path.display(), "Session file loaded");
    Some(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_data() -> SessionData {
        SessionData {
            version: SESSION_VERSION,
            selected_log_id: Some("2024-05-01T10:00:00.123".to_string()),
            filter: PersistedFilter {
                text: "login".to_string(),
                use_regex: false,
            },
            filter_history: vec!["login".to_string(), "orders".to_string()],
            response_segment: Segment::Headers,
            request_segment: Segment::Body,
            dark_mode: Some(false),
        }
    }

    #[test]
    fn test_session_save_load() {
        let dir = TempDir::new().unwrap();
        let path = session_path(dir.path());
        let original = sample_data();

        save(&original, &path).expect("save should succeed");
        let loaded = load(&path).expect("load should return Some after valid save");
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_session_save_creates_parent_dirs() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a").join("b").join("session.json");
        save(&SessionData::default(), &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_session_load_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(load(&dir.path().join("nonexistent.json")).is_none());
    }

    #[test]
    fn test_session_load_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not valid json {{{{").unwrap();
        assert!(load(&path).is_none());
    }

    #[test]
    fn test_session_load_wrong_version_returns_none() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut data = sample_data();
        data.version = 99;
        save(&data, &path).unwrap();
        assert!(load(&path).is_none());
    }

    #[test]
    fn test_session_missing_fields_use_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, br#"{"version": 1}"#).unwrap();
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, SessionData::default());
    }

    #[test]
    fn test_session_save_overwrites_leftover_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        save(&sample_data(), &path).unwrap();

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, b"garbage").unwrap();

        let mut updated = sample_data();
        updated.selected_log_id = Some("2024-05-02T00:00:00".to_string());
        save(&updated, &path).unwrap();

        let loaded = load(&path).unwrap();
        assert_eq!(loaded.selected_log_id.as_deref(), Some("2024-05-02T00:00:00"));
        assert!(!tmp.exists());
    }
}
