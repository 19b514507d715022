// ReqScope - app/source.rs
//
// Where log files come from.
//
// `LogSource` is the seam between the poller and the outside world:
//   - `HttpLogSource` talks to the log backend (`GET /api/logs/files` for the
//     listing, `GET /logs/<name>` for one record).
//   - `DirLogSource` reads the same `<epoch-millis>_<hash>.json` files straight
//     from a local directory, for logs copied off a machine with no backend.
//
// Both are blocking and are only ever called from the poll thread.

use crate::core::listing::{is_safe_file_name, newer_files, parse_listing};
use crate::core::model::HttpLogEntry;
use crate::util::constants::{
    LATEST_QUERY_PARAM, LIST_FILES_PATH, LOG_FILE_EXTENSION, LOG_FILE_PATH,
};
use crate::util::error::SourceError;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// A provider of log file names and the records they hold.
pub trait LogSource: Send + Sync {
    /// Short label for the status bar and log lines.
    fn describe(&self) -> String;

    /// Names of log files newer than `latest`, or every name when `latest`
    /// is `None` or unknown to the source.
    fn list_files(&self, latest: Option<&str>) -> Result<Vec<String>, SourceError>;

    /// Fetch and decode one log file.
    fn fetch_entry(&self, file_name: &str) -> Result<HttpLogEntry, SourceError>;
}

/// How to reach the logs. Kept by the UI so it can reconnect.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    Http { base_url: String, timeout: Duration },
    Directory(PathBuf),
}

/// Build the source described by `spec`.
pub fn open_source(spec: &SourceSpec) -> Result<Arc<dyn LogSource>, SourceError> {
    match spec {
        SourceSpec::Http { base_url, timeout } => {
            Ok(Arc::new(HttpLogSource::new(base_url, *timeout)?))
        }
        SourceSpec::Directory(dir) => Ok(Arc::new(DirLogSource::new(dir)?)),
    }
}

// =============================================================================
// HTTP backend
// =============================================================================

pub struct HttpLogSource {
    /// Base URL without a trailing slash.
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpLogSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SourceError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SourceError::Http {
                url: base_url.clone(),
                source: e,
            })?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a GET and return the body text of a 2xx answer.
    fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, SourceError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| SourceError::Http {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|e| SourceError::Http {
            url: url.to_string(),
            source: e,
        })
    }
}

impl LogSource for HttpLogSource {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    fn list_files(&self, latest: Option<&str>) -> Result<Vec<String>, SourceError> {
        let url = format!("{}{}", self.base_url, LIST_FILES_PATH);
        let query: Vec<(&str, &str)> = latest
            .map(|name| vec![(LATEST_QUERY_PARAM, name)])
            .unwrap_or_default();

        let body = self.get_text(&url, &query)?;
        let value: Value = serde_json::from_str(&body).map_err(|e| SourceError::Decode {
            file: url.clone(),
            source: e,
        })?;

        let files = parse_listing(&value);
        tracing::debug!(url = %url, latest = ?latest, count = files.len(), "Listed log files");
        Ok(files)
    }

    fn fetch_entry(&self, file_name: &str) -> Result<HttpLogEntry, SourceError> {
        if !is_safe_file_name(file_name) {
            return Err(SourceError::InvalidFileName {
                name: file_name.to_string(),
            });
        }
        let url = format!("{}{}/{}", self.base_url, LOG_FILE_PATH, file_name);
        let body = self.get_text(&url, &[])?;
        serde_json::from_str(&body).map_err(|e| SourceError::Decode {
            file: file_name.to_string(),
            source: e,
        })
    }
}

// =============================================================================
// Local directory
// =============================================================================

pub struct DirLogSource {
    dir: PathBuf,
}

impl DirLogSource {
    pub fn new(dir: &Path) -> Result<Self, SourceError> {
        if !dir.is_dir() {
            return Err(SourceError::DirNotFound {
                path: dir.to_path_buf(),
            });
        }
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }
}

impl LogSource for DirLogSource {
    fn describe(&self) -> String {
        format!("dir: {}", self.dir.display())
    }

    fn list_files(&self, latest: Option<&str>) -> Result<Vec<String>, SourceError> {
        let read_dir = std::fs::read_dir(&self.dir).map_err(|e| SourceError::Io {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut names = Vec::new();
        for dir_entry in read_dir {
            let dir_entry = match dir_entry {
                Ok(d) => d,
                Err(e) => {
                    tracing::debug!(dir = %self.dir.display(), error = %e, "Skipping unreadable directory entry");
                    continue;
                }
            };
            let path = dir_entry.path();
            if !path.is_file() {
                continue;
            }
            let is_log = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(LOG_FILE_EXTENSION));
            if !is_log {
                continue;
            }
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }

        Ok(newer_files(names, latest))
    }

    fn fetch_entry(&self, file_name: &str) -> Result<HttpLogEntry, SourceError> {
        if !is_safe_file_name(file_name) {
            return Err(SourceError::InvalidFileName {
                name: file_name.to_string(),
            });
        }
        let path = self.dir.join(file_name);
        let content = std::fs::read_to_string(&path).map_err(|e| SourceError::Io {
            path: path.clone(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| SourceError::Decode {
            file: file_name.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_log(dir: &Path, name: &str, ts: &str) {
        let body = format!(
            r#"{{"timestamp": "{ts}", "method": "GET", "full-url": "http://h/{name}",
                "headers": {{}}, "body": "", "response": {{"headers": {{}}, "body": "ok"}}}}"#
        );
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_dir_source_missing_dir() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(matches!(
            DirLogSource::new(&missing),
            Err(SourceError::DirNotFound { .. })
        ));
    }

    #[test]
    fn test_dir_source_lists_only_json_files_sorted() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "2000_b.json", "2024-05-01T10:00:02");
        write_log(dir.path(), "1000_a.json", "2024-05-01T10:00:01");
        std::fs::write(dir.path().join("notes.txt"), "x").unwrap();
        std::fs::create_dir(dir.path().join("sub.json")).unwrap();

        let source = DirLogSource::new(dir.path()).unwrap();
        let files = source.list_files(None).unwrap();
        assert_eq!(files, vec!["1000_a.json".to_string(), "2000_b.json".to_string()]);
    }

    #[test]
    fn test_dir_source_lists_after_latest() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "1000_a.json", "2024-05-01T10:00:01");
        write_log(dir.path(), "2000_b.json", "2024-05-01T10:00:02");
        write_log(dir.path(), "3000_c.json", "2024-05-01T10:00:03");

        let source = DirLogSource::new(dir.path()).unwrap();
        assert_eq!(
            source.list_files(Some("2000_b.json")).unwrap(),
            vec!["3000_c.json".to_string()]
        );
        assert!(source.list_files(Some("3000_c.json")).unwrap().is_empty());
    }

    #[test]
    fn test_dir_source_fetch_entry() {
        let dir = TempDir::new().unwrap();
        write_log(dir.path(), "1000_a.json", "2024-05-01T10:00:01");

        let source = DirLogSource::new(dir.path()).unwrap();
        let entry = source.fetch_entry("1000_a.json").unwrap();
        assert_eq!(entry.id(), "2024-05-01T10:00:01");
        assert_eq!(entry.full_url, "http://h/1000_a.json");
    }

    #[test]
    fn test_dir_source_fetch_rejects_unsafe_name() {
        let dir = TempDir::new().unwrap();
        let source = DirLogSource::new(dir.path()).unwrap();
        assert!(matches!(
            source.fetch_entry("../etc/passwd"),
            Err(SourceError::InvalidFileName { .. })
        ));
    }

    #[test]
    fn test_dir_source_fetch_malformed_is_decode_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("1_bad.json"), "{ not json").unwrap();
        let source = DirLogSource::new(dir.path()).unwrap();
        assert!(matches!(
            source.fetch_entry("1_bad.json"),
            Err(SourceError::Decode { .. })
        ));
    }

    #[test]
    fn test_open_source_directory() {
        let dir = TempDir::new().unwrap();
        let source = open_source(&SourceSpec::Directory(dir.path().to_path_buf())).unwrap();
        assert!(source.describe().starts_with("dir: "));
    }

    #[test]
    fn test_http_source_trims_trailing_slash() {
        let source = HttpLogSource::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(source.base_url(), "http://localhost:3000");
        assert_eq!(source.describe(), "http://localhost:3000");
    }
}
