// ReqScope - core/export.rs
//
// JSON export of recorded exchanges, in the same shape the backend writes
// them so an exported file can be dropped back into a logs directory.
// Core layer: writes to any Write trait object.

use crate::core::model::HttpLogEntry;
use crate::util::error::ReqScopeError;
use std::io::Write;
use std::path::Path;

/// Write one entry as pretty-printed JSON.
pub fn export_entry<W: Write>(
    entry: &HttpLogEntry,
    writer: W,
    export_path: &Path,
) -> Result<(), ReqScopeError> {
    serde_json::to_writer_pretty(writer, entry).map_err(|e| ReqScopeError::Io {
        path: export_path.to_path_buf(),
        operation: "export entry",
        source: e.into(),
    })
}

/// Write entries as a pretty-printed JSON array. Returns the count written.
pub fn export_entries<'a, W, I>(
    entries: I,
    writer: W,
    export_path: &Path,
) -> Result<usize, ReqScopeError>
where
    W: Write,
    I: IntoIterator<Item = &'a HttpLogEntry>,
{
    let entries: Vec<&HttpLogEntry> = entries.into_iter().collect();
    serde_json::to_writer_pretty(writer, &entries).map_err(|e| ReqScopeError::Io {
        path: export_path.to_path_buf(),
        operation: "export entries",
        source: e.into(),
    })?;
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(ts: &str) -> HttpLogEntry {
        serde_json::from_value(json!({
            "timestamp": ts,
            "method": "POST",
            "full-url": "http://h/api",
            "headers": {"A": "b"},
            "body": {"k": 1},
            "response": {"status_code": 201, "headers": {}, "body": "done"}
        }))
        .unwrap()
    }

    #[test]
    fn test_export_entry_is_readable_back() {
        let mut buf = Vec::new();
        export_entry(&sample("2024-05-01T10:00:00"), &mut buf, Path::new("x.json")).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"full-url\""));
        let back: HttpLogEntry = serde_json::from_str(&text).unwrap();
        assert_eq!(back, sample("2024-05-01T10:00:00"));
    }

    #[test]
    fn test_export_entries_array() {
        let entries = vec![sample("t1"), sample("t2")];
        let mut buf = Vec::new();
        let count = export_entries(entries.iter(), &mut buf, Path::new("all.json")).unwrap();
        assert_eq!(count, 2);
        let v: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(v.as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_export_write_failure_is_io_error() {
        struct Broken;
        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let err = export_entry(&sample("t1"), Broken, Path::new("x.json")).unwrap_err();
        assert!(matches!(err, ReqScopeError::Io { .. }));
        assert!(err.to_string().contains("x.json"));
    }
}
