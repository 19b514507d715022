// ReqScope - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ReqScope operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ReqScopeError {
    /// Listing or fetching log files failed.
    Source(SourceError),

    /// Filter operation failed.
    Filter(FilterError),

    /// HTML formatting failed.
    Html(HtmlError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ReqScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(e) => write!(f, "Log source error: {e}"),
            Self::Filter(e) => write!(f, "Filter error: {e}"),
            Self::Html(e) => write!(f, "HTML error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ReqScopeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(e) => Some(e),
            Self::Filter(e) => Some(e),
            Self::Html(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors raised while listing or fetching log files.
#[derive(Debug)]
pub enum SourceError {
    /// The HTTP request could not be sent or its body could not be read.
    Http { url: String, source: reqwest::Error },

    /// The backend answered with a non-success status code.
    Status { url: String, status: u16 },

    /// A log file was fetched but is not a valid log record.
    Decode {
        file: String,
        source: serde_json::Error,
    },

    /// The logs directory does not exist or is not a directory.
    DirNotFound { path: PathBuf },

    /// A file name from the listing would escape the logs directory.
    InvalidFileName { name: String },

    /// I/O error reading the logs directory or a log file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { url, source } => write!(f, "request to '{url}' failed: {source}"),
            Self::Status { url, status } => {
                write!(f, "'{url}' answered with HTTP status {status}")
            }
            Self::Decode { file, source } => {
                write!(f, "'{file}' is not a valid log record: {source}")
            }
            Self::DirNotFound { path } => {
                write!(f, "logs directory '{}' does not exist", path.display())
            }
            Self::InvalidFileName { name } => {
                write!(f, "refusing to open log file with unsafe name '{name}'")
            }
            Self::Io { path, source } => {
                write!(f, "I/O error on '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http { source, .. } => Some(source),
            Self::Decode { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SourceError> for ReqScopeError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ---------------------------------------------------------------------------
// Filter errors
// ---------------------------------------------------------------------------

/// Errors related to filter operations.
#[derive(Debug)]
pub enum FilterError {
    /// User-provided regex is invalid.
    InvalidRegex {
        pattern: String,
        source: regex::Error,
    },

    /// User-provided regex exceeds the maximum allowed length.
    RegexTooLong { length: usize, max_length: usize },
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRegex { pattern, source } => {
                write!(f, "Invalid filter regex '{pattern}': {source}")
            }
            Self::RegexTooLong { length, max_length } => write!(
                f,
                "Filter regex is {length} chars, exceeds maximum of {max_length}"
            ),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidRegex { source, .. } => Some(source),
            Self::RegexTooLong { .. } => None,
        }
    }
}

impl From<FilterError> for ReqScopeError {
    fn from(e: FilterError) -> Self {
        Self::Filter(e)
    }
}

// ---------------------------------------------------------------------------
// HTML errors
// ---------------------------------------------------------------------------

/// Errors raised by the HTML pretty-printer on markup it cannot tokenise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlError {
    /// A `<` opened a tag that never closes with `>`.
    UnterminatedTag { offset: usize },

    /// A `<!--` comment has no matching `-->`.
    UnterminatedComment { offset: usize },
}

impl fmt::Display for HtmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedTag { offset } => {
                write!(f, "unterminated tag starting at byte {offset}")
            }
            Self::UnterminatedComment { offset } => {
                write!(f, "unterminated comment starting at byte {offset}")
            }
        }
    }
}

impl std::error::Error for HtmlError {}

impl From<HtmlError> for ReqScopeError {
    fn from(e: HtmlError) -> Self {
        Self::Html(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is out of the allowed range.
    ValueOutOfRange {
        field: String,
        value: String,
        expected: String,
    },

    /// The configured backend URL is not an http(s) URL.
    InvalidBaseUrl { value: String },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::ValueOutOfRange {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is out of range. Expected: {expected}"
            ),
            Self::InvalidBaseUrl { value } => write!(
                f,
                "Backend URL '{value}' must start with http:// or https://"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for ReqScopeError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for ReqScope results.
pub type Result<T> = std::result::Result<T, ReqScopeError>;
