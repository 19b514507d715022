// ReqScope - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ReqScope";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "ReqScope";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Log backend
// =============================================================================

/// Base URL of the log backend when neither CLI nor config names one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Path of the listing endpoint, relative to the base URL.
/// Accepts an optional `latest=<file name>` query parameter.
pub const LIST_FILES_PATH: &str = "/api/logs/files";

/// Path prefix of the single-log endpoint, relative to the base URL.
pub const LOG_FILE_PATH: &str = "/logs";

/// Query parameter carrying the newest file name already known to the client.
pub const LATEST_QUERY_PARAM: &str = "latest";

/// Extension of log files written by the backend.
pub const LOG_FILE_EXTENSION: &str = "json";

/// Default per-request timeout for the HTTP source (seconds).
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Minimum user-configurable request timeout (seconds).
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

/// Maximum user-configurable request timeout (seconds).
pub const MAX_REQUEST_TIMEOUT_SECS: u64 = 120;

// =============================================================================
// Polling
// =============================================================================

/// How often the poller asks the backend for new log files (ms).
pub const POLL_INTERVAL_MS: u64 = 5_000;

/// How often the cancel flag is checked within each poll sleep interval (ms).
pub const POLL_CANCEL_CHECK_INTERVAL_MS: u64 = 100;

/// Minimum user-configurable poll interval (ms).
pub const MIN_POLL_INTERVAL_MS: u64 = 500;

/// Maximum user-configurable poll interval (ms).
pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

/// Maximum number of poll messages processed per UI frame.  Remaining
/// messages stay queued for the next frame.
pub const MAX_POLL_MESSAGES_PER_FRAME: usize = 50;

/// Distance from the bottom of the request list (points) within which the
/// list counts as scrolled to the bottom.  Polling pauses outside it.
pub const AT_BOTTOM_THRESHOLD_PX: f32 = 10.0;

/// Maximum number of non-fatal warnings kept in memory.
pub const MAX_WARNINGS: usize = 1_000;

// =============================================================================
// Filtering
// =============================================================================

/// Default number of remembered filter strings.
pub const DEFAULT_FILTER_HISTORY_LIMIT: usize = 10;

/// Minimum user-configurable filter history length.
pub const MIN_FILTER_HISTORY_LIMIT: usize = 1;

/// Maximum user-configurable filter history length.
pub const MAX_FILTER_HISTORY_LIMIT: usize = 100;

/// Maximum regex pattern length accepted by the filter box.
pub const MAX_REGEX_PATTERN_LENGTH: usize = 4_096;

// =============================================================================
// Content rendering
// =============================================================================

/// Indentation width of the HTML pretty-printer.
pub const HTML_INDENT_SIZE: usize = 2;

/// Column at which the HTML pretty-printer wraps text.
pub const HTML_WRAP_LINE_LENGTH: usize = 80;

/// Maximum line breaks kept between two nodes by the HTML pretty-printer.
pub const HTML_MAX_PRESERVE_NEWLINES: usize = 2;

/// Bodies larger than this are shown as plain text without formatting.
pub const MAX_FORMATTED_BODY_BYTES: usize = 2 * 1024 * 1024; // 2 MiB

// =============================================================================
// UI defaults
// =============================================================================

/// Default UI body font size in points.
pub const DEFAULT_FONT_SIZE: f32 = 14.0;

/// Minimum user-configurable UI font size (points).
pub const MIN_FONT_SIZE: f32 = 10.0;

/// Maximum user-configurable UI font size (points).
pub const MAX_FONT_SIZE: f32 = 24.0;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Session persistence file name (stored in the platform data directory).
pub const SESSION_FILE_NAME: &str = "session.json";
