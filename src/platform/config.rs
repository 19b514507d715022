// ReqScope - platform/config.rs
//
// Platform directory resolution and config.toml loading with startup
// validation.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ReqScope configuration and data.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/reqscope/ or %APPDATA%\ReqScope\config\)
    pub config_dir: PathBuf,

    /// Data directory holding the session file.
    pub data_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths, falling back to the current
    /// directory.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let data_dir = proj_dirs.data_dir().to_path_buf();

            tracing::debug!(
                config = %config_dir.display(),
                data = %data_dir.display(),
                "Platform paths resolved"
            );

            Self {
                config_dir,
                data_dir,
            }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            let fallback = PathBuf::from(".");
            Self {
                config_dir: fallback.clone(),
                data_dir: fallback,
            }
        }
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml
// =============================================================================

/// Raw deserialisable shape of config.toml. Unknown keys are ignored.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub source: SourceSection,
    pub filter: FilterSection,
    pub ui: UiSection,
    pub logging: LoggingSection,
}

/// `[source]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// Log backend base URL.
    pub base_url: Option<String>,
    /// Read logs from this directory instead of the backend.
    pub logs_dir: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub request_timeout_secs: Option<u64>,
}

/// `[filter]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct FilterSection {
    pub history_limit: Option<usize>,
}

/// `[ui]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// "dark" or "light".
    pub theme: Option<String>,
    /// Body font size in points.
    pub font_size: Option<f32>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// "error", "warn", "info", "debug" or "trace".
    pub level: Option<String>,
}

/// Validated application configuration.
///
/// Every value is checked against the bounds in `util::constants`; invalid
/// values produce a warning and keep the default.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub base_url: String,
    pub logs_dir: Option<PathBuf>,
    pub poll_interval_ms: u64,
    pub request_timeout_secs: u64,
    pub filter_history_limit: usize,
    pub dark_mode: bool,
    pub font_size: f32,
    /// Logging level string, applied before tracing is initialised.
    pub log_level: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: constants::DEFAULT_BASE_URL.to_string(),
            logs_dir: None,
            poll_interval_ms: constants::POLL_INTERVAL_MS,
            request_timeout_secs: constants::DEFAULT_REQUEST_TIMEOUT_SECS,
            filter_history_limit: constants::DEFAULT_FILTER_HISTORY_LIMIT,
            dark_mode: true,
            font_size: constants::DEFAULT_FONT_SIZE,
            log_level: None,
        }
    }
}

/// Check that `value` is an http(s) URL and strip trailing slashes.
pub fn validate_base_url(value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    let lower = trimmed.to_ascii_lowercase();
    let has_scheme = lower.starts_with("http://") || lower.starts_with("https://");
    let host = trimmed.split_once("://").map(|(_, rest)| rest).unwrap_or("");
    if !has_scheme || host.trim_matches('/').is_empty() {
        return Err(ConfigError::InvalidBaseUrl {
            value: value.to_string(),
        });
    }
    Ok(trimmed.trim_end_matches('/').to_string())
}

/// Check a poll interval against the allowed range.
pub fn validate_poll_interval(ms: u64) -> Result<u64, ConfigError> {
    if (constants::MIN_POLL_INTERVAL_MS..=constants::MAX_POLL_INTERVAL_MS).contains(&ms) {
        Ok(ms)
    } else {
        Err(ConfigError::ValueOutOfRange {
            field: "source.poll_interval_ms".to_string(),
            value: ms.to_string(),
            expected: format!(
                "{}-{}",
                constants::MIN_POLL_INTERVAL_MS,
                constants::MAX_POLL_INTERVAL_MS
            ),
        })
    }
}

/// Load `config.toml` from the config directory. See [`load_config_file`].
pub fn load_config(config_dir: &Path) -> (AppConfig, Vec<String>) {
    load_config_file(&config_dir.join(constants::CONFIG_FILE_NAME))
}

/// Load and validate a config file.
///
/// A missing file yields defaults with no warnings (first run). An
/// unreadable or unparseable file yields defaults plus a warning; the app
/// still starts.
pub fn load_config_file(config_path: &Path) -> (AppConfig, Vec<String>) {
    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (AppConfig::default(), Vec::new());
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            };
            return (AppConfig::default(), vec![format!("{err}. Using defaults.")]);
        }
    };

    match parse_config(&content, config_path) {
        Ok((config, warnings)) => {
            tracing::info!(path = %config_path.display(), "Loaded config.toml");
            (config, warnings)
        }
        Err(e) => (AppConfig::default(), vec![format!("{e}. Using defaults.")]),
    }
}

/// Parse and validate config text. Only a TOML syntax error is fatal;
/// out-of-range values become warnings.
pub fn parse_config(
    content: &str,
    config_path: &Path,
) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: config_path.to_path_buf(),
        source: e,
    })?;

    let mut config = AppConfig::default();
    let mut warnings: Vec<String> = Vec::new();

    // -- Source --
    if let Some(ref url) = raw.source.base_url {
        match validate_base_url(url) {
            Ok(url) => config.base_url = url,
            Err(e) => warnings.push(format!(
                "[source] {e}. Using default ({}).",
                constants::DEFAULT_BASE_URL
            )),
        }
    }

    if let Some(ref dir) = raw.source.logs_dir {
        if !dir.trim().is_empty() {
            config.logs_dir = Some(PathBuf::from(dir));
        }
    }

    if let Some(ms) = raw.source.poll_interval_ms {
        match validate_poll_interval(ms) {
            Ok(ms) => config.poll_interval_ms = ms,
            Err(e) => warnings.push(format!(
                "{e}. Using default ({}).",
                constants::POLL_INTERVAL_MS
            )),
        }
    }

    if let Some(secs) = raw.source.request_timeout_secs {
        if (constants::MIN_REQUEST_TIMEOUT_SECS..=constants::MAX_REQUEST_TIMEOUT_SECS)
            .contains(&secs)
        {
            config.request_timeout_secs = secs;
        } else {
            let err = ConfigError::ValueOutOfRange {
                field: "source.request_timeout_secs".to_string(),
                value: secs.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_REQUEST_TIMEOUT_SECS,
                    constants::MAX_REQUEST_TIMEOUT_SECS
                ),
            };
            warnings.push(format!(
                "{err}. Using default ({}).",
                constants::DEFAULT_REQUEST_TIMEOUT_SECS
            ));
        }
    }

    // -- Filter --
    if let Some(limit) = raw.filter.history_limit {
        if (constants::MIN_FILTER_HISTORY_LIMIT..=constants::MAX_FILTER_HISTORY_LIMIT)
            .contains(&limit)
        {
            config.filter_history_limit = limit;
        } else {
            let err = ConfigError::ValueOutOfRange {
                field: "filter.history_limit".to_string(),
                value: limit.to_string(),
                expected: format!(
                    "{}-{}",
                    constants::MIN_FILTER_HISTORY_LIMIT,
                    constants::MAX_FILTER_HISTORY_LIMIT
                ),
            };
            warnings.push(format!(
                "{err}. Using default ({}).",
                constants::DEFAULT_FILTER_HISTORY_LIMIT
            ));
        }
    }

    // -- UI --
    if let Some(ref theme) = raw.ui.theme {
        match theme.to_lowercase().as_str() {
            "dark" => config.dark_mode = true,
            "light" => config.dark_mode = false,
            other => warnings.push(format!(
                "[ui] theme = \"{other}\" is not recognised. Expected \"dark\" or \"light\". Using default (dark).",
            )),
        }
    }

    if let Some(size) = raw.ui.font_size {
        if (constants::MIN_FONT_SIZE..=constants::MAX_FONT_SIZE).contains(&size) {
            config.font_size = size;
        } else {
            warnings.push(format!(
                "[ui] font_size = {size} is out of range ({}-{}). Using default ({}).",
                constants::MIN_FONT_SIZE,
                constants::MAX_FONT_SIZE,
                constants::DEFAULT_FONT_SIZE,
            ));
        }
    }

    // -- Logging --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default ({}).",
                constants::DEFAULT_LOG_LEVEL
            ));
        }
    }

    Ok((config, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(content: &str) -> (AppConfig, Vec<String>) {
        parse_config(content, Path::new("config.toml")).unwrap()
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_full_config() {
        let (config, warnings) = parse(
            r#"
            [source]
            base_url = "https://logs.internal:8443/"
            logs_dir = "/var/log/proxy"
            poll_interval_ms = 2000
            request_timeout_secs = 30

            [filter]
            history_limit = 25

            [ui]
            theme = "Light"
            font_size = 16.0

            [logging]
            level = "DEBUG"
            "#,
        );
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.base_url, "https://logs.internal:8443");
        assert_eq!(config.logs_dir, Some(PathBuf::from("/var/log/proxy")));
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.filter_history_limit, 25);
        assert!(!config.dark_mode);
        assert_eq!(config.font_size, 16.0);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_out_of_range_values_warn_and_keep_defaults() {
        let (config, warnings) = parse(
            r#"
            [source]
            poll_interval_ms = 10
            request_timeout_secs = 0

            [filter]
            history_limit = 1000

            [ui]
            theme = "sepia"
            font_size = 99.0

            [logging]
            level = "loud"
            "#,
        );
        assert_eq!(warnings.len(), 6, "{warnings:?}");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_invalid_base_url_warns() {
        let (config, warnings) = parse("[source]\nbase_url = \"ftp://example\"\n");
        assert_eq!(config.base_url, constants::DEFAULT_BASE_URL);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("ftp://example"));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let (config, warnings) = parse("[source]\nfuture_option = true\n[extra]\nx = 1\n");
        assert!(warnings.is_empty());
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_syntax_error_is_fatal_for_parse_but_not_for_load() {
        assert!(matches!(
            parse_config("[source\n", Path::new("c.toml")),
            Err(ConfigError::TomlParse { .. })
        ));

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(constants::CONFIG_FILE_NAME), "[source\n").unwrap();
        let (config, warnings) = load_config(dir.path());
        assert_eq!(config, AppConfig::default());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_load_config_file_reads_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[source]\npoll_interval_ms = 1000\n").unwrap();
        let (config, warnings) = load_config_file(&path);
        assert!(warnings.is_empty());
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_validate_base_url() {
        assert_eq!(
            validate_base_url("http://localhost:3000/").unwrap(),
            "http://localhost:3000"
        );
        assert_eq!(validate_base_url(" HTTPS://h ").unwrap(), "HTTPS://h");
        assert!(validate_base_url("localhost:3000").is_err());
        assert!(validate_base_url("http://").is_err());
        assert!(validate_base_url("").is_err());
    }

    #[test]
    fn test_validate_poll_interval() {
        assert_eq!(validate_poll_interval(5000).unwrap(), 5000);
        assert!(validate_poll_interval(constants::MIN_POLL_INTERVAL_MS - 1).is_err());
        assert!(validate_poll_interval(constants::MAX_POLL_INTERVAL_MS + 1).is_err());
    }
}
