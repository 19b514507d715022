// ReqScope - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and validation
// 3. Logging initialisation (debug mode support)
// 4. Source selection and session restore
// 5. eframe GUI launch

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod gui;

// Re-export the library modules so `gui.rs` can use `crate::app::...` etc.
pub use reqscope::app;
pub use reqscope::core;
pub use reqscope::platform;
pub use reqscope::ui;
pub use reqscope::util;

use app::source::SourceSpec;
use clap::Parser;
use platform::config::AppConfig;
use std::path::PathBuf;
use std::time::Duration;

/// ReqScope - live viewer for recorded HTTP request/response logs.
///
/// Polls a log backend (or a local directory of log files) for newly
/// recorded exchanges and shows them in a filterable list with formatted
/// request and response bodies.
#[derive(Parser, Debug)]
#[command(name = "ReqScope", version, about)]
struct Cli {
    /// Base URL of the log backend (default: http://localhost:3000).
    #[arg(short = 's', long = "server", conflicts_with = "dir")]
    server: Option<String>,

    /// Read log files from this directory instead of the backend.
    #[arg(short = 'l', long = "dir")]
    dir: Option<PathBuf>,

    /// Poll interval in milliseconds.
    #[arg(short = 'i', long = "poll-interval-ms")]
    poll_interval_ms: Option<u64>,

    /// Path to an alternative config.toml.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Pick the log source: CLI over config, directory over URL.
fn resolve_source(cli: &Cli, config: &AppConfig) -> util::error::Result<SourceSpec> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    if let Some(ref dir) = cli.dir {
        return Ok(SourceSpec::Directory(dir.clone()));
    }
    if let Some(ref url) = cli.server {
        let base_url = platform::config::validate_base_url(url)?;
        return Ok(SourceSpec::Http { base_url, timeout });
    }
    if let Some(ref dir) = config.logs_dir {
        return Ok(SourceSpec::Directory(dir.clone()));
    }
    Ok(SourceSpec::Http {
        base_url: config.base_url.clone(),
        timeout,
    })
}

fn main() {
    let cli = Cli::parse();

    let platform_paths = platform::config::PlatformPaths::resolve();
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| platform_paths.config_file());
    let (config, config_warnings) = platform::config::load_config_file(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "ReqScope starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    let poll_interval_ms = match cli.poll_interval_ms {
        Some(ms) => match platform::config::validate_poll_interval(ms) {
            Ok(ms) => ms,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring --poll-interval-ms");
                config.poll_interval_ms
            }
        },
        None => config.poll_interval_ms,
    };

    let mut state = app::state::AppState::new(
        config.filter_history_limit,
        config.dark_mode,
        cli.debug,
    );
    state.font_size = config.font_size;

    let session_path = app::session::session_path(&platform_paths.data_dir);
    if let Some(session) = app::session::load(&session_path) {
        state.restore_session(session);
    }
    state.session_path = Some(session_path);

    let source_spec = match resolve_source(&cli, &config) {
        Ok(spec) => Some(spec),
        Err(e) => {
            tracing::error!(error = %e, "Invalid log source");
            state.loading = false;
            state.error = Some(e.to_string());
            None
        }
    };

    tracing::info!(source = ?source_spec, poll_interval_ms, "Ready to launch GUI");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(format!(
                "{} v{}",
                util::constants::APP_NAME,
                util::constants::APP_VERSION
            ))
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        util::constants::APP_NAME,
        native_options,
        Box::new(move |_cc| {
            Ok(Box::new(gui::ReqScopeApp::new(
                state,
                source_spec,
                poll_interval_ms,
            )))
        }),
    );

    if let Err(e) = result {
        tracing::error!(error = %e, "Failed to launch GUI");
        eprintln!("Error: Failed to launch ReqScope GUI: {e}");
        std::process::exit(1);
    }
}
