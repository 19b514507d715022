// ReqScope - app/state.rs
//
// Application state: fetched entries, filter, selection, and the flags the
// UI and poller coordinate through. Owned by the eframe::App implementation.
//
// Selection rules applied when new entries arrive:
//   - First delivery: keep a restored selection if its entry is present,
//     otherwise select the newest entry. Scroll to the bottom whenever the
//     newest entry ends up selected.
//   - Later deliveries: keep the selection if its entry is present,
//     otherwise select the newest entry and scroll only while the list is
//     already at the bottom.

use crate::app::session::{self, PersistedFilter, SessionData, SESSION_VERSION};
use crate::core::filter::{FilterHistory, FilterState};
use crate::core::model::{HttpLogEntry, PollProgress, Segment};
use crate::util::constants::{DEFAULT_FONT_SIZE, MAX_WARNINGS};
use std::path::PathBuf;

/// Top-level application state.
#[derive(Debug)]
pub struct AppState {
    /// Every entry fetched so far, oldest first.
    pub entries: Vec<HttpLogEntry>,

    /// Log file names delivered by the poller, in arrival order.
    pub file_names: Vec<String>,

    /// Indices into `entries` matching the current filter.
    pub filtered_indices: Vec<usize>,

    /// Active filter.
    pub filter_state: FilterState,

    /// Filter box contents. Differs from `filter_state.text` while the
    /// typed regex is invalid.
    pub filter_input: String,

    /// Message for an invalid filter regex.
    pub filter_error: Option<String>,

    pub filter_history: FilterHistory,

    /// Id (timestamp) of the selected entry. May name an entry that has not
    /// been fetched yet when restored from a session.
    pub selected_id: Option<String>,

    pub response_segment: Segment,
    pub request_segment: Segment,

    /// True until the first poll result (entries, nothing, or failure).
    pub loading: bool,

    /// True until the first batch of entries has been applied.
    pub initial_load: bool,

    /// Whether the request list is scrolled to (near) the bottom. Polling
    /// pauses while false.
    pub is_at_bottom: bool,

    /// One-shot request for the list to scroll to its last row.
    pub scroll_to_bottom: bool,

    /// Fatal error shown instead of the main view.
    pub error: Option<String>,

    /// Label of the active source for the status bar.
    pub source_label: String,

    pub status_message: String,

    /// Non-fatal warnings (failed fetches, failed listings), capped.
    pub warnings: Vec<String>,

    pub dark_mode: bool,
    pub font_size: f32,

    /// Directory picked via File > Open Logs Directory, consumed by the UI.
    pub pending_dir: Option<PathBuf>,

    /// Set by View > Reconnect, consumed by the UI.
    pub reconnect_requested: bool,

    /// Session file location; `None` disables persistence.
    pub session_path: Option<PathBuf>,

    /// `--debug` was given; shown as a badge in the status bar.
    pub debug_mode: bool,
}

impl AppState {
    pub fn new(history_limit: usize, dark_mode: bool, debug_mode: bool) -> Self {
        Self {
            entries: Vec::new(),
            file_names: Vec::new(),
            filtered_indices: Vec::new(),
            filter_state: FilterState::default(),
            filter_input: String::new(),
            filter_error: None,
            filter_history: FilterHistory::new(history_limit),
            selected_id: None,
            response_segment: Segment::Body,
            request_segment: Segment::Body,
            loading: true,
            initial_load: true,
            is_at_bottom: true,
            scroll_to_bottom: false,
            error: None,
            source_label: String::new(),
            status_message: "Connecting...".to_string(),
            warnings: Vec::new(),
            dark_mode,
            font_size: DEFAULT_FONT_SIZE,
            pending_dir: None,
            reconnect_requested: false,
            session_path: None,
            debug_mode,
        }
    }

    // -------------------------------------------------------------------------
    // Poller messages
    // -------------------------------------------------------------------------

    /// Apply one message from the poll thread.
    pub fn handle_progress(&mut self, msg: PollProgress) {
        match msg {
            PollProgress::Started { source } => {
                self.source_label = source;
                self.status_message = "Loading request logs...".to_string();
            }
            PollProgress::FilesListed { files } => self.record_files(files),
            PollProgress::NewEntries { entries } => self.append_entries(entries),
            PollProgress::FetchWarning { file, message } => {
                self.push_warning(format!("{file}: {message}"));
            }
            PollProgress::Idle => self.mark_idle(),
            PollProgress::ListFailed { error } => self.mark_list_failed(error),
            PollProgress::Stopped => {
                self.status_message = "Polling stopped.".to_string();
            }
        }
    }

    pub fn record_files(&mut self, files: Vec<String>) {
        self.file_names.extend(files);
    }

    /// Append a sorted batch of entries and update the selection.
    pub fn append_entries(&mut self, new_entries: Vec<HttpLogEntry>) {
        let first_batch = self.initial_load;
        let added = new_entries.len();

        self.entries.extend(new_entries);
        self.apply_filters();
        self.loading = false;
        self.initial_load = false;
        self.status_message = format!("{} request logs", self.entries.len());

        let Some(newest) = self.entries.last().map(|e| e.id().to_string()) else {
            return;
        };
        let selection_present = self
            .selected_id
            .as_deref()
            .is_some_and(|id| self.contains_id(id));

        if first_batch {
            if !selection_present {
                self.set_selected(Some(newest.clone()));
            }
            if self.selected_id.as_deref() == Some(newest.as_str()) {
                self.scroll_to_bottom = true;
            }
        } else if !selection_present {
            self.set_selected(Some(newest));
            if self.is_at_bottom {
                self.scroll_to_bottom = true;
            }
        }

        tracing::debug!(
            added,
            total = self.entries.len(),
            selected = ?self.selected_id,
            "Entries appended"
        );
    }

    /// A poll found nothing new.
    pub fn mark_idle(&mut self) {
        if self.loading {
            self.status_message = format!("{} request logs", self.entries.len());
        }
        self.loading = false;
        self.initial_load = false;
    }

    /// The listing request failed; the poller retries on its next tick.
    pub fn mark_list_failed(&mut self, error: String) {
        self.loading = false;
        self.initial_load = false;
        self.status_message = format!("Cannot reach log source: {error}");
        self.push_warning(error);
    }

    fn push_warning(&mut self, warning: String) {
        if self.warnings.len() >= MAX_WARNINGS {
            self.warnings.remove(0);
        }
        self.warnings.push(warning);
    }

    /// Forget everything fetched from the previous source.
    pub fn reset_for_new_source(&mut self) {
        self.entries.clear();
        self.file_names.clear();
        self.filtered_indices.clear();
        self.warnings.clear();
        self.loading = true;
        self.initial_load = true;
        self.is_at_bottom = true;
        self.scroll_to_bottom = false;
        self.error = None;
        self.status_message = "Connecting...".to_string();
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    fn contains_id(&self, id: &str) -> bool {
        self.entries.iter().any(|e| e.id() == id)
    }

    fn set_selected(&mut self, id: Option<String>) -> bool {
        if self.selected_id == id {
            return false;
        }
        self.selected_id = id;
        true
    }

    /// User picked a row. Persists the choice.
    pub fn select(&mut self, id: &str) {
        if self.set_selected(Some(id.to_string())) {
            self.save_session();
        }
    }

    /// The selected entry, if it has been fetched.
    pub fn selected_entry(&self) -> Option<&HttpLogEntry> {
        let id = self.selected_id.as_deref()?;
        self.entries.iter().rev().find(|e| e.id() == id)
    }

    // -------------------------------------------------------------------------
    // Filtering
    // -------------------------------------------------------------------------

    /// Recompute `filtered_indices`. The selection is kept even when the
    /// filter hides its row.
    pub fn apply_filters(&mut self) {
        self.filtered_indices =
            crate::core::filter::apply_filters(&self.entries, &self.filter_state);
    }

    /// Filter box edited.
    pub fn set_filter_input(&mut self, text: &str) {
        self.filter_input = text.to_string();
        match self.filter_state.set_text(text) {
            Ok(()) => self.filter_error = None,
            Err(e) => self.filter_error = Some(e.to_string()),
        }
        self.apply_filters();
    }

    /// Regex toggle flipped. An invalid pattern leaves the mode unchanged.
    pub fn set_use_regex(&mut self, use_regex: bool) {
        match self.filter_state.set_use_regex(use_regex) {
            Ok(()) => self.filter_error = None,
            Err(e) => self.filter_error = Some(e.to_string()),
        }
        self.apply_filters();
    }

    /// Filter box committed (Enter or focus lost): remember it in history.
    pub fn commit_filter(&mut self) {
        let before = self.filter_history.items().first().cloned();
        self.filter_history.record(&self.filter_input);
        if self.filter_history.items().first() != before.as_ref() {
            self.save_session();
        }
    }

    /// Re-apply a history item.
    pub fn apply_history_item(&mut self, text: &str) {
        self.set_filter_input(text);
        self.commit_filter();
    }

    pub fn clear_filter(&mut self) {
        self.set_filter_input("");
    }

    /// Filtered list size for the header.
    pub fn visible_count(&self) -> usize {
        self.filtered_indices.len()
    }

    // -------------------------------------------------------------------------
    // Scroll position
    // -------------------------------------------------------------------------

    /// Record whether the list is at the bottom. Returns true on change.
    pub fn set_at_bottom(&mut self, at_bottom: bool) -> bool {
        if self.is_at_bottom == at_bottom {
            return false;
        }
        self.is_at_bottom = at_bottom;
        tracing::debug!(at_bottom, "Request list scroll position changed");
        true
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    pub fn to_session(&self) -> SessionData {
        SessionData {
            version: SESSION_VERSION,
            selected_log_id: self.selected_id.clone(),
            filter: PersistedFilter {
                text: self.filter_input.clone(),
                use_regex: self.filter_state.use_regex,
            },
            filter_history: self.filter_history.items().to_vec(),
            response_segment: self.response_segment,
            request_segment: self.request_segment,
            dark_mode: Some(self.dark_mode),
        }
    }

    /// Apply a loaded session. Filter problems are reported, not fatal.
    pub fn restore_session(&mut self, data: SessionData) {
        self.selected_id = data.selected_log_id;
        self.filter_history =
            FilterHistory::from_items(data.filter_history, self.filter_history.limit());
        self.response_segment = data.response_segment;
        self.request_segment = data.request_segment;
        if let Some(dark) = data.dark_mode {
            self.dark_mode = dark;
        }

        self.filter_state = FilterState::default();
        self.set_filter_input(&data.filter.text);
        if data.filter.use_regex {
            self.set_use_regex(true);
        }
        if let Some(err) = &self.filter_error {
            tracing::warn!(error = %err, "Restored filter is invalid");
        }
    }

    /// Save the session if a session path is configured. Failures are logged.
    pub fn save_session(&self) {
        let Some(path) = &self.session_path else {
            return;
        };
        if let Err(e) = session::save(&self.to_session(), path) {
            tracing::warn!(error = %e, "Failed to save session");
        }
    }
}
