// ReqScope - app/poller.rs
//
// Background polling of a `LogSource` for newly written log files.
//
// Architecture:
//   - `PollManager` lives on the UI thread; `run_poller` runs on a background
//     thread and ticks every poll interval (the first tick is immediate).
//   - An `Arc<AtomicBool>` cancel flag stops the thread; a second flag pauses
//     it while the user has scrolled away from the newest request.
//   - Results are sent as `PollProgress` messages over an mpsc channel which
//     the UI drains each frame.
//
// Error handling:
//   - A failed listing is reported as `ListFailed`; the next tick retries.
//   - A file that cannot be fetched or decoded is reported as `FetchWarning`
//     and dropped; the rest of the batch is still delivered.
//   - The sleep is split into POLL_CANCEL_CHECK_INTERVAL_MS slices so a
//     cancel is noticed promptly.

use crate::app::source::LogSource;
use crate::core::listing::latest_file_name;
use crate::core::model::{sort_by_timestamp, HttpLogEntry, PollProgress};
use crate::util::constants::POLL_CANCEL_CHECK_INTERVAL_MS;
use crate::util::error::SourceError;
use rayon::prelude::*;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

// =============================================================================
// PollManager
// =============================================================================

/// Owns the poll thread's channel and control flags.
pub struct PollManager {
    /// Channel receiver for the UI to drain poll progress messages.
    pub progress_rx: Option<mpsc::Receiver<PollProgress>>,
    /// Cancel flag shared with the background thread.
    cancel_flag: Option<Arc<AtomicBool>>,
    /// Pause flag shared with the background thread. Survives restarts so a
    /// reconnect while scrolled up stays paused.
    pause_flag: Arc<AtomicBool>,
}

impl PollManager {
    pub fn new() -> Self {
        Self {
            progress_rx: None,
            cancel_flag: None,
            pause_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Start polling `source`. A running poller is stopped first.
    pub fn start(&mut self, source: Arc<dyn LogSource>, interval_ms: u64) {
        self.stop();

        let (tx, rx) = mpsc::channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let paused = Arc::clone(&self.pause_flag);

        self.progress_rx = Some(rx);
        self.cancel_flag = Some(Arc::clone(&cancel));

        let label = source.describe();
        std::thread::spawn(move || {
            run_poller(source, interval_ms, tx, cancel, paused);
        });

        tracing::info!(source = %label, interval_ms, "Polling started");
    }

    /// Ask the poll thread to exit. Messages already queued are discarded;
    /// the receiver is kept so the thread's final `Stopped` still reaches the
    /// UI. `start` replaces it.
    pub fn stop(&mut self) {
        if let Some(flag) = self.cancel_flag.take() {
            flag.store(true, Ordering::SeqCst);
            tracing::debug!("Polling stop requested");
            if let Some(ref rx) = self.progress_rx {
                while rx.try_recv().is_ok() {}
            }
        }
    }

    /// Skip poll ticks while `paused` is set.
    pub fn set_paused(&self, paused: bool) {
        let was = self.pause_flag.swap(paused, Ordering::SeqCst);
        if was != paused {
            tracing::debug!(paused, "Polling pause state changed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.pause_flag.load(Ordering::SeqCst)
    }

    pub fn is_active(&self) -> bool {
        self.cancel_flag.is_some()
    }

    /// Drain up to `max` queued messages without blocking.
    pub fn poll_progress(&self, max: usize) -> Vec<PollProgress> {
        let mut messages = Vec::new();
        if let Some(ref rx) = self.progress_rx {
            while messages.len() < max {
                match rx.try_recv() {
                    Ok(msg) => messages.push(msg),
                    Err(_) => break,
                }
            }
        }
        messages
    }
}

impl Default for PollManager {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Poll cursor
// =============================================================================

/// File names the poller has already delivered.
#[derive(Debug, Default)]
pub struct PollCursor {
    names: Vec<String>,
    seen: HashSet<String>,
}

impl PollCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest known file name, sent to the source as `latest`.
    pub fn latest(&self) -> Option<&str> {
        latest_file_name(&self.names)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Keep only names not delivered before, and remember them.
    fn admit(&mut self, listed: Vec<String>) -> Vec<String> {
        let mut fresh = Vec::new();
        for name in listed {
            if self.seen.insert(name.clone()) {
                self.names.push(name.clone());
                fresh.push(name);
            }
        }
        fresh
    }
}

// =============================================================================
// One tick
// =============================================================================

/// Run a single poll against `source`, returning the messages to deliver.
///
/// Sequence: list files newer than the cursor, drop names already seen,
/// fetch the rest in parallel, report failures, then deliver the fetched
/// entries sorted by timestamp.
pub fn poll_once(source: &dyn LogSource, cursor: &mut PollCursor) -> Vec<PollProgress> {
    let latest = cursor.latest().map(str::to_string);

    let listed = match source.list_files(latest.as_deref()) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(source = %source.describe(), error = %e, "Listing log files failed");
            return vec![PollProgress::ListFailed {
                error: e.to_string(),
            }];
        }
    };

    let fresh = cursor.admit(listed);
    if fresh.is_empty() {
        return vec![PollProgress::Idle];
    }

    tracing::debug!(count = fresh.len(), latest = ?latest, "New log files listed");
    let mut messages = vec![PollProgress::FilesListed {
        files: fresh.clone(),
    }];

    let results: Vec<(String, Result<HttpLogEntry, SourceError>)> = fresh
        .into_par_iter()
        .map(|name| {
            let result = source.fetch_entry(&name);
            (name, result)
        })
        .collect();

    let mut entries = Vec::with_capacity(results.len());
    for (file, result) in results {
        match result {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                tracing::warn!(file = %file, error = %e, "Skipping log file");
                messages.push(PollProgress::FetchWarning {
                    file,
                    message: e.to_string(),
                });
            }
        }
    }

    sort_by_timestamp(&mut entries);
    messages.push(PollProgress::NewEntries { entries });
    messages
}

// =============================================================================
// Background loop
// =============================================================================

fn run_poller(
    source: Arc<dyn LogSource>,
    interval_ms: u64,
    tx: mpsc::Sender<PollProgress>,
    cancel: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
) {
    macro_rules! send {
        ($msg:expr) => {
            if tx.send($msg).is_err() {
                // UI dropped the receiver.
                return;
            }
        };
    }

    send!(PollProgress::Started {
        source: source.describe(),
    });

    let mut cursor = PollCursor::new();
    let slices = (interval_ms / POLL_CANCEL_CHECK_INTERVAL_MS).max(1);
    let mut first_tick = true;

    loop {
        if !first_tick {
            for _ in 0..slices {
                std::thread::sleep(Duration::from_millis(POLL_CANCEL_CHECK_INTERVAL_MS));
                if cancel.load(Ordering::SeqCst) {
                    send!(PollProgress::Stopped);
                    return;
                }
            }
        }
        first_tick = false;

        if cancel.load(Ordering::SeqCst) {
            send!(PollProgress::Stopped);
            return;
        }
        if paused.load(Ordering::SeqCst) {
            continue;
        }

        let messages = poll_once(source.as_ref(), &mut cursor);
        // A tick that overlapped a stop must not deliver stale entries.
        if cancel.load(Ordering::SeqCst) {
            send!(PollProgress::Stopped);
            return;
        }
        for msg in messages {
            send!(msg);
        }
    }
}
