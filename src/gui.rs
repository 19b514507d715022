// ReqScope - gui.rs
//
// Top-level eframe::App implementation.
// Wires together the UI panels and owns the poller lifecycle.

use crate::app::poller::PollManager;
use crate::app::source::{open_source, SourceSpec};
use crate::app::state::AppState;
use crate::core::export;
use crate::ui;
use crate::ui::panels::detail::DetailCache;
use crate::util::constants::MAX_POLL_MESSAGES_PER_FRAME;
use std::time::Duration;

/// How often the UI wakes to drain poll messages when otherwise idle.
const IDLE_REPAINT_MS: u64 = 250;

/// The ReqScope application.
pub struct ReqScopeApp {
    pub state: AppState,
    pub poller: PollManager,
    source_spec: Option<SourceSpec>,
    poll_interval_ms: u64,
    detail_cache: DetailCache,
    /// Theme and font size last pushed to the egui context.
    applied_style: Option<(bool, f32)>,
}

impl ReqScopeApp {
    /// Create the app and start polling `source_spec` (if any).
    pub fn new(state: AppState, source_spec: Option<SourceSpec>, poll_interval_ms: u64) -> Self {
        let mut app = Self {
            state,
            poller: PollManager::new(),
            source_spec,
            poll_interval_ms,
            detail_cache: DetailCache::default(),
            applied_style: None,
        };
        app.connect();
        app
    }

    /// (Re)open the current source and restart the poller.
    fn connect(&mut self) {
        let Some(spec) = self.source_spec.clone() else {
            return;
        };
        self.poller.stop();
        self.state.reset_for_new_source();
        self.detail_cache.clear();

        match open_source(&spec) {
            Ok(source) => {
                self.state.source_label = source.describe();
                self.poller.start(source, self.poll_interval_ms);
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot open log source");
                self.state.loading = false;
                self.state.error = Some(e.to_string());
            }
        }
    }

    /// Write the selected entry to a file picked by the user.
    fn save_selected_entry(&mut self) {
        let Some(entry) = self.state.selected_entry() else {
            return;
        };
        let default_name = format!(
            "{}.json",
            entry.id().replace(|c: char| c == ':' || c == '.', "-")
        );
        let Some(dest) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(default_name)
            .save_file()
        else {
            return;
        };

        let result = std::fs::File::create(&dest)
            .map_err(|e| crate::util::error::ReqScopeError::Io {
                path: dest.clone(),
                operation: "create export file",
                source: e,
            })
            .and_then(|f| export::export_entry(entry, f, &dest));

        self.state.status_message = match result {
            Ok(()) => format!("Saved request to {}.", dest.display()),
            Err(e) => {
                tracing::warn!(error = %e, "Saving request failed");
                format!("Save failed: {e}")
            }
        };
    }

    /// Write every entry passing the filter to a file picked by the user.
    fn export_filtered(&mut self) {
        let Some(dest) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("requests.json")
            .save_file()
        else {
            return;
        };

        let entries = self
            .state
            .filtered_indices
            .iter()
            .filter_map(|&i| self.state.entries.get(i));
        let result = std::fs::File::create(&dest)
            .map_err(|e| crate::util::error::ReqScopeError::Io {
                path: dest.clone(),
                operation: "create export file",
                source: e,
            })
            .and_then(|f| export::export_entries(entries, f, &dest));

        self.state.status_message = match result {
            Ok(n) => format!("Exported {n} requests to {}.", dest.display()),
            Err(e) => {
                tracing::warn!(error = %e, "Export failed");
                format!("Export failed: {e}")
            }
        };
    }

    fn menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("Open Logs Directory\u{2026}").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.state.pending_dir = Some(path);
                        }
                        ui.close_menu();
                    }
                    ui.separator();
                    let has_selection = self.state.selected_entry().is_some();
                    if ui
                        .add_enabled(has_selection, egui::Button::new("Save Request As\u{2026}"))
                        .clicked()
                    {
                        self.save_selected_entry();
                        ui.close_menu();
                    }
                    let has_entries = !self.state.filtered_indices.is_empty();
                    if ui
                        .add_enabled(has_entries, egui::Button::new("Export Filtered\u{2026}"))
                        .clicked()
                    {
                        self.export_filtered();
                        ui.close_menu();
                    }
                    ui.separator();
                    if ui.button("Exit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
                ui.menu_button("View", |ui| {
                    let label = if self.state.dark_mode {
                        "Light Theme"
                    } else {
                        "Dark Theme"
                    };
                    if ui.button(label).clicked() {
                        self.state.dark_mode = !self.state.dark_mode;
                        self.state.save_session();
                        ui.close_menu();
                    }
                    if ui.button("Reconnect").clicked() {
                        self.state.reconnect_requested = true;
                        ui.close_menu();
                    }
                });
            });
        });
    }

    fn status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if self.poller.is_active() && self.poller.is_paused() {
                    ui.label(
                        egui::RichText::new(" PAUSED ")
                            .strong()
                            .color(egui::Color32::from_rgb(217, 119, 6)) // Amber 600
                            .background_color(egui::Color32::from_rgba_premultiplied(
                                217, 119, 6, 30,
                            )),
                    )
                    .on_hover_text("Scroll to the bottom of the list to resume polling");
                    ui.separator();
                }
                if self.state.debug_mode {
                    ui.label(
                        egui::RichText::new(" DEBUG ")
                            .strong()
                            .color(egui::Color32::from_rgb(124, 58, 237)), // Violet 600
                    )
                    .on_hover_text("Debug logging is on (--debug)");
                    ui.separator();
                }
                if !self.state.source_label.is_empty() {
                    ui.label(egui::RichText::new(&self.state.source_label).monospace());
                    ui.separator();
                }
                ui.label(&self.state.status_message);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let total = self.state.entries.len();
                    let shown = self.state.visible_count();
                    if total > 0 {
                        ui.label(format!("{shown}/{total} requests"));
                    }
                    let warnings = self.state.warnings.len();
                    if warnings > 0 {
                        let last = self.state.warnings.last().cloned().unwrap_or_default();
                        ui.colored_label(
                            ui.visuals().warn_fg_color,
                            format!("{warnings} warnings"),
                        )
                        .on_hover_text(last);
                    }
                });
            });
        });
    }

    fn error_screen(&mut self, ctx: &egui::Context, error: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(ui.available_height() * 0.3);
                ui.heading("Error");
                ui.add_space(8.0);
                ui.colored_label(ui.visuals().error_fg_color, error);
                ui.add_space(12.0);
                ui.horizontal(|ui| {
                    if ui.button("Retry").clicked() {
                        self.state.reconnect_requested = true;
                    }
                    if ui.button("Open Logs Directory\u{2026}").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_folder() {
                            self.state.pending_dir = Some(path);
                        }
                    }
                });
            });
        });
    }
}

impl eframe::App for ReqScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let style = (self.state.dark_mode, self.state.font_size);
        if self.applied_style != Some(style) {
            ui::theme::apply(ctx, style.0, style.1);
            self.applied_style = Some(style);
        }

        // Drain poll results.
        let messages = self.poller.poll_progress(MAX_POLL_MESSAGES_PER_FRAME);
        let had_messages = !messages.is_empty();
        for msg in messages {
            self.state.handle_progress(msg);
        }

        // Source switches requested by menus or the error screen.
        if let Some(dir) = self.state.pending_dir.take() {
            tracing::info!(dir = %dir.display(), "Switching to logs directory");
            self.source_spec = Some(SourceSpec::Directory(dir));
            self.connect();
        }
        if self.state.reconnect_requested {
            self.state.reconnect_requested = false;
            self.connect();
        }

        self.menu_bar(ctx);
        self.status_bar(ctx);

        if let Some(error) = self.state.error.clone() {
            self.error_screen(ctx, &error);
            return;
        }

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(format!("{} request logs", self.state.file_names.len()));
                if self.state.loading {
                    ui.spinner();
                }
            });
        });

        egui::SidePanel::left("request_list_panel")
            .default_width(ui::theme::SIDEBAR_WIDTH)
            .min_width(ui::theme::SIDEBAR_MIN_WIDTH)
            .resizable(true)
            .show(ctx, |ui| {
                ui::panels::filters::render(ui, &mut self.state);
                ui.separator();
                ui::panels::request_list::render(ui, &mut self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui::panels::detail::render(ui, &mut self.state, &mut self.detail_cache);
        });

        // Polling only runs while the newest request is in view.
        self.poller.set_paused(!self.state.is_at_bottom);

        if had_messages {
            ctx.request_repaint();
        } else if self.poller.is_active() {
            ctx.request_repaint_after(Duration::from_millis(IDLE_REPAINT_MS));
        }
    }

    /// Saves the session and stops the poller before the window closes.
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.poller.stop();
        self.state.save_session();
    }
}
