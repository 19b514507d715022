// ReqScope - ui/panels/detail.rs
//
// Detail pane for the selected request: summary grid, then the Response and
// Request sections, each with a Body / Header segment control.
//
// Body formatting (HTML pretty-printing, JSON parsing) runs once per
// selected entry and is cached in `DetailCache`, not redone every frame.

use crate::app::state::AppState;
use crate::core::content::{copy_text, headers_text, render_content, RenderedContent};
use crate::core::model::{HttpLogEntry, Segment};
use crate::ui::panels::content_view;
use crate::ui::theme;
use std::collections::BTreeMap;

/// Prepared bodies of the entry currently shown.
#[derive(Default)]
pub struct DetailCache {
    current: Option<PreparedEntry>,
}

struct PreparedEntry {
    id: String,
    request: RenderedContent,
    response: RenderedContent,
}

impl DetailCache {
    fn prepare(&mut self, entry: &HttpLogEntry) -> &PreparedEntry {
        if self.current.as_ref().map_or(true, |p| p.id != entry.id()) {
            tracing::debug!(id = %entry.id(), "Preparing request bodies for display");
            self.current = None;
        }
        self.current.get_or_insert_with(|| PreparedEntry {
            id: entry.id().to_string(),
            request: render_content(&entry.body),
            response: render_content(&entry.response.body),
        })
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

/// Render the detail pane (central panel).
pub fn render(ui: &mut egui::Ui, state: &mut AppState, cache: &mut DetailCache) {
    let Some(entry) = state.selected_entry() else {
        ui.centered_and_justified(|ui| {
            ui.label("Select a request to view its details.");
        });
        return;
    };

    let prepared = cache.prepare(entry);
    let dark_mode = state.dark_mode;
    let mut response_segment = state.response_segment;
    let mut request_segment = state.request_segment;

    egui::ScrollArea::vertical()
        .id_salt("detail_scroll")
        .auto_shrink([false; 2])
        .show(ui, |ui| {
            summary_grid(ui, entry, dark_mode);
            ui.separator();
            section(
                ui,
                "Response",
                "response_body",
                &mut response_segment,
                &entry.response.headers,
                &prepared.response,
                dark_mode,
            );
            ui.add_space(12.0);
            section(
                ui,
                "Request",
                "request_body",
                &mut request_segment,
                &entry.headers,
                &prepared.request,
                dark_mode,
            );
        });

    if response_segment != state.response_segment || request_segment != state.request_segment {
        state.response_segment = response_segment;
        state.request_segment = request_segment;
        state.save_session();
    }
}

fn summary_grid(ui: &mut egui::Ui, entry: &HttpLogEntry, dark_mode: bool) {
    egui::Grid::new("detail_grid")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| {
            ui.label("Method:");
            ui.label(
                egui::RichText::new(&entry.method)
                    .strong()
                    .color(theme::method_colour(&entry.method, dark_mode)),
            );
            ui.end_row();

            ui.label("URL:");
            ui.add(
                egui::Label::new(egui::RichText::new(&entry.full_url).monospace())
                    .selectable(true),
            );
            ui.end_row();

            ui.label("Status:");
            let status = entry
                .response
                .status_code
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            ui.label(
                egui::RichText::new(status)
                    .strong()
                    .color(theme::status_colour(entry.response.status_code)),
            );
            ui.end_row();

            ui.label("Time:");
            ui.label(entry.display_time());
            ui.end_row();

            if let Some(ref path) = entry.path {
                ui.label("Path:");
                ui.label(egui::RichText::new(path).monospace());
                ui.end_row();
            }

            if let Some(cost) = entry.cost {
                ui.label("Duration:");
                ui.label(format!("{cost:.3} s"));
                ui.end_row();
            }
        });
}

fn section(
    ui: &mut egui::Ui,
    title: &str,
    id_salt: &str,
    segment: &mut Segment,
    headers: &BTreeMap<String, String>,
    body: &RenderedContent,
    dark_mode: bool,
) {
    ui.horizontal(|ui| {
        ui.heading(title);
        ui.add_space(12.0);
        for choice in [Segment::Body, Segment::Headers] {
            ui.selectable_value(&mut *segment, choice, choice.label());
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("Copy").clicked() {
                let text = match *segment {
                    Segment::Body => copy_text(body),
                    Segment::Headers => headers_text(headers),
                };
                ui.ctx().copy_text(text);
            }
        });
    });
    ui.separator();

    match *segment {
        Segment::Body => content_view::render(ui, id_salt, body, dark_mode),
        Segment::Headers => content_view::text_block(ui, &headers_text(headers)),
    }
}
