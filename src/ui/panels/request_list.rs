// ReqScope - ui/panels/request_list.rs
//
// Virtual-scrolling list of recorded requests, oldest at the top.
//
// Uses `ScrollArea::show_rows` so only visible rows are laid out. The list
// sticks to the bottom while the user is there; scrolling up more than
// AT_BOTTOM_THRESHOLD_PX clears `is_at_bottom`, which pauses polling.

use crate::app::state::AppState;
use crate::core::model::HttpLogEntry;
use crate::ui::theme;
use crate::util::constants::AT_BOTTOM_THRESHOLD_PX;
use egui::text::{LayoutJob, TextFormat};

/// Render the request list into the remaining space of `ui`.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    let rows = state.filtered_indices.len();

    if rows == 0 {
        ui.centered_and_justified(|ui| {
            if state.loading {
                ui.spinner();
            } else if state.entries.is_empty() {
                ui.label("No request logs yet.");
            } else {
                ui.label("No requests match the filter.");
            }
        });
        state.set_at_bottom(true);
        return;
    }

    let row_height = theme::ROW_HEIGHT;
    let mut scroll = egui::ScrollArea::vertical()
        .id_salt("request_list")
        .auto_shrink([false; 2])
        .stick_to_bottom(state.is_at_bottom);
    if state.scroll_to_bottom {
        let full_height = rows as f32 * (row_height + ui.spacing().item_spacing.y);
        scroll = scroll.vertical_scroll_offset(full_height);
        state.scroll_to_bottom = false;
    }

    // Clicks are applied after show_rows releases the borrow on `entries`.
    let mut clicked: Option<String> = None;

    let output = scroll.show_rows(ui, row_height, rows, |ui, row_range| {
        for display_idx in row_range {
            let Some(entry) = state
                .filtered_indices
                .get(display_idx)
                .and_then(|&idx| state.entries.get(idx))
            else {
                continue;
            };

            let is_selected = state.selected_id.as_deref() == Some(entry.id());
            let job = row_layout(entry, state.dark_mode);
            let response = ui
                .add_sized(
                    [ui.available_width(), row_height],
                    egui::SelectableLabel::new(is_selected, job),
                )
                .on_hover_ui(|ui| {
                    ui.label(&entry.full_url);
                    ui.label(egui::RichText::new(&entry.timestamp).monospace().small());
                });
            if response.clicked() {
                clicked = Some(entry.id().to_string());
            }
        }
    });

    let max_offset = (output.content_size.y - output.inner_rect.height()).max(0.0);
    let distance_from_bottom = max_offset - output.state.offset.y;
    state.set_at_bottom(distance_from_bottom <= AT_BOTTOM_THRESHOLD_PX);

    if let Some(id) = clicked {
        state.select(&id);
    }
}

/// One row: time, method, status badge, URL.
fn row_layout(entry: &HttpLogEntry, dark_mode: bool) -> LayoutJob {
    let font = egui::FontId::monospace(theme::ROW_FONT_SIZE);
    let body_colour = theme::row_text_colour(dark_mode);
    let fmt = |color| TextFormat {
        font_id: font.clone(),
        color,
        ..Default::default()
    };

    let time = entry
        .parsed_time()
        .map(|t| t.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    let status = entry
        .response
        .status_code
        .map(|s| s.to_string())
        .unwrap_or_else(|| "---".to_string());

    let mut job = LayoutJob::default();
    job.append(&format!("{time} "), 0.0, fmt(body_colour.gamma_multiply(0.6)));
    job.append(
        &format!("{:<6} ", entry.method),
        0.0,
        fmt(theme::method_colour(&entry.method, dark_mode)),
    );
    job.append(
        &format!("{status} "),
        0.0,
        fmt(theme::status_colour(entry.response.status_code)),
    );
    job.append(
        &truncate_url(&entry.full_url, theme::URL_MAX_CHARS),
        0.0,
        fmt(body_colour),
    );
    job
}

/// Keep the first `max` characters of `url`, marking the cut with an ellipsis.
fn truncate_url(url: &str, max: usize) -> String {
    if url.chars().count() <= max {
        return url.to_string();
    }
    let mut out: String = url.chars().take(max.saturating_sub(1)).collect();
    out.push('\u{2026}');
    out
}
