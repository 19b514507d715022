// ReqScope - ui/panels/content_view.rs
//
// Display of one prepared body: highlighted HTML, JSON tree, or plain text.

use crate::core::content::RenderedContent;
use crate::core::html::HtmlSpan;
use crate::ui::panels::json_tree;
use crate::ui::theme;
use egui::text::{LayoutJob, TextFormat};

pub fn render(ui: &mut egui::Ui, id_salt: &str, content: &RenderedContent, dark_mode: bool) {
    match content {
        RenderedContent::Html { formatted, spans } => {
            let font = egui::TextStyle::Monospace.resolve(ui.style());
            let job = html_layout(formatted, spans, font, dark_mode);
            ui.add(egui::Label::new(job).selectable(true).extend());
        }
        RenderedContent::Json(value) => json_tree::render(ui, id_salt, value, dark_mode),
        RenderedContent::Plain(text) => text_block(ui, text),
    }
}

/// Read-only monospace text that can be selected and copied.
pub fn text_block(ui: &mut egui::Ui, text: &str) {
    if text.is_empty() {
        ui.weak("(empty)");
        return;
    }
    let mut view = text;
    ui.add(
        egui::TextEdit::multiline(&mut view)
            .code_editor()
            .desired_rows(1)
            .desired_width(f32::INFINITY),
    );
}

/// Colour each highlighted span of formatted HTML.
pub fn html_layout(
    formatted: &str,
    spans: &[HtmlSpan],
    font: egui::FontId,
    dark_mode: bool,
) -> LayoutJob {
    let mut job = LayoutJob::default();
    for span in spans {
        let Some(text) = formatted.get(span.range.clone()) else {
            continue;
        };
        job.append(
            text,
            0.0,
            TextFormat {
                font_id: font.clone(),
                color: theme::html_span_colour(span.kind, dark_mode),
                ..Default::default()
            },
        );
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::html::highlight_html;

    #[test]
    fn test_html_layout_covers_whole_text() {
        let html = "<a href=\"/x\">go</a>";
        let spans = highlight_html(html);
        let job = html_layout(html, &spans, egui::FontId::monospace(12.0), true);
        assert_eq!(job.text, html);
        assert_eq!(job.sections.len(), spans.len());
    }
}
