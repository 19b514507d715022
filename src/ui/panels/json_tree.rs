// ReqScope - ui/panels/json_tree.rs
//
// Collapsible tree view of a JSON value. Objects and arrays become
// collapsing headers (open by default); scalars are coloured by type.

use crate::ui::theme;
use egui::RichText;
use serde_json::Value;

/// Render `value` as a tree. `id_salt` keeps expansion state apart between
/// the request and response views.
pub fn render(ui: &mut egui::Ui, id_salt: &str, value: &Value, dark_mode: bool) {
    node(ui, egui::Id::new(id_salt), None, value, dark_mode);
}

fn node(ui: &mut egui::Ui, id: egui::Id, key: Option<&str>, value: &Value, dark_mode: bool) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            egui::CollapsingHeader::new(header_text(key, '{', '}', map.len()))
                .id_salt(id)
                .default_open(true)
                .show(ui, |ui| {
                    for (k, v) in map {
                        node(ui, id.with(k), Some(k.as_str()), v, dark_mode);
                    }
                });
        }
        Value::Array(items) if !items.is_empty() => {
            egui::CollapsingHeader::new(header_text(key, '[', ']', items.len()))
                .id_salt(id)
                .default_open(true)
                .show(ui, |ui| {
                    for (i, v) in items.iter().enumerate() {
                        let index = i.to_string();
                        node(ui, id.with(i), Some(index.as_str()), v, dark_mode);
                    }
                });
        }
        leaf => {
            ui.horizontal(|ui| {
                if let Some(k) = key {
                    ui.label(
                        RichText::new(format!("{k}:"))
                            .monospace()
                            .color(theme::json_key_colour(dark_mode)),
                    );
                }
                ui.add(egui::Label::new(scalar_text(leaf, dark_mode)).selectable(true));
            });
        }
    }
}

fn header_text(key: Option<&str>, open: char, close: char, len: usize) -> String {
    let noun = if len == 1 { "item" } else { "items" };
    match key {
        Some(k) => format!("{k}: {open}{len} {noun}{close}"),
        None => format!("{open}{len} {noun}{close}"),
    }
}

/// Scalars and empty containers, coloured by JSON type.
fn scalar_text(value: &Value, dark_mode: bool) -> RichText {
    let (text, colour) = match value {
        Value::String(s) => (format!("\"{s}\""), theme::json_string_colour(dark_mode)),
        Value::Number(n) => (n.to_string(), theme::json_number_colour(dark_mode)),
        other => (other.to_string(), theme::json_literal_colour(dark_mode)),
    };
    RichText::new(text).monospace().color(colour)
}
