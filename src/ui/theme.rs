// ReqScope - ui/theme.rs
//
// Colour scheme, status/method colour mapping, syntax colours, and layout
// constants. No dependencies on app state or business logic.

use crate::core::html::HtmlSpanKind;
use egui::Color32;

/// Colour for an HTTP status code badge.
pub fn status_colour(status: Option<u16>) -> Color32 {
    match status {
        Some(200..=299) => Color32::from_rgb(22, 163, 74),  // Green 600
        Some(300..=399) => Color32::from_rgb(37, 99, 235),  // Blue 600
        Some(400..=499) => Color32::from_rgb(217, 119, 6),  // Amber 600
        Some(500..=599) => Color32::from_rgb(220, 38, 38),  // Red 600
        _ => Color32::from_rgb(107, 114, 128),              // Gray 500
    }
}

/// Colour for the method column of a request row.
pub fn method_colour(method: &str, dark_mode: bool) -> Color32 {
    let (dark, light) = match method.to_ascii_uppercase().as_str() {
        "GET" => ((96, 165, 250), (29, 78, 216)),     // Blue
        "POST" => ((74, 222, 128), (21, 128, 61)),    // Green
        "PUT" | "PATCH" => ((251, 191, 36), (180, 83, 9)), // Amber
        "DELETE" => ((248, 113, 113), (185, 28, 28)), // Red
        _ => ((192, 132, 252), (126, 34, 206)),       // Purple
    };
    let (r, g, b) = if dark_mode { dark } else { light };
    Color32::from_rgb(r, g, b)
}

/// Foreground colour for list row text.
pub fn row_text_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(243, 244, 246) // Gray 100
    } else {
        Color32::from_rgb(17, 24, 39) // Gray 900
    }
}

/// Colour for a highlighted HTML span.
pub fn html_span_colour(kind: HtmlSpanKind, dark_mode: bool) -> Color32 {
    let (dark, light) = match kind {
        HtmlSpanKind::Punctuation => ((128, 128, 128), (128, 128, 128)),
        HtmlSpanKind::TagName => ((86, 156, 214), (128, 0, 0)),
        HtmlSpanKind::AttrName => ((156, 220, 254), (255, 0, 0)),
        HtmlSpanKind::AttrValue => ((206, 145, 120), (0, 0, 255)),
        HtmlSpanKind::Comment => ((106, 153, 85), (0, 128, 0)),
        HtmlSpanKind::Doctype => ((197, 134, 192), (128, 0, 128)),
        HtmlSpanKind::Text => return row_text_colour(dark_mode),
    };
    let (r, g, b) = if dark_mode { dark } else { light };
    Color32::from_rgb(r, g, b)
}

/// JSON tree colours.
pub fn json_key_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(156, 220, 254)
    } else {
        Color32::from_rgb(4, 81, 165)
    }
}

pub fn json_string_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(206, 145, 120)
    } else {
        Color32::from_rgb(163, 21, 21)
    }
}

pub fn json_number_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(181, 206, 168)
    } else {
        Color32::from_rgb(9, 134, 88)
    }
}

pub fn json_literal_colour(dark_mode: bool) -> Color32 {
    if dark_mode {
        Color32::from_rgb(86, 156, 214)
    } else {
        Color32::from_rgb(0, 0, 255)
    }
}

/// Apply theme and font size to the egui context.
pub fn apply(ctx: &egui::Context, dark_mode: bool, font_size: f32) {
    ctx.set_theme(if dark_mode {
        egui::Theme::Dark
    } else {
        egui::Theme::Light
    });
    ctx.style_mut(|style| {
        use egui::{FontFamily, FontId, TextStyle};
        style.text_styles = [
            (TextStyle::Small, FontId::new(font_size - 3.0, FontFamily::Proportional)),
            (TextStyle::Body, FontId::new(font_size, FontFamily::Proportional)),
            (TextStyle::Button, FontId::new(font_size, FontFamily::Proportional)),
            (TextStyle::Heading, FontId::new(font_size + 6.0, FontFamily::Proportional)),
            (TextStyle::Monospace, FontId::new(font_size - 1.0, FontFamily::Monospace)),
        ]
        .into();
    });
}

/// Layout constants.
pub const SIDEBAR_WIDTH: f32 = 460.0;
pub const SIDEBAR_MIN_WIDTH: f32 = 280.0;
pub const ROW_HEIGHT: f32 = 20.0;
pub const ROW_FONT_SIZE: f32 = 12.0;
pub const URL_MAX_CHARS: usize = 90;
