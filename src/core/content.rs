// ReqScope - core/content.rs
//
// Body classification and rendering decisions for the detail pane.
//
// A body is shown as, in priority order:
//   1. formatted + highlighted HTML when it is a string that looks like markup,
//   2. a JSON tree when it is a string holding a JSON object or array,
//   3. a JSON tree when it already is an object or array,
//   4. plain text otherwise.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::core::html::{self, HtmlFormatOptions, HtmlSpan};
use crate::util::constants::MAX_FORMATTED_BODY_BYTES;
use serde_json::Value;
use std::collections::BTreeMap;

/// Markers that make a `<...>` string count as HTML.
const HTML_MARKERS: &[&str] = &[
    "<html", "<!DOCTYPE", "<div", "<span", "<p", "<body", "<head", "<table", "<ul", "<ol",
];

/// How a body will be displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Html,
    JsonText,
    JsonValue,
    Plain,
}

/// A body prepared for display.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedContent {
    Html {
        formatted: String,
        spans: Vec<HtmlSpan>,
    },
    Json(Value),
    Plain(String),
}

/// Whether a string looks like an HTML document or fragment.
pub fn is_html_content(content: &str) -> bool {
    let trimmed = content.trim();
    trimmed.starts_with('<')
        && trimmed.ends_with('>')
        && HTML_MARKERS.iter().any(|marker| trimmed.contains(marker))
}

/// Whether a string parses as a JSON object or array.
///
/// Strings holding a bare JSON scalar (`"42"`, `"true"`) do not count.
pub fn is_json_string(content: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(content),
        Ok(Value::Object(_) | Value::Array(_))
    )
}

/// Decide how a body value will be displayed.
pub fn classify(value: &Value) -> ContentKind {
    match value {
        Value::String(s) if is_html_content(s) => ContentKind::Html,
        Value::String(s) if is_json_string(s) => ContentKind::JsonText,
        Value::Object(_) | Value::Array(_) => ContentKind::JsonValue,
        _ => ContentKind::Plain,
    }
}

/// Prepare a body for display.
///
/// HTML that cannot be formatted, and bodies too large to format, fall
/// back to plain text.
pub fn render_content(value: &Value) -> RenderedContent {
    match (classify(value), value) {
        (ContentKind::Html, Value::String(s)) => {
            if s.len() > MAX_FORMATTED_BODY_BYTES {
                return RenderedContent::Plain(s.clone());
            }
            match html::format_html(s, &HtmlFormatOptions::default()) {
                Ok(formatted) => {
                    let spans = html::highlight_html(&formatted);
                    RenderedContent::Html { formatted, spans }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "HTML formatting failed; showing raw body");
                    RenderedContent::Plain(s.clone())
                }
            }
        }
        (ContentKind::JsonText, Value::String(s)) => match serde_json::from_str(s) {
            Ok(parsed) => RenderedContent::Json(parsed),
            Err(_) => RenderedContent::Plain(s.clone()),
        },
        (ContentKind::JsonValue, v) => RenderedContent::Json(v.clone()),
        (_, v) => RenderedContent::Plain(plain_text(v)),
    }
}

/// Scalar bodies as text: strings verbatim, everything else as JSON text.
pub fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Headers as two-space-indented JSON.
pub fn headers_text(headers: &BTreeMap<String, String>) -> String {
    serde_json::to_string_pretty(headers).unwrap_or_else(|_| String::from("{}"))
}

/// Text placed on the clipboard for a rendered body.
pub fn copy_text(content: &RenderedContent) -> String {
    match content {
        RenderedContent::Html { formatted, .. } => formatted.clone(),
        RenderedContent::Json(v) => {
            serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string())
        }
        RenderedContent::Plain(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_html_content() {
        assert!(is_html_content("<html><body>x</body></html>"));
        assert!(is_html_content("  <div>x</div>\n"));
        assert!(is_html_content("<!DOCTYPE html><title>t</title>"));
        assert!(is_html_content("<p>para</p>"));
        // Markup-shaped but none of the markers.
        assert!(!is_html_content("<note>x</note>"));
        assert!(!is_html_content("<div>unterminated"));
        assert!(!is_html_content("plain <div> text"));
    }

    #[test]
    fn test_is_json_string_requires_object_or_array() {
        assert!(is_json_string(r#"{"a": 1}"#));
        assert!(is_json_string("[1, 2]"));
        assert!(!is_json_string("42"));
        assert!(!is_json_string("\"str\""));
        assert!(!is_json_string("null"));
        assert!(!is_json_string("{broken"));
    }

    #[test]
    fn test_classify_priority() {
        assert_eq!(classify(&json!("<div>a</div>")), ContentKind::Html);
        assert_eq!(classify(&json!(r#"{"k": "v"}"#)), ContentKind::JsonText);
        assert_eq!(classify(&json!({"k": "v"})), ContentKind::JsonValue);
        assert_eq!(classify(&json!([1])), ContentKind::JsonValue);
        assert_eq!(classify(&json!("hello")), ContentKind::Plain);
        assert_eq!(classify(&json!(7)), ContentKind::Plain);
        assert_eq!(classify(&Value::Null), ContentKind::Plain);
    }

    #[test]
    fn test_render_html_is_formatted_and_highlighted() {
        match render_content(&json!("<div><p>a</p></div>")) {
            RenderedContent::Html { formatted, spans } => {
                assert_eq!(formatted, "<div>\n  <p>a</p>\n</div>");
                assert_eq!(spans.last().map(|s| s.range.end), Some(formatted.len()));
            }
            other => panic!("expected Html, got {other:?}"),
        }
    }

    #[test]
    fn test_render_broken_html_falls_back_to_plain() {
        let raw = "<div><!-- never closed </div>";
        assert_eq!(
            render_content(&json!(raw)),
            RenderedContent::Plain(raw.to_string())
        );
    }

    #[test]
    fn test_render_html_with_unicode_indent_and_comparisons() {
        let body = "<body><p>if a < b</p><style>\n\u{3000}p {}\n\u{a0} a {}\n</style></body>";
        match render_content(&json!(body)) {
            RenderedContent::Html { formatted, spans } => {
                assert!(formatted.contains("<p>if a < b</p>"), "{formatted}");
                assert!(formatted.contains("\u{3000}p {}"), "{formatted}");
                assert_eq!(spans.last().map(|s| s.range.end), Some(formatted.len()));
            }
            other => panic!("expected Html, got {other:?}"),
        }
    }

    #[test]
    fn test_render_json_string_is_parsed() {
        assert_eq!(
            render_content(&json!(r#"{"ok": true}"#)),
            RenderedContent::Json(json!({"ok": true}))
        );
    }

    #[test]
    fn test_render_plain_scalars() {
        assert_eq!(render_content(&json!("hi")), RenderedContent::Plain("hi".into()));
        assert_eq!(render_content(&json!(3.5)), RenderedContent::Plain("3.5".into()));
        assert_eq!(render_content(&json!(false)), RenderedContent::Plain("false".into()));
        assert_eq!(render_content(&Value::Null), RenderedContent::Plain("null".into()));
    }

    #[test]
    fn test_headers_text_pretty() {
        let mut h = BTreeMap::new();
        h.insert("Accept".to_string(), "*/*".to_string());
        assert_eq!(headers_text(&h), "{\n  \"Accept\": \"*/*\"\n}");
        assert_eq!(headers_text(&BTreeMap::new()), "{}");
    }

    #[test]
    fn test_copy_text() {
        assert_eq!(copy_text(&RenderedContent::Json(json!({"a": 1}))), "{\n  \"a\": 1\n}");
        assert_eq!(copy_text(&RenderedContent::Plain("x".into())), "x");
    }
}
