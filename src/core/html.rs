// ReqScope - core/html.rs
//
// HTML pretty-printer and highlighter for response bodies.
//
// The formatter is a small token-level beautifier, not a conforming parser:
//   - block elements start on a new line and indent their children;
//   - text and inline elements flow on the current line and wrap at
//     `wrap_line_length`;
//   - an element whose content never left its opening line is closed on
//     that same line (`<p>Hello</p>`);
//   - void elements and self-closing tags never change the depth;
//   - `<script>`, `<style>`, `<pre>` and `<textarea>` content is kept as-is;
//   - comments and doctypes always stand on their own line;
//   - runs of blank lines in the source are kept, capped by
//     `max_preserve_newlines`.
//
// The highlighter splits already-formatted text into coloured spans.
// Core layer: pure logic, no I/O or UI dependencies.

use crate::util::constants::{
    HTML_INDENT_SIZE, HTML_MAX_PRESERVE_NEWLINES, HTML_WRAP_LINE_LENGTH,
};
use crate::util::error::HtmlError;
use std::ops::Range;

/// Pretty-printer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlFormatOptions {
    pub indent_size: usize,
    pub wrap_line_length: usize,
    pub preserve_newlines: bool,
    pub max_preserve_newlines: usize,
}

impl Default for HtmlFormatOptions {
    fn default() -> Self {
        Self {
            indent_size: HTML_INDENT_SIZE,
            wrap_line_length: HTML_WRAP_LINE_LENGTH,
            preserve_newlines: true,
            max_preserve_newlines: HTML_MAX_PRESERVE_NEWLINES,
        }
    }
}

const INLINE_ELEMENTS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "dfn", "em", "i",
    "img", "input", "kbd", "label", "mark", "q", "s", "samp", "select", "small", "span",
    "strong", "sub", "sup", "time", "u", "var", "wbr",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "pre", "textarea"];

// =============================================================================
// Lexer
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Doctype(String),
    Comment(String),
    Open {
        name: String,
        text: String,
        self_closing: bool,
    },
    Close {
        name: String,
        text: String,
    },
    Text(String),
    /// Verbatim content of a raw-text element.
    Raw(String),
}

fn lex(input: &str) -> Result<Vec<Token>, HtmlError> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < input.len() {
        let rest = &input[pos..];
        if !starts_markup(rest) {
            let end = text_end(input, pos);
            tokens.push(Token::Text(input[pos..end].to_string()));
            pos = end;
            continue;
        }

        if rest.starts_with("<!--") {
            let end = rest
                .find("-->")
                .ok_or(HtmlError::UnterminatedComment { offset: pos })?;
            tokens.push(Token::Comment(rest[..end + 3].to_string()));
            pos += end + 3;
            continue;
        }

        let end = tag_end(rest).ok_or(HtmlError::UnterminatedTag { offset: pos })?;
        let raw = &rest[..=end];
        pos += end + 1;

        if raw.starts_with("<!") || raw.starts_with("<?") {
            tokens.push(Token::Doctype(collapse_tag_whitespace(raw)));
            continue;
        }

        let text = collapse_tag_whitespace(raw);
        if let Some(stripped) = raw.strip_prefix("</") {
            tokens.push(Token::Close {
                name: tag_name(stripped),
                text,
            });
            continue;
        }

        let name = tag_name(&raw[1..]);
        let self_closing = raw.trim_end_matches('>').trim_end().ends_with('/');
        let is_raw = RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !self_closing;
        tokens.push(Token::Open {
            name: name.clone(),
            text,
            self_closing,
        });

        if is_raw {
            // Everything up to the matching close tag is verbatim content.
            let closing = format!("</{name}");
            let content_end = find_ascii_case_insensitive(&input[pos..], &closing)
                .map(|i| pos + i)
                .unwrap_or(input.len());
            if content_end > pos {
                tokens.push(Token::Raw(input[pos..content_end].to_string()));
            }
            pos = content_end;
        }
    }

    Ok(tokens)
}

/// A `<` opens markup only when followed by a letter, `/`, `!` or `?`.
/// Anything else (`a < b`) is plain text.
fn starts_markup(rest: &str) -> bool {
    let mut chars = rest.chars();
    chars.next() == Some('<')
        && matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || matches!(c, '/' | '!' | '?'))
}

/// End of the text run starting at `pos`: the next `<` after its first
/// character, or the end of input.
fn text_end(input: &str, pos: usize) -> usize {
    let from = pos + input[pos..].chars().next().map_or(1, char::len_utf8);
    input[from..]
        .find('<')
        .map(|i| from + i)
        .unwrap_or(input.len())
}

/// Byte index of the `>` that ends the tag starting at `s[0] == '<'`,
/// skipping `>` characters inside quoted attribute values.
fn tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices().skip(1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '>' => return Some(i),
            None => {}
        }
    }
    None
}

fn tag_name(after_bracket: &str) -> String {
    after_bracket
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == ':')
        .collect::<String>()
        .to_ascii_lowercase()
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

/// Collapse whitespace runs outside quoted values to a single space.
fn collapse_tag_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut quote: Option<char> = None;
    let mut pending_space = false;
    for c in raw.chars() {
        if let Some(q) = quote {
            out.push(c);
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space {
            if c != '>' && !(c == '/' && out.ends_with('<')) {
                out.push(' ');
            }
            pending_space = false;
        }
        if c == '"' || c == '\'' {
            quote = Some(c);
        }
        out.push(c);
    }
    out
}

// =============================================================================
// Printer
// =============================================================================

/// What the printer emitted last; decides whether the next piece may
/// continue the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Nothing,
    /// Opening tag of a block element, text, or inline markup.
    Flow,
    /// Closing tag of a block element, comment, doctype, raw content.
    Break,
    /// Verbatim `<pre>`/`<textarea>` content; the close tag attaches to it.
    Verbatim,
}

struct Printer<'a> {
    opts: &'a HtmlFormatOptions,
    lines: Vec<String>,
    current: String,
    depth: usize,
    last: Last,
    pending_space: bool,
    pending_newlines: usize,
    /// Open block elements with the line index their opening tag is on.
    open_blocks: Vec<(String, usize)>,
}

impl<'a> Printer<'a> {
    fn new(opts: &'a HtmlFormatOptions) -> Self {
        Self {
            opts,
            lines: Vec::new(),
            current: String::new(),
            depth: 0,
            last: Last::Nothing,
            pending_space: false,
            pending_newlines: 0,
            open_blocks: Vec::new(),
        }
    }

    fn indent(&self) -> String {
        " ".repeat(self.depth * self.opts.indent_size)
    }

    fn current_is_blank(&self) -> bool {
        self.current.trim().is_empty()
    }

    /// Start a new line at the current depth, emitting preserved blank lines.
    fn break_line(&mut self) {
        if self.last != Last::Nothing {
            let finished = std::mem::take(&mut self.current);
            self.lines.push(finished.trim_end().to_string());
            if self.opts.preserve_newlines && self.pending_newlines > 1 {
                let blanks = self.pending_newlines.min(self.opts.max_preserve_newlines) - 1;
                for _ in 0..blanks {
                    self.lines.push(String::new());
                }
            }
        }
        self.current = self.indent();
        self.pending_newlines = 0;
        self.pending_space = false;
    }

    /// Append a flowing piece (word or inline tag) with wrapping.
    fn push_flow(&mut self, piece: &str) {
        if self.last == Last::Nothing || self.last == Last::Break {
            self.break_line();
        } else {
            let space = if self.pending_space && !self.current_is_blank() { 1 } else { 0 };
            let width = self.current.chars().count() + space + piece.chars().count();
            if width > self.opts.wrap_line_length && !self.current_is_blank() {
                self.break_line();
            } else if space == 1 {
                self.current.push(' ');
            }
        }
        self.current.push_str(piece);
        self.pending_space = false;
        self.pending_newlines = 0;
        self.last = Last::Flow;
    }

    /// Whitespace-separated text between tags.
    fn text(&mut self, text: &str) {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            if !text.is_empty() {
                self.pending_space = true;
                self.pending_newlines += text.matches('\n').count();
            }
            return;
        }
        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
            let leading = &text[..text.len() - text.trim_start().len()];
            self.pending_newlines += leading.matches('\n').count();
        }
        for word in words {
            self.push_flow(word);
            self.pending_space = true;
        }
        if text.ends_with(char::is_whitespace) {
            let trailing = &text[text.trim_end().len()..];
            self.pending_newlines += trailing.matches('\n').count();
        } else {
            self.pending_space = false;
        }
    }

    /// A piece that always sits on its own line (comment, doctype).
    fn standalone(&mut self, text: &str) {
        self.break_line();
        self.current.push_str(text);
        self.last = Last::Break;
    }

    fn open_block(&mut self, name: &str, text: &str, opens_scope: bool) {
        self.break_line();
        self.current.push_str(text);
        if opens_scope {
            self.open_blocks.push((name.to_string(), self.lines.len()));
            self.depth += 1;
            self.last = Last::Flow;
        } else {
            self.last = Last::Break;
        }
    }

    fn close_block(&mut self, name: &str, text: &str) {
        let opened_on = match self.open_blocks.iter().rposition(|(n, _)| n == name) {
            Some(idx) => {
                let (_, line) = self.open_blocks[idx].clone();
                let unwound = self.open_blocks.len() - idx;
                self.open_blocks.truncate(idx);
                self.depth = self.depth.saturating_sub(unwound);
                Some(line)
            }
            None => None,
        };
        let same_line = opened_on == Some(self.lines.len()) && self.last != Last::Break;
        if same_line || self.last == Last::Verbatim {
            // Content stayed on the opening line: close inline.
            self.current.push_str(text);
        } else {
            self.break_line();
            self.current.push_str(text);
        }
        self.pending_space = false;
        self.last = Last::Break;
    }

    /// Verbatim raw-text content, re-indented as a block unless it is `<pre>`.
    fn raw(&mut self, content: &str, reindent: bool) {
        if !reindent {
            self.current.push_str(content);
            // Keep any embedded line breaks; the closing tag follows directly.
            let mut split = self.current.split('\n').map(str::to_string).collect::<Vec<_>>();
            self.current = split.pop().unwrap_or_default();
            self.lines.extend(split);
            self.last = Last::Verbatim;
            return;
        }
        let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.is_empty() {
            return;
        }
        let min_indent = lines
            .iter()
            .map(|l| l.bytes().take_while(|b| *b == b' ' || *b == b'\t').count())
            .min()
            .unwrap_or(0);
        for line in lines {
            self.break_line();
            self.current.push_str(line[min_indent..].trim_end());
        }
        self.last = Last::Break;
    }

    fn finish(mut self) -> String {
        if !self.current.trim().is_empty() {
            self.lines.push(self.current.trim_end().to_string());
        }
        while self.lines.last().is_some_and(|l| l.is_empty()) {
            self.lines.pop();
        }
        self.lines.join("\n")
    }
}

/// Pretty-print an HTML document or fragment.
pub fn format_html(input: &str, opts: &HtmlFormatOptions) -> Result<String, HtmlError> {
    let tokens = lex(input.trim())?;
    let mut printer = Printer::new(opts);
    let mut raw_parent: Option<String> = None;

    for token in tokens {
        match token {
            Token::Doctype(text) | Token::Comment(text) => printer.standalone(&text),
            Token::Text(text) => printer.text(&text),
            Token::Raw(content) => {
                let reindent = raw_parent.as_deref() != Some("pre")
                    && raw_parent.as_deref() != Some("textarea");
                printer.raw(&content, reindent);
            }
            Token::Open {
                name,
                text,
                self_closing,
            } => {
                let is_void = VOID_ELEMENTS.contains(&name.as_str());
                raw_parent = if RAW_TEXT_ELEMENTS.contains(&name.as_str()) && !self_closing {
                    Some(name.clone())
                } else {
                    None
                };
                if INLINE_ELEMENTS.contains(&name.as_str()) {
                    printer.push_flow(&text);
                } else {
                    printer.open_block(&name, &text, !(is_void || self_closing));
                }
            }
            Token::Close { name, text } => {
                raw_parent = None;
                if INLINE_ELEMENTS.contains(&name.as_str()) {
                    // Closing inline tags attach to the preceding word.
                    printer.pending_space = false;
                    printer.push_flow(&text);
                } else {
                    printer.close_block(&name, &text);
                }
            }
        }
    }

    Ok(printer.finish())
}

// =============================================================================
// Highlighter
// =============================================================================

/// Syntactic role of a highlighted span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HtmlSpanKind {
    /// `<`, `</`, `>`, `/>`, `=`.
    Punctuation,
    TagName,
    AttrName,
    AttrValue,
    Comment,
    Doctype,
    Text,
}

/// A byte range of the highlighted text and its role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HtmlSpan {
    pub kind: HtmlSpanKind,
    pub range: Range<usize>,
}

/// Split `text` into contiguous spans covering every byte.
///
/// Never fails: unterminated markup is highlighted up to the end of input.
pub fn highlight_html(text: &str) -> Vec<HtmlSpan> {
    let mut spans = Vec::new();
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];
        if !starts_markup(rest) {
            let end = text_end(text, pos);
            push_span(&mut spans, HtmlSpanKind::Text, pos, end);
            pos = end;
            continue;
        }
        if rest.starts_with("<!--") {
            let end = rest.find("-->").map(|i| pos + i + 3).unwrap_or(text.len());
            push_span(&mut spans, HtmlSpanKind::Comment, pos, end);
            pos = end;
            continue;
        }
        let end = tag_end(rest).map(|i| pos + i + 1).unwrap_or(text.len());
        if rest.starts_with("<!") || rest.starts_with("<?") {
            push_span(&mut spans, HtmlSpanKind::Doctype, pos, end);
            pos = end;
            continue;
        }
        highlight_tag(text, pos, end, &mut spans);
        pos = end;
    }

    spans
}

fn push_span(spans: &mut Vec<HtmlSpan>, kind: HtmlSpanKind, start: usize, end: usize) {
    if end > start {
        spans.push(HtmlSpan {
            kind,
            range: start..end,
        });
    }
}

fn highlight_tag(text: &str, start: usize, end: usize, spans: &mut Vec<HtmlSpan>) {
    let bytes = text.as_bytes();
    let mut push = |kind, s: usize, e: usize| push_span(spans, kind, s, e);

    let mut i = start + 1;
    if i < end && bytes[i] == b'/' {
        i += 1;
    }
    push(HtmlSpanKind::Punctuation, start, i);

    let name_start = i;
    while i < end && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' && bytes[i] != b'/' {
        i += 1;
    }
    push(HtmlSpanKind::TagName, name_start, i);

    while i < end {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            let s = i;
            while i < end && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            push(HtmlSpanKind::Text, s, i);
        } else if c == b'>' || c == b'/' || c == b'=' {
            push(HtmlSpanKind::Punctuation, i, i + 1);
            i += 1;
        } else if c == b'"' || c == b'\'' {
            let s = i;
            i += 1;
            while i < end && bytes[i] != c {
                i += 1;
            }
            i = (i + 1).min(end);
            push(HtmlSpanKind::AttrValue, s, i);
        } else {
            let s = i;
            let after_eq = s > start && bytes[s - 1] == b'=';
            while i < end
                && !bytes[i].is_ascii_whitespace()
                && bytes[i] != b'='
                && bytes[i] != b'>'
                && !(bytes[i] == b'/' && i + 1 < end && bytes[i + 1] == b'>')
            {
                i += 1;
            }
            let kind = if after_eq {
                HtmlSpanKind::AttrValue
            } else {
                HtmlSpanKind::AttrName
            };
            push(kind, s, i);
        }
    }
}
