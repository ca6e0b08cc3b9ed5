//! Card markup translation
//!
//! A card line is `text[TAB pick]` where `text` may carry:
//! - a small whitelist of HTML-like inline tags (everything else is escaped)
//! - `[[X]]` inline fields, treated as if `X` were an extra tab field
//! - `((G))` which turns the card into a warning card with glyph `G`
//! - blanks (`__`) from which the pick count of a black card is inferred
//! - `{{1}}`..`{{5}}` image placeholders, which grids do not support
//!
//! Translation is not idempotent: feeding `display_text` back in escapes the
//! `&lt;` entities a second time.

use crate::types::{CardColor, ParsedCard};

/// Opening tags kept verbatim
const SIMPLE_TAGS: &[&str] = &["b", "i", "u", "strikethrough", "sub", "sup"];

/// Opening tags that may carry attributes (`<font name="...">`)
const ATTRIBUTE_TAGS: &[&str] = &["font", "color"];

/// Line break spellings, all normalized to `<br/>`
const LINE_BREAKS: &[&str] = &["<br>", "<br/>", "<br />"];

const IMAGE_PLACEHOLDERS: &[&str] = &["{{1}}", "{{2}}", "{{3}}", "{{4}}", "{{5}}"];

/// Translate one raw card line.
pub fn translate(raw_line: &str, color: CardColor) -> ParsedCard {
    let mut fields = raw_line.split('\t');
    let text = fields.next().unwrap_or_default();
    let mut fields: Vec<String> = fields.map(str::to_string).collect();

    let mut text = text.replace("\\n", "\n").replace("\\t", "\t");
    for placeholder in IMAGE_PLACEHOLDERS {
        text = text.replace(placeholder, "");
    }

    let text = escape_tags(&text);
    let text = extract_inline_fields(&text, &mut fields);
    let mut text = trim_lines(&text);

    let pick_count = if color.is_black() {
        resolve_pick(fields.first().map(String::as_str), &text)
    } else {
        0
    };

    let warning_glyph = extract_warning(&mut text);

    ParsedCard {
        display_text: text,
        pick_count,
        warning_glyph,
    }
}

// =============================================================================
// Tag Whitelisting
// =============================================================================

/// Keep whitelisted tags, escape every other angle bracket.
pub fn escape_tags(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(ch) = rest.chars().next() {
        match ch {
            '<' => match allowed_tag(rest) {
                Some((tag, consumed)) => {
                    out.push_str(&tag);
                    rest = &rest[consumed..];
                }
                None => {
                    out.push_str("&lt;");
                    rest = &rest[1..];
                }
            },
            '>' => {
                out.push_str("&gt;");
                rest = &rest[1..];
            }
            _ => {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}

/// If `s` starts with a whitelisted tag, return its normalized form and its length in `s`.
fn allowed_tag(s: &str) -> Option<(String, usize)> {
    for br in LINE_BREAKS {
        if s.starts_with(br) {
            return Some(("<br/>".to_string(), br.len()));
        }
    }

    let (closing, name_start) = if s.starts_with("</") { (true, 2) } else { (false, 1) };
    let body = &s[name_start..];
    let end = body.find('>')?;
    let inner = &body[..end];
    let consumed = name_start + end + 1;

    if inner.contains('<') {
        return None;
    }

    if closing {
        let known = SIMPLE_TAGS.contains(&inner) || ATTRIBUTE_TAGS.contains(&inner);
        return known.then(|| (format!("</{inner}>"), consumed));
    }

    if SIMPLE_TAGS.contains(&inner) {
        return Some((format!("<{inner}>"), consumed));
    }

    ATTRIBUTE_TAGS.iter().find_map(|name| {
        let attrs = inner.strip_prefix(name)?;
        let valid = attrs.is_empty() || attrs.starts_with(char::is_whitespace);
        valid.then(|| (format!("<{inner}>"), consumed))
    })
}

// =============================================================================
// Inline Fields
// =============================================================================

/// Pull every `[[X]]` out of `text`, appending `X` to `fields`.
///
/// Single left-to-right pass; a `[[` with no closing `]]` stays literal.
fn extract_inline_fields(text: &str, fields: &mut Vec<String>) -> String {
    let mut parts = text.split("[[");
    let mut out = parts.next().unwrap_or_default().to_string();

    for part in parts {
        match part.split_once("]]") {
            Some((field, tail)) => {
                fields.push(field.to_string());
                out.push_str(tail);
            }
            None => {
                out.push_str("[[");
                out.push_str(part);
            }
        }
    }

    out
}

/// Strip spaces and tabs from both ends of every line.
fn trim_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| line.trim_matches([' ', '\t']))
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// Pick Count
// =============================================================================

/// Pick count of a black card.
///
/// An explicit field wins when present; blanks are only counted when there
/// is none.
fn resolve_pick(field: Option<&str>, text: &str) -> u8 {
    match field {
        None | Some("") => infer_pick(text),
        Some("2") => 2,
        Some("3") => 3,
        Some(_) => 1,
    }
}

/// Infer the pick count from the blanks (`_` runs) in the card text.
pub fn infer_pick(text: &str) -> u8 {
    // Wrapping in sentinels means N blanks always split the text into N + 1 segments
    match blank_count(text) + 1 {
        3 => 2,
        n if n >= 4 => 3,
        _ => 1,
    }
}

fn blank_count(text: &str) -> usize {
    let mut count = 0;
    let mut in_run = false;
    for ch in text.chars() {
        let is_blank = ch == '_';
        if is_blank && !in_run {
            count += 1;
        }
        in_run = is_blank;
    }
    count
}

// =============================================================================
// Warning Glyph
// =============================================================================

/// Remove the first `((G))` span (on a single line) and return `G`.
///
/// The glyph is drawn as plain text, so brackets escaped earlier are restored.
fn extract_warning(text: &mut String) -> Option<String> {
    let (start, end) = find_warning_span(text)?;
    let glyph = text[start + 2..end - 2].replace("&lt;", "<").replace("&gt;", ">");
    text.replace_range(start..end, "");
    Some(glyph)
}

/// Byte range of the leftmost `((...))` whose content does not cross a line.
fn find_warning_span(text: &str) -> Option<(usize, usize)> {
    let mut search_from = 0;
    while let Some(offset) = text[search_from..].find("((") {
        let start = search_from + offset;
        let line_end = text[start..].find('\n').map_or(text.len(), |i| start + i);
        if let Some(close) = text[start + 2..line_end].find("))") {
            return Some((start, start + 2 + close + 2));
        }
        search_from = start + 1;
    }
    None
}

// =============================================================================
// Tests
// =============================================================================
