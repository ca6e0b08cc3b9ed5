//! Inline-formatted text layout for the PDF canvas
//!
//! Parses the whitelisted tags produced by the markup translator into styled
//! spans, word-wraps them with built-in font metrics, and shrinks the font
//! size until the text fits its box.

use crate::canvas::{Ink, Overflow, TextBox};

/// Smallest size shrink-to-fit will go down to
pub const MIN_FONT_SIZE: f32 = 5.0;

/// Step used when shrinking
const SHRINK_STEP: f32 = 0.5;

/// Line advance as a multiple of the font size
pub const LINE_HEIGHT_RATIO: f32 = 1.16;

/// Helvetica ascender as a fraction of the font size
pub const ASCENT_RATIO: f32 = 0.718;

/// Sub/superscript size relative to the surrounding text
const SCRIPT_RATIO: f32 = 0.583;

// =============================================================================
// Styles
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Family {
    #[default]
    Helvetica,
    Times,
    Courier,
}

impl Family {
    /// Map a `<font name="...">` value onto a built-in family
    fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        if name.contains("courier") || name.contains("mono") {
            Some(Family::Courier)
        } else if name.contains("times") || (name.contains("serif") && !name.contains("sans")) {
            Some(Family::Times)
        } else if name.contains("helvetica") || name.contains("arial") || name.contains("sans") {
            Some(Family::Helvetica)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Script {
    #[default]
    Normal,
    Sub,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Style {
    pub family: Family,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub script: Script,
    /// Colour override from `<color rgb="...">`
    pub ink: Option<Ink>,
}

impl Style {
    /// Font size of text in this style at base size `size`
    pub fn size(&self, size: f32) -> f32 {
        match self.script {
            Script::Normal => size,
            Script::Sub | Script::Super => size * SCRIPT_RATIO,
        }
    }

    /// Baseline shift of text in this style at base size `size`
    pub fn rise(&self, size: f32) -> f32 {
        match self.script {
            Script::Normal => 0.0,
            Script::Super => size * 0.33,
            Script::Sub => -size * 0.14,
        }
    }

    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let size = self.size(size);
        text.chars().map(|c| glyph_width(*self, c)).sum::<f32>() * size / 1000.0
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// A piece of the markup stream
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Text(String, Style),
    Space(Style),
    Break,
}

/// Split `text` into styled tokens.
///
/// With `inline_format` the whitelisted tags change the style and entities are
/// decoded; otherwise everything is literal text in `base`.
pub fn tokenize(text: &str, base: Style, inline_format: bool) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut stack = vec![base];
    let mut rest = text;

    while !rest.is_empty() {
        let style = *stack.last().unwrap_or(&base);

        if inline_format && rest.starts_with('<') {
            if let Some(end) = rest.find('>') {
                apply_tag(&rest[1..end], &mut stack, &mut tokens, base);
                rest = &rest[end + 1..];
                continue;
            }
        }

        let ch = rest.chars().next().unwrap_or(' ');
        match ch {
            '\n' => tokens.push(Token::Break),
            ' ' | '\t' => tokens.push(Token::Space(style)),
            '&' if inline_format => {
                let (decoded, consumed) = decode_entity(rest);
                push_char(&mut tokens, decoded, style);
                rest = &rest[consumed..];
                continue;
            }
            _ => push_char(&mut tokens, ch, style),
        }
        rest = &rest[ch.len_utf8()..];
    }

    tokens
}

fn push_char(tokens: &mut Vec<Token>, ch: char, style: Style) {
    if let Some(Token::Text(text, last)) = tokens.last_mut() {
        if *last == style {
            text.push(ch);
            return;
        }
    }
    tokens.push(Token::Text(ch.to_string(), style));
}

fn decode_entity(s: &str) -> (char, usize) {
    for (entity, ch) in [("&lt;", '<'), ("&gt;", '>'), ("&amp;", '&'), ("&quot;", '"')] {
        if s.starts_with(entity) {
            return (ch, entity.len());
        }
    }
    ('&', 1)
}

fn apply_tag(tag: &str, stack: &mut Vec<Style>, tokens: &mut Vec<Token>, base: Style) {
    let tag = tag.trim();
    if tag.starts_with("br") {
        tokens.push(Token::Break);
        return;
    }
    if tag.starts_with('/') {
        if stack.len() > 1 {
            stack.pop();
        }
        return;
    }

    let mut style = *stack.last().unwrap_or(&base);
    let (name, attrs) = tag.split_once(char::is_whitespace).unwrap_or((tag, ""));
    match name {
        "b" => style.bold = true,
        "i" => style.italic = true,
        "u" => style.underline = true,
        "strikethrough" => style.strikethrough = true,
        "sub" => style.script = Script::Sub,
        "sup" => style.script = Script::Super,
        "font" => {
            if let Some(family) = attribute(attrs, "name").and_then(Family::from_name) {
                style.family = family;
            }
        }
        "color" => {
            if let Some(ink) = attribute(attrs, "rgb").and_then(Ink::from_hex) {
                style.ink = Some(ink);
            }
        }
        _ => {}
    }
    stack.push(style);
}

/// Value of `key="value"` (or single quotes) in a tag's attribute list
fn attribute<'a>(attrs: &'a str, key: &str) -> Option<&'a str> {
    let start = attrs.find(&format!("{key}="))? + key.len() + 1;
    let value = &attrs[start..];
    let quote = value.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = &value[1..];
    value.find(quote).map(|end| &value[..end])
}

// =============================================================================
// Layout
// =============================================================================

/// A run of same-styled text placed on a line
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub style: Style,
    /// Offset from the start of the line
    pub x: f32,
    pub width: f32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub fragments: Vec<Fragment>,
    pub width: f32,
}

impl Line {
    fn push(&mut self, text: &str, style: Style, x: f32, width: f32) {
        if let Some(last) = self.fragments.last_mut() {
            if last.style == style && (last.x + last.width - x).abs() < 1e-3 {
                last.text.push_str(text);
                last.width += width;
                self.width = x + width;
                return;
            }
        }
        self.fragments.push(Fragment {
            text: text.to_string(),
            style,
            x,
            width,
        });
        self.width = x + width;
    }
}

/// Result of laying out a text box
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub lines: Vec<Line>,
    pub size: f32,
}

impl Layout {
    pub fn line_height(&self) -> f32 {
        self.size * LINE_HEIGHT_RATIO
    }

    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height()
    }
}

/// Lay out a text box, shrinking or truncating as its overflow mode says.
pub fn layout_box(text: &str, text_box: &TextBox) -> Layout {
    let base = Style {
        bold: text_box.bold,
        ..Style::default()
    };
    let tokens = tokenize(text, base, text_box.inline_format);

    let Some(height) = text_box.height else {
        return wrap(&tokens, text_box.width, text_box.size);
    };

    let mut size = text_box.size;
    let mut layout = wrap(&tokens, text_box.width, size);
    if text_box.overflow == Overflow::ShrinkToFit {
        while layout.height() > height && size - SHRINK_STEP >= MIN_FONT_SIZE {
            size -= SHRINK_STEP;
            layout = wrap(&tokens, text_box.width, size);
        }
    }

    let max_lines = ((height / layout.line_height()) + 1e-3).floor().max(1.0) as usize;
    layout.lines.truncate(max_lines);
    layout
}

/// Greedy word wrap of `tokens` into lines no wider than `width`.
pub fn wrap(tokens: &[Token], width: f32, size: f32) -> Layout {
    let mut wrapper = Wrapper {
        width,
        size,
        lines: Vec::new(),
        line: Line::default(),
        word: Vec::new(),
        space: None,
    };

    for token in tokens {
        match token {
            Token::Text(text, style) => wrapper.word.push((text.clone(), *style)),
            Token::Space(style) => {
                wrapper.flush_word();
                if !wrapper.line.fragments.is_empty() {
                    wrapper.space = Some(style.text_width(" ", size));
                }
            }
            Token::Break => {
                wrapper.flush_word();
                wrapper.new_line();
            }
        }
    }
    wrapper.flush_word();
    wrapper.lines.push(wrapper.line);

    Layout {
        lines: wrapper.lines,
        size,
    }
}

struct Wrapper {
    width: f32,
    size: f32,
    lines: Vec<Line>,
    line: Line,
    /// Pieces of the word being collected
    word: Vec<(String, Style)>,
    /// Width of the space owed before the next word on this line
    space: Option<f32>,
}

impl Wrapper {
    fn new_line(&mut self) {
        self.lines.push(std::mem::take(&mut self.line));
        self.space = None;
    }

    fn flush_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let word = std::mem::take(&mut self.word);
        let word_width: f32 = word
            .iter()
            .map(|(text, style)| style.text_width(text, self.size))
            .sum();

        let space = self.space.unwrap_or(0.0);
        if !self.line.fragments.is_empty() && self.line.width + space + word_width > self.width {
            self.new_line();
        }

        if word_width > self.width {
            self.place_by_char(&word);
            return;
        }

        let mut x = self.line.width + self.space.take().unwrap_or(0.0);
        for (text, style) in &word {
            let w = style.text_width(text, self.size);
            self.line.push(text, *style, x, w);
            x += w;
        }
    }

    /// Break a word wider than the box wherever it runs out of room.
    fn place_by_char(&mut self, word: &[(String, Style)]) {
        let mut x = self.line.width + self.space.take().unwrap_or(0.0);
        for (text, style) in word {
            for ch in text.chars() {
                let mut buf = [0u8; 4];
                let piece = ch.encode_utf8(&mut buf);
                let w = style.text_width(piece, self.size);
                if !self.line.fragments.is_empty() && x + w > self.width {
                    self.new_line();
                    x = 0.0;
                }
                self.line.push(piece, *style, x, w);
                x += w;
            }
        }
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    333, 333, 584, 584, 584, 611, 975, // ':'..'@'
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    333, 278, 333, 584, 556, 333, // '['..'`'
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // 'a'..'m'
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // 'n'..'z'
    389, 280, 389, 584, // '{'..'~'
];

/// Times-Roman advance widths for ASCII 32..=126, in 1/1000 em
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // ' '..'/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // '0'..'9'
    278, 278, 564, 564, 564, 444, 921, // ':'..'@'
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, // 'A'..'M'
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, // 'N'..'Z'
    333, 278, 333, 469, 500, 333, // '['..'`'
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, // 'a'..'m'
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, // 'n'..'z'
    480, 200, 480, 541, // '{'..'~'
];

/// Times-Bold advance widths for ASCII 32..=126, in 1/1000 em
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278, // ' '..'/'
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // '0'..'9'
    333, 333, 570, 570, 570, 500, 930, // ':'..'@'
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, // 'A'..'M'
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, // 'N'..'Z'
    333, 278, 333, 581, 500, 333, // '['..'`'
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, // 'a'..'m'
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, // 'n'..'z'
    394, 220, 394, 520, // '{'..'~'
];

/// Courier is monospaced
const COURIER_WIDTH: f32 = 600.0;

/// Advance width of `ch` in 1/1000 em. Italic faces use the upright tables.
fn glyph_width(style: Style, ch: char) -> f32 {
    let table = match (style.family, style.bold) {
        (Family::Courier, _) => return COURIER_WIDTH,
        (Family::Helvetica, false) => &HELVETICA,
        (Family::Helvetica, true) => &HELVETICA_BOLD,
        (Family::Times, false) => &TIMES_ROMAN,
        (Family::Times, true) => &TIMES_BOLD,
    };
    match ch as u32 {
        code @ 32..=126 => table[(code - 32) as usize] as f32,
        _ => table[('n' as usize) - 32] as f32,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Point;

    fn texts(tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .map(|t| match t {
                Token::Text(text, _) => text.clone(),
                Token::Space(_) => " ".to_string(),
                Token::Break => "\n".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_tokenize_styles() {
        let tokens = tokenize("<b>bold</b> <i>it</i>", Style::default(), true);
        assert_eq!(texts(&tokens), vec!["bold", " ", "it"]);

        match (&tokens[0], &tokens[2]) {
            (Token::Text(_, bold), Token::Text(_, italic)) => {
                assert!(bold.bold && !bold.italic);
                assert!(italic.italic && !italic.bold);
            }
            _ => panic!("unexpected tokens {tokens:?}"),
        }
    }

    #[test]
    fn test_tokenize_entities_and_breaks() {
        let tokens = tokenize("a&lt;b&gt;<br/>c\nd &amp; e", Style::default(), true);
        assert_eq!(texts(&tokens), vec!["a<b>", "\n", "c", "\n", "d", " ", "&", " ", "e"]);
    }

    #[test]
    fn test_tokenize_literal_without_inline_format() {
        let tokens = tokenize("<b>x</b>", Style::default(), false);
        assert_eq!(texts(&tokens), vec!["<b>x</b>"]);
    }

    #[test]
    fn test_font_and_color_attributes() {
        let markup = "<font name=\"Courier New\"><color rgb=\"#ff0000\">x</color></font>";
        let tokens = tokenize(markup, Style::default(), true);
        match &tokens[0] {
            Token::Text(_, style) => {
                assert_eq!(style.family, Family::Courier);
                assert_eq!(style.ink, Some(Ink { r: 1.0, g: 0.0, b: 0.0 }));
            }
            other => panic!("unexpected token {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_close_is_ignored() {
        let tokens = tokenize("</b>plain", Style::default(), true);
        assert_eq!(tokens, vec![Token::Text("plain".to_string(), Style::default())]);
    }

    #[test]
    fn test_wrap_respects_width() {
        let text = "the quick brown fox jumps over the lazy dog";
        let tokens = tokenize(text, Style::default(), true);
        let layout = wrap(&tokens, 60.0, 10.0);

        assert!(layout.lines.len() > 1);
        for line in &layout.lines {
            assert!(line.width <= 60.0 + 1e-3, "line too wide: {line:?}");
        }
    }

    #[test]
    fn test_overlong_word_breaks() {
        let tokens = tokenize("Supercalifragilisticexpialidocious", Style::default(), true);
        let layout = wrap(&tokens, 40.0, 14.0);

        assert!(layout.lines.len() > 2);
        let rebuilt: String = layout
            .lines
            .iter()
            .flat_map(|l| l.fragments.iter().map(|f| f.text.as_str()))
            .collect();
        assert_eq!(rebuilt, "Supercalifragilisticexpialidocious");
    }

    #[test]
    fn test_shrink_to_fit() {
        let long = "word ".repeat(60);
        let text_box = TextBox::new(Point::new(0.0, 100.0), 124.0, 14.0)
            .height(109.0)
            .shrink_to_fit()
            .inline_format();
        let layout = layout_box(&long, &text_box);

        assert!(layout.size < 14.0);
        assert!(layout.size >= MIN_FONT_SIZE);
        assert!(layout.height() <= 109.0 + 1e-3);
    }

    #[test]
    fn test_short_text_keeps_size() {
        let text_box = TextBox::new(Point::new(0.0, 100.0), 124.0, 14.0)
            .height(109.0)
            .shrink_to_fit();
        let layout = layout_box("<b>Beans</b>", &text_box);
        assert_eq!(layout.size, 14.0);
        assert_eq!(layout.lines.len(), 1);
    }

    #[test]
    fn test_times_metrics() {
        let times = Style {
            family: Family::Times,
            ..Style::default()
        };
        let times_bold = Style { bold: true, ..times };

        assert_eq!(times.text_width("a", 1000.0), 444.0);
        assert_eq!(times_bold.text_width("W", 1000.0), 1000.0);
        assert_eq!(times.text_width(" ", 1000.0), 250.0);
        assert!(times.text_width("beans", 10.0) < Style::default().text_width("beans", 10.0));
    }

    #[test]
    fn test_courier_is_monospaced() {
        let courier = Style {
            family: Family::Courier,
            ..Style::default()
        };
        assert_eq!(courier.text_width("iiii", 10.0), courier.text_width("WWWW", 10.0));
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = Style::default();
        let bold = Style {
            bold: true,
            ..Style::default()
        };
        assert!(bold.text_width("beans", 10.0) > regular.text_width("beans", 10.0));
        assert_eq!(regular.text_width("  ", 10.0), 5.56);
    }
}
