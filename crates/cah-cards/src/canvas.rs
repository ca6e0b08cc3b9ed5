//! Drawing capability used by the page renderer
//!
//! The renderer never talks to a PDF library directly. It issues calls on a
//! [`CardCanvas`], in sheet coordinates (points, origin bottom-left). Calls
//! are painted in order; there is no z-ordering beyond that.
//!
//! Ink colours are ambient state on the canvas. Temporary colour changes go
//! through [`PaletteGuard`], which puts the prior palette back when dropped.

use crate::types::Result;
use std::ops::{Deref, DerefMut};
use std::path::Path;

// =============================================================================
// Primitives
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle, `(x, y)` is the bottom-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn top(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.top())
    }
}

/// RGB colour with components in `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ink {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Ink {
    pub const BLACK: Ink = Ink {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };
    pub const WHITE: Ink = Ink {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    pub fn inverse(self) -> Self {
        Self {
            r: 1.0 - self.r,
            g: 1.0 - self.g,
            b: 1.0 - self.b,
        }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// Stroke and fill colours in effect on a canvas
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub stroke: Ink,
    pub fill: Ink,
}

impl Palette {
    /// Same ink for stroke and fill
    pub fn solid(ink: Ink) -> Self {
        Self {
            stroke: ink,
            fill: ink,
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::solid(Ink::BLACK)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// What a text box does when its text is taller than the box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    /// Drop lines that do not fit
    #[default]
    Truncate,
    /// Reduce the font size until everything fits
    ShrinkToFit,
}

/// Placement and style of a block of text
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    /// Top-left corner of the box
    pub at: Point,
    pub width: f32,
    /// Height budget; `None` lets the text run to the bottom of the sheet
    pub height: Option<f32>,
    pub size: f32,
    pub align: Align,
    pub overflow: Overflow,
    /// Rotation about `at`, degrees counter-clockwise
    pub rotate: f32,
    pub bold: bool,
    /// Interpret whitelisted inline tags instead of printing them
    pub inline_format: bool,
}

impl TextBox {
    pub fn new(at: Point, width: f32, size: f32) -> Self {
        Self {
            at,
            width,
            height: None,
            size,
            align: Align::Left,
            overflow: Overflow::Truncate,
            rotate: 0.0,
            bold: false,
            inline_format: false,
        }
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = Some(height);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn shrink_to_fit(mut self) -> Self {
        self.overflow = Overflow::ShrinkToFit;
        self
    }

    pub fn rotate(mut self, degrees: f32) -> Self {
        self.rotate = degrees;
        self
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn inline_format(mut self) -> Self {
        self.inline_format = true;
        self
    }
}

// =============================================================================
// Capability
// =============================================================================

/// Drawing surface the page renderer paints on.
///
/// Implementations are stateful and not reentrant: the current palette and
/// line width apply to every following call.
pub trait CardCanvas {
    /// Start a new sheet. Palette and line width carry over.
    fn begin_page(&mut self, width: f32, height: f32);

    fn palette(&self) -> Palette;

    /// Replace the palette, returning the one it replaced
    fn set_palette(&mut self, palette: Palette) -> Palette;

    fn set_line_width(&mut self, width: f32);

    fn fill_rect(&mut self, rect: Rect);

    fn stroke_line(&mut self, from: Point, to: Point);

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32);

    fn fill_circle(&mut self, center: Point, radius: f32);

    /// Draw the image at `path` scaled to fit `fit`, anchored at its top-left corner.
    fn draw_image(&mut self, path: &Path, fit: Rect) -> Result<()>;

    /// Lay out `text` in the fill ink.
    fn text_box(&mut self, text: &str, text_box: &TextBox);
}

/// Scoped palette override.
///
/// Derefs to the canvas; the palette in effect before [`PaletteGuard::new`]
/// is restored when the guard is dropped.
pub struct PaletteGuard<'a, C: CardCanvas + ?Sized> {
    canvas: &'a mut C,
    prior: Palette,
}

impl<'a, C: CardCanvas + ?Sized> PaletteGuard<'a, C> {
    pub fn new(canvas: &'a mut C, palette: Palette) -> Self {
        let prior = canvas.set_palette(palette);
        Self { canvas, prior }
    }

    /// The palette that will be restored
    pub fn prior(&self) -> Palette {
        self.prior
    }
}

impl<C: CardCanvas + ?Sized> Deref for PaletteGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.canvas
    }
}

impl<C: CardCanvas + ?Sized> DerefMut for PaletteGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.canvas
    }
}

impl<C: CardCanvas + ?Sized> Drop for PaletteGuard<'_, C> {
    fn drop(&mut self) {
        self.canvas.set_palette(self.prior);
    }
}

// =============================================================================
// Recording Canvas (tests)
// =============================================================================

#[cfg(test)]
pub(crate) mod recording {
    use super::*;
    use std::path::PathBuf;

    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        BeginPage { width: f32, height: f32 },
        LineWidth(f32),
        FillRect { rect: Rect, ink: Ink },
        Line { from: Point, to: Point, ink: Ink },
        RoundedRect { rect: Rect, radius: f32 },
        Circle { center: Point, radius: f32, ink: Ink },
        Image { path: PathBuf, fit: Rect },
        Text { text: String, text_box: TextBox, ink: Ink },
    }

    /// Canvas that remembers every call, for asserting on draw order and colour
    #[derive(Debug, Default)]
    pub struct RecordingCanvas {
        pub calls: Vec<DrawCall>,
        palette: Palette,
    }

    impl RecordingCanvas {
        pub fn texts(&self) -> Vec<&str> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    DrawCall::Text { text, .. } => Some(text.as_str()),
                    _ => None,
                })
                .collect()
        }

        pub fn text_call(&self, wanted: &str) -> Option<(&TextBox, Ink)> {
            self.calls.iter().find_map(|call| match call {
                DrawCall::Text {
                    text,
                    text_box,
                    ink,
                } if text == wanted => Some((text_box, *ink)),
                _ => None,
            })
        }

        pub fn circles(&self) -> Vec<(Point, Ink)> {
            self.calls
                .iter()
                .filter_map(|call| match call {
                    DrawCall::Circle { center, ink, .. } => Some((*center, *ink)),
                    _ => None,
                })
                .collect()
        }

        pub fn count(&self, predicate: impl Fn(&DrawCall) -> bool) -> usize {
            self.calls.iter().filter(|call| predicate(*call)).count()
        }
    }

    impl CardCanvas for RecordingCanvas {
        fn begin_page(&mut self, width: f32, height: f32) {
            self.calls.push(DrawCall::BeginPage { width, height });
        }

        fn palette(&self) -> Palette {
            self.palette
        }

        fn set_palette(&mut self, palette: Palette) -> Palette {
            std::mem::replace(&mut self.palette, palette)
        }

        fn set_line_width(&mut self, width: f32) {
            self.calls.push(DrawCall::LineWidth(width));
        }

        fn fill_rect(&mut self, rect: Rect) {
            let ink = self.palette.fill;
            self.calls.push(DrawCall::FillRect { rect, ink });
        }

        fn stroke_line(&mut self, from: Point, to: Point) {
            let ink = self.palette.stroke;
            self.calls.push(DrawCall::Line { from, to, ink });
        }

        fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32) {
            self.calls.push(DrawCall::RoundedRect { rect, radius });
        }

        fn fill_circle(&mut self, center: Point, radius: f32) {
            let ink = self.palette.fill;
            self.calls.push(DrawCall::Circle { center, radius, ink });
        }

        fn draw_image(&mut self, path: &Path, fit: Rect) -> Result<()> {
            self.calls.push(DrawCall::Image {
                path: path.to_owned(),
                fit,
            });
            Ok(())
        }

        fn text_box(&mut self, text: &str, text_box: &TextBox) {
            self.calls.push(DrawCall::Text {
                text: text.to_string(),
                text_box: text_box.clone(),
                ink: self.palette.fill,
            });
        }
    }
}
