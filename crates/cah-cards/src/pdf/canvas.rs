use super::text::{self, ASCENT_RATIO, Family, Layout, Style};
use crate::canvas::{Align, CardCanvas, Ink, Palette, Point, Rect, TextBox};
use crate::constants::BEZIER_CIRCLE_FACTOR;
use crate::types::{CardError, Result};
use printpdf::{
    BuiltinFont, Color, Line, LinePoint, Mm, Op, PaintMode, PdfDocument, PdfPage, PdfSaveOptions,
    Polygon, PolygonRing, Pt, RawImage, RawImageData, RawImageFormat, Rgb, TextItem, TextMatrix,
    WindingOrder, XObjectId, XObjectTransform,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Pixel size at which images are placed before scaling
const IMAGE_DPI: f32 = 72.0;

/// [`CardCanvas`] backed by a printpdf document.
///
/// Each `begin_page` closes the sheet being drawn and opens a new one.
/// Images are embedded once per path and reused on every sheet.
pub struct PdfCanvas {
    doc: PdfDocument,
    pages: Vec<PdfPage>,
    ops: Vec<Op>,
    page_size: Option<(f32, f32)>,
    palette: Palette,
    line_width: f32,
    images: HashMap<PathBuf, PlacedImage>,
}

#[derive(Clone)]
struct PlacedImage {
    id: XObjectId,
    width: u32,
    height: u32,
}

impl PdfCanvas {
    pub fn new(title: &str) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
            ops: Vec::new(),
            page_size: None,
            palette: Palette::default(),
            line_width: 1.0,
            images: HashMap::new(),
        }
    }

    /// Number of sheets started so far
    pub fn page_count(&self) -> usize {
        self.pages.len() + usize::from(self.page_size.is_some())
    }

    /// Close the last sheet and serialize the document.
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_page();
        self.doc.pages = self.pages;

        let mut warnings = Vec::new();
        let bytes = self.doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            log::debug!("PDF serialization produced {} warnings", warnings.len());
        }
        bytes
    }

    fn flush_page(&mut self) {
        if let Some((width, height)) = self.page_size.take() {
            let ops = std::mem::take(&mut self.ops);
            self.pages.push(PdfPage::new(Mm::from(Pt(width)), Mm::from(Pt(height)), ops));
        }
    }

    fn emit_palette(&mut self) {
        self.ops.push(Op::SetOutlineColor {
            col: color(self.palette.stroke),
        });
        self.ops.push(Op::SetFillColor {
            col: color(self.palette.fill),
        });
    }

    fn load_image(&mut self, path: &Path) -> Result<PlacedImage> {
        if let Some(image) = self.images.get(path) {
            return Ok(image.clone());
        }

        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                CardError::Config(format!("icon not found: {}", path.display()))
            }
            _ => CardError::Io(e),
        })?;
        let rgba = image::load_from_memory(&bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();

        let raw = RawImage {
            pixels: RawImageData::U8(rgba.into_raw()),
            width: width as usize,
            height: height as usize,
            data_format: RawImageFormat::RGBA8,
            tag: Vec::new(),
        };
        let placed = PlacedImage {
            id: self.doc.add_image(&raw),
            width,
            height,
        };
        log::debug!("Embedded image {} ({}x{})", path.display(), width, height);

        self.images.insert(path.to_path_buf(), placed.clone());
        Ok(placed)
    }

    fn write_layout(&mut self, layout: &Layout, text_box: &TextBox) {
        let (sin, cos) = text_box.rotate.to_radians().sin_cos();
        let origin = text_box.at;
        let place = |dx: f32, dy: f32| {
            Point::new(origin.x + dx * cos - dy * sin, origin.y + dx * sin + dy * cos)
        };

        let mut decorations = Vec::new();
        self.ops.push(Op::StartTextSection);

        for (i, line) in layout.lines.iter().enumerate() {
            let baseline = -ASCENT_RATIO * layout.size - i as f32 * layout.line_height();
            let indent = match text_box.align {
                Align::Left => 0.0,
                Align::Center => (text_box.width - line.width) / 2.0,
                Align::Right => text_box.width - line.width,
            };

            for fragment in &line.fragments {
                let size = fragment.style.size(layout.size);
                let dx = indent + fragment.x;
                let dy = baseline + fragment.style.rise(layout.size);
                let at = place(dx, dy);
                let font = builtin_font(fragment.style);

                if let Some(ink) = fragment.style.ink {
                    self.ops.push(Op::SetFillColor { col: color(ink) });
                }
                self.ops.push(Op::SetFontSizeBuiltinFont {
                    size: Pt(size),
                    font,
                });
                self.ops.push(Op::SetTextMatrix {
                    matrix: text_matrix(at, text_box.rotate),
                });
                self.ops.push(Op::WriteTextBuiltinFont {
                    items: vec![TextItem::Text(fragment.text.clone())],
                    font,
                });
                if fragment.style.ink.is_some() {
                    self.ops.push(Op::SetFillColor {
                        col: color(self.palette.fill),
                    });
                }

                let ink = fragment.style.ink.unwrap_or(self.palette.fill);
                if fragment.style.underline {
                    let y = dy - 0.1 * size;
                    decorations.push((place(dx, y), place(dx + fragment.width, y), size, ink));
                }
                if fragment.style.strikethrough {
                    let y = dy + 0.3 * size;
                    decorations.push((place(dx, y), place(dx + fragment.width, y), size, ink));
                }
            }
        }

        self.ops.push(Op::EndTextSection);

        for (from, to, size, ink) in decorations {
            self.ops.push(Op::SaveGraphicsState);
            self.ops.push(Op::SetOutlineColor { col: color(ink) });
            self.ops.push(Op::SetOutlineThickness {
                pt: Pt(size * 0.06),
            });
            self.ops.push(Op::DrawLine {
                line: Line {
                    points: vec![straight(from), straight(to)],
                    is_closed: false,
                },
            });
            self.ops.push(Op::RestoreGraphicsState);
        }
    }
}

impl CardCanvas for PdfCanvas {
    fn begin_page(&mut self, width: f32, height: f32) {
        self.flush_page();
        self.page_size = Some((width, height));

        // Graphics state does not survive a content stream
        self.emit_palette();
        self.ops.push(Op::SetOutlineThickness {
            pt: Pt(self.line_width),
        });
    }

    fn palette(&self) -> Palette {
        self.palette
    }

    fn set_palette(&mut self, palette: Palette) -> Palette {
        let prior = std::mem::replace(&mut self.palette, palette);
        if prior != palette {
            self.emit_palette();
        }
        prior
    }

    fn set_line_width(&mut self, width: f32) {
        self.line_width = width;
        self.ops.push(Op::SetOutlineThickness { pt: Pt(width) });
    }

    fn fill_rect(&mut self, rect: Rect) {
        let corners = [
            Point::new(rect.x, rect.y),
            Point::new(rect.right(), rect.y),
            Point::new(rect.right(), rect.top()),
            Point::new(rect.x, rect.top()),
        ];
        self.ops.push(Op::DrawPolygon {
            polygon: filled(corners.into_iter().map(straight).collect()),
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point) {
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![straight(from), straight(to)],
                is_closed: false,
            },
        });
    }

    fn stroke_rounded_rect(&mut self, rect: Rect, radius: f32) {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0);
        let corners = [
            (Point::new(rect.right() - r, rect.y + r), -90.0),
            (Point::new(rect.right() - r, rect.top() - r), 0.0),
            (Point::new(rect.x + r, rect.top() - r), 90.0),
            (Point::new(rect.x + r, rect.y + r), 180.0),
        ];
        let points = corners
            .into_iter()
            .flat_map(|(center, start)| quarter_arc(center, r, start))
            .collect();

        self.ops.push(Op::DrawLine {
            line: Line {
                points,
                is_closed: true,
            },
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f32) {
        let points = [0.0, 90.0, 180.0, 270.0]
            .into_iter()
            .flat_map(|start| quarter_arc(center, radius, start))
            .collect();
        self.ops.push(Op::DrawPolygon {
            polygon: filled(points),
        });
    }

    fn draw_image(&mut self, path: &Path, fit: Rect) -> Result<()> {
        let image = self.load_image(path)?;
        if image.width == 0 || image.height == 0 {
            return Ok(());
        }

        let scale = (fit.width / image.width as f32).min(fit.height / image.height as f32);
        let height = image.height as f32 * scale;

        self.ops.push(Op::UseXobject {
            id: image.id,
            transform: XObjectTransform {
                translate_x: Some(Pt(fit.x)),
                translate_y: Some(Pt(fit.top() - height)),
                scale_x: Some(scale),
                scale_y: Some(scale),
                dpi: Some(IMAGE_DPI),
                ..Default::default()
            },
        });
        Ok(())
    }

    fn text_box(&mut self, text: &str, text_box: &TextBox) {
        let layout = text::layout_box(text, text_box);
        if layout.lines.iter().all(|line| line.fragments.is_empty()) {
            return;
        }
        self.write_layout(&layout, text_box);
    }
}

// =============================================================================
// Conversions
// =============================================================================

fn color(ink: Ink) -> Color {
    Color::Rgb(Rgb {
        r: ink.r,
        g: ink.g,
        b: ink.b,
        icc_profile: None,
    })
}

fn builtin_font(style: Style) -> BuiltinFont {
    match (style.family, style.bold, style.italic) {
        (Family::Helvetica, false, false) => BuiltinFont::Helvetica,
        (Family::Helvetica, true, false) => BuiltinFont::HelveticaBold,
        (Family::Helvetica, false, true) => BuiltinFont::HelveticaOblique,
        (Family::Helvetica, true, true) => BuiltinFont::HelveticaBoldOblique,
        (Family::Times, false, false) => BuiltinFont::TimesRoman,
        (Family::Times, true, false) => BuiltinFont::TimesBold,
        (Family::Times, false, true) => BuiltinFont::TimesItalic,
        (Family::Times, true, true) => BuiltinFont::TimesBoldItalic,
        (Family::Courier, false, false) => BuiltinFont::Courier,
        (Family::Courier, true, false) => BuiltinFont::CourierBold,
        (Family::Courier, false, true) => BuiltinFont::CourierOblique,
        (Family::Courier, true, true) => BuiltinFont::CourierBoldOblique,
    }
}

fn text_matrix(at: Point, rotate: f32) -> TextMatrix {
    if rotate == 0.0 {
        return TextMatrix::Translate(Pt(at.x), Pt(at.y));
    }
    let (sin, cos) = rotate.to_radians().sin_cos();
    TextMatrix::Raw([cos, sin, -sin, cos, at.x, at.y])
}

fn straight(p: Point) -> LinePoint {
    LinePoint {
        p: printpdf::Point {
            x: Pt(p.x),
            y: Pt(p.y),
        },
        bezier: false,
    }
}

fn filled(points: Vec<LinePoint>) -> Polygon {
    Polygon {
        rings: vec![PolygonRing { points }],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    }
}

/// Cubic Bezier approximation of the quarter circle starting at `start_deg`,
/// counter-clockwise.
fn quarter_arc(center: Point, radius: f32, start_deg: f32) -> [LinePoint; 4] {
    let (s0, c0) = start_deg.to_radians().sin_cos();
    let (s1, c1) = (start_deg + 90.0).to_radians().sin_cos();
    let k = BEZIER_CIRCLE_FACTOR * radius;

    let start = Point::new(center.x + radius * c0, center.y + radius * s0);
    let end = Point::new(center.x + radius * c1, center.y + radius * s1);
    let control_1 = Point::new(start.x - k * s0, start.y + k * c0);
    let control_2 = Point::new(end.x + k * s1, end.y - k * c1);

    let curve = |p: Point| LinePoint {
        bezier: true,
        ..straight(p)
    };
    [curve(start), curve(control_1), curve(control_2), straight(end)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_quarter_arc_endpoints() {
        let [start, c1, c2, end] = quarter_arc(Point::new(10.0, 10.0), 5.0, 0.0);

        assert!(close(start.p.x.0, 15.0) && close(start.p.y.0, 10.0));
        assert!(close(end.p.x.0, 10.0) && close(end.p.y.0, 15.0));
        assert!(close(c1.p.x.0, 15.0) && c1.p.y.0 > 10.0);
        assert!(close(c2.p.y.0, 15.0) && c2.p.x.0 > 10.0);
        assert!(start.bezier && c1.bezier && c2.bezier && !end.bezier);
    }

    #[test]
    fn test_font_mapping() {
        let style = Style {
            bold: true,
            italic: true,
            family: Family::Times,
            ..Style::default()
        };
        assert!(matches!(builtin_font(style), BuiltinFont::TimesBoldItalic));
        assert!(matches!(builtin_font(Style::default()), BuiltinFont::Helvetica));
    }

    #[test]
    fn test_pages_flush_on_begin() {
        let mut canvas = PdfCanvas::new("test");
        assert_eq!(canvas.page_count(), 0);

        canvas.begin_page(612.0, 792.0);
        canvas.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0));
        canvas.begin_page(612.0, 792.0);
        assert_eq!(canvas.page_count(), 2);

        let bytes = canvas.finish();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_palette_swap_returns_prior() {
        let mut canvas = PdfCanvas::new("test");
        canvas.begin_page(612.0, 792.0);

        let prior = canvas.set_palette(Palette::solid(Ink::WHITE));
        assert_eq!(prior, Palette::default());
        assert_eq!(canvas.palette(), Palette::solid(Ink::WHITE));
    }

    #[test]
    fn test_missing_image_is_config_error() {
        let mut canvas = PdfCanvas::new("test");
        canvas.begin_page(612.0, 792.0);

        let err = canvas
            .draw_image(Path::new("/definitely/not/here.png"), Rect::new(0.0, 0.0, 10.0, 10.0))
            .unwrap_err();
        assert!(matches!(err, CardError::Config(_)));
    }
}
