//! Card page rendering
//!
//! Turns one page of raw card lines into drawing calls. The call order is
//! background, grid, logos, then card contents, so nothing later is hidden by
//! something earlier.

use crate::canvas::{Align, CardCanvas, Ink, Palette, PaletteGuard, Point, Rect, TextBox};
use crate::constants::*;
use crate::geometry::CardGeometry;
use crate::markup::translate;
use crate::types::{CardColor, GameInfo, Page, ParsedCard, Result};
use std::path::Path;

// =============================================================================
// Public API
// =============================================================================

/// Render every white page, then every black page.
///
/// When both sets are empty a single blank card of each colour is rendered
/// so the output is still a valid document. Returns the number of sheets.
pub fn render_document<C: CardCanvas + ?Sized>(
    canvas: &mut C,
    white: &[Page],
    black: &[Page],
    geometry: &CardGeometry,
    info: &GameInfo,
    icon: &Path,
) -> Result<usize> {
    let blank;
    let (white, black) = if white.is_empty() && black.is_empty() {
        log::debug!("No cards to render, emitting blank cards");
        blank = [blank_page(CardColor::White), blank_page(CardColor::Black)];
        (&blank[..1], &blank[1..])
    } else {
        (white, black)
    };

    for page in white.iter().chain(black) {
        render_page(canvas, page, geometry, info, icon)?;
    }

    Ok(white.len() + black.len())
}

/// Render one sheet of cards.
///
/// Black pages are filled black and drawn in white ink. The canvas palette is
/// back to what it was before the call when this returns.
pub fn render_page<C: CardCanvas + ?Sized>(
    canvas: &mut C,
    page: &Page,
    geometry: &CardGeometry,
    info: &GameInfo,
    icon: &Path,
) -> Result<()> {
    canvas.begin_page(geometry.paper_width, geometry.paper_height);
    canvas.set_line_width(GRID_LINE_WIDTH);

    let ink = if page.is_black() {
        let mut background = PaletteGuard::new(&mut *canvas, Palette::solid(Ink::BLACK));
        background.fill_rect(Rect::new(0.0, 0.0, geometry.paper_width, geometry.paper_height));
        Ink::WHITE
    } else {
        Ink::BLACK
    };

    let mut canvas = PaletteGuard::new(canvas, Palette::solid(ink));

    draw_grid(&mut *canvas, geometry);
    draw_logos(&mut *canvas, geometry, icon)?;

    for (index, line) in page.cards.iter().take(geometry.capacity()).enumerate() {
        let card = translate(line, page.color);
        draw_card(&mut *canvas, geometry, index, &card, info);
    }

    Ok(())
}

/// Content area of the card in slot `index`.
///
/// Slots are numbered left to right, top to bottom, while sheet coordinates
/// grow upwards, so the row is counted down from the top of the grid.
pub fn content_box(geometry: &CardGeometry, index: usize) -> Rect {
    let column = index % geometry.cards_across;
    let row = geometry.cards_high - index / geometry.cards_across;

    let (origin_x, origin_y) = geometry.origin();
    let x = origin_x + geometry.card_width * column as f32 + CARD_PADDING;
    let top = origin_y + geometry.card_height * row as f32 - CARD_PADDING;
    let height = geometry.card_height - CARD_PADDING;

    Rect::new(x, top - height, geometry.card_width - 2.0 * CARD_PADDING, height)
}

// =============================================================================
// Sheet Furniture
// =============================================================================

fn blank_page(color: CardColor) -> Page {
    Page {
        color,
        cards: vec![" ".to_string()],
    }
}

/// Cut lines: a plain grid, or one rounded outline per card.
fn draw_grid<C: CardCanvas + ?Sized>(canvas: &mut C, geometry: &CardGeometry) {
    let (origin_x, origin_y) = geometry.origin();

    if geometry.has_rounded_corners() {
        for col in 0..geometry.cards_across {
            for row in 0..geometry.cards_high {
                let cell = Rect::new(
                    origin_x + col as f32 * geometry.card_width,
                    origin_y + row as f32 * geometry.card_height,
                    geometry.card_width,
                    geometry.card_height,
                );
                canvas.stroke_rounded_rect(cell, geometry.rounded_corner_radius);
            }
        }
        return;
    }

    for col in 0..=geometry.cards_across {
        let x = origin_x + col as f32 * geometry.card_width;
        canvas.stroke_line(
            Point::new(x, origin_y),
            Point::new(x, origin_y + geometry.page_height),
        );
    }

    for row in 0..=geometry.cards_high {
        let y = origin_y + row as f32 * geometry.card_height;
        canvas.stroke_line(
            Point::new(origin_x, y),
            Point::new(origin_x + geometry.page_width, y),
        );
    }
}

/// Branding logo in every slot, filled or not.
fn draw_logos<C: CardCanvas + ?Sized>(
    canvas: &mut C,
    geometry: &CardGeometry,
    icon: &Path,
) -> Result<()> {
    for index in 0..geometry.capacity() {
        let bounds = content_box(geometry, index);
        let fit = Rect::new(
            bounds.x,
            bounds.y + LOGO_TOP_OFFSET - LOGO_MAX_HEIGHT,
            geometry.card_width / 2.0,
            LOGO_MAX_HEIGHT,
        );
        canvas.draw_image(icon, fit)?;
    }
    Ok(())
}

// =============================================================================
// Card Contents
// =============================================================================

fn draw_card<C: CardCanvas + ?Sized>(
    canvas: &mut C,
    geometry: &CardGeometry,
    index: usize,
    card: &ParsedCard,
    info: &GameInfo,
) {
    let bounds = content_box(geometry, index);

    let draws_two = card.pick_count == 3 && !card.is_warning_card();
    let reserve = if draws_two { TEXT_RESERVE_DRAW } else { TEXT_RESERVE };

    let text = TextBox::new(bounds.top_left(), bounds.width, CARD_FONT_SIZE)
        .height(geometry.card_height - reserve)
        .shrink_to_fit()
        .inline_format();
    canvas.text_box(&card.markup(), &text);

    // Warning badge and pick badge share a spot; the warning wins
    match (&card.warning_glyph, card.pick_count) {
        (Some(glyph), _) => draw_badge(canvas, &bounds, None, glyph, 0.0),
        (None, 2) => draw_badge(canvas, &bounds, Some("PICK"), "2", 0.0),
        (None, 3) => {
            draw_badge(canvas, &bounds, Some("PICK"), "3", 0.0);
            draw_badge(canvas, &bounds, Some("DRAW"), "2", BADGE_STACK_OFFSET);
        }
        _ => {}
    }

    draw_footer(canvas, &bounds, info.footer_name(card.pick_count), &info.version);
}

/// Round badge in the lower-right corner: an optional label, a disc in the
/// card ink and a value in the background colour on top of it.
fn draw_badge<C: CardCanvas + ?Sized>(
    canvas: &mut C,
    bounds: &Rect,
    label: Option<&str>,
    value: &str,
    lift: f32,
) {
    let ink = canvas.palette().fill;
    let center = Point::new(bounds.right() - 6.0, bounds.y + 17.5 + lift);

    if let Some(label) = label {
        let at = Point::new(bounds.right() - 55.0, bounds.y + 21.0 + lift);
        let label_box = TextBox::new(at, 35.0, BADGE_LABEL_SIZE)
            .align(Align::Right)
            .bold();
        canvas.text_box(label, &label_box);
    }

    PaletteGuard::new(&mut *canvas, Palette::solid(ink)).fill_circle(center, BADGE_RADIUS);

    let value_box = TextBox::new(Point::new(center.x - 6.0, center.y + 5.0), 12.0, BADGE_DIGIT_SIZE)
        .align(Align::Center)
        .bold();
    PaletteGuard::new(&mut *canvas, Palette::solid(ink.inverse())).text_box(value, &value_box);
}

/// Version stamp over the logo and the game name beside it.
fn draw_footer<C: CardCanvas + ?Sized>(canvas: &mut C, bounds: &Rect, name: &str, version: &str) {
    if !version.is_empty() {
        let at = Point::new(bounds.x + 6.0, bounds.y + 22.0);
        let stamp = TextBox::new(at, 20.0, FOOTER_FONT_SIZE)
            .align(Align::Center)
            .rotate(-VERSION_ROTATION_DEG)
            .bold();
        canvas.text_box(version, &stamp);
    }

    if !name.is_empty() {
        let at = Point::new(bounds.x + 24.0, bounds.y + 20.0);
        let footer = TextBox::new(at, 80.0, FOOTER_FONT_SIZE).bold();
        canvas.text_box(name, &footer);
    }
}

// =============================================================================
// Tests
// =============================================================================
