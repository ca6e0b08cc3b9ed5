//! Card grid geometry
//!
//! Derives how many cards fit on a sheet and where the grid sits, from the
//! physical card size. All values are in PDF points with the origin at the
//! bottom-left corner of the sheet.

use crate::constants::{PAPER_HEIGHT_PT, PAPER_WIDTH_PT, ROUNDED_CORNER_RADIUS_PT, in_to_pt};

/// Layout of the card grid on one sheet of paper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardGeometry {
    pub card_width: f32,
    pub card_height: f32,
    /// Corner radius of each card outline, 0 for a plain cut grid
    pub rounded_corner_radius: f32,
    pub one_per_page: bool,
    pub paper_width: f32,
    pub paper_height: f32,
    pub cards_across: usize,
    pub cards_high: usize,
    /// Width of the grid itself (`cards_across * card_width`)
    pub page_width: f32,
    /// Height of the grid itself (`cards_high * card_height`)
    pub page_height: f32,
    /// Offset that centres the grid horizontally
    pub margin_left: f32,
    /// Offset that centres the grid vertically (applies top and bottom)
    pub margin_top: f32,
}

impl CardGeometry {
    /// Compute the grid for cards of the given size in inches.
    ///
    /// With `one_per_page` the sheet is the card itself; otherwise cards are
    /// tiled on US Letter. A card larger than the paper still gets one row
    /// and one column.
    pub fn compute(
        card_width_in: f32,
        card_height_in: f32,
        rounded: bool,
        one_per_page: bool,
    ) -> Self {
        let card_width = in_to_pt(card_width_in);
        let card_height = in_to_pt(card_height_in);

        let (paper_width, paper_height) = if one_per_page {
            (card_width, card_height)
        } else {
            (PAPER_WIDTH_PT, PAPER_HEIGHT_PT)
        };

        let cards_across = fit_count(paper_width, card_width);
        let cards_high = fit_count(paper_height, card_height);

        let page_width = card_width * cards_across as f32;
        let page_height = card_height * cards_high as f32;

        Self {
            card_width,
            card_height,
            rounded_corner_radius: if rounded { ROUNDED_CORNER_RADIUS_PT } else { 0.0 },
            one_per_page,
            paper_width,
            paper_height,
            cards_across,
            cards_high,
            page_width,
            page_height,
            margin_left: (paper_width - page_width) / 2.0,
            margin_top: (paper_height - page_height) / 2.0,
        }
    }

    /// Cards per page
    pub fn capacity(&self) -> usize {
        self.cards_across * self.cards_high
    }

    pub fn has_rounded_corners(&self) -> bool {
        self.rounded_corner_radius > 0.0
    }

    /// Bottom-left corner of the grid on the sheet
    pub fn origin(&self) -> (f32, f32) {
        (self.margin_left, self.margin_top)
    }
}

fn fit_count(paper: f32, card: f32) -> usize {
    if card <= 0.0 {
        return 1;
    }
    // Tolerate float noise so that e.g. 8.5" / 2.125" yields exactly 4
    ((paper / card + 1e-4).floor() as usize).max(1)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_cards_on_letter() {
        let g = CardGeometry::compute(2.0, 2.0, false, false);

        assert_eq!(g.card_width, 144.0);
        assert_eq!(g.card_height, 144.0);
        assert_eq!(g.cards_across, 4);
        assert_eq!(g.cards_high, 5);
        assert_eq!(g.capacity(), 20);
        assert_eq!(g.page_width, 576.0);
        assert_eq!(g.page_height, 720.0);
        assert_eq!(g.margin_left, 18.0);
        assert_eq!(g.margin_top, 36.0);
        assert_eq!(g.rounded_corner_radius, 0.0);
    }

    #[test]
    fn test_large_cards_on_letter() {
        let g = CardGeometry::compute(2.5, 3.5, false, false);

        assert_eq!(g.cards_across, 3);
        assert_eq!(g.cards_high, 3);
        assert_eq!(g.capacity(), 9);
        assert_eq!(g.margin_left, (612.0 - 540.0) / 2.0);
        assert_eq!(g.margin_top, (792.0 - 756.0) / 2.0);
    }

    #[test]
    fn test_one_per_page() {
        let g = CardGeometry::compute(2.5, 3.5, true, true);

        assert_eq!(g.paper_width, 180.0);
        assert_eq!(g.paper_height, 252.0);
        assert_eq!(g.capacity(), 1);
        assert_eq!(g.margin_left, 0.0);
        assert_eq!(g.margin_top, 0.0);
        assert_eq!(g.rounded_corner_radius, 9.0);
        assert!(g.has_rounded_corners());
    }

    #[test]
    fn test_oversized_card_degrades_to_single_cell() {
        let g = CardGeometry::compute(10.0, 12.0, false, false);

        assert_eq!(g.cards_across, 1);
        assert_eq!(g.cards_high, 1);
        assert!(g.margin_left < 0.0);
    }

    #[test]
    fn test_grid_fits_on_paper() {
        for (w, h) in [(2.0, 2.0), (2.5, 3.5), (1.3, 0.7), (3.1, 4.9), (4.25, 5.5)] {
            let g = CardGeometry::compute(w, h, false, false);
            assert!(g.page_width <= g.paper_width + 1e-3);
            assert!(g.page_height <= g.paper_height + 1e-3);
            assert_eq!(g.cards_across, (g.paper_width / g.card_width + 1e-4).floor() as usize);
            assert_eq!(g.cards_high, (g.paper_height / g.card_height + 1e-4).floor() as usize);
        }
    }
}
