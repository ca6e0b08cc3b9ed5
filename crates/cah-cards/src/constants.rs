//! Shared constants for card sheet layout
//!
//! All lengths are PDF points unless the name says otherwise.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per inch
pub const POINTS_PER_INCH: f32 = 72.0;

/// Convert inches to points
#[inline]
pub fn in_to_pt(inches: f32) -> f32 {
    inches * POINTS_PER_INCH
}

// =============================================================================
// Paper and Cards
// =============================================================================

/// US Letter width (8.5")
pub const PAPER_WIDTH_PT: f32 = 612.0;

/// US Letter height (11")
pub const PAPER_HEIGHT_PT: f32 = 792.0;

/// Corner radius used for rounded cards (1/8")
pub const ROUNDED_CORNER_RADIUS_PT: f32 = POINTS_PER_INCH / 8.0;

/// Small preset card size in inches
pub const SMALL_CARD_IN: (f32, f32) = (2.0, 2.0);

/// Large preset card size in inches (poker size)
pub const LARGE_CARD_IN: (f32, f32) = (2.5, 3.5);

// =============================================================================
// Card Content Box
// =============================================================================

/// Inset of the content box from the left, right and top cell edges
pub const CARD_PADDING: f32 = 10.0;

/// Vertical space reserved below the card text for logo and footer
pub const TEXT_RESERVE: f32 = 35.0;

/// Reserve when a draw-2 badge stacks above the pick badge
pub const TEXT_RESERVE_DRAW: f32 = 55.0;

/// Base font size for card text
pub const CARD_FONT_SIZE: f32 = 14.0;

/// Stroke width of the cut grid
pub const GRID_LINE_WIDTH: f32 = 0.5;

// =============================================================================
// Logo and Footer
// =============================================================================

/// Maximum logo height inside a card
pub const LOGO_MAX_HEIGHT: f32 = 15.0;

/// Height of the logo's top edge above the content box bottom
pub const LOGO_TOP_OFFSET: f32 = 25.0;

/// Footer font size
pub const FOOTER_FONT_SIZE: f32 = 6.0;

/// Rotation of the version stamp in degrees (clockwise)
pub const VERSION_ROTATION_DEG: f32 = 20.0;

// =============================================================================
// Badges
// =============================================================================

/// Radius of the round number badges
pub const BADGE_RADIUS: f32 = 7.5;

/// Badge label font size ("PICK", "DRAW")
pub const BADGE_LABEL_SIZE: f32 = 11.0;

/// Badge digit/glyph font size
pub const BADGE_DIGIT_SIZE: f32 = 14.0;

/// Vertical distance between the pick badge and the draw badge
pub const BADGE_STACK_OFFSET: f32 = 20.0;

// =============================================================================
// Bezier Curve Constants
// =============================================================================

/// Control point factor for approximating quarter circles with cubic Beziers.
/// 4 * (sqrt(2) - 1) / 3
pub const BEZIER_CIRCLE_FACTOR: f32 = 0.552284749831;
