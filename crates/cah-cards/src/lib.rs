//! Print-ready card sheets for Cards Against Humanity style games
//!
//! Card lists are paginated onto a die-cut grid, each card line is run
//! through a small markup translator, and the pages are painted on a
//! [`CardCanvas`]. [`PdfCanvas`] writes the result with printpdf.

pub mod canvas;
pub mod constants;
pub mod geometry;
pub mod loader;
pub mod markup;
pub mod options;
pub mod paginate;
pub mod pdf;
pub mod render;
pub mod types;

pub use canvas::{CardCanvas, Ink, Palette, PaletteGuard};
pub use geometry::CardGeometry;
pub use loader::{find_deck_dirs, load_deck_from_dir, load_deck_from_files, output_file_name};
pub use markup::translate;
pub use options::{CardOptions, CardSize};
pub use paginate::paginate;
pub use pdf::{PdfCanvas, generate_pdf, render_pdf_bytes};
pub use render::{render_document, render_page};
pub use types::*;
