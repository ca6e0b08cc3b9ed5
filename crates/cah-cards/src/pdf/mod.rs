//! PDF output for card sheets

mod canvas;
pub mod text;

pub use canvas::PdfCanvas;

use crate::geometry::CardGeometry;
use crate::paginate::paginate;
use crate::render::render_document;
use crate::types::{CardColor, Deck, Result};
use std::path::Path;

/// Render `deck` and write the PDF to `output_path`.
pub async fn generate_pdf(
    deck: &Deck,
    geometry: &CardGeometry,
    output_path: impl AsRef<Path>,
) -> Result<()> {
    let deck = deck.clone();
    let geometry = *geometry;
    let output_path = output_path.as_ref().to_owned();

    let bytes = tokio::task::spawn_blocking(move || render_pdf_bytes(&deck, &geometry)).await??;

    tokio::fs::write(&output_path, bytes).await?;
    log::info!("Wrote {}", output_path.display());

    Ok(())
}

/// Render `deck` to an in-memory PDF.
pub fn render_pdf_bytes(deck: &Deck, geometry: &CardGeometry) -> Result<Vec<u8>> {
    let white = paginate(&deck.white, geometry, CardColor::White);
    let black = paginate(&deck.black, geometry, CardColor::Black);

    let mut canvas = PdfCanvas::new(&deck.title);
    let sheets = render_document(&mut canvas, &white, &black, geometry, &deck.info, &deck.icon)?;
    log::info!(
        "{}: {} white and {} black pages ({} sheets)",
        deck.title,
        white.len(),
        black.len(),
        sheets
    );

    Ok(canvas.finish())
}
