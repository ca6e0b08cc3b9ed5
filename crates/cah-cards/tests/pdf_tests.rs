use cah_cards::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_icon(dir: &Path) -> PathBuf {
    let path = dir.join("icon.png");
    image::RgbaImage::from_pixel(8, 4, image::Rgba([0, 0, 0, 255]))
        .save(&path)
        .unwrap();
    path
}

fn deck(icon: PathBuf) -> Deck {
    Deck {
        title: "test".to_string(),
        white: vec![
            "Beans".to_string(),
            "A <i>very</i> long card that has to wrap across several lines of the box".to_string(),
            "Draw a card ((!))".to_string(),
        ],
        black: vec![
            "Why __?".to_string(),
            "First __, then __.".to_string(),
            "Make a haiku.\t3".to_string(),
        ],
        info: GameInfo::from_name("Party Cards"),
        icon,
    }
}

#[test]
fn test_render_pdf_bytes() {
    let dir = TempDir::new().unwrap();
    let icon = write_icon(dir.path());

    let bytes = render_pdf_bytes(&deck(icon), &CardOptions::default().geometry()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_rounded_large_cards() {
    let dir = TempDir::new().unwrap();
    let icon = write_icon(dir.path());
    let options = CardOptions {
        card_size: CardSize::Large,
        rounded_corners: true,
        one_card_per_page: true,
        ..CardOptions::default()
    };

    let bytes = render_pdf_bytes(&deck(icon), &options.geometry()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn test_missing_icon_is_config_error() {
    let dir = TempDir::new().unwrap();
    let geometry = CardOptions::default().geometry();
    let err = render_pdf_bytes(&deck(dir.path().join("nope.png")), &geometry).unwrap_err();
    assert!(matches!(err, CardError::Config(_)));
}

#[test]
fn test_empty_deck_still_renders() {
    let dir = TempDir::new().unwrap();
    let mut empty = deck(write_icon(dir.path()));
    empty.white.clear();
    empty.black.clear();

    let bytes = render_pdf_bytes(&empty, &CardOptions::default().geometry()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_generate_pdf_writes_file() {
    let dir = TempDir::new().unwrap();
    let icon = write_icon(dir.path());
    let output = dir.path().join("cards.pdf");

    generate_pdf(&deck(icon), &CardOptions::default().geometry(), &output)
        .await
        .unwrap();

    let bytes = tokio::fs::read(&output).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_write_failure_is_io_error() {
    let dir = TempDir::new().unwrap();
    let icon = write_icon(dir.path());
    let output = dir.path().join("missing/sub/cards.pdf");

    let err = generate_pdf(&deck(icon), &CardOptions::default().geometry(), &output)
        .await
        .unwrap_err();
    assert!(matches!(err, CardError::Io(_)));
    assert!(!output.exists());
}
