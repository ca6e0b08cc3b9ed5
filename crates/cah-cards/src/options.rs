use crate::constants::{LARGE_CARD_IN, SMALL_CARD_IN};
use crate::geometry::CardGeometry;
#[cfg(feature = "serde")]
use crate::types::{CardError, Result};
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Physical card size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CardSize {
    /// 2" x 2"
    #[default]
    Small,
    /// 2.5" x 3.5" poker size
    Large,
    Custom { width_in: f32, height_in: f32 },
}

impl CardSize {
    /// Width and height in inches
    pub fn dimensions_in(&self) -> (f32, f32) {
        match *self {
            CardSize::Small => SMALL_CARD_IN,
            CardSize::Large => LARGE_CARD_IN,
            CardSize::Custom {
                width_in,
                height_in,
            } => (width_in, height_in),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CardSize::Small => "Small",
            CardSize::Large => "Large",
            CardSize::Custom { .. } => "Custom",
        }
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CardOptions {
    pub card_size: CardSize,
    pub rounded_corners: bool,
    pub one_card_per_page: bool,

    // Inputs, relative to the deck directory when not absolute
    pub white_file: PathBuf,
    pub black_file: PathBuf,
    pub info_file: PathBuf,
    /// Icon override; `resources/icon.png` is searched when unset
    pub icon_file: Option<PathBuf>,

    /// Also build decks found in subdirectories
    pub recursive: bool,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            card_size: CardSize::Small,
            rounded_corners: false,
            one_card_per_page: false,
            white_file: PathBuf::from("white.txt"),
            black_file: PathBuf::from("black.txt"),
            info_file: PathBuf::from("info.txt"),
            icon_file: None,
            recursive: true,
        }
    }
}

impl CardOptions {
    /// Grid geometry for these options
    pub fn geometry(&self) -> CardGeometry {
        let (width, height) = self.card_size.dimensions_in();
        CardGeometry::compute(width, height, self.rounded_corners, self.one_card_per_page)
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| CardError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CardError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}
