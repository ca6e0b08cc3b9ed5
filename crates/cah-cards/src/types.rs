use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CardError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("PDF error: {0}")]
    Pdf(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, CardError>;

/// Which side of the game a card belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardColor {
    /// Answer cards: black ink on white stock, never carry a pick count
    White,
    /// Prompt cards: rendered inverted and carry pick metadata
    Black,
}

impl CardColor {
    pub fn is_black(self) -> bool {
        matches!(self, CardColor::Black)
    }
}

/// One printed sheet worth of raw card lines
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub color: CardColor,
    pub cards: Vec<String>,
}

impl Page {
    pub fn is_black(&self) -> bool {
        self.color.is_black()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// A card line after markup translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCard {
    /// Card text with whitelisted tags kept and everything else escaped
    pub display_text: String,
    /// 0 for white cards, 1 by default for black cards, 2 or 3 for special prompts
    pub pick_count: u8,
    /// Glyph extracted from a `((...))` span
    pub warning_glyph: Option<String>,
}

impl ParsedCard {
    pub fn is_warning_card(&self) -> bool {
        self.warning_glyph.is_some()
    }

    /// Text handed to the text box. Cards are bold unless the author says otherwise.
    pub fn markup(&self) -> String {
        format!("<b>{}</b>", self.display_text)
    }
}

/// Game metadata printed in the footer of every card
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GameInfo {
    pub name: String,
    pub abbreviation: String,
    pub version: String,
}

impl GameInfo {
    /// Build info from a name alone, deriving the abbreviation from its initials.
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let abbreviation = abbreviate(&name);
        Self {
            name,
            abbreviation,
            version: String::new(),
        }
    }

    /// Footer text for a card with the given pick count
    pub fn footer_name(&self, pick_count: u8) -> &str {
        if pick_count >= 2 {
            &self.abbreviation
        } else {
            &self.name
        }
    }
}

/// "Cards Against Humanity" -> "CAH"
pub fn abbreviate(name: &str) -> String {
    name.split_whitespace()
        .filter_map(|word| word.chars().find(|c| c.is_alphanumeric()))
        .flat_map(char::to_uppercase)
        .collect()
}

/// Everything needed to render one output document
#[derive(Debug, Clone, PartialEq)]
pub struct Deck {
    pub title: String,
    pub white: Vec<String>,
    pub black: Vec<String>,
    pub info: GameInfo,
    pub icon: PathBuf,
}
