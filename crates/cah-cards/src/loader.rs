//! Deck loading
//!
//! Reads card lists, the optional info file, and finds the icon and the deck
//! directories to build. Missing card and info files are not errors: they
//! load as empty lists and default info.

use crate::options::CardOptions;
use crate::paginate::split_lines;
use crate::types::{Deck, GameInfo, Result, abbreviate};
use std::path::{Path, PathBuf};

/// Icon location relative to a deck directory or the working directory
pub const DEFAULT_ICON: &str = "resources/icon.png";

/// Output name used when the deck directory has no usable name
pub const DEFAULT_OUTPUT_STEM: &str = "cards";

/// Info values that mean "not set"
const NONE_VALUE: &str = "none";

// =============================================================================
// Card and Info Files
// =============================================================================

/// Load the lines of a card file. A missing file has no lines.
pub async fn load_lines(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(split_lines(&String::from_utf8_lossy(&bytes))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("{} not found, no cards loaded", path.display());
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

/// Load game info. A missing file gives the default (empty) info.
pub async fn load_info(path: impl AsRef<Path>) -> Result<GameInfo> {
    let path = path.as_ref();
    match tokio::fs::read_to_string(path).await {
        Ok(contents) => Ok(parse_info(&contents)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("{} not found, using default game info", path.display());
            Ok(GameInfo::default())
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse up to three `key=value` lines.
///
/// Known keys are assigned by name; anything else goes by position (name,
/// abbreviation, version). A missing abbreviation is derived from the name.
pub fn parse_info(contents: &str) -> GameInfo {
    let mut slots: [Option<String>; 3] = Default::default();

    for (position, line) in contents.lines().filter(|l| !l.trim().is_empty()).take(3).enumerate() {
        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key.trim().to_ascii_lowercase(), value.trim()),
            None => (String::new(), line.trim()),
        };

        let slot = match key.as_str() {
            "name" | "game_name" => 0,
            "abbr" | "abbreviation" | "short_name" | "game_name_abbr" => 1,
            "version" | "game_version" => 2,
            _ => position,
        };

        if value.eq_ignore_ascii_case(NONE_VALUE) {
            continue;
        }
        slots[slot] = Some(value.to_string());
    }

    let [name, abbreviation, version] = slots;
    let name = name.unwrap_or_default();
    let abbreviation = abbreviation.unwrap_or_else(|| abbreviate(&name));

    GameInfo {
        name,
        abbreviation,
        version: version.unwrap_or_default(),
    }
}

// =============================================================================
// Icon
// =============================================================================

/// Icon for a deck in `dir`: the deck's own `resources/icon.png`, else the
/// one in the working directory.
///
/// The fallback is returned even if it does not exist; drawing the logo
/// reports that as a configuration error.
pub async fn resolve_icon(dir: &Path) -> PathBuf {
    let own = dir.join(DEFAULT_ICON);
    if tokio::fs::try_exists(&own).await.unwrap_or(false) {
        return own;
    }
    log::debug!("{} not found, falling back to ./{}", own.display(), DEFAULT_ICON);
    PathBuf::from(".").join(DEFAULT_ICON)
}

// =============================================================================
// Decks
// =============================================================================

/// Load the deck in `dir` using the file names from `options`.
pub async fn load_deck_from_dir(dir: &Path, options: &CardOptions) -> Result<Deck> {
    let white = load_lines(dir.join(&options.white_file)).await?;
    let black = load_lines(dir.join(&options.black_file)).await?;
    let info = load_info(dir.join(&options.info_file)).await?;
    let icon = match &options.icon_file {
        Some(icon) => dir.join(icon),
        None => resolve_icon(dir).await,
    };

    log::debug!(
        "Loaded {}: {} white, {} black",
        dir.display(),
        white.len(),
        black.len()
    );

    Ok(Deck {
        title: output_stem(dir),
        white,
        black,
        info,
        icon,
    })
}

/// Load a deck from explicitly named files. Any of them may be absent.
pub async fn load_deck_from_files(
    white: Option<&Path>,
    black: Option<&Path>,
    info: Option<&Path>,
    title: &str,
    options: &CardOptions,
) -> Result<Deck> {
    let white = match white {
        Some(path) => load_lines(path).await?,
        None => Vec::new(),
    };
    let black = match black {
        Some(path) => load_lines(path).await?,
        None => Vec::new(),
    };
    let info = match info {
        Some(path) => load_info(path).await?,
        None => GameInfo::default(),
    };
    let icon = match &options.icon_file {
        Some(icon) => icon.clone(),
        None => resolve_icon(Path::new(".")).await,
    };

    Ok(Deck {
        title: title.to_string(),
        white,
        black,
        info,
        icon,
    })
}

/// Directories to build under `root`.
///
/// The root always comes first. With `options.recursive`, every descendant
/// directory holding a white or black card file follows, in sorted order.
pub async fn find_deck_dirs(root: &Path, options: &CardOptions) -> Result<Vec<PathBuf>> {
    let mut decks = vec![root.to_path_buf()];
    if !options.recursive {
        return Ok(decks);
    }

    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let mut children = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                children.push(entry.path());
            }
        }
        children.sort();

        for child in children.iter().rev() {
            pending.push(child.clone());
        }
        for child in children {
            if has_card_files(&child, options).await {
                decks.push(child);
            }
        }
    }

    decks[1..].sort();
    Ok(decks)
}

async fn has_card_files(dir: &Path, options: &CardOptions) -> bool {
    for file in [&options.white_file, &options.black_file] {
        if tokio::fs::try_exists(dir.join(file)).await.unwrap_or(false) {
            return true;
        }
    }
    false
}

// =============================================================================
// Output Naming
// =============================================================================

/// Document title and output stem for a deck directory: its last component,
/// or `cards` for the working directory.
pub fn output_stem(dir: &Path) -> String {
    if dir == Path::new(".") {
        return DEFAULT_OUTPUT_STEM.to_string();
    }
    dir.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty() && name != "." && name != "..")
        .unwrap_or_else(|| DEFAULT_OUTPUT_STEM.to_string())
}

/// `<stem>.pdf` for a deck directory
pub fn output_file_name(dir: &Path) -> String {
    format!("{}.pdf", output_stem(dir))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_info_positional() {
        let info = parse_info("name=Bigger Blacker Cards\nabbr=BBC\nversion=v1.2\n");
        assert_eq!(info.name, "Bigger Blacker Cards");
        assert_eq!(info.abbreviation, "BBC");
        assert_eq!(info.version, "v1.2");
    }

    #[test]
    fn test_parse_info_keys_out_of_order() {
        let info = parse_info("game_version=2\ngame_name=Party Game\n");
        assert_eq!(info.name, "Party Game");
        assert_eq!(info.version, "2");
        assert_eq!(info.abbreviation, "PG");
    }

    #[test]
    fn test_parse_info_none_and_derived() {
        let info = parse_info("name=Cards Against Humanity\nshort_name=none\nversion=none");
        assert_eq!(info.abbreviation, "CAH");
        assert_eq!(info.version, "");
    }

    #[test]
    fn test_parse_info_empty() {
        assert_eq!(parse_info(""), GameInfo::default());
    }

    #[test]
    fn test_parse_info_only_three_lines() {
        let info = parse_info("a=One\nb=Two\nc=Three\nd=Four");
        assert_eq!(info.name, "One");
        assert_eq!(info.abbreviation, "Two");
        assert_eq!(info.version, "Three");
    }

    #[test]
    fn test_output_names() {
        assert_eq!(output_file_name(Path::new(".")), "cards.pdf");
        assert_eq!(output_file_name(Path::new("decks/expansion")), "expansion.pdf");
        assert_eq!(output_file_name(Path::new("decks/base/")), "base.pdf");
        assert_eq!(output_stem(Path::new("/")), "cards");
    }
}
