use anyhow::{Context, Result};
use cah_cards::{CardOptions, CardSize, Deck};
use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::{CommandFactory, Parser};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const AFTER_HELP: &str = "\
Specify EITHER a directory or individual card files.

With --directory, white cards are read from white.txt, black cards from
black.txt and game info from info.txt in that directory. One PDF named after
the directory is written for it and for every subdirectory holding card files.

Each card file has one card per line. A black card line may end with a tab
and 2 or 3 to set its pick count; otherwise blanks (__) are counted.
Wrap a character in (( )) to make a warning card, e.g. ((!)).

Example:
  cahgen -d cards/ -l -o output";

#[derive(Parser, Debug)]
#[command(
    name = "cahgen",
    about = "Generate printable card sheets for Cards Against Humanity style games",
    version,
    after_help = AFTER_HELP
)]
struct Cli {
    /// Directory to search for card files
    #[arg(short = 'd', long = "directory", visible_alias = "dir")]
    directory: Option<PathBuf>,

    /// White card file
    #[arg(short, long)]
    white: Option<PathBuf>,

    /// Black card file
    #[arg(short, long)]
    black: Option<PathBuf>,

    /// Info file
    #[arg(short, long)]
    info: Option<PathBuf>,

    /// Output directory, or a .pdf file when building from card files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Small 2" x 2" cards (default)
    #[arg(short, long, conflicts_with = "large")]
    small: bool,

    /// Large 2.5" x 3.5" cards
    #[arg(short, long)]
    large: bool,

    /// Draw rounded card outlines instead of a cut grid
    #[arg(short, long)]
    rounded: bool,

    /// One card per page, sized to the card
    #[arg(short = 'p', long = "oneperpage")]
    one_per_page: bool,

    /// Icon drawn on every card
    #[arg(long)]
    icon: Option<PathBuf>,

    /// Do not descend into subdirectories
    #[arg(long)]
    no_recurse: bool,

    /// Write the PDF to stdout
    #[arg(long)]
    stdout: bool,

    /// JSON options file, overridden by flags
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn has_input(&self) -> bool {
        self.directory.is_some() || self.white.is_some() || self.black.is_some()
    }

    async fn options(&self) -> Result<CardOptions> {
        let mut options = match &self.config {
            Some(path) => CardOptions::load(path)
                .await
                .with_context(|| format!("loading {}", path.display()))?,
            None => CardOptions::default(),
        };

        if self.large {
            options.card_size = CardSize::Large;
        } else if self.small {
            options.card_size = CardSize::Small;
        }
        options.rounded_corners |= self.rounded;
        options.one_card_per_page |= self.one_per_page;
        if let Some(icon) = &self.icon {
            options.icon_file = Some(icon.clone());
        }
        if self.no_recurse || self.stdout {
            options.recursive = false;
        }

        Ok(options)
    }
}

/// Parse arguments, dropping any flag clap does not know.
fn parse_lenient(mut args: Vec<String>) -> std::result::Result<(Cli, Vec<String>), clap::Error> {
    let mut ignored = Vec::new();
    loop {
        match Cli::try_parse_from(&args) {
            Ok(cli) => return Ok((cli, ignored)),
            Err(err) if err.kind() == ErrorKind::UnknownArgument => {
                let Some(ContextValue::String(flag)) = err.get(ContextKind::InvalidArg) else {
                    return Err(err);
                };
                let flag = flag.clone();
                let prefix = format!("{flag}=");
                let Some(index) = args
                    .iter()
                    .skip(1)
                    .position(|arg| *arg == flag || arg.starts_with(&prefix))
                else {
                    return Err(err);
                };
                ignored.push(args.remove(index + 1));
            }
            Err(err) => return Err(err),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let (cli, ignored) = parse_lenient(args.clone()).unwrap_or_else(|err| err.exit());
    for flag in &ignored {
        log::warn!("Ignoring unknown argument {flag}");
    }

    if args.len() <= 1 || !cli.has_input() {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let options = cli.options().await?;
    let geometry = options.geometry();
    log::debug!(
        "{} cards, {} per sheet",
        options.card_size.name(),
        geometry.capacity()
    );

    if let Some(root) = &cli.directory {
        let output_dir = cli.output.clone().unwrap_or_else(|| PathBuf::from("."));
        for dir in cah_cards::find_deck_dirs(root, &options)
            .await
            .with_context(|| format!("searching {}", root.display()))?
        {
            let deck = cah_cards::load_deck_from_dir(&dir, &options).await?;
            if cli.stdout {
                write_stdout(&deck, &geometry).await?;
            } else {
                let path = output_dir.join(cah_cards::output_file_name(&dir));
                write_file(&deck, &geometry, &path).await?;
            }
        }
    } else {
        let path = output_file(cli.output.as_deref());
        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| cah_cards::loader::DEFAULT_OUTPUT_STEM.to_string());
        let deck = cah_cards::load_deck_from_files(
            cli.white.as_deref(),
            cli.black.as_deref(),
            cli.info.as_deref(),
            &title,
            &options,
        )
        .await?;

        if cli.stdout {
            write_stdout(&deck, &geometry).await?;
        } else {
            write_file(&deck, &geometry, &path).await?;
        }
    }

    Ok(())
}

/// `-o` is a file when it names a PDF, otherwise the directory for `cards.pdf`.
fn output_file(output: Option<&Path>) -> PathBuf {
    let default = cah_cards::output_file_name(Path::new("."));
    match output {
        Some(path) if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf")) => {
            path.to_path_buf()
        }
        Some(dir) => dir.join(default),
        None => PathBuf::from(default),
    }
}

async fn write_file(deck: &Deck, geometry: &cah_cards::CardGeometry, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    cah_cards::generate_pdf(deck, geometry, path)
        .await
        .with_context(|| format!("generating {}", path.display()))?;
    println!("Generated: {}", path.display());
    Ok(())
}

async fn write_stdout(deck: &Deck, geometry: &cah_cards::CardGeometry) -> Result<()> {
    let deck = deck.clone();
    let geometry = *geometry;
    let bytes = tokio::task::spawn_blocking(move || cah_cards::render_pdf_bytes(&deck, &geometry))
        .await??;

    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Content-Type: application/pdf\n\n").await?;
    stdout.write_all(&bytes).await?;
    stdout.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("cahgen")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_unknown_flags_are_ignored() {
        let (cli, ignored) =
            parse_lenient(args(&["--frobnicate", "-d", "cards", "--color=red", "-l"])).unwrap();
        assert_eq!(cli.directory, Some(PathBuf::from("cards")));
        assert!(cli.large);
        assert_eq!(ignored, vec!["--frobnicate", "--color=red"]);
    }

    #[test]
    fn test_short_flags() {
        let argv = args(&["-w", "w.txt", "-b", "b.txt", "-r", "-p"]);
        let (cli, ignored) = parse_lenient(argv).unwrap();
        assert!(ignored.is_empty());
        assert!(cli.rounded && cli.one_per_page);
        assert!(cli.has_input());
    }

    #[test]
    fn test_no_input() {
        let (cli, _) = parse_lenient(args(&["-l"])).unwrap();
        assert!(!cli.has_input());
    }

    #[test]
    fn test_output_file() {
        assert_eq!(output_file(None), PathBuf::from("cards.pdf"));
        assert_eq!(output_file(Some(Path::new("out"))), PathBuf::from("out/cards.pdf"));
        assert_eq!(output_file(Some(Path::new("deck.PDF"))), PathBuf::from("deck.PDF"));
    }

    #[tokio::test]
    async fn test_flags_override_defaults() {
        let (cli, _) = parse_lenient(args(&["-d", "x", "-l", "-r", "--no-recurse"])).unwrap();
        let options = cli.options().await.unwrap();
        assert_eq!(options.card_size, CardSize::Large);
        assert!(options.rounded_corners);
        assert!(!options.recursive);
    }
}
