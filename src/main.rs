use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use rbiblia::config::Config;
use rbiblia::logging;
use rbiblia::session::ReaderSession;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

/// How long to let background prefetches finish before exiting
const PREFETCH_GRACE: Duration = Duration::from_secs(5);

#[derive(Parser, Debug)]
#[command(name = "rbiblia")]
#[command(about = "Read Bible chapters from an rBiblia content API")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/rbiblia/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Display locale (overrides config)
  #[arg(short, long)]
  locale: Option<String>,

  /// Translation id, e.g. pl_ubg (overrides config)
  #[arg(short, long)]
  translation: Option<String>,

  /// Book id, e.g. gen
  #[arg(short, long)]
  book: String,

  /// Chapter number (default: first chapter of the book)
  #[arg(short = 'n', long)]
  chapter: Option<u32>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;
  let _log_guard = logging::init()?;

  let args = Args::parse();

  // Load configuration
  let config = Config::load(args.config.as_deref())?;
  let locale = args.locale.unwrap_or_else(|| config.locale.clone());
  let translation = args
    .translation
    .or_else(|| config.default_translation.clone())
    .ok_or_else(|| eyre!("No translation given. Pass --translation or set default_translation."))?;

  let mut session = ReaderSession::new(config, &locale)?;
  let structure = session.select_translation(&translation).await?;

  let chapter = match args.chapter {
    Some(chapter) => chapter,
    None => structure
      .chapters(&args.book)
      .and_then(|chapters| chapters.first().copied())
      .ok_or_else(|| eyre!("Book {} not found in {}", args.book, translation))?,
  };

  let opened = session.open_chapter(&args.book, chapter).await?;
  info!(key = %opened.key, verses = opened.verses.len(), "chapter opened");

  for verse in opened.verses.iter() {
    let mut lines = verse.lines();
    if let Some(first) = lines.next() {
      println!("{:>4}  {}", format!("{}:{}", chapter, verse.number), first);
    }
    for line in lines {
      println!("      {}", line);
    }
  }

  if tokio::time::timeout(PREFETCH_GRACE, session.cache().settled())
    .await
    .is_err()
  {
    warn!("Exiting with prefetches still pending");
  }
  info!(cached = session.cache().len(), "done");

  Ok(())
}
