//! Reader session: owns the chapter cache for the active locale.
//!
//! The cache is built here and handed out by reference; nothing else
//! constructs one. Changing the locale rebuilds it, changing the
//! translation empties it.

use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use tracing::info;

use crate::bible::{BookStructure, ChapterKey, ChapterVerseCache, ChapterVerses, ContentClient};
use crate::config::Config;

/// A chapter opened in the reader
#[derive(Debug, Clone)]
pub struct OpenedChapter {
  pub key: ChapterKey,
  pub verses: Arc<ChapterVerses>,
  /// True when the chapter was not cached and a loading state was shown
  pub showed_loading: bool,
  pub from_cache: bool,
}

pub struct ReaderSession {
  config: Config,
  cache: ChapterVerseCache,
  translation: Option<String>,
  structure: Option<BookStructure>,
}

impl ReaderSession {
  pub fn new(config: Config, locale: &str) -> Result<Self> {
    let cache = Self::build_cache(&config, locale)?;
    Ok(Self {
      config,
      cache,
      translation: None,
      structure: None,
    })
  }

  fn build_cache(config: &Config, locale: &str) -> Result<ChapterVerseCache> {
    let client = ContentClient::new(config, locale)?;
    Ok(ChapterVerseCache::new(client, config.cache.options()))
  }

  pub fn cache(&self) -> &ChapterVerseCache {
    &self.cache
  }

  pub fn locale(&self) -> &str {
    self.cache.locale()
  }

  pub fn translation(&self) -> Option<&str> {
    self.translation.as_deref()
  }

  pub fn structure(&self) -> Option<&BookStructure> {
    self.structure.as_ref()
  }

  /// Switch display locale. Content is locale-scoped, so a new cache is built.
  pub fn set_locale(&mut self, locale: &str) -> Result<()> {
    if locale == self.locale() {
      return Ok(());
    }
    info!(from = self.locale(), to = locale, "locale changed, rebuilding chapter cache");
    self.cache = Self::build_cache(&self.config, locale)?;
    Ok(())
  }

  /// Switch translation: always empties the cache, then loads the book structure.
  pub async fn select_translation(&mut self, translation: &str) -> Result<&BookStructure> {
    self.cache.clear_cache();
    self.translation = Some(translation.to_string());
    self.structure = None;

    let structure = self
      .cache
      .fetch_structure(translation)
      .await
      .map_err(|e| eyre!("Failed to load structure of {}: {}", translation, e))?;
    info!(translation, books = structure.books().count(), "translation selected");

    Ok(self.structure.insert(structure))
  }

  /// Open a chapter of the selected translation and warm its neighbors.
  pub async fn open_chapter(&self, book: &str, chapter: u32) -> Result<OpenedChapter> {
    let translation = self
      .translation
      .as_deref()
      .ok_or_else(|| eyre!("No translation selected"))?;

    let showed_loading = !self.cache.is_in_cache(translation, book, chapter);

    let result = self.cache.get_verses(translation, book, chapter).await?;

    if let Some(structure) = &self.structure {
      self
        .cache
        .prefetch_adjacent(translation, book, chapter, structure);
    }

    Ok(OpenedChapter {
      key: ChapterKey::new(translation, book, chapter),
      from_cache: result.from_cache_hit(),
      verses: result.data,
      showed_loading,
    })
  }
}
