//! Chapter verse cache that wraps ContentClient with transparent caching.

use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheLayer, CacheOptions, CacheResult};
use crate::error::FetchError;

use super::client::ContentClient;
use super::types::{BookStructure, ChapterKey, ChapterVerses};

/// Result of [`ChapterVerseCache::get_verses`]
pub type VersesResult = CacheResult<Arc<ChapterVerses>>;

/// Per-locale cache of chapter verse content.
///
/// Cloning is cheap and every clone shares the same entries. Build one per
/// active locale (see [`crate::session::ReaderSession`]) and hand clones to
/// whatever needs chapter content.
#[derive(Clone)]
pub struct ChapterVerseCache {
  cache: CacheLayer<ContentClient>,
}

impl ChapterVerseCache {
  pub fn new(client: ContentClient, options: CacheOptions) -> Self {
    Self {
      cache: CacheLayer::new(client, options),
    }
  }

  /// Locale the cached content belongs to.
  pub fn locale(&self) -> &str {
    self.cache.fetcher().locale()
  }

  /// Whether the chapter can be served without a network request.
  pub fn is_in_cache(&self, translation: &str, book: &str, chapter: u32) -> bool {
    self.cache.contains(&ChapterKey::new(translation, book, chapter))
  }

  /// Get chapter verses from the cache, fetching them on a miss.
  ///
  /// `from_cache_hit()` on the result tells whether the network was skipped.
  pub async fn get_verses(
    &self,
    translation: &str,
    book: &str,
    chapter: u32,
  ) -> Result<VersesResult, FetchError> {
    let key = ChapterKey::new(translation, book, chapter);
    self.cache.fetch(&key).await
  }

  /// Fetch a chapter in the background at low priority. Errors are dropped.
  pub fn prefetch(&self, translation: &str, book: &str, chapter: u32) {
    self.cache.prefetch(ChapterKey::new(translation, book, chapter));
  }

  /// Prefetch the chapters before and after `chapter` within its book.
  pub fn prefetch_adjacent(
    &self,
    translation: &str,
    book: &str,
    chapter: u32,
    structure: &BookStructure,
  ) {
    let adjacent = structure.adjacent(book, chapter);
    debug!(
      translation,
      book,
      chapter,
      next = ?adjacent.next,
      previous = ?adjacent.previous,
      "prefetching adjacent chapters"
    );

    if let Some(next) = adjacent.next {
      self.prefetch(translation, book, next);
    }
    if let Some(previous) = adjacent.previous {
      self.prefetch(translation, book, previous);
    }
  }

  /// Empty the cache. Called whenever the active translation changes.
  pub fn clear_cache(&self) {
    self.cache.clear();
  }

  pub fn len(&self) -> usize {
    self.cache.len()
  }

  pub fn is_empty(&self) -> bool {
    self.cache.is_empty()
  }

  /// Wait for background prefetches to finish.
  pub async fn settled(&self) {
    self.cache.settled().await;
  }

  /// Book structure of a translation (not cached - fetched once per translation change).
  pub async fn fetch_structure(&self, translation: &str) -> Result<BookStructure, FetchError> {
    self.cache.fetcher().fetch_structure(translation).await
  }
}
