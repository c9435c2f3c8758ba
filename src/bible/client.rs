use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::cache::Fetcher;
use crate::config::Config;
use crate::error::FetchError;

use super::api_types::{ApiChapterResponse, ApiStructureResponse};
use super::types::{BookStructure, ChapterKey, ChapterVerses};

const USER_AGENT_VALUE: &str = concat!("rbiblia/", env!("CARGO_PKG_VERSION"));

/// Client for the read-only content API, scoped to one display locale
#[derive(Debug, Clone)]
pub struct ContentClient {
  http: reqwest::Client,
  base_url: Url,
  locale: String,
}

impl ContentClient {
  pub fn new(config: &Config, locale: &str) -> Result<Self> {
    let base_url = Url::parse(&config.api.url)
      .map_err(|e| eyre!("Invalid API url {}: {}", config.api.url, e))?;
    if base_url.cannot_be_a_base() {
      return Err(eyre!("API url {} cannot be used as a base", base_url));
    }

    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

    let http = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .default_headers(default_headers)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url,
      locale: locale.to_string(),
    })
  }

  pub fn locale(&self) -> &str {
    &self.locale
  }

  /// `/api/{locale}/translation/{translation}/book/{book}/chapter/{chapter}`
  pub fn chapter_url(&self, key: &ChapterKey) -> Url {
    let chapter = key.chapter.to_string();
    self.api_url(&[
      "translation",
      &key.translation,
      "book",
      &key.book,
      "chapter",
      &chapter,
    ])
  }

  /// `/api/{locale}/translation/{translation}`
  pub fn structure_url(&self, translation: &str) -> Url {
    self.api_url(&["translation", translation])
  }

  /// Fetch the verses of one chapter
  pub async fn fetch_chapter(&self, key: &ChapterKey) -> Result<ChapterVerses, FetchError> {
    let url = self.chapter_url(key);
    let response: ApiChapterResponse = self.get_json(&url).await?;
    response
      .into_verses()
      .ok_or_else(|| FetchError::malformed(&url, "response has no data field"))
  }

  /// Fetch the book/chapter structure of a translation (not cached)
  pub async fn fetch_structure(&self, translation: &str) -> Result<BookStructure, FetchError> {
    let url = self.structure_url(translation);
    let response: ApiStructureResponse = self.get_json(&url).await?;
    response
      .into_structure()
      .ok_or_else(|| FetchError::malformed(&url, "response has no data field"))
  }

  fn api_url(&self, segments: &[&str]) -> Url {
    let mut url = self.base_url.clone();
    // Checked in new(): the base URL always has path segments
    if let Ok(mut path) = url.path_segments_mut() {
      path
        .pop_if_empty()
        .extend(["api", self.locale.as_str()])
        .extend(segments);
    }
    url
  }

  async fn get_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, FetchError> {
    debug!(url = %url, "fetching");

    let response = self
      .http
      .get(url.clone())
      .send()
      .await
      .map_err(|e| FetchError::network(url, e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
      });
    }

    let body = response
      .bytes()
      .await
      .map_err(|e| FetchError::network(url, e))?;

    serde_json::from_slice(&body).map_err(|e| FetchError::malformed(url, e.to_string()))
  }
}

impl Fetcher for ContentClient {
  type Key = ChapterKey;
  type Value = Arc<ChapterVerses>;
  type Error = FetchError;

  fn fetch(&self, key: &ChapterKey) -> impl Future<Output = Result<Arc<ChapterVerses>, FetchError>> + Send {
    async move { self.fetch_chapter(key).await.map(Arc::new) }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn client(url: &str) -> ContentClient {
    let mut config = Config::default();
    config.api.url = url.to_string();
    ContentClient::new(&config, "pl").unwrap()
  }

  #[test]
  fn test_chapter_url() {
    let key = ChapterKey::new("pl_ubg", "1co", 13);
    assert_eq!(
      client("https://example.org").chapter_url(&key).as_str(),
      "https://example.org/api/pl/translation/pl_ubg/book/1co/chapter/13"
    );
  }

  #[test]
  fn test_url_with_base_path() {
    assert_eq!(
      client("https://example.org/bible/").structure_url("pl_ubg").as_str(),
      "https://example.org/bible/api/pl/translation/pl_ubg"
    );
  }

  #[test]
  fn test_segments_are_escaped() {
    let key = ChapterKey::new("a/b", "gen", 1);
    assert_eq!(
      client("https://example.org").chapter_url(&key).as_str(),
      "https://example.org/api/pl/translation/a%2Fb/book/gen/chapter/1"
    );
  }

  #[test]
  fn test_invalid_base_url() {
    let mut config = Config::default();
    config.api.url = "mailto:someone@example.org".to_string();
    assert!(ContentClient::new(&config, "pl").is_err());

    config.api.url = "not a url".to_string();
    assert!(ContentClient::new(&config, "pl").is_err());
  }
}
