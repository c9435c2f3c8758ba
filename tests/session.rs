//! Integration tests for ReaderSession: translation and locale changes,
//! chapter opening with adjacent prefetch.

use std::time::Duration;

use rbiblia::config::Config;
use rbiblia::session::ReaderSession;
use serde_json::json;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_translation(mock_server: &MockServer, locale: &str, translation: &str) {
  Mock::given(method("GET"))
    .and(path(format!("/api/{}/translation/{}", locale, translation)))
    .respond_with(
      ResponseTemplate::new(200).set_body_json(json!({ "data": { "gen": [1, 2, 3], "exo": [1, 2] } })),
    )
    .mount(mock_server)
    .await;

  Mock::given(method("GET"))
    .and(path_regex(format!(
      r"^/api/{}/translation/{}/book/[a-z]+/chapter/\d+$",
      locale, translation
    )))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": { "1": "text", "2": "more//text" } })))
    .mount(mock_server)
    .await;
}

fn config(mock_server: &MockServer) -> Config {
  let mut config = Config::default();
  config.api.url = mock_server.uri();
  config.cache.idle_delay_ms = 0;
  config
}

#[tokio::test]
async fn test_open_chapter_prefetches_neighbors() {
  let mock_server = MockServer::start().await;
  mount_translation(&mock_server, "pl", "pl_ubg").await;

  let mut session = ReaderSession::new(config(&mock_server), "pl").unwrap();
  let structure = session.select_translation("pl_ubg").await.unwrap();
  assert_eq!(structure.chapters("gen"), Some(&[1, 2, 3][..]));

  let opened = session.open_chapter("gen", 2).await.unwrap();
  assert!(opened.showed_loading);
  assert!(!opened.from_cache);
  assert_eq!(opened.key.to_string(), "pl_ubg_gen_2");
  assert_eq!(opened.verses.len(), 2);

  session.cache().settled().await;
  assert!(session.cache().is_in_cache("pl_ubg", "gen", 1));
  assert!(session.cache().is_in_cache("pl_ubg", "gen", 3));

  // Navigating to a prefetched neighbor needs no loading state
  let next = session.open_chapter("gen", 3).await.unwrap();
  assert!(!next.showed_loading);
  assert!(next.from_cache);
}

#[tokio::test]
async fn test_translation_change_clears_cache() {
  let mock_server = MockServer::start().await;
  mount_translation(&mock_server, "pl", "pl_ubg").await;
  mount_translation(&mock_server, "pl", "pl_bw").await;

  let mut session = ReaderSession::new(config(&mock_server), "pl").unwrap();
  session.select_translation("pl_ubg").await.unwrap();
  session.open_chapter("exo", 1).await.unwrap();
  session.cache().settled().await;
  assert_eq!(session.cache().len(), 2);

  session.select_translation("pl_bw").await.unwrap();
  assert!(session.cache().is_empty());
  assert_eq!(session.translation(), Some("pl_bw"));

  // Re-selecting the same translation clears as well
  session.open_chapter("exo", 1).await.unwrap();
  session.cache().settled().await;
  session.select_translation("pl_bw").await.unwrap();
  assert!(session.cache().is_empty());
}

#[tokio::test]
async fn test_locale_change_rebuilds_cache() {
  let mock_server = MockServer::start().await;
  mount_translation(&mock_server, "pl", "pl_ubg").await;
  mount_translation(&mock_server, "en", "pl_ubg").await;

  let mut session = ReaderSession::new(config(&mock_server), "pl").unwrap();
  session.select_translation("pl_ubg").await.unwrap();
  session.open_chapter("gen", 1).await.unwrap();
  let old_cache = session.cache().clone();

  session.set_locale("en").unwrap();
  assert_eq!(session.locale(), "en");
  assert!(session.cache().is_empty());

  // Same locale again keeps the cache
  session.open_chapter("gen", 1).await.unwrap();
  session.set_locale("en").unwrap();
  assert!(session.cache().is_in_cache("pl_ubg", "gen", 1));

  old_cache.settled().await;
  let paths: Vec<String> = mock_server
    .received_requests()
    .await
    .unwrap_or_default()
    .into_iter()
    .map(|r| r.url.path().to_string())
    .collect();
  assert!(paths.contains(&"/api/en/translation/pl_ubg/book/gen/chapter/1".to_string()));
}

#[tokio::test]
async fn test_open_chapter_without_translation_fails() {
  let mock_server = MockServer::start().await;
  let session = ReaderSession::new(config(&mock_server), "pl").unwrap();
  assert!(session.open_chapter("gen", 1).await.is_err());
}

#[tokio::test]
async fn test_structure_failure_propagates() {
  let mock_server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/api/pl/translation/missing"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&mock_server)
    .await;

  let mut session = ReaderSession::new(config(&mock_server), "pl").unwrap();
  let result = tokio::time::timeout(Duration::from_secs(5), session.select_translation("missing")).await;
  assert!(result.expect("timed out").is_err());
  assert!(session.structure().is_none());
}
