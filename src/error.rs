//! Errors surfaced at the content API boundary.

use std::sync::Arc;

/// A chapter or structure request that did not produce usable content.
///
/// Cloneable so that every caller sharing one in-flight request receives
/// the same failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
  /// The request never produced a response (connect, timeout, body read)
  #[error("request to {url} failed: {source}")]
  Network {
    url: String,
    #[source]
    source: Arc<reqwest::Error>,
  },

  /// The server answered with a non-2xx status
  #[error("{url} responded with HTTP {status}")]
  Status { url: String, status: u16 },

  /// The body was not JSON or lacked a usable `data` field
  #[error("malformed response from {url}: {message}")]
  Malformed { url: String, message: String },
}

impl FetchError {
  pub(crate) fn network(url: &url::Url, source: reqwest::Error) -> Self {
    Self::Network {
      url: url.to_string(),
      source: Arc::new(source),
    }
  }

  pub(crate) fn malformed(url: &url::Url, message: impl Into<String>) -> Self {
    Self::Malformed {
      url: url.to_string(),
      message: message.into(),
    }
  }

  /// The URL of the failed request.
  pub fn url(&self) -> &str {
    match self {
      Self::Network { url, .. } | Self::Status { url, .. } | Self::Malformed { url, .. } => url,
    }
  }

  /// HTTP status, when the server answered at all.
  pub fn status(&self) -> Option<u16> {
    match self {
      Self::Status { status, .. } => Some(*status),
      _ => None,
    }
  }
}
