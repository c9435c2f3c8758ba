//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;

/// Source of values for a cache layer.
///
/// The returned future must be `Send` so fetches can run on spawned
/// background tasks (prefetch).
pub trait Fetcher: Send + Sync + 'static {
  /// Identity of a cached value
  type Key: Clone + Eq + Hash + Display + Send + Sync + 'static;
  /// The cached value. Cloned once per caller, so keep it cheap (e.g. `Arc`).
  type Value: Clone + Send + Sync + 'static;
  /// Fetch failure. Cloned when several callers share one in-flight fetch.
  type Error: std::error::Error + Clone + Send + Sync + 'static;

  fn fetch(&self, key: &Self::Key) -> impl Future<Output = Result<Self::Value, Self::Error>> + Send;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }

  /// True when no network request was needed.
  pub fn from_cache_hit(&self) -> bool {
    self.source == CacheSource::Cache
  }
}

/// Indicates where returned data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched from the network for this call
  Network,
  /// Served from memory
  Cache,
}
