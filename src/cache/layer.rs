//! Cache layer that orchestrates caching logic with network fetching.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

use super::scheduler::{IdleScheduler, DEFAULT_IDLE_DELAY, DEFAULT_MAX_DELAY};
use super::storage::{FifoStorage, MAX_CACHE_SIZE};
use super::traits::{CacheResult, Fetcher};

/// A fetch that every caller asking for the same key awaits together.
type SharedFetch<F> =
  Shared<BoxFuture<'static, Result<<F as Fetcher>::Value, <F as Fetcher>::Error>>>;

/// Tuning knobs for a [`CacheLayer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
  /// Entries kept before the oldest is evicted
  pub capacity: usize,
  /// Delay before a prefetch runs when the runtime is idle
  pub idle_delay: Duration,
  /// Ceiling on how long a prefetch may be deferred
  pub prefetch_max_delay: Duration,
}

impl Default for CacheOptions {
  fn default() -> Self {
    Self {
      capacity: MAX_CACHE_SIZE,
      idle_delay: DEFAULT_IDLE_DELAY,
      prefetch_max_delay: DEFAULT_MAX_DELAY,
    }
  }
}

struct State<F: Fetcher> {
  entries: FifoStorage<F::Key, F::Value>,
  in_flight: HashMap<F::Key, SharedFetch<F>>,
  /// Advanced by every clear; fetches started under an older generation
  /// are not stored.
  generation: u64,
}

struct Inner<F: Fetcher> {
  fetcher: F,
  state: Mutex<State<F>>,
  scheduler: IdleScheduler,
  prefetch_max_delay: Duration,
}

enum Lookup<F: Fetcher> {
  Hit(CacheResult<F::Value>),
  Pending(SharedFetch<F>),
}

/// Bounded in-memory cache in front of a [`Fetcher`].
///
/// - Hits never touch the network and never reorder entries.
/// - At most one fetch per key is in flight; concurrent callers share it.
/// - Eviction is FIFO by insertion time once `capacity` is reached.
/// - Prefetches run in the background and swallow their errors.
/// - [`clear`](Self::clear) drops every entry, and results of fetches
///   that were in flight at that moment are not stored.
pub struct CacheLayer<F: Fetcher> {
  inner: Arc<Inner<F>>,
}

impl<F: Fetcher> CacheLayer<F> {
  /// Create a new cache layer in front of the given fetcher.
  pub fn new(fetcher: F, options: CacheOptions) -> Self {
    Self {
      inner: Arc::new(Inner {
        fetcher,
        state: Mutex::new(State {
          entries: FifoStorage::new(options.capacity),
          in_flight: HashMap::new(),
          generation: 0,
        }),
        scheduler: IdleScheduler::new(options.idle_delay),
        prefetch_max_delay: options.prefetch_max_delay,
      }),
    }
  }

  /// The wrapped fetcher.
  pub fn fetcher(&self) -> &F {
    &self.inner.fetcher
  }

  pub fn contains(&self, key: &F::Key) -> bool {
    self.inner.state.lock().entries.contains(key)
  }

  pub fn len(&self) -> usize {
    self.inner.state.lock().entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Cached keys, oldest first.
  pub fn keys(&self) -> Vec<F::Key> {
    self.inner.state.lock().entries.keys().cloned().collect()
  }

  /// Return the cached value, or fetch and store it.
  ///
  /// Fetch errors propagate and leave the cache untouched.
  pub async fn fetch(&self, key: &F::Key) -> Result<CacheResult<F::Value>, F::Error> {
    match self.lookup(key) {
      Lookup::Hit(result) => {
        trace!(key = %key, "cache hit");
        Ok(result)
      }
      Lookup::Pending(fetch) => fetch.await.map(CacheResult::from_network),
    }
  }

  /// Warm the cache for `key` in the background.
  ///
  /// No-op when the key is already cached. Failures are logged and dropped.
  pub fn prefetch(&self, key: F::Key) {
    if self.contains(&key) {
      return;
    }

    let layer = self.clone();
    self.inner.scheduler.schedule(
      async move {
        // The key may have arrived while this task was waiting
        let fetch = match layer.lookup(&key) {
          Lookup::Hit(_) => return,
          Lookup::Pending(fetch) => fetch,
        };
        if let Err(e) = fetch.await {
          debug!(key = %key, error = %e, "prefetch failed");
        }
      },
      self.inner.prefetch_max_delay,
    );
  }

  /// Drop every cached entry.
  ///
  /// Fetches still in flight complete for their callers but are not stored.
  pub fn clear(&self) {
    let mut state = self.inner.state.lock();
    state.entries.clear();
    state.in_flight.clear();
    state.generation += 1;
    debug!(generation = state.generation, "cache cleared");
  }

  /// Number of background prefetches not yet finished.
  pub fn pending_prefetches(&self) -> usize {
    self.inner.scheduler.pending()
  }

  /// Wait for all scheduled prefetches to finish.
  pub async fn settled(&self) {
    self.inner.scheduler.settled().await;
  }

  /// Check the cache and, on a miss, join or start the fetch for `key`,
  /// all under one lock.
  fn lookup(&self, key: &F::Key) -> Lookup<F> {
    let mut state = self.inner.state.lock();

    if let Some(entry) = state.entries.get(key) {
      return Lookup::Hit(CacheResult::from_cache(entry.value.clone(), entry.cached_at));
    }

    if let Some(fetch) = state.in_flight.get(key) {
      trace!(key = %key, "joining in-flight fetch");
      return Lookup::Pending(fetch.clone());
    }

    let generation = state.generation;
    let inner = Arc::clone(&self.inner);
    let owned_key = key.clone();
    let fetch = async move {
      let result = inner.fetcher.fetch(&owned_key).await;
      inner.settle(&owned_key, generation, &result);
      result
    }
    .boxed()
    .shared();

    state.in_flight.insert(key.clone(), fetch.clone());
    Lookup::Pending(fetch)
  }
}

impl<F: Fetcher> Inner<F> {
  /// Record the outcome of a fetch started under `generation`.
  fn settle(&self, key: &F::Key, generation: u64, result: &Result<F::Value, F::Error>) {
    let mut state = self.state.lock();

    if state.generation != generation {
      debug!(key = %key, "discarding fetch that completed after a clear");
      return;
    }
    state.in_flight.remove(key);

    if let Ok(value) = result {
      if let Some(evicted) = state.entries.insert(key.clone(), value.clone()) {
        debug!(evicted = %evicted, inserted = %key, "evicted oldest cache entry");
      }
    }
  }
}

impl<F: Fetcher> Clone for CacheLayer<F> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}
