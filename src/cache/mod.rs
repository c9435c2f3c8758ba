//! Generic in-memory caching layer with background prefetch.
//!
//! This module provides a content-agnostic caching mechanism that:
//! - Serves repeated lookups from memory without touching the network
//! - Bounds memory with strict FIFO eviction (reads never refresh an entry)
//! - Shares one in-flight fetch between all callers asking for the same key
//! - Warms entries ahead of use with low-priority, best-effort prefetches

mod layer;
mod scheduler;
mod storage;
mod traits;

pub use layer::{CacheLayer, CacheOptions};
pub use scheduler::{IdleScheduler, DEFAULT_IDLE_DELAY, DEFAULT_MAX_DELAY};
pub use storage::{CachedEntry, FifoStorage, MAX_CACHE_SIZE};
pub use traits::{CacheResult, CacheSource, Fetcher};
