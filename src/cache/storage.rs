//! Bounded, insertion-ordered in-memory storage.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

/// Default number of entries kept before the oldest one is evicted.
pub const MAX_CACHE_SIZE: usize = 50;

/// A single cached value.
#[derive(Debug, Clone)]
pub struct CachedEntry<V> {
  /// The cached value
  pub value: V,
  /// When the value was stored
  pub cached_at: DateTime<Utc>,
}

/// Storage that evicts strictly in insertion order (FIFO).
///
/// Reads never promote an entry: a key read a hundred times is evicted
/// exactly when it would have been had it never been read.
#[derive(Debug)]
pub struct FifoStorage<K, V> {
  entries: HashMap<K, CachedEntry<V>>,
  /// Keys oldest first
  order: VecDeque<K>,
  capacity: usize,
}

impl<K: Clone + Eq + Hash, V> FifoStorage<K, V> {
  /// Create storage holding at most `capacity` entries (at least one).
  pub fn new(capacity: usize) -> Self {
    let capacity = capacity.max(1);
    Self {
      entries: HashMap::with_capacity(capacity),
      order: VecDeque::with_capacity(capacity),
      capacity,
    }
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn contains(&self, key: &K) -> bool {
    self.entries.contains_key(key)
  }

  pub fn get(&self, key: &K) -> Option<&CachedEntry<V>> {
    self.entries.get(key)
  }

  /// Store a value, returning the key evicted to make room (if any).
  ///
  /// Replacing an existing key keeps its original position and never evicts.
  pub fn insert(&mut self, key: K, value: V) -> Option<K> {
    let entry = CachedEntry {
      value,
      cached_at: Utc::now(),
    };

    if let Some(existing) = self.entries.get_mut(&key) {
      *existing = entry;
      return None;
    }

    let evicted = if self.entries.len() >= self.capacity {
      self.order.pop_front().inspect(|oldest| {
        self.entries.remove(oldest);
      })
    } else {
      None
    };

    self.order.push_back(key.clone());
    self.entries.insert(key, entry);
    evicted
  }

  /// Remove every entry.
  pub fn clear(&mut self) {
    self.entries.clear();
    self.order.clear();
  }

  /// Keys in insertion order, oldest first.
  pub fn keys(&self) -> impl Iterator<Item = &K> {
    self.order.iter()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn filled(count: u32) -> FifoStorage<u32, String> {
    let mut storage = FifoStorage::new(MAX_CACHE_SIZE);
    for i in 1..=count {
      storage.insert(i, format!("chapter {}", i));
    }
    storage
  }

  #[test]
  fn test_store_and_retrieve() {
    let storage = filled(3);
    assert_eq!(storage.len(), 3);
    assert!(storage.contains(&2));
    assert_eq!(storage.get(&2).map(|e| e.value.as_str()), Some("chapter 2"));
    assert!(storage.get(&999).is_none());
  }

  #[test]
  fn test_evicts_first_inserted_when_full() {
    let mut storage = filled(50);
    assert_eq!(storage.len(), 50);

    let evicted = storage.insert(51, "chapter 51".to_string());

    assert_eq!(evicted, Some(1));
    assert_eq!(storage.len(), 50);
    assert!(!storage.contains(&1));
    assert!((2..=51).all(|k| storage.contains(&k)));
  }

  #[test]
  fn test_reads_do_not_promote() {
    let mut storage = filled(50);
    for _ in 0..10 {
      assert!(storage.contains(&1));
      assert!(storage.get(&1).is_some());
    }

    storage.insert(51, "chapter 51".to_string());

    assert!(!storage.contains(&1));
    assert!(storage.contains(&2));
  }

  #[test]
  fn test_replace_keeps_position() {
    let mut storage = filled(50);

    assert_eq!(storage.insert(1, "updated".to_string()), None);
    assert_eq!(storage.len(), 50);
    assert_eq!(storage.get(&1).map(|e| e.value.as_str()), Some("updated"));

    // Still the oldest
    assert_eq!(storage.insert(51, "chapter 51".to_string()), Some(1));
  }

  #[test]
  fn test_clear() {
    let mut storage = filled(3);
    storage.clear();
    assert!(storage.is_empty());
    assert_eq!(storage.keys().count(), 0);
    assert!(!storage.contains(&1));
  }

  #[test]
  fn test_zero_capacity_is_clamped() {
    let mut storage: FifoStorage<u32, ()> = FifoStorage::new(0);
    assert_eq!(storage.capacity(), 1);
    storage.insert(1, ());
    assert_eq!(storage.insert(2, ()), Some(1));
    assert_eq!(storage.keys().copied().collect::<Vec<_>>(), vec![2]);
  }
}
