use std::sync::{
  atomic::{AtomicU64, Ordering},
  Arc,
};

use dashmap::DashMap;
use transpack_common::TransformOutput;
use transpack_error::CacheError;

use super::{cache_key::CacheKey, CacheStore};

pub const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

/// Bounded in-process store. Once full, the oldest insertions are evicted first.
#[derive(Debug)]
pub struct MemoryCacheStore {
  entries: DashMap<CacheKey, (u64, Arc<TransformOutput>)>,
  sequence: AtomicU64,
  capacity: usize,
}

impl MemoryCacheStore {
  pub fn new(capacity: usize) -> Self {
    Self { entries: DashMap::default(), sequence: AtomicU64::new(0), capacity: capacity.max(1) }
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn evict_if_needed(&self) {
    while self.entries.len() > self.capacity {
      let oldest = self.entries.iter().min_by_key(|entry| entry.value().0).map(|entry| *entry.key());
      match oldest {
        Some(key) => {
          self.entries.remove(&key);
        }
        None => break,
      }
    }
  }
}

impl Default for MemoryCacheStore {
  fn default() -> Self {
    Self::new(DEFAULT_MEMORY_CAPACITY)
  }
}

impl CacheStore for MemoryCacheStore {
  fn name(&self) -> &'static str {
    "memory"
  }

  fn get(&self, key: &CacheKey) -> Result<Option<Arc<TransformOutput>>, CacheError> {
    Ok(self.entries.get(key).map(|entry| Arc::clone(&entry.value().1)))
  }

  fn set(&self, key: &CacheKey, output: &Arc<TransformOutput>) -> Result<(), CacheError> {
    let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
    self.entries.insert(*key, (sequence, Arc::clone(output)));
    self.evict_if_needed();
    Ok(())
  }
}

#[test]
fn evicts_oldest_insertions() {
  let store = MemoryCacheStore::new(2);
  let output = Arc::new(TransformOutput::default());
  let keys = [1, 2, 3].map(|hash| CacheKey::new(hash, 0));

  for key in &keys {
    store.set(key, &output).unwrap();
  }

  assert_eq!(store.len(), 2);
  assert!(store.get(&keys[0]).unwrap().is_none());
  assert!(store.get(&keys[1]).unwrap().is_some());
  assert!(store.get(&keys[2]).unwrap().is_some());
}
