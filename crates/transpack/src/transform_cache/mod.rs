pub mod cache_key;
pub mod file_store;
pub mod memory_store;

use std::{
  future::Future,
  path::Path,
  sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
  },
};

use dashmap::DashMap;
use tokio::sync::OnceCell;
use tracing::{trace, warn};
use transpack_common::{CacheStoreOptions, TransformOutput};
use transpack_error::{BuildResult, CacheError};

use self::{
  cache_key::CacheKey,
  file_store::FileCacheStore,
  memory_store::{MemoryCacheStore, DEFAULT_MEMORY_CAPACITY},
};

/// A place transform results can be kept in. Failures are never fatal to a build.
pub trait CacheStore: Send + Sync {
  fn name(&self) -> &'static str;

  fn get(&self, key: &CacheKey) -> Result<Option<Arc<TransformOutput>>, CacheError>;

  fn set(&self, key: &CacheKey, output: &Arc<TransformOutput>) -> Result<(), CacheError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
  pub hits: usize,
  pub misses: usize,
  /// Requests that awaited an identical in-flight computation instead of starting one.
  pub coalesced: usize,
}

#[derive(Default)]
struct Counters {
  hits: AtomicUsize,
  misses: AtomicUsize,
  coalesced: AtomicUsize,
}

type InFlight = Arc<OnceCell<Arc<TransformOutput>>>;

/// Content-addressed cache in front of the transformer.
///
/// Concurrent requests for the same key share one computation. Requests for different keys
/// only meet in the sharded in-flight table.
pub struct TransformCache {
  stores: Vec<Box<dyn CacheStore>>,
  in_flight: DashMap<CacheKey, InFlight>,
  stats: Counters,
}

impl TransformCache {
  pub fn new(stores: Vec<Box<dyn CacheStore>>) -> Self {
    Self { stores, in_flight: DashMap::default(), stats: Counters::default() }
  }

  /// Relative `File` directories are resolved against `project_root`. No store options means
  /// a single memory store.
  pub fn from_options(options: &[CacheStoreOptions], project_root: &Path) -> Self {
    if options.is_empty() {
      return Self::new(vec![Box::new(MemoryCacheStore::default())]);
    }

    let stores = options
      .iter()
      .map(|option| -> Box<dyn CacheStore> {
        match option {
          CacheStoreOptions::Memory { capacity } => {
            Box::new(MemoryCacheStore::new(capacity.unwrap_or(DEFAULT_MEMORY_CAPACITY)))
          }
          CacheStoreOptions::File { dir } => Box::new(FileCacheStore::new(project_root.join(dir))),
        }
      })
      .collect();
    Self::new(stores)
  }

  /// Returns the cached output for `key`, running `compute` on a miss.
  ///
  /// At most one `compute` runs per key at a time; callers arriving meanwhile wait for its
  /// result. A failed computation is not cached and fails only the caller that ran it.
  pub async fn get_or_transform<F, Fut>(
    &self,
    key: CacheKey,
    compute: F,
  ) -> BuildResult<Arc<TransformOutput>>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = BuildResult<TransformOutput>>,
  {
    let cell = Arc::clone(self.in_flight.entry(key).or_default().value());
    let initialized_here = AtomicBool::new(false);

    let ret = cell
      .get_or_try_init(|| async {
        initialized_here.store(true, Ordering::Relaxed);
        if let Some(output) = self.lookup(&key) {
          self.stats.hits.fetch_add(1, Ordering::Relaxed);
          return Ok(output);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let ret = compute().await.map(Arc::new);
        if let Ok(output) = &ret {
          self.store(&key, output, self.stores.len());
        }
        ret
      })
      .await
      .map(Arc::clone);

    if initialized_here.load(Ordering::Relaxed) {
      self.in_flight.remove_if(&key, |_, inner| Arc::ptr_eq(inner, &cell));
    } else if ret.is_ok() {
      self.stats.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    ret
  }

  fn lookup(&self, key: &CacheKey) -> Option<Arc<TransformOutput>> {
    for (nth, store) in self.stores.iter().enumerate() {
      match store.get(key) {
        Ok(Some(output)) => {
          trace!(%key, store = store.name(), "transform cache hit");
          // Back-fill the faster stores in front of this one.
          self.store(key, &output, nth);
          return Some(output);
        }
        Ok(None) => {}
        Err(err) => warn!(%key, store = store.name(), "treating cache read failure as a miss: {err}"),
      }
    }
    None
  }

  fn store(&self, key: &CacheKey, output: &Arc<TransformOutput>, until: usize) {
    for store in &self.stores[..until] {
      if let Err(err) = store.set(key, output) {
        warn!(%key, store = store.name(), "failed to write cache entry: {err}");
      }
    }
  }

  pub fn stats(&self) -> CacheStats {
    CacheStats {
      hits: self.stats.hits.load(Ordering::Relaxed),
      misses: self.stats.misses.load(Ordering::Relaxed),
      coalesced: self.stats.coalesced.load(Ordering::Relaxed),
    }
  }
}
