mod bundler;
mod generate_stage;
mod graph;
mod module_loader;
mod transform_cache;
mod types;
mod utils;
mod worker_pool;

pub use crate::{
  bundler::Bundler,
  graph::ModuleGraph,
  transform_cache::{
    cache_key::CacheKey, file_store::FileCacheStore, memory_store::MemoryCacheStore, CacheStats,
    CacheStore, TransformCache,
  },
  types::{build_phase::BuildPhase, bundle_output::BundleOutput},
  worker_pool::{PoolStats, WorkerPool},
};
pub use transpack_common::*;
pub use transpack_ecmascript::CommonJsTransformer;
pub use transpack_error::{BuildError, BuildResult, CacheError};
pub use transpack_resolver::{Resolve, ResolveError, Resolver};
