mod bundler_options;
mod module;
mod module_loader;
mod transform;
mod types;

pub use bundler_options::{
  cache_store_options::CacheStoreOptions, normalized_bundler_options::NormalizedBundlerOptions,
  BundlerOptions,
};

pub use crate::{
  module::{Module, ModuleFlags, Polyfill, ResolvedDependency},
  module_loader::{
    task_result::{ModuleTaskResult, PolyfillTaskResult},
    ModuleLoaderMsg,
  },
  transform::{Dependency, TransformOptions, TransformOutput, Transformer},
  types::{
    module_id::ModuleId, output_asset::OutputAsset, raw_idx::ModuleIdx, source_span::SourceSpan,
  },
};
