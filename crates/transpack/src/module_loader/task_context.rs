use std::sync::Arc;

use arcstr::ArcStr;
use tokio::sync::mpsc::Sender;
use transpack_common::{ModuleId, ModuleLoaderMsg, TransformOptions, TransformOutput};
use transpack_error::{BuildError, BuildResult};
use transpack_fs::OsFileSystem;
use transpack_utils::xxhash::xxhash_128;

use crate::{
  transform_cache::{cache_key::CacheKey, TransformCache},
  types::{SharedOptions, SharedResolver},
  worker_pool::WorkerPool,
};

/// Used to store common data shared between all tasks.
pub struct TaskContext {
  pub fs: OsFileSystem,
  pub options: SharedOptions,
  pub resolver: SharedResolver,
  pub cache: Arc<TransformCache>,
  pub pool: Arc<WorkerPool>,
  pub transform_options: Arc<TransformOptions>,
  pub options_hash: u128,
  pub tx: Sender<ModuleLoaderMsg>,
}

impl TaskContext {
  /// Looks `source` up in the transform cache, transforming it on the pool on a miss.
  pub async fn transform(
    &self,
    id: &ModuleId,
    stable_id: &str,
    source: &ArcStr,
  ) -> BuildResult<(u128, Arc<TransformOutput>)> {
    let source_hash = xxhash_128(source.as_bytes());
    let key = CacheKey::for_module(stable_id, source_hash, self.options_hash);
    let transformed = self
      .cache
      .get_or_transform(key, || {
        self.pool.submit(id.as_path(), ArcStr::clone(source), Arc::clone(&self.transform_options))
      })
      .await?;
    Ok((source_hash, transformed))
  }

  pub fn resolve(&self, importer: &ModuleId, specifier: &str) -> BuildResult<ModuleId> {
    let resolution_error = |reason: String| BuildError::Resolution {
      importer: importer.stabilize(&self.options.project_root),
      specifier: specifier.to_string(),
      reason,
    };

    let resolved = self
      .resolver
      .resolve(Some(importer.as_path()), specifier)
      .map_err(|err| resolution_error(err.to_string()))?;

    let id = ModuleId::new(resolved);
    if !self.options.is_watched(id.as_path()) {
      return Err(resolution_error(format!(
        "`{id}` is outside of the project root and every watch folder"
      )));
    }
    Ok(id)
  }
}
