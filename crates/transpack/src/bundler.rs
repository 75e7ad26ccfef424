use std::sync::Arc;

use tracing::{debug, info, warn};
use transpack_common::{BundlerOptions, ModuleId, OutputAsset, Transformer};
use transpack_ecmascript::CommonJsTransformer;
use transpack_error::{BuildError, BuildResult};
use transpack_fs::{FileSystem, OsFileSystem};
use transpack_resolver::Resolver;

use crate::{
  generate_stage::GenerateStage,
  graph::ModuleGraph,
  module_loader::ModuleLoader,
  transform_cache::{CacheStats, TransformCache},
  types::{build_phase::BuildPhase, bundle_output::BundleOutput, SharedOptions, SharedResolver},
  utils::normalize_options::normalize_options,
  worker_pool::{PoolStats, WorkerPool},
};

/// Closes the pool when a build ends early, including when the build future is dropped.
struct ClosePoolOnDrop(Arc<WorkerPool>);

impl Drop for ClosePoolOnDrop {
  fn drop(&mut self) {
    self.0.close();
  }
}

pub struct Bundler {
  fs: OsFileSystem,
  raw_options: BundlerOptions,
  transformer: Arc<dyn Transformer>,
  resolver: Option<SharedResolver>,
  /// Created by the first build and reused by the following ones.
  cache: Option<Arc<TransformCache>>,
  phase: BuildPhase,
  pool_stats: Option<PoolStats>,
}

impl Bundler {
  pub fn new(options: BundlerOptions) -> Self {
    Self {
      fs: OsFileSystem,
      raw_options: options,
      transformer: Arc::new(CommonJsTransformer),
      resolver: None,
      cache: None,
      phase: BuildPhase::Init,
      pool_stats: None,
    }
  }

  #[must_use]
  pub fn with_transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
    self.transformer = transformer;
    self
  }

  #[must_use]
  pub fn with_resolver(mut self, resolver: SharedResolver) -> Self {
    self.resolver = Some(resolver);
    self
  }

  /// Shares a transform cache with other bundlers instead of building one from `cacheStores`.
  #[must_use]
  pub fn with_cache(mut self, cache: Arc<TransformCache>) -> Self {
    self.cache = Some(cache);
    self
  }

  pub fn phase(&self) -> BuildPhase {
    self.phase
  }

  pub fn cache_stats(&self) -> Option<CacheStats> {
    self.cache.as_ref().map(|cache| cache.stats())
  }

  /// Worker pool counters of the last build.
  pub fn pool_stats(&self) -> Option<PoolStats> {
    self.pool_stats
  }

  pub async fn build(&mut self) -> BuildResult<BundleOutput> {
    self.bundle(false).await
  }

  /// Builds and writes the assets into `outDir`.
  pub async fn write(&mut self) -> BuildResult<BundleOutput> {
    self.bundle(true).await
  }

  async fn bundle(&mut self, is_write: bool) -> BuildResult<BundleOutput> {
    self.enter(BuildPhase::Init);
    let ret = self.try_bundle(is_write).await;
    match &ret {
      Ok(_) => self.enter(BuildPhase::Done),
      Err(err) => {
        warn!("build failed: {err}");
        self.enter(BuildPhase::Failed);
      }
    }
    ret
  }

  async fn try_bundle(&mut self, is_write: bool) -> BuildResult<BundleOutput> {
    self.enter(BuildPhase::ResolvingConfig);
    let options: SharedOptions = Arc::new(normalize_options(self.raw_options.clone())?);
    let resolver = self.resolver.clone().unwrap_or_else(|| {
      Arc::new(Resolver::new(&options.platform, options.project_root.clone()))
    });
    let cache = Arc::clone(self.cache.get_or_insert_with(|| {
      Arc::new(TransformCache::from_options(&options.cache_stores, &options.project_root))
    }));
    let pool = Arc::new(WorkerPool::new(options.max_workers, Arc::clone(&self.transformer))?);

    self.enter(BuildPhase::BuildingGraph);
    let ret = {
      let _guard = ClosePoolOnDrop(Arc::clone(&pool));
      self.build_graph(&options, &resolver, cache, Arc::clone(&pool)).await
    };

    self.pool_stats = Some(pool.stats());
    if let Err(err) = tokio::task::spawn_blocking(move || pool.shutdown()).await {
      warn!("failed to join the transform workers: {err}");
    }
    let (graph, mut warnings) = ret?;

    self.enter(BuildPhase::Serializing);
    let mut output = GenerateStage::new(&graph, &options).generate()?;
    warnings.append(&mut output.warnings);
    output.warnings = warnings;

    if is_write {
      self.write_assets(&options, &output.assets)?;
    }

    info!(
      modules = graph.len(),
      polyfills = graph.polyfills.len(),
      warnings = output.warnings.len(),
      "bundled `{}`",
      options.bundle_filename
    );
    Ok(output)
  }

  async fn build_graph(
    &self,
    options: &SharedOptions,
    resolver: &SharedResolver,
    cache: Arc<TransformCache>,
    pool: Arc<WorkerPool>,
  ) -> BuildResult<(ModuleGraph, Vec<anyhow::Error>)> {
    let loader =
      ModuleLoader::new(self.fs, Arc::clone(options), Arc::clone(resolver), cache, pool)?;

    let entries = vec![ModuleId::new(&*options.entry_file.to_string_lossy())];
    let polyfills =
      options.polyfills.iter().map(|path| ModuleId::new(&*path.to_string_lossy())).collect();
    let mut output = loader.fetch_all_modules(entries, polyfills).await?;

    let mut warnings = std::mem::take(&mut output.warnings);
    let mut graph = ModuleGraph::new(output);
    graph.mark_run_before_main(
      &options.modules_run_before_main,
      resolver.as_ref(),
      &options.project_root,
    );
    warnings.extend(graph.circular_dependency_warnings());

    Ok((graph, warnings))
  }

  fn write_assets(&self, options: &SharedOptions, assets: &[OutputAsset]) -> BuildResult<()> {
    for asset in assets {
      let path = options.out_dir.join(&asset.filename);
      let write_error =
        |source| BuildError::Write { path: path.display().to_string(), source };
      if let Some(dir) = path.parent() {
        self.fs.create_dir_all(dir).map_err(write_error)?;
      }
      self.fs.write(&path, asset.content_as_bytes()).map_err(write_error)?;
    }
    Ok(())
  }

  fn enter(&mut self, phase: BuildPhase) {
    debug!(from = ?self.phase, to = ?phase, "build phase");
    self.phase = phase;
  }
}
