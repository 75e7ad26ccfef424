use std::path::{Path, PathBuf};

use crate::{CacheStoreOptions, ModuleIdx, TransformOptions};

#[derive(Debug)]
pub struct NormalizedBundlerOptions {
  // --- Input
  pub entry_file: PathBuf,
  pub project_root: PathBuf,
  pub watch_folders: Vec<PathBuf>,
  pub platform: String,
  pub dev: bool,

  // --- Serializer
  pub polyfills: Vec<PathBuf>,
  pub modules_run_before_main: Vec<String>,
  pub run_module_statement: String,
  pub sourcemap: bool,

  // --- Transformer
  pub cache_stores: Vec<CacheStoreOptions>,
  pub cache_version: String,
  pub max_workers: usize,

  // --- Output
  pub out_dir: PathBuf,
  pub bundle_filename: String,
}

impl NormalizedBundlerOptions {
  pub fn run_module_statement(&self, idx: ModuleIdx) -> String {
    let mut buffer = itoa::Buffer::new();
    self.run_module_statement.replace("{id}", buffer.format(idx.index()))
  }

  pub fn transform_options(&self) -> TransformOptions {
    TransformOptions {
      dev: self.dev,
      platform: self.platform.clone(),
      project_root: self.project_root.to_string_lossy().into_owned(),
      cache_version: self.cache_version.clone(),
    }
  }

  /// Whether `path` lives inside the project root or one of the watch folders.
  pub fn is_watched(&self, path: &Path) -> bool {
    path.starts_with(&self.project_root)
      || self.watch_folders.iter().any(|folder| path.starts_with(folder))
  }
}
