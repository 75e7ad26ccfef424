pub mod cache_store_options;
pub mod normalized_bundler_options;

use std::path::PathBuf;

use serde::Deserialize;

use crate::CacheStoreOptions;

#[derive(Default, Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BundlerOptions {
  // --- Input
  pub entry_file: Option<String>,
  pub project_root: Option<PathBuf>,
  pub watch_folders: Option<Vec<PathBuf>>,
  pub platform: Option<String>,
  pub dev: Option<bool>,

  // --- Serializer
  pub polyfills: Option<Vec<String>>,
  pub modules_run_before_main: Option<Vec<String>>,
  /// Template of the statement that runs a module, `{id}` is replaced by the module ID.
  pub run_module_statement: Option<String>,
  pub sourcemap: Option<bool>,

  // --- Transformer
  pub cache_stores: Option<Vec<CacheStoreOptions>>,
  pub cache_version: Option<String>,
  pub max_workers: Option<usize>,

  // --- Output
  pub out_dir: Option<String>,
  pub bundle_filename: Option<String>,
}

impl BundlerOptions {
  /// Fills every option that is unset in `self` from `other`.
  #[must_use]
  pub fn merge(self, other: Self) -> Self {
    Self {
      entry_file: self.entry_file.or(other.entry_file),
      project_root: self.project_root.or(other.project_root),
      watch_folders: self.watch_folders.or(other.watch_folders),
      platform: self.platform.or(other.platform),
      dev: self.dev.or(other.dev),
      polyfills: self.polyfills.or(other.polyfills),
      modules_run_before_main: self.modules_run_before_main.or(other.modules_run_before_main),
      run_module_statement: self.run_module_statement.or(other.run_module_statement),
      sourcemap: self.sourcemap.or(other.sourcemap),
      cache_stores: self.cache_stores.or(other.cache_stores),
      cache_version: self.cache_version.or(other.cache_version),
      max_workers: self.max_workers.or(other.max_workers),
      out_dir: self.out_dir.or(other.out_dir),
      bundle_filename: self.bundle_filename.or(other.bundle_filename),
    }
  }
}

#[test]
fn deserialize_from_json() {
  let options: BundlerOptions = serde_json::from_str(
    r#"{
      "entryFile": "TestBundle.js",
      "platform": "ios",
      "polyfills": ["polyfill-1.js", "polyfill-2.js"],
      "modulesRunBeforeMain": ["InitializeCore"],
      "runModuleStatement": "require({id});",
      "cacheStores": [{ "type": "memory", "capacity": 64 }, { "type": "file", "dir": ".cache" }]
    }"#,
  )
  .unwrap();

  assert_eq!(options.entry_file.as_deref(), Some("TestBundle.js"));
  assert_eq!(options.polyfills.unwrap().len(), 2);
  assert_eq!(
    options.cache_stores.unwrap(),
    vec![
      CacheStoreOptions::Memory { capacity: Some(64) },
      CacheStoreOptions::File { dir: PathBuf::from(".cache") }
    ]
  );
}

#[test]
fn merge_prefers_self() {
  let cli = BundlerOptions { dev: Some(true), ..Default::default() };
  let file = BundlerOptions {
    dev: Some(false),
    platform: Some("android".to_string()),
    ..Default::default()
  };
  let merged = cli.merge(file);
  assert_eq!(merged.dev, Some(true));
  assert_eq!(merged.platform.as_deref(), Some("android"));
}
