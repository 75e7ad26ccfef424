use std::path::Path;

use sugar_path::SugarPath;
use transpack_common::{BundlerOptions, NormalizedBundlerOptions};
use transpack_error::{BuildError, BuildResult};
use transpack_utils::path_ext::PathExt;

pub const DEFAULT_RUN_MODULE_STATEMENT: &str = "__r({id});";

pub fn normalize_options(raw_options: BundlerOptions) -> BuildResult<NormalizedBundlerOptions> {
  let Some(entry_file) = raw_options.entry_file else {
    return Err(BuildError::InvalidOptions("`entryFile` is required".to_string()));
  };

  let project_root = match raw_options.project_root {
    Some(root) => root.absolutize(),
    None => std::env::current_dir().map_err(|err| {
      BuildError::InvalidOptions(format!("`projectRoot` is unset and the cwd is unusable: {err}"))
    })?,
  };
  let resolve = |path: &Path| project_root.join(path).normalize();

  let entry_file = resolve(Path::new(&entry_file));
  let watch_folders = raw_options.watch_folders.map_or_else(
    || vec![project_root.clone()],
    |folders| folders.iter().map(|folder| resolve(folder)).collect(),
  );

  let run_module_statement =
    raw_options.run_module_statement.unwrap_or_else(|| DEFAULT_RUN_MODULE_STATEMENT.to_string());
  if !run_module_statement.contains("{id}") {
    return Err(BuildError::InvalidOptions(format!(
      "`runModuleStatement` must contain the `{{id}}` placeholder, got `{run_module_statement}`"
    )));
  }

  let max_workers = match raw_options.max_workers {
    Some(0) => {
      return Err(BuildError::InvalidOptions("`maxWorkers` must be at least 1".to_string()));
    }
    Some(workers) => workers,
    None => std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get),
  };

  let bundle_filename = raw_options
    .bundle_filename
    .unwrap_or_else(|| format!("{}.js", entry_file.representative_file_name()));

  let normalized = NormalizedBundlerOptions {
    polyfills: raw_options
      .polyfills
      .unwrap_or_default()
      .iter()
      .map(|polyfill| resolve(Path::new(polyfill)))
      .collect(),
    modules_run_before_main: raw_options.modules_run_before_main.unwrap_or_default(),
    run_module_statement,
    sourcemap: raw_options.sourcemap.unwrap_or(false),
    platform: raw_options.platform.unwrap_or_else(|| "ios".to_string()),
    dev: raw_options.dev.unwrap_or(false),
    cache_stores: raw_options.cache_stores.unwrap_or_default(),
    cache_version: raw_options.cache_version.unwrap_or_default(),
    max_workers,
    out_dir: resolve(Path::new(raw_options.out_dir.as_deref().unwrap_or("dist"))),
    bundle_filename,
    entry_file,
    watch_folders,
    project_root: project_root.clone(),
  };

  if !normalized.is_watched(&normalized.entry_file) {
    return Err(BuildError::InvalidOptions(format!(
      "`entryFile` {} is outside of the project root and every watch folder",
      normalized.entry_file.display()
    )));
  }

  Ok(normalized)
}
