use std::path::{Path, PathBuf};

use arcstr::ArcStr;
use dashmap::DashMap;
use itertools::Itertools;
use oxc_resolver::{ResolveOptions as OxcResolverOptions, Resolver as OxcResolver};

use crate::ResolveError;

/// Maps a dependency specifier to the absolute path of a module.
///
/// Must be deterministic for a fixed file system state.
pub trait Resolve: Send + Sync {
  /// `importer` is the absolute path of the requesting module, `None` for entries which are
  /// resolved against the project root.
  fn resolve(&self, importer: Option<&Path>, specifier: &str) -> Result<ArcStr, ResolveError>;
}

#[derive(Debug)]
pub struct Resolver {
  cwd: PathBuf,
  inner: OxcResolver,
  resolved: DashMap<(PathBuf, String), ArcStr>,
}

impl Resolver {
  pub fn new(platform: &str, cwd: PathBuf) -> Self {
    // `Button.ios.js` wins over `Button.native.js`, which wins over `Button.js`.
    let extensions = [platform, "native"]
      .into_iter()
      .filter(|variant| !variant.is_empty())
      .unique()
      .flat_map(|variant| ["js", "json"].map(|ext| format!(".{variant}.{ext}")))
      .chain([".js".to_string(), ".json".to_string()])
      .collect::<Vec<_>>();

    let condition_names = ["react-native", platform, "require", "default"]
      .into_iter()
      .filter(|name| !name.is_empty())
      .unique()
      .map(String::from)
      .collect();

    let options = OxcResolverOptions {
      extensions,
      condition_names,
      main_fields: vec!["react-native".to_string(), "browser".to_string(), "main".to_string()],
      builtin_modules: false,
      symlinks: false,
      ..Default::default()
    };

    Self { cwd, inner: OxcResolver::new(options), resolved: DashMap::default() }
  }

  pub fn cwd(&self) -> &PathBuf {
    &self.cwd
  }
}

impl Resolve for Resolver {
  fn resolve(&self, importer: Option<&Path>, specifier: &str) -> Result<ArcStr, ResolveError> {
    let dir = importer
      .and_then(Path::parent)
      .filter(|inner| inner.components().next().is_some())
      .unwrap_or(self.cwd.as_path());

    let cache_key = (dir.to_path_buf(), specifier.to_string());
    if let Some(hit) = self.resolved.get(&cache_key) {
      return Ok(ArcStr::clone(hit.value()));
    }

    let resolution = self.inner.resolve(dir, specifier)?;
    let path = resolution.path();
    let path: ArcStr = path
      .to_str()
      .ok_or_else(|| ResolveError::NonUtf8Path(path.to_string_lossy().into_owned()))?
      .into();

    tracing::trace!(specifier, from = %dir.display(), resolved = %path, "resolved");
    self.resolved.insert(cache_key, ArcStr::clone(&path));
    Ok(path)
  }
}

#[test]
fn prefers_platform_specific_files() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path().to_path_buf();
  std::fs::write(root.join("index.js"), "require('./Button');").unwrap();
  std::fs::write(root.join("Button.js"), "").unwrap();
  std::fs::write(root.join("Button.native.js"), "").unwrap();
  std::fs::write(root.join("Button.ios.js"), "").unwrap();
  std::fs::write(root.join("Text.js"), "").unwrap();
  std::fs::write(root.join("Text.native.js"), "").unwrap();

  let importer = root.join("index.js");

  let ios = Resolver::new("ios", root.clone());
  assert_eq!(
    ios.resolve(Some(&importer), "./Button").unwrap().as_str(),
    root.join("Button.ios.js").to_str().unwrap()
  );

  let android = Resolver::new("android", root.clone());
  assert_eq!(
    android.resolve(Some(&importer), "./Button").unwrap().as_str(),
    root.join("Button.native.js").to_str().unwrap()
  );
  assert_eq!(
    android.resolve(Some(&importer), "./Text").unwrap().as_str(),
    root.join("Text.native.js").to_str().unwrap()
  );
}

#[test]
fn reports_missing_modules() {
  let dir = tempfile::tempdir().unwrap();
  let root = dir.path().to_path_buf();
  std::fs::write(root.join("index.js"), "").unwrap();

  let resolver = Resolver::new("ios", root.clone());
  let err = resolver.resolve(Some(&root.join("index.js")), "./missing").unwrap_err();
  assert!(matches!(err, ResolveError::NotFound(ref specifier) if specifier == "./missing"));
}
