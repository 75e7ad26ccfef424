use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SourceSpan;

/// Options handed to every transform. They are part of the cache key, so everything that can
/// change the transform output must live here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOptions {
  pub dev: bool,
  pub platform: String,
  pub project_root: String,
  pub cache_version: String,
}

/// One dependency specifier of a module together with every place it occurs in the
/// transformed code. Each span covers the whole string literal, quotes included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
  pub specifier: String,
  pub spans: Vec<SourceSpan>,
}

impl Dependency {
  pub fn new(specifier: impl Into<String>, spans: Vec<SourceSpan>) -> Self {
    Self { specifier: specifier.into(), spans }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformOutput {
  pub code: String,
  pub dependencies: Vec<Dependency>,
}

/// Turns the source of one module into executable code plus its dependency specifiers.
///
/// Implementations run on the worker pool threads. A panic is treated as a worker crash.
pub trait Transformer: Send + Sync + 'static {
  fn transform(
    &self,
    source: &str,
    path: &Path,
    options: &TransformOptions,
  ) -> anyhow::Result<TransformOutput>;
}

impl<F> Transformer for F
where
  F: Fn(&str, &Path, &TransformOptions) -> anyhow::Result<TransformOutput> + Send + Sync + 'static,
{
  fn transform(
    &self,
    source: &str,
    path: &Path,
    options: &TransformOptions,
  ) -> anyhow::Result<TransformOutput> {
    self(source, path, options)
  }
}
