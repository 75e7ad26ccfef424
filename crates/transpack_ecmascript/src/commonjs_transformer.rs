use std::path::Path;

use anyhow::Context;
use oxc::span::SourceType;
use transpack_common::{TransformOptions, TransformOutput, Transformer};

use crate::collect_requires;

/// Keeps module code as is and reports its `require()` dependencies. JSON files become
/// `module.exports = <json>;`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CommonJsTransformer;

impl Transformer for CommonJsTransformer {
  fn transform(
    &self,
    source: &str,
    path: &Path,
    _options: &TransformOptions,
  ) -> anyhow::Result<TransformOutput> {
    if path.extension().is_some_and(|ext| ext == "json") {
      serde_json::from_str::<serde_json::Value>(source).context("Invalid JSON module")?;
      return Ok(TransformOutput {
        code: format!("module.exports = {};", source.trim()),
        dependencies: vec![],
      });
    }

    let source_type = match SourceType::from_path(path) {
      // Module code is evaluated inside a function wrapper, so parse it as a script.
      Ok(source_type) => source_type.with_script(true),
      Err(_) => SourceType::cjs(),
    };
    let dependencies = collect_requires(source, source_type)?;

    Ok(TransformOutput { code: source.to_string(), dependencies })
  }
}

#[cfg(test)]
fn options() -> TransformOptions {
  TransformOptions {
    dev: false,
    platform: "ios".to_string(),
    project_root: "/project".to_string(),
    cache_version: "1.0".to_string(),
  }
}

#[test]
fn transforms_javascript() {
  let output = CommonJsTransformer
    .transform("module.exports = require('./Foo');", Path::new("/project/index.js"), &options())
    .unwrap();
  assert_eq!(output.code, "module.exports = require('./Foo');");
  assert_eq!(output.dependencies.len(), 1);
  assert_eq!(output.dependencies[0].specifier, "./Foo");
}

#[test]
fn transforms_json() {
  let output = CommonJsTransformer
    .transform("{\"name\": \"app\"}\n", Path::new("/project/app.json"), &options())
    .unwrap();
  assert_eq!(output.code, "module.exports = {\"name\": \"app\"};");
  assert!(output.dependencies.is_empty());

  assert!(CommonJsTransformer.transform("{", Path::new("/project/app.json"), &options()).is_err());
}
