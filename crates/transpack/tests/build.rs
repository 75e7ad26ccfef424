mod common;

use std::{path::Path, sync::Arc};

use common::{basic_bundle, basic_bundle_options, Fixture};
use transpack::{BuildPhase, Bundler, BundlerOptions, TransformOptions, TransformOutput};

fn position(code: &str, needle: &str) -> usize {
  code.find(needle).unwrap_or_else(|| panic!("`{needle}` not found in:\n{code}"))
}

#[tokio::test]
async fn serializes_in_bundle_order() {
  let fixture = basic_bundle();
  let mut bundler = Bundler::new(basic_bundle_options(&fixture));
  let output = bundler.build().await.unwrap();
  let code = &output.code;

  assert_eq!(bundler.phase(), BuildPhase::Done);
  assert!(code.starts_with("var __DEV__=false,__METRO_GLOBAL_PREFIX__='',"));

  let runtime = position(code, "global.__d = define;");
  let polyfill_1 = position(code, "global.polyfill1 = true;");
  let polyfill_2 = position(code, "global.polyfill2 = global.polyfill1;");
  let first_module = position(code, "__d(function (global, require, module, exports) {");
  assert!(runtime < polyfill_1);
  assert!(polyfill_1 < polyfill_2);
  assert!(polyfill_2 < first_module);

  // IDs follow the relative paths:
  // Bar.js, Foo.js, InitializeCore.js, TestBundle.js, test.json.
  for (id, expected) in [
    (0, "const Foo = require(1      );"),
    (1, "const asset = require(4            );"),
    (3, "require(2                 );\nconst Bar = require(0      );\nconst Foo = require(1      );"),
    (4, "module.exports = {\"name\": \"test\"};"),
  ] {
    let start = position(code, expected);
    let wrapped = &code[start..];
    let end = position(wrapped, "\n}, ");
    assert!(wrapped[end..].starts_with(&format!("\n}}, {id}, [")), "module {id}");
  }
  assert!(code.contains("}, 3, [2, 0, 1]);"));

  assert!(code.ends_with("\n__r(2);\n__r(3);"), "{code}");
  assert!(output.map.is_none());
  assert_eq!(output.assets.len(), 1);
  assert_eq!(output.assets[0].filename, "TestBundle.js");
}

#[tokio::test]
async fn uses_the_run_module_statement_template() {
  let fixture = basic_bundle();
  let options = BundlerOptions {
    run_module_statement: Some("require({id});".to_string()),
    ..basic_bundle_options(&fixture)
  };

  let output = Bundler::new(options).build().await.unwrap();
  assert!(output.code.ends_with("\nrequire(2);\nrequire(3);"));
}

#[tokio::test]
async fn run_before_main_modules_outside_the_graph_are_skipped() {
  let fixture = Fixture::new(&[("index.js", "module.exports = 1;"), ("InitializeCore.js", "")]);
  let options = BundlerOptions {
    modules_run_before_main: Some(vec!["InitializeCore.js".to_string()]),
    ..fixture.options("index.js")
  };

  let output = Bundler::new(options).build().await.unwrap();
  assert!(output.code.ends_with("}, 0, []);\n__r(0);"), "{}", output.code);
  assert!(!output.code.contains("__r(1);"));
}

#[tokio::test]
async fn dev_builds_name_their_modules() {
  let fixture = basic_bundle();
  let options = BundlerOptions { dev: Some(true), ..basic_bundle_options(&fixture) };

  let output = Bundler::new(options).build().await.unwrap();
  assert!(output.code.starts_with("var __DEV__=true,"));
  assert!(output.code.contains("process.env.NODE_ENV||\"development\";"));
  assert!(output.code.contains("}, 1, [4], \"Foo.js\");"));
}

#[tokio::test]
async fn builds_are_deterministic() {
  let fixture = basic_bundle();

  let mut outputs = vec![];
  for workers in [1, 4, 8] {
    let options = BundlerOptions { max_workers: Some(workers), ..basic_bundle_options(&fixture) };
    outputs.push(Bundler::new(options).build().await.unwrap().code);
  }

  assert_eq!(outputs[0], outputs[1]);
  assert_eq!(outputs[1], outputs[2]);
}

#[tokio::test]
async fn module_ids_only_depend_on_paths() {
  let fixture = basic_bundle();
  let first = Bundler::new(basic_bundle_options(&fixture)).build().await.unwrap();

  // Changing a module body does not move any ID.
  fixture.write("Bar.js", "const Foo = require('./Foo');\nmodule.exports = 'changed';\n");
  let second = Bundler::new(basic_bundle_options(&fixture)).build().await.unwrap();

  assert_ne!(first.code, second.code);
  for marker in ["}, 0, [1]);", "}, 1, [4]);", "}, 2, []);", "}, 3, [2, 0, 1]);", "}, 4, []);"] {
    assert!(first.code.contains(marker), "{marker}");
    assert!(second.code.contains(marker), "{marker}");
  }
}

#[tokio::test]
async fn cycles_are_bundled_with_a_warning() {
  let fixture = Fixture::new(&[
    ("index.js", "require('./a');"),
    ("a.js", "exports.b = require('./b');"),
    ("b.js", "exports.a = require('./a');"),
  ]);

  let output = Bundler::new(fixture.options("index.js")).build().await.unwrap();
  assert!(output.code.contains("}, 0, [1]);"));
  assert!(output.code.contains("}, 1, [0]);"));
  assert_eq!(output.warnings.len(), 1);
  assert_eq!(output.warnings[0].to_string(), "Circular dependency: a.js -> b.js -> a.js.");
}

#[tokio::test]
async fn polyfill_dependencies_are_not_followed() {
  let fixture = Fixture::new(&[
    ("index.js", "module.exports = 1;"),
    ("polyfill.js", "require('./helper');"),
    ("helper.js", "module.exports = 2;"),
  ]);
  let options = BundlerOptions {
    polyfills: Some(vec!["polyfill.js".to_string()]),
    ..fixture.options("index.js")
  };

  let output = Bundler::new(options).build().await.unwrap();
  assert!(output.code.contains("(function (global) {require('./helper');"));
  assert!(!output.code.contains("module.exports = 2;"));
  assert_eq!(output.warnings.len(), 1);
  assert!(output.warnings[0].to_string().contains("`./helper`"));
}

#[tokio::test]
async fn emits_a_line_level_source_map() {
  let fixture = basic_bundle();
  let options = BundlerOptions { sourcemap: Some(true), ..basic_bundle_options(&fixture) };

  let output = Bundler::new(options).build().await.unwrap();
  let map = output.map.unwrap();
  assert!(output.code.ends_with("\n//# sourceMappingURL=TestBundle.js.map"));
  assert!(map.contains("\"Foo.js\""));
  assert!(map.contains("\"polyfill-1.js\""));
  assert!(map.contains("global.polyfill1 = true;"));

  let filenames = output.assets.iter().map(|asset| asset.filename.as_str()).collect::<Vec<_>>();
  assert_eq!(filenames, ["TestBundle.js", "TestBundle.js.map"]);
}

#[tokio::test]
async fn write_puts_assets_into_out_dir() {
  let fixture = basic_bundle();
  let options = BundlerOptions {
    out_dir: Some("build".to_string()),
    bundle_filename: Some("main.jsbundle".to_string()),
    sourcemap: Some(true),
    ..basic_bundle_options(&fixture)
  };

  let output = Bundler::new(options).write().await.unwrap();
  let written = std::fs::read_to_string(fixture.path("build/main.jsbundle")).unwrap();
  assert_eq!(written, output.code);
  assert!(fixture.path("build/main.jsbundle.map").is_file());
}

#[tokio::test]
async fn custom_transformers_are_used() {
  let fixture = Fixture::new(&[("index.js", "module.exports = 'hello';")]);
  let transformer = Arc::new(
    |source: &str, _: &Path, _: &TransformOptions| -> anyhow::Result<TransformOutput> {
      Ok(TransformOutput { code: source.replace("hello", "bye"), dependencies: vec![] })
    },
  );

  let mut bundler = Bundler::new(fixture.options("index.js")).with_transformer(transformer);
  let output = bundler.build().await.unwrap();
  assert!(output.code.contains("module.exports = 'bye';"));
}
