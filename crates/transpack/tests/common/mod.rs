#![allow(dead_code)]

use std::{
  path::{Path, PathBuf},
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
};

use tempfile::TempDir;
use transpack::{
  BundlerOptions, CommonJsTransformer, TransformOptions, TransformOutput, Transformer,
};

/// A project directory populated with `files`, removed on drop.
pub struct Fixture {
  dir: TempDir,
}

impl Fixture {
  pub fn new(files: &[(&str, &str)]) -> Self {
    let fixture = Self { dir: tempfile::tempdir().unwrap() };
    for (name, content) in files {
      fixture.write(name, content);
    }
    fixture
  }

  pub fn root(&self) -> &Path {
    self.dir.path()
  }

  pub fn path(&self, name: &str) -> PathBuf {
    self.root().join(name)
  }

  pub fn write(&self, name: &str, content: &str) {
    let path = self.path(name);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
  }

  pub fn options(&self, entry_file: &str) -> BundlerOptions {
    BundlerOptions {
      entry_file: Some(entry_file.to_string()),
      project_root: Some(self.root().to_path_buf()),
      max_workers: Some(2),
      ..Default::default()
    }
  }
}

/// The modules of Metro's `basic_bundle` integration test.
pub fn basic_bundle() -> Fixture {
  Fixture::new(&[
    (
      "TestBundle.js",
      "require('./InitializeCore');\nconst Bar = require('./Bar');\nconst Foo = require('./Foo');\n\nmodule.exports = {Foo, Bar};\n",
    ),
    ("Bar.js", "const Foo = require('./Foo');\n\nmodule.exports = {type: 'bar', foo: Foo.type};\n"),
    ("Foo.js", "const asset = require('./test.json');\n\nmodule.exports = {type: 'foo', asset};\n"),
    ("test.json", "{\"name\": \"test\"}\n"),
    ("InitializeCore.js", "global.__initialized = true;\n"),
    ("polyfill-1.js", "global.polyfill1 = true;\n"),
    ("polyfill-2.js", "global.polyfill2 = global.polyfill1;\n"),
  ])
}

pub fn basic_bundle_options(fixture: &Fixture) -> BundlerOptions {
  BundlerOptions {
    polyfills: Some(vec!["polyfill-1.js".to_string(), "polyfill-2.js".to_string()]),
    modules_run_before_main: Some(vec![fixture.path("InitializeCore.js").display().to_string()]),
    ..fixture.options("TestBundle.js")
  }
}

/// Delegates to `CommonJsTransformer` and counts invocations.
#[derive(Default, Clone)]
pub struct CountingTransformer {
  calls: Arc<AtomicUsize>,
}

impl CountingTransformer {
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl Transformer for CountingTransformer {
  fn transform(
    &self,
    source: &str,
    path: &Path,
    options: &TransformOptions,
  ) -> anyhow::Result<TransformOutput> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    CommonJsTransformer.transform(source, path, options)
  }
}
