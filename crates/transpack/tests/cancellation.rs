mod common;

use std::{
  path::Path,
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
  },
  time::Duration,
};

use arcstr::ArcStr;
use common::Fixture;
use tokio::sync::Notify;
use transpack::{
  Bundler, BundlerOptions, CommonJsTransformer, Resolve, ResolveError, Resolver,
  TransformOptions, TransformOutput, Transformer,
};

fn file_name(path: &Path) -> String {
  path.file_name().unwrap().to_string_lossy().into_owned()
}

/// Blocks every module but the entry until `open` is set.
#[derive(Default, Clone)]
struct GatedTransformer {
  open: Arc<AtomicBool>,
  started: Arc<Notify>,
  seen: Arc<Mutex<Vec<String>>>,
}

impl GatedTransformer {
  fn seen(&self) -> Vec<String> {
    self.seen.lock().unwrap().clone()
  }
}

impl Transformer for GatedTransformer {
  fn transform(
    &self,
    source: &str,
    path: &Path,
    options: &TransformOptions,
  ) -> anyhow::Result<TransformOutput> {
    let name = file_name(path);
    self.seen.lock().unwrap().push(name.clone());
    if name != "index.js" {
      self.started.notify_one();
      while !self.open.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(5));
      }
    }
    CommonJsTransformer.transform(source, path, options)
  }
}

#[tokio::test]
async fn dropped_builds_cancel_queued_transforms() {
  let fixture = Fixture::new(&[
    ("index.js", "require('./a');\nrequire('./b');\nrequire('./c');"),
    ("a.js", "module.exports = 'a';"),
    ("b.js", "module.exports = 'b';"),
    ("c.js", "module.exports = 'c';"),
  ]);
  let transformer = GatedTransformer::default();
  let options = BundlerOptions { max_workers: Some(1), ..fixture.options("index.js") };
  let mut bundler = Bundler::new(options).with_transformer(Arc::new(transformer.clone()));

  tokio::select! {
    ret = bundler.build() => panic!("build finished while a transform was blocked: {}", ret.is_ok()),
    () = transformer.started.notified() => {}
  }

  // The single worker holds one dependency, the other two were still queued.
  transformer.open.store(true, Ordering::SeqCst);
  tokio::time::sleep(Duration::from_millis(50)).await;
  let seen = transformer.seen();
  assert_eq!(seen.len(), 2, "{seen:?}");
  assert_eq!(seen[0], "index.js");

  // Nothing from the dropped build was cached but the entry.
  let output = bundler.build().await.unwrap();
  assert_eq!(transformer.seen().len(), 5);
  for name in ["'a'", "'b'", "'c'"] {
    assert!(output.code.contains(&format!("module.exports = {name};")));
  }
}

/// Records every specifier it is asked to resolve.
struct RecordingResolver {
  inner: Resolver,
  specifiers: Mutex<Vec<String>>,
}

impl Resolve for RecordingResolver {
  fn resolve(&self, importer: Option<&Path>, specifier: &str) -> Result<ArcStr, ResolveError> {
    self.specifiers.lock().unwrap().push(specifier.to_string());
    self.inner.resolve(importer, specifier)
  }
}

#[tokio::test]
async fn failed_builds_stop_their_module_tasks() {
  let fixture = Fixture::new(&[
    ("index.js", "require('./bad');\nrequire('./slow');"),
    ("bad.js", "const = ;"),
    ("slow.js", "require('./after');"),
    ("after.js", "module.exports = 1;"),
  ]);
  let resolver = Arc::new(RecordingResolver {
    inner: Resolver::new("ios", fixture.root().to_path_buf()),
    specifiers: Mutex::default(),
  });

  // `slow.js` finishes well after `bad.js` failed the build.
  let bad_done = Arc::new(AtomicBool::new(false));
  let bad_seen = Arc::clone(&bad_done);
  let transformer = Arc::new(
    move |source: &str, path: &Path, options: &TransformOptions| -> anyhow::Result<TransformOutput> {
      if path.ends_with("slow.js") {
        while !bad_seen.load(Ordering::SeqCst) {
          std::thread::sleep(Duration::from_millis(5));
        }
        std::thread::sleep(Duration::from_millis(100));
      }
      let ret = CommonJsTransformer.transform(source, path, options);
      if path.ends_with("bad.js") {
        bad_seen.store(true, Ordering::SeqCst);
      }
      ret
    },
  );

  let err = Bundler::new(fixture.options("index.js"))
    .with_transformer(transformer)
    .with_resolver(Arc::clone(&resolver) as Arc<dyn Resolve>)
    .build()
    .await
    .unwrap_err();
  assert!(err.is_transform());
  assert!(bad_done.load(Ordering::SeqCst));

  tokio::time::sleep(Duration::from_millis(50)).await;
  let specifiers = resolver.specifiers.lock().unwrap().clone();
  assert!(!specifiers.iter().any(|specifier| specifier == "./after"), "{specifiers:?}");
}
