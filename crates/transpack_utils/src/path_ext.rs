use std::{borrow::Cow, path::Path};

use sugar_path::SugarPath;

pub trait PathExt {
  fn expect_to_str(&self) -> &str;

  /// Path relative to `root`, always `/` separated so that it is identical across platforms.
  fn relative_slash(&self, root: &Path) -> String;

  /// `src/Button.ios.js` -> `Button`, `src/button/index.js` -> `button`.
  fn representative_file_name(&self) -> Cow<str>;
}

impl PathExt for Path {
  fn expect_to_str(&self) -> &str {
    self.to_str().unwrap_or_else(|| {
      panic!("Failed to convert {:?} to valid utf8 str", self.display());
    })
  }

  fn relative_slash(&self, root: &Path) -> String {
    if self.is_absolute() {
      self.relative(root).to_slash_lossy().into_owned()
    } else {
      self.to_slash_lossy().into_owned()
    }
  }

  fn representative_file_name(&self) -> Cow<str> {
    let file_name = self
      .file_name()
      .map_or_else(|| self.to_string_lossy(), |name| name.to_string_lossy());
    // Strip every extension, including platform ones such as `.ios.js`.
    let file_name = match file_name.split_once('.') {
      Some((stem, _)) if !stem.is_empty() => Cow::Owned(stem.to_string()),
      _ => file_name,
    };

    match &*file_name {
      "index" => self
        .parent()
        .and_then(Path::file_name)
        .map_or(file_name, |parent| Cow::Owned(parent.to_string_lossy().into_owned())),
      _ => file_name,
    }
  }
}

#[test]
fn test_representative_file_name() {
  let cwd = Path::new(".").join("project");
  let path = cwd.join("src").join("TestBundle.js");
  assert_eq!(path.representative_file_name(), "TestBundle");

  let path = cwd.join("src").join("Button.ios.js");
  assert_eq!(path.representative_file_name(), "Button");

  let path = cwd.join("button").join("index.js");
  assert_eq!(path.representative_file_name(), "button");
}

#[test]
fn test_relative_slash() {
  let root = Path::new("/project");
  assert_eq!(Path::new("/project/src/a.js").relative_slash(root), "src/a.js");
  assert_eq!(Path::new("/polyfills/p.js").relative_slash(root), "../polyfills/p.js");
  assert_eq!(Path::new("src/a.js").relative_slash(root), "src/a.js");
}
