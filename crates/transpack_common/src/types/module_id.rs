use std::path::Path;

use arcstr::ArcStr;
use transpack_utils::path_ext::PathExt;

/// `ModuleId` is the absolute resolved path of a module. It is the key of the visited set
/// and of the path -> numeric ID mapping.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone)]
pub struct ModuleId(ArcStr);

impl ModuleId {
  pub fn new(value: impl Into<ArcStr>) -> Self {
    Self(value.into())
  }

  /// Id that is stable across machines: the path relative to `root`, `/` separated.
  pub fn stabilize(&self, root: &Path) -> String {
    self.as_path().relative_slash(root)
  }

  pub fn as_path(&self) -> &Path {
    Path::new(self.0.as_str())
  }

  pub fn inner(&self) -> &ArcStr {
    &self.0
  }
}

impl std::ops::Deref for ModuleId {
  type Target = str;

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl AsRef<str> for ModuleId {
  fn as_ref(&self) -> &str {
    self
  }
}

impl std::fmt::Display for ModuleId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<ArcStr> for ModuleId {
  fn from(value: ArcStr) -> Self {
    Self::new(value)
  }
}

#[test]
fn stabilize_is_relative_to_root() {
  let id = ModuleId::new("/project/src/TestBundle.js");
  assert_eq!(id.stabilize(Path::new("/project")), "src/TestBundle.js");
}
