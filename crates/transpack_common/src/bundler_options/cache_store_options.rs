use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CacheStoreOptions {
  /// In-process store, keeps at most `capacity` entries.
  Memory { capacity: Option<usize> },
  /// On-disk store rooted at `dir`. Relative paths are resolved against the project root.
  File { dir: PathBuf },
}
