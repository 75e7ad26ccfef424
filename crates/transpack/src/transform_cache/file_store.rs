use std::{
  io,
  path::{Path, PathBuf},
  sync::Arc,
};

use serde::{Deserialize, Serialize};
use transpack_common::TransformOutput;
use transpack_error::CacheError;
use transpack_fs::{FileSystem, OsFileSystem};

use super::{cache_key::CacheKey, CacheStore};

#[derive(Serialize, Deserialize)]
struct FileEntry<T> {
  key: String,
  output: T,
}

/// Persists transform results as JSON files under `<root>/<first two hex digits>/<key>`.
#[derive(Debug)]
pub struct FileCacheStore<Fs: FileSystem = OsFileSystem> {
  fs: Fs,
  root: PathBuf,
}

impl FileCacheStore {
  pub fn new(root: PathBuf) -> Self {
    Self::with_fs(OsFileSystem, root)
  }
}

impl<Fs: FileSystem> FileCacheStore<Fs> {
  pub fn with_fs(fs: Fs, root: PathBuf) -> Self {
    Self { fs, root }
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  fn entry_path(&self, key: &CacheKey) -> PathBuf {
    let hex = key.to_hex();
    self.root.join(&hex[..2]).join(&hex)
  }

  /// Drops every persisted entry.
  pub fn clear(&self) -> Result<(), CacheError> {
    Ok(self.fs.remove_dir_all(&self.root)?)
  }
}

impl<Fs: FileSystem> CacheStore for FileCacheStore<Fs> {
  fn name(&self) -> &'static str {
    "file"
  }

  fn get(&self, key: &CacheKey) -> Result<Option<Arc<TransformOutput>>, CacheError> {
    let content = match self.fs.read(&self.entry_path(key)) {
      Ok(content) => content,
      Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(err) => return Err(err.into()),
    };

    let entry: FileEntry<TransformOutput> = serde_json::from_slice(&content)
      .map_err(|err| CacheError::Corrupted { key: key.to_hex(), reason: err.to_string() })?;

    if entry.key != key.to_hex() {
      return Err(CacheError::Corrupted {
        key: key.to_hex(),
        reason: format!("entry belongs to `{}`", entry.key),
      });
    }

    Ok(Some(Arc::new(entry.output)))
  }

  fn set(&self, key: &CacheKey, output: &Arc<TransformOutput>) -> Result<(), CacheError> {
    let path = self.entry_path(key);
    let entry = FileEntry { key: key.to_hex(), output: output.as_ref() };
    let content = serde_json::to_vec(&entry)
      .map_err(|err| CacheError::Serialize { key: key.to_hex(), reason: err.to_string() })?;

    if let Some(dir) = path.parent() {
      self.fs.create_dir_all(dir)?;
    }
    self.fs.write(&path, &content)?;
    Ok(())
  }
}
