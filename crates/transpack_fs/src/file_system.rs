use std::{io, path::Path};

/// File access needed by the bundler: reading module sources, persisting cache entries and
/// writing output assets.
pub trait FileSystem: Send + Sync {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

  fn read_to_string(&self, path: &Path) -> io::Result<String>;

  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()>;

  fn create_dir_all(&self, path: &Path) -> io::Result<()>;

  fn remove_dir_all(&self, path: &Path) -> io::Result<()>;

  fn exists(&self, path: &Path) -> bool;
}
