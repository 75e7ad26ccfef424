use std::{fs, io, path::Path};

use crate::FileSystem;

#[derive(Debug, Default, Clone, Copy)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
  fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
    fs::read(path)
  }

  fn read_to_string(&self, path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
  }

  /// Writes through a sibling temporary file so readers never observe a half written file.
  fn write(&self, path: &Path, content: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.file_name().map(ToOwned::to_owned).unwrap_or_default();
    tmp_name.push(format!(".{}.tmp", std::process::id()));
    let tmp_path = path.with_file_name(tmp_name);
    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path).inspect_err(|_| {
      let _ = fs::remove_file(&tmp_path);
    })
  }

  fn create_dir_all(&self, path: &Path) -> io::Result<()> {
    fs::create_dir_all(path)
  }

  fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
      Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
      ret => ret,
    }
  }

  fn exists(&self, path: &Path) -> bool {
    path.exists()
  }
}

#[test]
fn write_replaces_existing_content() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("bundle.js");
  let fs = OsFileSystem;

  fs.write(&path, b"first").unwrap();
  fs.write(&path, b"second").unwrap();

  assert_eq!(fs.read_to_string(&path).unwrap(), "second");
  assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn remove_missing_dir_is_ok() {
  let dir = tempfile::tempdir().unwrap();
  assert!(OsFileSystem.remove_dir_all(&dir.path().join("missing")).is_ok());
}
