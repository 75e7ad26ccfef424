use std::io;

/// Errors raised by cache stores. They are never fatal: a failed read is a cache miss and
/// a failed write only costs a future transform.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
  #[error("cache entry `{key}` is corrupted: {reason}")]
  Corrupted { key: String, reason: String },

  #[error("cache entry `{key}` could not be serialized: {reason}")]
  Serialize { key: String, reason: String },

  #[error(transparent)]
  Io(#[from] io::Error),
}

impl CacheError {
  pub fn is_corrupted(&self) -> bool {
    matches!(self, Self::Corrupted { .. })
  }
}
