#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
  #[error("module `{0}` does not exist")]
  NotFound(String),

  #[error("resolved path `{0}` is not valid utf8")]
  NonUtf8Path(String),

  #[error("{0}")]
  Other(String),
}

impl From<oxc_resolver::ResolveError> for ResolveError {
  fn from(err: oxc_resolver::ResolveError) -> Self {
    match err {
      oxc_resolver::ResolveError::NotFound(specifier) => Self::NotFound(specifier),
      err => Self::Other(err.to_string()),
    }
  }
}
