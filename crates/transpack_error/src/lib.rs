mod cache_error;

use std::io;

pub use crate::cache_error::CacheError;

/// Fatal errors of a build. Any of them aborts the build and no bundle is emitted.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
  #[error("Unable to resolve module `{specifier}` from `{importer}`: {reason}")]
  Resolution { importer: String, specifier: String, reason: String },

  #[error("Failed to transform `{module}`: {cause:#}")]
  Transform {
    module: String,
    #[source]
    cause: anyhow::Error,
  },

  #[error("Transform worker #{worker} crashed while processing `{module}`: {message}")]
  WorkerCrash { worker: usize, module: String, message: String },

  #[error("Could not load `{module}`{}: {source}", importer_suffix(.importer.as_deref()))]
  Load {
    module: String,
    importer: Option<String>,
    #[source]
    source: io::Error,
  },

  #[error("Could not write `{path}`: {source}")]
  Write {
    path: String,
    #[source]
    source: io::Error,
  },

  #[error("Failed to spawn transform worker: {0}")]
  WorkerSpawn(#[source] io::Error),

  #[error("Invalid options: {0}")]
  InvalidOptions(String),

  #[error("The build was cancelled before `{module}` finished transforming")]
  Cancelled { module: String },
}

impl BuildError {
  pub fn is_resolution(&self) -> bool {
    matches!(self, Self::Resolution { .. })
  }

  pub fn is_transform(&self) -> bool {
    matches!(self, Self::Transform { .. })
  }
}

fn importer_suffix(importer: Option<&str>) -> String {
  importer.map(|importer| format!(" (imported by `{importer}`)")).unwrap_or_default()
}

pub type BuildResult<T> = Result<T, BuildError>;

#[test]
fn load_error_mentions_importer() {
  let err = BuildError::Load {
    module: "src/missing.js".to_string(),
    importer: Some("src/index.js".to_string()),
    source: io::Error::new(io::ErrorKind::NotFound, "not found"),
  };
  assert_eq!(
    err.to_string(),
    "Could not load `src/missing.js` (imported by `src/index.js`): not found"
  );

  let err = BuildError::Load {
    module: "src/index.js".to_string(),
    importer: None,
    source: io::Error::new(io::ErrorKind::NotFound, "not found"),
  };
  assert_eq!(err.to_string(), "Could not load `src/index.js`: not found");
}

#[test]
fn transform_error_keeps_its_cause() {
  let err = BuildError::Transform {
    module: "src/index.js".to_string(),
    cause: anyhow::anyhow!("Unexpected token"),
  };
  assert!(err.is_transform());
  assert_eq!(std::error::Error::source(&err).map(ToString::to_string).as_deref(), Some("Unexpected token"));
}
