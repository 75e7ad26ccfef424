use std::fmt;

use transpack_common::TransformOptions;
use transpack_error::{BuildError, BuildResult};
use transpack_utils::xxhash::{combine_hashes, to_hex, xxhash_128};

/// Content address of a transform result: the module's path relative to the project root and
/// its source, combined with the hash of the serialized transform options, cache version
/// included. Transformers see the path, so identical sources at different paths get different
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(u128);

impl CacheKey {
  pub fn new(content_hash: u128, options_hash: u128) -> Self {
    Self(combine_hashes(content_hash, options_hash))
  }

  pub fn for_module(stable_id: &str, source_hash: u128, options_hash: u128) -> Self {
    Self::new(combine_hashes(xxhash_128(stable_id.as_bytes()), source_hash), options_hash)
  }

  #[cfg(test)]
  fn from_source(stable_id: &str, source: &str, options_hash: u128) -> Self {
    Self::for_module(stable_id, xxhash_128(source.as_bytes()), options_hash)
  }

  pub fn options_hash(options: &TransformOptions) -> BuildResult<u128> {
    let serialized = serde_json::to_vec(options)
      .map_err(|err| BuildError::InvalidOptions(format!("transform options: {err}")))?;
    Ok(xxhash_128(&serialized))
  }

  pub fn to_hex(self) -> String {
    to_hex(self.0)
  }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:032x}", self.0)
  }
}

#[test]
fn options_are_part_of_the_key() {
  let dev = TransformOptions { dev: true, ..Default::default() };
  let prod = TransformOptions::default();
  let versioned = TransformOptions { cache_version: "2".to_string(), ..Default::default() };

  let dev_hash = CacheKey::options_hash(&dev).unwrap();
  let prod_hash = CacheKey::options_hash(&prod).unwrap();
  let versioned_hash = CacheKey::options_hash(&versioned).unwrap();

  let key = |source, options_hash| CacheKey::from_source("a.js", source, options_hash);
  let source = "module.exports = 1;";
  assert_eq!(key(source, dev_hash), key(source, dev_hash));
  assert_ne!(key(source, dev_hash), key(source, prod_hash));
  assert_ne!(key(source, prod_hash), key(source, versioned_hash));
  assert_ne!(key(source, prod_hash), key("", prod_hash));
}

#[test]
fn paths_are_part_of_the_key() {
  let key = |stable_id| CacheKey::from_source(stable_id, "\"hi\"", 0);
  assert_eq!(key("data.json"), key("data.json"));
  assert_ne!(key("data.json"), key("str.js"));
  assert_ne!(key("a/index.js"), key("b/index.js"));
}

#[test]
fn displays_as_fixed_width_hex() {
  let key = CacheKey::from_source("index.js", "", 0);
  assert_eq!(key.to_string().len(), 32);
  assert_eq!(key.to_string(), key.to_hex());
}
