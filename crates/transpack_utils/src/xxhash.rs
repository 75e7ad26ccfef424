use xxhash_rust::xxh3::xxh3_128;

#[inline]
pub fn xxhash_128(input: &[u8]) -> u128 {
  xxh3_128(input)
}

/// Hashes two hashes into one. Order matters: `combine(a, b) != combine(b, a)`.
pub fn combine_hashes(first: u128, second: u128) -> u128 {
  let mut bytes = [0u8; 32];
  bytes[..16].copy_from_slice(&first.to_le_bytes());
  bytes[16..].copy_from_slice(&second.to_le_bytes());
  xxh3_128(&bytes)
}

pub fn to_hex(hash: u128) -> String {
  format!("{hash:032x}")
}

#[test]
fn test_combine_hashes() {
  let source = xxhash_128(b"module.exports = 1;");
  let options = xxhash_128(br#"{"dev":false}"#);
  assert_eq!(combine_hashes(source, options), combine_hashes(source, options));
  assert_ne!(combine_hashes(source, options), combine_hashes(options, source));
  assert_ne!(combine_hashes(source, options), combine_hashes(source, xxhash_128(br#"{"dev":true}"#)));
}

#[test]
fn test_to_hex() {
  assert_eq!(to_hex(0xff), "000000000000000000000000000000ff");
  assert_eq!(to_hex(xxhash_128(b"hello")).len(), 32);
}
