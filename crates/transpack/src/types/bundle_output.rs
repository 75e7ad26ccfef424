use transpack_common::OutputAsset;

#[derive(Debug, Default)]
pub struct BundleOutput {
  pub code: String,
  /// Source map JSON, present when `sourcemap` is enabled.
  pub map: Option<String>,
  /// Files that `Bundler::write` puts into `out_dir`: the bundle and, optionally, its map.
  pub assets: Vec<OutputAsset>,
  pub warnings: Vec<anyhow::Error>,
}
