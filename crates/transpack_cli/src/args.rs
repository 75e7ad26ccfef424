use std::path::PathBuf;

use clap::Args;

#[derive(Args)]
pub struct InputArgs {
  /// Entry module, relative to the project root.
  pub entry_file: Option<String>,

  #[clap(long)]
  pub project_root: Option<PathBuf>,

  #[clap(long, action = clap::ArgAction::Append)]
  pub watch_folder: Option<Vec<PathBuf>>,

  #[clap(long, short)]
  pub platform: Option<String>,

  /// JSON file with `BundlerOptions`. Command line flags take precedence.
  #[clap(long, short)]
  pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct SerializerArgs {
  #[clap(long)]
  pub dev: Option<bool>,

  #[clap(long, action = clap::ArgAction::Append)]
  pub polyfill: Option<Vec<String>>,

  #[clap(long, action = clap::ArgAction::Append)]
  pub run_before_main: Option<Vec<String>>,

  /// Statement that runs a module, `{id}` is replaced by its module ID.
  #[clap(long)]
  pub run_module_statement: Option<String>,

  #[clap(long, short)]
  pub sourcemap: Option<bool>,
}

#[derive(Args)]
pub struct TransformArgs {
  #[clap(long, short = 'w')]
  pub max_workers: Option<usize>,

  /// Persist transform results in this directory.
  #[clap(long)]
  pub cache_dir: Option<PathBuf>,

  #[clap(long)]
  pub cache_version: Option<String>,
}

#[derive(Args)]
pub struct OutputArgs {
  #[clap(long, short = 'd')]
  pub out_dir: Option<String>,

  #[clap(long, short = 'o')]
  pub bundle_filename: Option<String>,

  #[clap(long)]
  pub silent: bool,
}
