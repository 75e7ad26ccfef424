mod args;

use std::{process::ExitCode, time::Instant};

use ansi_term::Colour;
use args::{InputArgs, OutputArgs, SerializerArgs, TransformArgs};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use transpack::{Bundler, BundlerOptions, CacheStoreOptions, OutputAsset};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Commands {
  #[clap(flatten)]
  input: InputArgs,

  #[clap(flatten)]
  serializer: SerializerArgs,

  #[clap(flatten)]
  transform: TransformArgs,

  #[clap(flatten)]
  output: OutputArgs,
}

fn print_output_assets(outputs: &[OutputAsset]) {
  let mut left = 0;
  let mut right = 0;

  let mut assets = Vec::with_capacity(outputs.len());

  for output in outputs {
    let size = format!("{:.2}", output.content.len() as f64 / 1024.0);
    right = right.max(size.len());
    left = left.max(output.filename.len());

    let asset_type = if output.filename.ends_with(".map") { "map" } else { "bundle" };
    assets.push((output.filename.as_str(), size, asset_type));
  }

  let dim = Colour::White.dimmed();
  let color = Colour::Cyan;

  for (filename, size, asset_type) in assets {
    println!(
      "{}{}{:left$} {}{}{:right$}{} kB",
      dim.paint("<DIR>/"),
      color.paint(filename),
      "",
      dim.paint(format!("{asset_type:6}")),
      dim.paint(" │ size: "),
      "",
      size,
      left = left - filename.len(),
      right = right - size.len()
    );
  }
}

fn read_config(args: &InputArgs) -> Result<BundlerOptions, String> {
  let Some(path) = &args.config else {
    return Ok(BundlerOptions::default());
  };
  let content = std::fs::read_to_string(path)
    .map_err(|err| format!("Could not read `{}`: {err}", path.display()))?;
  serde_json::from_str(&content).map_err(|err| format!("Invalid config `{}`: {err}", path.display()))
}

#[tokio::main]
async fn main() -> ExitCode {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::try_from_env("TRANSPACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Commands::parse();

  let config = match read_config(&args.input) {
    Ok(config) => config,
    Err(err) => {
      println!("{} {}", Colour::Red.paint("Error:"), err);
      return ExitCode::FAILURE;
    }
  };

  let InputArgs { entry_file, project_root, watch_folder, platform, .. } = args.input;
  let cache_stores = args.transform.cache_dir.map(|dir| {
    vec![CacheStoreOptions::Memory { capacity: None }, CacheStoreOptions::File { dir }]
  });

  let options = BundlerOptions {
    entry_file,
    project_root,
    watch_folders: watch_folder,
    platform,
    dev: args.serializer.dev,
    polyfills: args.serializer.polyfill,
    modules_run_before_main: args.serializer.run_before_main,
    run_module_statement: args.serializer.run_module_statement,
    sourcemap: args.serializer.sourcemap,
    cache_stores,
    cache_version: args.transform.cache_version,
    max_workers: args.transform.max_workers,
    out_dir: args.output.out_dir,
    bundle_filename: args.output.bundle_filename,
  }
  .merge(config);

  let mut bundler = Bundler::new(options);

  let start = Instant::now();
  match bundler.write().await {
    Ok(output) => {
      if !args.output.silent {
        for warning in &output.warnings {
          println!("{} {}", Colour::Yellow.paint("Warning:"), warning);
        }

        if !output.assets.is_empty() {
          print_output_assets(&output.assets);
        }
      }

      let elapsed = format!("{:.2} ms", start.elapsed().as_secs_f64() * 1000.0);
      println!("\n{} Finished in {}", Colour::Green.paint("✔"), Colour::White.bold().paint(elapsed));
      ExitCode::SUCCESS
    }
    Err(err) => {
      println!("{} {}", Colour::Red.paint("Error:"), err);
      ExitCode::FAILURE
    }
  }
}
