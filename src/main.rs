use clap::{Parser, Subcommand};
use srcsetter::config::{self, PipelineConfig};
use srcsetter::logging::{self, LogFormat};
use srcsetter::{output, process, scan};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "srcsetter")]
#[command(about = "Build-time responsive image pipeline")]
#[command(long_about = "\
Build-time responsive image pipeline

Reads raw JPEG/PNG sources from a flat directory, writes resized,
content-addressed variants, and emits one JSON manifest with srcset strings
and ThumbHash placeholders for the frontend.

Layout:

  assets/raw/                      # raw_dir: sources (not recursive)
  │   ├── cat_123.jpg
  │   └── tabby.png
  public/
  ├── categories.json              # manifest_path
  └── img/                         # out_dir
      ├── cat_123.9a1f2b3c.160.avif
      └── cat_123.9a1f2b3c.320.avif

Every run reprocesses every source. Unchanged sources produce identical
file names and bytes. Corrupt sources are skipped and reported.

Run 'srcsetter gen-config' to generate a documented srcsetter.toml.")]
#[command(version)]
struct Cli {
    /// Config file; must exist when given [default: srcsetter.toml, optional]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raw source directory (overrides `raw_dir`)
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Variant output directory (overrides `out_dir`)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Manifest file (overrides `manifest_path`)
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    /// Debug-level diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Diagnostic log format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate all variants and write the manifest
    Build,
    /// List discovered sources and their ids without writing anything
    Check,
    /// Print a stock srcsetter.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.log_format);

    match cli.command {
        Command::Build => {
            let config = load_config(&cli)?;
            let process_config = process::ProcessConfig::from_pipeline_config(&config);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::run(
                &config.raw_dir,
                &config.out_dir,
                &config.manifest_path,
                &process_config,
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            output::print_summary(&result?);
        }
        Command::Check => {
            let config = load_config(&cli)?;
            let sources = scan::discover(&config.raw_dir, &config.images.extensions)?;
            output::print_check_output(
                &sources,
                &config.raw_dir,
                &config.naming.fallback_prefix,
                config.images.widths.len(),
                config.images.formats.len(),
            );
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and apply command-line path overrides.
fn load_config(cli: &Cli) -> Result<PipelineConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_required_config(path)?,
        None => config::load_config(Path::new(config::DEFAULT_CONFIG_FILE))?,
    };
    if let Some(source) = &cli.source {
        config.raw_dir = source.clone();
    }
    if let Some(output) = &cli.output {
        config.out_dir = output.clone();
    }
    if let Some(manifest) = &cli.manifest {
        config.manifest_path = manifest.clone();
    }
    Ok(config)
}
