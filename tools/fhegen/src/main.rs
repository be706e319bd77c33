//! fhegen: FHE Solidity library generator
//!
//! Reads the annotated Go operation catalog and writes the FHE library,
//! per-operation test and benchmark contracts, and TypeScript ABI
//! declarations under the output directory.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use fhegen_core::prelude::*;

/// fhegen: FHE Solidity library generator
#[derive(Parser, Debug)]
#[command(name = "fhegen", version = fhegen_core::VERSION)]
#[command(about = "Generate the FHE Solidity library and its test surface from the operation catalog")]
struct Args {
    /// Annotated Go catalog (overrides config and FHEGEN_CATALOG)
    #[arg(short, long)]
    catalog: Option<PathBuf>,

    /// Output directory (overrides config and FHEGEN_OUT_DIR)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only benchmark these operations (comma-separated)
    #[arg(long, value_delimiter = ',')]
    bench: Option<Vec<String>>,

    /// Skip the typed seal overloads
    #[arg(long)]
    no_typed_seal: bool,

    /// Render operations on the current thread
    #[arg(long)]
    sequential: bool,

    /// Run the pipeline without writing files
    #[arg(long)]
    dry_run: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<()> {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn load_config(args: &Args) -> Result<GeneratorConfig> {
    let mut config = match &args.config {
        Some(path) => GeneratorConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    }
    .apply_env();

    if let Some(catalog) = &args.catalog {
        config = config.with_catalog_path(catalog);
    }
    if let Some(out) = &args.out {
        config = config.with_output_dir(out);
    }
    if let Some(ops) = &args.bench {
        config = config.with_bench_operations(ops.clone());
    }
    if args.no_typed_seal {
        config = config.with_typed_seal(false);
    }
    if args.sequential {
        config = config.with_parallel(false);
    }
    Ok(config)
}

fn run(args: &Args) -> Result<GenerationReport> {
    let config = load_config(args)?;
    info!(
        catalog = %config.catalog_path.display(),
        output = %config.output_dir.display(),
        "fhegen v{}",
        fhegen_core::VERSION
    );

    let service = GeneratorService::new(
        Arc::new(FileCatalogSource::new(&config.catalog_path)),
        Arc::new(FsEmitter::new(&config.output_dir)),
        config,
    )
    .context("Invalid configuration")?;

    let report = if args.dry_run {
        service.dry_run()
    } else {
        service.generate()
    };
    report.map_err(|e| {
        error!(stage = e.stage(), "{e}");
        anyhow::Error::new(e)
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose)?;

    let report = run(&args).context("Generation failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    let verb = if report.dry_run { "would write" } else { "wrote" };
    for file in &report.files {
        println!("{verb} {} ({} bytes)", file.path.display(), file.bytes);
    }
    println!(
        "{} operations, {} functions, {} files, {} bytes",
        report.operations,
        report.functions,
        report.files.len(),
        report.total_bytes()
    );
    Ok(())
}
