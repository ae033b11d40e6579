//! Catalog local data files.
//!
//! Registers CSV/TSV/Parquet/JSON files as tables, profiles and classifies
//! every column, documents the result and writes a data dictionary.
//!
//! ```text
//! term-catalog --source 'data/*.csv' --format markdown --output-dir ./outputs
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use term_catalog::catalog::Catalog;
use term_catalog::config::CatalogConfig;
use term_catalog::documentation::{CatalogDocumenter, TemplateGenerator};
use term_catalog::formatters::{formatter_for, FormatterConfig, OutputFormat};
use term_catalog::logging::setup::{init_logging, LoggingConfig};
use term_catalog::logging::LogConfig;
use term_catalog::metadata::InformationSchemaSource;
use term_catalog::output::write_catalog;
use term_catalog::profiling::ProfilingOrchestrator;
use term_catalog::sources::{catalog_session, register_sources};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File or glob pattern to register as a table (repeatable)
    #[arg(long = "source", value_name = "PATH|GLOB", required = true)]
    sources: Vec<String>,

    /// Only catalog these tables (repeatable; default: all registered)
    #[arg(long = "table", value_name = "NAME")]
    tables: Vec<String>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Schema holding the tables
    #[arg(long)]
    schema: Option<String>,

    /// Output format: json, markdown or human
    #[arg(long)]
    format: Option<OutputFormat>,

    /// Directory the catalog file is written to
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Print the catalog instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Debug logging, including generated SQL
    #[arg(long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log warnings and errors
    #[arg(long)]
    quiet: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let log_config = log_config(&args);
    let logging = if args.verbose {
        LoggingConfig::development()
    } else {
        LoggingConfig::default()
    }
    .with_catalog_level(log_config.base_level)
    .with_json_format(args.json_logs);
    if let Err(e) = init_logging(logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    if let Err(e) = run(args, log_config).await {
        error!(error = %format!("{e:#}"), "Catalog run failed");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn log_config(args: &Args) -> LogConfig {
    if args.verbose {
        LogConfig::verbose()
    } else if args.quiet {
        LogConfig::production()
    } else {
        LogConfig::default()
    }
}

async fn run(args: Args, log_config: LogConfig) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => CatalogConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => CatalogConfig::default(),
    };
    if let Some(schema) = args.schema {
        config = config.with_schema(schema);
    }
    if let Some(format) = args.format {
        config = config.with_output_format(format);
    }
    if let Some(directory) = args.output_dir {
        config = config.with_output_directory(directory);
    }
    config.validate()?;

    let ctx = Arc::new(catalog_session());
    let registered = register_sources(&ctx, &args.sources)
        .await
        .context("registering sources")?;
    info!(tables = ?registered, "Registered sources");

    let orchestrator = ProfilingOrchestrator::builder(config.clone())
        .log_config(log_config)
        .build()?;
    let metadata = InformationSchemaSource::for_warehouse(ctx.clone(), &config.warehouse);
    let records = orchestrator
        .run(&*ctx, &metadata, &config.warehouse.schema, &args.tables)
        .await
        .with_context(|| format!("profiling schema '{}'", config.warehouse.schema))?;

    let documenter = CatalogDocumenter::new(
        Arc::new(TemplateGenerator),
        config.documentation.clone(),
    )
    .with_profiling_config(config.profiling.clone());
    let catalog = Catalog::new(&config.warehouse.schema, documenter.document(records).await);

    let formatter_config = FormatterConfig::default().with_profiling(config.profiling.clone());
    if args.stdout {
        let rendered = formatter_for(config.output.format, formatter_config).format(&catalog)?;
        println!("{rendered}");
    } else {
        let path = write_catalog(&catalog, &config.output, formatter_config)
            .context("writing catalog")?;
        println!("Catalog written to {}", path.display());
    }
    Ok(())
}
