use anyhow::{Context, Result};
use clap::Parser;
use dimdate::{JobContext, JobSummary};
use dimdate_config::RuntimeConfig;
use std::path::PathBuf;

/// Build the date dimension table from fact files in object storage
#[derive(Parser)]
#[command(name = "dimdate")]
#[command(version)]
#[command(about = "Build the date dimension table from fact files in object storage", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Build and encode the dimension without uploading it
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async_main(cli))
}

async fn async_main(cli: Cli) -> Result<()> {
    let mut config = if let Some(config_path) = &cli.config {
        RuntimeConfig::load_from_path(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        RuntimeConfig::load().context("Failed to load configuration")?
    };

    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }

    dimdate::init_tracing(&config.logging);
    display_startup_info(&config, cli.dry_run);

    let ctx = JobContext::from_config(config)?.with_dry_run(cli.dry_run);
    let summary = dimdate::run_job(&ctx).await?;

    display_summary(&summary);
    Ok(())
}

fn display_startup_info(config: &RuntimeConfig, dry_run: bool) {
    use dimdate_config::StorageBackend;
    use tracing::info;

    info!("dimdate v{}", env!("CARGO_PKG_VERSION"));
    info!("Storage backend: {}", config.storage.backend);

    match config.storage.backend {
        StorageBackend::Fs => {
            if let Some(fs) = &config.storage.fs {
                info!("Root directory: {}", fs.path);
            }
        }
        StorageBackend::S3 => {
            if let Some(s3) = &config.storage.s3 {
                info!("S3 bucket: {} ({})", s3.bucket, s3.region);
            }
        }
    }

    info!(
        "Source: {}*{} ({})",
        config.source.prefix, config.source.suffix, config.source.format
    );
    info!("Destination: {}", config.output.object_key());
    if dry_run {
        info!("Dry run: output will not be uploaded");
    }
}

fn display_summary(summary: &JobSummary) {
    let action = if summary.dry_run {
        "would write"
    } else {
        "wrote"
    };
    println!(
        "{} files, {} records loaded ({} dropped), {} distinct dates; {} {} bytes to {}",
        summary.files_read,
        summary.rows_loaded,
        summary.rows_dropped,
        summary.distinct_dates,
        action,
        summary.bytes_written,
        summary.output_path
    );
}
