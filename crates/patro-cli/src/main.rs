use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use patro_client::HttpFetcherFactory;
use patro_core::config::{parse_months, parse_years};
use patro_core::traits::FetcherFactory;
use patro_core::validate::validate_dataset_file;
use patro_core::{CalendarData, ScrapeConfig, TracingProgressReporter, Validator, acquire};
use patro_export::{ExportFormat, JsonExporter, export_dataset};

#[derive(Parser)]
#[command(name = "patro", version, about = "Nepali calendar archiver")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download, validate and export calendar months
    Scrape(ScrapeArgs),

    /// Validate a previously exported JSON dataset
    Validate {
        /// Dataset file to check
        file: PathBuf,

        /// Months every year is expected to hold (e.g. "1-12", "1,4")
        #[arg(short, long, default_value = "1-12")]
        months: String,
    },
}

#[derive(Args)]
struct ScrapeArgs {
    /// JSON config file; flags below override its values
    #[arg(short, long, env = "PATRO_CONFIG")]
    config: Option<PathBuf>,

    /// Years to fetch (e.g. "2081", "2079-2081", "2070,2075-2077")
    #[arg(short, long, env = "PATRO_YEARS")]
    years: Option<String>,

    /// Months to fetch for every year (e.g. "1-12", "1,4,9")
    #[arg(short, long, env = "PATRO_MONTHS")]
    months: Option<String>,

    /// Minimum delay between month requests, in milliseconds
    #[arg(long, env = "PATRO_REQUEST_DELAY")]
    delay: Option<u64>,

    /// Per-page timeout, in milliseconds
    #[arg(long, env = "PATRO_TIMEOUT")]
    timeout: Option<u64>,

    /// Transport retries within a single page fetch
    #[arg(long, env = "PATRO_MAX_RETRIES")]
    max_retries: Option<u32>,

    /// Root URL of the month pages
    #[arg(long, env = "PATRO_BASE_URL")]
    base_url: Option<String>,

    /// Directory receiving the exported files
    #[arg(short, long, env = "PATRO_OUTPUT_DIR", default_value = "data")]
    output_dir: PathBuf,

    /// File name (without extension) of the combined export
    #[arg(long, default_value = "calendar")]
    name: String,

    /// Export format: json, csv or all
    #[arg(short, long, env = "PATRO_FORMAT", default_value = "json")]
    format: ExportFormat,

    /// Keep tithi/event values even when they are blank or "--"
    #[arg(long, default_value_t = false)]
    all_fields: bool,

    /// Also write one JSON file per year
    #[arg(long, default_value_t = false)]
    split_years: bool,

    /// Render pages in headless Chromium instead of plain HTTP
    #[cfg(feature = "browser")]
    #[arg(long, env = "PATRO_BROWSER", default_value_t = false)]
    browser: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("patro=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Scrape(args) => cmd_scrape(args).await?,
        Commands::Validate { file, months } => cmd_validate(&file, &months)?,
    }

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied.
fn build_config(args: &ScrapeArgs) -> Result<ScrapeConfig> {
    let mut config = match &args.config {
        Some(path) => ScrapeConfig::from_file(path)?,
        None => ScrapeConfig::default(),
    };

    if let Some(years) = &args.years {
        config.years = parse_years(years)?;
    }
    if let Some(months) = &args.months {
        config.months = parse_months(months)?;
    }
    if let Some(delay) = args.delay {
        config.request_delay = delay;
        config.max_delay = config.max_delay.max(delay);
    }
    if let Some(timeout) = args.timeout {
        config.timeout = timeout;
    }
    if let Some(max_retries) = args.max_retries {
        config.max_retries = max_retries;
    }
    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if args.split_years {
        config.save_individual_years = true;
    }

    config.validate()?;
    Ok(config)
}

async fn cmd_scrape(args: ScrapeArgs) -> Result<()> {
    let config = build_config(&args)?;
    tracing::info!(
        years = config.years.len(),
        months = config.months.len(),
        units = config.unit_count(),
        base_url = %config.base_url,
        "Starting scrape"
    );

    #[cfg(feature = "browser")]
    let data = if args.browser {
        let factory = patro_client::BrowserFetcherFactory::from_config(&config)?;
        run(config.clone(), factory).await?
    } else {
        run(config.clone(), HttpFetcherFactory::from_config(&config)?).await?
    };
    #[cfg(not(feature = "browser"))]
    let data = run(config.clone(), HttpFetcherFactory::from_config(&config)?).await?;

    let written = export_dataset(
        &data,
        &args.output_dir,
        &args.name,
        args.format,
        args.all_fields,
    )
    .with_context(|| format!("Failed to export to {}", args.output_dir.display()))?;
    for path in &written {
        println!("{}", path.display());
    }

    if config.save_individual_years {
        let years_dir = args.output_dir.join("years");
        let written = JsonExporter::new().export_years(&data, &years_dir, args.all_fields)?;
        tracing::info!(files = written.len(), dir = %years_dir.display(), "Wrote per-year files");
    }

    Ok(())
}

async fn run<FF: FetcherFactory>(config: ScrapeConfig, factory: FF) -> Result<CalendarData> {
    let data = acquire(config, factory, &TracingProgressReporter)
        .await
        .context("Scrape aborted")?;
    Ok(data)
}

fn cmd_validate(file: &Path, months: &str) -> Result<()> {
    let validator = Validator::for_months(&parse_months(months)?);
    let report = validate_dataset_file(&validator, file)?;

    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    for error in &report.errors {
        println!("  error:   {error}");
    }

    if !report.is_valid {
        bail!(
            "{} is invalid: {} errors, {} warnings",
            file.display(),
            report.errors.len(),
            report.warnings.len()
        );
    }

    println!(
        "{} is valid ({} warnings)",
        file.display(),
        report.warnings.len()
    );
    Ok(())
}
