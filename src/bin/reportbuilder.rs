use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use reportbuilder::builder::{BuilderSettings, FetchOutcome, ReportBuilder, definition_to_state};
use reportbuilder::config::Config;
use reportbuilder::core::models::DynamicReportDefinition;
use reportbuilder::core::types::ReportId;
use reportbuilder::filter::is_basic_compatible;
use reportbuilder::logging::{self, LogTarget};
use reportbuilder::pivot::{PivotConfig, PivotZone, validate_pivot};
use reportbuilder::services::FileReportStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Inspect report definitions and stored reports
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Enable logging at the given level (overrides RUST_LOG)
    #[arg(long = "logging", value_enum)]
    logging: Option<LogLevel>,
    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Path to a config file (overrides default config discovery)
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Summarize a definition JSON file
    Inspect {
        file: PathBuf,
    },
    /// Load a stored report into the builder and show its state and action menu
    Open {
        /// Report store directory (defaults to the configured store)
        #[arg(long = "store", value_name = "DIR")]
        store: Option<PathBuf>,
        id: String,
    },
    /// List stored reports
    List {
        #[arg(long = "store", value_name = "DIR")]
        store: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum LogLevel { Error, Warn, Info, Debug, Trace }

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let target = match args.log_file {
        Some(path) => LogTarget::File(Some(path)),
        None => LogTarget::Stderr,
    };
    logging::init_with(target, args.logging.map(Into::into))?;

    let config = match Config::from_path(args.config.as_ref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            debug!("Falling back to default config: {e}");
            Config::default()
        }
    };

    match args.command {
        Command::Inspect { file } => inspect(&file),
        Command::Open { store, id } => open(&config, store, &id).await,
        Command::List { store } => list(&config, store).await,
    }
}

fn print_pivot(pivot: &PivotConfig) {
    for zone in [PivotZone::Rows, PivotZone::Columns, PivotZone::Values] {
        let cols: Vec<String> = pivot
            .zone(zone)
            .iter()
            .map(|c| match c.agg_func {
                Some(agg) => format!("{agg}({})", c.id),
                None => c.id.clone(),
            })
            .collect();
        if !cols.is_empty() {
            println!("  {zone}: {}", cols.join(", "));
        }
    }
}

fn print_definition(definition: &DynamicReportDefinition) {
    println!("Dataset:  {}", definition.dataset_key);
    println!("Columns:  {}", definition.selected_columns.join(", "));
    let mode = if is_basic_compatible(&definition.filter) { "basic" } else { "advanced" };
    println!("Filter ({mode}): {}", definition.filter.summary());
    let state = definition_to_state(definition);
    if !state.pivot.is_empty() {
        println!("Pivot:");
        print_pivot(&state.pivot);
    }
}

fn inspect(file: &Path) -> Result<()> {
    let text = fs::read_to_string(file).wrap_err_with(|| format!("reading {}", file.display()))?;
    let definition: DynamicReportDefinition =
        serde_json::from_str(&text).wrap_err("file is not a report definition")?;
    print_definition(&definition);

    let state = definition_to_state(&definition);
    if let Err(e) = validate_pivot(&state.pivot, &[]) {
        println!("Pivot problem: {e}");
    }
    Ok(())
}

async fn open(config: &Config, store: Option<PathBuf>, id: &str) -> Result<()> {
    let id = ReportId::from_str(id).map_err(|e| eyre!("invalid report id {id}: {e}"))?;
    let store = FileReportStore::open(&store.unwrap_or_else(|| config.store_dir())).await?;
    let datasets = store.list_datasets().await?;
    let mut builder = ReportBuilder::new(store, BuilderSettings::from(config));
    builder.dataset_panel.set_datasets(datasets);

    match builder.load_report(&id).await {
        FetchOutcome::Loaded => {}
        FetchOutcome::FellBack { reason } if builder.report().is_none() => {
            return Err(eyre!("could not load report {id}: {reason}"));
        }
        FetchOutcome::FellBack { reason } => println!("Column metadata unavailable: {reason}"),
        FetchOutcome::Superseded => {}
    }

    if let Some(report) = builder.report() {
        println!("{} [{}]", report.name, report.status);
        if let Some(description) = &report.description {
            println!("{description}");
        }
    }
    if let Some(definition) = builder.definition() {
        print_definition(&definition);
        if let Some(key) = builder.dataset_panel.current() {
            if !builder.dataset_panel.datasets().iter().any(|d| d == key) {
                println!("Dataset {key} has no column catalog in this store");
            }
        }
    }
    println!("Actions:");
    for entry in builder.action_menu() {
        let marker = if entry.enabled { "*" } else { " " };
        println!("  {marker} {:<12} {}", entry.action.id(), entry.label);
    }
    Ok(())
}

async fn list(config: &Config, store: Option<PathBuf>) -> Result<()> {
    let store = FileReportStore::open(&store.unwrap_or_else(|| config.store_dir())).await?;
    println!("Datasets: {}", store.list_datasets().await?.join(", "));
    for report in store.list_reports().await? {
        let dataset = report
            .definition
            .as_ref()
            .map(|d| d.dataset_key.as_str())
            .unwrap_or("-");
        println!("{}  {:<10} {:<16} {}", report.id, report.status, dataset, report.name);
    }
    Ok(())
}
