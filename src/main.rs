//! Runtally - shared running and walking log for a group.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Invalid input, unreadable config, or a failed save

use anyhow::{Context, Result};
use chrono::Local;
use runtally::analysis::{self, SummaryRequest};
use runtally::cli::{Args, Command, OutputFormat, RegisterArgs, StatsArgs};
use runtally::config::{Config, DEFAULT_CONFIG_FILE};
use runtally::models::{format_duration, ActivityRecord, NewActivity};
use runtally::report;
use runtally::store::{JsonFileSource, RecordStore};
use runtally::TallyError;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Initialize logging
    init_logging(&args);

    debug!("Runtally v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle init-config: write a default configuration file.
fn handle_init_config(path: Option<&Path>) -> Result<i32> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            path.display()
        );
        return Ok(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("✅ Created {} with default settings.", path.display());
    println!("   Edit it to set the roster, the data file, and your goals.");
    Ok(0)
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over the command-line flags.
fn init_logging(args: &Args) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level().as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the selected command. Returns the process exit code.
fn run(args: Args) -> Result<i32> {
    match &args.command {
        // Needs neither a readable config nor the record file
        Command::InitConfig => handle_init_config(args.config.as_deref()),
        Command::Register(register) => {
            let (config, mut store) = open_store(&args)?;
            handle_register(&mut store, &config, register)
        }
        Command::Stats(stats) => {
            let (config, store) = open_store(&args)?;
            handle_stats(store.records(), &config, stats)
        }
        Command::Recent { limit } => {
            let (config, store) = open_store(&args)?;
            let limit = limit.unwrap_or(config.general.recent_limit);
            let recent = analysis::most_recent(store.records(), limit);
            print!("{}", report::generate_recent_table(&recent));
            Ok(0)
        }
    }
}

/// Resolve the configuration and load the record store it points at.
fn open_store(args: &Args) -> Result<(Config, RecordStore<JsonFileSource>)> {
    // Load configuration
    let mut config = load_config(args)?;
    config.merge_with_args(args);
    config.validate().context("Invalid configuration")?;

    let data_file = PathBuf::from(&config.general.data_file);
    info!("Using record file: {}", data_file.display());

    let (store, warning) = RecordStore::open(JsonFileSource::new(&data_file))?;
    if let Some(warning) = warning {
        warn!("{}", warning);
        eprintln!("⚠️  {}", warning);
        eprintln!("   Starting with an empty record set.");
    }

    Ok((config, store))
}

/// Validate and save one activity.
fn handle_register(
    store: &mut RecordStore<JsonFileSource>,
    config: &Config,
    register: &RegisterArgs,
) -> Result<i32> {
    let new = NewActivity {
        person: register.person.clone(),
        activity_type: register.activity.into(),
        date: register.date.unwrap_or_else(|| Local::now().date_naive()),
        distance_km: register.distance,
        hours: register.hours,
        minutes: register.minutes,
    };

    match store.register(new, &config.roster.people) {
        Ok(record) => {
            println!(
                "✅ Registered {} {} of {:.1} km for {} on {} ({}, {:.1} min/km)",
                record.activity_type().emoji(),
                record.activity_type(),
                record.distance_km(),
                record.person(),
                record.date().format("%d.%m.%Y"),
                format_duration(record.duration_minutes()),
                record.pace_min_per_km()
            );
            println!("   {} activities on record.", store.len());
            Ok(0)
        }
        Err(e @ TallyError::InvalidInput(_)) => {
            eprintln!("❌ {}", e);
            Ok(1)
        }
        Err(e @ TallyError::PersistFailure { .. }) => {
            error!("{}", e);
            eprintln!("❌ {}", e);
            eprintln!("   Nothing was saved. Please try again.");
            Ok(1)
        }
        Err(e) => Err(e.into()),
    }
}

/// Compute statistics and write them in the requested format.
fn handle_stats(
    records: &[ActivityRecord],
    config: &Config,
    stats: &StatsArgs,
) -> Result<i32> {
    let selection: Vec<String> = stats
        .people
        .iter()
        .flatten()
        .map(|p| p.trim().to_string())
        .collect();

    let roster = &config.roster.people;
    if !roster.is_empty() {
        for person in selection.iter().filter(|p| !roster.contains(p)) {
            warn!("'{}' is not on the roster", person);
        }
    }

    if records.is_empty() && stats.format != OutputFormat::Json {
        println!("ℹ️  No activities registered yet.");
    }

    let request = SummaryRequest {
        selection,
        year: stats.year,
        today: Local::now().date_naive(),
        recent_limit: config.general.recent_limit,
    };
    let summary = analysis::build_summary(records, &config.goals, roster, &request);

    let output = match stats.format {
        OutputFormat::Text => report::generate_text_summary(&summary),
        OutputFormat::Markdown => report::generate_markdown_report(&summary),
        OutputFormat::Json => report::generate_json_report(&summary)?,
    };

    match &stats.output {
        Some(path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            println!("✅ Report saved to: {}", path.display());
        }
        None => print!("{}", output),
    }

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
