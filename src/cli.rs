//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::ActivityType;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Runtally - shared running and walking log for a group
///
/// Register activities, then follow the group's progress towards its
/// yearly distance goal.
///
/// Examples:
///   runtally register --person Kaia --activity run --distance 5.2 --minutes 31
///   runtally stats
///   runtally stats --people Kaia,Eirik --format markdown --output report.md
///   runtally recent -n 5
///   runtally init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file
    ///
    /// If not specified, looks for .runtally.toml in the current directory
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Record file to read and write
    ///
    /// Overrides general.data_file from the configuration file.
    #[arg(long, global = true, value_name = "FILE", env = "RUNTALLY_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Register a new activity
    Register(RegisterArgs),
    /// Show statistics and goal progress
    Stats(StatsArgs),
    /// List the most recent activities
    Recent {
        /// Number of activities to show
        #[arg(short = 'n', long, value_name = "COUNT")]
        limit: Option<usize>,
    },
    /// Generate a default .runtally.toml configuration file
    InitConfig,
}

#[derive(clap::Args, Debug, Clone)]
pub struct RegisterArgs {
    /// Who did the activity (must be on the roster)
    #[arg(short, long)]
    pub person: String,

    /// Kind of activity
    #[arg(short, long, default_value = "run")]
    pub activity: ActivityArg,

    /// Date of the activity (YYYY-MM-DD, default: today)
    #[arg(long, value_name = "DATE")]
    pub date: Option<NaiveDate>,

    /// Distance in kilometers
    #[arg(short, long, value_name = "KM", allow_negative_numbers = true)]
    pub distance: f64,

    /// Whole hours of duration
    #[arg(long, default_value = "0", allow_negative_numbers = true)]
    pub hours: i64,

    /// Remaining minutes of duration (0-59)
    #[arg(short, long, default_value = "0", allow_negative_numbers = true)]
    pub minutes: i64,
}

#[derive(clap::Args, Debug, Clone)]
pub struct StatsArgs {
    /// Only include these people (comma-separated)
    ///
    /// A subset is measured against the sum of its members' personal goals
    /// instead of the collective goal.
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub people: Option<Vec<String>>,

    /// Only include activities from this calendar year
    #[arg(long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Output format (text, markdown, json)
    #[arg(long, default_value = "text", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Output format for statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact terminal summary (default)
    #[default]
    Text,
    /// Markdown report
    Markdown,
    /// JSON format
    Json,
}

/// Activity kind accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ActivityArg {
    Run,
    Walk,
}

impl From<ActivityArg> for ActivityType {
    fn from(arg: ActivityArg) -> Self {
        match arg {
            ActivityArg::Run => ActivityType::Run,
            ActivityArg::Walk => ActivityType::Walk,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        match &self.command {
            Command::Recent { limit: Some(0) } => {
                return Err("Recent limit must be at least 1".to_string());
            }
            Command::Stats(stats) => {
                if let Some(year) = stats.year {
                    if !(1900..=9999).contains(&year) {
                        return Err(format!("Year out of range: {}", year));
                    }
                }
                if let Some(ref people) = stats.people {
                    if people.iter().any(|p| p.trim().is_empty()) {
                        return Err("--people contains an empty name".to_string());
                    }
                }
                if let Some(ref output) = stats.output {
                    if output.is_dir() {
                        return Err(format!(
                            "Output path is a directory: {}",
                            output.display()
                        ));
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
