//! CLI command definitions and handlers

mod analyze;
mod doctor;
mod init;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::models::HealthStatus;

/// Parse a percentage in 0..=100
fn parse_percent(s: &str) -> Result<f64, String> {
    let v: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if (0.0..=100.0).contains(&v) {
        Ok(v)
    } else {
        Err("percent must be between 0 and 100".to_string())
    }
}

/// Parse a probe timeout (1-3600 seconds)
fn parse_timeout(s: &str) -> Result<u64, String> {
    let n: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("timeout must be at least 1 second".to_string())
    } else if n > 3600 {
        Err("timeout cannot exceed 3600 seconds".to_string())
    } else {
        Ok(n)
    }
}

/// suitecheck - coverage and health diagnostics for e2e test suites
#[derive(Parser, Debug)]
#[command(name = "suitecheck")]
#[command(
    version,
    about = "Requirement/property coverage and health diagnostics for Kubernetes e2e test suites",
    long_about = "suitecheck mines WHEN/THE/SHALL requirements and correctness properties \
from your requirements and design documents, correlates them with the Go e2e test tree, \
and probes the health of the harness (cluster, scaffolding, helpers, quality metrics).\n\n\
Run without a subcommand to analyze the current directory:\n  \
suitecheck .",
    after_help = "\
Examples:
  suitecheck .                                 Full report for the current project
  suitecheck coverage --format json            Coverage only, as JSON
  suitecheck health --offline                  Health probes without a cluster
  suitecheck . --fail-under 80 --fail-on degraded   CI gate
  suitecheck init                              Write an example suitecheck.toml"
)]
pub struct Cli {
    /// Project directory (default: current directory)
    #[arg(global = true, default_value = ".")]
    pub path: PathBuf,

    /// Config file (default: suitecheck.toml in the project directory)
    #[arg(long, short = 'c', global = true, env = "SUITECHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level when RUST_LOG is unset (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Output format: text, json, markdown (or md)
    #[arg(long, short = 'f', global = true, default_value = "text", value_parser = ["text", "json", "markdown", "md"])]
    pub format: String,

    /// Output file path (default: stdout)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<PathBuf>,

    /// Requirements document (overrides inputs.requirements)
    #[arg(long, global = true)]
    pub requirements: Option<PathBuf>,

    /// Design document (overrides inputs.design)
    #[arg(long, global = true)]
    pub design: Option<PathBuf>,

    /// Test root directory (overrides inputs.tests)
    #[arg(long, global = true)]
    pub tests: Option<PathBuf>,

    /// Skip probes that need a live cluster
    #[arg(long, global = true)]
    pub offline: bool,

    /// Deadline for the probe phase in seconds (overrides probes.timeout_secs)
    #[arg(long, global = true, value_parser = parse_timeout)]
    pub timeout_secs: Option<u64>,

    /// Exit with code 1 if coverage is below this percent
    #[arg(long, global = true, value_parser = parse_percent)]
    pub fail_under: Option<f64>,

    /// Exit with code 1 if overall health is at this level or worse
    #[arg(long, global = true, value_parser = ["degraded", "unhealthy"])]
    pub fail_on: Option<String>,

    /// Disable colors in text output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Full report: coverage plus component health (default)
    Analyze,

    /// Requirement and property coverage only; no probes run
    Coverage,

    /// Component health only; documents are not read
    Health,

    /// Write an example suitecheck.toml into the project directory
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Check the environment: kubectl, config file, input paths
    Doctor,
}

impl Cli {
    pub(crate) fn fail_on_status(&self) -> Result<Option<HealthStatus>> {
        self.fail_on
            .as_deref()
            .map(|s| s.parse::<HealthStatus>().map_err(anyhow::Error::msg))
            .transpose()
    }
}

/// Run the CLI with parsed arguments
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Init { force }) => init::run(&cli.path, force),
        Some(Commands::Doctor) => doctor::run(&cli),
        Some(Commands::Coverage) => analyze::run(&cli, analyze::Mode::Coverage),
        Some(Commands::Health) => analyze::run(&cli, analyze::Mode::Health),
        Some(Commands::Analyze) | None => analyze::run(&cli, analyze::Mode::Full),
    }
}
