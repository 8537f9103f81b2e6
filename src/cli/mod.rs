//! Command-line interface for ua-export
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and CLI overrides
//! - The startup banner

use clap::Parser;
use std::path::PathBuf;

use chrono::NaiveDate;

use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::export::{OutputEncoding, UnmappablePolicy};
use crate::reporting::DimensionFilter;

/// Universal Analytics report exporter
#[derive(Parser, Debug)]
#[command(
    name = "ua-export",
    version,
    about = "Batch exporter for Universal Analytics report data",
    long_about = "Downloads pageview rows from the Analytics Reporting API v4 page by page
and writes them to a Shift_JIS CSV file for legacy spreadsheet tooling."
)]
pub struct CliArgs {
    /// Analytics view (profile) id to export
    #[arg(value_name = "VIEW_ID")]
    pub view_id: Option<String>,

    /// First day of the export range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// Last day of the export range (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end_date: Option<NaiveDate>,

    /// File holding the OAuth2 access token
    #[arg(long, value_name = "FILE")]
    pub credentials: Option<PathBuf>,

    /// Directory the export file is written into
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Only export rows whose page path matches exactly
    #[arg(long, value_name = "PATH")]
    pub page_path: Option<String>,

    /// Write plain UTF-8 instead of Shift_JIS
    #[arg(long)]
    pub utf8: bool,

    /// Fail instead of substituting characters the output encoding lacks
    #[arg(long)]
    pub strict_encoding: bool,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Quiet mode (minimal output)
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (debug logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration with CLI overrides applied
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        let args = CliArgs::parse();
        let config = Self::load_config(&args)?;

        Ok(Self { args, config })
    }

    /// Load configuration from file and merge with arguments
    ///
    /// Validation happens after the merge, in [`Config::validate`], so a
    /// value can arrive from either place.
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load(args.config_file.as_deref())?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the CLI arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Whether the export should display a progress bar
    pub fn show_progress(&self) -> bool {
        !self.args.quiet && !self.args.no_progress
    }

    /// Apply CLI arguments to configuration
    ///
    /// Overrides configuration values with CLI arguments where provided
    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        Self::apply_analytics_args(config, args);
        Self::apply_report_args(config, args);
        Self::apply_output_args(config, args);
        Self::apply_logging_args(config, args);
    }

    fn apply_analytics_args(config: &mut Config, args: &CliArgs) {
        if let Some(view_id) = &args.view_id {
            config.analytics.view_id = view_id.clone();
        }

        if let Some(credentials) = &args.credentials {
            config.analytics.credentials = credentials.clone();
        }
    }

    fn apply_report_args(config: &mut Config, args: &CliArgs) {
        if let Some(start_date) = args.start_date {
            config.report.start_date = Some(start_date);
        }

        if let Some(end_date) = args.end_date {
            config.report.end_date = Some(end_date);
        }

        if let Some(page_path) = &args.page_path {
            config.report.filter = Some(DimensionFilter {
                dimension: "ga:pagePath".to_string(),
                operator: "EXACT".to_string(),
                expressions: vec![page_path.clone()],
            });
        }
    }

    fn apply_output_args(config: &mut Config, args: &CliArgs) {
        if let Some(output_dir) = &args.output_dir {
            config.output.directory = output_dir.clone();
        }

        if args.utf8 {
            config.output.encoding = OutputEncoding::Utf8;
        }

        if args.strict_encoding {
            config.output.on_unmappable = UnmappablePolicy::Fail;
        }
    }

    fn apply_logging_args(config: &mut Config, args: &CliArgs) {
        config.logging.level = if args.very_verbose {
            LogLevel::Trace
        } else if args.verbose {
            LogLevel::Debug
        } else if args.quiet {
            LogLevel::Error
        } else {
            config.logging.level
        };
    }

    /// Print banner with version and the export date range
    pub fn print_banner(&self) {
        if !self.args.quiet {
            println!("ua-export {}", env!("CARGO_PKG_VERSION"));
            if let (Some(start), Some(end)) =
                (self.config.report.start_date, self.config.report.end_date)
            {
                println!("{} - {}", start, end);
            }
        }
    }
}
