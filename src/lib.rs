//! Universal Analytics Export Library
//!
//! This library provides the core functionality for ua-export, a one-shot
//! batch exporter that moves pageview report data out of the Analytics
//! Reporting API v4 and into a Shift_JIS CSV file.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `export`: Export pipeline, row formatting, and output sinks
//! - `reporting`: Reporting API queries, response decoding, and HTTP client
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use ua_export::export::{
//!     CsvSink, ExportPipeline, FieldEncoder, OutputEncoding, UnmappablePolicy,
//! };
//! use ua_export::reporting::{AnalyticsClient, ReportQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let query = ReportQuery::new(
//!         "123456789",
//!         NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2022, 6, 30).unwrap(),
//!         None,
//!     );
//!
//!     let client = AnalyticsClient::new("ya29.access-token");
//!     let encoder = FieldEncoder::new(OutputEncoding::ShiftJis, UnmappablePolicy::Substitute);
//!     let file_name = query.output_file_name();
//!     let sink = CsvSink::create(std::path::Path::new(&file_name), encoder).await?;
//!
//!     let mut pipeline = ExportPipeline::new(Box::new(client), Box::new(sink), query, true);
//!     let summary = pipeline.execute().await?;
//!     println!("Exported {} rows", summary.rows_exported);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod reporting;

// Re-export commonly used types
pub use config::Config;
pub use error::{ExportError, Result};
pub use export::{ExportPipeline, ExportSummary};
pub use reporting::{AnalyticsClient, ReportQuery};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
