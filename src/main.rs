//! Universal Analytics report exporter
//!
//! Downloads pageview rows from the Analytics Reporting API v4 page by page
//! and appends them to a CSV file in a legacy Japanese encoding, so the data
//! survives the API shutdown in a form the downstream spreadsheets accept.
//!
//! # Usage
//!
//! ```bash
//! ua-export 123456789 --start-date 2022-06-01 --end-date 2022-06-30
//! ```

use tracing::info;

use ua_export::cli::CliInterface;
use ua_export::error::Result;
use ua_export::export::{CsvSink, ExportPipeline, FieldEncoder};
use ua_export::reporting::{AnalyticsClient, ReportQuery};

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// This function orchestrates the startup:
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Validate the merged configuration
/// 4. Run the export
///
/// # Returns
/// * `Result<()>` - Success or error
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;

    initialize_logging(&cli);

    cli.config().validate()?;
    cli.print_banner();

    run_export(&cli).await
}

/// Wire the client, sink, and pipeline together and run the export
async fn run_export(cli: &CliInterface) -> Result<()> {
    let config = cli.config();
    let (start_date, end_date) = config.report.date_range()?;

    let query = ReportQuery::new(
        config.analytics.view_id.clone(),
        start_date,
        end_date,
        config.report.filter.clone(),
    );
    let output_path = config.output.directory.join(query.output_file_name());

    let client = AnalyticsClient::from_credentials(&config.analytics.credentials)?;
    let encoder = FieldEncoder::new(config.output.encoding, config.output.on_unmappable);
    let sink = CsvSink::create(&output_path, encoder).await?;

    info!(
        "Exporting view {} to {}",
        config.analytics.view_id,
        output_path.display()
    );

    let mut pipeline = ExportPipeline::new(
        Box::new(client),
        Box::new(sink),
        query,
        cli.show_progress(),
    );
    let summary = pipeline.execute().await?;

    if summary.rows_exported == 0 {
        println!("There was no data available.");
    } else {
        println!(
            "Exported {} rows to {} ({} bytes, {} ms)",
            summary.rows_exported,
            output_path.display(),
            summary.file_size_bytes,
            summary.elapsed_ms
        );
    }

    Ok(())
}

/// Initialize the logging system from the merged configuration
fn initialize_logging(cli: &CliInterface) {
    let level = cli.config().logging.level.to_tracing_level();

    // Build subscriber with level filter
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    // Configure timestamps
    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}
