//! Export pipeline orchestrating the full download
//!
//! Brings the report source, row formatting, progress tracking, and the
//! output sink together into the one-shot export run.

use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::reporting::{ReportQuery, ReportSource};

use super::format::format_rows;
use super::progress::ProgressTracker;
use super::sink::RecordSink;

/// Result of an export run
#[derive(Debug)]
pub struct ExportSummary {
    /// Number of rows exported
    pub rows_exported: u64,
    /// Number of pages fetched by the pagination loop
    pub pages_fetched: u32,
    /// File size in bytes
    pub file_size_bytes: u64,
    /// Time taken for the export
    pub elapsed_ms: u64,
}

/// Pipeline for export operations
///
/// Orchestrates the report source, row formatting, progress tracking, and
/// the output sink to move one report into one file.
pub struct ExportPipeline {
    /// Source of report pages
    source: Box<dyn ReportSource>,
    /// Output sink for formatted rows
    sink: Box<dyn RecordSink>,
    /// Query being exported; its page token advances as pages arrive
    query: ReportQuery,
    /// Whether to display a progress bar
    show_progress: bool,
}

impl ExportPipeline {
    /// Create a new export pipeline
    pub fn new(
        source: Box<dyn ReportSource>,
        sink: Box<dyn RecordSink>,
        query: ReportQuery,
        show_progress: bool,
    ) -> Self {
        Self {
            source,
            sink,
            query,
            show_progress,
        }
    }

    /// Execute the export operation
    ///
    /// This is the main entry point that orchestrates the entire run:
    /// 1. Ask the source for the total row count
    /// 2. Fetch pages, reformat them, and write them out
    /// 3. Advance the page token and the remaining-row budget
    /// 4. Finalize the sink and return statistics
    ///
    /// The loop ends when the continuation token runs out or the requested
    /// row budget is spent, whichever comes first. The budget goes down by
    /// one full page size per iteration regardless of how many rows the
    /// page actually held.
    ///
    /// # Returns
    /// * `Result<ExportSummary>` - Export statistics or error
    pub async fn execute(&mut self) -> Result<ExportSummary> {
        let start_time = Instant::now();

        info!("Starting export operation");
        let total = self.source.total(&self.query).await?;
        info!("Report contains {} rows", total);

        let tracker = ProgressTracker::new(total, self.show_progress);
        let mut exported = 0u64;
        let mut pages_fetched = 0u32;
        let mut remaining = total as i64;

        while remaining > 0 {
            debug!("Fetching page #{}", pages_fetched + 1);
            let page = self.source.fetch_page(&self.query).await?;
            pages_fetched += 1;

            let formatted = format_rows(&page.rows)?;
            let written = self.sink.write(&formatted).await?;

            exported += written as u64;
            tracker.update(exported);

            let last_page = page.next_page_token.is_none();
            self.query.set_page_token(page.next_page_token);
            remaining -= self.query.page_size() as i64;
            debug!("{} rows remaining to request", remaining.max(0));

            if last_page {
                debug!("No continuation token, report exhausted");
                break;
            }
        }

        tracker.finish();
        self.sink.finalize().await?;

        let file_size_bytes = self.sink.file_size().await?;
        let elapsed_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Export completed: {} rows, {} pages, {} bytes, {} ms",
            exported, pages_fetched, file_size_bytes, elapsed_ms
        );

        Ok(ExportSummary {
            rows_exported: exported,
            pages_fetched,
            file_size_bytes,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    use crate::error::{ExportError, RowError, SourceError};
    use crate::export::format::FormattedRow;
    use crate::reporting::{ReportPage, ReportRow};

    // Mock report source serving a scripted page sequence
    struct MockSource {
        total: u64,
        pages: Vec<ReportPage>,
        expected_tokens: Vec<Option<&'static str>>,
        current: usize,
    }

    impl MockSource {
        fn new(total: u64, pages: Vec<ReportPage>) -> Self {
            Self {
                total,
                pages,
                expected_tokens: Vec::new(),
                current: 0,
            }
        }

        fn expecting_tokens(mut self, tokens: Vec<Option<&'static str>>) -> Self {
            self.expected_tokens = tokens;
            self
        }
    }

    #[async_trait]
    impl ReportSource for MockSource {
        async fn fetch_page(&mut self, query: &ReportQuery) -> Result<ReportPage> {
            if let Some(expected) = self.expected_tokens.get(self.current) {
                assert_eq!(query.page_token(), *expected, "unexpected page token");
            }

            if self.current < self.pages.len() {
                let page = self.pages[self.current].clone();
                self.current += 1;
                Ok(page)
            } else {
                Err(SourceError::EmptyResponse.into())
            }
        }

        async fn total(&mut self, _query: &ReportQuery) -> Result<u64> {
            Ok(self.total)
        }
    }

    // Mock sink recording batch sizes; the log handle stays observable
    // after the sink moves into the pipeline.
    struct MockSink {
        batches: Arc<Mutex<Vec<usize>>>,
    }

    impl MockSink {
        fn new() -> Self {
            Self {
                batches: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn batch_log(&self) -> Arc<Mutex<Vec<usize>>> {
            Arc::clone(&self.batches)
        }
    }

    #[async_trait]
    impl RecordSink for MockSink {
        async fn write(&mut self, rows: &[FormattedRow]) -> Result<usize> {
            self.batches.lock().unwrap().push(rows.len());
            Ok(rows.len())
        }

        async fn finalize(&mut self) -> Result<()> {
            Ok(())
        }

        async fn file_size(&self) -> Result<u64> {
            let rows: u64 = self.batches.lock().unwrap().iter().map(|n| *n as u64).sum();
            Ok(rows * 100) // Mock size
        }
    }

    fn sample_query() -> ReportQuery {
        ReportQuery::new(
            "123456789",
            NaiveDate::from_ymd_opt(2022, 6, 1).unwrap(),
            NaiveDate::from_ymd_opt(2022, 6, 30).unwrap(),
            None,
        )
    }

    fn row(n: usize) -> ReportRow {
        ReportRow {
            date_hour_minute: "202206011530".to_string(),
            hostname: "www.example.jp".to_string(),
            page_path: format!("/page/{n}"),
            source_medium: "google / organic".to_string(),
            previous_page_path: "(entrance)".to_string(),
            pageviews: "1".to_string(),
        }
    }

    fn page(rows: usize, row_count: u64, token: Option<&str>) -> ReportPage {
        ReportPage {
            rows: (0..rows).map(row).collect(),
            row_count,
            next_page_token: token.map(|t| t.to_string()),
        }
    }

    #[tokio::test]
    async fn test_export_paginates_until_exhausted() {
        let source = MockSource::new(
            3500,
            vec![page(2000, 3500, Some("2000")), page(1500, 3500, None)],
        )
        .expecting_tokens(vec![None, Some("2000")]);

        let sink = MockSink::new();
        let batches = sink.batch_log();

        let mut pipeline =
            ExportPipeline::new(Box::new(source), Box::new(sink), sample_query(), false);
        let summary = pipeline.execute().await.unwrap();

        assert_eq!(summary.rows_exported, 3500);
        assert_eq!(summary.pages_fetched, 2);
        assert_eq!(summary.file_size_bytes, 3500 * 100);
        assert_eq!(*batches.lock().unwrap(), vec![2000, 1500]);
    }

    #[tokio::test]
    async fn test_no_data_available() {
        let source = MockSource::new(0, Vec::new());

        let mut pipeline = ExportPipeline::new(
            Box::new(source),
            Box::new(MockSink::new()),
            sample_query(),
            false,
        );
        let summary = pipeline.execute().await.unwrap();

        assert_eq!(summary.rows_exported, 0);
        assert_eq!(summary.pages_fetched, 0);
        assert_eq!(summary.file_size_bytes, 0);
    }

    #[tokio::test]
    async fn test_stops_when_token_runs_out_early() {
        // The reported total promises more pages than the token chain
        // actually delivers.
        let source = MockSource::new(
            10_000,
            vec![page(2000, 10_000, Some("2000")), page(2000, 10_000, None)],
        );

        let mut pipeline = ExportPipeline::new(
            Box::new(source),
            Box::new(MockSink::new()),
            sample_query(),
            false,
        );
        let summary = pipeline.execute().await.unwrap();

        assert_eq!(summary.rows_exported, 4000);
        assert_eq!(summary.pages_fetched, 2);
    }

    #[tokio::test]
    async fn test_stops_on_row_budget_even_with_token() {
        // Exactly one page worth of rows; the trailing token must not
        // trigger another fetch because the budget is already spent.
        let source = MockSource::new(2000, vec![page(2000, 2000, Some("2000"))]);

        let mut pipeline = ExportPipeline::new(
            Box::new(source),
            Box::new(MockSink::new()),
            sample_query(),
            false,
        );
        let summary = pipeline.execute().await.unwrap();

        assert_eq!(summary.rows_exported, 2000);
        assert_eq!(summary.pages_fetched, 1);
    }

    #[tokio::test]
    async fn test_malformed_row_aborts_run() {
        let mut bad_page = page(1, 2001, None);
        bad_page.rows[0].date_hour_minute = "garbage".to_string();

        let source = MockSource::new(2001, vec![page(2000, 2001, Some("2000")), bad_page]);

        let mut pipeline = ExportPipeline::new(
            Box::new(source),
            Box::new(MockSink::new()),
            sample_query(),
            false,
        );
        let result = pipeline.execute().await;

        assert!(matches!(
            result,
            Err(ExportError::Row(RowError::InvalidTimestamp(_)))
        ));
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        // Total of 5 promised but no pages to serve.
        let source = MockSource::new(5, Vec::new());

        let mut pipeline = ExportPipeline::new(
            Box::new(source),
            Box::new(MockSink::new()),
            sample_query(),
            false,
        );

        assert!(matches!(
            pipeline.execute().await,
            Err(ExportError::Source(SourceError::EmptyResponse))
        ));
    }
}
