//! Export pipeline for paginated report data
//!
//! The export system is built on three main components:
//!
//! 1. **ReportSource**: Paginated access to report rows (HTTP client or mocks)
//! 2. **RecordSink**: The writing side, producing the encoded CSV file
//! 3. **ProgressTracker**: Real-time progress feedback
//!
//! The [`ExportPipeline`] orchestrates them: it asks the source for the total
//! row count, then fetches, reformats, and writes pages until the
//! continuation token runs out or the row budget is spent.

pub mod format;
pub mod pipeline;
pub mod progress;
pub mod sink;

pub use format::{format_rows, FormattedRow, HEADERS};
pub use pipeline::{ExportPipeline, ExportSummary};
pub use progress::ProgressTracker;
pub use sink::{CsvSink, FieldEncoder, OutputEncoding, RecordSink, UnmappablePolicy};
