//! Output sinks for export operations
//!
//! [`RecordSink`] is the writing side of the export pipeline. The CSV sink
//! is the only production implementation; tests substitute their own.

use std::path::Path;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::BufWriter;

use crate::error::{Result, SinkError};
use crate::export::format::FormattedRow;

pub mod csv;
pub mod encoding;

pub use csv::CsvSink;
pub use encoding::{FieldEncoder, OutputEncoding, UnmappablePolicy};

/// Trait for writing formatted rows to an output target
#[async_trait]
pub trait RecordSink: Send {
    /// Write a batch of rows
    ///
    /// # Arguments
    /// * `rows` - Slice of rows to write
    ///
    /// # Returns
    /// * `Result<usize>` - Number of rows written
    async fn write(&mut self, rows: &[FormattedRow]) -> Result<usize>;

    /// Finalize the output (flush buffers)
    async fn finalize(&mut self) -> Result<()>;

    /// Get the current file size in bytes
    async fn file_size(&self) -> Result<u64>;
}

/// Helper function to create a buffered file writer
pub(crate) async fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .await
        .map_err(|e| SinkError::CreateFailed {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;
    Ok(BufWriter::with_capacity(8 * 1024 * 1024, file)) // 8MB buffer
}

/// Helper function to validate that the target directory exists
pub(crate) fn validate_path(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(SinkError::DirectoryMissing(parent.display().to_string()).into());
        }
    }

    Ok(())
}
