//! CSV sink for export operations
//!
//! Writes formatted rows under the fixed report header. Values are escaped
//! first, then encoded field by field, so the file can be produced directly
//! in Shift_JIS.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::debug;

use crate::error::{Result, SinkError};
use crate::export::format::{FormattedRow, HEADERS};

use super::encoding::FieldEncoder;
use super::{create_writer, validate_path, RecordSink};

/// Sink writing rows to a CSV file.
pub struct CsvSink {
    /// Buffered file writer
    writer: BufWriter<File>,
    /// Path to the output file
    path: PathBuf,
    /// Encoder applied to every field
    encoder: FieldEncoder,
    /// Number of rows written
    written: usize,
}

impl CsvSink {
    /// Create the output file and write the header row.
    ///
    /// The header goes out immediately, so even an export that turns out to
    /// hold no data leaves a well-formed file behind.
    ///
    /// # Arguments
    /// * `path` - Output file path
    /// * `encoder` - Field encoder for the target charset
    ///
    /// # Returns
    /// * `Result<Self>` - New sink or error
    pub async fn create(path: &Path, encoder: FieldEncoder) -> Result<Self> {
        validate_path(path)?;
        let writer = create_writer(path).await?;

        debug!("Created CSV sink for: {}", path.display());

        let mut sink = Self {
            writer,
            path: path.to_path_buf(),
            encoder,
            written: 0,
        };

        let headers: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
        sink.write_record(&headers).await?;
        sink.flush().await?;

        Ok(sink)
    }

    /// Write one CSV record, escaping and encoding each field.
    async fn write_record(&mut self, fields: &[String]) -> Result<()> {
        let mut line: Vec<u8> = Vec::new();
        for (i, value) in fields.iter().enumerate() {
            if i > 0 {
                line.push(b',');
            }
            let escaped = escape_csv_value(value);
            let encoded = self.encoder.encode(&escaped, HEADERS[i])?;
            line.extend_from_slice(&encoded);
        }
        line.push(b'\n');

        self.writer
            .write_all(&line)
            .await
            .map_err(|e| SinkError::WriteFailed(e.to_string()))?;

        Ok(())
    }

    async fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .await
            .map_err(|e| SinkError::WriteFailed(e.to_string()))?;
        Ok(())
    }
}

/// Escape a CSV value if necessary.
fn escape_csv_value(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') || value.contains('\r') {
        // Wrap in quotes and escape internal quotes by doubling them
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[async_trait]
impl RecordSink for CsvSink {
    async fn write(&mut self, rows: &[FormattedRow]) -> Result<usize> {
        for row in rows {
            let fields = row.fields();
            self.write_record(&fields).await?;
        }

        // A page must be on disk before the next fetch starts.
        self.flush().await?;

        self.written += rows.len();
        debug!("Wrote {} rows to CSV (total: {})", rows.len(), self.written);

        Ok(rows.len())
    }

    async fn finalize(&mut self) -> Result<()> {
        self.flush().await?;

        debug!(
            "Finalized CSV file: {} ({} rows)",
            self.path.display(),
            self.written
        );
        Ok(())
    }

    async fn file_size(&self) -> Result<u64> {
        let metadata = tokio::fs::metadata(&self.path).await?;
        Ok(metadata.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::sink::encoding::{OutputEncoding, UnmappablePolicy};

    fn utf8_encoder() -> FieldEncoder {
        FieldEncoder::new(OutputEncoding::Utf8, UnmappablePolicy::Substitute)
    }

    fn sample_row() -> FormattedRow {
        FormattedRow {
            date: "2022-06-01".to_string(),
            datetime: "2022-06-01 15:30:00".to_string(),
            hostname: "www.example.jp".to_string(),
            pageview: 3,
            page_location: "/".to_string(),
            source_medium: "google / organic".to_string(),
            previous_page_path: "(entrance)".to_string(),
        }
    }

    #[tokio::test]
    async fn test_header_written_on_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::create(&path, utf8_encoder()).await.unwrap();
        sink.finalize().await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(
            content,
            "date,datetime,hostname,pageview,page_location,source_medium,previous_page_path\n"
        );
    }

    #[tokio::test]
    async fn test_write_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::create(&path, utf8_encoder()).await.unwrap();
        let written = sink.write(&[sample_row()]).await.unwrap();
        assert_eq!(written, 1);
        sink.finalize().await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "2022-06-01,2022-06-01 15:30:00,www.example.jp,3,/,google / organic,(entrance)"
        );
    }

    #[tokio::test]
    async fn test_value_with_comma_is_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::create(&path, utf8_encoder()).await.unwrap();
        let mut row = sample_row();
        row.source_medium = "partner, referral".to_string();
        sink.write(&[row]).await.unwrap();
        sink.finalize().await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(content.contains("\"partner, referral\""));
    }

    #[tokio::test]
    async fn test_shift_jis_bytes_in_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let encoder = FieldEncoder::new(OutputEncoding::ShiftJis, UnmappablePolicy::Substitute);
        let mut sink = CsvSink::create(&path, encoder).await.unwrap();
        let mut row = sample_row();
        row.page_location = "/東京".to_string();
        sink.write(&[row]).await.unwrap();
        sink.finalize().await.unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        let expected = [b'/', 0x93, 0x8C, 0x8B, 0x9E];
        assert!(bytes.windows(expected.len()).any(|window| window == expected));
    }

    #[tokio::test]
    async fn test_unencodable_value_aborts_when_strict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let encoder = FieldEncoder::new(OutputEncoding::ShiftJis, UnmappablePolicy::Fail);
        let mut sink = CsvSink::create(&path, encoder).await.unwrap();
        let mut row = sample_row();
        row.page_location = "/€".to_string();

        assert!(sink.write(&[row]).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("out.csv");

        assert!(CsvSink::create(&path, utf8_encoder()).await.is_err());
    }

    #[tokio::test]
    async fn test_file_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        let mut sink = CsvSink::create(&path, utf8_encoder()).await.unwrap();
        sink.write(&[sample_row()]).await.unwrap();
        sink.finalize().await.unwrap();

        let size = sink.file_size().await.unwrap();
        assert!(size > 0);
    }

    #[test]
    fn test_escape_csv_value() {
        assert_eq!(escape_csv_value("simple"), "simple");
        assert_eq!(escape_csv_value("with,comma"), "\"with,comma\"");
        assert_eq!(escape_csv_value("with\"quote"), "\"with\"\"quote\"");
        assert_eq!(escape_csv_value("with\nnewline"), "\"with\nnewline\"");
    }
}
