//! Response decoding for `batchGet` replies
//!
//! The API returns rows as positional dimension and metric arrays. Decoding
//! binds each one to named fields right away, so a malformed row is rejected
//! here instead of surfacing later while formatting output.

use serde::Deserialize;

use crate::error::{Result, RowError, SourceError};

use super::request::DIMENSIONS;

/* ===== Wire format ===== */

/// Top-level `batchGet` response body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReportsResponse {
    #[serde(default)]
    pub reports: Vec<Report>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    #[serde(default)]
    pub data: ReportData,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    #[serde(default)]
    pub rows: Vec<WireRow>,
    #[serde(default)]
    pub row_count: u64,
}

/// A row as the API sends it: positional value arrays.
#[derive(Debug, Deserialize)]
pub struct WireRow {
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub metrics: Vec<MetricValues>,
}

#[derive(Debug, Deserialize)]
pub struct MetricValues {
    #[serde(default)]
    pub values: Vec<String>,
}

/* ===== Decoded types ===== */

/// A report row with dimensions bound to their names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub date_hour_minute: String,
    pub hostname: String,
    pub page_path: String,
    pub source_medium: String,
    pub previous_page_path: String,
    /// Raw pageviews value exactly as returned by the API.
    pub pageviews: String,
}

impl ReportRow {
    fn from_wire(row: WireRow) -> Result<Self> {
        let dimensions: [String; 5] =
            row.dimensions
                .try_into()
                .map_err(|got: Vec<String>| RowError::MissingDimensions {
                    expected: DIMENSIONS.len(),
                    found: got.len(),
                })?;

        let pageviews = row
            .metrics
            .into_iter()
            .next()
            .and_then(|metric| metric.values.into_iter().next())
            .ok_or(RowError::MissingMetrics {
                expected: 1,
                found: 0,
            })?;

        let [date_hour_minute, hostname, page_path, source_medium, previous_page_path] = dimensions;

        Ok(Self {
            date_hour_minute,
            hostname,
            page_path,
            source_medium,
            previous_page_path,
            pageviews,
        })
    }
}

/// One decoded page of report data.
#[derive(Debug, Clone)]
pub struct ReportPage {
    pub rows: Vec<ReportRow>,
    /// Rows matching the query across all pages, not just this one.
    pub row_count: u64,
    /// Cursor for the next page, absent on the last one.
    pub next_page_token: Option<String>,
}

impl ReportPage {
    /// Decode the first report of a `batchGet` response.
    pub fn from_response(response: GetReportsResponse) -> Result<Self> {
        let report = response
            .reports
            .into_iter()
            .next()
            .ok_or(SourceError::EmptyResponse)?;

        let row_count = report.data.row_count;
        let rows = report
            .data
            .rows
            .into_iter()
            .map(ReportRow::from_wire)
            .collect::<Result<Vec<_>>>()?;

        // The API marks the last page with a missing token; an empty string
        // means the same thing.
        let next_page_token = report.next_page_token.filter(|token| !token.is_empty());

        Ok(Self {
            rows,
            row_count,
            next_page_token,
        })
    }
}
