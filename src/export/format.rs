//! Row formatting for the output file
//!
//! Turns decoded [`ReportRow`]s into the flat records the CSV file is built
//! from: the compound timestamp dimension is split into separate date and
//! datetime columns, and the pageviews metric becomes a number.

use chrono::NaiveDateTime;

use crate::error::{Result, RowError};
use crate::reporting::ReportRow;

/// Column headers of the output file, in order.
pub const HEADERS: [&str; 7] = [
    "date",
    "datetime",
    "hostname",
    "pageview",
    "page_location",
    "source_medium",
    "previous_page_path",
];

/// Timestamp layout of the `ga:dateHourMinute` dimension.
const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M";

/// One output record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRow {
    pub date: String,
    pub datetime: String,
    pub hostname: String,
    pub pageview: i64,
    pub page_location: String,
    pub source_medium: String,
    pub previous_page_path: String,
}

impl FormattedRow {
    /// Field values in [`HEADERS`] order.
    pub fn fields(&self) -> [String; 7] {
        [
            self.date.clone(),
            self.datetime.clone(),
            self.hostname.clone(),
            self.pageview.to_string(),
            self.page_location.clone(),
            self.source_medium.clone(),
            self.previous_page_path.clone(),
        ]
    }
}

/// Format a batch of rows, aborting on the first malformed one.
pub fn format_rows(rows: &[ReportRow]) -> Result<Vec<FormattedRow>> {
    rows.iter().map(format_row).collect()
}

/// Format a single row.
pub fn format_row(row: &ReportRow) -> Result<FormattedRow> {
    let timestamp = NaiveDateTime::parse_from_str(&row.date_hour_minute, TIMESTAMP_FORMAT)
        .map_err(|_| RowError::InvalidTimestamp(row.date_hour_minute.clone()))?;

    Ok(FormattedRow {
        date: timestamp.format("%Y-%m-%d").to_string(),
        datetime: timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
        hostname: row.hostname.clone(),
        pageview: parse_pageviews(&row.pageviews),
        page_location: row.page_path.clone(),
        source_medium: row.source_medium.clone(),
        previous_page_path: row.previous_page_path.clone(),
    })
}

/// Parse a pageviews value leniently: leading digits count, anything after
/// them is dropped, and a value with no digits at all is zero.
fn parse_pageviews(raw: &str) -> i64 {
    let trimmed = raw.trim_start();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let mut value: i64 = 0;
    for c in digits.chars() {
        match c.to_digit(10) {
            Some(d) => value = value.saturating_mul(10).saturating_add(d as i64),
            None => break,
        }
    }

    sign * value
}
