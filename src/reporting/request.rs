//! Report query definition and request body construction
//!
//! A [`ReportQuery`] captures everything one `batchGet` call needs: the view,
//! the date range, the optional dimension filter, and the pagination cursor.
//! Between pages only the cursor changes, advanced through
//! [`ReportQuery::set_page_token`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rows requested per page.
pub const PAGE_SIZE: u32 = 2000;

/// Dimensions queried for every row, in wire order.
pub const DIMENSIONS: [&str; 5] = [
    "ga:dateHourMinute",
    "ga:hostname",
    "ga:pagePath",
    "ga:sourceMedium",
    "ga:previousPagePath",
];

const METRIC_EXPRESSION: &str = "ga:pageviews";
const METRIC_ALIAS: &str = "pageviews";

/// Rows are ordered by this dimension so the output file stays chronological.
const ORDER_BY_FIELD: &str = "ga:dateHourMinute";

/// A single dimension filter clause.
///
/// Uses the API's filter vocabulary directly: `dimension` names a `ga:`
/// dimension, `operator` is one of the API's match operators (`EXACT`,
/// `REGEXP`, ...), and `expressions` holds the operands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionFilter {
    pub dimension: String,
    pub operator: String,
    pub expressions: Vec<String>,
}

/// One report query, including its pagination state.
#[derive(Debug, Clone)]
pub struct ReportQuery {
    view_id: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    filter: Option<DimensionFilter>,
    page_size: u32,
    page_token: Option<String>,
}

impl ReportQuery {
    /// Create a query for the given view and date range.
    pub fn new(
        view_id: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        filter: Option<DimensionFilter>,
    ) -> Self {
        Self {
            view_id: view_id.into(),
            start_date,
            end_date,
            filter,
            page_size: PAGE_SIZE,
            page_token: None,
        }
    }

    /// Override the page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn view_id(&self) -> &str {
        &self.view_id
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_token(&self) -> Option<&str> {
        self.page_token.as_deref()
    }

    /// Advance the pagination cursor for the next request.
    pub fn set_page_token(&mut self, token: Option<String>) {
        self.page_token = token;
    }

    /// File name the export is written under.
    pub fn output_file_name(&self) -> String {
        format!(
            "export_data-{}-{}_{}.csv",
            self.view_id, self.start_date, self.end_date
        )
    }

    /// Build the JSON body for one `batchGet` call.
    pub fn to_request_body(&self) -> GetReportsRequest {
        let dimension_filter_clauses = match &self.filter {
            Some(filter) => vec![DimensionFilterClause {
                filters: vec![FilterExpression {
                    dimension_name: filter.dimension.clone(),
                    operator: filter.operator.clone(),
                    expressions: filter.expressions.clone(),
                }],
            }],
            None => Vec::new(),
        };

        GetReportsRequest {
            report_requests: vec![ReportRequest {
                view_id: self.view_id.clone(),
                date_ranges: vec![DateRange {
                    start_date: self.start_date.format("%Y-%m-%d").to_string(),
                    end_date: self.end_date.format("%Y-%m-%d").to_string(),
                }],
                metrics: vec![Metric {
                    expression: METRIC_EXPRESSION.to_string(),
                    alias: METRIC_ALIAS.to_string(),
                }],
                dimensions: DIMENSIONS
                    .iter()
                    .map(|name| Dimension {
                        name: name.to_string(),
                    })
                    .collect(),
                order_bys: vec![OrderBy {
                    field_name: ORDER_BY_FIELD.to_string(),
                    sort_order: "ASCENDING".to_string(),
                }],
                dimension_filter_clauses,
                page_size: self.page_size,
                page_token: self.page_token.clone(),
            }],
        }
    }
}

/* ===== Wire format ===== */

/// Top-level `batchGet` request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetReportsRequest {
    pub report_requests: Vec<ReportRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub view_id: String,
    pub date_ranges: Vec<DateRange>,
    pub metrics: Vec<Metric>,
    pub dimensions: Vec<Dimension>,
    pub order_bys: Vec<OrderBy>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimension_filter_clauses: Vec<DimensionFilterClause>,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
pub struct Metric {
    pub expression: String,
    pub alias: String,
}

#[derive(Debug, Serialize)]
pub struct Dimension {
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBy {
    pub field_name: String,
    pub sort_order: String,
}

#[derive(Debug, Serialize)]
pub struct DimensionFilterClause {
    pub filters: Vec<FilterExpression>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterExpression {
    pub dimension_name: String,
    pub operator: String,
    pub expressions: Vec<String>,
}
