//! Analytics Reporting API access
//!
//! Three pieces: [`request`] builds `batchGet` bodies from a [`ReportQuery`],
//! [`response`] decodes replies into pages of named rows, and [`client`]
//! carries the exchange over HTTP.

pub mod client;
pub mod request;
pub mod response;

pub use client::{AnalyticsClient, ReportSource, REPORTING_ENDPOINT};
pub use request::{DimensionFilter, ReportQuery, PAGE_SIZE};
pub use response::{ReportPage, ReportRow};
