//! Error handling for the exporter.
//!
//! Every failure in this crate is fatal: the remote call is not retried, a
//! malformed row is not skipped, and a sink failure is not recovered. The
//! kinds below exist so the operator can tell which collaborator failed,
//! not so callers can branch on them.

pub mod kinds;

// Re-export commonly used types
pub use kinds::{ConfigError, ExportError, Result, RowError, SinkError, SourceError};
