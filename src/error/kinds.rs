use std::{fmt, io};

/// Crate-wide `Result` type using [`ExportError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Top-level error type for export operations.
///
/// Wraps the more specific error kinds so that every fallible path in the
/// crate can share a single error type. Every kind is fatal: the export
/// aborts on the first error and whatever rows were already written stay
/// in the output file.
#[derive(Debug)]
pub enum ExportError {
    /// The remote reporting API could not be reached or rejected the call.
    Source(SourceError),

    /// A report row did not have the expected shape.
    Row(RowError),

    /// The output file could not be opened or written.
    Sink(SinkError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),
}

/// Report-source errors.
///
/// Remote fetch failures are terminal; retry policy is deliberately out of
/// scope, so these propagate unchanged to the top level.
#[derive(Debug)]
pub enum SourceError {
    /// The HTTP request itself failed (connect, DNS, TLS, timeout).
    RequestFailed(String),

    /// The API answered with a non-success status.
    ApiStatus { status: u16, body: String },

    /// The response body was not a valid reports payload.
    DecodeFailed(String),

    /// The response carried no report object.
    EmptyResponse,

    /// The credentials file could not be read.
    Credentials { path: String, detail: String },
}

/// Malformed-row errors.
///
/// Raised while converting a raw API row into the named row struct, or
/// while formatting it for output. One bad row aborts the whole export;
/// there is no partial-row skipping.
#[derive(Debug)]
pub enum RowError {
    /// The row carried fewer dimension values than the query requested.
    MissingDimensions { expected: usize, found: usize },

    /// The row carried no metric value.
    MissingMetrics { expected: usize, found: usize },

    /// Dimension 0 was not a `YYYYMMDDHHmm` timestamp.
    InvalidTimestamp(String),
}

/// Output-sink errors.
#[derive(Debug)]
pub enum SinkError {
    /// The output file could not be created.
    CreateFailed { path: String, detail: String },

    /// The output directory does not exist.
    DirectoryMissing(String),

    /// Writing or flushing the output file failed.
    WriteFailed(String),

    /// A field contained a character outside the target character set and
    /// the unmappable-character policy is `Fail`.
    Unencodable { character: char, field: String },
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Config file could not be read.
    ReadFailed { path: String, detail: String },

    /// Invalid config format.
    InvalidFormat(String),

    /// Missing required field.
    MissingField(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Source(e) => write!(f, "Report source unavailable: {e}"),
            ExportError::Row(e) => write!(f, "Malformed row: {e}"),
            ExportError::Sink(e) => write!(f, "Output sink error: {e}"),
            ExportError::Config(e) => write!(f, "Configuration error: {e}"),
            ExportError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::RequestFailed(msg) => write!(f, "request failed: {msg}"),
            SourceError::ApiStatus { status, body } => {
                write!(f, "API returned status {status}: {body}")
            }
            SourceError::DecodeFailed(msg) => write!(f, "could not decode response: {msg}"),
            SourceError::EmptyResponse => write!(f, "response carried no report"),
            SourceError::Credentials { path, detail } => {
                write!(f, "cannot read credentials file '{path}': {detail}")
            }
        }
    }
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowError::MissingDimensions { expected, found } => {
                write!(f, "expected {expected} dimension values, found {found}")
            }
            RowError::MissingMetrics { expected, found } => {
                write!(f, "expected {expected} metric values, found {found}")
            }
            RowError::InvalidTimestamp(value) => {
                write!(f, "'{value}' is not a YYYYMMDDHHmm timestamp")
            }
        }
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkError::CreateFailed { path, detail } => {
                write!(f, "cannot create '{path}': {detail}")
            }
            SinkError::DirectoryMissing(dir) => {
                write!(f, "output directory does not exist: {dir}")
            }
            SinkError::WriteFailed(msg) => write!(f, "write failed: {msg}"),
            SinkError::Unencodable { character, field } => {
                write!(
                    f,
                    "character '{character}' (U+{:04X}) in field '{field}' has no Shift_JIS mapping",
                    *character as u32
                )
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "config file not found: {path}"),
            ConfigError::ReadFailed { path, detail } => {
                write!(f, "cannot read config file '{path}': {detail}")
            }
            ConfigError::InvalidFormat(msg) => write!(f, "invalid config format: {msg}"),
            ConfigError::MissingField(field) => write!(f, "missing required field: {field}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for ExportError {}
impl std::error::Error for SourceError {}
impl std::error::Error for RowError {}
impl std::error::Error for SinkError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to ExportError ========================= */

impl From<io::Error> for ExportError {
    fn from(err: io::Error) -> Self {
        ExportError::Io(err)
    }
}

impl From<SourceError> for ExportError {
    fn from(err: SourceError) -> Self {
        ExportError::Source(err)
    }
}

impl From<RowError> for ExportError {
    fn from(err: RowError) -> Self {
        ExportError::Row(err)
    }
}

impl From<SinkError> for ExportError {
    fn from(err: SinkError) -> Self {
        ExportError::Sink(err)
    }
}

impl From<ConfigError> for ExportError {
    fn from(err: ConfigError) -> Self {
        ExportError::Config(err)
    }
}
