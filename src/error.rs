use std::fmt;

use thiserror::Error;

/// Convenience result type for loading operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by source loading and snapshot construction.
///
/// Every variant is fatal to snapshot construction. Conditions the pipeline recovers from
/// (absent optional columns, unparsable dates) never surface as errors.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// A configured source could not be opened or read.
    #[error("source unavailable: {location}: {cause}")]
    SourceUnavailable {
        location: String,
        #[source]
        cause: SourceCause,
    },

    /// A source loaded with zero columns.
    #[error("schema empty: {location} yielded zero columns")]
    SchemaEmpty { location: String },

    /// The source description cannot be served (unknown extension, disabled backend, missing sheet).
    #[error("unsupported source: {message}")]
    UnsupportedSource { message: String },

    /// Malformed pipeline configuration.
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

impl IngestionError {
    /// Wrap a backend failure as [`IngestionError::SourceUnavailable`].
    pub fn unavailable(location: impl fmt::Display, cause: impl Into<SourceCause>) -> Self {
        Self::SourceUnavailable {
            location: location.to_string(),
            cause: cause.into(),
        }
    }

    /// Returns `true` for [`IngestionError::SourceUnavailable`].
    pub fn is_source_unavailable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }
}

/// Underlying backend failure behind [`IngestionError::SourceUnavailable`].
#[derive(Debug, Error)]
pub enum SourceCause {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Delimited-text decoding error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "excel")]
    /// Spreadsheet error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[cfg(feature = "sqlite")]
    /// Relational store error (feature-gated behind `sqlite`).
    #[error("sql error: {0}")]
    Sql(#[from] rusqlite::Error),
}
