//! Source loading.
//!
//! Most callers go through a [`SnapshotSource`] (usually a [`SourceConfig`]) which loads each
//! dataset via [`load_dataset`]:
//!
//! - the backend is chosen by the [`SourceSpec`] (delimited text, spreadsheet, relational table)
//! - the table is read into an in-memory [`crate::types::DataSet`] with a discovered schema
//! - success/failure/alerts are optionally reported to an [`IngestionObserver`]
//!
//! Backend-specific functions are also available under:
//! - [`csv`]
//! - `excel` (feature `excel`)
//! - `sql` (feature `sqlite`)

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod infer;
pub mod observability;
pub mod sources;
#[cfg(feature = "sqlite")]
pub mod sql;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    StdErrObserver, TracingObserver,
};
pub use sources::{InMemorySource, SnapshotSource, SourceConfig};
pub use unified::{load_dataset, load_source, IngestionOptions, SourceFormat, SourceSpec};
