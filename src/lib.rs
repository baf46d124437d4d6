//! `hr-reporting` is a read-only reporting engine for a practice's HR records. It loads four raw
//! tables (roster, provider worksheet, phone directory, terminated radiologists) into in-memory
//! [`types::DataSet`]s, normalizes them into a canonical shape, and answers filter and metrics
//! queries over the result.
//!
//! The primary entrypoint is [`store::HrStore`], which owns a [`ingestion::SnapshotSource`] and
//! builds a [`store::Snapshot`] on first use.
//!
//! ## Sources
//!
//! Each dataset is described by an [`ingestion::SourceSpec`]:
//!
//! - **Delimited text**: `.csv`, `.tsv`, `.txt` (header row required)
//! - **Spreadsheets** (requires the Cargo feature `excel`): `.xlsx`, `.xls`, `.xlsm`, `.xlsb`, `.ods`
//! - **Relational tables** (requires the Cargo feature `sqlite`): one table of a SQLite database
//!
//! Schemas are discovered from the source. Cells are typed [`types::Value`]s; empty cells and
//! common missing-value markers (`NA`, `N/A`, `null`, ...) map to [`types::Value::Null`].
//!
//! ## Quick example: load a snapshot and report on it
//!
//! ```no_run
//! use hr_reporting::ingestion::{IngestionOptions, SourceConfig};
//! use hr_reporting::processing::{default_cutoff, Criteria, EmploymentStatus};
//! use hr_reporting::store::HrStore;
//! use hr_reporting::types::DatasetKind;
//!
//! # fn main() -> Result<(), hr_reporting::IngestionError> {
//! let sources = SourceConfig::local_files("data");
//! let mut store = HrStore::new(sources, Default::default(), IngestionOptions::default());
//! let snapshot = store.load()?;
//!
//! let metrics = snapshot.compute_metrics(DatasetKind::Roster, Some(default_cutoff()));
//! println!("turnover={}", metrics.turnover_rate_display());
//!
//! let active = snapshot.apply_filters(
//!     DatasetKind::Roster,
//!     &Criteria::new().employment(EmploymentStatus::Active),
//! );
//! println!("active rows={}", active.row_count());
//! # Ok(())
//! # }
//! ```
//!
//! A [`store::PipelineConfig`] can also be read from JSON:
//!
//! ```no_run
//! use hr_reporting::ingestion::IngestionOptions;
//! use hr_reporting::store::{HrStore, PipelineConfig};
//!
//! # fn main() -> Result<(), hr_reporting::IngestionError> {
//! let config = PipelineConfig::from_json_path("pipeline.json")?;
//! let mut store = HrStore::from_config(config, IngestionOptions::default());
//! println!("roster rows={}", store.load()?.roster().row_count());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`ingestion`]: source descriptions, backends, and load observers
//! - [`processing`]: normalization, filtering, metrics, distinct values
//! - [`store`]: the snapshot and its load/reload lifecycle
//! - [`types`]: schema + in-memory dataset types
//! - [`error`]: error types used across loading

pub mod error;
pub mod ingestion;
pub mod processing;
pub mod store;
pub mod types;

pub use error::{IngestionError, IngestionResult};
pub use store::{HrStore, PipelineConfig, Snapshot};
