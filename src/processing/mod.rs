//! In-memory transformations over loaded datasets.
//!
//! The processing layer operates on [`crate::types::DataSet`] values produced by ingestion and
//! never mutates its inputs' sources: every operation returns a fresh dataset or record.
//!
//! - [`normalize()`]: canonical column names and canonical values for designated columns
//! - [`apply_filters()`]: multi-criteria row filtering
//! - [`compute_metrics()`]: headcount, turnover rate, recent hires/terminations
//! - [`distinct_values()`]: sorted choice lists for filter widgets
//!
//! ## Example: normalize → filter → metrics
//!
//! ```rust
//! use hr_reporting::processing::{apply_filters, compute_metrics, normalize, Criteria, FilterFields};
//! use hr_reporting::types::{DataSet, DataType, DatasetKind, Field, Schema, Value};
//!
//! let raw = DataSet::new(
//!     Schema::new(vec![
//!         Field::new("Name", DataType::Utf8),
//!         Field::new(" Category ", DataType::Utf8),
//!         Field::new("Terminated", DataType::Bool),
//!     ]),
//!     vec![
//!         vec![Value::from("John Smith"), Value::from("[partner]"), Value::Bool(false)],
//!         vec![Value::from("Bob Jones"), Value::from("associate"), Value::Bool(true)],
//!     ],
//! );
//!
//! let roster = normalize(DatasetKind::Roster, raw);
//! let partners = apply_filters(&roster, &Criteria::new().category(["Partner"]), &FilterFields::all());
//! assert_eq!(partners.row_count(), 1);
//!
//! let metrics = compute_metrics(&roster, None);
//! assert_eq!(metrics.turnover_rate_display(), "50.00%");
//! ```

pub mod distinct;
pub mod filter;
pub mod metrics;
pub mod normalize;

pub use distinct::distinct_values;
pub use filter::{apply_filters, Criteria, EmploymentStatus, FilterField, FilterFields, FilterProfiles};
pub use metrics::{compute_metrics, default_cutoff, MetricsRecord};
pub use normalize::{normalize, normalize_category, normalize_column_name};
