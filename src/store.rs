//! Canonical snapshot and its store.
//!
//! [`HrStore`] owns a [`SnapshotSource`] and builds the [`Snapshot`] (all four datasets, loaded and
//! normalized together) on first use. Later calls return the cached snapshot until
//! [`HrStore::reload`] or [`HrStore::clear`].

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::IngestionResult;
use crate::ingestion::sources::read_json_config;
use crate::ingestion::{IngestionOptions, SnapshotSource, SourceConfig};
use crate::processing::{
    apply_filters, compute_metrics, distinct_values, normalize, Criteria, FilterProfiles, MetricsRecord,
};
use crate::types::{DataSet, DatasetKind, Value};

/// Sources plus per-dataset filter fields, as read from a configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub sources: SourceConfig,
    #[serde(default)]
    pub filters: FilterProfiles,
}

impl PipelineConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(input: &str) -> IngestionResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read a configuration file. Relative source paths resolve against the file's directory.
    pub fn from_json_path(path: impl AsRef<Path>) -> IngestionResult<Self> {
        read_json_config(path.as_ref(), |config: &mut Self, base: &Path| {
            config.sources.resolve_relative_to(base)
        })
    }
}

/// The four canonical datasets as of one load. Read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    roster: DataSet,
    provider: DataSet,
    directory: DataSet,
    terminated: DataSet,
    filters: FilterProfiles,
}

impl Snapshot {
    /// Load and normalize all four datasets. Any failure aborts the whole build.
    pub fn build<S>(source: &S, filters: FilterProfiles, options: &IngestionOptions) -> IngestionResult<Self>
    where
        S: SnapshotSource + ?Sized,
    {
        let load = |kind: DatasetKind| -> IngestionResult<DataSet> {
            let raw = source.load_raw(kind, options)?;
            Ok(normalize(kind, raw))
        };
        Ok(Self {
            roster: load(DatasetKind::Roster)?,
            provider: load(DatasetKind::Provider)?,
            directory: load(DatasetKind::Directory)?,
            terminated: load(DatasetKind::Terminated)?,
            filters,
        })
    }

    /// The canonical dataset for `kind`.
    pub fn dataset(&self, kind: DatasetKind) -> &DataSet {
        match kind {
            DatasetKind::Roster => &self.roster,
            DatasetKind::Provider => &self.provider,
            DatasetKind::Directory => &self.directory,
            DatasetKind::Terminated => &self.terminated,
        }
    }

    pub fn roster(&self) -> &DataSet {
        &self.roster
    }

    pub fn provider(&self) -> &DataSet {
        &self.provider
    }

    pub fn directory(&self) -> &DataSet {
        &self.directory
    }

    pub fn terminated(&self) -> &DataSet {
        &self.terminated
    }

    /// The filter fields each dataset recognizes.
    pub fn filter_profiles(&self) -> &FilterProfiles {
        &self.filters
    }

    /// Sorted non-null values of `column` in `kind`, for filter choice lists.
    pub fn list_distinct_values(&self, kind: DatasetKind, column: &str) -> Vec<Value> {
        distinct_values(self.dataset(kind), column)
    }

    /// Rows of `kind` matching `criteria`, as a fresh dataset.
    pub fn apply_filters(&self, kind: DatasetKind, criteria: &Criteria) -> DataSet {
        apply_filters(self.dataset(kind), criteria, self.filters.for_kind(kind))
    }

    /// Metrics over the whole of `kind`.
    pub fn compute_metrics(&self, kind: DatasetKind, cutoff: Option<NaiveDate>) -> MetricsRecord {
        compute_metrics(self.dataset(kind), cutoff)
    }
}

/// Owns a source and the snapshot built from it.
pub struct HrStore<S> {
    source: S,
    filters: FilterProfiles,
    options: IngestionOptions,
    cached: Option<Arc<Snapshot>>,
}

impl<S: SnapshotSource> HrStore<S> {
    /// Create a store; nothing is loaded until [`Self::load`].
    pub fn new(source: S, filters: FilterProfiles, options: IngestionOptions) -> Self {
        Self {
            source,
            filters,
            options,
            cached: None,
        }
    }

    /// The current snapshot, building it on first use.
    pub fn load(&mut self) -> IngestionResult<Arc<Snapshot>> {
        if let Some(snapshot) = &self.cached {
            tracing::debug!("returning cached snapshot");
            return Ok(Arc::clone(snapshot));
        }
        self.reload()
    }

    /// Rebuild the snapshot from the sources.
    ///
    /// On failure the previously cached snapshot (if any) is kept.
    pub fn reload(&mut self) -> IngestionResult<Arc<Snapshot>> {
        let snapshot = Arc::new(Snapshot::build(&self.source, self.filters.clone(), &self.options)?);
        tracing::info!(
            roster = snapshot.roster.row_count(),
            provider = snapshot.provider.row_count(),
            directory = snapshot.directory.row_count(),
            terminated = snapshot.terminated.row_count(),
            "snapshot built"
        );
        self.cached = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// The cached snapshot, without loading.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.cached.clone()
    }

    /// Whether a snapshot is cached.
    pub fn is_loaded(&self) -> bool {
        self.cached.is_some()
    }

    /// Drop the cached snapshot; the next [`Self::load`] rebuilds it.
    pub fn clear(&mut self) {
        self.cached = None;
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl HrStore<SourceConfig> {
    /// Create a store from a [`PipelineConfig`].
    pub fn from_config(config: PipelineConfig, options: IngestionOptions) -> Self {
        Self::new(config.sources, config.filters, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestionError;
    use crate::ingestion::InMemorySource;
    use crate::processing::{EmploymentStatus, FilterField, FilterFields};
    use crate::types::{DataType, Field, Schema};
    use std::cell::Cell;

    fn table(names: &[&str], rows: Vec<Vec<Value>>) -> DataSet {
        let fields = names.iter().map(|n| Field::new(*n, DataType::Utf8)).collect();
        DataSet::new(Schema::new(fields), rows)
    }

    fn raw_tables() -> InMemorySource {
        InMemorySource {
            roster: table(
                &["Name", "Category", "Terminated", "Location"],
                vec![
                    vec![Value::from("John Smith"), Value::from("[partner]"), Value::Bool(false), Value::from("North")],
                    vec![Value::from("Jane Doe"), Value::from("Associate"), Value::Bool(true), Value::from("South")],
                ],
            ),
            provider: table(&["Provider Name"], vec![vec![Value::from("John Smith")]]),
            directory: table(&["Name", "Extension"], vec![]),
            terminated: table(
                &["MILV\nRadiologist", "Termination Date"],
                vec![vec![Value::from("Jane Doe"), Value::from("2024-03-01")]],
            ),
        }
    }

    struct CountingSource {
        inner: InMemorySource,
        loads: Cell<usize>,
        fail: Cell<bool>,
    }

    impl SnapshotSource for CountingSource {
        fn load_raw(&self, kind: DatasetKind, options: &IngestionOptions) -> IngestionResult<DataSet> {
            if kind == DatasetKind::Roster {
                self.loads.set(self.loads.get() + 1);
            }
            if self.fail.get() && kind == DatasetKind::Directory {
                return Err(IngestionError::unavailable(
                    "directory.xlsx",
                    std::io::Error::from(std::io::ErrorKind::NotFound),
                ));
            }
            self.inner.load_raw(kind, options)
        }
    }

    fn counting_store() -> HrStore<CountingSource> {
        let source = CountingSource {
            inner: raw_tables(),
            loads: Cell::new(0),
            fail: Cell::new(false),
        };
        HrStore::new(source, FilterProfiles::default(), IngestionOptions::default())
    }

    #[test]
    fn load_is_memoized_until_reload() {
        let mut store = counting_store();
        assert!(!store.is_loaded());
        let first = store.load().unwrap();
        let second = store.load().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.source().loads.get(), 1);

        let third = store.reload().unwrap();
        assert!(!Arc::ptr_eq(&first, &third));
        assert_eq!(store.source().loads.get(), 2);

        store.clear();
        assert!(store.snapshot().is_none());
        store.load().unwrap();
        assert_eq!(store.source().loads.get(), 3);
    }

    #[test]
    fn failed_load_returns_no_partial_snapshot() {
        let mut store = counting_store();
        store.source().fail.set(true);
        let err = store.load().unwrap_err();
        assert!(err.is_source_unavailable());
        assert!(!store.is_loaded());
    }

    #[test]
    fn failed_reload_keeps_previous_snapshot() {
        let mut store = counting_store();
        let first = store.load().unwrap();
        store.source().fail.set(true);
        assert!(store.reload().is_err());
        assert!(Arc::ptr_eq(&store.snapshot().unwrap(), &first));
    }

    #[test]
    fn snapshot_is_canonical() {
        let mut store = counting_store();
        let snapshot = store.load().unwrap();

        assert_eq!(snapshot.roster().rows[0][1], Value::from("Partner"));
        let terminated_names: Vec<&str> = snapshot.terminated().schema.field_names().collect();
        assert_eq!(terminated_names, vec!["name", "termination date"]);
        assert!(snapshot.provider().schema.contains("provider name"));
        assert_eq!(snapshot.dataset(DatasetKind::Directory).row_count(), 0);
    }

    #[test]
    fn presentation_queries_read_the_snapshot() {
        let mut store = counting_store();
        let snapshot = store.load().unwrap();

        assert_eq!(
            snapshot.list_distinct_values(DatasetKind::Roster, "category"),
            vec![Value::from("Associate"), Value::from("Partner")]
        );

        let active = snapshot.apply_filters(
            DatasetKind::Roster,
            &Criteria::new().employment(EmploymentStatus::Active),
        );
        assert_eq!(active.row_count(), 1);

        // The terminated list only recognizes the name criterion.
        let criteria = Criteria::new().name_contains("jane").location(["North"]);
        assert_eq!(snapshot.apply_filters(DatasetKind::Terminated, &criteria).row_count(), 1);
        assert_eq!(snapshot.apply_filters(DatasetKind::Roster, &criteria).row_count(), 0);

        let metrics = snapshot.compute_metrics(DatasetKind::Roster, None);
        assert_eq!((metrics.total, metrics.active, metrics.terminated), (2, 1, 1));
        assert_eq!(metrics.turnover_rate, 50.0);
    }

    #[test]
    fn filter_profiles_are_configurable() {
        let filters = FilterProfiles {
            roster: FilterFields::only([FilterField::Name]),
            ..FilterProfiles::default()
        };
        let mut store = HrStore::new(raw_tables(), filters, IngestionOptions::default());
        let snapshot = store.load().unwrap();
        let out = snapshot.apply_filters(DatasetKind::Roster, &Criteria::new().location(["North"]));
        assert_eq!(out.row_count(), 2);
    }

    #[test]
    fn pipeline_config_defaults_filters() {
        let config = PipelineConfig::from_json_str(
            r#"{"sources": {
                "roster": {"kind": "relational", "database": "hr.db", "table": "hr_data"},
                "provider": {"kind": "relational", "database": "hr.db", "table": "provider_data"},
                "directory": {"kind": "relational", "database": "hr.db", "table": "directory_data"},
                "terminated": {"kind": "relational", "database": "hr.db", "table": "terminated_data"}
            }}"#,
        )
        .unwrap();
        assert_eq!(config.sources, SourceConfig::relational("hr.db"));
        assert_eq!(config.filters, FilterProfiles::default());
    }
}
