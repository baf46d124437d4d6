//! The four raw sources behind a snapshot.
//!
//! [`SnapshotSource`] is the seam between the store and the storage backends: a
//! [`SourceConfig`] loads from files or a database, an [`InMemorySource`] hands out tables the
//! host already holds.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DatasetKind};

use super::unified::{load_dataset, IngestionOptions, SourceSpec};

/// Produces the raw (un-normalized) table for each dataset.
pub trait SnapshotSource {
    /// Load the raw table for `kind`.
    fn load_raw(&self, kind: DatasetKind, options: &IngestionOptions) -> IngestionResult<DataSet>;
}

/// One [`SourceSpec`] per dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub roster: SourceSpec,
    pub provider: SourceSpec,
    pub directory: SourceSpec,
    pub terminated: SourceSpec,
}

impl SourceConfig {
    /// The deployment's file layout under `dir`: a delimited roster and three workbooks.
    pub fn local_files(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let roster = SourceSpec::Delimited {
            path: dir.join(DatasetKind::Roster.default_file()),
            delimiter: None,
        };
        let sheet = |kind: DatasetKind| SourceSpec::Spreadsheet {
            path: dir.join(kind.default_file()),
            sheet: None,
        };
        Self {
            roster,
            provider: sheet(DatasetKind::Provider),
            directory: sheet(DatasetKind::Directory),
            terminated: sheet(DatasetKind::Terminated),
        }
    }

    /// All four datasets as tables of one SQLite database.
    pub fn relational(database: impl AsRef<Path>) -> Self {
        let database = database.as_ref();
        let table = |kind: DatasetKind| SourceSpec::table(database, kind.default_table());
        Self {
            roster: table(DatasetKind::Roster),
            provider: table(DatasetKind::Provider),
            directory: table(DatasetKind::Directory),
            terminated: table(DatasetKind::Terminated),
        }
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(input: &str) -> IngestionResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Read a configuration file. Relative source paths resolve against the file's directory.
    pub fn from_json_path(path: impl AsRef<Path>) -> IngestionResult<Self> {
        read_json_config(path.as_ref(), Self::resolve_relative_to)
    }

    /// Join every relative source path onto `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for kind in DatasetKind::ALL {
            self.spec_mut(kind).resolve_relative_to(base);
        }
    }

    /// The [`SourceSpec`] for `kind`.
    pub fn spec(&self, kind: DatasetKind) -> &SourceSpec {
        match kind {
            DatasetKind::Roster => &self.roster,
            DatasetKind::Provider => &self.provider,
            DatasetKind::Directory => &self.directory,
            DatasetKind::Terminated => &self.terminated,
        }
    }

    fn spec_mut(&mut self, kind: DatasetKind) -> &mut SourceSpec {
        match kind {
            DatasetKind::Roster => &mut self.roster,
            DatasetKind::Provider => &mut self.provider,
            DatasetKind::Directory => &mut self.directory,
            DatasetKind::Terminated => &mut self.terminated,
        }
    }
}

impl SnapshotSource for SourceConfig {
    fn load_raw(&self, kind: DatasetKind, options: &IngestionOptions) -> IngestionResult<DataSet> {
        load_dataset(kind, self.spec(kind), options)
    }
}

/// Read a JSON configuration file, then let `resolve` rebase its relative paths onto the file's
/// directory.
pub(crate) fn read_json_config<T, F>(path: &Path, resolve: F) -> IngestionResult<T>
where
    T: DeserializeOwned,
    F: FnOnce(&mut T, &Path),
{
    let text = fs::read_to_string(path).map_err(|e| IngestionError::unavailable(path.display(), e))?;
    let mut config: T = serde_json::from_str(&text)?;
    if let Some(base) = path.parent() {
        resolve(&mut config, base);
    }
    Ok(config)
}

/// Raw tables supplied directly by the host.
///
/// Loading clones the stored table, so the raw form stays available to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct InMemorySource {
    pub roster: DataSet,
    pub provider: DataSet,
    pub directory: DataSet,
    pub terminated: DataSet,
}

impl SnapshotSource for InMemorySource {
    fn load_raw(&self, kind: DatasetKind, _options: &IngestionOptions) -> IngestionResult<DataSet> {
        let ds = match kind {
            DatasetKind::Roster => &self.roster,
            DatasetKind::Provider => &self.provider,
            DatasetKind::Directory => &self.directory,
            DatasetKind::Terminated => &self.terminated,
        };
        if ds.schema.is_empty() {
            return Err(IngestionError::SchemaEmpty {
                location: format!("memory:{kind}"),
            });
        }
        Ok(ds.clone())
    }
}
