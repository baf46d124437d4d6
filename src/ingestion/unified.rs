//! Unified loading entrypoint.
//!
//! Every backend is described by a [`SourceSpec`] and loaded through [`load_source`] (or
//! [`load_dataset`] when the load is part of a snapshot). If an
//! [`super::observability::IngestionObserver`] is configured, success/failure/alerts are
//! reported to it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DatasetKind};

use super::csv;
use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats};

/// Supported source backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Delimited text with a header row.
    Delimited,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Spreadsheet,
    /// Relational table (feature-gated behind `sqlite`).
    Relational,
}

impl SourceFormat {
    /// Parse a file backend from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" | "tsv" | "txt" => Some(Self::Delimited),
            "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Some(Self::Spreadsheet),
            _ => None,
        }
    }
}

/// Where and how to load one raw dataset.
///
/// Deserializes from a `kind`-tagged object, e.g.
/// `{"kind": "spreadsheet", "path": "MILV HR Directory.xlsx"}` or
/// `{"kind": "relational", "database": "hr.db", "table": "hr_data"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceSpec {
    /// Delimited text; the delimiter defaults to tab for `.tsv` files and comma otherwise.
    Delimited {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        delimiter: Option<char>,
    },
    /// One sheet of a workbook; the first sheet when `sheet` is omitted.
    Spreadsheet {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sheet: Option<String>,
    },
    /// A whole table of a SQLite database.
    Relational { database: PathBuf, table: String },
}

impl SourceSpec {
    /// Describe a file source, choosing the backend from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> IngestionResult<Self> {
        let path = path.into();
        match infer_format_from_path(&path)? {
            SourceFormat::Spreadsheet => Ok(Self::Spreadsheet { path, sheet: None }),
            _ => Ok(Self::Delimited { path, delimiter: None }),
        }
    }

    /// Describe a relational table.
    pub fn table(database: impl Into<PathBuf>, table: impl Into<String>) -> Self {
        Self::Relational {
            database: database.into(),
            table: table.into(),
        }
    }

    /// The backend this spec is served by.
    pub fn format(&self) -> SourceFormat {
        match self {
            Self::Delimited { .. } => SourceFormat::Delimited,
            Self::Spreadsheet { .. } => SourceFormat::Spreadsheet,
            Self::Relational { .. } => SourceFormat::Relational,
        }
    }

    /// Human-readable location used in logs and errors.
    pub fn location(&self) -> String {
        match self {
            Self::Delimited { path, .. } => path.display().to_string(),
            Self::Spreadsheet { path, sheet: None } => path.display().to_string(),
            Self::Spreadsheet {
                path,
                sheet: Some(sheet),
            } => format!("{}:{sheet}", path.display()),
            Self::Relational { database, table } => format!("{}#{table}", database.display()),
        }
    }

    /// Join relative paths onto `base`. Absolute paths are left alone.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        let path = match self {
            Self::Delimited { path, .. } | Self::Spreadsheet { path, .. } => path,
            Self::Relational { database, .. } => database,
        };
        if path.is_relative() {
            *path = base.join(&*path);
        }
    }
}

impl fmt::Display for SourceSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

/// Options controlling load reporting.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Load one raw dataset from `spec`.
///
/// When an observer is configured, this function reports:
///
/// - `on_success` on success, with row/column counts
/// - `on_failure` on failure, with a computed severity
/// - `on_alert` on failure when the computed severity is >= `options.alert_at_or_above`
///
/// # Examples
///
/// ```no_run
/// use hr_reporting::ingestion::{load_source, IngestionOptions, SourceSpec};
///
/// # fn main() -> Result<(), hr_reporting::IngestionError> {
/// let spec = SourceSpec::from_path("HRdata.csv")?;
/// let raw = load_source(&spec, &IngestionOptions::default())?;
/// println!("rows={} columns={}", raw.row_count(), raw.schema.len());
/// # Ok(())
/// # }
/// ```
pub fn load_source(spec: &SourceSpec, options: &IngestionOptions) -> IngestionResult<DataSet> {
    load_with_context(None, spec, options)
}

/// Load the raw table for `kind` from `spec`; the dataset name is included in observer context.
pub fn load_dataset(kind: DatasetKind, spec: &SourceSpec, options: &IngestionOptions) -> IngestionResult<DataSet> {
    load_with_context(Some(kind), spec, options)
}

fn load_with_context(
    dataset: Option<DatasetKind>,
    spec: &SourceSpec,
    options: &IngestionOptions,
) -> IngestionResult<DataSet> {
    let ctx = IngestionContext {
        dataset,
        location: spec.location(),
        format: spec.format(),
    };

    let result = dispatch(spec).and_then(|ds| {
        if ds.schema.is_empty() {
            Err(IngestionError::SchemaEmpty {
                location: ctx.location.clone(),
            })
        } else {
            Ok(ds)
        }
    });

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(ds) => obs.on_success(
                &ctx,
                IngestionStats {
                    rows: ds.row_count(),
                    columns: ds.schema.len(),
                },
            ),
            Err(e) => {
                let sev = IngestionSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn dispatch(spec: &SourceSpec) -> IngestionResult<DataSet> {
    match spec {
        SourceSpec::Delimited { path, delimiter } => {
            let delimiter = resolve_delimiter(path, *delimiter)?;
            csv::ingest_csv_from_path(path, delimiter)
        }
        SourceSpec::Spreadsheet { path, sheet } => ingest_excel_dispatch(path, sheet.as_deref()),
        SourceSpec::Relational { database, table } => ingest_sql_dispatch(database, table),
    }
}

fn resolve_delimiter(path: &Path, delimiter: Option<char>) -> IngestionResult<u8> {
    let c = match delimiter {
        Some(c) => c,
        None => match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("tsv") => '\t',
            _ => ',',
        },
    };
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| IngestionError::UnsupportedSource {
            message: format!("delimiter {c:?} is not a single ASCII character"),
        })
}

fn infer_format_from_path(path: &Path) -> IngestionResult<SourceFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::UnsupportedSource {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    SourceFormat::from_extension(ext).ok_or_else(|| IngestionError::UnsupportedSource {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

fn ingest_excel_dispatch(path: &Path, sheet: Option<&str>) -> IngestionResult<DataSet> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, sheet);

    #[cfg(feature = "excel")]
    {
        super::excel::ingest_excel_from_path(path, sheet)
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(IngestionError::UnsupportedSource {
            message: "spreadsheet ingestion not enabled (enable cargo feature 'excel')".to_string(),
        })
    }
}

fn ingest_sql_dispatch(database: &Path, table: &str) -> IngestionResult<DataSet> {
    let _ = (database, table);

    #[cfg(feature = "sqlite")]
    {
        super::sql::ingest_table_from_path(database, table)
    }

    #[cfg(not(feature = "sqlite"))]
    {
        Err(IngestionError::UnsupportedSource {
            message: "relational ingestion not enabled (enable cargo feature 'sqlite')".to_string(),
        })
    }
}
