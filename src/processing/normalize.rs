//! Schema normalization: canonical column names and canonical values for the designated columns.
//!
//! Every step is guarded by a column lookup and is a no-op when its column is absent. Every step
//! is idempotent, so normalizing an already-canonical dataset returns it unchanged.

use chrono::{NaiveDate, NaiveDateTime};

use crate::types::{DataSet, DataType, DatasetKind, Value};

/// Raw terminated-list column renamed to `name` (canonical form).
pub const TERMINATED_NAME_ALIAS: &str = "milv_radiologist";

/// Roster columns coerced to calendar dates.
pub const DATE_COLUMNS: [&str; 3] = ["hire_date", "rehire_date", "termination_date"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y", "%Y/%m/%d", "%d-%b-%Y", "%B %d, %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Canonicalize a column name: trim, lowercase, newlines to underscores.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace('\n', "_")
}

/// Canonicalize a category label: trim, lowercase, drop `[`/`]`, trim again, title-case.
///
/// `" [partner] "` becomes `"Partner"`.
pub fn normalize_category(raw: &str) -> String {
    let stripped: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '[' | ']'))
        .collect();
    title_case(stripped.trim())
}

/// Upper-case the first letter of every run of letters and lower-case the rest.
///
/// Any non-letter starts a new word, so `"o'neil"` becomes `"O'Neil"`. A first letter whose
/// upper-case form is several characters (`'ß'`, `'ﬁ'`) is kept as is.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                let mut upper = c.to_uppercase();
                match (upper.next(), upper.next()) {
                    (Some(u), None) => out.push(u),
                    _ => out.push(c),
                }
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

/// Parse a cell as a calendar date, dropping any time of day.
///
/// Returns `None` for anything unparsable, which the date coercion turns into `Null`.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::Date(d) => Some(*d),
        Value::Utf8(s) => parse_date_str(s),
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok().map(|dt| dt.date()))
        .or_else(|| DATE_FORMATS.iter().find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok()))
}

/// Coerce a cell to a boolean flag; anything not recognizably boolean becomes `None`.
pub fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Int64(i) => Some(*i != 0),
        Value::Float64(f) => Some(*f != 0.0),
        Value::Utf8(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" => Some(true),
            "false" | "f" | "0" | "no" | "n" => Some(false),
            _ => None,
        },
        Value::Null | Value::Date(_) => None,
    }
}

/// Rename every column to its canonical form.
pub fn normalize_column_names(dataset: &mut DataSet) {
    for field in &mut dataset.schema.fields {
        field.name = normalize_column_name(&field.name);
    }
}

/// Rename `from` to `to` if `from` exists. Returns `true` if a rename happened.
///
/// Skipped (with a warning) when `to` already exists, so column names stay unique.
pub fn rename_column(dataset: &mut DataSet, from: &str, to: &str) -> bool {
    let Some(idx) = dataset.schema.index_of(from) else {
        return false;
    };
    if dataset.schema.contains(to) {
        tracing::warn!(from, to, "rename skipped: target column already exists");
        return false;
    }
    dataset.schema.fields[idx].name = to.to_string();
    true
}

/// Coerce each present date column to [`Value::Date`]; unparsable cells become `Null`.
pub fn coerce_date_columns(dataset: &mut DataSet, columns: &[&str]) {
    for name in columns {
        let Some(idx) = dataset.schema.index_of(name) else {
            continue;
        };
        let mut unparsed = 0usize;
        dataset.map_column(idx, |v| match parse_date(v) {
            Some(d) => Value::Date(d),
            None => {
                if !v.is_null() {
                    unparsed += 1;
                }
                Value::Null
            }
        });
        dataset.schema.fields[idx].data_type = DataType::Date;
        if unparsed > 0 {
            tracing::debug!(column = *name, unparsed, "unparsable dates coerced to null");
        }
    }
}

/// Standardize category labels with [`normalize_category`]. Non-string cells pass through.
pub fn standardize_category(dataset: &mut DataSet, column: &str) {
    let Some(idx) = dataset.schema.index_of(column) else {
        return;
    };
    dataset.map_column(idx, |v| match v {
        Value::Utf8(s) => Value::Utf8(normalize_category(s)),
        other => other.clone(),
    });
}

/// Coerce a flag column to [`Value::Bool`] with [`parse_flag`].
pub fn coerce_flag_column(dataset: &mut DataSet, column: &str) {
    let Some(idx) = dataset.schema.index_of(column) else {
        return;
    };
    dataset.map_column(idx, |v| parse_flag(v).map(Value::Bool).unwrap_or(Value::Null));
    dataset.schema.fields[idx].data_type = DataType::Bool;
}

/// Produce the canonical form of a raw dataset.
///
/// Column names are canonicalized for every dataset. The terminated list additionally gets its
/// name alias; the roster gets date, category, and terminated-flag coercion.
pub fn normalize(kind: DatasetKind, mut dataset: DataSet) -> DataSet {
    normalize_column_names(&mut dataset);
    match kind {
        DatasetKind::Terminated => {
            if rename_column(&mut dataset, TERMINATED_NAME_ALIAS, "name") {
                tracing::debug!(dataset = %kind, from = TERMINATED_NAME_ALIAS, "renamed column to name");
            }
        }
        DatasetKind::Roster => {
            coerce_date_columns(&mut dataset, &DATE_COLUMNS);
            standardize_category(&mut dataset, "category");
            coerce_flag_column(&mut dataset, "terminated");
        }
        DatasetKind::Provider | DatasetKind::Directory => {}
    }
    dataset
}
