//! Headcount and turnover metrics.

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{DataSet, Value};

use super::normalize::parse_date;

/// Start of the deployment's reporting year; hosts pass it as the default cutoff.
pub fn default_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Summary statistics over one dataset.
///
/// `recent_hires` / `recent_terminations` are `None` when no cutoff was given or when the
/// dataset has no `hire_date` / `termination_date` column, which is distinct from a count of zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRecord {
    /// Record count.
    pub total: usize,
    /// Records with `terminated == false`.
    pub active: usize,
    /// Records with `terminated == true`.
    pub terminated: usize,
    /// `terminated / total * 100`, rounded to two decimals; `0.0` for an empty dataset.
    pub turnover_rate: f64,
    /// Records hired on or after the cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_hires: Option<usize>,
    /// Records terminated on or after the cutoff.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_terminations: Option<usize>,
}

impl MetricsRecord {
    /// Turnover rate as display text, e.g. `"40.00%"`.
    pub fn turnover_rate_display(&self) -> String {
        format!("{:.2}%", self.turnover_rate)
    }
}

/// Percentage of `part` in `total`, rounded to two decimals. Zero when `total` is zero.
pub fn turnover_rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = part as f64 * 100.0 / total as f64;
    (pct * 100.0).round() / 100.0
}

/// Count rows whose `column` holds a date on or after `cutoff`.
///
/// Date text is parsed the same way the roster's date columns are, so datasets that skip date
/// coercion still count. Returns `None` when the column is absent. Null and unparsable cells
/// never count.
pub fn count_on_or_after(dataset: &DataSet, column: &str, cutoff: NaiveDate) -> Option<usize> {
    let values = dataset.column_values(column)?;
    Some(values.filter(|v| parse_date(v).is_some_and(|d| d >= cutoff)).count())
}

/// Compute [`MetricsRecord`] over `dataset`.
pub fn compute_metrics(dataset: &DataSet, cutoff: Option<NaiveDate>) -> MetricsRecord {
    let total = dataset.row_count();
    let (active, terminated) = match dataset.column("terminated") {
        Some(col) => dataset.reduce_rows((0usize, 0usize), |(active, terminated), row| match col.get(row) {
            Value::Bool(false) => (active + 1, terminated),
            Value::Bool(true) => (active, terminated + 1),
            _ => (active, terminated),
        }),
        None => (0, 0),
    };

    MetricsRecord {
        total,
        active,
        terminated,
        turnover_rate: turnover_rate(terminated, total),
        recent_hires: cutoff.and_then(|c| count_on_or_after(dataset, "hire_date", c)),
        recent_terminations: cutoff.and_then(|c| count_on_or_after(dataset, "termination_date", c)),
    }
}
