#![cfg(feature = "excel")]

//! Spreadsheet ingestion.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use chrono::{NaiveDate, TimeDelta};

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Load one sheet of a workbook (`.xlsx`, `.xls`, `.ods`, etc.) into an in-memory `DataSet`.
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Keeps cells in their native type; column types are inferred from the cells
/// - Skips fully blank data rows
pub fn ingest_excel_from_path(path: impl AsRef<Path>, sheet_name: Option<&str>) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let location = path.display().to_string();
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestionError::unavailable(&location, e))?;

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| IngestionError::SchemaEmpty {
                location: location.clone(),
            })?,
    };
    if !workbook.sheet_names().iter().any(|s| *s == sheet) {
        return Err(IngestionError::UnsupportedSource {
            message: format!("sheet '{sheet}' not found in {location}"),
        });
    }

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| IngestionError::unavailable(&location, e))?;
    ingest_sheet_range(&format!("{location}:{sheet}"), &range)
}

fn ingest_sheet_range(location: &str, range: &calamine::Range<Data>) -> IngestionResult<DataSet> {
    let mut rows_iter = range.rows().skip_while(|row| is_blank(row));
    let header_cells: Vec<String> = match rows_iter.next() {
        Some(row) => row
            .iter()
            .enumerate()
            .map(|(idx, c)| match cell_to_header_string(c) {
                s if s.trim().is_empty() => format!("Unnamed: {idx}"),
                s => s,
            })
            .collect(),
        None => {
            return Err(IngestionError::SchemaEmpty {
                location: location.to_owned(),
            });
        }
    };

    let width = header_cells.len();
    let rows: Vec<Vec<Value>> = rows_iter
        .filter(|row| !is_blank(row))
        .map(|row| {
            (0..width)
                .map(|idx| row.get(idx).map(convert_cell).unwrap_or(Value::Null))
                .collect()
        })
        .collect();

    let fields = header_cells
        .into_iter()
        .enumerate()
        .map(|(idx, name)| Field::new(name, DataType::infer(rows.iter().filter_map(|r| r.get(idx)))))
        .collect();

    Ok(DataSet::new(Schema::new(fields), rows))
}

fn is_blank(row: &[Data]) -> bool {
    row.iter().all(|c| matches!(c, Data::Empty))
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => excel_serial_to_string(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(_) | Data::Empty => String::new(),
    }
}

fn convert_cell(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::Utf8(excel_serial_to_string(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Utf8(s.clone()),
    }
}

/// Render an Excel date serial (days since 1899-12-30, fraction = time of day) as
/// `YYYY-MM-DD HH:MM:SS`.
///
/// Serials outside the calendar range (or not finite) are rendered as the plain number.
fn excel_serial_to_string(serial: f64) -> String {
    if !serial.is_finite() {
        return serial.to_string();
    }
    let days = serial.floor();
    let secs = ((serial - days) * 86_400.0).round() as i64;
    let date_time = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.and_hms_opt(0, 0, 0))
        .zip(TimeDelta::try_days(days as i64))
        .and_then(|(base, days)| base.checked_add_signed(days))
        .zip(TimeDelta::try_seconds(secs))
        .and_then(|(date_time, secs)| date_time.checked_add_signed(secs));
    match date_time {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => serial.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excel_serial_renders_date_and_time() {
        assert_eq!(excel_serial_to_string(45306.0), "2024-01-15 00:00:00");
        assert_eq!(excel_serial_to_string(45306.5), "2024-01-15 12:00:00");
    }

    #[test]
    fn out_of_range_serials_render_as_numbers() {
        assert_eq!(excel_serial_to_string(1.0e15), "1000000000000000");
        assert_eq!(excel_serial_to_string(3.0e8), "300000000");
        assert_eq!(excel_serial_to_string(-1.0e15), "-1000000000000000");
        assert_eq!(excel_serial_to_string(f64::NAN), "NaN");
        assert_eq!(excel_serial_to_string(f64::INFINITY), "inf");
    }

    #[test]
    fn blank_strings_and_error_cells_load_as_null() {
        assert_eq!(convert_cell(&Data::String("  ".to_string())), Value::Null);
        assert_eq!(convert_cell(&Data::Empty), Value::Null);
        assert_eq!(convert_cell(&Data::Int(3)), Value::Int64(3));
    }
}
