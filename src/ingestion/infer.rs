//! Column type discovery for untyped (delimited-text) sources.
//!
//! Every non-missing cell of a column must parse as the candidate type for the column to take
//! it; otherwise the column falls back to `Utf8`.

use crate::types::{DataType, Value};

/// Cell text that loads as [`Value::Null`] (after trimming).
pub const MISSING_TOKENS: &[&str] = &["", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "#N/A"];

/// Returns `true` if `raw` (trimmed) is empty or a missing-value token.
pub fn is_missing(raw: &str) -> bool {
    MISSING_TOKENS.contains(&raw.trim())
}

/// Infer the type of a text column from its raw cells.
pub fn infer_text_column<'a>(cells: impl IntoIterator<Item = &'a str>) -> DataType {
    let mut candidate: Option<DataType> = None;
    for raw in cells {
        if is_missing(raw) {
            continue;
        }
        let cell_type = text_cell_type(raw.trim());
        candidate = Some(match candidate {
            None => cell_type,
            Some(current) => widen_text(current, cell_type),
        });
        if candidate == Some(DataType::Utf8) {
            break;
        }
    }
    candidate.unwrap_or(DataType::Utf8)
}

/// Convert one raw cell to a [`Value`] of the column's inferred type.
///
/// Surrounding whitespace is ignored when parsing typed cells. Text cells, and cells that do not
/// fit `data_type`, keep their raw text.
pub fn parse_text_cell(data_type: DataType, raw: &str) -> Value {
    if is_missing(raw) {
        return Value::Null;
    }
    let trimmed = raw.trim();
    let parsed = match data_type {
        DataType::Bool => parse_bool_literal(trimmed).map(Value::Bool),
        DataType::Int64 => trimmed.parse::<i64>().ok().map(Value::Int64),
        DataType::Float64 => trimmed.parse::<f64>().ok().map(Value::Float64),
        DataType::Utf8 | DataType::Date | DataType::Mixed => None,
    };
    parsed.unwrap_or_else(|| Value::Utf8(raw.to_owned()))
}

fn text_cell_type(s: &str) -> DataType {
    if parse_bool_literal(s).is_some() {
        DataType::Bool
    } else if s.parse::<i64>().is_ok() {
        DataType::Int64
    } else if s.parse::<f64>().is_ok() {
        DataType::Float64
    } else {
        DataType::Utf8
    }
}

fn widen_text(a: DataType, b: DataType) -> DataType {
    match a.widen(b) {
        DataType::Mixed => DataType::Utf8,
        other => other,
    }
}

/// Literal booleans only; `1`/`0` stay numeric at load time.
fn parse_bool_literal(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_bool_int_float_and_text() {
        assert_eq!(infer_text_column(["True", "false", ""]), DataType::Bool);
        assert_eq!(infer_text_column(["1", " 2 ", "N/A"]), DataType::Int64);
        assert_eq!(infer_text_column(["1", "2.5"]), DataType::Float64);
        assert_eq!(infer_text_column(["1", "two"]), DataType::Utf8);
        assert_eq!(infer_text_column(["true", "1"]), DataType::Utf8);
        assert_eq!(infer_text_column(["", "NA"]), DataType::Utf8);
    }

    #[test]
    fn parses_cells_by_column_type() {
        assert_eq!(parse_text_cell(DataType::Bool, "TRUE"), Value::Bool(true));
        assert_eq!(parse_text_cell(DataType::Int64, " 42 "), Value::Int64(42));
        assert_eq!(parse_text_cell(DataType::Float64, "2"), Value::Float64(2.0));
        assert_eq!(parse_text_cell(DataType::Utf8, " Ada "), Value::from(" Ada "));
        assert_eq!(parse_text_cell(DataType::Int64, " n/k "), Value::from(" n/k "));
        assert_eq!(parse_text_cell(DataType::Int64, "#N/A"), Value::Null);
        assert_eq!(parse_text_cell(DataType::Utf8, "   "), Value::Null);
    }
}
