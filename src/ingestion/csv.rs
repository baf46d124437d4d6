//! Delimited-text ingestion.

use std::path::Path;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{DataSet, Field, Schema};

use super::infer::{infer_text_column, parse_text_cell};

/// Load a delimited-text file into an in-memory [`DataSet`].
///
/// Rules:
///
/// - The first record is the header row; its cells become the column names as written.
/// - Column types are discovered from the data (see [`super::infer`]).
/// - A header with zero columns is [`IngestionError::SchemaEmpty`].
pub fn ingest_csv_from_path(path: impl AsRef<Path>, delimiter: u8) -> IngestionResult<DataSet> {
    let path = path.as_ref();
    let location = path.display().to_string();
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| IngestionError::unavailable(&location, e))?;
    ingest_csv_from_reader(&mut rdr, &location)
}

/// Load delimited text from an existing CSV reader.
///
/// `location` names the source in errors.
pub fn ingest_csv_from_reader<R: std::io::Read>(
    rdr: &mut csv::Reader<R>,
    location: &str,
) -> IngestionResult<DataSet> {
    let headers = rdr
        .headers()
        .map_err(|e| IngestionError::unavailable(location, e))?
        .clone();
    if headers.is_empty() {
        return Err(IngestionError::SchemaEmpty {
            location: location.to_owned(),
        });
    }

    let mut records: Vec<csv::StringRecord> = Vec::new();
    for result in rdr.records() {
        records.push(result.map_err(|e| IngestionError::unavailable(location, e))?);
    }

    let fields: Vec<Field> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let data_type = infer_text_column(records.iter().map(|r| r.get(idx).unwrap_or("")));
            Field::new(name, data_type)
        })
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            fields
                .iter()
                .enumerate()
                .map(|(idx, field)| parse_text_cell(field.data_type, record.get(idx).unwrap_or("")))
                .collect()
        })
        .collect();

    tracing::debug!(location, columns = fields.len(), "decoded delimited source");
    Ok(DataSet::new(Schema::new(fields), rows))
}
