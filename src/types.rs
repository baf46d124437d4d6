//! Core data model types.
//!
//! Every source is loaded into an in-memory [`DataSet`]: a [`Schema`] discovered from the source's
//! header (a list of named, typed [`Field`]s) plus row-major [`Value`] storage.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// The four logical datasets of a snapshot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Primary HR table (one row per employee).
    Roster,
    /// Provider worksheet.
    Provider,
    /// HR directory.
    Directory,
    /// Terminated-employee list.
    Terminated,
}

impl DatasetKind {
    /// All datasets, in load order.
    pub const ALL: [DatasetKind; 4] = [
        DatasetKind::Roster,
        DatasetKind::Provider,
        DatasetKind::Directory,
        DatasetKind::Terminated,
    ];

    /// Lowercase dataset name.
    pub fn name(self) -> &'static str {
        match self {
            DatasetKind::Roster => "roster",
            DatasetKind::Provider => "provider",
            DatasetKind::Directory => "directory",
            DatasetKind::Terminated => "terminated",
        }
    }

    /// Table name used by the relational backend.
    pub fn default_table(self) -> &'static str {
        match self {
            DatasetKind::Roster => "hr_data",
            DatasetKind::Provider => "provider_data",
            DatasetKind::Directory => "directory_data",
            DatasetKind::Terminated => "terminated_data",
        }
    }

    /// File name used by the file backends.
    pub fn default_file(self) -> &'static str {
        match self {
            DatasetKind::Roster => "HRdata.csv",
            DatasetKind::Provider => "MILV - Provider Worksheet.xlsx",
            DatasetKind::Directory => "MILV HR Directory.xlsx",
            DatasetKind::Terminated => "Terminated Radiologists.xlsx",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Logical data type for a schema field, discovered at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
    /// Calendar date without time of day.
    Date,
    /// Heterogeneous cell types (spreadsheet and relational sources only).
    Mixed,
}

impl DataType {
    /// The type a column holding both `self` and `other` values is reported as.
    pub fn widen(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => DataType::Float64,
            _ => DataType::Mixed,
        }
    }

    /// Infer a column type from its values. Nulls are ignored; an all-null column is `Utf8`.
    pub fn infer<'a>(values: impl IntoIterator<Item = &'a Value>) -> DataType {
        values
            .into_iter()
            .filter_map(Value::data_type)
            .reduce(DataType::widen)
            .unwrap_or(DataType::Utf8)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// The ordered column list of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Returns `true` if a field named `name` exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
    /// Calendar date.
    Date(NaiveDate),
}

impl Value {
    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The [`DataType`] of this value, or `None` for `Null`.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Bool(_) => Some(DataType::Bool),
            Value::Utf8(_) => Some(DataType::Utf8),
            Value::Date(_) => Some(DataType::Date),
        }
    }

    /// Borrow the string payload, if this is a `Utf8` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a `Bool` value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the date payload, if this is a `Date` value.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Total order used for sorted choice lists.
    ///
    /// Values of different kinds order as `Null < Bool < numbers < Date < Utf8`; integers and
    /// floats compare numerically with each other.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Int64(_) | Value::Float64(_) => 2,
                Value::Date(_) => 3,
                Value::Utf8(_) => 4,
            }
        }

        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
            (Value::Int64(a), Value::Float64(b)) => (*a as f64).total_cmp(b),
            (Value::Float64(a), Value::Int64(b)) => a.total_cmp(&(*b as f64)),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Utf8(a), Value::Utf8(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Utf8(v) => f.write_str(v),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Int64(v) => serializer.serialize_i64(*v),
            Value::Float64(v) => serializer.serialize_f64(*v),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Utf8(v) => serializer.serialize_str(v),
            Value::Date(v) => v.serialize(serializer),
        }
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

const NULL: &Value = &Value::Null;

/// Pair every schema field with its cell in `row`; cells past the end of a short row are `Null`.
fn cells<'a>(schema: &'a Schema, row: &'a [Value]) -> impl Iterator<Item = (&'a Field, &'a Value)> {
    schema
        .fields
        .iter()
        .enumerate()
        .map(move |(idx, field)| (field, row.get(idx).unwrap_or(NULL)))
}

/// A present column of a [`DataSet`], returned by [`DataSet::column`].
///
/// Holding a `Column` is proof the column exists; absent columns are reported as `None` by the
/// lookup instead of failing later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column<'a> {
    /// Position of the column in the schema.
    pub index: usize,
    /// The schema field for the column.
    pub field: &'a Field,
}

impl Column<'_> {
    /// The cell of this column in `row`. Short rows read as `Null`.
    pub fn get<'r>(&self, row: &'r [Value]) -> &'r Value {
        row.get(self.index).unwrap_or(NULL)
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<Column<'_>> {
        let index = self.schema.index_of(name)?;
        Some(Column {
            index,
            field: &self.schema.fields[index],
        })
    }

    /// Iterate the values of column `name`, or `None` if the column is absent.
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &Value>> {
        let col = self.column(name)?;
        Some(self.rows.iter().map(move |row| col.get(row)))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema and row order.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }

    /// Replace every cell of column `index` with `f(cell)`, in place.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds for the schema.
    pub fn map_column<F>(&mut self, index: usize, mut f: F)
    where
        F: FnMut(&Value) -> Value,
    {
        assert!(
            index < self.schema.fields.len(),
            "column index {index} out of bounds for schema length {}",
            self.schema.fields.len()
        );
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                *cell = f(&*cell);
            }
        }
    }

    /// Reduce (fold) all rows into an accumulator value.
    ///
    /// This is similar to `Iterator::fold`, but provides each row as `&[Value]`.
    pub fn reduce_rows<A, F>(&self, init: A, mut reducer: F) -> A
    where
        F: FnMut(A, &[Value]) -> A,
    {
        self.rows
            .iter()
            .fold(init, |acc, row| reducer(acc, row.as_slice()))
    }

    /// Render rows as a JSON array of objects keyed by column name.
    pub fn to_json_records(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.rows
                .iter()
                .map(|row| {
                    let obj = cells(&self.schema, row)
                        .map(|(field, value)| {
                            let json = serde_json::to_value(value).unwrap_or(serde_json::Value::Null);
                            (field.name.clone(), json)
                        })
                        .collect();
                    serde_json::Value::Object(obj)
                })
                .collect(),
        )
    }
}

/// Serializes as a sequence of row objects, the same shape as [`DataSet::to_json_records`].
impl Serialize for DataSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeSeq;

        struct Row<'a>(&'a Schema, &'a [Value]);

        impl Serialize for Row<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for (field, value) in cells(self.0, self.1) {
                    map.serialize_entry(&field.name, value)?;
                }
                map.end()
            }
        }

        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&Row(&self.schema, row))?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> DataSet {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("active", DataType::Bool),
            Field::new("name", DataType::Utf8),
        ]);

        let rows = vec![
            vec![Value::Int64(1), Value::Bool(true), Value::Utf8("a".to_string())],
            vec![Value::Int64(2), Value::Bool(false), Value::Utf8("b".to_string())],
            vec![Value::Int64(3), Value::Bool(true), Value::Utf8("c".to_string())],
        ];

        DataSet::new(schema, rows)
    }

    #[test]
    fn column_lookup_reports_presence() {
        let ds = sample_dataset();
        let col = ds.column("name").unwrap();
        assert_eq!(col.index, 2);
        assert_eq!(col.field.data_type, DataType::Utf8);
        assert!(ds.column("missing").is_none());
        assert!(ds.column_values("missing").is_none());
    }

    #[test]
    fn column_get_tolerates_short_rows() {
        let ds = sample_dataset();
        let col = ds.column("name").unwrap();
        assert_eq!(col.get(&[Value::Int64(9)]), &Value::Null);
    }

    #[test]
    fn filter_rows_preserves_order_and_source() {
        let ds = sample_dataset();
        let active = ds.column("active").unwrap();
        let out = ds.filter_rows(|row| active.get(row) == &Value::Bool(true));

        assert_eq!(out.schema, ds.schema);
        assert_eq!(out.rows, vec![ds.rows[0].clone(), ds.rows[2].clone()]);
        assert_eq!(ds.row_count(), 3);
    }

    #[test]
    fn map_column_rewrites_one_column() {
        let mut ds = sample_dataset();
        ds.map_column(2, |v| match v {
            Value::Utf8(s) => Value::Utf8(s.to_uppercase()),
            other => other.clone(),
        });
        assert_eq!(ds.rows[1][2], Value::from("B"));
        assert_eq!(ds.rows[1][0], Value::Int64(2));
    }

    #[test]
    fn infer_widens_numbers_and_flags_mixed() {
        assert_eq!(DataType::infer(&[Value::Int64(1), Value::Null]), DataType::Int64);
        assert_eq!(
            DataType::infer(&[Value::Int64(1), Value::Float64(2.5)]),
            DataType::Float64
        );
        assert_eq!(
            DataType::infer(&[Value::Int64(1), Value::from("x")]),
            DataType::Mixed
        );
        assert_eq!(DataType::infer(&[Value::Null]), DataType::Utf8);
    }

    #[test]
    fn total_cmp_orders_across_kinds() {
        let mut values = vec![
            Value::from("b"),
            Value::Float64(1.5),
            Value::Int64(1),
            Value::from("a"),
            Value::Bool(true),
        ];
        values.sort_by(Value::total_cmp);
        assert_eq!(
            values,
            vec![
                Value::Bool(true),
                Value::Int64(1),
                Value::Float64(1.5),
                Value::from("a"),
                Value::from("b"),
            ]
        );
    }

    #[test]
    fn json_records_render_dates_as_iso_strings() {
        let schema = Schema::new(vec![
            Field::new("name", DataType::Utf8),
            Field::new("hire_date", DataType::Date),
        ]);
        let ds = DataSet::new(
            schema,
            vec![vec![
                Value::from("Ada"),
                Value::Date(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            ]],
        );
        let json = ds.to_json_records();
        assert_eq!(json[0]["name"], "Ada");
        assert_eq!(json[0]["hire_date"], "2024-01-15");
        assert_eq!(serde_json::to_value(&ds).unwrap(), json);
    }

    #[test]
    fn json_records_fill_short_rows_with_null() {
        let schema = Schema::new(vec![
            Field::new("name", DataType::Utf8),
            Field::new("location", DataType::Utf8),
            Field::new("extension", DataType::Utf8),
        ]);
        let ds = DataSet::new(schema, vec![vec![Value::from("Ada")], vec![]]);

        let json = ds.to_json_records();
        let first = json[0].as_object().unwrap();
        assert_eq!(first.len(), 3);
        assert_eq!(first["name"], "Ada");
        assert!(first["location"].is_null());
        assert!(first["extension"].is_null());
        assert_eq!(json[1].as_object().unwrap().len(), 3);
        assert_eq!(serde_json::to_value(&ds).unwrap(), json);
    }
}
