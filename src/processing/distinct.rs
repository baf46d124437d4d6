//! Distinct column values, used to populate filter choice lists.

use crate::types::{DataSet, Value};

/// Sorted, de-duplicated non-null values of `column`. Empty when the column is absent.
pub fn distinct_values(dataset: &DataSet, column: &str) -> Vec<Value> {
    let Some(values) = dataset.column_values(column) else {
        return Vec::new();
    };
    let mut out: Vec<Value> = values.filter(|v| !v.is_null()).cloned().collect();
    out.sort_by(Value::total_cmp);
    out.dedup_by(|a, b| a.total_cmp(b).is_eq());
    out
}

#[cfg(test)]
mod tests {
    use super::distinct_values;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    #[test]
    fn sorted_unique_and_null_free() {
        let schema = Schema::new(vec![Field::new("category", DataType::Utf8)]);
        let ds = DataSet::new(
            schema,
            ["Partner", "Associate", "Partner", "", "Locum"]
                .into_iter()
                .map(|s| vec![if s.is_empty() { Value::Null } else { Value::from(s) }])
                .collect(),
        );
        assert_eq!(
            distinct_values(&ds, "category"),
            vec![Value::from("Associate"), Value::from("Locum"), Value::from("Partner")]
        );
    }

    #[test]
    fn absent_column_yields_no_choices() {
        let ds = DataSet::new(Schema::new(vec![]), vec![]);
        assert!(distinct_values(&ds, "location").is_empty());
    }
}
