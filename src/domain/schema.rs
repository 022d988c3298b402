//! Ordered feature schema and the model-ready record aligned to it.

use std::collections::HashSet;
use std::sync::Arc;

use super::features::FeatureError;

/// The ordered column names a classifier expects.
///
/// Built once when the artifact is loaded and shared by every
/// [`ModelRecord`] produced against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    columns: Arc<[String]>,
}

impl FeatureSchema {
    /// Build a schema from column names in model order.
    ///
    /// # Errors
    /// Returns `FeatureError::Schema` if the list is empty, contains a blank
    /// name, or repeats a name.
    pub fn new<I, S>(columns: I) -> Result<Self, FeatureError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(FeatureError::Schema(
                "expected column list is empty".to_string(),
            ));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if name.trim().is_empty() {
                return Err(FeatureError::Schema(
                    "expected column list contains a blank name".to_string(),
                ));
            }
            if !seen.insert(name.as_str()) {
                return Err(FeatureError::Schema(format!(
                    "column {name:?} appears more than once"
                )));
            }
        }

        Ok(Self {
            columns: columns.into(),
        })
    }

    /// Column names in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always false for a constructed schema.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column, if present.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }
}

/// A numeric feature vector whose columns are exactly its schema's columns.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRecord {
    schema: FeatureSchema,
    values: Vec<f64>,
}

impl ModelRecord {
    /// Pair values with a schema.
    ///
    /// # Errors
    /// Returns `FeatureError::Schema` if the lengths differ.
    pub fn new(schema: FeatureSchema, values: Vec<f64>) -> Result<Self, FeatureError> {
        if values.len() != schema.len() {
            return Err(FeatureError::Schema(format!(
                "record has {} values but schema has {} columns",
                values.len(),
                schema.len()
            )));
        }
        Ok(Self { schema, values })
    }

    /// Values already produced by walking `schema.columns()`.
    pub(super) fn aligned(schema: FeatureSchema, values: Vec<f64>) -> Self {
        debug_assert_eq!(values.len(), schema.len());
        Self { schema, values }
    }

    #[must_use]
    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        self.schema.columns()
    }

    /// Values in schema order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of a named column.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|i| self.values[i])
    }

    /// `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.columns()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_rejects_empty() {
        let err = FeatureSchema::new(Vec::<String>::new()).expect_err("empty");
        assert!(matches!(err, FeatureError::Schema(_)));
    }

    #[test]
    fn test_schema_rejects_duplicates_and_blanks() {
        assert!(FeatureSchema::new(["age", "chol", "age"]).is_err());
        assert!(FeatureSchema::new(["age", " "]).is_err());
    }

    #[test]
    fn test_schema_preserves_order() {
        let schema = FeatureSchema::new(["thal_2", "age", "cp_0"]).expect("schema");
        assert_eq!(schema.columns(), ["thal_2", "age", "cp_0"]);
        assert_eq!(schema.position("age"), Some(1));
        assert!(!schema.contains("chol"));
    }

    #[test]
    fn test_record_length_must_match() {
        let schema = FeatureSchema::new(["a", "b"]).expect("schema");
        assert!(ModelRecord::new(schema.clone(), vec![1.0]).is_err());

        let record = ModelRecord::new(schema, vec![1.0, 2.0]).expect("record");
        assert_eq!(record.get("b"), Some(2.0));
        assert_eq!(record.get("c"), None);
        assert_eq!(record.iter().count(), 2);
    }
}
