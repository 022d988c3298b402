//! Feature engineering: raw patient attributes to a model-ready record.
//!
//! The derived features and the one-hot naming must match what the model
//! was trained with. Expansion runs on a single row, so only the submitted
//! category of each enumerated attribute produces an indicator; every other
//! indicator the schema expects is zero-filled during reconciliation.

use std::collections::HashMap;

use super::patient::{Categorical, RawRecord};
use super::schema::{FeatureSchema, ModelRecord};

/// Cholesterol (mg/dl) above which `high_chol` is set.
pub const HIGH_CHOL_THRESHOLD: u32 = 240;

/// Derived column: resting blood pressure over max heart rate.
pub const BP_HR_RATIO: &str = "bp_hr_ratio";

/// Derived column: cholesterol above [`HIGH_CHOL_THRESHOLD`].
pub const HIGH_CHOL: &str = "high_chol";

/// Attributes expanded into indicator columns.
pub const ONE_HOT_FIELDS: [&str; 4] = ["cp", "restecg", "slope", "thal"];

/// Errors raised while building a model record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeatureError {
    #[error("Invalid feature schema: {0}")]
    Schema(String),

    #[error("Division by zero computing {feature}: {denominator} is 0")]
    Division {
        feature: &'static str,
        denominator: &'static str,
    },
}

/// Name of the indicator column for a category value, e.g. `cp_2`.
#[must_use]
pub fn indicator_name<C: Categorical>(value: C) -> String {
    format!("{}_{}", C::FIELD, value.code())
}

/// Every indicator column an attribute can produce, in code order.
#[must_use]
pub fn indicator_names<C: Categorical>() -> Vec<String> {
    C::ALL.iter().copied().map(indicator_name).collect()
}

/// Columns produced from a single record before reconciliation, in
/// production order.
///
/// # Errors
/// Returns `FeatureError::Division` if `thalach` is zero.
pub fn expand(raw: &RawRecord) -> Result<Vec<(String, f64)>, FeatureError> {
    if raw.thalach == 0 {
        return Err(FeatureError::Division {
            feature: BP_HR_RATIO,
            denominator: "thalach",
        });
    }

    let mut columns = vec![
        ("age".to_string(), f64::from(raw.age)),
        ("sex".to_string(), f64::from(raw.sex.code())),
        ("trestbps".to_string(), f64::from(raw.trestbps)),
        ("chol".to_string(), f64::from(raw.chol)),
        ("fbs".to_string(), f64::from(raw.fbs.code())),
        ("thalach".to_string(), f64::from(raw.thalach)),
        ("exang".to_string(), f64::from(raw.exang.code())),
        ("oldpeak".to_string(), raw.oldpeak),
        ("ca".to_string(), f64::from(raw.ca)),
    ];

    columns.push((
        BP_HR_RATIO.to_string(),
        f64::from(raw.trestbps) / f64::from(raw.thalach),
    ));
    columns.push((
        HIGH_CHOL.to_string(),
        if raw.chol > HIGH_CHOL_THRESHOLD { 1.0 } else { 0.0 },
    ));

    columns.push((indicator_name(raw.cp), 1.0));
    columns.push((indicator_name(raw.restecg), 1.0));
    columns.push((indicator_name(raw.slope), 1.0));
    columns.push((indicator_name(raw.thal), 1.0));

    Ok(columns)
}

/// Align produced columns to a schema: missing columns become 0, columns
/// outside the schema are dropped, order follows the schema.
#[must_use]
pub fn reconcile(produced: Vec<(String, f64)>, schema: &FeatureSchema) -> ModelRecord {
    let produced: HashMap<String, f64> = produced.into_iter().collect();

    let dropped: Vec<&str> = produced
        .keys()
        .map(String::as_str)
        .filter(|name| !schema.contains(name))
        .collect();
    if !dropped.is_empty() {
        tracing::debug!(columns = ?dropped, "dropping columns not in model schema");
    }

    let values = schema
        .columns()
        .iter()
        .map(|name| produced.get(name).copied().unwrap_or(0.0))
        .collect();

    ModelRecord::aligned(schema.clone(), values)
}

/// Transform a raw record into the classifier's feature layout.
///
/// # Errors
/// Returns `FeatureError::Division` if `thalach` is zero.
pub fn transform(raw: &RawRecord, schema: &FeatureSchema) -> Result<ModelRecord, FeatureError> {
    let produced = expand(raw)?;
    let produced_len = produced.len();
    let record = reconcile(produced, schema);
    tracing::debug!(
        produced = produced_len,
        expected = schema.len(),
        "feature record aligned to schema"
    );
    Ok(record)
}

/// [`transform`] against a plain list of expected column names.
///
/// # Errors
/// Returns `FeatureError::Schema` if `expected_cols` is empty or invalid,
/// and `FeatureError::Division` if `thalach` is zero.
pub fn transform_columns<S: AsRef<str>>(
    raw: &RawRecord,
    expected_cols: &[S],
) -> Result<ModelRecord, FeatureError> {
    let schema = FeatureSchema::new(expected_cols.iter().map(|c| c.as_ref().to_string()))?;
    transform(raw, &schema)
}

/// The full column layout the bundled model was trained with.
#[must_use]
pub fn training_columns() -> Vec<String> {
    use super::patient::{ChestPain, RestingEcg, StSlope, Thalassemia};

    let mut columns: Vec<String> = [
        "age", "sex", "trestbps", "chol", "fbs", "thalach", "exang", "oldpeak", "ca",
        BP_HR_RATIO, HIGH_CHOL,
    ]
    .iter()
    .map(|s| (*s).to_string())
    .collect();
    columns.extend(indicator_names::<ChestPain>());
    columns.extend(indicator_names::<RestingEcg>());
    columns.extend(indicator_names::<StSlope>());
    columns.extend(indicator_names::<Thalassemia>());
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::patient::{ChestPain, RestingEcg, StSlope, Thalassemia};

    fn trained_schema() -> FeatureSchema {
        FeatureSchema::new(training_columns()).expect("schema")
    }

    fn indicator_sum(record: &ModelRecord, field: &str) -> f64 {
        record
            .iter()
            .filter(|(name, _)| name.starts_with(&format!("{field}_")))
            .map(|(_, v)| v)
            .sum()
    }

    #[test]
    fn test_output_matches_schema_order() {
        let schema = trained_schema();
        let record = transform(&RawRecord::default(), &schema).expect("transform");
        assert_eq!(record.columns(), schema.columns());
        assert_eq!(record.values().len(), schema.len());
    }

    #[test]
    fn test_output_follows_shuffled_schema() {
        let mut columns = training_columns();
        columns.reverse();
        let schema = FeatureSchema::new(columns.clone()).expect("schema");
        let record = transform(&RawRecord::default(), &schema).expect("transform");
        assert_eq!(record.columns(), columns.as_slice());
        assert_eq!(record.values()[columns.len() - 1], 50.0); // age was first
    }

    #[test]
    fn test_default_patient_scenario() {
        let record = transform(&RawRecord::default(), &trained_schema()).expect("transform");

        assert!((record.get(BP_HR_RATIO).unwrap() - 0.8).abs() < 1e-12);
        assert_eq!(record.get(HIGH_CHOL), Some(0.0));
        for field in ONE_HOT_FIELDS {
            assert_eq!(indicator_sum(&record, field), 1.0, "{field}");
        }
        assert_eq!(record.get("cp_0"), Some(1.0));
        assert_eq!(record.get("thal_0"), Some(1.0));
        assert_eq!(record.get("age"), Some(50.0));
        assert_eq!(record.get("oldpeak"), Some(1.0));
        assert_eq!(record.get("cp"), None);
    }

    #[test]
    fn test_high_cholesterol_changes_only_flag() {
        let schema = trained_schema();
        let base = transform(&RawRecord::default(), &schema).expect("transform");
        let raw = RawRecord {
            chol: 300,
            ..RawRecord::default()
        };
        let high = transform(&raw, &schema).expect("transform");

        assert_eq!(high.get(HIGH_CHOL), Some(1.0));
        for ((name, a), (_, b)) in base.iter().zip(high.iter()) {
            if name != HIGH_CHOL && name != "chol" {
                assert_eq!(a, b, "{name}");
            }
        }
    }

    #[test]
    fn test_high_chol_boundary() {
        let schema = trained_schema();
        for (chol, expected) in [(239, 0.0), (240, 0.0), (241, 1.0)] {
            let raw = RawRecord {
                chol,
                ..RawRecord::default()
            };
            let record = transform(&raw, &schema).expect("transform");
            assert_eq!(record.get(HIGH_CHOL), Some(expected), "chol={chol}");
        }
    }

    #[test]
    fn test_ratio_is_linear_in_trestbps() {
        let schema = trained_schema();
        for thalach in [60, 133, 220] {
            let low = RawRecord {
                trestbps: 90,
                thalach,
                ..RawRecord::default()
            };
            let high = RawRecord {
                trestbps: 180,
                ..low.clone()
            };
            let a = transform(&low, &schema).expect("transform");
            let b = transform(&high, &schema).expect("transform");
            let (ra, rb) = (a.get(BP_HR_RATIO).unwrap(), b.get(BP_HR_RATIO).unwrap());
            assert!((rb - 2.0 * ra).abs() < 1e-12);
        }
    }

    #[test]
    fn test_single_row_indicators_are_zero_filled() {
        let raw = RawRecord {
            thal: Thalassemia::FixedDefect,
            ..RawRecord::default()
        };
        let record =
            transform_columns(&raw, &["thal_0", "thal_1", "thal_2"]).expect("transform");
        assert_eq!(record.values(), [0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_every_category_sets_exactly_one_indicator() {
        let schema = trained_schema();
        for &cp in ChestPain::ALL {
            for &restecg in RestingEcg::ALL {
                for &slope in StSlope::ALL {
                    let raw = RawRecord {
                        cp,
                        restecg,
                        slope,
                        ..RawRecord::default()
                    };
                    let record = transform(&raw, &schema).expect("transform");
                    assert_eq!(record.get(&indicator_name(cp)), Some(1.0));
                    assert_eq!(record.get(&indicator_name(restecg)), Some(1.0));
                    assert_eq!(record.get(&indicator_name(slope)), Some(1.0));
                    for field in ONE_HOT_FIELDS {
                        assert_eq!(indicator_sum(&record, field), 1.0);
                    }
                }
            }
        }
    }

    #[test]
    fn test_unknown_schema_columns_zero_and_extras_dropped() {
        let raw = RawRecord::default();
        let record = transform_columns(&raw, &["mystery", "age"]).expect("transform");
        assert_eq!(record.values(), [0.0, 50.0]);
        assert_eq!(record.get("chol"), None);
    }

    #[test]
    fn test_zero_heart_rate_is_division_error() {
        let raw = RawRecord {
            thalach: 0,
            ..RawRecord::default()
        };
        let err = transform(&raw, &trained_schema()).expect_err("must fail");
        assert_eq!(
            err,
            FeatureError::Division {
                feature: BP_HR_RATIO,
                denominator: "thalach"
            }
        );
    }

    #[test]
    fn test_empty_expected_columns_is_schema_error() {
        let empty: [&str; 0] = [];
        let err = transform_columns(&RawRecord::default(), &empty).expect_err("must fail");
        assert!(matches!(err, FeatureError::Schema(_)));
    }

    #[test]
    fn test_training_columns_layout() {
        let columns = training_columns();
        assert_eq!(columns.len(), 11 + 4 + 3 + 3 + 3);
        assert_eq!(columns[9], BP_HR_RATIO);
        assert_eq!(columns.last().map(String::as_str), Some("thal_2"));
    }
}
