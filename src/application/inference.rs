//! Inference service: Turns a submitted form into a risk verdict.
//!
//! The service is built once at startup from the result of loading the
//! classifier. A failed load does not abort the program: the service enters
//! a degraded state that keeps the failure reason for display and refuses
//! every submission with `ModelUnavailable`.

use std::sync::Arc;

use crate::adapters::ArtifactClassifier;
use crate::config::AppConfig;
use crate::domain::{transform, FeatureSchema, PredictionResult, RawRecord};
use crate::ports::Classifier;
use crate::CardioriskError;

enum State<C> {
    Ready(Arc<C>),
    Degraded(CardioriskError),
}

/// Service for running risk predictions against a loaded classifier.
pub struct InferenceService<C: Classifier> {
    state: State<C>,
}

impl InferenceService<ArtifactClassifier> {
    /// Load the artifact named by `config`, entering the degraded state on
    /// any load failure.
    #[must_use]
    pub fn load(config: &AppConfig) -> Self {
        tracing::info!(path = ?config.model_path, "Loading model artifact...");
        let loaded = ArtifactClassifier::load(&config.model_path, &config.integrity)
            .map_err(CardioriskError::from);
        Self::from_load(loaded)
    }
}

impl<C: Classifier> InferenceService<C> {
    /// Create a service around an already-loaded classifier.
    pub fn new(classifier: Arc<C>) -> Self {
        Self {
            state: State::Ready(classifier),
        }
    }

    /// Create a service from the outcome of a load attempt.
    pub fn from_load(loaded: Result<C, CardioriskError>) -> Self {
        match loaded {
            Ok(classifier) => {
                tracing::info!(
                    n_features = classifier.schema().len(),
                    "Inference service ready"
                );
                Self::new(Arc::new(classifier))
            }
            Err(e) => {
                tracing::error!("Model unavailable, predictions disabled: {e}");
                Self {
                    state: State::Degraded(e),
                }
            }
        }
    }

    /// Whether predictions can be made.
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    /// The reason the model failed to load, if it did.
    #[must_use]
    pub fn load_error(&self) -> Option<&CardioriskError> {
        match &self.state {
            State::Ready(_) => None,
            State::Degraded(e) => Some(e),
        }
    }

    /// The expected column schema of the loaded classifier.
    #[must_use]
    pub fn schema(&self) -> Option<&FeatureSchema> {
        self.classifier().map(|c| c.schema())
    }

    /// The loaded classifier.
    #[must_use]
    pub fn classifier(&self) -> Option<&C> {
        match &self.state {
            State::Ready(c) => Some(c.as_ref()),
            State::Degraded(_) => None,
        }
    }

    /// Run one prediction.
    ///
    /// Performs:
    /// 1. Availability check (degraded state short-circuits)
    /// 2. Bounds validation of the submitted record
    /// 3. Feature transform against the classifier schema
    /// 4. `predict` and `predict_proba`
    ///
    /// # Errors
    /// Returns `ModelUnavailable` in the degraded state, `Validation` with
    /// every bound violation, or the transform/classifier error.
    pub fn predict(&self, raw: &RawRecord) -> Result<PredictionResult, CardioriskError> {
        let classifier = match &self.state {
            State::Ready(c) => c,
            State::Degraded(e) => {
                tracing::warn!("Submission rejected: model unavailable");
                return Err(CardioriskError::ModelUnavailable(e.to_string()));
            }
        };

        raw.validate()
            .map_err(|violations| CardioriskError::Validation(violations.join(", ")))?;

        let record = transform(raw, classifier.schema())?;
        let class = classifier.predict(&record)?;
        let proba = classifier.predict_proba(&record)?;
        let result = PredictionResult::new(class, proba[1]);

        tracing::info!(
            label = %result.label,
            probability = %result.probability_display(),
            "Prediction complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ArtifactError;
    use crate::domain::features::training_columns;
    use crate::domain::{ModelRecord, RiskLabel};
    use crate::ports::ClassifierError;
    use std::path::PathBuf;
    use tempfile::tempdir;

    /// Classifier returning a fixed probability, for exercising the service
    /// without an artifact.
    struct FixedClassifier {
        schema: FeatureSchema,
        p1: f64,
    }

    impl Classifier for FixedClassifier {
        fn schema(&self) -> &FeatureSchema {
            &self.schema
        }

        fn predict_proba(&self, _record: &ModelRecord) -> Result<[f64; 2], ClassifierError> {
            Ok([1.0 - self.p1, self.p1])
        }
    }

    fn fixed(p1: f64) -> InferenceService<FixedClassifier> {
        InferenceService::new(Arc::new(FixedClassifier {
            schema: FeatureSchema::new(training_columns()).expect("schema"),
            p1,
        }))
    }

    fn bundled() -> InferenceService<ArtifactClassifier> {
        InferenceService::load(&AppConfig::default())
    }

    #[test]
    fn test_missing_artifact_degrades() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig {
            model_path: temp.path().join("heart_disease_model.json"),
            ..AppConfig::default()
        };

        let service = InferenceService::load(&config);
        assert!(!service.is_available());
        assert!(service.schema().is_none());
        assert!(matches!(
            service.load_error(),
            Some(CardioriskError::ArtifactLoad(ArtifactError::NotFound(_)))
        ));

        let err = service
            .predict(&RawRecord::default())
            .expect_err("must be unavailable");
        match err {
            CardioriskError::ModelUnavailable(reason) => assert!(reason.contains("not found")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_schema_degrades_with_schema_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("heart_disease_model.json");
        std::fs::write(
            &path,
            br#"{"format_version":1,"feature_names_in":["age","age"],"classes":[0,1],
                "estimator":{"model_type":"logistic_regression","coefficients":[1.0,1.0],"intercept":0.0}}"#,
        )
        .expect("write");

        let service = InferenceService::load(&AppConfig {
            model_path: path,
            ..AppConfig::default()
        });
        assert!(matches!(service.load_error(), Some(CardioriskError::Schema(_))));
    }

    #[test]
    fn test_missing_schema_degrades_with_schema_error() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("heart_disease_model.json");
        std::fs::write(
            &path,
            br#"{"format_version":1,"classes":[0,1],
                "estimator":{"model_type":"logistic_regression","coefficients":[1.0],"intercept":0.0}}"#,
        )
        .expect("write");

        let service = InferenceService::load(&AppConfig {
            model_path: path,
            ..AppConfig::default()
        });
        assert!(matches!(service.load_error(), Some(CardioriskError::Schema(_))));
    }

    #[test]
    fn test_validation_reports_all_violations() {
        let service = fixed(0.9);
        let raw = RawRecord {
            age: 0,
            chol: 700,
            ..RawRecord::default()
        };
        match service.predict(&raw).expect_err("must fail") {
            CardioriskError::Validation(msg) => {
                assert!(msg.contains("Age"));
                assert!(msg.contains("Cholesterol"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_label_follows_probability() {
        let high = fixed(0.9).predict(&RawRecord::default()).expect("predict");
        assert_eq!(high.label, RiskLabel::High);
        assert!((high.probability - 90.0).abs() < 1e-9);

        let low = fixed(0.2).predict(&RawRecord::default()).expect("predict");
        assert_eq!(low.label, RiskLabel::Low);
        assert_eq!(low.probability_display(), "20.00%");

        // Ties go to class 0.
        let tie = fixed(0.5).predict(&RawRecord::default()).expect("predict");
        assert_eq!(tie.label, RiskLabel::Low);
    }

    #[test]
    fn test_bundled_model_defaults_low_risk() {
        let service = bundled();
        assert!(service.is_available());
        assert_eq!(
            service.schema().map(FeatureSchema::len),
            Some(training_columns().len())
        );

        let result = service.predict(&RawRecord::default()).expect("predict");
        assert_eq!(result.label, RiskLabel::Low);
        assert!((0.0..=100.0).contains(&result.probability));
    }

    #[test]
    fn test_bundled_model_sample_high_risk() {
        let result = bundled().predict(&RawRecord::sample()).expect("predict");
        assert_eq!(result.label, RiskLabel::High);
        assert!(result.probability > 50.0);
    }

    #[test]
    fn test_classifier_accessor() {
        let service = bundled();
        let classifier = service.classifier().expect("loaded");
        assert_eq!(classifier.path(), PathBuf::from("models/heart_disease_model.json"));
    }
}
