//! Classifier port: Trait for a pre-trained binary classifier.
//!
//! This trait abstracts the serialized model artifact from the application
//! logic, mirroring the `feature_names_in_` / `predict` / `predict_proba`
//! surface of the trained estimator.

use crate::domain::{FeatureSchema, ModelRecord};

/// Errors raised while evaluating a classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("Record columns do not match the classifier schema")]
    SchemaMismatch,

    #[error("Classifier produced an invalid probability: {0}")]
    InvalidProbability(f64),
}

/// A binary classifier loaded once and shared read-only.
///
/// Implementations are immutable after construction.
pub trait Classifier: Send + Sync {
    /// Ordered input columns the classifier was fitted on.
    fn schema(&self) -> &FeatureSchema;

    /// Per-class probabilities `[p(class 0), p(class 1)]`.
    ///
    /// # Errors
    /// Returns `ClassifierError::SchemaMismatch` if `record` was not aligned
    /// to [`Classifier::schema`].
    fn predict_proba(&self, record: &ModelRecord) -> Result<[f64; 2], ClassifierError>;

    /// Predicted class (0 or 1).
    ///
    /// The default picks the class with the larger probability, class 0 on
    /// ties.
    ///
    /// # Errors
    /// Same as [`Classifier::predict_proba`].
    fn predict(&self, record: &ModelRecord) -> Result<u8, ClassifierError> {
        let [p0, p1] = self.predict_proba(record)?;
        Ok(u8::from(p1 > p0))
    }
}
