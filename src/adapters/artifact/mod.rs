//! Artifact adapter: Implementation of `Classifier` backed by a JSON model
//! artifact exported from the training pipeline.
//!
//! # Format
//!
//! ```json
//! {
//!   "format_version": 1,
//!   "feature_names_in": ["age", "sex", "..."],
//!   "classes": [0, 1],
//!   "estimator": { "model_type": "logistic_regression", "coefficients": [], "intercept": 0.0 }
//! }
//! ```
//!
//! `feature_names_in` becomes the [`FeatureSchema`] every record is aligned
//! to. The artifact is loaded once and never mutated.
//!
//! # Integrity
//!
//! A `manifest.json` / `model.sig` pair beside the artifact is verified
//! before the artifact is parsed (see [`integrity`]).

pub mod estimator;
pub mod integrity;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::{FeatureError, FeatureSchema, ModelRecord};
use crate::ports::{Classifier, ClassifierError};

pub use estimator::Estimator;
pub use integrity::{IntegrityPolicy, IntegrityStatus, ModelManifest};

/// Artifact format version this build understands.
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// Errors that can occur while loading a model artifact.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Model artifact not found at {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read model artifact: {0}")]
    Io(String),

    #[error("Model artifact is corrupt: {0}")]
    Corrupt(String),

    #[error("Unsupported model artifact version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error(transparent)]
    Schema(#[from] FeatureError),

    #[error("Model integrity check failed: {0}")]
    Integrity(String),
}

/// On-disk layout of a model artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactDocument {
    pub format_version: u32,
    /// Absent is treated like empty, so both surface as a schema error.
    #[serde(default)]
    pub feature_names_in: Vec<String>,
    pub classes: Vec<u8>,
    pub estimator: Estimator,
}

/// Peek at the version before parsing the rest, so a newer artifact reports
/// a version mismatch instead of a parse error.
#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

/// A loaded, validated model artifact.
#[derive(Debug, Clone)]
pub struct ArtifactClassifier {
    path: PathBuf,
    schema: FeatureSchema,
    estimator: Estimator,
    integrity: IntegrityStatus,
}

impl ArtifactClassifier {
    /// Load and validate the artifact at `path`.
    ///
    /// # Errors
    /// Returns an `ArtifactError` if the file is missing or unreadable,
    /// fails integrity checks, has an unsupported version, or carries an
    /// invalid schema or parameters.
    pub fn load(path: &Path, policy: &IntegrityPolicy) -> Result<Self, ArtifactError> {
        if !path.is_file() {
            return Err(ArtifactError::NotFound(path.to_path_buf()));
        }

        let content = std::fs::read(path).map_err(|e| ArtifactError::Io(e.to_string()))?;
        let integrity = integrity::verify(path, &content, policy)?;

        let probe: VersionProbe = serde_json::from_slice(&content)
            .map_err(|e| ArtifactError::Corrupt(e.to_string()))?;
        if probe.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: probe.format_version,
                supported: SUPPORTED_FORMAT_VERSION,
            });
        }

        let document: ArtifactDocument = serde_json::from_slice(&content)
            .map_err(|e| ArtifactError::Corrupt(e.to_string()))?;
        let classifier = Self::from_document(document, path.to_path_buf(), integrity)?;

        tracing::info!(
            path = ?classifier.path,
            model_type = classifier.estimator.kind(),
            n_features = classifier.schema.len(),
            integrity = %classifier.integrity,
            "Loaded model artifact"
        );
        Ok(classifier)
    }

    /// Validate a parsed document and build the classifier.
    ///
    /// # Errors
    /// Returns `ArtifactError::Schema` for an invalid `feature_names_in`,
    /// and `ArtifactError::Corrupt` for unexpected classes or malformed
    /// estimator parameters.
    pub fn from_document(
        document: ArtifactDocument,
        path: PathBuf,
        integrity: IntegrityStatus,
    ) -> Result<Self, ArtifactError> {
        if document.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(ArtifactError::UnsupportedVersion {
                found: document.format_version,
                supported: SUPPORTED_FORMAT_VERSION,
            });
        }
        if document.classes != [0, 1] {
            return Err(ArtifactError::Corrupt(format!(
                "expected binary classes [0, 1], got {:?}",
                document.classes
            )));
        }

        let schema = FeatureSchema::new(document.feature_names_in)?;
        document.estimator.validate(schema.len())?;

        Ok(Self {
            path,
            schema,
            estimator: document.estimator,
            integrity,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn model_type(&self) -> &'static str {
        self.estimator.kind()
    }

    #[must_use]
    pub fn integrity(&self) -> IntegrityStatus {
        self.integrity
    }
}

impl Classifier for ArtifactClassifier {
    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn predict_proba(&self, record: &ModelRecord) -> Result<[f64; 2], ClassifierError> {
        if record.schema() != &self.schema {
            return Err(ClassifierError::SchemaMismatch);
        }

        let p1 = self.estimator.positive_probability(record.values());
        if !(0.0..=1.0).contains(&p1) {
            return Err(ClassifierError::InvalidProbability(p1));
        }
        Ok([1.0 - p1, p1])
    }
}
