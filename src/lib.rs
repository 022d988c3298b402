//! # CardioRisk
//!
//! Heart-disease risk screening from 13 clinical attributes, backed by a
//! pre-trained binary classifier.
//!
//! This crate provides:
//! - A deterministic feature transform that aligns one patient's attributes
//!   to the classifier's expected column schema
//! - Loading of the serialized classifier with optional signed-manifest
//!   verification
//! - A terminal UI for entering attributes and reading the verdict
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (RawRecord, FeatureSchema, ModelRecord) and the transform
//! - `ports`: The `Classifier` trait
//! - `adapters`: Artifact-backed classifier, log sanitization
//! - `application`: The inference service
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{FeatureSchema, ModelRecord, PredictionResult, RawRecord, RiskLabel};

/// Result type for CardioRisk operations
pub type Result<T> = std::result::Result<T, CardioriskError>;

/// Main error type for CardioRisk
#[derive(Debug, thiserror::Error)]
pub enum CardioriskError {
    #[error("Model artifact could not be loaded: {0}")]
    ArtifactLoad(adapters::ArtifactError),

    #[error("Model schema is invalid: {0}")]
    Schema(String),

    #[error("Division by zero computing {feature}: {denominator} is 0")]
    Division {
        feature: &'static str,
        denominator: &'static str,
    },

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Prediction unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Classifier failed: {0}")]
    Classifier(#[from] ports::ClassifierError),
}

impl CardioriskError {
    /// Short name of the error kind, free of any submitted values.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ArtifactLoad(_) => "artifact load",
            Self::Schema(_) => "schema",
            Self::Division { .. } => "division",
            Self::Validation(_) => "validation",
            Self::ModelUnavailable(_) => "model unavailable",
            Self::Classifier(_) => "classifier",
        }
    }
}

impl From<domain::FeatureError> for CardioriskError {
    fn from(err: domain::FeatureError) -> Self {
        match err {
            domain::FeatureError::Schema(msg) => Self::Schema(msg),
            domain::FeatureError::Division {
                feature,
                denominator,
            } => Self::Division {
                feature,
                denominator,
            },
        }
    }
}

impl From<adapters::ArtifactError> for CardioriskError {
    fn from(err: adapters::ArtifactError) -> Self {
        match err {
            adapters::ArtifactError::Schema(e) => e.into(),
            other => Self::ArtifactLoad(other),
        }
    }
}
