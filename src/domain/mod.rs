//! Domain layer: Core types and the feature transform.
//!
//! Pure Rust with no I/O. Everything here is deterministic and testable
//! without a model artifact.

pub mod features;
mod patient;
mod prediction;
mod schema;

pub use features::{transform, transform_columns, FeatureError};
pub use patient::{
    bounds, Categorical, ChestPain, ExerciseAngina, FastingBloodSugar, RawRecord, RestingEcg,
    Sex, StSlope, Thalassemia,
};
pub use prediction::{PredictionResult, RiskLabel};
pub use schema::{FeatureSchema, ModelRecord};
