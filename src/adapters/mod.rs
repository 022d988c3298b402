//! Adapters layer: Concrete implementations of ports.
//!
//! - `artifact`: JSON model artifact loader and evaluator
//! - `sanitize`: clinical value and secret filtering for logs

pub mod artifact;
pub mod sanitize;

pub use artifact::{ArtifactClassifier, ArtifactError};
