//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use case of the application: one form submission in, one
//! risk verdict out.

mod inference;

pub use inference::InferenceService;
