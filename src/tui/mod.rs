//! TUI module: Terminal User Interface using Ratatui.
//!
//! Provides a clinical-themed interface for:
//! - Dashboard with model status
//! - Patient attribute entry
//! - Risk verdict and interpretation guide

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::MedicalTheme;
