//! Prediction result types.
//!
//! Represents the output of one risk prediction. Results are created per
//! submission and never stored.

use serde::{Deserialize, Serialize};

/// Binary heart-disease risk verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLabel {
    /// Classifier predicted no heart disease
    Low,
    /// Classifier predicted heart disease
    High,
}

impl RiskLabel {
    /// Map a classifier class (0 or 1) to a label.
    #[must_use]
    pub fn from_class(class: u8) -> Self {
        if class == 1 {
            Self::High
        } else {
            Self::Low
        }
    }

    /// Recommendation shown alongside the verdict.
    #[must_use]
    pub fn recommendation(&self) -> &'static str {
        match self {
            Self::Low => "No significant risk detected",
            Self::High => "Consult a cardiologist immediately",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW RISK"),
            Self::High => write!(f, "HIGH RISK"),
        }
    }
}

/// Result of one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted label
    pub label: RiskLabel,

    /// Positive-class probability as a percentage (0.0 to 100.0)
    pub probability: f64,
}

impl PredictionResult {
    /// Build a result from the predicted class and the positive-class
    /// probability in [0, 1].
    #[must_use]
    pub fn new(class: u8, positive_probability: f64) -> Self {
        Self {
            label: RiskLabel::from_class(class),
            probability: (positive_probability * 100.0).clamp(0.0, 100.0),
        }
    }

    /// Probability formatted the way it is displayed, e.g. `73.25%`.
    #[must_use]
    pub fn probability_display(&self) -> String {
        format!("{:.2}%", self.probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_class() {
        assert_eq!(RiskLabel::from_class(0), RiskLabel::Low);
        assert_eq!(RiskLabel::from_class(1), RiskLabel::High);
    }

    #[test]
    fn test_probability_is_percentage() {
        let result = PredictionResult::new(1, 0.73251);
        assert_eq!(result.label, RiskLabel::High);
        assert!((result.probability - 73.251).abs() < 1e-9);
        assert_eq!(result.probability_display(), "73.25%");
    }

    #[test]
    fn test_probability_is_clamped() {
        assert_eq!(PredictionResult::new(1, 1.0000001).probability, 100.0);
        assert_eq!(PredictionResult::new(0, -0.0).probability, 0.0);
    }
}
