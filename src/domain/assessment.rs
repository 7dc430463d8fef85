//! Risk assessment result types.
//!
//! Represents the output of scoring one patient against the trained model.

use serde::{Deserialize, Serialize};

use super::metrics::HealthMetrics;

/// Coarse risk bucket derived from the classifier probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    /// Probability at or below 0.4
    Low,
    /// Probability above 0.4, follow-up recommended
    Moderate,
    /// Probability above 0.6, specialist visit within a week
    High,
    /// Probability above 0.8, urgent care
    Extreme,
}

impl RiskTier {
    /// Bucket a probability. Every lower bound is exclusive.
    #[must_use]
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.8 {
            Self::Extreme
        } else if probability > 0.6 {
            Self::High
        } else if probability > 0.4 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Extreme => "Extreme",
        }
    }

    /// Display color as a hex string.
    #[must_use]
    pub fn color(&self) -> &'static str {
        match self {
            Self::Low => "#00B050",      // green
            Self::Moderate => "#FFC100", // yellow
            Self::High => "#FF6B00",     // orange
            Self::Extreme => "#FF0000",  // red
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "LOW"),
            Self::Moderate => write!(f, "MODERATE"),
            Self::High => write!(f, "HIGH"),
            Self::Extreme => write!(f, "EXTREME"),
        }
    }
}

/// One of the dominant features behind a prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorContribution {
    /// Feature name (see `FEATURE_NAMES`)
    pub name: &'static str,

    /// Index of the feature in canonical order
    pub index: usize,

    /// Trained importance weight, rounded to four decimals
    pub importance: f64,

    /// The scored patient's raw value for this feature
    pub value: f64,
}

/// Complete result of assessing one patient.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    /// Probability of the at-risk class (0.0 to 1.0)
    pub probability: f64,

    pub tier: RiskTier,

    /// Display color of the tier
    pub color: &'static str,

    /// Top contributing factors, most important first
    pub factors: Vec<FactorContribution>,

    pub metrics: HealthMetrics,

    /// Ordered recommendation lines
    pub recommendations: Vec<String>,

    /// Timestamp of the assessment
    pub assessed_at: chrono::DateTime<chrono::Utc>,
}
