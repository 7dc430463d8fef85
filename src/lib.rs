//! # Cardiosense
//!
//! Cardiovascular risk inference and health-metrics engine.
//!
//! This crate provides:
//! - An in-process random-forest classifier trained from historical patient records
//! - Deterministic derived health metrics (BMI, blood-pressure category, metabolic age)
//! - Rule-based, ordered recommendations for a scored patient
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core business types (PatientRecord, HealthMetrics, RiskAssessment)
//! - `ports`: Trait definitions for the classifier and patient storage
//! - `adapters`: Concrete implementations (random forest, SQLite, log sanitizing)
//! - `application`: Use cases orchestrating domain and ports

pub mod adapters;
pub mod application;
pub mod domain;
pub mod ports;

#[cfg(test)]
pub(crate) mod fixtures;

pub use application::{AssessmentService, RecommendationEngine};
pub use domain::{HealthMetrics, PatientRecord, RiskAssessment, RiskTier};

/// Minimum number of labeled records required to train the classifier.
pub const MIN_TRAINING_RECORDS: usize = 100;

/// Result type for Cardiosense operations
pub type Result<T> = std::result::Result<T, CardioError>;

/// Main error type for Cardiosense
#[derive(Debug, thiserror::Error)]
pub enum CardioError {
    #[error("At least {required} records are needed to train the model (available: {available})")]
    InsufficientData { available: usize, required: usize },

    #[error("Model has not been trained")]
    ModelNotTrained,

    #[error("No patient found with id {0}")]
    PatientNotFound(i64),

    #[error("Assessment failed: {0}")]
    Assessment(String),

    #[error("Invalid patient data: {0}")]
    Validation(String),

    #[error("Storage operation failed: {0}")]
    Storage(#[from] adapters::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CardioError {
    /// Whether this error already belongs to the caller-facing taxonomy.
    ///
    /// Classified errors are surfaced unchanged; anything else is wrapped
    /// into [`CardioError::Assessment`] at the orchestrator boundary.
    #[must_use]
    pub fn is_classified(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::ModelNotTrained
                | Self::PatientNotFound(_)
                | Self::Assessment(_)
        )
    }

    /// Wrap an unclassified error into `Assessment`, keeping the cause message.
    #[must_use]
    pub fn into_classified(self) -> Self {
        if self.is_classified() {
            self
        } else {
            Self::Assessment(self.to_string())
        }
    }
}
