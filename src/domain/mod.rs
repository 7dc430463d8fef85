//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types and pure functions with no I/O.
//! All types are serializable and records implement strict validation.

mod assessment;
pub mod metrics;
mod patient;
pub mod units;

pub use assessment::{FactorContribution, RiskAssessment, RiskTier};
pub use metrics::{BloodPressureCategory, BmiCategory, HealthMetrics};
pub use patient::{
    FeatureVector, PatientRecord, AP_HI_INDEX, CHOLESTEROL_INDEX, FEATURE_COUNT, FEATURE_NAMES,
};
