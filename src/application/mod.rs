//! Application layer: Use cases and services.
//!
//! This module orchestrates domain logic with ports to implement
//! the core use cases of the application.

mod assessment;
mod recommendations;

pub use assessment::{AssessmentService, ModelState, TOP_FACTORS};
pub use recommendations::{RecommendationEngine, Recommendations};
