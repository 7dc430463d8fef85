//! Classifier port: Trait for the supervised risk model.
//!
//! This trait abstracts the learning algorithm from the orchestration logic.

use crate::domain::{FactorContribution, FeatureVector, PatientRecord};
use crate::Result;

/// A binary classifier predicting presence of cardiovascular risk.
///
/// Implementations move from untrained to trained exactly once per
/// successful `train` call; there is no transition back.
pub trait RiskClassifier: Send + Sync {
    /// Fit the model on labeled records (label = `cardio`).
    ///
    /// # Errors
    /// Returns `CardioError::InsufficientData` if fewer than
    /// `MIN_TRAINING_RECORDS` records are provided.
    fn train(&mut self, records: &[PatientRecord]) -> Result<()>;

    /// Whether a model has been fitted.
    fn is_trained(&self) -> bool;

    /// Probability of the at-risk class for one record.
    ///
    /// # Errors
    /// Returns `CardioError::ModelNotTrained` if called before training.
    fn score(&self, record: &PatientRecord) -> Result<f64>;

    /// The `n` most important features, most important first, paired with
    /// the scored patient's values. Equal importances keep canonical order.
    ///
    /// # Errors
    /// Returns `CardioError::ModelNotTrained` if called before training.
    fn top_factors(
        &self,
        features: &FeatureVector,
        n: usize,
    ) -> Result<Vec<FactorContribution>>;
}
