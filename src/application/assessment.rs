//! Assessment service: Orchestrates training, scoring and recommendations.
//!
//! This service coordinates:
//! - Lazy, single-flight training on first use
//! - Scoring and factor extraction
//! - Health metrics
//! - Recommendation assembly

use std::sync::RwLock;

use crate::domain::{metrics, HealthMetrics, PatientRecord, RiskAssessment};
use crate::ports::{PatientStore, RiskClassifier};
use crate::{CardioError, Result, MIN_TRAINING_RECORDS};

use super::recommendations::RecommendationEngine;

/// Number of contributing factors reported per assessment.
pub const TOP_FACTORS: usize = 3;

/// The process-wide model, guarded so at most one training pass runs.
///
/// Training holds the write lock for its whole duration; scoring holds the
/// read lock. Callers that arrive while training is in flight block on the
/// lock and then observe the trained model instead of training again.
pub struct ModelState<C: RiskClassifier> {
    classifier: RwLock<C>,
}

impl<C: RiskClassifier> ModelState<C> {
    #[must_use]
    pub fn new(classifier: C) -> Self {
        Self {
            classifier: RwLock::new(classifier),
        }
    }

    /// Whether the wrapped classifier has been fitted.
    ///
    /// # Errors
    /// Returns `CardioError::Assessment` if the lock is poisoned.
    pub fn is_trained(&self) -> Result<bool> {
        Ok(self.classifier.read().map_err(poisoned)?.is_trained())
    }

    /// Train once if needed. `history` is only invoked when training runs.
    ///
    /// # Errors
    /// Returns `CardioError::InsufficientData` if fewer than
    /// `MIN_TRAINING_RECORDS` records are available, or whatever `history`
    /// or the classifier return.
    pub fn ensure_trained<F>(&self, history: F) -> Result<()>
    where
        F: FnOnce() -> Result<Vec<PatientRecord>>,
    {
        if self.is_trained()? {
            return Ok(());
        }

        let mut classifier = self.classifier.write().map_err(poisoned)?;
        if classifier.is_trained() {
            tracing::debug!("Model trained by a concurrent caller");
            return Ok(());
        }

        let records = history()?;
        if records.len() < MIN_TRAINING_RECORDS {
            return Err(CardioError::InsufficientData {
                available: records.len(),
                required: MIN_TRAINING_RECORDS,
            });
        }

        classifier.train(&records)?;
        tracing::info!("Model trained on {} records", records.len());
        Ok(())
    }

    /// Run `f` against the trained classifier under the read lock.
    ///
    /// # Errors
    /// Returns `CardioError::Assessment` if the lock is poisoned, or the error of `f`.
    pub fn with_classifier<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&C) -> Result<T>,
    {
        let classifier = self.classifier.read().map_err(poisoned)?;
        f(&classifier)
    }
}

fn poisoned<T>(_: std::sync::PoisonError<T>) -> CardioError {
    CardioError::Assessment("model state lock poisoned".to_string())
}

/// Service producing risk assessments for patients.
pub struct AssessmentService<C: RiskClassifier> {
    model: ModelState<C>,
    engine: RecommendationEngine,
}

impl<C: RiskClassifier> AssessmentService<C> {
    /// Create a new assessment service around an untrained classifier.
    #[must_use]
    pub fn new(classifier: C) -> Self {
        Self {
            model: ModelState::new(classifier),
            engine: RecommendationEngine,
        }
    }

    /// Shared model state.
    #[must_use]
    pub fn model(&self) -> &ModelState<C> {
        &self.model
    }

    /// Assess `record`, training on `history` first if the model is untrained.
    ///
    /// # Errors
    /// Returns `InsufficientData` when training is needed and `history` is too
    /// small, and `Assessment` for any unexpected failure (including
    /// malformed record data).
    pub fn assess(
        &self,
        record: &PatientRecord,
        history: &[PatientRecord],
    ) -> Result<RiskAssessment> {
        self.assess_with(record, || Ok(history.to_vec()))
    }

    /// Look up a stored patient and assess it, loading the training set from
    /// the same store only if the model is untrained.
    ///
    /// # Errors
    /// Returns `PatientNotFound` if `id` is unknown; otherwise as [`Self::assess`].
    pub fn assess_patient<S: PatientStore>(
        &self,
        store: &S,
        id: i64,
    ) -> Result<RiskAssessment> {
        let record = store
            .fetch_record(id)
            .map_err(|e| CardioError::Assessment(e.to_string()))?
            .ok_or(CardioError::PatientNotFound(id))?;

        tracing::debug!("Assessing patient_id={id}");
        self.assess_with(&record, || {
            store
                .fetch_all_records()
                .map_err(|e| CardioError::Assessment(e.to_string()))
        })
    }

    fn assess_with<F>(&self, record: &PatientRecord, history: F) -> Result<RiskAssessment>
    where
        F: FnOnce() -> Result<Vec<PatientRecord>>,
    {
        self.run(record, history)
            .map_err(CardioError::into_classified)
    }

    fn run<F>(&self, record: &PatientRecord, history: F) -> Result<RiskAssessment>
    where
        F: FnOnce() -> Result<Vec<PatientRecord>>,
    {
        if let Err(errors) = record.validate() {
            tracing::warn!("Rejected malformed record ({} problems)", errors.len());
            return Err(CardioError::Validation(errors.join("; ")));
        }

        self.model.ensure_trained(history)?;

        let features = record.features();
        let (probability, factors) = self.model.with_classifier(|c| {
            let probability = c.score(record)?;
            let factors = c.top_factors(&features, TOP_FACTORS)?;
            Ok((probability, factors))
        })?;

        let health = HealthMetrics::for_record(record);
        let bmi = metrics::bmi(record.weight, record.height);
        let advice = self.engine.build(record, probability, &factors, bmi);

        tracing::info!(
            "Assessment complete: risk={}, probability={:.1}%, {} recommendations",
            advice.tier,
            probability * 100.0,
            advice.lines.len()
        );

        Ok(RiskAssessment {
            probability,
            tier: advice.tier,
            color: advice.color,
            factors,
            metrics: health,
            recommendations: advice.lines,
            assessed_at: chrono::Utc::now(),
        })
    }
}
