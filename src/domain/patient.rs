//! Patient record types for cardiovascular risk prediction.
//!
//! Units are fixed at this layer: age in days, height in centimeters,
//! weight in kilograms, blood pressure in mmHg.

use serde::{Deserialize, Serialize};

/// Number of features consumed by the classifier.
pub const FEATURE_COUNT: usize = 11;

/// Feature names in canonical column order.
///
/// Training rows and scoring rows are both built in this order; `cardio`
/// is the label and never a feature.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "age",
    "gender",
    "height",
    "weight",
    "ap_hi",
    "ap_lo",
    "cholesterol",
    "gluc",
    "smoke",
    "alco",
    "active",
];

/// Index of systolic pressure in [`FEATURE_NAMES`].
pub const AP_HI_INDEX: usize = 4;

/// Index of cholesterol in [`FEATURE_NAMES`].
pub const CHOLESTEROL_INDEX: usize = 6;

/// A single patient's clinical attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Age in days
    pub age: i64,

    /// 0 = female, 1 = male
    pub gender: u8,

    /// Height in centimeters
    pub height: f64,

    /// Weight in kilograms
    pub weight: f64,

    /// Systolic blood pressure (mmHg)
    pub ap_hi: i32,

    /// Diastolic blood pressure (mmHg)
    pub ap_lo: i32,

    /// 1 = normal, 2 = above normal, 3 = well above normal
    pub cholesterol: u8,

    /// 1 = normal, 2 = above normal, 3 = well above normal
    pub gluc: u8,

    /// Smoker
    pub smoke: bool,

    /// Alcohol intake
    pub alco: bool,

    /// Physically active
    pub active: bool,

    /// Cardiovascular disease present (training label only)
    pub cardio: bool,
}

impl PatientRecord {
    /// Build the canonical feature vector for this record.
    #[must_use]
    pub fn features(&self) -> FeatureVector {
        FeatureVector::from(self)
    }

    /// Validate the structural invariants of the record.
    ///
    /// # Errors
    /// Returns validation errors as a vector of strings.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.age <= 0 {
            errors.push(format!("Age {} must be positive (days)", self.age));
        }
        if self.gender > 1 {
            errors.push(format!("Gender {} must be 0 or 1", self.gender));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            errors.push(format!("Height {} must be positive (cm)", self.height));
        }
        if !(self.weight.is_finite() && self.weight > 0.0) {
            errors.push(format!("Weight {} must be positive (kg)", self.weight));
        }
        if !(1..=3).contains(&self.cholesterol) {
            errors.push(format!("Cholesterol {} must be 1, 2 or 3", self.cholesterol));
        }
        if !(1..=3).contains(&self.gluc) {
            errors.push(format!("Glucose {} must be 1, 2 or 3", self.gluc));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Ordered numeric features derived from exactly one [`PatientRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    /// Raw values in canonical order.
    #[must_use]
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    /// Value of the feature at `index`.
    ///
    /// # Panics
    /// Panics if `index >= FEATURE_COUNT`.
    #[must_use]
    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }

    /// Iterate `(name, value)` pairs in canonical order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURE_NAMES.iter().copied().zip(self.0.iter().copied())
    }
}

impl From<&PatientRecord> for FeatureVector {
    fn from(r: &PatientRecord) -> Self {
        Self([
            r.age as f64,
            f64::from(r.gender),
            r.height,
            r.weight,
            f64::from(r.ap_hi),
            f64::from(r.ap_lo),
            f64::from(r.cholesterol),
            f64::from(r.gluc),
            flag(r.smoke),
            flag(r.alco),
            flag(r.active),
        ])
    }
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::sample_record;

    #[test]
    fn test_features_follow_canonical_order() {
        let record = PatientRecord {
            age: 18_250,
            gender: 1,
            height: 172.0,
            weight: 81.5,
            ap_hi: 135,
            ap_lo: 88,
            cholesterol: 2,
            gluc: 3,
            smoke: true,
            alco: false,
            active: true,
            cardio: true,
        };

        let v = record.features();
        assert_eq!(
            v.values(),
            &[18_250.0, 1.0, 172.0, 81.5, 135.0, 88.0, 2.0, 3.0, 1.0, 0.0, 1.0]
        );
        assert_eq!(FEATURE_NAMES[AP_HI_INDEX], "ap_hi");
        assert_eq!(FEATURE_NAMES[CHOLESTEROL_INDEX], "cholesterol");
    }

    #[test]
    fn test_label_is_not_a_feature() {
        let mut record = sample_record();
        let with_label = record.features();
        record.cardio = !record.cardio;
        assert_eq!(with_label, record.features());
        assert!(!FEATURE_NAMES.contains(&"cardio"));
    }

    #[test]
    fn test_named_pairs() {
        let v = sample_record().features();
        let names: Vec<_> = v.named().map(|(n, _)| n).collect();
        assert_eq!(names, FEATURE_NAMES);
    }

    #[test]
    fn test_validation() {
        assert!(sample_record().validate().is_ok());

        let invalid = PatientRecord {
            age: 0,
            height: -1.0,
            cholesterol: 4,
            gender: 2,
            ..sample_record()
        };
        let errors = invalid.validate().expect_err("Should reject");
        assert_eq!(errors.len(), 4);
    }
}
