//! Derived health metrics.
//!
//! Pure functions over a patient's raw attributes. Nothing here depends on
//! the trained model.

use serde::{Deserialize, Serialize};

use super::patient::PatientRecord;
use super::units::days_to_years;

/// Body-mass index (kg/m²) from weight in kilograms and height in centimeters.
///
/// Height must be positive; records are validated before reaching here.
#[must_use]
pub fn bmi(weight_kg: f64, height_cm: f64) -> f64 {
    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// WHO body-mass index bands. Each band includes its lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BmiCategory {
    SevereThinness,
    ModerateThinness,
    MildThinness,
    Normal,
    Overweight,
    ObesityI,
    ObesityII,
    ObesityIII,
}

impl BmiCategory {
    /// Classify a BMI value.
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 16.0 {
            Self::SevereThinness
        } else if bmi < 17.0 {
            Self::ModerateThinness
        } else if bmi < 18.5 {
            Self::MildThinness
        } else if bmi < 25.0 {
            Self::Normal
        } else if bmi < 30.0 {
            Self::Overweight
        } else if bmi < 35.0 {
            Self::ObesityI
        } else if bmi < 40.0 {
            Self::ObesityII
        } else {
            Self::ObesityIII
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::SevereThinness => "Severe thinness",
            Self::ModerateThinness => "Moderate thinness",
            Self::MildThinness => "Mild thinness",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::ObesityI => "Obesity class I",
            Self::ObesityII => "Obesity class II",
            Self::ObesityIII => "Obesity class III",
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Blood-pressure classification, evaluated from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodPressureCategory {
    Normal,
    NormalHigh,
    PreHypertension,
    HypertensionGrade1,
    HypertensionGrade2,
    HypertensiveCrisis,
}

impl BloodPressureCategory {
    /// Classify a systolic/diastolic pair. Either reading alone can escalate.
    #[must_use]
    pub fn classify(systolic: i32, diastolic: i32) -> Self {
        if systolic >= 180 || diastolic >= 110 {
            Self::HypertensiveCrisis
        } else if systolic >= 160 || diastolic >= 100 {
            Self::HypertensionGrade2
        } else if systolic >= 140 || diastolic >= 90 {
            Self::HypertensionGrade1
        } else if systolic >= 130 || diastolic >= 85 {
            Self::PreHypertension
        } else if systolic >= 120 || diastolic >= 80 {
            Self::NormalHigh
        } else {
            Self::Normal
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::NormalHigh => "High normal",
            Self::PreHypertension => "Pre-hypertension",
            Self::HypertensionGrade1 => "Hypertension grade 1",
            Self::HypertensionGrade2 => "Hypertension grade 2",
            Self::HypertensiveCrisis => "Hypertensive crisis",
        }
    }
}

impl std::fmt::Display for BloodPressureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// Metabolic-age penalties, in days.
const OBESITY_PENALTY: i64 = 1825;
const OVERWEIGHT_PENALTY: i64 = 730;
const UNDERWEIGHT_PENALTY: i64 = 365;
const HYPERTENSION_PENALTY: i64 = 1460;
const PRE_HYPERTENSION_PENALTY: i64 = 730;
const CHOLESTEROL_VERY_HIGH_PENALTY: i64 = 1825;
const CHOLESTEROL_HIGH_PENALTY: i64 = 730;
const GLUCOSE_VERY_HIGH_PENALTY: i64 = 1460;
const GLUCOSE_HIGH_PENALTY: i64 = 730;
const SMOKING_PENALTY: i64 = 1825;
const ALCOHOL_PENALTY: i64 = 730;
const SEDENTARY_PENALTY: i64 = 1095;

/// Chronological age adjusted upward by additive penalties, in days.
///
/// Penalties from different categories accumulate. Within the BMI and
/// blood-pressure checks only the first matching band applies.
#[must_use]
pub fn metabolic_age_days(record: &PatientRecord) -> i64 {
    let mut age = record.age;
    let bmi = bmi(record.weight, record.height);

    if bmi >= 30.0 {
        age = age.saturating_add(OBESITY_PENALTY);
    } else if bmi >= 25.0 {
        age = age.saturating_add(OVERWEIGHT_PENALTY);
    } else if bmi < 18.5 {
        age = age.saturating_add(UNDERWEIGHT_PENALTY);
    }

    if record.ap_hi >= 140 || record.ap_lo >= 90 {
        age = age.saturating_add(HYPERTENSION_PENALTY);
    } else if record.ap_hi >= 130 || record.ap_lo >= 85 {
        age = age.saturating_add(PRE_HYPERTENSION_PENALTY);
    }

    match record.cholesterol {
        3 => age = age.saturating_add(CHOLESTEROL_VERY_HIGH_PENALTY),
        2 => age = age.saturating_add(CHOLESTEROL_HIGH_PENALTY),
        _ => {}
    }

    match record.gluc {
        3 => age = age.saturating_add(GLUCOSE_VERY_HIGH_PENALTY),
        2 => age = age.saturating_add(GLUCOSE_HIGH_PENALTY),
        _ => {}
    }

    if record.smoke {
        age = age.saturating_add(SMOKING_PENALTY);
    }
    if record.alco {
        age = age.saturating_add(ALCOHOL_PENALTY);
    }
    if !record.active {
        age = age.saturating_add(SEDENTARY_PENALTY);
    }

    age
}

/// Derived metrics for one patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthMetrics {
    /// BMI rounded to one decimal place, for display
    pub bmi: f64,

    /// Category of the unrounded BMI
    pub bmi_category: BmiCategory,

    pub blood_pressure: BloodPressureCategory,

    /// Metabolic age in days
    pub metabolic_age_days: i64,
}

impl HealthMetrics {
    /// Compute every derived metric for a record.
    #[must_use]
    pub fn for_record(record: &PatientRecord) -> Self {
        let raw_bmi = bmi(record.weight, record.height);
        Self {
            bmi: (raw_bmi * 10.0).round() / 10.0,
            bmi_category: BmiCategory::from_bmi(raw_bmi),
            blood_pressure: BloodPressureCategory::classify(record.ap_hi, record.ap_lo),
            metabolic_age_days: metabolic_age_days(record),
        }
    }

    /// Metabolic age in whole years.
    #[must_use]
    pub fn metabolic_age_years(&self) -> i64 {
        days_to_years(self.metabolic_age_days)
    }
}
