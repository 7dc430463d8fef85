//! Rule-based recommendation engine.
//!
//! Maps a scored patient to an ordered list of advice lines. Sections are
//! appended in a fixed order: risk tier, top factors, BMI, habits, general
//! wellness. Nothing is sorted or de-duplicated.

use serde::Serialize;

use crate::domain::{FactorContribution, PatientRecord, RiskTier, AP_HI_INDEX, CHOLESTEROL_INDEX};

const EXTREME_RISK: [&str; 3] = [
    "EMERGENCY: Extremely high cardiovascular risk (>80%)",
    "See a cardiologist within the next 48 hours",
    "Contact your primary care physician immediately",
];

const HIGH_RISK: [&str; 3] = [
    "ALERT: High cardiovascular risk (60-80%)",
    "Schedule a cardiology appointment within the next 7 days",
    "Monitor your blood pressure daily",
];

const HIGH_PRESSURE: [&str; 3] = [
    "Elevated blood pressure: take your medication on schedule",
    "Reduce salt intake to less than 5 g/day",
    "Target: below 135/85 mmHg in home readings",
];

const CHOLESTEROL_VERY_HIGH: [&str; 3] = [
    "Very high cholesterol: pharmacological treatment required",
    "Eliminate trans and saturated fats from your diet",
    "Statins may be needed (consult your physician)",
];

const CHOLESTEROL_LIFESTYLE: [&str; 2] = [
    "Increase healthy fats in your diet (avocado, nuts)",
    "Aerobic exercise 4 times a week to improve your lipid profile",
];

const OBESITY: [&str; 3] = [
    "Obesity: weight loss is a priority (5-10% within 6 months)",
    "See a nutritionist for a personalised plan",
    "Walk at least 45 minutes every day",
];

const OVERWEIGHT: [&str; 3] = [
    "Overweight: avoid gaining more weight",
    "Reduce portion sizes and eat more vegetables",
    "Combine cardio with strength training",
];

const SMOKING: [&str; 3] = [
    "Smoking: join a smoking cessation program urgently",
    "Install your health service's quit-smoking app",
    "Call a quit-smoking support line",
];

const SEDENTARY: [&str; 3] = [
    "Sedentary lifestyle: start with 10 minutes of exercise a day",
    "Use a pedometer: aim for 8,000 steps a day",
    "Stand up every 30 minutes if you work seated",
];

const GENERAL_WELLNESS: [&str; 3] = [
    "Hydration: 2 L of water a day (unless medically contraindicated)",
    "Stress management: 5 minutes of breathing exercises a day",
    "Sleep: 7-9 hours a night on a regular schedule",
];

/// Tier, display color and ordered advice for one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub tier: RiskTier,
    pub color: &'static str,
    pub lines: Vec<String>,
}

/// Deterministic mapper from a scored patient to advice.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecommendationEngine;

impl RecommendationEngine {
    /// Build the recommendations for a scored patient.
    ///
    /// `bmi` is the meters-based body-mass index of `record`.
    #[must_use]
    pub fn build(
        &self,
        record: &PatientRecord,
        probability: f64,
        factors: &[FactorContribution],
        bmi: f64,
    ) -> Recommendations {
        let tier = RiskTier::from_probability(probability);
        let mut lines: Vec<String> = Vec::new();
        let mut extend = |block: &[&str]| lines.extend(block.iter().map(|s| (*s).to_string()));

        match tier {
            RiskTier::Extreme => extend(&EXTREME_RISK),
            RiskTier::High => extend(&HIGH_RISK),
            RiskTier::Moderate | RiskTier::Low => {}
        }

        for factor in factors {
            match factor.index {
                AP_HI_INDEX if record.ap_hi > 140 => extend(&HIGH_PRESSURE),
                CHOLESTEROL_INDEX if record.cholesterol == 3 => extend(&CHOLESTEROL_VERY_HIGH),
                CHOLESTEROL_INDEX => extend(&CHOLESTEROL_LIFESTYLE),
                _ => {}
            }
        }

        if bmi >= 30.0 {
            extend(&OBESITY);
        } else if bmi >= 25.0 {
            extend(&OVERWEIGHT);
        }

        if record.smoke {
            extend(&SMOKING);
        }
        if !record.active {
            extend(&SEDENTARY);
        }

        extend(&GENERAL_WELLNESS);

        Recommendations {
            tier,
            color: tier.color(),
            lines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FEATURE_NAMES;
    use crate::fixtures::sample_record;

    fn factor(index: usize, value: f64) -> FactorContribution {
        FactorContribution {
            name: FEATURE_NAMES[index],
            index,
            importance: 0.2,
            value,
        }
    }

    fn healthy() -> PatientRecord {
        PatientRecord {
            smoke: false,
            active: true,
            ..sample_record()
        }
    }

    #[test]
    fn test_low_risk_gets_only_general_block() {
        let out = RecommendationEngine.build(&healthy(), 0.2, &[factor(0, 18_000.0)], 22.0);
        assert_eq!(out.tier, RiskTier::Low);
        assert_eq!(out.color, "#00B050");
        assert_eq!(out.lines, GENERAL_WELLNESS.map(String::from).to_vec());
    }

    #[test]
    fn test_moderate_has_no_urgent_lines() {
        let out = RecommendationEngine.build(&healthy(), 0.5, &[], 22.0);
        assert_eq!(out.tier, RiskTier::Moderate);
        assert_eq!(out.lines.len(), GENERAL_WELLNESS.len());
    }

    #[test]
    fn test_tier_boundary() {
        let at = RecommendationEngine.build(&healthy(), 0.8, &[], 22.0);
        assert_eq!(at.tier, RiskTier::High);
        assert_eq!(at.lines[0], HIGH_RISK[0]);

        let above = RecommendationEngine.build(&healthy(), 0.800_000_1, &[], 22.0);
        assert_eq!(above.tier, RiskTier::Extreme);
        assert_eq!(above.lines[0], EXTREME_RISK[0]);
    }

    #[test]
    fn test_sections_concatenate_in_fixed_order() {
        let record = PatientRecord {
            ap_hi: 160,
            cholesterol: 3,
            smoke: true,
            active: false,
            ..sample_record()
        };
        let factors = [
            factor(CHOLESTEROL_INDEX, 3.0),
            factor(AP_HI_INDEX, 160.0),
            factor(0, 20_000.0),
        ];
        let out = RecommendationEngine.build(&record, 0.9, &factors, 31.0);

        let expected: Vec<String> = EXTREME_RISK
            .iter()
            .chain(&CHOLESTEROL_VERY_HIGH)
            .chain(&HIGH_PRESSURE)
            .chain(&OBESITY)
            .chain(&SMOKING)
            .chain(&SEDENTARY)
            .chain(&GENERAL_WELLNESS)
            .map(|s| (*s).to_string())
            .collect();
        assert_eq!(out.lines, expected);
    }

    #[test]
    fn test_factor_rules() {
        // Systolic at exactly 140 is not elevated for this rule.
        let borderline = PatientRecord { ap_hi: 140, ..healthy() };
        let out = RecommendationEngine.build(&borderline, 0.1, &[factor(AP_HI_INDEX, 140.0)], 22.0);
        assert!(!out.lines.contains(&HIGH_PRESSURE[0].to_string()));

        let moderate_chol = PatientRecord { cholesterol: 2, ..healthy() };
        let out = RecommendationEngine.build(
            &moderate_chol,
            0.1,
            &[factor(CHOLESTEROL_INDEX, 2.0)],
            22.0,
        );
        assert_eq!(out.lines[0], CHOLESTEROL_LIFESTYLE[0]);
        assert_eq!(out.lines.len(), CHOLESTEROL_LIFESTYLE.len() + GENERAL_WELLNESS.len());
    }

    #[test]
    fn test_bmi_bands() {
        let out = RecommendationEngine.build(&healthy(), 0.1, &[], 25.0);
        assert_eq!(out.lines[0], OVERWEIGHT[0]);

        let out = RecommendationEngine.build(&healthy(), 0.1, &[], 30.0);
        assert_eq!(out.lines[0], OBESITY[0]);

        let out = RecommendationEngine.build(&healthy(), 0.1, &[], 24.9);
        assert_eq!(out.lines[0], GENERAL_WELLNESS[0]);
    }

    #[test]
    fn test_build_is_idempotent() {
        let record = PatientRecord {
            smoke: true,
            ..sample_record()
        };
        let factors = [factor(AP_HI_INDEX, 150.0)];
        let a = RecommendationEngine.build(&record, 0.65, &factors, 27.0);
        let b = RecommendationEngine.build(&record, 0.65, &factors, 27.0);
        assert_eq!(a, b);
    }
}
