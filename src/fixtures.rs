//! Deterministic test data shared by unit tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::units::{years_to_days, DAYS_PER_YEAR};
use crate::domain::PatientRecord;

/// A plausible middle-aged patient with no extreme values.
pub(crate) fn sample_record() -> PatientRecord {
    PatientRecord {
        age: 18_393,
        gender: 0,
        height: 168.0,
        weight: 62.0,
        ap_hi: 120,
        ap_lo: 80,
        cholesterol: 1,
        gluc: 1,
        smoke: false,
        alco: false,
        active: true,
        cardio: false,
    }
}

/// Synthetic labeled cohort where risk is driven mostly by systolic
/// pressure and cholesterol, with some label noise.
pub(crate) fn synthetic_cohort(n: usize, seed: u64) -> Vec<PatientRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let ap_hi: i32 = rng.gen_range(100..=190);
            let ap_lo: i32 = rng.gen_range(60..=ap_hi.min(120) - 20);
            let cholesterol: u8 = rng.gen_range(1..=3);
            let height: f64 = rng.gen_range(150.0..195.0);
            let weight: f64 = rng.gen_range(48.0..120.0);
            let signal = ap_hi >= 140 || cholesterol == 3;
            let cardio = if rng.gen_bool(0.05) { !signal } else { signal };
            PatientRecord {
                age: years_to_days(rng.gen_range(30..=64)) + rng.gen_range(0..DAYS_PER_YEAR),
                gender: rng.gen_range(0..=1),
                height,
                weight,
                ap_hi,
                ap_lo,
                cholesterol,
                gluc: rng.gen_range(1..=3),
                smoke: rng.gen_bool(0.2),
                alco: rng.gen_bool(0.1),
                active: rng.gen_bool(0.7),
                cardio,
            }
        })
        .collect()
}
