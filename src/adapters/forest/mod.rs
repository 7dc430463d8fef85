//! Random-forest adapter: Implementation of RiskClassifier.
//!
//! Bagged ensemble of Gini decision trees with balanced class weights,
//! bounded depth and per-split feature subsampling.
//!
//! # Reproducibility
//!
//! Each tree draws its bootstrap sample and split candidates from its own
//! `ChaCha8Rng`, seeded from the configured seed plus the tree index. Trees
//! are fitted in parallel, but the fitted forest does not depend on thread
//! scheduling.

mod tree;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::domain::{FactorContribution, FeatureVector, PatientRecord, FEATURE_COUNT, FEATURE_NAMES};
use crate::ports::RiskClassifier;
use crate::{CardioError, Result, MIN_TRAINING_RECORDS};

use tree::{DecisionTree, Row, TreeParams};

/// How many candidate features each split examines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaxFeatures {
    /// ⌊√n⌋ features
    Sqrt,
    /// Every feature
    All,
    /// A fixed count (clamped to the feature count)
    Count(usize),
}

impl MaxFeatures {
    fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            Self::Sqrt => (n_features as f64).sqrt().floor() as usize,
            Self::All => n_features,
            Self::Count(k) => k,
        };
        k.clamp(1, n_features)
    }
}

/// Per-class sample weighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassWeight {
    /// Weight inversely proportional to class frequency: n / (2 · n_class)
    Balanced,
    /// Every sample weighs 1
    Uniform,
}

/// Configuration for the random forest.
#[derive(Debug, Clone)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub max_features: MaxFeatures,
    pub class_weight: ClassWeight,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 150,
            max_depth: 10,
            min_samples_split: 5,
            max_features: MaxFeatures::Sqrt,
            class_weight: ClassWeight::Balanced,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestConfig {
    /// Load config overrides from environment (best-effort).
    ///
    /// Supported:
    /// - CARDIOSENSE_FOREST_TREES
    /// - CARDIOSENSE_FOREST_MAX_DEPTH
    /// - CARDIOSENSE_FOREST_MIN_SPLIT
    /// - CARDIOSENSE_FOREST_SEED
    #[must_use]
    pub fn from_env_or_default() -> Self {
        let mut cfg = Self::default();

        if let Some(x) = env_usize("CARDIOSENSE_FOREST_TREES").filter(|&x| x > 0) {
            cfg.n_trees = x;
        }
        if let Some(x) = env_usize("CARDIOSENSE_FOREST_MAX_DEPTH").filter(|&x| x > 0) {
            cfg.max_depth = x;
        }
        if let Some(x) = env_usize("CARDIOSENSE_FOREST_MIN_SPLIT").filter(|&x| x >= 2) {
            cfg.min_samples_split = x;
        }
        if let Ok(v) = std::env::var("CARDIOSENSE_FOREST_SEED") {
            if let Ok(x) = v.trim().parse::<u64>() {
                cfg.seed = x;
            }
        }

        cfg
    }

    fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            max_features: self.max_features.resolve(FEATURE_COUNT),
        }
    }
}

fn env_usize(name: &str) -> Option<usize> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// A fitted ensemble.
struct TrainedForest {
    trees: Vec<DecisionTree>,
    /// Mean decrease in impurity, normalized to sum to 1 (or all zero)
    importances: [f64; FEATURE_COUNT],
}

/// Random-forest risk classifier.
pub struct RandomForestClassifier {
    config: ForestConfig,
    model: Option<TrainedForest>,
}

impl RandomForestClassifier {
    /// Create an untrained classifier with configuration from the environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ForestConfig::from_env_or_default())
    }

    /// Create an untrained classifier with custom configuration.
    #[must_use]
    pub fn with_config(config: ForestConfig) -> Self {
        Self {
            config,
            model: None,
        }
    }

    /// Per-feature importances aligned with `FEATURE_NAMES`, once trained.
    #[must_use]
    pub fn feature_importances(&self) -> Option<&[f64; FEATURE_COUNT]> {
        self.model.as_ref().map(|m| &m.importances)
    }

    fn trained(&self) -> Result<&TrainedForest> {
        self.model.as_ref().ok_or(CardioError::ModelNotTrained)
    }

    fn class_weights(&self, labels: &[bool]) -> (f64, f64) {
        match self.config.class_weight {
            ClassWeight::Uniform => (1.0, 1.0),
            ClassWeight::Balanced => {
                let n = labels.len() as f64;
                let positives = labels.iter().filter(|&&l| l).count() as f64;
                let negatives = n - positives;
                let weight = |count: f64| if count > 0.0 { n / (2.0 * count) } else { 0.0 };
                (weight(negatives), weight(positives))
            }
        }
    }

    fn fit_tree(
        &self,
        tree_index: usize,
        rows: &[Row],
        labels: &[bool],
        weights: &[f64],
    ) -> (DecisionTree, [f64; FEATURE_COUNT]) {
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed.wrapping_add(tree_index as u64));
        let n = rows.len();
        let samples: Vec<usize> = if self.config.bootstrap {
            (0..n).map(|_| rng.gen_range(0..n)).collect()
        } else {
            (0..n).collect()
        };

        let (tree, mut importances) = DecisionTree::fit(
            rows,
            labels,
            weights,
            samples,
            self.config.tree_params(),
            &mut rng,
        );
        normalize(&mut importances);
        (tree, importances)
    }
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskClassifier for RandomForestClassifier {
    fn train(&mut self, records: &[PatientRecord]) -> Result<()> {
        if records.len() < MIN_TRAINING_RECORDS {
            return Err(CardioError::InsufficientData {
                available: records.len(),
                required: MIN_TRAINING_RECORDS,
            });
        }

        let rows: Vec<Row> = records.iter().map(|r| *r.features().values()).collect();
        let labels: Vec<bool> = records.iter().map(|r| r.cardio).collect();
        let (negative_weight, positive_weight) = self.class_weights(&labels);
        let weights: Vec<f64> = labels
            .iter()
            .map(|&l| if l { positive_weight } else { negative_weight })
            .collect();

        tracing::info!(
            "Training random forest: {} records ({} positive), {} trees, max_depth={}",
            records.len(),
            labels.iter().filter(|&&l| l).count(),
            self.config.n_trees,
            self.config.max_depth
        );

        let fitted: Vec<(DecisionTree, [f64; FEATURE_COUNT])> = (0..self.config.n_trees)
            .into_par_iter()
            .map(|t| self.fit_tree(t, &rows, &labels, &weights))
            .collect();

        let mut importances = [0.0; FEATURE_COUNT];
        for (_, tree_importances) in &fitted {
            for (acc, v) in importances.iter_mut().zip(tree_importances) {
                *acc += v;
            }
        }
        normalize(&mut importances);

        let trees: Vec<DecisionTree> = fitted.into_iter().map(|(tree, _)| tree).collect();
        tracing::debug!(
            "Forest fitted: {} nodes total",
            trees.iter().map(DecisionTree::node_count).sum::<usize>()
        );

        self.model = Some(TrainedForest { trees, importances });
        Ok(())
    }

    fn is_trained(&self) -> bool {
        self.model.is_some()
    }

    fn score(&self, record: &PatientRecord) -> Result<f64> {
        let model = self.trained()?;
        let row = record.features();
        let sum: f64 = model.trees.iter().map(|t| t.predict(row.values())).sum();
        Ok((sum / model.trees.len().max(1) as f64).clamp(0.0, 1.0))
    }

    fn top_factors(
        &self,
        features: &FeatureVector,
        n: usize,
    ) -> Result<Vec<FactorContribution>> {
        let model = self.trained()?;

        // Stable sort keeps canonical order among equal importances.
        let mut order: Vec<usize> = (0..FEATURE_COUNT).collect();
        order.sort_by(|&a, &b| model.importances[b].total_cmp(&model.importances[a]));

        Ok(order
            .into_iter()
            .take(n.min(FEATURE_COUNT))
            .map(|index| FactorContribution {
                name: FEATURE_NAMES[index],
                index,
                importance: (model.importances[index] * 10_000.0).round() / 10_000.0,
                value: features.get(index),
            })
            .collect())
    }
}

/// Scale to sum 1 in place; all-zero input stays zero.
fn normalize(values: &mut [f64; FEATURE_COUNT]) {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        for v in values.iter_mut() {
            *v /= total;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AP_HI_INDEX, CHOLESTEROL_INDEX};
    use crate::fixtures::{sample_record, synthetic_cohort};

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_trees: 25,
            ..ForestConfig::default()
        }
    }

    fn trained_forest() -> RandomForestClassifier {
        let mut forest = RandomForestClassifier::with_config(small_config());
        forest
            .train(&synthetic_cohort(300, 7))
            .expect("Should train");
        forest
    }

    #[test]
    fn test_default_config() {
        let cfg = ForestConfig::default();
        assert_eq!(cfg.n_trees, 150);
        assert_eq!(cfg.max_depth, 10);
        assert_eq!(cfg.min_samples_split, 5);
        assert_eq!(cfg.seed, 42);
        assert_eq!(cfg.max_features.resolve(FEATURE_COUNT), 3);
        assert_eq!(MaxFeatures::Count(50).resolve(FEATURE_COUNT), FEATURE_COUNT);
    }

    #[test]
    fn test_train_requires_minimum_records() {
        let mut forest = RandomForestClassifier::with_config(small_config());
        let err = forest
            .train(&synthetic_cohort(99, 1))
            .expect_err("Should reject 99 records");
        assert!(matches!(
            err,
            CardioError::InsufficientData {
                available: 99,
                required: 100
            }
        ));
        assert!(!forest.is_trained());

        forest
            .train(&synthetic_cohort(100, 1))
            .expect("Should accept 100 records");
        assert!(forest.is_trained());
    }

    #[test]
    fn test_score_before_training_fails() {
        let forest = RandomForestClassifier::with_config(small_config());
        assert!(matches!(
            forest.score(&sample_record()),
            Err(CardioError::ModelNotTrained)
        ));
        assert!(matches!(
            forest.top_factors(&sample_record().features(), 3),
            Err(CardioError::ModelNotTrained)
        ));
    }

    #[test]
    fn test_score_is_probability_and_deterministic() {
        let forest = trained_forest();
        let record = sample_record();
        let p1 = forest.score(&record).expect("Should score");
        let p2 = forest.score(&record).expect("Should score");
        assert!((0.0..=1.0).contains(&p1));
        assert_eq!(p1.to_bits(), p2.to_bits());
    }

    #[test]
    fn test_training_is_reproducible() {
        let a = trained_forest();
        let b = trained_forest();
        assert_eq!(a.feature_importances(), b.feature_importances());

        let record = sample_record();
        assert_eq!(
            a.score(&record).expect("Should score").to_bits(),
            b.score(&record).expect("Should score").to_bits()
        );
    }

    #[test]
    fn test_learns_the_signal() {
        let forest = trained_forest();
        let low = PatientRecord {
            ap_hi: 110,
            ap_lo: 70,
            cholesterol: 1,
            ..sample_record()
        };
        let high = PatientRecord {
            ap_hi: 175,
            ap_lo: 100,
            cholesterol: 3,
            ..sample_record()
        };
        let p_low = forest.score(&low).expect("Should score");
        let p_high = forest.score(&high).expect("Should score");
        assert!(p_high > p_low, "p_high={p_high} p_low={p_low}");

        let importances = forest.feature_importances().expect("Trained");
        let sum: f64 = importances.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let top: Vec<usize> = forest
            .top_factors(&high.features(), 3)
            .expect("Should rank")
            .into_iter()
            .map(|f| f.index)
            .collect();
        assert!(top.contains(&AP_HI_INDEX));
        assert!(top.contains(&CHOLESTEROL_INDEX));
    }

    #[test]
    fn test_top_factors_descending_with_patient_values() {
        let forest = trained_forest();
        let record = sample_record();
        let factors = forest
            .top_factors(&record.features(), 3)
            .expect("Should rank");

        assert_eq!(factors.len(), 3);
        for pair in factors.windows(2) {
            assert!(pair[0].importance >= pair[1].importance);
        }
        for f in &factors {
            assert_eq!(FEATURE_NAMES[f.index], f.name);
            assert_eq!(f.value, record.features().get(f.index));
        }

        let all = forest
            .top_factors(&record.features(), 50)
            .expect("Should rank");
        assert_eq!(all.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_single_class_ties_keep_canonical_order() {
        let records: Vec<PatientRecord> = synthetic_cohort(120, 3)
            .into_iter()
            .map(|r| PatientRecord { cardio: false, ..r })
            .collect();
        let mut forest = RandomForestClassifier::with_config(small_config());
        forest.train(&records).expect("Should train");

        assert_eq!(forest.score(&sample_record()).expect("Should score"), 0.0);
        let names: Vec<&str> = forest
            .top_factors(&sample_record().features(), 3)
            .expect("Should rank")
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["age", "gender", "height"]);
    }
}
