//! Weighted CART decision tree with Gini impurity.

use rand::seq::index;
use rand::Rng;

use crate::domain::FEATURE_COUNT;

pub(crate) type Row = [f64; FEATURE_COUNT];

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Candidate features drawn per split
    pub max_features: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        /// Weighted fraction of positive samples
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Training view shared by every node of one tree.
struct Training<'a> {
    rows: &'a [Row],
    labels: &'a [bool],
    /// Per-sample weight (class weight)
    weights: &'a [f64],
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    decrease: f64,
}

#[derive(Debug, Clone)]
pub(crate) struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree over `samples` (indices into `rows`, duplicates allowed).
    ///
    /// Returns the tree and its unnormalized impurity decrease per feature.
    pub(crate) fn fit<R: Rng>(
        rows: &[Row],
        labels: &[bool],
        weights: &[f64],
        samples: Vec<usize>,
        params: TreeParams,
        rng: &mut R,
    ) -> (Self, [f64; FEATURE_COUNT]) {
        let data = Training {
            rows,
            labels,
            weights,
        };
        let mut builder = Builder {
            data: &data,
            params,
            nodes: Vec::new(),
            importances: [0.0; FEATURE_COUNT],
        };
        builder.grow(samples, 0, rng);

        (
            Self {
                nodes: builder.nodes,
            },
            builder.importances,
        )
    }

    /// Positive-class probability for one row.
    pub(crate) fn predict(&self, row: &Row) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

struct Builder<'a, 'd> {
    data: &'a Training<'d>,
    params: TreeParams,
    nodes: Vec<Node>,
    importances: [f64; FEATURE_COUNT],
}

impl Builder<'_, '_> {
    fn grow<R: Rng>(&mut self, samples: Vec<usize>, depth: usize, rng: &mut R) -> usize {
        let (pos, total) = self.weighted_totals(&samples);
        let value = if total > 0.0 { pos / total } else { 0.0 };
        let impurity = gini(pos, total);

        let id = self.nodes.len();
        self.nodes.push(Node::Leaf { value });

        if depth >= self.params.max_depth
            || samples.len() < self.params.min_samples_split
            || impurity <= 0.0
        {
            return id;
        }

        let Some(best) = self.best_split(&samples, pos, total, impurity, rng) else {
            return id;
        };
        self.importances[best.feature] += best.decrease;

        let (left, right): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.data.rows[i][best.feature] <= best.threshold);

        let left = self.grow(left, depth + 1, rng);
        let right = self.grow(right, depth + 1, rng);
        self.nodes[id] = Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left,
            right,
        };
        id
    }

    fn weighted_totals(&self, samples: &[usize]) -> (f64, f64) {
        samples.iter().fold((0.0, 0.0), |(pos, total), &i| {
            let w = self.data.weights[i];
            if self.data.labels[i] {
                (pos + w, total + w)
            } else {
                (pos, total + w)
            }
        })
    }

    fn best_split<R: Rng>(
        &self,
        samples: &[usize],
        pos: f64,
        total: f64,
        impurity: f64,
        rng: &mut R,
    ) -> Option<BestSplit> {
        let k = self.params.max_features.clamp(1, FEATURE_COUNT);
        let mut best: Option<BestSplit> = None;
        let mut sorted = samples.to_vec();

        for feature in index::sample(rng, FEATURE_COUNT, k).iter() {
            let rows = self.data.rows;
            sorted.sort_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

            let mut left_pos = 0.0;
            let mut left_total = 0.0;
            for pair in sorted.windows(2) {
                let (i, next) = (pair[0], pair[1]);
                let w = self.data.weights[i];
                left_total += w;
                if self.data.labels[i] {
                    left_pos += w;
                }

                let (lo, hi) = (rows[i][feature], rows[next][feature]);
                if lo == hi {
                    continue;
                }
                let right_total = total - left_total;
                if left_total <= 0.0 || right_total <= 0.0 {
                    continue;
                }

                let decrease = total * impurity
                    - left_total * gini(left_pos, left_total)
                    - right_total * gini(pos - left_pos, right_total);
                if decrease > 0.0 && best.as_ref().map_or(true, |b| decrease > b.decrease) {
                    let mut threshold = lo + (hi - lo) / 2.0;
                    if threshold >= hi {
                        threshold = lo;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        decrease,
                    });
                }
            }
        }

        best
    }
}

/// Gini impurity of a binary node from weighted positive and total mass.
fn gini(pos: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let p = pos / total;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}
