//! Isolation forest anomaly detector.
//!
//! Anomalies are few and different, so random axis-aligned splits isolate
//! them in fewer steps than normal points. Each tree is grown on a random
//! subsample; the anomaly score of a point is derived from its average path
//! length across trees, normalised by the expected path length of an
//! unsuccessful binary-search-tree lookup over the subsample size.
//!
//! The decision threshold is placed so that a `contamination` fraction of
//! the training sample lands above it, mirroring the usual scikit-learn
//! behaviour.

use crate::error::{MonitorError, Result};
use crate::models::AnomalyModel;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Hyperparameters of the forest
#[derive(Debug, Clone, PartialEq)]
pub struct IsolationForestParams {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub contamination: f64,
    /// Seed used by [`AnomalyModel::fit`]; OS entropy when unset
    pub seed: Option<u64>,
}

impl Default for IsolationForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            contamination: 0.02,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        size: usize,
    },
}

/// A single isolation tree stored as a flat arena, root at index 0
#[derive(Debug, Clone)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn grow<R: Rng>(data: &[Vec<f64>], sample: Vec<usize>, height_limit: usize, rng: &mut R) -> Self {
        let mut nodes = Vec::new();
        grow_node(data, sample, 0, height_limit, rng, &mut nodes);
        Self { nodes }
    }

    fn path_length(&self, x: &[f64]) -> f64 {
        let mut index = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes[index] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if x[feature] < threshold { left } else { right };
                    depth += 1.0;
                }
                Node::Leaf { size } => return depth + average_path_length(size),
            }
        }
    }
}

fn grow_node<R: Rng>(
    data: &[Vec<f64>],
    rows: Vec<usize>,
    depth: usize,
    height_limit: usize,
    rng: &mut R,
    nodes: &mut Vec<Node>,
) -> usize {
    let id = nodes.len();
    nodes.push(Node::Leaf { size: rows.len() });

    if depth >= height_limit || rows.len() <= 1 {
        return id;
    }

    // Only features that still vary inside this node, over a representable
    // width, can split it
    let width = data[rows[0]].len();
    let candidates: Vec<(usize, f64, f64)> = (0..width)
        .filter_map(|feature| {
            let (min, max) = rows.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| {
                let v = data[r][feature];
                (lo.min(v), hi.max(v))
            });
            (min < max && (max - min).is_finite()).then_some((feature, min, max))
        })
        .collect();

    if candidates.is_empty() {
        return id;
    }

    let (feature, min, max) = candidates[rng.gen_range(0..candidates.len())];
    let threshold = rng.gen_range(min..max);
    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) =
        rows.into_iter().partition(|&r| data[r][feature] < threshold);

    let left = grow_node(data, left_rows, depth + 1, height_limit, rng, nodes);
    let right = grow_node(data, right_rows, depth + 1, height_limit, rng, nodes);
    nodes[id] = Node::Split {
        feature,
        threshold,
        left,
        right,
    };
    id
}

/// Average path length of an unsuccessful search in a BST of `n` nodes
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Linear-interpolation percentile of an ascending slice, `q` in [0, 100]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let rank = (q / 100.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

/// Isolation forest with a contamination-calibrated decision threshold
#[derive(Debug, Clone)]
pub struct IsolationForest {
    params: IsolationForestParams,
    trees: Vec<IsolationTree>,
    n_features: usize,
    sample_size: usize,
    threshold: Option<f64>,
}

impl IsolationForest {
    /// Create an unfitted forest
    pub fn new(params: IsolationForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            n_features: 0,
            sample_size: 0,
            threshold: None,
        }
    }

    pub fn params(&self) -> &IsolationForestParams {
        &self.params
    }

    /// Score above which a point is an outlier, once fitted
    pub fn threshold(&self) -> Option<f64> {
        self.threshold
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Fit the forest drawing all randomness from `rng`
    pub fn fit_with_rng<R: Rng>(&mut self, data: &[Vec<f64>], rng: &mut R) -> Result<()> {
        if data.len() < 2 {
            return Err(MonitorError::InsufficientTrainingData {
                required: 2,
                got: data.len(),
            });
        }
        let n_features = data[0].len();
        if n_features == 0 {
            return Err(MonitorError::InvalidModelInput {
                expected: 1,
                got: 0,
            });
        }
        if let Some(row) = data.iter().find(|row| row.len() != n_features) {
            return Err(MonitorError::InvalidModelInput {
                expected: n_features,
                got: row.len(),
            });
        }
        let contamination = self.params.contamination;
        if !(contamination > 0.0 && contamination <= 0.5) {
            return Err(MonitorError::InvalidConfig {
                field: "contamination".to_string(),
                reason: format!("{} is outside (0, 0.5]", contamination),
            });
        }
        if self.params.n_estimators == 0 {
            return Err(MonitorError::InvalidConfig {
                field: "n_estimators".to_string(),
                reason: "must be positive".to_string(),
            });
        }

        let sample_size = self.params.max_samples.clamp(2, data.len());
        let height_limit = (sample_size as f64).log2().ceil() as usize;

        self.trees = (0..self.params.n_estimators)
            .map(|_| {
                let sample = rand::seq::index::sample(&mut *rng, data.len(), sample_size).into_vec();
                IsolationTree::grow(data, sample, height_limit, &mut *rng)
            })
            .collect();
        self.n_features = n_features;
        self.sample_size = sample_size;

        let mut training_scores: Vec<f64> = data.iter().map(|row| self.raw_score(row)).collect();
        training_scores.sort_by(|a, b| a.total_cmp(b));
        let threshold = percentile(&training_scores, 100.0 * (1.0 - contamination));
        self.threshold = Some(threshold);

        debug!(
            min_score = training_scores[0],
            max_score = training_scores[training_scores.len() - 1],
            "Training score range"
        );
        info!(
            trees = self.trees.len(),
            sample_size = sample_size,
            height_limit = height_limit,
            contamination = contamination,
            threshold = threshold,
            "Isolation forest fitted"
        );

        Ok(())
    }

    fn raw_score(&self, x: &[f64]) -> f64 {
        let mean_path = self.trees.iter().map(|t| t.path_length(x)).sum::<f64>() / self.trees.len() as f64;
        2f64.powf(-mean_path / average_path_length(self.sample_size))
    }

    fn check_ready(&self, sample: &[f64]) -> Result<f64> {
        let threshold = self.threshold.ok_or(MonitorError::ModelNotReady)?;
        if sample.len() != self.n_features {
            return Err(MonitorError::InvalidModelInput {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(threshold)
    }
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new(IsolationForestParams::default())
    }
}

impl AnomalyModel for IsolationForest {
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<()> {
        let mut rng = match self.params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.fit_with_rng(data, &mut rng)
    }

    fn anomaly_score(&self, sample: &[f64]) -> Result<f64> {
        self.check_ready(sample)?;
        Ok(self.raw_score(sample))
    }

    fn predict(&self, sample: &[f64]) -> Result<bool> {
        let threshold = self.check_ready(sample)?;
        Ok(self.raw_score(sample) > threshold)
    }

    fn name(&self) -> &str {
        "isolation_forest"
    }

    fn is_fitted(&self) -> bool {
        self.threshold.is_some()
    }
}
