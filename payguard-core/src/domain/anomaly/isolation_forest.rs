// payguard-core/src/domain/anomaly/isolation_forest.rs

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::model::{AnomalyError, FeatureMatrix, OutlierModel};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Ensemble of randomized partition trees (Liu, Ting & Zhou, 2008).
///
/// Each tree is grown on a random subsample by picking a random feature and a
/// uniform split point between that feature's min and max, until points are
/// isolated or the height limit `ceil(log2(subsample))` is reached. Points that
/// are isolated after few splits on average get a score close to 1.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    n_trees: usize,
    max_samples: usize,
    seed: u64,
}

impl IsolationForest {
    pub fn new(n_trees: usize, max_samples: usize, seed: u64) -> Self {
        Self {
            n_trees: n_trees.max(1),
            max_samples: max_samples.max(2),
            seed,
        }
    }

    fn grow(&self, samples: &FeatureMatrix) -> Vec<IsolationTree> {
        let n = samples.rows();
        let subsample = self.max_samples.min(n);
        let height_limit = (subsample as f64).log2().ceil().max(1.0) as usize;
        let mut rng = StdRng::seed_from_u64(self.seed);

        (0..self.n_trees)
            .map(|_| {
                let mut indices = rand::seq::index::sample(&mut rng, n, subsample).into_vec();
                IsolationTree::build(samples, &mut indices, height_limit, &mut rng)
            })
            .collect()
    }
}

impl Default for IsolationForest {
    fn default() -> Self {
        Self::new(100, 256, 42)
    }
}

impl OutlierModel for IsolationForest {
    fn name(&self) -> &'static str {
        "IsolationForest"
    }

    fn fit_and_score(&self, samples: &FeatureMatrix) -> Result<Vec<f64>, AnomalyError> {
        if samples.cols() == 0 {
            return Err(AnomalyError::NoFeatures);
        }
        if samples.rows() < 2 {
            return Err(AnomalyError::InsufficientSamples {
                model: self.name(),
                needed: 2,
                got: samples.rows(),
            });
        }

        let trees = self.grow(samples);
        let normalizer = average_path_length(self.max_samples.min(samples.rows()));

        let scores = (0..samples.rows())
            .map(|i| {
                let point = samples.row(i);
                let mean_depth = trees.iter().map(|t| t.path_length(point)).sum::<f64>()
                    / trees.len() as f64;
                2f64.powf(-mean_depth / normalizer)
            })
            .collect();

        Ok(scores)
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug)]
struct IsolationTree {
    nodes: Vec<Node>,
}

impl IsolationTree {
    fn build(
        samples: &FeatureMatrix,
        indices: &mut [usize],
        height_limit: usize,
        rng: &mut StdRng,
    ) -> Self {
        let mut nodes = Vec::with_capacity(2 * indices.len());
        grow_node(samples, indices, 0, height_limit, rng, &mut nodes);
        Self { nodes }
    }

    fn path_length(&self, point: &[f64]) -> f64 {
        let mut id = 0;
        let mut depth = 0.0;
        loop {
            match self.nodes[id] {
                Node::Leaf { size } => return depth + average_path_length(size),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if point[feature] <= threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// Grows the subtree for `indices` and returns the id of its root node.
fn grow_node(
    samples: &FeatureMatrix,
    indices: &mut [usize],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
    nodes: &mut Vec<Node>,
) -> usize {
    let id = nodes.len();
    nodes.push(Node::Leaf {
        size: indices.len(),
    });

    if depth >= height_limit || indices.len() <= 1 {
        return id;
    }

    // Only features whose finite values still vary inside this node can split it
    let splittable: Vec<(usize, f64, f64)> = (0..samples.cols())
        .filter_map(|f| {
            let (lo, hi) = indices
                .iter()
                .map(|&i| samples.get(i, f))
                .filter(|v| v.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
            (hi > lo).then_some((f, lo, hi))
        })
        .collect();

    if splittable.is_empty() {
        return id;
    }

    let (feature, lo, hi) = splittable[rng.gen_range(0..splittable.len())];
    let threshold = split_threshold(rng, lo, hi);

    // threshold in [lo, hi): both sides are non-empty
    let mid = partition(indices, |i| samples.get(i, feature) <= threshold);
    let (left_part, right_part) = indices.split_at_mut(mid);
    let left = grow_node(samples, left_part, depth + 1, height_limit, rng, nodes);
    let right = grow_node(samples, right_part, depth + 1, height_limit, rng, nodes);

    nodes[id] = Node::Split {
        feature,
        threshold,
        left,
        right,
    };
    id
}

/// Uniform draw in `[lo, hi)` for finite bounds whose difference may not be
/// representable (e.g. `-1.5e308..1.5e308`).
fn split_threshold(rng: &mut StdRng, lo: f64, hi: f64) -> f64 {
    let t: f64 = rng.r#gen();
    let span = hi - lo;
    let threshold = if span.is_finite() {
        lo + t * span
    } else {
        lo * (1.0 - t) + hi * t
    };
    if (lo..hi).contains(&threshold) { threshold } else { lo }
}

/// In-place partition; returns the number of items satisfying `pred`, which
/// end up at the front.
fn partition(indices: &mut [usize], pred: impl Fn(usize) -> bool) -> usize {
    let mut mid = 0;
    for j in 0..indices.len() {
        if pred(indices[j]) {
            indices.swap(mid, j);
            mid += 1;
        }
    }
    mid
}

/// Average path length of an unsuccessful BST search over `n` points, used
/// both to normalize scores and to account for unsplit leaves.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}
