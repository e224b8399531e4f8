//! CART classification tree with Gini impurity.
//!
//! Trees are stored as a flat node arena. A split sends a sample left when
//! `x[feature] <= threshold`. Children are always allocated after their
//! parent, which [`DecisionTree::validate`] relies on to reject cycles.

use crate::error::ModelError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Growth limits for a single tree.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Features sampled per split; more are tried if all sampled ones are constant.
    pub max_features: usize,
    /// Nodes with fewer samples become leaves.
    pub min_samples_split: usize,
    /// Maximum depth, unlimited when `None`.
    pub max_depth: Option<usize>,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            max_features: usize::MAX,
            min_samples_split: 2,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Leaf {
        /// Training samples per class index that reached this leaf.
        class_counts: Vec<u32>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<Node>,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

struct Grower<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    n_classes: usize,
    options: &'a TreeOptions,
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Fit on the rows of `x` selected by `sample_indices` (duplicates allowed).
    ///
    /// `y` holds class indices in `0..n_classes`.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        sample_indices: &[usize],
        options: &TreeOptions,
        rng: &mut StdRng,
    ) -> Self {
        let mut grower = Grower {
            x,
            y,
            n_classes,
            options,
            nodes: Vec::new(),
        };
        let mut indices = sample_indices.to_vec();
        grower.grow(&mut indices, 0, rng);
        Self {
            nodes: grower.nodes,
        }
    }

    /// Class distribution of the leaf `features` lands in.
    pub fn leaf_counts(&self, features: &[f64]) -> &[u32] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { class_counts } => return class_counts,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Structural checks for trees that came from outside this process.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Invalid("tree has no nodes".to_string()));
        }
        let len = self.nodes.len();
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { class_counts } => {
                    if class_counts.len() != n_classes {
                        return Err(ModelError::Invalid(format!(
                            "leaf {idx} has {} class counts, expected {n_classes}",
                            class_counts.len()
                        )));
                    }
                    if class_counts.iter().all(|&c| c == 0) {
                        return Err(ModelError::Invalid(format!("leaf {idx} is empty")));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(ModelError::Invalid(format!(
                            "split {idx} uses feature {feature} of {n_features}"
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ModelError::Invalid(format!("split {idx} has NaN threshold")));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= len {
                            return Err(ModelError::Invalid(format!(
                                "split {idx} points to invalid child {child}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Grower<'_> {
    fn grow(&mut self, indices: &mut [usize], depth: usize, rng: &mut StdRng) -> usize {
        let counts = self.class_counts(indices);
        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf {
            class_counts: counts.clone(),
        });

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.options.max_depth.is_some_and(|max| depth >= max);
        if is_pure || depth_reached || indices.len() < self.options.min_samples_split.max(2) {
            return node_idx;
        }

        let Some(split) = self.best_split(indices, rng) else {
            return node_idx;
        };

        let mut boundary = 0;
        for i in 0..indices.len() {
            if self.x[indices[i]][split.feature] <= split.threshold {
                indices.swap(i, boundary);
                boundary += 1;
            }
        }
        if boundary == 0 || boundary == indices.len() {
            return node_idx;
        }

        let (left_indices, right_indices) = indices.split_at_mut(boundary);
        let left = self.grow(left_indices, depth + 1, rng);
        let right = self.grow(right_indices, depth + 1, rng);

        tracing::trace!(
            node = node_idx,
            feature = split.feature,
            threshold = split.threshold,
            impurity = split.impurity,
            "split node"
        );

        self.nodes[node_idx] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        node_idx
    }

    fn class_counts(&self, indices: &[usize]) -> Vec<u32> {
        let mut counts = vec![0u32; self.n_classes];
        for &i in indices {
            counts[self.y[i]] += 1;
        }
        counts
    }

    fn best_split(&self, indices: &[usize], rng: &mut StdRng) -> Option<SplitCandidate> {
        let n_features = self.x[indices[0]].len();
        let mut features: Vec<usize> = (0..n_features).collect();
        features.shuffle(rng);

        let mut best: Option<SplitCandidate> = None;
        let mut informative = 0;
        for feature in features {
            if informative >= self.options.max_features.max(1) {
                break;
            }
            let Some(candidate) = self.best_split_on(feature, indices) else {
                continue;
            };
            informative += 1;
            if best
                .as_ref()
                .map_or(true, |b| candidate.impurity < b.impurity)
            {
                best = Some(candidate);
            }
        }
        best
    }

    /// Best threshold on one feature, `None` when the feature is constant here.
    fn best_split_on(&self, feature: usize, indices: &[usize]) -> Option<SplitCandidate> {
        let mut values: Vec<(f64, usize)> = indices
            .iter()
            .map(|&i| (self.x[i][feature], self.y[i]))
            .collect();
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total = values.len() as f64;
        let mut right = vec![0u32; self.n_classes];
        for &(_, class) in &values {
            right[class] += 1;
        }
        let mut left = vec![0u32; self.n_classes];

        let mut best: Option<SplitCandidate> = None;
        for i in 0..values.len() - 1 {
            let class = values[i].1;
            left[class] += 1;
            right[class] -= 1;

            let (current, next) = (values[i].0, values[i + 1].0);
            if current >= next {
                continue;
            }

            let n_left = (i + 1) as f64;
            let n_right = total - n_left;
            let impurity =
                (n_left * gini(&left, n_left) + n_right * gini(&right, n_right)) / total;

            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                let mut threshold = current + (next - current) / 2.0;
                if threshold >= next || !threshold.is_finite() {
                    threshold = current;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    impurity,
                });
            }
        }
        best
    }
}

fn gini(counts: &[u32], n: f64) -> f64 {
    if n == 0.0 {
        return 0.0;
    }
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}
