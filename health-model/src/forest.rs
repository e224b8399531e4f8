//! Bagged ensemble of [`DecisionTree`]s.

use crate::dataset::Dataset;
use crate::error::{ModelError, TrainError};
use crate::tree::{DecisionTree, TreeOptions};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Training hyperparameters for the forest.
#[derive(Debug, Clone)]
pub struct ForestOptions {
    pub n_estimators: usize,
    pub seed: u64,
    /// Features sampled per split; `floor(sqrt(n_features))` when `None`.
    pub max_features: Option<usize>,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
    /// Draw a bootstrap sample per tree instead of using every row.
    pub bootstrap: bool,
}

impl Default for ForestOptions {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            max_features: None,
            min_samples_split: 2,
            max_depth: None,
            bootstrap: true,
        }
    }
}

/// Fitted random forest classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Width of the feature vectors the forest was fitted on.
    pub n_features: usize,
    /// Class label for each class index, ascending.
    pub classes: Vec<u8>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(dataset: &Dataset, options: &ForestOptions) -> Result<Self, TrainError> {
        let n_features = dataset.validate()?;
        if options.n_estimators == 0 {
            return Err(TrainError::NoEstimators);
        }

        let mut classes = dataset.y.clone();
        classes.sort_unstable();
        classes.dedup();
        let y: Vec<usize> = dataset
            .y
            .iter()
            .map(|label| classes.partition_point(|c| c < label))
            .collect();

        let max_features = options
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().floor() as usize)
            .clamp(1, n_features);
        let tree_options = TreeOptions {
            max_features,
            min_samples_split: options.min_samples_split,
            max_depth: options.max_depth,
        };

        let n = dataset.len();
        let mut seeds = StdRng::seed_from_u64(options.seed);
        let trees = (0..options.n_estimators)
            .map(|_| {
                let mut rng = StdRng::seed_from_u64(seeds.gen());
                let sample: Vec<usize> = if options.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                DecisionTree::fit(&dataset.x, &y, classes.len(), &sample, &tree_options, &mut rng)
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            n_estimators = trees.len(),
            n_samples = n,
            n_features,
            max_features,
            n_classes = classes.len(),
            "Fitted random forest"
        );

        Ok(Self {
            n_features,
            classes,
            trees,
        })
    }

    /// Mean per-class probability across trees.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::FeatureCount {
                expected: self.n_features,
                got: features.len(),
            });
        }
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".to_string()));
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let counts = tree.leaf_counts(features);
            let total: u32 = counts.iter().sum();
            for (p, &c) in proba.iter_mut().zip(counts) {
                *p += c as f64 / total as f64;
            }
        }
        let n_trees = self.trees.len() as f64;
        for p in &mut proba {
            *p /= n_trees;
        }
        Ok(proba)
    }

    /// Class label with the highest mean probability; ties go to the lower class.
    pub fn predict(&self, features: &[f64]) -> Result<u8, ModelError> {
        let proba = self.predict_proba(features)?;
        let mut best = 0;
        for (idx, &p) in proba.iter().enumerate() {
            if p > proba[best] {
                best = idx;
            }
        }
        Ok(self.classes[best])
    }

    /// Fraction of rows in `dataset` predicted correctly.
    pub fn accuracy(&self, dataset: &Dataset) -> Result<f64, ModelError> {
        if dataset.is_empty() {
            return Ok(0.0);
        }
        let mut correct = 0usize;
        for (row, &label) in dataset.x.iter().zip(&dataset.y) {
            if self.predict(row)? == label {
                correct += 1;
            }
        }
        Ok(correct as f64 / dataset.len() as f64)
    }

    /// Validate structural invariants of a deserialized forest.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.n_features == 0 {
            return Err(ModelError::Invalid("forest has zero features".to_string()));
        }
        if self.classes.is_empty() {
            return Err(ModelError::Invalid("forest has no classes".to_string()));
        }
        if self.classes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ModelError::Invalid(
                "classes must be strictly ascending".to_string(),
            ));
        }
        if self.trees.is_empty() {
            return Err(ModelError::Invalid("forest has no trees".to_string()));
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| ModelError::Invalid(format!("tree {idx}: {e}")))?;
        }
        Ok(())
    }
}
