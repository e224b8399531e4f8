//! The training job: synthesize, split, fit, score, write.

use crate::config::BuilderConfig;
use health_model::{
    synthesize_records, train_test_split, ArtifactError, Dataset, ForestOptions, ModelArtifact,
    ModelError, RandomForest, TrainError,
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Training failed: {0}")]
    Train(#[from] TrainError),

    #[error("Scoring held-out data failed: {0}")]
    Score(#[from] ModelError),

    #[error("Writing artifact failed: {0}")]
    Artifact(#[from] ArtifactError),
}

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub output_path: PathBuf,
    pub n_train: usize,
    pub n_test: usize,
    pub n_trees: usize,
    /// Accuracy on the held-out split; `None` when the split is empty.
    pub test_accuracy: Option<f64>,
}

/// Train the forest described by `config` and write it to `config.output_path`.
///
/// Any existing file at the output path is replaced. The write is not atomic.
pub fn build_model(config: &BuilderConfig) -> Result<BuildReport, BuildError> {
    tracing::info!(
        n_samples = config.n_samples,
        seed = config.seed,
        "Generating synthetic health records"
    );
    let records = synthesize_records(config.n_samples, config.seed);
    let dataset = Dataset::from_records(&records);
    let positives = dataset.y.iter().filter(|&&y| y == 1).count();

    let (train, test) = train_test_split(&dataset, config.test_fraction, config.seed);
    tracing::info!(
        n_train = train.len(),
        n_test = test.len(),
        at_risk = positives,
        "Split dataset"
    );

    let options = ForestOptions {
        n_estimators: config.n_estimators,
        seed: config.seed,
        ..ForestOptions::default()
    };
    let forest = RandomForest::fit(&train, &options)?;

    let test_accuracy = if test.is_empty() {
        None
    } else {
        Some(forest.accuracy(&test)?)
    };
    tracing::info!(
        n_trees = forest.trees.len(),
        test_accuracy = ?test_accuracy,
        "Trained random forest"
    );

    let n_trees = forest.trees.len();
    ModelArtifact::new(forest).write_to(&config.output_path)?;
    tracing::info!(path = %config.output_path.display(), "Wrote model artifact");

    Ok(BuildReport {
        output_path: config.output_path.clone(),
        n_train: train.len(),
        n_test: test.len(),
        n_trees,
        test_accuracy,
    })
}
