use thiserror::Error;

/// Fitting failed before a model could be produced.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("Empty training set")]
    EmptyDataset,

    #[error("Mismatched training inputs/labels: {rows} rows, {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("Row {row} has {got} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("Forest needs at least one estimator")]
    NoEstimators,
}

/// A fitted model refused an input or is structurally broken.
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("X has {got} features, but the model is expecting {expected} features as input")]
    FeatureCount { expected: usize, got: usize },

    #[error("Invalid model structure: {0}")]
    Invalid(String),
}

/// Reading, writing or validating a serialized model.
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Artifact is not valid JSON for this model: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unsupported artifact format `{0}`")]
    Format(String),

    #[error("Artifact feature schema {found:?} does not match {expected:?}")]
    Schema {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}
