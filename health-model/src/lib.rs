//! Shared model code for the health risk classifier.
//!
//! The builder fits a [`RandomForest`] on synthetic [`HealthRecord`]s and
//! writes it as a [`ModelArtifact`]; the inference service reads the same
//! artifact back. Feature order is fixed by [`FEATURE_NAMES`].

pub mod artifact;
pub mod dataset;
pub mod error;
pub mod features;
pub mod forest;
pub mod tree;

pub use artifact::{ModelArtifact, ARTIFACT_FORMAT};
pub use dataset::{synthesize_records, train_test_split, Dataset};
pub use error::{ArtifactError, ModelError, TrainError};
pub use features::{FeatureVector, HealthRecord, FEATURE_NAMES, N_FEATURES};
pub use forest::{ForestOptions, RandomForest};
pub use tree::{DecisionTree, Node, TreeOptions};
