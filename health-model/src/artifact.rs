//! Serialized form of a fitted forest.
//!
//! The artifact is a JSON envelope around [`RandomForest`] that also records
//! the feature names the forest was trained on. Encoding is deterministic, so
//! equal forests produce byte-identical artifacts.

use crate::error::ArtifactError;
use crate::features::FEATURE_NAMES;
use crate::forest::RandomForest;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Format tag written into every artifact.
pub const ARTIFACT_FORMAT: &str = "health-forest";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format: String,
    pub feature_names: Vec<String>,
    pub model: RandomForest,
}

impl ModelArtifact {
    pub fn new(model: RandomForest) -> Self {
        Self {
            format: ARTIFACT_FORMAT.to_string(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            model,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and check format tag, feature schema and forest structure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let artifact: Self = serde_json::from_slice(bytes)?;
        artifact.validate()?;
        Ok(artifact)
    }

    /// Overwrites `path` if it exists.
    pub fn write_to(&self, path: &Path) -> Result<(), ArtifactError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, ArtifactError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn into_model(self) -> RandomForest {
        self.model
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.format != ARTIFACT_FORMAT {
            return Err(ArtifactError::Format(self.format.clone()));
        }
        if self.feature_names.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ArtifactError::Schema {
                expected: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
                found: self.feature_names.clone(),
            });
        }
        self.model.validate()?;
        Ok(())
    }
}
