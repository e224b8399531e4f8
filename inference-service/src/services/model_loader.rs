//! Cold-start loading of the forest artifact.
//!
//! The artifact is fetched once per process, staged on local disk, then
//! decoded. A failed load is final for the life of the process.

use crate::services::metrics::record_model_load;
use crate::services::storage::ArtifactStore;
use health_model::{ArtifactError, ModelArtifact, RandomForest};
use service_core::error::AppError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// Process-wide model state, fixed once the cold start finishes.
#[derive(Debug, Clone)]
pub enum ModelSlot {
    Ready(Arc<RandomForest>),
    Unavailable { reason: String },
}

impl ModelSlot {
    pub fn model(&self) -> Option<&RandomForest> {
        match self {
            ModelSlot::Ready(model) => Some(model.as_ref()),
            ModelSlot::Unavailable { .. } => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ModelSlot::Ready(_))
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("fetching artifact `{key}` failed: {source}")]
    Fetch { key: String, source: AppError },

    #[error("staging artifact at {path} failed: {source}")]
    Stage {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("artifact is unusable: {0}")]
    Decode(#[from] ArtifactError),
}

/// Download `key`, stage it under `download_dir`, and decode the staged copy.
pub async fn fetch_and_load(
    store: &dyn ArtifactStore,
    key: &str,
    download_dir: &Path,
) -> Result<RandomForest, LoadError> {
    let bytes = store.download(key).await.map_err(|source| LoadError::Fetch {
        key: key.to_string(),
        source,
    })?;

    let staged = staging_path(download_dir, key);
    let stage_err = |source| LoadError::Stage {
        path: staged.clone(),
        source,
    };
    fs::create_dir_all(download_dir).await.map_err(stage_err)?;
    fs::write(&staged, &bytes).await.map_err(stage_err)?;
    let staged_bytes = fs::read(&staged).await.map_err(stage_err)?;

    let artifact = ModelArtifact::from_bytes(&staged_bytes)?;
    Ok(artifact.into_model())
}

/// Run the one-time load and settle the slot. Never fails: errors are logged
/// and turn into [`ModelSlot::Unavailable`].
pub async fn cold_start(store: &dyn ArtifactStore, key: &str, download_dir: &Path) -> ModelSlot {
    tracing::info!(source = %store.describe(key), "Loading model artifact");
    match fetch_and_load(store, key, download_dir).await {
        Ok(model) => {
            tracing::info!(
                n_trees = model.trees.len(),
                n_features = model.n_features,
                "Model loaded"
            );
            record_model_load("success");
            ModelSlot::Ready(Arc::new(model))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load model; predictions will be refused");
            record_model_load("failure");
            ModelSlot::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}

/// Keys may contain `/`; only the final segment names the staged file.
fn staging_path(download_dir: &Path, key: &str) -> PathBuf {
    let file_name = key
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or("model.json");
    download_dir.join(file_name)
}
