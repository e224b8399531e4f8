pub mod metrics;
pub mod model_loader;
pub mod storage;

pub use metrics::{get_metrics, init_metrics};
pub use model_loader::{cold_start, fetch_and_load, LoadError, ModelSlot};
pub use storage::{ArtifactStore, LocalArtifactStore, S3ArtifactStore};
