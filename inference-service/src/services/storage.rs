use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use service_core::error::AppError;
use std::path::PathBuf;
use tokio::fs;

/// Read-only source of model artifacts, addressed by object key.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError>;

    /// Human-readable location of `key`, for logs.
    fn describe(&self, key: &str) -> String;
}

/// Serves artifacts from a directory on the local filesystem.
pub struct LocalArtifactStore {
    base_path: PathBuf,
}

impl LocalArtifactStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.base_path.join(key);
        match fs::read(&path).await {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(
                anyhow::anyhow!("no artifact at {}", path.display()),
            )),
            Err(e) => Err(AppError::StorageError(anyhow::anyhow!(
                "reading {} failed: {}",
                path.display(),
                e
            ))),
        }
    }

    fn describe(&self, key: &str) -> String {
        self.base_path.join(key).display().to_string()
    }
}

pub struct S3ArtifactStore {
    client: S3Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: S3Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    /// Build a client from the ambient AWS credential chain.
    pub async fn from_config(bucket: String, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(S3Client::new(&sdk_config), bucket)
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| AppError::StorageError(anyhow::anyhow!("S3 download failed: {}", e)))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| {
                AppError::StorageError(anyhow::anyhow!("S3 body collection failed: {}", e))
            })?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    fn describe(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
