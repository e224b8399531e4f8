use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct InferenceConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub model: ModelStorageConfig,
    pub cors: CorsConfig,
}

/// Where the cold start fetches the artifact from, and where it is staged.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelStorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    pub key: String,
    pub s3_region: Option<String>,
    /// Root directory of the `local` backend.
    pub local_path: String,
    /// Ephemeral directory the fetched artifact is written to before loading.
    pub download_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// `*` allows any origin.
    pub allowed_origin: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    S3,
}

impl InferenceConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(InferenceConfig {
            common: common_config,
            model: ModelStorageConfig {
                backend: get_env("MODEL_STORAGE_BACKEND", Some("s3"), is_prod)?
                    .parse()
                    .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?,
                bucket: get_env("MODEL_BUCKET", Some("your-s3-bucket-name"), is_prod)?,
                key: get_env("MODEL_KEY", Some("health_model.json"), is_prod)?,
                s3_region: env::var("MODEL_S3_REGION").ok(),
                local_path: get_env("MODEL_LOCAL_PATH", Some("storage"), is_prod)?,
                download_dir: env::var("MODEL_DOWNLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| env::temp_dir()),
            },
            cors: CorsConfig {
                allowed_origin: env::var("CORS_ALLOWED_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            },
        })
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageBackend::Local),
            "s3" => Ok(StorageBackend::S3),
            _ => Err(format!("Invalid storage backend: {}", s)),
        }
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
