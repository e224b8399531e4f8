#![allow(dead_code)]

use health_model::{synthesize_records, Dataset, ForestOptions, ModelArtifact, RandomForest};
use inference_service::config::{CorsConfig, InferenceConfig, ModelStorageConfig, StorageBackend};
use inference_service::startup::Application;
use service_core::config::Config as CoreConfig;
use tempfile::TempDir;

pub const MODEL_KEY: &str = "health_model.json";

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub model_loaded: bool,
    pub client: reqwest::Client,
    // Held so the directories outlive the server.
    _storage: TempDir,
    _downloads: TempDir,
}

impl TestApp {
    /// Spawn a service whose local store holds a freshly trained artifact.
    pub async fn spawn() -> Self {
        let storage = tempfile::tempdir().expect("Failed to create storage dir");
        ModelArtifact::new(train_forest())
            .write_to(&storage.path().join(MODEL_KEY))
            .expect("Failed to write test artifact");
        Self::spawn_with_storage(storage).await
    }

    /// Spawn a service whose cold start finds no artifact.
    pub async fn spawn_without_model() -> Self {
        let storage = tempfile::tempdir().expect("Failed to create storage dir");
        Self::spawn_with_storage(storage).await
    }

    async fn spawn_with_storage(storage: TempDir) -> Self {
        let downloads = tempfile::tempdir().expect("Failed to create download dir");

        let config = InferenceConfig {
            common: CoreConfig {
                port: 0, // Random port for testing
                log_level: "info".to_string(),
                otlp_endpoint: None,
            },
            model: ModelStorageConfig {
                backend: StorageBackend::Local,
                bucket: "unused".to_string(),
                key: MODEL_KEY.to_string(),
                s3_region: None,
                local_path: storage.path().display().to_string(),
                download_dir: downloads.path().to_path_buf(),
            },
            cors: CorsConfig {
                allowed_origin: "*".to_string(),
            },
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let model_loaded = app.model_loaded();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            model_loaded,
            client,
            _storage: storage,
            _downloads: downloads,
        }
    }

    pub async fn post_predict(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(format!("{}/predict", self.address))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_invoke(&self, event: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/invoke", self.address))
            .json(event)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

pub fn train_forest() -> RandomForest {
    let dataset = Dataset::from_records(&synthesize_records(1000, 42));
    let options = ForestOptions {
        n_estimators: 25,
        ..ForestOptions::default()
    };
    RandomForest::fit(&dataset, &options).expect("Failed to train test forest")
}
