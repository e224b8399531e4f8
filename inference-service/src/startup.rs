use crate::config::{CorsConfig, InferenceConfig, StorageBackend};
use crate::handlers;
use crate::services::{cold_start, ArtifactStore, LocalArtifactStore, ModelSlot, S3ArtifactStore};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{metrics::metrics_middleware, tracing::request_id_middleware};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: InferenceConfig,
    pub model: Arc<ModelSlot>,
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Pick the configured artifact store, run the cold start, then bind.
    pub async fn build(config: InferenceConfig) -> Result<Self, AppError> {
        let store: Arc<dyn ArtifactStore> = match config.model.backend {
            StorageBackend::Local => Arc::new(LocalArtifactStore::new(&config.model.local_path)),
            StorageBackend::S3 => Arc::new(
                S3ArtifactStore::from_config(
                    config.model.bucket.clone(),
                    config.model.s3_region.clone(),
                )
                .await,
            ),
        };
        Self::build_with_store(config, store).await
    }

    pub async fn build_with_store(
        config: InferenceConfig,
        store: Arc<dyn ArtifactStore>,
    ) -> Result<Self, AppError> {
        let slot = cold_start(store.as_ref(), &config.model.key, &config.model.download_dir).await;

        let state = AppState {
            config: config.clone(),
            model: Arc::new(slot),
        };

        let app = router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn model_loaded(&self) -> bool {
        self.state.model.is_ready()
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/predict", post(handlers::predict_handler))
        .route("/invoke", post(handlers::invoke_handler))
        .with_state(state)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(cors)
}

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if config.allowed_origin.trim() == "*" {
        return layer.allow_origin(Any);
    }
    match config.allowed_origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::error!(
                "Invalid CORS origin '{}': {}. Using fallback.",
                config.allowed_origin,
                e
            );
            layer.allow_origin(Any)
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelStorageConfig;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use service_core::config::Config as CoreConfig;
    use tower::ServiceExt;

    fn state(slot: ModelSlot, allowed_origin: &str) -> AppState {
        AppState {
            config: InferenceConfig {
                common: CoreConfig {
                    port: 0,
                    log_level: "info".to_string(),
                    otlp_endpoint: None,
                },
                model: ModelStorageConfig {
                    backend: StorageBackend::Local,
                    bucket: "unused".to_string(),
                    key: "health_model.json".to_string(),
                    s3_region: None,
                    local_path: "storage".to_string(),
                    download_dir: std::env::temp_dir(),
                },
                cors: CorsConfig {
                    allowed_origin: allowed_origin.to_string(),
                },
            },
            model: Arc::new(slot),
        }
    }

    fn unavailable() -> ModelSlot {
        ModelSlot::Unavailable {
            reason: "no artifact".to_string(),
        }
    }

    #[tokio::test]
    async fn test_predict_route_without_model() {
        let response = router(state(unavailable(), "*"))
            .oneshot(
                axum::http::Request::builder()
                    .method(Method::POST)
                    .uri("/predict")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Model not loaded");
    }

    #[tokio::test]
    async fn test_specific_cors_origin_is_echoed() {
        let response = router(state(unavailable(), "http://localhost:3000"))
            .oneshot(
                axum::http::Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, "http://localhost:3000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "http://localhost:3000"
        );
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let response = router(state(unavailable(), "*"))
            .oneshot(
                axum::http::Request::builder()
                    .uri("/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }
}
