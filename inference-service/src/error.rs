//! Per-request failure kinds and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Everything that can go wrong while answering a prediction request.
///
/// The display string is exactly the `error` field of the response body.
#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    /// Cold start failed; the service stays in this state until restart.
    #[error("Model not loaded")]
    ModelNotLoaded,

    /// Body missing, not JSON, not an object, or a field missing/non-numeric.
    #[error("{0}")]
    InvalidInput(String),

    /// The classifier rejected the input or returned an unusable label.
    #[error("{0}")]
    Prediction(String),
}

impl PredictError {
    pub fn status(&self) -> StatusCode {
        match self {
            PredictError::ModelNotLoaded => StatusCode::INTERNAL_SERVER_ERROR,
            PredictError::InvalidInput(_) | PredictError::Prediction(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Metric label.
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::ModelNotLoaded => "model_not_loaded",
            PredictError::InvalidInput(_) => "invalid_input",
            PredictError::Prediction(_) => "prediction",
        }
    }

    pub fn body(&self) -> serde_json::Value {
        json!({ "error": self.to_string() })
    }
}

impl From<health_model::ModelError> for PredictError {
    fn from(err: health_model::ModelError) -> Self {
        PredictError::Prediction(err.to_string())
    }
}

impl IntoResponse for PredictError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.body())).into_response()
    }
}
