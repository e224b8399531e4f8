use crate::dtos::{
    decode_body, extract_features, HealthStatus, InvocationEvent, InvocationResponse,
    PredictionBody,
};
use crate::error::PredictError;
use crate::services::metrics::{record_prediction, record_prediction_error};
use crate::services::ModelSlot;
use crate::startup::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, response::IntoResponse, Json};
use health_model::RandomForest;
use serde_json::Value;

/// Answer one prediction request against the cold-started model.
///
/// Model availability is checked before the body is looked at, so a failed
/// cold start answers every request with `Model not loaded`.
pub fn predict(slot: &ModelSlot, body: Option<&Value>) -> Result<PredictionBody, PredictError> {
    let model = slot.model().ok_or(PredictError::ModelNotLoaded)?;
    classify(model, body)
}

/// Function-host entry point: unwraps the event and wraps the outcome.
pub fn handle(slot: &ModelSlot, event: &InvocationEvent) -> InvocationResponse {
    observe(predict(slot, event.body.as_ref())).into()
}

fn classify(model: &RandomForest, body: Option<&Value>) -> Result<PredictionBody, PredictError> {
    let fields = decode_body(body)?;
    let features = extract_features(&fields)?;
    let label = model.predict(features.as_slice())?;
    let health_status = HealthStatus::try_from(label)?;

    Ok(PredictionBody {
        prediction: label,
        health_status,
    })
}

fn observe(result: Result<PredictionBody, PredictError>) -> Result<PredictionBody, PredictError> {
    match &result {
        Ok(body) => {
            tracing::debug!(prediction = body.prediction, "Prediction served");
            record_prediction(body.health_status.as_str());
        }
        Err(e) => {
            tracing::warn!(error = %e, kind = e.kind(), "Prediction request failed");
            record_prediction_error(e.kind());
        }
    }
    result
}

/// An empty HTTP body counts as a missing request body.
fn parse_json(bytes: &Bytes) -> Result<Option<Value>, PredictError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| PredictError::InvalidInput(format!("invalid JSON body: {}", e)))
}

/// `POST /predict`: the HTTP body is the request body.
pub async fn predict_handler(State(state): State<AppState>, bytes: Bytes) -> impl IntoResponse {
    let result = match state.model.model() {
        None => Err(PredictError::ModelNotLoaded),
        Some(model) => {
            parse_json(&bytes).and_then(|body| classify(model, body.as_ref()))
        }
    };

    match observe(result) {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// `POST /invoke`: the HTTP body is a full invocation event; the reply is
/// always 200 carrying the proxy-shaped result.
pub async fn invoke_handler(State(state): State<AppState>, bytes: Bytes) -> impl IntoResponse {
    let response = if state.model.is_ready() {
        match parse_json(&bytes) {
            Ok(Some(raw)) => match serde_json::from_value::<InvocationEvent>(raw) {
                Ok(event) => handle(&state.model, &event),
                Err(e) => observe(Err(PredictError::InvalidInput(format!(
                    "invalid invocation event: {}",
                    e
                ))))
                .into(),
            },
            Ok(None) => handle(&state.model, &InvocationEvent::default()),
            Err(e) => observe(Err(e)).into(),
        }
    } else {
        handle(&state.model, &InvocationEvent::default())
    };

    Json(response)
}
