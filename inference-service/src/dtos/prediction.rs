use crate::error::PredictError;
use health_model::{FeatureVector, FEATURE_NAMES, N_FEATURES};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Function-host style invocation: the payload sits under `body`, either as
/// an encoded JSON string or as an already decoded value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvocationEvent {
    #[serde(default)]
    pub body: Option<Value>,
}

/// Proxy-style result of [`InvocationEvent`] handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    /// JSON-encoded response body.
    pub body: String,
}

impl InvocationResponse {
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

impl From<Result<PredictionBody, PredictError>> for InvocationResponse {
    fn from(result: Result<PredictionBody, PredictError>) -> Self {
        match result {
            Ok(prediction) => match serde_json::to_string(&prediction) {
                Ok(body) => Self {
                    status_code: 200,
                    body,
                },
                Err(e) => Self::from(Err(PredictError::Prediction(format!(
                    "encoding prediction failed: {}",
                    e
                )))),
            },
            Err(err) => Self {
                status_code: err.status().as_u16(),
                body: err.body().to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "Healthy")]
    Healthy,
    #[serde(rename = "At Risk")]
    AtRisk,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "Healthy",
            HealthStatus::AtRisk => "At Risk",
        }
    }
}

impl TryFrom<u8> for HealthStatus {
    type Error = PredictError;

    /// Only the two trained classes are meaningful; anything else is a fault.
    fn try_from(label: u8) -> Result<Self, Self::Error> {
        match label {
            0 => Ok(HealthStatus::Healthy),
            1 => Ok(HealthStatus::AtRisk),
            other => Err(PredictError::Prediction(format!(
                "model returned unexpected class label {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionBody {
    pub prediction: u8,
    pub health_status: HealthStatus,
}

/// Decode a request body, accepting a JSON string that itself encodes the body.
pub fn decode_body(body: Option<&Value>) -> Result<Map<String, Value>, PredictError> {
    let value = match body {
        None | Some(Value::Null) => {
            return Err(PredictError::InvalidInput(
                "request body is missing".to_string(),
            ))
        }
        Some(Value::String(encoded)) => serde_json::from_str::<Value>(encoded)
            .map_err(|e| PredictError::InvalidInput(format!("invalid JSON body: {}", e)))?,
        Some(other) => other.clone(),
    };

    match value {
        Value::Object(map) => Ok(map),
        other => Err(PredictError::InvalidInput(format!(
            "request body must be a JSON object, got {}",
            json_type(&other)
        ))),
    }
}

/// Pull the five features out of a decoded body in model order.
pub fn extract_features(body: &Map<String, Value>) -> Result<FeatureVector, PredictError> {
    let mut values = [0.0; N_FEATURES];
    for (slot, name) in values.iter_mut().zip(FEATURE_NAMES) {
        let raw = body
            .get(name)
            .ok_or_else(|| PredictError::InvalidInput(format!("missing field `{}`", name)))?;
        *slot = coerce_number(name, raw)?;
    }
    Ok(FeatureVector(values))
}

/// Numbers pass through; strings are parsed after trimming; anything else fails.
/// NaN and infinities are refused even when they parse.
fn coerce_number(name: &str, raw: &Value) -> Result<f64, PredictError> {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(value) if value.is_finite() => Ok(value),
        Some(_) => Err(PredictError::InvalidInput(format!(
            "field `{}` contains NaN or infinity: {}",
            name, raw
        ))),
        None => Err(PredictError::InvalidInput(format!(
            "could not convert field `{}` to float: {}",
            name, raw
        ))),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
