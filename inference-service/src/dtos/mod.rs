pub mod prediction;

pub use prediction::{
    decode_body, extract_features, HealthStatus, InvocationEvent, InvocationResponse,
    PredictionBody,
};
