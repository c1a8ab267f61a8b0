use serde::{Deserialize, Serialize};

/// Device described by a caller asking for an estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInput {
    pub location: f64,
    pub tech_specs: f64,
    pub brand: f64,
    pub condition: String,
}

/// One class label with its averaged vote share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassProbability {
    pub label: String,
    pub probability: f64,
}

/// Estimate for a single device
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimateResponse {
    pub estimated_price: f64,
    pub deal_class: String,
    pub class_probabilities: Vec<ClassProbability>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_loaded: bool,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
