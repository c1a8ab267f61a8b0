use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use crate::models::ErrorResponse;

/// Application error types
#[derive(Debug)]
pub enum AppError {
    /// Invalid request data
    ValidationError(String),
    /// Model or prediction error
    PredictionError(String),
    /// Internal server error
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppError::PredictionError(msg) => write!(f, "Prediction error: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::PredictionError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_code, message) = match self {
            AppError::ValidationError(msg) => ("validation_error", msg.clone()),
            AppError::PredictionError(msg) => ("prediction_error", msg.clone()),
            AppError::InternalError(msg) => ("internal_error", msg.clone()),
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: error_code.to_string(),
            message,
        })
    }
}

/// Validation functions
pub fn validate_finite(field: &str, value: f64) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::ValidationError(format!(
            "{} must be a finite number, got {}",
            field, value
        )));
    }
    Ok(())
}

pub fn validate_non_negative(field: &str, value: f64) -> Result<(), AppError> {
    validate_finite(field, value)?;
    if value < 0.0 {
        return Err(AppError::ValidationError(format!(
            "{} must be non-negative, got {}",
            field, value
        )));
    }
    Ok(())
}

pub fn validate_condition(condition: &str) -> Result<(), AppError> {
    if condition != "fair" && condition != "good" {
        return Err(AppError::ValidationError(format!(
            "condition must be 'fair' or 'good', got '{}'",
            condition
        )));
    }
    Ok(())
}
