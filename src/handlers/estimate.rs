use actix_web::{web, HttpResponse};
use std::sync::Arc;

use crate::AppState;
use pricecast::error::{validate_condition, validate_finite, validate_non_negative, AppError};
use pricecast::models::DeviceInput;

/// Estimate price and deal class for one device
pub async fn estimate_device(
    state: web::Data<Arc<AppState>>,
    req: web::Json<DeviceInput>,
) -> Result<HttpResponse, AppError> {
    // Validate request
    validate_finite("location", req.location)?;
    validate_non_negative("tech_specs", req.tech_specs)?;
    validate_non_negative("brand", req.brand)?;
    validate_condition(&req.condition)?;

    let predictor = state
        .predictor
        .as_ref()
        .ok_or_else(|| AppError::PredictionError("no model loaded".to_string()))?;

    let response = predictor.estimate(&req);

    Ok(HttpResponse::Ok().json(response))
}
