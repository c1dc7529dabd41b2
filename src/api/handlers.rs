use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::referral::ReferralError;
use crate::AppState;

use super::models::{ErrorResponse, HealthResponse, PredictRequest, PredictResponse};

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ReferralError> {
    let Json(payload) = payload.map_err(|_| state.pipeline.reject_malformed())?;

    let referral = state.pipeline.handle(payload.description).await?;

    Ok(Json(PredictResponse {
        referral: referral.into_inner(),
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.pipeline.model().to_string(),
    })
}

pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Not found".to_string(),
            code: "NOT_FOUND".to_string(),
        }),
    )
        .into_response()
}
