mod handlers;
mod models;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub use handlers::{health, not_found, predict};
pub use models::{ErrorResponse, HealthResponse, PredictRequest, PredictResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/health", get(health))
        .fallback(not_found)
        .with_state(state)
}
