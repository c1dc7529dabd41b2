use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::ErrorResponse;
use crate::bridge::BridgeError;

pub const EMPTY_INPUT_MESSAGE: &str = "Please describe your symptoms";
pub const MALFORMED_BODY_MESSAGE: &str =
    "Request body must be a JSON object with a \"description\" string";
pub const MODEL_UNAVAILABLE_MESSAGE: &str = "Error connecting to AI model. Please try again.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred";

/// Why the request was rejected before reaching the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationFailure {
    EmptyInput,
    MalformedBody,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty input"),
            Self::MalformedBody => write!(f, "malformed request body"),
        }
    }
}

/// Failure of a single referral request.
///
/// The `Display` output carries the full detail and is meant for logs only;
/// callers see [`ReferralError::public_message`].
#[derive(Debug, Error)]
pub enum ReferralError {
    #[error("validation failed: {0}")]
    Validation(ValidationFailure),

    #[error("model invocation failed")]
    ModelInvocation(#[source] BridgeError),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl ReferralError {
    pub fn empty_input() -> Self {
        Self::Validation(ValidationFailure::EmptyInput)
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "BAD_REQUEST",
            Self::ModelInvocation(_) => "MODEL_UNAVAILABLE",
            Self::Unexpected(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::ModelInvocation(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            Self::Validation(ValidationFailure::EmptyInput) => EMPTY_INPUT_MESSAGE,
            Self::Validation(ValidationFailure::MalformedBody) => MALFORMED_BODY_MESSAGE,
            Self::ModelInvocation(_) => MODEL_UNAVAILABLE_MESSAGE,
            Self::Unexpected(_) => UNEXPECTED_MESSAGE,
        }
    }
}

impl From<BridgeError> for ReferralError {
    fn from(err: BridgeError) -> Self {
        Self::ModelInvocation(err)
    }
}

impl IntoResponse for ReferralError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.public_message().to_string(),
            code: self.error_code().to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
