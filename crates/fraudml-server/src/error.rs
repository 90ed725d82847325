use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fraudml_core::MlError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::FieldErrors;

pub const PREDICTION_FAILED: &str = "An error occurred during prediction.";

/// Everything a prediction request can fail with, mapped onto HTTP responses.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("JSON parse error - {0}")]
    MalformedJson(String),

    #[error("Invalid data. Expected a dictionary, but got {0}.")]
    NotAnObject(&'static str),

    #[error("request validation failed")]
    Validation(FieldErrors),

    #[error("prediction failed: {0}")]
    Prediction(#[from] MlError),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        match self {
            ServiceError::MalformedJson(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "detail": message }))).into_response()
            }
            ServiceError::NotAnObject(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "non_field_errors": [message] }))).into_response()
            }
            ServiceError::Validation(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ServiceError::Prediction(e) => {
                error!(error = %e, "prediction failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": PREDICTION_FAILED })))
                    .into_response()
            }
        }
    }
}
