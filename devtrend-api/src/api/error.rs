//! Mapping of core errors onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use devtrend_common::Error;
use serde_json::json;
use tracing::error;

/// Handler error; wraps the core error so it can become a response
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::InvalidDimension(_) | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Io(_) | Error::Config(_) => {
                error!("Request failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(json!({
            "error": self.0.to_string(),
        }));

        (status, body).into_response()
    }
}
