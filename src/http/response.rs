//! Error responses.
//!
//! Search failures map onto gateway-style status codes so callers can tell
//! shed load (429), a tripped breaker (503) and a slow provider (504) apart.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::video::VideoServiceError;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

/// HTTP status for a search failure.
pub fn status_for(err: &VideoServiceError) -> StatusCode {
    match err {
        VideoServiceError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        VideoServiceError::CapacityExceeded => StatusCode::TOO_MANY_REQUESTS,
        VideoServiceError::CircuitOpen => StatusCode::SERVICE_UNAVAILABLE,
        VideoServiceError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        VideoServiceError::Provider(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for VideoServiceError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
        };
        (status_for(&self), Json(body)).into_response()
    }
}
