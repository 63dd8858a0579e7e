//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use gateway::GatewayError;
use router::RouterError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Routing error.
    Router(RouterError),
    /// Transaction protocol error.
    Gateway(GatewayError),
    /// A statement failed and its transaction was rolled back.
    Persistence(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Router(err) => router_error_to_response(err),
            ApiError::Gateway(err) => gateway_error_to_response(err),
            ApiError::Persistence(msg) => {
                tracing::error!(error = %msg, "persistence failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn router_error_to_response(err: RouterError) -> (StatusCode, String) {
    match &err {
        RouterError::RoutingUnavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        RouterError::InvalidOrder(_) => (StatusCode::BAD_REQUEST, err.to_string()),
    }
}

fn gateway_error_to_response(err: GatewayError) -> (StatusCode, String) {
    match &err {
        GatewayError::ProtocolViolation { .. } | GatewayError::SessionClosed { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        GatewayError::Backend(_) => {
            tracing::error!(error = %err, "backend failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<RouterError> for ApiError {
    fn from(err: RouterError) -> Self {
        ApiError::Router(err)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err)
    }
}
