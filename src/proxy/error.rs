//! Error taxonomy shared by both endpoints.
//!
//! Every variant maps to a fixed status code and a JSON body carrying an
//! `error` field, plus `details` where an underlying message exists.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

/// Label used for internal failures on the token endpoint.
pub const AUTH_FAILURE: &str = "Internal server error";
/// Label used for internal failures on the report endpoint.
pub const DATA_FAILURE: &str = "Failed to fetch GA4 data";

#[derive(Debug, Error)]
pub enum ProxyError {
    /// Wrong HTTP verb for the route.
    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Not found")]
    NotFound,

    /// Token request whose `type` is not `exchange_token`.
    #[error("Invalid request type")]
    InvalidRequestType,

    #[error("Missing authorization code")]
    MissingCode,

    /// Report request lacking `propertyId`, `requestBody` or `accessToken`.
    #[error("Missing required parameters")]
    MissingParameters,

    /// Google's token endpoint answered with an OAuth error.
    #[error("{0}")]
    OAuth(String),

    /// Google's token endpoint failed without an OAuth error envelope.
    /// The body is relayed untouched.
    #[error("token endpoint rejected the request")]
    TokenRejected(Value),

    /// GA4 answered with a non-success status.
    #[error("GA4 API error ({status}): {details}")]
    Analytics { status: StatusCode, details: String },

    /// The request body could not be read, typically because it exceeds
    /// the configured size limit.
    #[error("{message}")]
    RequestBody { status: StatusCode, message: String },

    /// Parse failures, network failures and anything else unexpected.
    #[error("{label}: {details}")]
    Internal { label: &'static str, details: String },
}

impl ProxyError {
    pub fn internal(label: &'static str, err: impl std::fmt::Display) -> Self {
        ProxyError::Internal {
            label,
            details: err.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::NotFound => StatusCode::NOT_FOUND,
            ProxyError::InvalidRequestType
            | ProxyError::MissingCode
            | ProxyError::MissingParameters
            | ProxyError::OAuth(_)
            | ProxyError::TokenRejected(_) => StatusCode::BAD_REQUEST,
            ProxyError::Analytics { status, .. } | ProxyError::RequestBody { status, .. } => {
                *status
            }
            ProxyError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> Value {
        match self {
            ProxyError::TokenRejected(body) => body,
            ProxyError::Analytics { status, details } => json!({
                "error": "GA4 API error",
                "details": details,
                "status": status.as_u16(),
            }),
            ProxyError::Internal { label, details } => json!({
                "error": label,
                "details": details,
            }),
            other => json!({ "error": other.to_string() }),
        }
    }
}

impl From<BytesRejection> for ProxyError {
    fn from(rejection: BytesRejection) -> Self {
        tracing::warn!(status = %rejection.status(), error = %rejection.body_text(), "Request body rejected");
        ProxyError::RequestBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(self.body())).into_response()
    }
}
