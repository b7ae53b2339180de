//! GA4 `runReport` relay.
//!
//! `POST /ga4-data` with `{"propertyId", "requestBody", "accessToken"}`.
//! The report body is forwarded verbatim with the caller's bearer token.

use axum::{body::Bytes, extract::rejection::BytesRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::proxy::error::{ProxyError, DATA_FAILURE};
use crate::proxy::upstream::UpstreamResponse;
use crate::proxy::AppState;

const UNKNOWN_ERROR: &str = "Unknown error";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQueryRequest {
    #[serde(default)]
    pub property_id: Option<Value>,

    #[serde(default)]
    pub request_body: Option<Value>,

    #[serde(default)]
    pub access_token: Option<Value>,
}

/// A report request with every required field present.
#[derive(Debug)]
pub struct ReportQuery<'a> {
    pub property_id: String,
    pub request_body: &'a Value,
    pub access_token: &'a str,
}

impl ReportQueryRequest {
    /// Parse a request body. A JSON value that is not an object has none of
    /// the required fields.
    pub fn from_body(body: &[u8]) -> Result<Self, ProxyError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(error = %e, "Malformed report query body");
            ProxyError::internal(DATA_FAILURE, e)
        })?;
        if !value.is_object() {
            return Err(ProxyError::MissingParameters);
        }
        serde_json::from_value(value).map_err(|e| ProxyError::internal(DATA_FAILURE, e))
    }

    /// All three fields must be present and non-empty. Property IDs may be
    /// sent as strings or numbers.
    pub fn validate(&self) -> Result<ReportQuery<'_>, ProxyError> {
        let property_id = match &self.property_id {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Err(ProxyError::MissingParameters),
        };
        let request_body = self
            .request_body
            .as_ref()
            .ok_or(ProxyError::MissingParameters)?;
        let access_token = self
            .access_token
            .as_ref()
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or(ProxyError::MissingParameters)?;

        Ok(ReportQuery {
            property_id,
            request_body,
            access_token,
        })
    }
}

/// Handler for `POST /ga4-data`.
pub async fn run_report(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, ProxyError> {
    let request = ReportQueryRequest::from_body(&body?)?;
    let query = request.validate()?;

    tracing::info!(property_id = %query.property_id, "Fetching GA4 data");

    let upstream = state
        .google
        .run_report(&query.property_id, query.request_body, query.access_token)
        .await
        .map_err(|e| {
            tracing::error!(property_id = %query.property_id, error = %e, "GA4 request failed");
            ProxyError::internal(DATA_FAILURE, e)
        })?;

    translate(upstream)
}

/// Map a GA4 reply onto the proxy contract.
pub fn translate(upstream: UpstreamResponse) -> Result<Json<Value>, ProxyError> {
    if !upstream.status.is_success() {
        let details = upstream
            .json()
            .ok()
            .and_then(|v| {
                v.pointer("/error/message")
                    .and_then(Value::as_str)
                    .filter(|m| !m.is_empty())
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
        tracing::warn!(status = %upstream.status, details = %details, "GA4 API error");
        return Err(ProxyError::Analytics {
            status: upstream.status,
            details,
        });
    }

    let data = upstream
        .json()
        .map_err(|e| ProxyError::internal(DATA_FAILURE, e))?;
    tracing::info!("GA4 data fetched successfully");
    Ok(Json(data))
}
