//! OAuth authorization-code exchange.
//!
//! `POST /ga4-auth` with `{"type": "exchange_token", "code": "..."}`.
//! The code is forwarded to Google's token endpoint together with the
//! server-side client credentials; Google's JSON is relayed back.

use axum::{body::Bytes, extract::rejection::BytesRejection, extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::proxy::error::{ProxyError, AUTH_FAILURE};
use crate::proxy::upstream::UpstreamResponse;
use crate::proxy::AppState;

/// The only request type the endpoint accepts.
pub const EXCHANGE_TOKEN: &str = "exchange_token";

/// Incoming token exchange payload.
///
/// Fields are kept as raw JSON so that wrong types surface as validation
/// errors rather than parse failures.
#[derive(Debug, Deserialize)]
pub struct TokenExchangeRequest {
    #[serde(rename = "type", default)]
    pub kind: Option<Value>,

    #[serde(default)]
    pub code: Option<Value>,
}

impl TokenExchangeRequest {
    /// Parse a request body. Anything that is not a JSON object carries no
    /// `type` and is rejected as an invalid request type.
    pub fn from_body(body: &[u8]) -> Result<Self, ProxyError> {
        let value: Value = serde_json::from_slice(body).map_err(|e| {
            tracing::warn!(error = %e, "Malformed token exchange body");
            ProxyError::internal(AUTH_FAILURE, e)
        })?;
        if !value.is_object() {
            return Err(ProxyError::InvalidRequestType);
        }
        serde_json::from_value(value).map_err(|e| ProxyError::internal(AUTH_FAILURE, e))
    }

    /// Check the request type and return the authorization code.
    ///
    /// Besides the `type` check, a missing or empty `code` is rejected with
    /// `MissingCode` so that Google is never called without one.
    pub fn authorization_code(&self) -> Result<&str, ProxyError> {
        if self.kind.as_ref().and_then(Value::as_str) != Some(EXCHANGE_TOKEN) {
            return Err(ProxyError::InvalidRequestType);
        }
        self.code
            .as_ref()
            .and_then(Value::as_str)
            .filter(|code| !code.is_empty())
            .ok_or(ProxyError::MissingCode)
    }
}

/// Handler for `POST /ga4-auth`.
pub async fn exchange_token(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Value>, ProxyError> {
    let request = TokenExchangeRequest::from_body(&body?)?;
    let code = request.authorization_code()?;

    let upstream = state.google.exchange_code(code).await.map_err(|e| {
        tracing::error!(error = %e, "Token exchange request failed");
        ProxyError::internal(AUTH_FAILURE, e)
    })?;

    translate(upstream)
}

/// Map Google's token endpoint reply onto the proxy contract.
pub fn translate(upstream: UpstreamResponse) -> Result<Json<Value>, ProxyError> {
    let data = upstream.json().map_err(|e| {
        tracing::error!(status = %upstream.status, error = %e, "Token endpoint returned non-JSON body");
        ProxyError::internal(AUTH_FAILURE, e)
    })?;

    if let Some(error) = data.get("error").filter(|e| !e.is_null()) {
        let message = data
            .get("error_description")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
            .or_else(|| error.as_str())
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string());
        tracing::warn!(status = %upstream.status, error = %message, "Token exchange rejected");
        return Err(ProxyError::OAuth(message));
    }

    if !upstream.status.is_success() {
        tracing::warn!(status = %upstream.status, "Token endpoint failed without an OAuth error");
        return Err(ProxyError::TokenRejected(data));
    }

    tracing::info!("Token exchange succeeded");
    Ok(Json(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use serde_json::json;

    fn parse(body: Value) -> TokenExchangeRequest {
        serde_json::from_value(body).unwrap()
    }

    fn reply(status: StatusCode, body: Value) -> UpstreamResponse {
        UpstreamResponse {
            status,
            body: Bytes::from(body.to_string()),
        }
    }

    #[test]
    fn test_accepts_exchange_token() {
        let request = parse(json!({ "type": "exchange_token", "code": "abc" }));
        assert_eq!(request.authorization_code().unwrap(), "abc");
    }

    #[test]
    fn test_rejects_other_types() {
        for body in [
            json!({ "type": "other", "code": "abc" }),
            json!({ "code": "abc" }),
            json!({ "type": 7 }),
            json!({}),
        ] {
            assert!(matches!(
                parse(body).authorization_code(),
                Err(ProxyError::InvalidRequestType)
            ));
        }
    }

    #[test]
    fn test_non_object_bodies_are_invalid_type() {
        for body in [
            &br#"["exchange_token","abc"]"#[..],
            br#""exchange_token""#,
            b"42",
            b"null",
        ] {
            assert!(matches!(
                TokenExchangeRequest::from_body(body),
                Err(ProxyError::InvalidRequestType)
            ));
        }
    }

    #[test]
    fn test_unparsable_body_is_internal() {
        assert!(matches!(
            TokenExchangeRequest::from_body(b"{\"type\":"),
            Err(ProxyError::Internal { label: AUTH_FAILURE, .. })
        ));
    }

    #[test]
    fn test_object_body_parses() {
        let request =
            TokenExchangeRequest::from_body(br#"{"type":"exchange_token","code":"abc"}"#).unwrap();
        assert_eq!(request.authorization_code().unwrap(), "abc");
    }

    #[test]
    fn test_requires_code() {
        for body in [
            json!({ "type": "exchange_token" }),
            json!({ "type": "exchange_token", "code": "" }),
            json!({ "type": "exchange_token", "code": null }),
        ] {
            assert!(matches!(
                parse(body).authorization_code(),
                Err(ProxyError::MissingCode)
            ));
        }
    }

    #[test]
    fn test_success_is_passed_through() {
        let token = json!({ "access_token": "xyz", "expires_in": 3600 });
        let Json(body) = translate(reply(StatusCode::OK, token.clone())).unwrap();
        assert_eq!(body, token);
    }

    #[test]
    fn test_prefers_error_description() {
        let err = translate(reply(
            StatusCode::BAD_REQUEST,
            json!({ "error": "invalid_grant", "error_description": "Bad code" }),
        ))
        .unwrap_err();
        assert!(matches!(err, ProxyError::OAuth(ref m) if m == "Bad code"));
    }

    #[test]
    fn test_falls_back_to_error_code() {
        let err = translate(reply(
            StatusCode::UNAUTHORIZED,
            json!({ "error": "invalid_client" }),
        ))
        .unwrap_err();
        assert!(matches!(err, ProxyError::OAuth(ref m) if m == "invalid_client"));
    }

    #[test]
    fn test_failure_without_envelope_is_relayed() {
        let err = translate(reply(StatusCode::BAD_GATEWAY, json!({ "oops": 1 }))).unwrap_err();
        assert!(matches!(err, ProxyError::TokenRejected(ref v) if v == &json!({ "oops": 1 })));
    }

    #[test]
    fn test_non_json_reply_is_internal() {
        let upstream = UpstreamResponse {
            status: StatusCode::OK,
            body: Bytes::from_static(b"<html>"),
        };
        assert!(matches!(
            translate(upstream),
            Err(ProxyError::Internal { label: AUTH_FAILURE, .. })
        ));
    }
}
