//! CORS headers.
//!
//! Each endpoint has a fixed header set, built once at startup and stamped
//! onto every response of that route (success, error, preflight alike).

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
        HeaderMap, HeaderValue,
    },
    middleware::Next,
    response::Response,
};

/// Allowed headers for the token endpoint.
pub const AUTH_ALLOW_HEADERS: &str = "Content-Type";
/// Allowed headers for the report endpoint.
pub const DATA_ALLOW_HEADERS: &str = "Content-Type, Authorization";
/// Methods every endpoint accepts.
pub const ALLOW_METHODS: &str = "POST, OPTIONS";

/// Prebuilt CORS header set.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    headers: Arc<HeaderMap>,
}

impl CorsPolicy {
    pub fn new(allow_origin: &str, allow_headers: &str) -> Result<Self, axum::http::header::InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_str(allow_origin)?);
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_str(allow_headers)?);
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
        Ok(Self {
            headers: Arc::new(headers),
        })
    }

    /// Overwrite the CORS headers on `target`.
    pub fn apply(&self, target: &mut HeaderMap) {
        for (name, value) in self.headers.iter() {
            target.insert(name.clone(), value.clone());
        }
    }
}

/// Middleware stamping the policy onto the response.
pub async fn apply_cors(State(policy): State<CorsPolicy>, request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    policy.apply(response.headers_mut());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_policy_headers() {
        let policy = CorsPolicy::new("*", AUTH_ALLOW_HEADERS).unwrap();
        let mut headers = HeaderMap::new();
        policy.apply(&mut headers);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], "POST, OPTIONS");
        assert_eq!(headers.len(), 3);
    }

    #[test]
    fn test_apply_overrides_existing_values() {
        let policy = CorsPolicy::new("https://dash.example", DATA_ALLOW_HEADERS).unwrap();
        let mut target = HeaderMap::new();
        target.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("https://evil.example"));
        target.insert("content-type", HeaderValue::from_static("application/json"));

        policy.apply(&mut target);

        assert_eq!(target[ACCESS_CONTROL_ALLOW_ORIGIN], "https://dash.example");
        assert_eq!(target[ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization");
        assert_eq!(target["content-type"], "application/json");
    }

    #[test]
    fn test_rejects_invalid_origin() {
        assert!(CorsPolicy::new("bad\norigin", AUTH_ALLOW_HEADERS).is_err());
    }
}
