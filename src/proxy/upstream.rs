//! Outbound client for Google's OAuth and GA4 Data endpoints.
//!
//! # Responsibilities
//! - Hold the shared `reqwest::Client` (one connection pool per process)
//! - Inject server-side credentials into token exchanges
//! - Build the `runReport` URL for a property
//!
//! Responses are returned raw (status + bytes); interpreting them is the
//! caller's job since each endpoint translates errors differently.

use std::time::Duration;

use axum::body::Bytes;
use axum::http::StatusCode;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::GoogleConfig;

/// Failures talking to Google before a response was obtained.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("upstream URL cannot carry a path: {0}")]
    CannotBeBase(String),
}

/// Status and body of an upstream reply.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Decode the body as JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Client for the two Google endpoints the proxy talks to.
#[derive(Debug, Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    config: GoogleConfig,
}

impl GoogleClient {
    pub fn new(config: GoogleConfig) -> Result<Self, UpstreamError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    /// Exchange an authorization code for tokens.
    ///
    /// Client ID, secret and redirect URI always come from configuration.
    pub async fn exchange_code(&self, code: &str) -> Result<UpstreamResponse, UpstreamError> {
        let params = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
        ];

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&params)
            .send()
            .await?;

        Self::collect(response).await
    }

    /// Run a GA4 report for `property_id` on behalf of the token holder.
    pub async fn run_report(
        &self,
        property_id: &str,
        request_body: &Value,
        access_token: &str,
    ) -> Result<UpstreamResponse, UpstreamError> {
        let url = self.report_url(property_id)?;

        let response = self
            .http
            .post(url)
            .bearer_auth(access_token)
            .json(request_body)
            .send()
            .await?;

        Self::collect(response).await
    }

    /// `{analytics_base_url}/properties/{property_id}:runReport`, with the
    /// property ID encoded as a single path segment.
    pub fn report_url(&self, property_id: &str) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.config.analytics_base_url)?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::CannotBeBase(self.config.analytics_base_url.clone()))?
            .pop_if_empty()
            .push("properties")
            .push(&format!("{property_id}:runReport"));
        Ok(url)
    }

    async fn collect(response: reqwest::Response) -> Result<UpstreamResponse, UpstreamError> {
        let status = response.status();
        let body = response.bytes().await?;
        Ok(UpstreamResponse { status, body })
    }
}
