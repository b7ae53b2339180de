//! Google API proxy handlers.
//!
//! # Data Flow
//! ```text
//! POST /ga4-auth
//!     → token.rs (validate type/code)
//!     → upstream.rs (form POST to oauth2.googleapis.com/token)
//!     → token.rs (OAuth error → 400, else relay)
//!
//! POST /ga4-data
//!     → report.rs (validate propertyId/requestBody/accessToken)
//!     → upstream.rs (JSON POST to properties/{id}:runReport, bearer auth)
//!     → report.rs (non-2xx → same status, else relay)
//! ```
//!
//! Handlers are stateless; the only shared value is the upstream client.

pub mod error;
pub mod report;
pub mod token;
pub mod upstream;

use std::sync::Arc;

pub use error::ProxyError;
pub use upstream::{GoogleClient, UpstreamError};

/// Application state injected into handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub google: Arc<GoogleClient>,
}

impl AppState {
    pub fn new(google: GoogleClient) -> Self {
        Self {
            google: Arc::new(google),
        }
    }
}
