//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.
//! Every section has defaults so an empty file (or no file) is valid.

use serde::Deserialize;

/// Environment variable holding the OAuth client ID.
pub const ENV_CLIENT_ID: &str = "GOOGLE_CLIENT_ID";
/// Environment variable holding the OAuth client secret.
pub const ENV_CLIENT_SECRET: &str = "GOOGLE_CLIENT_SECRET";
/// Environment variable holding the OAuth redirect URI.
pub const ENV_REDIRECT_URI: &str = "REDIRECT_URI";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Google credentials and upstream endpoints.
    pub google: GoogleConfig,

    /// CORS settings applied to every response.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Overlay credentials from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Overlay credentials from an arbitrary lookup.
    ///
    /// Values found by `lookup` replace whatever the config file held.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ENV_CLIENT_ID) {
            self.google.client_id = v;
        }
        if let Some(v) = lookup(ENV_CLIENT_SECRET) {
            self.google.client_secret = v;
        }
        if let Some(v) = lookup(ENV_REDIRECT_URI) {
            self.google.redirect_uri = v;
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body in bytes.
    pub max_body_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_size: 1024 * 1024,
        }
    }
}

/// OAuth credentials and Google endpoints.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub client_id: String,

    pub client_secret: String,

    pub redirect_uri: String,

    /// OAuth token endpoint.
    pub token_url: String,

    /// GA4 Data API base, without trailing slash.
    pub analytics_base_url: String,

    /// Upstream request timeout. `None` keeps the client default (no timeout).
    pub timeout_secs: Option<u64>,
}

impl GoogleConfig {
    /// True when all three credential values are set.
    pub fn has_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.redirect_uri.is_empty()
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: String::new(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            analytics_base_url: "https://analyticsdata.googleapis.com/v1beta".to_string(),
            timeout_secs: None,
        }
    }
}

// The secret must never end up in logs.
impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("token_url", &self.token_url)
            .field("analytics_base_url", &self.analytics_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Origin`.
    pub allow_origin: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_origin: "*".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
