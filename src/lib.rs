//! GA4 proxy library.
//!
//! Relays OAuth code exchanges and GA4 Data API reports to Google, injecting
//! server-side credentials and attaching CORS headers for browser callers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
