//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, body limit)
//!     → per-route method gate (POST / OPTIONS / 405)
//!     → cors.rs (stamp CORS headers on the response)
//!     → proxy handlers
//! ```

pub mod cors;
pub mod request;
pub mod server;

pub use cors::CorsPolicy;
pub use request::X_REQUEST_ID;
pub use server::{HttpServer, ServerError};
