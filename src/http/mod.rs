//! HTTP glue around the routing engine.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → service.rs (load current router snapshot)
//!     → routing layer resolves the request
//!     → request.rs (merge captures into the query)
//!     → handler, or response.rs (redirect / 405 / 404)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;
pub mod service;

pub use request::{merge_params, RequestParamsExt, X_REQUEST_ID};
pub use server::HttpServer;
pub use service::{RouterService, SharedRouter};
