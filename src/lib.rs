//! Pattern-based HTTP request multiplexer.
//!
//! Routes are `(method, pattern, handler)` registrations tried in order.
//! Patterns mix literals with `:name` captures; captured values are merged
//! into the request query (keys keep their leading colon) before the handler
//! runs. When nothing matches, the router answers with a trailing-slash
//! redirect, a 405 listing the methods that do match, or a 404.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use axum::body::Body;
pub use axum::http::{Method, Request, StatusCode};
pub use axum::response::Response;

pub use config::{RouterConfig, ServerConfig};
pub use http::{HttpServer, RequestParamsExt, SharedRouter};
pub use lifecycle::Shutdown;
pub use routing::{Handler, Params, Pattern, Router};
