//! The request-handler capability.
//!
//! # Design Decisions
//! - Handlers are trait objects so one route table can hold any mix of them
//! - Any `Fn(Request<Body>) -> impl Future<Output = impl IntoResponse>` is a
//!   handler, which covers plain async functions and closures
//! - Returned futures are boxed and `'static` so the dispatcher can hand them
//!   to the tower service without borrowing the route table

use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

/// Something that turns a request into a response.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response>;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResponse,
{
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        let fut = self(req);
        Box::pin(async move { fut.await.into_response() })
    }
}

/// Shared handler as stored in the route table.
pub type BoxHandler = Arc<dyn Handler>;

/// Adapts a status-and-body callback into a [`Handler`].
///
/// Used for the simple form of a custom not-found response.
pub struct StatusHandler<F> {
    respond: F,
}

impl<F> StatusHandler<F>
where
    F: Fn(&Method, &str) -> (StatusCode, String) + Send + Sync + 'static,
{
    pub fn new(respond: F) -> Self {
        Self { respond }
    }
}

impl<F> Handler for StatusHandler<F>
where
    F: Fn(&Method, &str) -> (StatusCode, String) + Send + Sync + 'static,
{
    fn call(&self, req: Request<Body>) -> BoxFuture<'static, Response> {
        let response = (self.respond)(req.method(), req.uri().path()).into_response();
        Box::pin(async move { response })
    }
}
