//! Tower service over a swappable router snapshot.
//!
//! # Responsibilities
//! - Expose the router as a `tower::Service` so axum can serve it
//! - Allow the whole route table to be replaced while serving
//!
//! # Design Decisions
//! - The table is never mutated in place; replacement is an atomic swap
//! - Each request loads one snapshot and keeps it until the response is done
//! - The service never errors, every outcome is a response

use std::convert::Infallible;
use std::sync::Arc;
use std::task::{Context, Poll};

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use futures_util::future::BoxFuture;
use tower::Service;

use crate::routing::Router;

/// A router shared between the server and whoever may replace it.
#[derive(Clone)]
pub struct SharedRouter {
    current: Arc<ArcSwap<Router>>,
}

impl SharedRouter {
    pub fn new(router: Router) -> Self {
        Self {
            current: Arc::new(ArcSwap::from_pointee(router)),
        }
    }

    /// The router serving new requests right now.
    pub fn load(&self) -> Arc<Router> {
        self.current.load_full()
    }

    /// Swap in a new route table. Requests already dispatched finish on the
    /// previous one.
    pub fn replace(&self, router: Router) {
        let patterns = router.registered_patterns().len();
        self.current.store(Arc::new(router));
        tracing::info!(patterns, "Route table replaced");
    }

    pub fn service(&self) -> RouterService {
        RouterService {
            shared: self.clone(),
        }
    }
}

impl From<Router> for SharedRouter {
    fn from(router: Router) -> Self {
        Self::new(router)
    }
}

/// `tower::Service` that dispatches through the current router snapshot.
#[derive(Clone)]
pub struct RouterService {
    shared: SharedRouter,
}

impl Service<Request<Body>> for RouterService {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let router = self.shared.load();
        Box::pin(async move { Ok(router.dispatch(req).await) })
    }
}
