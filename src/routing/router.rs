//! Route table and dispatch.
//!
//! # Responsibilities
//! - Store registrations per method, in registration order
//! - Resolve a request to a handler, a redirect, a 405 or a 404
//! - Merge captured params into the request and invoke the handler
//!
//! # Design Decisions
//! - Immutable after setup (thread-safe without locks)
//! - O(1) method bucket lookup via HashMap
//! - O(n) linear pattern scan, first match wins
//! - Resolution is a pure step, dispatch only acts on its result

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, Uri};
use axum::response::Response;
use percent_encoding::percent_decode_str;

use crate::config::RouterConfig;
use crate::http::request::merge_params;
use crate::http::response;
use crate::observability::metrics;
use crate::routing::handler::{BoxHandler, Handler, StatusHandler};
use crate::routing::params::Params;
use crate::routing::pattern::Pattern;

/// One `(method, pattern, handler)` registration.
pub struct Route {
    method: Method,
    pattern: Pattern,
    handler: BoxHandler,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn handler(&self) -> &BoxHandler {
        &self.handler
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .finish_non_exhaustive()
    }
}

/// Result of resolving a request against the table.
#[derive(Debug)]
pub enum Resolution<'r> {
    /// A registration for the request method matched.
    Matched { route: &'r Route, params: Params },
    /// Only the path with a trailing slash matches; redirect there.
    Redirect { location: String },
    /// The path matches under other methods only. Sorted by name.
    MethodNotAllowed { allow: Vec<Method> },
    NotFound,
}

impl Resolution<'_> {
    /// Short label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            Resolution::Matched { .. } => "matched",
            Resolution::Redirect { .. } => "redirect",
            Resolution::MethodNotAllowed { .. } => "method_not_allowed",
            Resolution::NotFound => "not_found",
        }
    }
}

/// Pattern-based request multiplexer.
///
/// Patterns are tried in the order they were registered for the request
/// method; the first one that matches handles the request.
///
/// ```
/// use patmux::{Body, Method, Request, Router};
///
/// let mut router = Router::new();
/// router.get("/hello/:name", |_req: Request<Body>| async { "hello" });
/// assert!(router.lookup(&Method::GET, "/hello/blake").is_some());
/// assert!(router.lookup(&Method::GET, "/hello/blake/").is_none());
/// ```
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
    patterns: Vec<String>,
    not_found: BoxHandler,
    config: RouterConfig,
}

impl Router {
    /// Create an empty router with default behavior.
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            routes: HashMap::new(),
            patterns: Vec::new(),
            not_found: Arc::new(|_req: Request<Body>| async { response::not_found() }),
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Register `handler` for `method` requests matching `pattern`.
    ///
    /// Patterns are not validated; a malformed one simply never matches.
    pub fn add<H: Handler>(
        &mut self,
        method: Method,
        pattern: impl Into<Pattern>,
        handler: H,
    ) -> &mut Self {
        let pattern = pattern.into();
        if !self.patterns.iter().any(|p| p == pattern.as_str()) {
            self.patterns.push(pattern.as_str().to_string());
        }
        tracing::trace!(method = %method, pattern = %pattern, "Route registered");
        self.routes.entry(method.clone()).or_default().push(Route {
            method,
            pattern,
            handler: Arc::new(handler),
        });
        self
    }

    pub fn get<H: Handler>(&mut self, pattern: impl Into<Pattern>, handler: H) -> &mut Self {
        self.add(Method::GET, pattern, handler)
    }

    pub fn post<H: Handler>(&mut self, pattern: impl Into<Pattern>, handler: H) -> &mut Self {
        self.add(Method::POST, pattern, handler)
    }

    pub fn put<H: Handler>(&mut self, pattern: impl Into<Pattern>, handler: H) -> &mut Self {
        self.add(Method::PUT, pattern, handler)
    }

    pub fn delete<H: Handler>(&mut self, pattern: impl Into<Pattern>, handler: H) -> &mut Self {
        self.add(Method::DELETE, pattern, handler)
    }

    pub fn patch<H: Handler>(&mut self, pattern: impl Into<Pattern>, handler: H) -> &mut Self {
        self.add(Method::PATCH, pattern, handler)
    }

    pub fn head<H: Handler>(&mut self, pattern: impl Into<Pattern>, handler: H) -> &mut Self {
        self.add(Method::HEAD, pattern, handler)
    }

    pub fn options<H: Handler>(&mut self, pattern: impl Into<Pattern>, handler: H) -> &mut Self {
        self.add(Method::OPTIONS, pattern, handler)
    }

    /// Replace the handler invoked when nothing matches.
    pub fn not_found<H: Handler>(&mut self, handler: H) -> &mut Self {
        self.not_found = Arc::new(handler);
        self
    }

    /// Replace the not-found response with a status and body computed from
    /// the request method and path.
    pub fn not_found_with<F>(&mut self, respond: F) -> &mut Self
    where
        F: Fn(&Method, &str) -> (StatusCode, String) + Send + Sync + 'static,
    {
        self.not_found(StatusHandler::new(respond))
    }

    /// Registrations for `method`, in match-priority order.
    pub fn routes(&self, method: &Method) -> &[Route] {
        self.routes.get(method).map(Vec::as_slice).unwrap_or_default()
    }

    fn find(&self, method: &Method, path: &str) -> Option<(&Route, Params)> {
        self.routes(method)
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    /// The handler a `method` request for the decoded `path` would reach,
    /// without running it.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<BoxHandler> {
        self.find(method, path)
            .map(|(route, _)| Arc::clone(&route.handler))
    }

    /// Every method with at least one pattern matching `path`.
    pub fn allowed_methods(&self, path: &str) -> HashSet<Method> {
        self.routes
            .iter()
            .filter(|(_, routes)| routes.iter().any(|r| r.pattern.matches(path).is_some()))
            .map(|(method, _)| method.clone())
            .collect()
    }

    /// Distinct patterns across all methods, in first-registration order.
    pub fn registered_patterns(&self) -> Vec<&str> {
        self.patterns.iter().map(String::as_str).collect()
    }

    /// Decide what a `method` request for `uri` resolves to.
    ///
    /// Patterns are matched against the percent-decoded path; the redirect
    /// target keeps the request's raw form.
    pub fn resolve(&self, method: &Method, uri: &Uri) -> Resolution<'_> {
        let path = decode_path(uri.path());
        let path = &*path;

        if let Some((route, params)) = self.find(method, path) {
            return Resolution::Matched { route, params };
        }

        if self.config.redirect_trailing_slash && !path.ends_with('/') {
            let with_slash = format!("{path}/");
            if self.find(method, &with_slash).is_some() {
                let target = uri
                    .path_and_query()
                    .map_or(uri.path(), |pq| pq.as_str());
                return Resolution::Redirect {
                    location: with_trailing_slash(target),
                };
            }
        }

        if self.config.handle_method_not_allowed {
            let allowed = self.allowed_methods(path);
            if !allowed.is_empty() && !allowed.contains(method) {
                let mut allow: Vec<Method> = allowed.into_iter().collect();
                allow.sort_by(|a, b| a.as_str().cmp(b.as_str()));
                return Resolution::MethodNotAllowed { allow };
            }
        }

        Resolution::NotFound
    }

    /// Route `req` and produce its response.
    pub async fn dispatch(&self, mut req: Request<Body>) -> Response {
        let started = Instant::now();
        let resolution = self.resolve(req.method(), req.uri());
        metrics::record_dispatch(resolution.outcome(), req.method(), started);

        match resolution {
            Resolution::Matched { route, params } => {
                tracing::debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    pattern = %route.pattern,
                    captures = params.len(),
                    "Route matched"
                );
                if !params.is_empty() {
                    merge_params(&mut req, params);
                }
                route.handler.call(req).await
            }
            Resolution::Redirect { location } => {
                tracing::debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    location = %location,
                    "Redirecting to trailing slash"
                );
                response::moved_permanently(&location)
            }
            Resolution::MethodNotAllowed { allow } => {
                tracing::debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    allow = ?allow,
                    "Method not allowed"
                );
                response::method_not_allowed(&allow)
            }
            Resolution::NotFound => {
                tracing::debug!(
                    method = %req.method(),
                    path = %req.uri().path(),
                    "No route matched"
                );
                self.not_found.call(req).await
            }
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Percent-decode a request path. Invalid UTF-8 is replaced rather than
/// rejected.
fn decode_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

/// Insert `/` after the path of a raw request target, keeping any query and
/// fragment verbatim.
pub fn with_trailing_slash(target: &str) -> String {
    let split = target.find(['?', '#']).unwrap_or(target.len());
    let (path, rest) = target.split_at(split);
    format!("{path}/{rest}")
}
