//! Request-side helpers.
//!
//! # Responsibilities
//! - Merge captured params into the request query after a match
//! - Give handlers typed access to params and the request ID
//!
//! # Design Decisions
//! - The query string is the parameter store, so handlers that only read
//!   the query still see captures
//! - Captures precede the caller's own query pairs, which are kept verbatim
//! - The captured set alone is also stored as a request extension

use axum::http::uri::PathAndQuery;
use axum::http::{HeaderName, Request, Uri};

use crate::routing::params::Params;

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Prepend `params` to the request query and attach them as an extension.
pub fn merge_params<B>(req: &mut Request<B>, params: Params) {
    let query = params.merge_into_query(req.uri().query());
    let target = format!("{}?{}", req.uri().path(), query);

    // The path comes from a parsed URI and the query is form-encoded, so the
    // rebuild only fails if `http` tightens its grammar.
    match rewrite_target(req.uri(), &target) {
        Ok(uri) => *req.uri_mut() = uri,
        Err(e) => {
            tracing::warn!(uri = %target, error = %e, "Failed to rewrite request query");
        }
    }

    req.extensions_mut().insert(params);
}

fn rewrite_target(uri: &Uri, target: &str) -> Result<Uri, axum::http::Error> {
    let mut parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(target)?);
    Ok(Uri::from_parts(parts)?)
}

/// Extension trait to read routing data off a request.
pub trait RequestParamsExt {
    /// The full query parsed as params, captures first once dispatched.
    fn params(&self) -> Params;

    /// First value for `name` in the query.
    fn param(&self, name: &str) -> Option<String>;

    /// Only the values captured from the path, if the request was dispatched
    /// through a pattern with captures.
    fn path_params(&self) -> Option<&Params>;

    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestParamsExt for Request<B> {
    fn params(&self) -> Params {
        self.uri().query().map(Params::from_query).unwrap_or_default()
    }

    fn param(&self, name: &str) -> Option<String> {
        self.params().get(name).map(str::to_string)
    }

    fn path_params(&self) -> Option<&Params> {
        self.extensions().get::<Params>()
    }

    fn request_id(&self) -> Option<&str> {
        self.headers()
            .get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
    }
}
