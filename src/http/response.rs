//! Canned responses for the outcomes the router produces itself.
//!
//! # Design Decisions
//! - Handler responses pass through untouched; only redirect, 405 and the
//!   default 404 are built here
//! - Bodies are short plain-text messages

use axum::body::Body;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

pub const NOT_FOUND_BODY: &str = "404 page not found\n";
pub const METHOD_NOT_ALLOWED_BODY: &str = "Method Not Allowed\n";

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

fn text(status: StatusCode, body: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, TEXT_PLAIN)], body).into_response()
}

/// Default 404.
pub fn not_found() -> Response {
    text(StatusCode::NOT_FOUND, NOT_FOUND_BODY)
}

/// 301 to `location`.
pub fn moved_permanently(location: &str) -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::MOVED_PERMANENTLY;
    match HeaderValue::from_str(location) {
        Ok(value) => {
            response.headers_mut().insert(header::LOCATION, value);
        }
        Err(e) => {
            tracing::warn!(location = %location, error = %e, "Redirect target is not a valid header");
        }
    }
    response
}

/// 405 listing the methods the path does answer to.
pub fn method_not_allowed(allow: &[Method]) -> Response {
    let allow = allow
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    let mut response = text(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_BODY);
    match HeaderValue::from_str(&allow) {
        Ok(value) => {
            response.headers_mut().insert(header::ALLOW, value);
        }
        Err(e) => {
            tracing::warn!(allow = %allow, error = %e, "Allow list is not a valid header");
        }
    }
    response
}
