//! In-process dispatch tests: the full decision tree without a socket.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use axum::http::header;
use patmux::{
    Body, Handler, Method, Request, RequestParamsExt, Router, RouterConfig, SharedRouter,
    StatusCode,
};
use tower::ServiceExt;

mod common;

use common::{body_string, get, request};

/// Handler that records the query it was called with.
fn recorder(seen: Arc<Mutex<Option<Option<String>>>>) -> impl Handler {
    move |req: Request<Body>| {
        let seen = seen.clone();
        async move {
            *seen.lock().unwrap() = Some(req.uri().query().map(str::to_string));
            StatusCode::OK
        }
    }
}

#[tokio::test]
async fn test_routing_hit_injects_captures() {
    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();

    let mut router = Router::new();
    router.get("/foo/:name", move |req: Request<Body>| {
        let flag = flag.clone();
        async move {
            flag.store(true, Ordering::SeqCst);
            let params = req.params();
            assert_eq!(params.get(":name"), Some("keith"));
            assert_eq!(params.get("a"), Some("b"));
            assert_eq!(params.keys().collect::<Vec<_>>(), [":name", "a"]);
            assert_eq!(req.path_params().and_then(|p| p.get(":name")), Some("keith"));
            StatusCode::OK
        }
    });

    let res = router.dispatch(get("/foo/keith?a=b")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_repeated_capture_reaches_handler_in_order() {
    let mut router = Router::new();
    router.get("/foo/:name/baz/:name", |req: Request<Body>| async move {
        req.params().get_all(":name").join(",")
    });

    let res = router.dispatch(get("/foo/bar/baz/123")).await;
    assert_eq!(body_string(res).await, "bar,123");
}

#[tokio::test]
async fn test_captures_do_not_replace_user_values() {
    let mut router = Router::new();
    router.get("/user/:id", |req: Request<Body>| async move {
        req.params().get_all(":id").join(",")
    });

    let res = router.dispatch(get("/user/42?%3Aid=spoofed")).await;
    assert_eq!(body_string(res).await, "42,spoofed");
}

#[tokio::test]
async fn test_method_not_allowed() {
    let called = Arc::new(AtomicBool::new(false));
    let (post_flag, put_flag) = (called.clone(), called.clone());

    let mut router = Router::new();
    router
        .post("/foo/:name", move |_req: Request<Body>| {
            post_flag.store(true, Ordering::SeqCst);
            async { StatusCode::OK }
        })
        .put("/foo/:name", move |_req: Request<Body>| {
            put_flag.store(true, Ordering::SeqCst);
            async { StatusCode::OK }
        });

    let res = router.dispatch(get("/foo/keith")).await;
    assert!(!called.load(Ordering::SeqCst));
    assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.headers()[header::ALLOW], "POST, PUT");
}

#[tokio::test]
async fn test_no_params_leaves_query_untouched() {
    let seen = Arc::new(Mutex::new(None));
    let mut router = Router::new();
    router.get("/foo/", recorder(seen.clone()));

    router.dispatch(get("/foo/")).await;
    assert_eq!(*seen.lock().unwrap(), Some(None));
}

#[tokio::test]
async fn test_only_user_params_leaves_query_untouched() {
    let seen = Arc::new(Mutex::new(None));
    let mut router = Router::new();
    router.get("/foo/", recorder(seen.clone()));

    router.dispatch(get("/foo/?a=b")).await;
    assert_eq!(*seen.lock().unwrap(), Some(Some("a=b".to_string())));
}

#[tokio::test]
async fn test_implicit_redirect() {
    let mut router = Router::new();
    router.get("/foo/", |_req: Request<Body>| async { StatusCode::OK });

    let res = router.dispatch(get("/foo")).await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "/foo/");

    let res = router.dispatch(get("/foo?bar=wow")).await;
    assert_eq!(res.headers()[header::LOCATION], "/foo/?bar=wow");
}

#[tokio::test]
async fn test_both_slash_variants_registered() {
    let mut router = Router::new();
    router
        .get("/foo", |_req: Request<Body>| async { "no slash" })
        .get("/foo/", |_req: Request<Body>| async { "slash" });

    let res = router.dispatch(get("/foo")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "no slash");
}

#[tokio::test]
async fn test_implicit_redirect_with_capture() {
    let seen = Arc::new(Mutex::new(None));
    let mut router = Router::new();
    router.get("/foo/:bar/", recorder(seen.clone()));

    let res = router.dispatch(get("/foo/fluffy")).await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "/foo/fluffy/");

    let res = router.dispatch(get("/foo/fluffy?extra=bits")).await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "/foo/fluffy/?extra=bits");

    // The redirect is issued before any capture reaches a handler.
    assert!(seen.lock().unwrap().is_none());

    let mut router = Router::new();
    router
        .get("/foo/:bar", |_req: Request<Body>| async { StatusCode::OK })
        .get("/foo/:bar/", |_req: Request<Body>| async { StatusCode::OK });
    let res = router.dispatch(get("/foo/fluffy")).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_redirect_precedes_method_not_allowed() {
    let mut router = Router::new();
    router
        .get("/foo/", |_req: Request<Body>| async { StatusCode::OK })
        .post("/foo", |_req: Request<Body>| async { StatusCode::OK });

    let res = router.dispatch(get("/foo")).await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
}

#[tokio::test]
async fn test_default_not_found() {
    let router = Router::new();
    let res = router.dispatch(get("/nowhere")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(res).await, "404 page not found\n");
}

#[tokio::test]
async fn test_custom_not_found_handler() {
    let mut router = Router::new();
    router.not_found(|req: Request<Body>| async move {
        (StatusCode::IM_A_TEAPOT, format!("no {}", req.uri().path()))
    });

    let res = router.dispatch(get("/nowhere")).await;
    assert_eq!(res.status(), StatusCode::IM_A_TEAPOT);
    assert_eq!(body_string(res).await, "no /nowhere");
}

#[tokio::test]
async fn test_custom_not_found_status_form() {
    let mut router = Router::new();
    router.not_found_with(|method: &Method, path: &str| {
        (StatusCode::GONE, format!("{method} {path} is gone"))
    });

    let res = router.dispatch(request(Method::DELETE, "/old")).await;
    assert_eq!(res.status(), StatusCode::GONE);
    assert_eq!(body_string(res).await, "DELETE /old is gone");
}

#[tokio::test]
async fn test_handler_response_passes_through() {
    let mut router = Router::new();
    router.post("/things", |_req: Request<Body>| async {
        (StatusCode::CREATED, [(header::LOCATION, "/things/1")], "made")
    });

    let res = router.dispatch(request(Method::POST, "/things")).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.headers()[header::LOCATION], "/things/1");
    assert_eq!(body_string(res).await, "made");
}

#[tokio::test]
async fn test_lookup_does_not_invoke_handler() {
    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();

    let mut router = Router::new();
    router.get("/foo/:name", move |_req: Request<Body>| {
        flag.store(true, Ordering::SeqCst);
        async { StatusCode::OK }
    });

    let req = get("/foo/keith?a=b");
    assert!(router.lookup(req.method(), req.uri().path()).is_some());
    assert!(router.lookup(&Method::POST, "/foo/keith").is_none());
    assert!(router.lookup(&Method::GET, "/bar").is_none());
    assert!(!called.load(Ordering::SeqCst));
    assert_eq!(req.uri().query(), Some("a=b"));
}

#[tokio::test]
async fn test_looked_up_handler_is_callable() {
    let mut router = Router::new();
    router.get("/ping", |_req: Request<Body>| async { "pong" });

    let handler = router.lookup(&Method::GET, "/ping").unwrap();
    let res = handler.call(get("/ping")).await;
    assert_eq!(body_string(res).await, "pong");
}

#[tokio::test]
async fn test_config_disables_fallbacks() {
    let mut router = Router::with_config(RouterConfig {
        redirect_trailing_slash: false,
        handle_method_not_allowed: false,
    });
    router
        .get("/foo/", |_req: Request<Body>| async { StatusCode::OK })
        .post("/bar", |_req: Request<Body>| async { StatusCode::OK });

    assert_eq!(router.dispatch(get("/foo")).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(router.dispatch(get("/bar")).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_service_oneshot() {
    let mut router = Router::new();
    router.get("/hello/:name", |req: Request<Body>| async move {
        format!("Hello, {}", req.param(":name").unwrap_or_default())
    });
    let shared = SharedRouter::new(router);

    let res = shared.service().oneshot(get("/hello/blake")).await.unwrap();
    assert_eq!(body_string(res).await, "Hello, blake");
}

#[tokio::test]
async fn test_encoded_path_matches_literal() {
    let mut router = Router::new();
    router.get("/h\u{e9}llo/:name", |req: Request<Body>| async move {
        req.param(":name").unwrap_or_default()
    });

    let res = router.dispatch(get("/h%C3%A9llo/world")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "world");
}

#[tokio::test]
async fn test_capture_is_decoded() {
    let mut router = Router::new();
    router.get("/hello/:name", |req: Request<Body>| async move {
        let captured = req.path_params().and_then(|p| p.get(":name")).map(str::to_string);
        format!("{}|{}", req.param(":name").unwrap_or_default(), captured.unwrap_or_default())
    });

    let res = router.dispatch(get("/hello/J%C3%B6rg?a=%41")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_string(res).await, "J\u{f6}rg|J\u{f6}rg");
}

#[tokio::test]
async fn test_encoded_redirect_keeps_raw_target() {
    let mut router = Router::new();
    router.get("/caf\u{e9}/", |_req: Request<Body>| async { StatusCode::OK });

    let res = router.dispatch(get("/caf%C3%A9?x=1")).await;
    assert_eq!(res.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(res.headers()[header::LOCATION], "/caf%C3%A9/?x=1");
}
