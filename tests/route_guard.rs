use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use http::header::{COOKIE, LOCATION, SET_COOKIE};
use http::HeaderValue;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use uuid::Uuid;

use sessiond::config::Config;
use sessiond::routes;
use sessiond::state::AppState;

/// Stand-in for the backend's check-session endpoint, which is all the
/// route guard ever calls.
#[derive(Clone)]
struct Backend {
    hits: Arc<AtomicUsize>,
    deny: Arc<AtomicBool>,
}

impl Backend {
    fn new() -> Self {
        Self {
            hits: Arc::new(AtomicUsize::new(0)),
            deny: Arc::new(AtomicBool::new(false)),
        }
    }
}

async fn check_session_handler(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.hits.fetch_add(1, Ordering::SeqCst);

    let has_refresh = headers
        .get(COOKIE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("refresh_token=good"));

    if backend.deny.load(Ordering::SeqCst) || !has_refresh {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut response = Json(json!({
        "user": {
            "id": Uuid::new_v4(),
            "email": "a@b.com",
            "firstName": "Test",
            "lastName": "User",
            "kycStatus": "verified"
        },
        "session": {
            "id": "sess-1",
            "browser": "Firefox",
            "deviceInfo": "Linux x86_64",
            "ipAddress": "203.0.113.7"
        }
    }))
    .into_response();
    response.headers_mut().append(
        SET_COOKIE,
        HeaderValue::from_static("access_token=good; Path=/"),
    );
    response
}

async fn spawn_backend(backend: Backend) -> SocketAddr {
    let app = Router::new()
        .route("/auth/check-session", get(check_session_handler))
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn app_for(addr: SocketAddr) -> Router {
    let config = Config {
        backend_origin: format!("http://{}", addr).parse().unwrap(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        access_token_ttl: Duration::from_secs(900),
        refresh_margin: Duration::from_secs(60),
        logout_timeout: Duration::from_secs(2),
    };
    routes::router(AppState::new(&config).unwrap())
}

fn page_request(path: &str, cookies: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(cookies) = cookies {
        builder = builder.header(COOKIE, cookies);
    }
    builder.body(Body::empty()).unwrap()
}

fn location(response: &Response) -> Option<&str> {
    response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
}

fn set_cookie_values(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect()
}

fn fresh_stamp() -> String {
    Utc::now().timestamp_millis().to_string()
}

fn stale_stamp() -> String {
    (Utc::now().timestamp_millis() - 15 * 60 * 1000).to_string()
}

#[tokio::test]
async fn dashboard_without_cookies_redirects_to_login() {
    let backend = Backend::new();
    let app = app_for(spawn_backend(backend.clone()).await);

    let response = app.oneshot(page_request("/dashboard", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(backend.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn nested_protected_paths_are_guarded_too() {
    let backend = Backend::new();
    let app = app_for(spawn_backend(backend).await);

    for path in ["/dashboard/wallets", "/profile/details", "/settings/security"] {
        let response = app
            .clone()
            .oneshot(page_request(path, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "path {path}");
        assert_eq!(location(&response), Some("/login"), "path {path}");
    }
}

#[tokio::test]
async fn login_with_access_token_redirects_to_dashboard() {
    let backend = Backend::new();
    let app = app_for(spawn_backend(backend).await);

    let response = app
        .oneshot(page_request("/login", Some("access_token=good")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/dashboard"));

    // The access token had no staleness clock yet, so one gets stamped.
    let cookies = set_cookie_values(&response);
    assert!(
        cookies.iter().any(|c| c.starts_with("token_refresh_time=")),
        "expected a token_refresh_time stamp, got {cookies:?}"
    );
}

#[tokio::test]
async fn register_with_access_token_redirects_to_dashboard() {
    let backend = Backend::new();
    let app = app_for(spawn_backend(backend).await);

    let cookies = format!("access_token=good; token_refresh_time={}", fresh_stamp());
    let response = app
        .oneshot(page_request("/register", Some(&cookies)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn dashboard_with_fresh_access_token_passes_through() {
    let backend = Backend::new();
    let app = app_for(spawn_backend(backend.clone()).await);

    let cookies = format!("access_token=good; token_refresh_time={}", fresh_stamp());
    let response = app
        .oneshot(page_request("/dashboard", Some(&cookies)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.hits.load(Ordering::SeqCst), 0, "fresh token must not refresh");
}

#[tokio::test]
async fn refresh_only_cookies_trigger_refresh_and_pass() {
    let backend = Backend::new();
    let app = app_for(spawn_backend(backend.clone()).await);

    let response = app
        .oneshot(page_request("/dashboard", Some("refresh_token=good")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(backend.hits.load(Ordering::SeqCst), 1);

    // The backend's new access token is forwarded and the staleness clock
    // stamped alongside it.
    let cookies = set_cookie_values(&response);
    assert!(
        cookies.iter().any(|c| c.starts_with("access_token=")),
        "expected forwarded access token, got {cookies:?}"
    );
    assert!(
        cookies.iter().any(|c| c.starts_with("token_refresh_time=")),
        "expected a token_refresh_time stamp, got {cookies:?}"
    );
}

#[tokio::test]
async fn failed_refresh_redirects_to_login() {
    let backend = Backend::new();
    backend.deny.store(true, Ordering::SeqCst);
    let app = app_for(spawn_backend(backend.clone()).await);

    let response = app
        .oneshot(page_request("/dashboard", Some("refresh_token=good")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login"));
    assert_eq!(backend.hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unreachable_backend_fails_closed() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let app = app_for(addr);

    let response = app
        .oneshot(page_request("/dashboard", Some("refresh_token=good")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login"));
}

#[tokio::test]
async fn stale_stamp_triggers_proactive_refresh() {
    let backend = Backend::new();
    let app = app_for(spawn_backend(backend.clone()).await);

    let cookies = format!(
        "access_token=good; refresh_token=good; token_refresh_time={}",
        stale_stamp()
    );
    let response = app
        .oneshot(page_request("/dashboard", Some(&cookies)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        backend.hits.load(Ordering::SeqCst),
        1,
        "a stamp past the threshold must refresh proactively"
    );
}

#[tokio::test]
async fn refresh_only_cookies_on_login_redirect_to_dashboard_after_refresh() {
    let backend = Backend::new();
    let app = app_for(spawn_backend(backend.clone()).await);

    let response = app
        .oneshot(page_request("/login", Some("refresh_token=good")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/dashboard"));

    // Refreshed cookies ride along on the redirect so the dashboard load
    // arrives with a valid access token.
    let cookies = set_cookie_values(&response);
    assert!(cookies.iter().any(|c| c.starts_with("access_token=")));
}

#[tokio::test]
async fn expired_tokens_with_failing_refresh_redirect_to_login() {
    let backend = Backend::new();
    backend.deny.store(true, Ordering::SeqCst);
    let app = app_for(spawn_backend(backend.clone()).await);

    let cookies = format!(
        "access_token=stale; refresh_token=stale; token_refresh_time={}",
        stale_stamp()
    );
    let response = app
        .oneshot(page_request("/dashboard", Some(&cookies)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), Some("/login"));
}
