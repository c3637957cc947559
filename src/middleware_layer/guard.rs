use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use http::header::{COOKIE, SET_COOKIE};
use http::HeaderValue;
use tower_cookies::cookie::time::Duration as CookieDuration;
use tower_cookies::{Cookie, Cookies};

use crate::models::session::{
    ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, TOKEN_REFRESH_TIME_COOKIE,
};
use crate::state::AppState;

/// Path prefixes that require authentication.
const PROTECTED_PREFIXES: &[&str] = &["/dashboard", "/profile", "/settings"];
/// Paths only unauthenticated visitors should see.
const AUTH_PATHS: &[&str] = &["/login", "/register"];

/// How a path relates to the guard's redirect rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Requires authentication; unauthenticated visitors go to `/login`.
    Protected,
    /// Login/register; authenticated visitors go to `/dashboard`.
    AuthOnly,
    /// Not subject to the guard.
    Unmatched,
}

/// Classifies a request path against the guard's matcher.
pub fn classify(path: &str) -> RouteClass {
    if PROTECTED_PREFIXES
        .iter()
        .any(|prefix| path == *prefix || path.starts_with(&format!("{}/", prefix)))
    {
        RouteClass::Protected
    } else if AUTH_PATHS.contains(&path) {
        RouteClass::AuthOnly
    } else {
        RouteClass::Unmatched
    }
}

/// What the guard saw in the request cookies. The guard never reads the
/// in-memory store; cookie presence is the authority at the edge.
#[derive(Debug, Clone, Copy, Default)]
pub struct CookieFacts {
    pub has_access: bool,
    pub has_refresh: bool,
    /// Millisecond epoch from the `token_refresh_time` cookie, if readable.
    pub refresh_time_ms: Option<i64>,
}

impl CookieFacts {
    pub fn from_cookies(cookies: &Cookies) -> Self {
        Self {
            has_access: cookies.get(ACCESS_TOKEN_COOKIE).is_some(),
            has_refresh: cookies.get(REFRESH_TOKEN_COOKIE).is_some(),
            refresh_time_ms: cookies
                .get(TOKEN_REFRESH_TIME_COOKIE)
                .and_then(|c| c.value().parse::<i64>().ok()),
        }
    }
}

/// Whether a proactive refresh should run before gating the request.
///
/// True when the access token is missing but a refresh token exists, or when
/// the staleness clock says the token is older than the threshold (token
/// lifetime minus the safety margin).
pub fn needs_refresh(facts: &CookieFacts, now_ms: i64, threshold_ms: i64) -> bool {
    if !facts.has_access && facts.has_refresh {
        return true;
    }
    match facts.refresh_time_ms {
        Some(stamped) => now_ms - stamped > threshold_ms,
        None => false,
    }
}

/// Terminal outcome for one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    Pass,
    RedirectLogin,
    RedirectDashboard,
}

/// The redirect table: pure over route class and the authentication outcome.
pub fn verdict(class: RouteClass, authenticated: bool) -> GuardVerdict {
    match (class, authenticated) {
        (RouteClass::Protected, false) => GuardVerdict::RedirectLogin,
        (RouteClass::AuthOnly, true) => GuardVerdict::RedirectDashboard,
        _ => GuardVerdict::Pass,
    }
}

/// Edge route guard middleware.
///
/// Runs before each matched page route. Decides authentication from the
/// request cookies alone, refreshing proactively through the backend's
/// check-session endpoint when the access token is missing or stale, and
/// forwarding any `Set-Cookie` headers the backend issues. Refresh failures
/// fail closed for protected routes.
pub async fn route_guard(
    State(state): State<AppState>,
    cookies: Cookies,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    let class = classify(&path);
    let facts = CookieFacts::from_cookies(&cookies);

    tracing::debug!(
        path,
        has_access = facts.has_access,
        has_refresh = facts.has_refresh,
        "🔐 Route guard checking navigation"
    );

    let now_ms = Utc::now().timestamp_millis();
    let threshold_ms = state.config.refresh_threshold().as_millis() as i64;

    let mut authenticated = facts.has_access || facts.has_refresh;
    let mut refreshed_cookies: Option<Vec<HeaderValue>> = None;

    if needs_refresh(&facts, now_ms, threshold_ms) && facts.has_refresh {
        tracing::debug!(path, "Access token stale or missing, refreshing proactively");
        match proactive_refresh(&state, request.headers().get(COOKIE).cloned()).await {
            Some(set_cookies) => {
                authenticated = true;
                refreshed_cookies = Some(set_cookies);
            }
            None => {
                // Fails closed: a refresh that did not succeed leaves the
                // visitor unauthenticated for this navigation.
                authenticated = false;
            }
        }
    }

    let mut response = match verdict(class, authenticated) {
        GuardVerdict::RedirectLogin => {
            tracing::info!(path, "Unauthenticated access, redirecting to /login");
            Redirect::temporary("/login").into_response()
        }
        GuardVerdict::RedirectDashboard => {
            tracing::info!(path, "Authenticated visitor on auth page, redirecting to /dashboard");
            Redirect::temporary("/dashboard").into_response()
        }
        GuardVerdict::Pass => next.run(request).await,
    };

    if let Some(set_cookies) = refreshed_cookies {
        for value in set_cookies {
            response.headers_mut().append(SET_COOKIE, value);
        }
        stamp_refresh_time(&cookies, now_ms);
    } else if facts.has_access && facts.refresh_time_ms.is_none() {
        // An access token without a staleness clock gets one stamped so the
        // next navigation can judge its age.
        stamp_refresh_time(&cookies, now_ms);
    }

    response
}

/// Calls check-session server-side, forwarding the navigation's cookies.
///
/// Returns the backend's `Set-Cookie` headers on success, `None` on any
/// failure (HTTP error or unreachable backend).
async fn proactive_refresh(
    state: &AppState,
    cookie_header: Option<HeaderValue>,
) -> Option<Vec<HeaderValue>> {
    let url = match state.config.backend_origin.join("/auth/check-session") {
        Ok(url) => url,
        Err(e) => {
            tracing::error!("Invalid backend URL for refresh: {}", e);
            return None;
        }
    };

    let mut request = state.guard_http.get(url);
    if let Some(header) = cookie_header {
        request = request.header(COOKIE, header);
    }

    match request.send().await {
        Ok(response) if response.status().is_success() => {
            tracing::debug!("✅ Proactive refresh succeeded");
            Some(
                response
                    .headers()
                    .get_all(SET_COOKIE)
                    .iter()
                    .cloned()
                    .collect(),
            )
        }
        Ok(response) => {
            tracing::info!(status = %response.status(), "Proactive refresh rejected");
            None
        }
        Err(e) => {
            tracing::warn!("Proactive refresh failed: {}", e);
            None
        }
    }
}

/// Stamps a fresh `token_refresh_time` cookie on the outgoing response.
fn stamp_refresh_time(cookies: &Cookies, now_ms: i64) {
    let mut cookie = Cookie::new(TOKEN_REFRESH_TIME_COOKIE, now_ms.to_string());
    cookie.set_path("/");
    cookie.set_max_age(CookieDuration::hours(1));
    // Readable by the client, it is a clock and not a credential.
    cookie.set_http_only(false);
    cookies.add(cookie);
}
