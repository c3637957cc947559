use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use http::header::SET_COOKIE;
use serde::{Deserialize, Serialize};
use tower_cookies::cookie::time::Duration;
use tower_cookies::cookie::SameSite;
use tower_cookies::{Cookie, Cookies};
use zeroize::Zeroize;

use crate::{
    error::{AuthError, Result},
    models::session::{
        Session, ACCESS_TOKEN_COOKIE, AUTH_STORAGE_COOKIE, REFRESH_TOKEN_COOKIE,
        TOKEN_REFRESH_TIME_COOKIE,
    },
    models::user::User,
    services::gateway::AuthOutcome,
    state::AppState,
    validation::auth::*,
};

/// The request payload for user login.
#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// The request payload for user registration, forwarded to the backend
/// verbatim after validation.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub password: String,
    pub address: String,
    pub city: String,
    pub country: String,
    pub currency: String,
    pub state: String,
    pub postal_code: String,
    pub dob: String,
    pub gov_id: String,
    pub data_authorization: bool,
}

/// The response payload for successful auth requests.
#[derive(Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub session: Session,
}

/// The response payload for status-only auth requests.
#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

/// Builds the persisted-store cookie from a state snapshot.
///
/// The snapshot is base64-encoded because raw JSON is not a valid cookie
/// value. Readable by the client; it holds no credentials, only the cached
/// rendering state.
fn auth_storage_cookie(snapshot: &str) -> Cookie<'static> {
    let mut cookie = Cookie::new(AUTH_STORAGE_COOKIE, URL_SAFE_NO_PAD.encode(snapshot));
    cookie.set_path("/");
    cookie.set_same_site(SameSite::Strict);
    cookie.set_max_age(Duration::days(7));
    cookie
}

/// Writes the current store snapshot into the persistence cookie.
fn persist_store(cookies: &Cookies, state: &AppState) {
    cookies.add(auth_storage_cookie(&state.store.snapshot()));
}

/// Reads a persisted snapshot from the request cookies, if one is present
/// and decodes cleanly.
fn read_persisted_snapshot(cookies: &Cookies) -> Option<String> {
    let cookie = cookies.get(AUTH_STORAGE_COOKIE)?;
    let bytes = URL_SAFE_NO_PAD.decode(cookie.value()).ok()?;
    String::from_utf8(bytes).ok()
}

fn auth_success_response(status: StatusCode, outcome: AuthOutcome) -> Response {
    let AuthOutcome {
        user,
        session,
        set_cookies,
    } = outcome;

    let mut response = (status, Json(AuthResponse { user, session })).into_response();
    // Forward the backend's token cookies to the browser.
    for value in set_cookies {
        response.headers_mut().append(SET_COOKIE, value);
    }
    response
}

/// Handles user login.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Response> {
    validate_login(&payload.email, &payload.password)?;

    let result = state.gateway.login(&payload.email, &payload.password).await;
    payload.password.zeroize();
    let outcome = result?;

    persist_store(&cookies, &state);
    Ok(auth_success_response(StatusCode::OK, outcome))
}

/// Handles user registration.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    cookies: Cookies,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<Response> {
    validate_registration(&payload)?;

    let result = state.gateway.register(&payload).await;
    payload.password.zeroize();
    let outcome = result?;

    persist_store(&cookies, &state);
    Ok(auth_success_response(StatusCode::CREATED, outcome))
}

/// Handles user logout.
///
/// The gateway's server call is best-effort; the browser cookies and the
/// store are always cleared, so logout cannot get stuck behind an
/// unreachable backend.
#[axum::debug_handler]
pub async fn logout(State(state): State<AppState>, cookies: Cookies) -> Result<Response> {
    state.gateway.logout().await;

    for name in [
        ACCESS_TOKEN_COOKIE,
        REFRESH_TOKEN_COOKIE,
        TOKEN_REFRESH_TIME_COOKIE,
        AUTH_STORAGE_COOKIE,
    ] {
        let mut cookie = Cookie::new(name, "");
        cookie.set_path("/");
        cookies.remove(cookie);
    }

    let response = StatusResponse {
        success: true,
        message: "Logout successful".to_string(),
    };

    Ok((StatusCode::OK, Json(response)).into_response())
}

/// Handles session verification.
///
/// Hydrates the store from the persisted snapshot when the process has no
/// cached state yet, then runs the verifier's check-auth algorithm.
#[axum::debug_handler]
pub async fn check_session(
    State(state): State<AppState>,
    cookies: Cookies,
) -> Result<Response> {
    if state.store.user().is_none() {
        if let Some(snapshot) = read_persisted_snapshot(&cookies) {
            tracing::debug!("Hydrating auth store from persisted snapshot");
            state.store.hydrate(&snapshot);
        }
    }

    if !state.verifier.check_auth().await {
        return Err(AuthError::Unauthorized);
    }

    let auth = state.store.state();
    let (Some(user), Some(session)) = (auth.user, auth.session) else {
        // check_auth returning true guarantees a user; a missing session
        // record means the backend payload was incomplete.
        return Err(AuthError::Internal("Session record missing".to_string()));
    };

    persist_store(&cookies, &state);
    Ok((StatusCode::OK, Json(AuthResponse { user, session })).into_response())
}
