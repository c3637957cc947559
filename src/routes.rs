use axum::{
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_cookies::CookieManagerLayer;

use crate::handlers;
use crate::middleware_layer;
use crate::state::AppState;

/// Assembles the application router: the guarded page surface plus the auth,
/// wallet and notification APIs. The cookie layer is applied here so the
/// router is self-contained for in-process tests.
pub fn router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/dashboard", get(handlers::pages::dashboard))
        .route("/dashboard/{*rest}", get(handlers::pages::dashboard))
        .route("/profile", get(handlers::pages::profile))
        .route("/profile/{*rest}", get(handlers::pages::profile))
        .route("/settings", get(handlers::pages::settings))
        .route("/settings/{*rest}", get(handlers::pages::settings))
        .route("/login", get(handlers::pages::login_page))
        .route("/register", get(handlers::pages::register_page))
        .route_layer(from_fn_with_state(
            state.clone(),
            middleware_layer::guard::route_guard,
        ))
        .with_state(state.clone());

    let auth_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/check-session", get(handlers::auth::check_session))
        .with_state(state.clone());

    let account_routes = Router::new()
        .route(
            "/api/wallets/list/{account_id}",
            get(handlers::wallets::list_wallets),
        )
        .route(
            "/api/notifications",
            get(handlers::notifications::list_notifications),
        )
        .route(
            "/api/notifications/read-all",
            put(handlers::notifications::mark_all_read),
        )
        .route(
            "/api/notifications/{notification_id}/read",
            put(handlers::notifications::mark_read),
        )
        .with_state(state);

    Router::new()
        .merge(page_routes)
        .merge(auth_routes)
        .merge(account_routes)
        .layer(CookieManagerLayer::new())
}
