//! Minimal page handlers for the guarded route surface. Rendering is out of
//! scope; these exist so the route guard has navigations to gate.

use axum::response::Html;

pub async fn dashboard() -> Html<&'static str> {
    Html("<h1>Dashboard</h1>")
}

pub async fn profile() -> Html<&'static str> {
    Html("<h1>Profile</h1>")
}

pub async fn settings() -> Html<&'static str> {
    Html("<h1>Settings</h1>")
}

pub async fn login_page() -> Html<&'static str> {
    Html("<h1>Login</h1>")
}

pub async fn register_page() -> Html<&'static str> {
    Html("<h1>Register</h1>")
}
