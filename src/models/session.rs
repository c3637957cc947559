use serde::{Deserialize, Serialize};

/// Name of the short-lived credential cookie issued by the backend.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
/// Name of the longer-lived credential cookie used to mint new access tokens.
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
/// Name of the staleness-clock cookie this service writes itself. The value
/// is a millisecond epoch timestamp of the last successful refresh; it is the
/// only auth cookie whose value gets read, the tokens stay opaque.
pub const TOKEN_REFRESH_TIME_COOKIE: &str = "token_refresh_time";
/// Name of the cookie carrying the persisted auth-store snapshot.
pub const AUTH_STORAGE_COOKIE: &str = "auth_storage";

/// Backend-tracked record of one authenticated browser context.
///
/// Created by the backend at login time; this side only ever holds a
/// read-only copy. Expiry is not tracked here, the token cookies bound it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The session identifier.
    pub id: String,
    /// Browser string reported at login.
    pub browser: String,
    /// Device descriptor reported at login.
    pub device_info: String,
    /// Client IP the backend recorded for the session.
    pub ip_address: String,
}
