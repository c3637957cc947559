use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::RwLock;
use std::time::Duration;

use crate::models::session::Session;
use crate::models::user::User;

/// The persisted auth state.
///
/// Invariant: `is_authenticated == true` implies `user` is present. The
/// store enforces this on every write and on hydration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthState {
    /// The current user, if authenticated.
    pub user: Option<User>,
    /// Read-only copy of the backend session record.
    pub session: Option<Session>,
    /// Whether the client currently considers itself authenticated. This is
    /// a cache for rendering decisions; cookie presence at the edge stays
    /// the authority for route protection.
    pub is_authenticated: bool,
    /// When the state was last confirmed against the backend. `None` after
    /// logout.
    pub last_refresh: Option<DateTime<Utc>>,
}

impl AuthState {
    fn enforce_invariant(&mut self) {
        if self.user.is_none() {
            self.is_authenticated = false;
        }
    }
}

/// The credential/session store.
///
/// An injectable container around the in-memory [`AuthState`] with an
/// explicit serialization boundary: `snapshot` / `hydrate` carry the state
/// across process restarts. The store itself never touches the network;
/// reconciliation with the backend lives in the session verifier.
#[derive(Debug, Default)]
pub struct AuthStore {
    inner: RwLock<AuthState>,
}

impl AuthStore {
    /// Creates an empty, logged-out store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AuthState {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replaces the user and session wholesale and stamps the refresh time.
    pub fn set_auth(&self, user: User, session: Session) {
        tracing::debug!(user_id = %user.id, "🔐 Updating auth state");
        let mut state = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        state.user = Some(user);
        state.session = Some(session);
        state.is_authenticated = true;
        state.last_refresh = Some(Utc::now());
    }

    /// Clears the user, session, authentication flag and refresh timestamp.
    pub fn logout(&self) {
        tracing::debug!("👋 Clearing auth state");
        let mut state = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = AuthState::default();
    }

    /// Returns a copy of the current state.
    pub fn state(&self) -> AuthState {
        self.read()
    }

    /// Returns the cached user, if any.
    pub fn user(&self) -> Option<User> {
        self.read().user
    }

    /// Returns the cached session, if any.
    pub fn session(&self) -> Option<Session> {
        self.read().session
    }

    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    /// Whether the state was confirmed against the backend within `window`.
    pub fn refreshed_within(&self, window: Duration) -> bool {
        match self.read().last_refresh {
            Some(last) => {
                let elapsed = (Utc::now() - last).to_std().unwrap_or(Duration::ZERO);
                elapsed < window
            }
            None => false,
        }
    }

    /// Serializes the state to a JSON snapshot.
    pub fn snapshot(&self) -> String {
        sonic_rs::to_string(&self.read()).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize auth snapshot: {}", e);
            "{}".to_string()
        })
    }

    /// Replaces the state from a JSON snapshot.
    ///
    /// A corrupt snapshot hydrates to the logged-out state rather than
    /// failing; a stale snapshot is reconciled later by the verifier.
    pub fn hydrate(&self, snapshot: &str) {
        let mut restored: AuthState = match sonic_rs::from_str(snapshot) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("Ignoring corrupt auth snapshot: {}", e);
                AuthState::default()
            }
        };
        restored.enforce_invariant();

        let mut state = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *state = restored;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::KycStatus;
    use uuid::Uuid;

    fn test_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "a@b.com".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
            kyc_status: KycStatus::Verified,
        }
    }

    fn test_session() -> Session {
        Session {
            id: "sess-1".to_string(),
            browser: "Firefox".to_string(),
            device_info: "Linux x86_64".to_string(),
            ip_address: "203.0.113.7".to_string(),
        }
    }

    #[test]
    fn set_auth_marks_authenticated_and_stamps_refresh() {
        let store = AuthStore::new();
        store.set_auth(test_user(), test_session());

        let state = store.state();
        assert!(state.is_authenticated);
        assert_eq!(state.user.unwrap().email, "a@b.com");
        assert!(state.last_refresh.is_some());
        assert!(store.refreshed_within(Duration::from_secs(900)));
    }

    #[test]
    fn logout_clears_everything() {
        let store = AuthStore::new();
        store.set_auth(test_user(), test_session());
        store.logout();

        let state = store.state();
        assert!(!state.is_authenticated);
        assert!(state.user.is_none());
        assert!(state.session.is_none());
        assert!(state.last_refresh.is_none());
        assert!(!store.refreshed_within(Duration::from_secs(900)));
    }

    #[test]
    fn snapshot_round_trips_through_hydrate() {
        let store = AuthStore::new();
        store.set_auth(test_user(), test_session());
        let snapshot = store.snapshot();

        let restored = AuthStore::new();
        restored.hydrate(&snapshot);
        assert!(restored.is_authenticated());
        assert_eq!(restored.user().unwrap().email, "a@b.com");
        assert_eq!(restored.session().unwrap().id, "sess-1");
    }

    #[test]
    fn corrupt_snapshot_hydrates_to_logged_out() {
        let store = AuthStore::new();
        store.set_auth(test_user(), test_session());
        store.hydrate("{not json");
        assert!(!store.is_authenticated());
        assert!(store.user().is_none());
    }

    #[test]
    fn hydrate_enforces_user_presence_invariant() {
        let store = AuthStore::new();
        // Snapshot claims authentication without a user record.
        store.hydrate(r#"{"user":null,"session":null,"is_authenticated":true,"last_refresh":null}"#);
        assert!(!store.is_authenticated());
    }
}
