use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::AuthError;
use crate::services::gateway::AuthGateway;
use crate::store::AuthStore;

/// Reconciles the cached auth state with server truth.
///
/// Runs once per application load and after 401-triggered refreshes. Cookie
/// presence at the edge stays the authority for route protection; the
/// verifier only keeps the in-memory cache honest.
pub struct SessionVerifier {
    store: Arc<AuthStore>,
    gateway: Arc<AuthGateway>,
    cache_ttl: Duration,
}

impl SessionVerifier {
    pub fn new(config: &Config, store: Arc<AuthStore>, gateway: Arc<AuthGateway>) -> Self {
        Self {
            store,
            gateway,
            cache_ttl: config.access_token_ttl,
        }
    }

    /// Decides whether the current session can be trusted.
    ///
    /// 1. Cached state refreshed within the token lifetime is trusted
    ///    without a network call.
    /// 2. Otherwise check-session re-validates and updates the store.
    /// 3. A 401 clears the store.
    /// 4. A transport failure keeps a cached user authenticated (transient
    ///    outages must not log anyone out); with no cached user the store is
    ///    cleared.
    pub async fn check_auth(&self) -> bool {
        if self.store.is_authenticated() && self.store.refreshed_within(self.cache_ttl) {
            tracing::debug!("Auth cache is fresh, skipping check-session");
            return true;
        }

        match self.gateway.check_session().await {
            Ok(outcome) => {
                self.store.set_auth(outcome.user, outcome.session);
                tracing::debug!("✅ Session confirmed by backend");
                true
            }
            Err(AuthError::Unauthorized) => {
                tracing::info!("Session rejected by backend, clearing auth state");
                self.store.logout();
                false
            }
            Err(e) => {
                if self.store.user().is_some() {
                    tracing::warn!("Backend unreachable ({}), trusting cached session", e);
                    true
                } else {
                    tracing::warn!("Backend unreachable ({}) and no cached session", e);
                    self.store.logout();
                    false
                }
            }
        }
    }
}
