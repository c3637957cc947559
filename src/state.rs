use std::sync::Arc;

use crate::config::Config;
use crate::error::{AuthError, Result};
use crate::services::gateway::AuthGateway;
use crate::services::verifier::SessionVerifier;
use crate::store::AuthStore;

/// The application's state.
///
/// The store, gateway and verifier form the client runtime; `guard_http` is
/// the route guard's own cookie-less client, kept separate because the guard
/// works from request cookies and deliberately shares no session state with
/// the client runtime.
#[derive(Clone)]
pub struct AppState {
    /// The application's configuration.
    pub config: Config,
    /// The credential/session store.
    pub store: Arc<AuthStore>,
    /// The HTTP client layer for the backend.
    pub gateway: Arc<AuthGateway>,
    /// The session verifier.
    pub verifier: Arc<SessionVerifier>,
    /// Plain HTTP client for the route guard's proactive refresh calls.
    pub guard_http: reqwest::Client,
}

impl AppState {
    /// Creates a new `AppState`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AppState`.
    pub fn new(config: &Config) -> Result<Self> {
        let store = Arc::new(AuthStore::new());
        tracing::info!("✅ Auth store initialized");

        let gateway = Arc::new(AuthGateway::new(config, store.clone())?);
        tracing::info!("✅ Auth gateway initialized for {}", config.backend_origin);

        let verifier = Arc::new(SessionVerifier::new(config, store.clone(), gateway.clone()));
        tracing::info!("✅ Session verifier initialized");

        let guard_http = reqwest::Client::builder()
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build guard HTTP client: {}", e)))?;

        Ok(AppState {
            config: config.clone(),
            store,
            gateway,
            verifier,
            guard_http,
        })
    }
}
