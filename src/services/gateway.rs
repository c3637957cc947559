use http::header::SET_COOKIE;
use http::{HeaderValue, StatusCode};
use reqwest::cookie::Jar;
use reqwest::{RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AuthError, Result};
use crate::models::notification::NotificationPage;
use crate::models::session::{
    Session, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE, TOKEN_REFRESH_TIME_COOKIE,
};
use crate::models::user::User;
use crate::models::wallet::Wallet;
use crate::store::AuthStore;

/// The `{user, session}` body returned by login, register and check-session.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct AuthPayload {
    pub user: User,
    pub session: Session,
}

/// An auth response together with the `Set-Cookie` headers the backend
/// attached, so callers fronting a browser can forward them.
#[derive(Debug)]
pub struct AuthOutcome {
    pub user: User,
    pub session: Session,
    pub set_cookies: Vec<HeaderValue>,
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

/// HTTP client layer for the auth, wallet and notification backends.
///
/// Owns a cookie jar playing the role of the browser's cookie store for this
/// session, and the single-flight refresh gate behind the 401 retry
/// decorator. All requests go to one fixed origin with credentials attached.
pub struct AuthGateway {
    http: reqwest::Client,
    jar: Arc<Jar>,
    origin: Url,
    store: Arc<AuthStore>,
    refresh_gate: Mutex<()>,
    /// Bumped after every completed refresh; lets callers that queued behind
    /// an in-flight refresh observe its completion and skip their own.
    refresh_generation: AtomicU64,
    logout_timeout: Duration,
}

impl AuthGateway {
    /// Creates a new `AuthGateway`.
    ///
    /// # Arguments
    ///
    /// * `config` - The application's configuration.
    /// * `store` - The credential/session store the gateway keeps in sync.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AuthGateway`.
    pub fn new(config: &Config, store: Arc<AuthStore>) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| AuthError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            jar,
            origin: config.backend_origin.clone(),
            store,
            refresh_gate: Mutex::new(()),
            refresh_generation: AtomicU64::new(0),
            logout_timeout: config.logout_timeout,
        })
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.origin
            .join(path)
            .map_err(|e| AuthError::Internal(format!("Invalid backend URL: {}", e)))
    }

    /// Performs `POST /auth/account/login` and updates the store on success.
    ///
    /// Invalid credentials surface as `Unauthorized`; an unreachable backend
    /// as `NetworkUnavailable`. The two are kept distinct so only the latter
    /// shows a service-unavailable banner instead of a credentials error.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthOutcome> {
        tracing::info!(email, "🔐 Login attempt");

        let response = self
            .http
            .post(self.url("/auth/account/login")?)
            .json(&LoginBody { email, password })
            .send()
            .await
            .map_err(AuthError::from_transport)?;

        let outcome = Self::parse_auth_response(response).await?;
        self.store
            .set_auth(outcome.user.clone(), outcome.session.clone());
        tracing::info!(user_id = %outcome.user.id, "✅ User logged in");
        Ok(outcome)
    }

    /// Performs `POST /auth/account/register` and updates the store on
    /// success, mirroring the login path.
    pub async fn register<B: Serialize>(&self, payload: &B) -> Result<AuthOutcome> {
        let response = self
            .http
            .post(self.url("/auth/account/register")?)
            .json(payload)
            .send()
            .await
            .map_err(AuthError::from_transport)?;

        let outcome = Self::parse_auth_response(response).await?;
        self.store
            .set_auth(outcome.user.clone(), outcome.session.clone());
        tracing::info!(user_id = %outcome.user.id, "✅ User registered");
        Ok(outcome)
    }

    /// Performs `GET /auth/check-session`.
    ///
    /// Does not touch the store; the verifier and the refresh path decide
    /// what a result means for cached state.
    pub async fn check_session(&self) -> Result<AuthOutcome> {
        let response = self
            .http
            .get(self.url("/auth/check-session")?)
            .send()
            .await
            .map_err(AuthError::from_transport)?;

        Self::parse_auth_response(response).await
    }

    /// Attempts server-side session invalidation, then unconditionally clears
    /// the jar's auth cookies and the store.
    ///
    /// The server call is capped at the configured timeout and its outcome is
    /// only logged; logout must never get stuck behind an unreachable
    /// backend.
    pub async fn logout(&self) {
        tracing::info!("👋 Logout requested");

        let server_call = async {
            self.http
                .post(self.url("/auth/account/logout")?)
                .send()
                .await
                .map_err(AuthError::from_transport)
        };

        match tokio::time::timeout(self.logout_timeout, server_call).await {
            Ok(Ok(response)) if response.status().is_success() => {
                tracing::debug!("Server session invalidated");
            }
            Ok(Ok(response)) => {
                tracing::warn!(status = %response.status(), "Server logout rejected, clearing locally anyway");
            }
            Ok(Err(e)) => {
                tracing::warn!("Server logout failed, clearing locally anyway: {}", e);
            }
            Err(_) => {
                tracing::warn!("Server logout timed out, clearing locally anyway");
            }
        }

        self.clear_auth_cookies();
        self.store.logout();
        tracing::info!("✅ Local auth state cleared");
    }

    /// Refreshes the session via check-session, updating the store.
    ///
    /// Single-flight: concurrent callers serialize on the gate, and a caller
    /// that waited while another refresh completed returns without a second
    /// network call. The store update happens-before this returns, so a
    /// replay issued afterwards observes the refreshed state.
    pub async fn refresh_session(&self) -> Result<()> {
        let observed = self.refresh_generation.load(Ordering::Acquire);
        self.refresh_session_observed(observed).await
    }

    /// Refresh that is a no-op when any refresh completed after `observed`
    /// was read; callers pass the generation they saw before the request
    /// that earned the 401.
    async fn refresh_session_observed(&self, observed: u64) -> Result<()> {
        let _gate = self.refresh_gate.lock().await;

        if self.refresh_generation.load(Ordering::Acquire) != observed {
            tracing::debug!("Session already refreshed by a concurrent request");
            return Ok(());
        }

        let outcome = self.check_session().await?;
        self.store.set_auth(outcome.user, outcome.session);
        self.refresh_generation.fetch_add(1, Ordering::Release);
        tracing::debug!("✅ Session refreshed");
        Ok(())
    }

    /// Sends an authenticated request, retrying at most once after a 401.
    ///
    /// On 401 the session is refreshed (single-flight) and the original
    /// request replayed exactly once; a 401 from the replay clears the store
    /// and propagates instead of recursing.
    async fn send_authenticated(&self, request: RequestBuilder) -> Result<Response> {
        let replay = request.try_clone();
        // Read before the original send: a refresh that completes after this
        // point already satisfies whatever 401 the original earns.
        let observed = self.refresh_generation.load(Ordering::Acquire);

        let response = request.send().await.map_err(AuthError::from_transport)?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!("Got 401, attempting session refresh before replay");
        let Some(replay) = replay else {
            return Err(AuthError::Unauthorized);
        };

        match self.refresh_session_observed(observed).await {
            Ok(()) => {
                let response = replay.send().await.map_err(AuthError::from_transport)?;
                if response.status() == StatusCode::UNAUTHORIZED {
                    tracing::warn!("Replay still unauthorized, clearing auth state");
                    self.store.logout();
                    return Err(AuthError::Unauthorized);
                }
                Ok(response)
            }
            Err(AuthError::Unauthorized) => {
                tracing::warn!("Session refresh rejected, clearing auth state");
                self.store.logout();
                Err(AuthError::Unauthorized)
            }
            // A transient outage is not a reason to drop cached credentials;
            // the verifier reconciles once the backend is reachable again.
            Err(e) => Err(e),
        }
    }

    /// Performs `GET /wallets/list/{account_id}`.
    pub async fn list_wallets(&self, account_id: Uuid) -> Result<Vec<Wallet>> {
        let request = self
            .http
            .get(self.url(&format!("/wallets/list/{}", account_id))?);
        let response = self.send_authenticated(request).await?;
        Self::parse_json(response).await
    }

    /// Performs `GET /notifications` for one page.
    pub async fn list_notifications(
        &self,
        account_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> Result<NotificationPage> {
        let request = self.http.get(self.url("/notifications")?).query(&[
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
            ("account_id", account_id.to_string()),
        ]);
        let response = self.send_authenticated(request).await?;
        Self::parse_json(response).await
    }

    /// Performs `PUT /notifications/{id}/read`.
    pub async fn mark_notification_read(&self, notification_id: Uuid) -> Result<()> {
        let request = self
            .http
            .put(self.url(&format!("/notifications/{}/read", notification_id))?);
        let response = self.send_authenticated(request).await?;
        Self::expect_success(response)
    }

    /// Performs `PUT /notifications/read-all`.
    pub async fn mark_all_notifications_read(&self, account_id: Uuid) -> Result<()> {
        let request = self
            .http
            .put(self.url("/notifications/read-all")?)
            .query(&[("account_id", account_id.to_string())]);
        let response = self.send_authenticated(request).await?;
        Self::expect_success(response)
    }

    /// Expires the auth cookies in the jar so no later request carries them.
    fn clear_auth_cookies(&self) {
        for name in [
            ACCESS_TOKEN_COOKIE,
            REFRESH_TOKEN_COOKIE,
            TOKEN_REFRESH_TIME_COOKIE,
        ] {
            self.jar
                .add_cookie_str(&format!("{}=; Max-Age=0; Path=/", name), &self.origin);
        }
    }

    async fn parse_auth_response(response: Response) -> Result<AuthOutcome> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Unauthorized);
        }
        if !status.is_success() {
            return Err(AuthError::ServerError(status));
        }

        let set_cookies: Vec<HeaderValue> = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .cloned()
            .collect();

        let body = response.text().await.map_err(AuthError::from_transport)?;
        let payload: AuthPayload = sonic_rs::from_str(&body)
            .map_err(|e| AuthError::Internal(format!("Malformed auth response: {}", e)))?;

        Ok(AuthOutcome {
            user: payload.user,
            session: payload.session,
            set_cookies,
        })
    }

    async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::from_status(status));
        }
        let body = response.text().await.map_err(AuthError::from_transport)?;
        sonic_rs::from_str(&body)
            .map_err(|e| AuthError::Internal(format!("Malformed backend response: {}", e)))
    }

    fn expect_success(response: Response) -> Result<()> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(AuthError::from_status(status))
        }
    }
}
