use anyhow::{Context, Result};
use reqwest::Url;
use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// The application's configuration.
///
/// All timing knobs derive from one access-token lifetime so the guard's
/// proactive-refresh threshold and the verifier's cache window cannot drift
/// apart.
#[derive(Clone, Debug)]
pub struct Config {
    /// Origin of the backend serving auth, wallet and notification APIs.
    pub backend_origin: Url,
    /// Address this service listens on.
    pub bind_addr: SocketAddr,
    /// Lifetime the backend gives an access token. Also the window during
    /// which cached auth state is trusted without a check-session call.
    pub access_token_ttl: Duration,
    /// Safety margin subtracted from the token lifetime before the guard
    /// refreshes proactively.
    pub refresh_margin: Duration,
    /// Cap on the server-side logout call so local cleanup is never blocked
    /// by an unreachable backend.
    pub logout_timeout: Duration,
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let backend_origin: Url = env::var("BACKEND_ORIGIN")
            .context("BACKEND_ORIGIN must be set (e.g. http://localhost:8080)")?
            .parse()
            .context("BACKEND_ORIGIN must be a valid URL")?;

        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .context("Invalid BIND_ADDR")?;

        let access_token_ttl = Duration::from_secs(
            env::var("ACCESS_TOKEN_TTL_SECS")
                .unwrap_or_else(|_| "900".to_string())
                .parse()
                .context("Invalid ACCESS_TOKEN_TTL_SECS")?,
        );

        let refresh_margin = Duration::from_secs(
            env::var("REFRESH_MARGIN_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("Invalid REFRESH_MARGIN_SECS")?,
        );

        let logout_timeout = Duration::from_secs(
            env::var("LOGOUT_TIMEOUT_SECS")
                .unwrap_or_else(|_| "2".to_string())
                .parse()
                .context("Invalid LOGOUT_TIMEOUT_SECS")?,
        );

        if refresh_margin >= access_token_ttl {
            anyhow::bail!("REFRESH_MARGIN_SECS must be smaller than ACCESS_TOKEN_TTL_SECS");
        }

        Ok(Self {
            backend_origin,
            bind_addr,
            access_token_ttl,
            refresh_margin,
            logout_timeout,
        })
    }

    /// Age at which the guard considers an access token close enough to
    /// expiry to refresh it (14 of 15 minutes with the defaults).
    pub fn refresh_threshold(&self) -> Duration {
        self.access_token_ttl - self.refresh_margin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_threshold_keeps_the_margin() {
        let config = Config {
            backend_origin: "http://localhost:8080".parse().unwrap(),
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            access_token_ttl: Duration::from_secs(900),
            refresh_margin: Duration::from_secs(60),
            logout_timeout: Duration::from_secs(2),
        };
        assert_eq!(config.refresh_threshold(), Duration::from_secs(840));
    }
}
