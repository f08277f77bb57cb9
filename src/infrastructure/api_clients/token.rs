//! OAuth2 client-credentials token management

use std::time::{Duration, Instant};

use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::classify_send_error;
use crate::application::errors::{ApiError, SupportError};
use crate::config::ApiConfig;

/// Tokens are considered expired this many seconds before their reported
/// lifetime ends, so an in-flight request never carries a token that lapses
/// mid-call.
pub const TOKEN_EXPIRY_MARGIN_SECS: u64 = 60;

/// Floor for the cached lifetime, guarding against token endpoints that
/// report very short or zero lifetimes.
const MIN_TOKEN_LIFETIME_SECS: u64 = 60;

const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

fn default_expires_in() -> u64 {
    DEFAULT_EXPIRES_IN_SECS
}

/// Grant response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Obtains and caches a single OAuth2 bearer token via the
/// client-credentials grant.
///
/// Refresh is synchronous and blocks the in-flight request. Concurrent
/// callers may race to refresh; the duplicate grant is tolerated (last write
/// wins) since refresh is idempotent.
pub struct TokenManager {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    timeout_seconds: u64,
    token: RwLock<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(config: &ApiConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("cisco-support/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http,
            token_url: config.token_url.clone(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            timeout_seconds: config.timeout_seconds,
            token: RwLock::new(None),
        }
    }

    /// Return the cached token, refreshing it first when absent or expired.
    pub async fn get_token(&self) -> Result<String, SupportError> {
        if let Some(token) = self.cached().await {
            return Ok(token);
        }
        self.refresh().await
    }

    /// Drop the cached token so the next call performs a fresh grant. Used
    /// by the 401 retry path.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    async fn cached(&self) -> Option<String> {
        let guard = self.token.read().await;
        guard
            .as_ref()
            .filter(|t| Instant::now() < t.expires_at)
            .map(|t| t.access_token.clone())
    }

    async fn refresh(&self) -> Result<String, SupportError> {
        debug!("requesting new access token");

        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| classify_send_error(e, self.timeout_seconds))?;

        if !response.status().is_success() {
            warn!(
                status = response.status().as_u16(),
                "token endpoint rejected client credentials"
            );
            return Err(SupportError::Api(ApiError::Authentication));
        }

        let grant: TokenResponse = response.json().await.map_err(SupportError::Network)?;
        let lifetime = grant
            .expires_in
            .saturating_sub(TOKEN_EXPIRY_MARGIN_SECS)
            .max(MIN_TOKEN_LIFETIME_SECS);

        let access_token = grant.access_token.clone();
        *self.token.write().await = Some(CachedToken {
            access_token: grant.access_token,
            expires_at: Instant::now() + Duration::from_secs(lifetime),
        });

        debug!(lifetime_seconds = lifetime, "access token obtained");
        Ok(access_token)
    }

    /// Rewind the cached token's expiry, for testing the refresh path.
    #[cfg(test)]
    pub(crate) async fn force_expire(&self) {
        if let Some(token) = self.token.write().await.as_mut() {
            token.expires_at = Instant::now() - Duration::from_secs(1);
        }
    }

    /// Install a token without contacting the endpoint, for testing the 401
    /// retry path.
    #[cfg(test)]
    pub(crate) async fn seed(&self, access_token: &str) {
        *self.token.write().await = Some(CachedToken {
            access_token: access_token.to_string(),
            expires_at: Instant::now() + Duration::from_secs(300),
        });
    }
}
