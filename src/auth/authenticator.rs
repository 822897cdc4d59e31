//! Token cache implementation
//!
//! Owns the OAuth2 client-credentials exchange and the single cached
//! bearer token. Refresh is reactive: a token is exchanged only when the
//! cached one is missing, empty or past its expiry at the point of use.

use super::types::{CachedToken, Credentials};
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Default Azure AD authority
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Source of bearer tokens for the request dispatcher
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Return a token that is valid right now, exchanging a new one if needed
    async fn valid_token(&self) -> Result<String>;
}

/// Caches the bearer token obtained with the client-credentials flow
pub struct TokenCache {
    /// Credentials used for every exchange
    credentials: Credentials,
    /// Authority base URL (scheme and host)
    authority: String,
    /// Cached token, replaced on every successful exchange
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl TokenCache {
    /// Create a token cache against the default authority
    pub fn new(credentials: Credentials) -> Self {
        Self::with_client(credentials, Client::new())
    }

    /// Create a token cache with a custom HTTP client
    pub fn with_client(credentials: Credentials, http_client: Client) -> Self {
        Self {
            credentials,
            authority: DEFAULT_AUTHORITY.to_string(),
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Point the exchange at a different authority host
    #[must_use]
    pub fn with_authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = authority.into();
        self
    }

    /// Token endpoint for the configured tenant
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/token",
            self.authority.trim_end_matches('/'),
            self.credentials.tenant()
        )
    }

    /// Get a valid token, refreshing if necessary
    pub async fn get_valid_token(&self) -> Result<String> {
        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if token.is_usable() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another caller may have refreshed while we waited for the lock
        if let Some(token) = cached.as_ref() {
            if token.is_usable() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.authorize().await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Perform one client-credentials exchange. No retry.
    async fn authorize(&self) -> Result<CachedToken> {
        let url = self.token_url();
        debug!(tenant = self.credentials.tenant(), "Requesting access token");

        let response = self
            .http_client
            .post(&url)
            .form(&self.credentials.form())
            .send()
            .await
            .map_err(|e| Error::auth(format!("Token request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::auth(format!(
                "Token request failed with status {}: {body}",
                status.as_u16()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::auth(format!("Failed to read token response: {e}")))?;
        let token_response: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::auth(format!("Token response is not valid JSON: {e}")))?;

        let token = token_response.into_cached_token();
        debug!(expires_at = %token.expires_at, "Access token acquired");
        Ok(token)
    }

    /// Clear the cached token (forces an exchange on next use)
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the credentials this cache authenticates with
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
}

#[async_trait]
impl TokenProvider for TokenCache {
    async fn valid_token(&self) -> Result<String> {
        self.get_valid_token().await
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("credentials", &self.credentials)
            .field("authority", &self.authority)
            .finish_non_exhaustive()
    }
}

/// OAuth2 token response (v1 endpoint shape)
#[derive(Debug, Default, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default, deserialize_with = "unix_seconds")]
    expires_on: i64,
}

impl TokenResponse {
    fn into_cached_token(self) -> CachedToken {
        CachedToken::expires_on(self.access_token.unwrap_or_default(), self.expires_on)
    }
}

/// `expires_on` arrives as a number or a numeric string; anything else is 0
fn unix_seconds<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().unwrap_or(0),
        Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    })
}

/// Token provider that always hands out the same token
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn valid_token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}
