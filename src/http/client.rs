//! Web API request dispatcher
//!
//! Sends authenticated GET requests and classifies the outcome:
//! - 2xx: the live response is handed to a [`PageResponse`]
//! - 400 with a JSON error envelope: [`Error::Api`]
//! - anything else: the transport error, unchanged
//!
//! One attempt per call. No retries, no backoff.

use super::error_body::ApiErrorEnvelope;
use crate::auth::{TokenCache, TokenProvider};
use crate::cancel;
use crate::error::{Error, Result};
use crate::pagination::PageResponse;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout (transport default when unset)
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            user_agent: format!("dynamics-audit/{}", crate::VERSION),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = Some(timeout);
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Authenticated client for the CRM Web API
pub struct WebApiClient {
    client: Client,
    tokens: Arc<dyn TokenProvider>,
    cancel: CancellationToken,
}

impl WebApiClient {
    /// Create a client that authenticates through `tokens`
    pub fn new(tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        Self::with_config(HttpClientConfig::default(), tokens)
    }

    /// Create a client with custom configuration
    pub fn with_config(config: HttpClientConfig, tokens: Arc<dyn TokenProvider>) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self {
            client,
            tokens,
            cancel: CancellationToken::new(),
        })
    }

    /// Create a client and a token cache sharing one connection pool
    pub fn with_token_cache(
        config: HttpClientConfig,
        cache: impl FnOnce(Client) -> TokenCache,
    ) -> Result<Self> {
        let client = build_client(&config)?;
        let tokens: Arc<dyn TokenProvider> = Arc::new(cache(client.clone()));
        Ok(Self {
            client,
            tokens,
            cancel: CancellationToken::new(),
        })
    }

    /// Stop all further work once `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Cancellation token observed by this client and its pages
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    /// GET `url` with a valid bearer token.
    ///
    /// The returned page owns the response body; dropping it releases the
    /// connection.
    pub async fn request(&self, url: &Url) -> Result<PageResponse> {
        let token = cancel::guard(&self.cancel, self.tokens.valid_token()).await?;

        let send = async {
            self.client
                .get(url.clone())
                .bearer_auth(&token)
                .header(ACCEPT, "application/json")
                .send()
                .await
                .map_err(Error::Http)
        };
        let response = cancel::guard(&self.cancel, send).await?;

        let status = response.status();
        if status.is_success() {
            debug!("Request succeeded: GET {}", url.path());
            return Ok(PageResponse::new(url.clone(), response, self.cancel.clone()));
        }

        let transport_error = match response.error_for_status_ref() {
            Err(e) => e,
            // 1xx/3xx that reqwest did not resolve
            Ok(_) => {
                return Err(Error::Other(format!(
                    "Unexpected HTTP status {} for GET {}",
                    status.as_u16(),
                    url.path()
                )))
            }
        };

        if status != StatusCode::BAD_REQUEST {
            return Err(Error::Http(transport_error));
        }

        let body = match cancel::guard(&self.cancel, async {
            response.bytes().await.map_err(Error::Http)
        })
        .await
        {
            Ok(body) => body,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(_) => return Err(Error::Http(transport_error)),
        };

        match ApiErrorEnvelope::parse(&body) {
            Some(envelope) => Err(envelope.into_error(status.as_u16())),
            None => {
                warn!(
                    "HTTP 400 body is not an API error envelope ({} bytes)",
                    body.len()
                );
                Err(Error::Http(transport_error))
            }
        }
    }
}

impl std::fmt::Debug for WebApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebApiClient")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

fn build_client(config: &HttpClientConfig) -> Result<Client> {
    let mut builder = Client::builder().user_agent(&config.user_agent);
    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(Error::Http)
}
