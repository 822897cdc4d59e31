//! Auth configuration types
//!
//! Client credentials supplied at startup and the bearer token cached
//! between requests.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Scope requested when none is configured
pub const DEFAULT_SCOPE: &str = "https://graph.microsoft.com/.default";

/// Parameters for the OAuth2 client-credentials exchange.
///
/// Immutable once built; the secret never shows up in `Debug` output.
#[derive(Clone)]
pub struct Credentials {
    tenant: String,
    client_id: Uuid,
    client_secret: String,
    resource: String,
    scope: String,
}

impl Credentials {
    /// Create credentials with the default scope and no resource
    pub fn new(tenant: impl Into<String>, client_id: Uuid, client_secret: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            client_id,
            client_secret: client_secret.into(),
            resource: String::new(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Set the target resource URI (the CRM instance URL)
    #[must_use]
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }

    /// Override the requested scope. An empty scope is omitted from the exchange.
    #[must_use]
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    /// Tenant id or name
    pub fn tenant(&self) -> &str {
        &self.tenant
    }

    /// Application (client) id
    pub fn client_id(&self) -> Uuid {
        self.client_id
    }

    /// Client secret
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Target resource URI
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Requested scope
    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Form fields for the token request, skipping empty optional values
    pub fn form(&self) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("tenant", self.tenant.clone()),
            ("client_id", self.client_id.hyphenated().to_string()),
            ("grant_type", "client_credentials".to_string()),
        ];

        for (key, value) in [
            ("resource", &self.resource),
            ("scope", &self.scope),
            ("client_secret", &self.client_secret),
        ] {
            if !value.is_empty() {
                form.push((key, value.clone()));
            }
        }

        form
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant", &self.tenant)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("resource", &self.resource)
            .field("scope", &self.scope)
            .finish()
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token (empty when the service returned none)
    pub token: String,
    /// When the token expires
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: DateTime<Utc>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token expiring at the given Unix timestamp (seconds)
    pub fn expires_on(token: String, unix_seconds: i64) -> Self {
        let expires_at = DateTime::from_timestamp(unix_seconds, 0).unwrap_or_default();
        Self { token, expires_at }
    }

    /// Check if the token can be sent right now
    pub fn is_usable(&self) -> bool {
        self.is_usable_at(Utc::now())
    }

    /// Non-empty and strictly before expiry. No early-refresh margin.
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        !self.token.is_empty() && now < self.expires_at
    }
}
