//! Authentication module
//!
//! OAuth2 client-credentials flow against the Azure AD v1 token endpoint.
//!
//! The `TokenCache` owns the single cached bearer token and exchanges a new
//! one whenever the cached token is missing or expired.

mod authenticator;
mod types;

pub use authenticator::{StaticToken, TokenCache, TokenProvider, DEFAULT_AUTHORITY};
pub use types::{CachedToken, Credentials, DEFAULT_SCOPE};
