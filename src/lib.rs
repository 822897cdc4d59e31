// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Dynamics Audit
//!
//! Export client for the audit log of a Dynamics CRM instance, paging
//! through a FetchXML query over the Web API.
//!
//! ## Features
//!
//! - **Client-credentials OAuth2**: Cached bearer token, refreshed on expiry
//! - **Typed pages**: Body parsed once, records deserialized on demand
//! - **Paging cookies**: Next-page URL derived from the service's cookie
//! - **Service errors**: 400 envelopes surfaced as structured errors
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use dynamics_audit::auth::{Credentials, TokenCache};
//! use dynamics_audit::http::{HttpClientConfig, WebApiClient};
//! use dynamics_audit::models::AuditLog;
//! use dynamics_audit::pagination::Paginator;
//! use dynamics_audit::query::{query_url, FetchXmlBuilder};
//!
//! #[tokio::main]
//! async fn main() -> dynamics_audit::Result<()> {
//!     let creds = Credentials::new("contoso.onmicrosoft.com", client_id, secret)
//!         .with_resource("https://contoso.crm4.dynamics.com");
//!     let client = WebApiClient::with_token_cache(HttpClientConfig::default(), |http| {
//!         TokenCache::with_client(creds, http)
//!     })?;
//!
//!     let fetch = FetchXmlBuilder::audit_logs(30, 200)?;
//!     let url = query_url("https://contoso.crm4.dynamics.com", "v9.1", "audits", &fetch)?;
//!     let logs: Vec<AuditLog> = Paginator::new(&client, url).collect_all().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     Paginator (driver)                       │
//! │  request(url) → PageResponse → elements() / next_page_url()  │
//! └──────────────────────────────────────────────────────────────┘
//!                               │
//! ┌──────────────┬──────────────┴───────┬────────────────────────┐
//! │    Auth      │       HTTP           │        Query           │
//! ├──────────────┼──────────────────────┼────────────────────────┤
//! │ TokenCache   │ WebApiClient         │ FetchXmlBuilder        │
//! │ Credentials  │ ApiErrorEnvelope     │ PagingCookie           │
//! │ StaticToken  │ Cancellation         │ QueryDocument / Params │
//! └──────────────┴──────────────────────┴────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// OAuth2 client-credentials token cache
pub mod auth;

/// Web API request dispatcher
pub mod http;

/// FetchXML documents, paging cookies and query strings
pub mod query;

/// Page responses and the pagination driver
pub mod pagination;

/// Record types
pub mod models;

/// Exporter configuration
pub mod config;

/// Command-line interface
pub mod cli;

mod cancel;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
