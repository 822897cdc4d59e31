//! HTTP client module
//!
//! Provides the authenticated request dispatcher for the Web API.
//!
//! # Features
//!
//! - **Authentication**: Bearer token from the auth module on every request
//! - **Error Classification**: Structured 400 envelopes vs. transport errors
//! - **Cancellation**: Every await races the client's cancellation token

mod client;
mod error_body;

pub use client::{HttpClientConfig, HttpClientConfigBuilder, WebApiClient};
pub use error_body::{ApiErrorBody, ApiErrorEnvelope, DEFAULT_ERROR_CODE};

#[cfg(test)]
mod tests;
