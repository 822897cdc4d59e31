//! API error envelope
//!
//! Sample body: `{"error":{"code":"0x0","message":"Invalid object provided in the request."}}`

use crate::error::Error;
use serde::Deserialize;

/// Vendor code used when the envelope omits one
pub const DEFAULT_ERROR_CODE: &str = "0x0";

/// `{"error": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

/// Inner error object; both fields are optional on the wire
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorEnvelope {
    /// Parse a response body, `None` if it is not an error envelope
    pub fn parse(body: &[u8]) -> Option<Self> {
        serde_json::from_slice(body).ok()
    }

    /// Convert to the crate error for the given status
    pub fn into_error(self, status: u16) -> Error {
        Error::api(
            status,
            self.error
                .code
                .unwrap_or_else(|| DEFAULT_ERROR_CODE.to_string()),
            self.error.message,
        )
    }
}
