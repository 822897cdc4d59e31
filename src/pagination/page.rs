//! One page of Web API results
//!
//! The response body is a one-shot stream. It is read and parsed on first
//! access, then every accessor works from the parsed value:
//!
//! ```text
//! Unread(Response) ──read ok──▶ Parsed(Value)
//!        │
//!        └──read/parse error──▶ Failed(message)
//! ```
//!
//! The transport response is consumed (and so released) by the first read,
//! whatever its outcome, or dropped with the page if never read.

use super::types::NextPage;
use crate::cancel;
use crate::error::{Error, Result};
use crate::query::{PagingCookie, QueryDocument, QueryParams, FETCH_XML_PARAM, PAGING_COOKIE_FIELD};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Field holding the result records
pub const VALUE_FIELD: &str = "value";

enum BodyState {
    Unread(Response),
    Parsed(Value),
    Failed(ReadFailure),
}

/// Why the first read of the body failed
enum ReadFailure {
    Cancelled,
    Transport(String),
    Malformed(String),
}

impl ReadFailure {
    fn from_error(err: &Error) -> Self {
        match err {
            Error::Cancelled => Self::Cancelled,
            Error::Http(e) => Self::Transport(e.to_string()),
            Error::Decode { message } => Self::Malformed(message.clone()),
            other => Self::Malformed(other.to_string()),
        }
    }

    /// `reqwest` errors cannot be cloned, so a transport failure is only
    /// returned as [`Error::Http`] once; repeats surface as a decode error
    /// carrying its message.
    fn to_error(&self) -> Error {
        match self {
            Self::Cancelled => Error::Cancelled,
            Self::Transport(message) => {
                Error::decode(format!("response body could not be read: {message}"))
            }
            Self::Malformed(message) => Error::decode(message.clone()),
        }
    }
}

/// A successful response, owning its body
pub struct PageResponse {
    request_url: Url,
    status: StatusCode,
    state: BodyState,
    cancel: CancellationToken,
}

impl PageResponse {
    pub(crate) fn new(request_url: Url, response: Response, cancel: CancellationToken) -> Self {
        Self {
            request_url,
            status: response.status(),
            state: BodyState::Unread(response),
            cancel,
        }
    }

    /// Build a page from an already-parsed body
    pub fn from_json(request_url: Url, body: Value) -> Self {
        Self {
            request_url,
            status: StatusCode::OK,
            state: BodyState::Parsed(body),
            cancel: CancellationToken::new(),
        }
    }

    /// URL this page was requested with
    pub fn request_url(&self) -> &Url {
        &self.request_url
    }

    /// HTTP status of the response
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Whether the body has been read and parsed
    pub fn is_parsed(&self) -> bool {
        matches!(self.state, BodyState::Parsed(_))
    }

    /// Parsed body, reading the stream on first call.
    ///
    /// A failed first read is remembered: cancellation and malformed bodies
    /// fail the same way on every later call.
    pub async fn body(&mut self) -> Result<&Value> {
        if matches!(self.state, BodyState::Unread(_)) {
            let previous = std::mem::replace(
                &mut self.state,
                BodyState::Failed(ReadFailure::Malformed(
                    "response body read was interrupted".to_string(),
                )),
            );
            if let BodyState::Unread(response) = previous {
                match read_json(response, &self.cancel).await {
                    Ok(value) => self.state = BodyState::Parsed(value),
                    Err(e) => {
                        self.state = BodyState::Failed(ReadFailure::from_error(&e));
                        return Err(e);
                    }
                }
            }
        }

        match &self.state {
            BodyState::Parsed(value) => Ok(value),
            BodyState::Failed(failure) => Err(failure.to_error()),
            BodyState::Unread(_) => Err(Error::decode("response body was not read")),
        }
    }

    /// Records in the `value` array, deserialized into `T`.
    ///
    /// Missing, null or empty `value` yields an empty list.
    pub async fn elements<T: DeserializeOwned>(&mut self) -> Result<Vec<T>> {
        let body = self.body().await?;

        match body.get(VALUE_FIELD) {
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    T::deserialize(item)
                        .map_err(|e| Error::decode(format!("record {i} has an unexpected shape: {e}")))
                })
                .collect(),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(_) => Err(Error::decode(format!("'{VALUE_FIELD}' is not an array"))),
        }
    }

    /// URL of the following page, derived from the paging cookie.
    ///
    /// Returns [`NextPage::Done`] when the response carries no cookie. A
    /// cookie that cannot be decoded, or a request URL without `fetchXml`,
    /// is an error rather than the end of pagination. Calling this twice
    /// yields the same URL.
    pub async fn next_page_url(&mut self) -> Result<NextPage> {
        let field = match self.body().await?.get(PAGING_COOKIE_FIELD) {
            None | Some(Value::Null) => return Ok(NextPage::Done),
            Some(Value::String(s)) if s.is_empty() => return Ok(NextPage::Done),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                return Err(Error::protocol(format!(
                    "'{PAGING_COOKIE_FIELD}' is not a string"
                )))
            }
        };

        cancel::ensure_active(&self.cancel)?;
        let cookie = PagingCookie::decode(&field)?;

        let mut params = QueryParams::from_url(&self.request_url);
        let mut query = QueryDocument::parse(params.fetch_xml()?)?;

        cancel::ensure_active(&self.cancel)?;
        let page = query.advance(&cookie.value);
        params.set(FETCH_XML_PARAM, query.to_string());

        cancel::ensure_active(&self.cancel)?;
        let url = params.apply_to(&self.request_url);
        debug!(page, "Built next page URL");

        Ok(NextPage::Continue { url, page })
    }
}

impl std::fmt::Debug for PageResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            BodyState::Unread(_) => "unread",
            BodyState::Parsed(_) => "parsed",
            BodyState::Failed(_) => "failed",
        };
        f.debug_struct("PageResponse")
            .field("request_url", &self.request_url.as_str())
            .field("status", &self.status)
            .field("body", &state)
            .finish()
    }
}

async fn read_json(response: Response, token: &CancellationToken) -> Result<Value> {
    let bytes = cancel::guard(token, async move { response.bytes().await.map_err(Error::Http) }).await?;

    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| Error::decode(format!("response body is not JSON: {e}")))?;
    if !value.is_object() {
        return Err(Error::decode("response body is not a JSON object"));
    }
    Ok(value)
}
