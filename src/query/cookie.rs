//! Paging cookie decoding
//!
//! The service returns the cursor as an HTML-encoded `<cookie .../>` tag in
//! the `@Microsoft.Dynamics.CRM.fetchxmlpagingcookie` field. The tag's
//! `pagingcookie` attribute is URL-encoded twice by the service, so it is
//! decoded exactly twice here.

use super::element::RootElement;
use crate::error::{Error, Result};
use quick_xml::escape::{resolve_html5_entity, unescape_with};

/// Response body field carrying the paging cookie
pub const PAGING_COOKIE_FIELD: &str = "@Microsoft.Dynamics.CRM.fetchxmlpagingcookie";

/// Attribute of the cookie tag carrying the cursor
pub const PAGING_COOKIE_VALUE_ATTRIBUTE: &str = "pagingcookie";

/// Decoded paging cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagingCookie {
    /// Literal cursor to splice into the next query
    pub value: String,
    /// Page number the service reported, if it sent one
    pub page_number: Option<u32>,
}

impl PagingCookie {
    /// Decode the raw response field value
    pub fn decode(field: &str) -> Result<Self> {
        let html = html_decode(field);
        let tag = RootElement::parse(&html)
            .map_err(|e| Error::protocol(format!("paging cookie is not a well-formed tag: {e}")))?;

        let encoded = tag.attribute(PAGING_COOKIE_VALUE_ATTRIBUTE).ok_or_else(|| {
            Error::protocol(format!(
                "paging cookie has no '{PAGING_COOKIE_VALUE_ATTRIBUTE}' attribute"
            ))
        })?;

        let value = url_decode(&url_decode(&encoded)?)?;
        let page_number = tag
            .attribute("pagenumber")
            .and_then(|p| p.trim().parse().ok());

        Ok(Self { value, page_number })
    }
}

/// HTML entity decoding; anything that is not a known entity stays as is
pub fn html_decode(input: &str) -> String {
    const MAX_ENTITY_LEN: usize = 32;

    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let entity = tail[1..]
            .find(';')
            .filter(|&len| len > 0 && len <= MAX_ENTITY_LEN)
            .map(|len| &tail[..len + 2]);

        match entity.and_then(|e| unescape_with(e, resolve_html5_entity).ok().map(|d| (e, d))) {
            Some((entity, decoded)) => {
                out.push_str(&decoded);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// One round of form-style URL decoding (`+` is a space)
pub fn url_decode(input: &str) -> Result<String> {
    urlencoding::decode(&input.replace('+', " "))
        .map(|decoded| decoded.into_owned())
        .map_err(|e| Error::protocol(format!("paging cookie is not valid UTF-8 after decoding: {e}")))
}
