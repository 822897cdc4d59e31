//! FetchXML query document
//!
//! A parsed query whose root element carries the `page` number and, from
//! the second page on, the `paging-cookie` cursor.

use super::element::RootElement;
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Root attribute holding the 1-based page number
pub const PAGE_ATTRIBUTE: &str = "page";

/// Root attribute holding the cursor sent back to the service
pub const PAGING_COOKIE_ATTRIBUTE: &str = "paging-cookie";

/// Parsed FetchXML query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDocument {
    root: RootElement,
}

impl QueryDocument {
    /// Parse a query document
    pub fn parse(xml: &str) -> Result<Self> {
        let root = RootElement::parse(xml)
            .map_err(|e| Error::protocol(format!("invalid query document: {e}")))?;
        Ok(Self { root })
    }

    /// Current page number. Missing or non-numeric values read as 0.
    pub fn page(&self) -> u32 {
        self.root
            .attribute(PAGE_ATTRIBUTE)
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Overwrite the page number
    pub fn set_page(&mut self, page: u32) {
        self.root.set_attribute(PAGE_ATTRIBUTE, &page.to_string());
    }

    /// Cursor from a previous page, if any. Absent means first page.
    pub fn paging_cookie(&self) -> Option<String> {
        self.root.attribute(PAGING_COOKIE_ATTRIBUTE)
    }

    /// Store the cursor returned by the service
    pub fn set_paging_cookie(&mut self, cookie: &str) {
        self.root.set_attribute(PAGING_COOKIE_ATTRIBUTE, cookie);
    }

    /// Move the query to the page after the one `cookie` was issued for.
    ///
    /// Returns the new page number.
    pub fn advance(&mut self, cookie: &str) -> u32 {
        self.set_paging_cookie(cookie);
        let next = self.page().saturating_add(1);
        self.set_page(next);
        next
    }

    /// Value of any root attribute
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.root.attribute(name)
    }
}

impl FromStr for QueryDocument {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for QueryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.root, f)
    }
}
