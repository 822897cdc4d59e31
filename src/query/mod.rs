//! FetchXML query module
//!
//! Parsing and rewriting of the query document embedded in request URLs,
//! decoding of the paging cookie returned by the service, and construction
//! of the initial audit-log query.
//!
//! # Overview
//!
//! Only the root element of a query is interpreted: its `page` attribute and
//! its optional `paging-cookie` attribute. All nested structure is carried
//! through untouched.

mod builder;
mod cookie;
mod document;
mod element;
mod params;

pub use builder::{query_url, FetchXmlBuilder};
pub use cookie::{html_decode, url_decode, PagingCookie, PAGING_COOKIE_FIELD, PAGING_COOKIE_VALUE_ATTRIBUTE};
pub use document::{QueryDocument, PAGE_ATTRIBUTE, PAGING_COOKIE_ATTRIBUTE};
pub use params::{QueryParams, FETCH_XML_PARAM};
