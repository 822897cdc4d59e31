//! Pagination module
//!
//! Implements the FetchXML paging-cookie protocol.
//!
//! # Overview
//!
//! Each [`PageResponse`] derives the URL of the following page from its own
//! request URL and the paging cookie in its body. The [`Paginator`] drives
//! the loop: request, extract records, follow the next URL, stop at
//! [`NextPage::Done`].

mod driver;
mod page;
mod types;

pub use driver::Paginator;
pub use page::{PageResponse, VALUE_FIELD};
pub use types::{NextPage, PaginationState};
