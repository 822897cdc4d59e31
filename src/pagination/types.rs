//! Pagination types
//!
//! Defines the next-page result and the running state of a pagination run.

use url::Url;

/// Result of the next page computation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextPage {
    /// Another page exists at this URL
    Continue {
        /// Request URL for the next page
        url: Url,
        /// Page number written into the query
        page: u32,
    },
    /// No more pages
    Done,
}

impl NextPage {
    /// Check if this is a done result
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Check if this is a continue result
    pub fn is_continue(&self) -> bool {
        matches!(self, Self::Continue { .. })
    }

    /// URL of the next page, if any
    pub fn url(&self) -> Option<&Url> {
        match self {
            Self::Continue { url, .. } => Some(url),
            Self::Done => None,
        }
    }

    /// Consume into the next URL, if any
    pub fn into_url(self) -> Option<Url> {
        match self {
            Self::Continue { url, .. } => Some(url),
            Self::Done => None,
        }
    }
}

/// Tracks pagination state during iteration
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched so far (the one in flight included)
    pub page: u32,
    /// Total records fetched so far
    pub total_fetched: u64,
    /// Is pagination complete?
    pub done: bool,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.done = true;
    }

    /// Increment page number
    pub fn next_page(&mut self) {
        self.page += 1;
    }

    /// Add to total fetched
    pub fn add_fetched(&mut self, count: u64) {
        self.total_fetched += count;
    }
}
