//! Pagination driver
//!
//! Requests pages one at a time, extracting records and following the
//! next-page URL until the service stops returning a paging cookie. The
//! first error ends the run; records from earlier pages are not returned.

use super::types::{NextPage, PaginationState};
use crate::error::{Error, Result};
use crate::http::WebApiClient;
use futures::{Stream, TryStreamExt};
use serde::de::DeserializeOwned;
use tracing::info;
use url::Url;

/// Walks every page of a FetchXML query
#[derive(Debug)]
pub struct Paginator<'a> {
    client: &'a WebApiClient,
    next_url: Option<Url>,
    state: PaginationState,
}

impl<'a> Paginator<'a> {
    /// Start from the first page URL
    pub fn new(client: &'a WebApiClient, first_page: Url) -> Self {
        Self {
            client,
            next_url: Some(first_page),
            state: PaginationState::new(),
        }
    }

    /// Progress so far
    pub fn state(&self) -> &PaginationState {
        &self.state
    }

    /// Whether another page will be requested
    pub fn has_next(&self) -> bool {
        self.next_url.is_some()
    }

    /// Fetch the next page's records, `None` once pagination is complete
    pub async fn next_batch<T: DeserializeOwned>(&mut self) -> Result<Option<Vec<T>>> {
        let Some(url) = self.next_url.take() else {
            self.state.mark_done();
            return Ok(None);
        };

        self.state.next_page();
        let mut page = self.client.request(&url).await?;
        let records: Vec<T> = page.elements().await?;
        self.state.add_fetched(records.len() as u64);

        match page.next_page_url().await? {
            NextPage::Continue { url, .. } => self.next_url = Some(url),
            NextPage::Done => self.state.mark_done(),
        }

        info!(
            page = self.state.page,
            records = records.len(),
            total = self.state.total_fetched,
            "Fetched page"
        );
        Ok(Some(records))
    }

    /// Pages as a stream of record batches
    pub fn into_stream<T>(self) -> impl Stream<Item = Result<Vec<T>>> + 'a
    where
        T: DeserializeOwned + 'a,
    {
        futures::stream::try_unfold(self, |mut pager| async move {
            let batch = pager.next_batch::<T>().await?;
            Ok::<_, Error>(batch.map(|batch| (batch, pager)))
        })
    }

    /// All records of all pages, or the first error
    pub async fn collect_all<T>(self) -> Result<Vec<T>>
    where
        T: DeserializeOwned + 'a,
    {
        self.into_stream::<T>().try_concat().await
    }
}
