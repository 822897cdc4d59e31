//! Cancellation guard for blocking steps
//!
//! Every network call and body read races against an optional external
//! `CancellationToken` so a pagination run can be stopped between pages
//! or in the middle of a fetch.

use crate::error::{Error, Result};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Fail fast if the token has already fired
pub(crate) fn ensure_active(token: &CancellationToken) -> Result<()> {
    if token.is_cancelled() {
        Err(Error::Cancelled)
    } else {
        Ok(())
    }
}

/// Run `fut` unless the token fires first
pub(crate) async fn guard<F, T>(token: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    ensure_active(token)?;
    tokio::select! {
        biased;
        () = token.cancelled() => Err(Error::Cancelled),
        res = fut => res,
    }
}
