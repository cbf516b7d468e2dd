// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The confirmation port: whatever actually writes the toggle (HTTP, local
//! store, mock) plugs in here.

use crate::state::{ActionState, PendingRequest};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Why a confirmation did not produce an authoritative state.
///
/// Every variant is handled the same way by the coordinator (rollback if
/// current, discard if stale); the distinction exists for observers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfirmError {
    /// The backend answered and refused the change.
    #[error("rejected: {0}")]
    Rejected(String),
    /// The backend could not be reached.
    #[error("unavailable: {0}")]
    Unavailable(String),
    /// No answer within the allotted time.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    /// The confirmation task panicked or was cancelled before answering.
    #[error("aborted: {0}")]
    Aborted(String),
}

/// Boxed future returned by [`Confirm::confirm`].
pub type ConfirmFuture = Pin<Box<dyn Future<Output = Result<ActionState, ConfirmError>> + Send>>;

/// Port for the operation that makes a toggle durable.
///
/// Must resolve exactly once per call with either the authoritative state or
/// an error, and must not panic synchronously.
pub trait Confirm: Send + Sync + 'static {
    /// Start confirming `request`. The returned future is polled on the
    /// coordinator's runtime.
    ///
    /// Called synchronously from [`Coordinator::trigger`](crate::Coordinator::trigger),
    /// so work done before returning happens in trigger order. Polling order
    /// of the returned futures is not guaranteed.
    fn confirm(&self, request: PendingRequest) -> ConfirmFuture;
}

impl<F, Fut> Confirm for F
where
    F: Fn(PendingRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<ActionState, ConfirmError>> + Send + 'static,
{
    fn confirm(&self, request: PendingRequest) -> ConfirmFuture {
        Box::pin(self(request))
    }
}

/// Fails any confirmation of `inner` that takes longer than `limit`.
#[derive(Debug, Clone)]
pub struct WithTimeout<C> {
    inner: C,
    limit: Duration,
}

impl<C> WithTimeout<C> {
    /// Wrap `inner` with a per-call deadline.
    pub fn new(inner: C, limit: Duration) -> Self {
        Self { inner, limit }
    }

    /// Configured deadline.
    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl<C> Confirm for WithTimeout<C>
where
    C: Confirm,
{
    fn confirm(&self, request: PendingRequest) -> ConfirmFuture {
        let fut = self.inner.confirm(request);
        let limit = self.limit;
        Box::pin(async move {
            tokio::time::timeout(limit, fut)
                .await
                .unwrap_or(Err(ConfirmError::TimedOut(limit)))
        })
    }
}
