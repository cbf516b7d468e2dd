// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! In-process stand-in for the blog's like endpoint.
//!
//! The store applies a request as soon as it arrives and then delays the
//! response. Latency cycles through 2x, 3x, 1x the base value per request,
//! so a burst of clicks gets its responses back out of order.

use plume_optimistic::{ActionState, Confirm, ConfirmError, PendingRequest};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

#[derive(Default)]
struct Inner {
    posts: HashMap<String, ActionState>,
    served: u64,
}

/// Authoritative like state per post, with simulated latency and failures.
#[derive(Clone)]
pub struct MockLikeStore {
    inner: Arc<Mutex<Inner>>,
    latency: Duration,
    fail_every: Option<u64>,
}

impl MockLikeStore {
    /// Empty store answering after multiples of `latency`.
    pub fn new(latency: Duration) -> Self {
        Self {
            inner: Arc::default(),
            latency,
            fail_every: None,
        }
    }

    /// Seed a post's server-side state.
    pub fn with_post(self, id: &str, state: ActionState) -> Self {
        self.lock().posts.insert(id.to_string(), state);
        self
    }

    /// Fail every `n`th request (1-based); `0` disables failures.
    pub fn fail_every(mut self, n: u64) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current server-side state of `id`.
    pub fn get(&self, id: &str) -> Option<ActionState> {
        self.lock().posts.get(id).copied()
    }

    /// Set whether the current user likes `id`. The request is applied right
    /// away; returns the post's new authoritative state together with the
    /// simulated response delay.
    fn serve(&self, id: &str, active: bool) -> (Result<ActionState, ConfirmError>, Duration) {
        let mut inner = self.lock();
        inner.served += 1;
        let seq = inner.served;
        let outcome = if self.fail_every.is_some_and(|n| seq % n == 0) {
            Err(ConfirmError::Unavailable("simulated network failure".into()))
        } else {
            match inner.posts.get_mut(id) {
                Some(post) => {
                    if post.active != active {
                        post.active = active;
                        post.count = if active {
                            post.count.saturating_add(1)
                        } else {
                            post.count.saturating_sub(1)
                        };
                    }
                    Ok(*post)
                }
                None => Err(ConfirmError::Rejected(format!("unknown post {id}"))),
            }
        };
        let delay = self.latency * (1 + u32::try_from(seq % 3).unwrap_or(0));
        debug!(post = id, seq, ?delay, ok = outcome.is_ok(), "like request served");
        (outcome, delay)
    }

    /// Confirm port bound to one post. Requests reach the store in trigger
    /// order; only the responses are delayed.
    pub fn confirm_for(&self, id: &str) -> impl Confirm {
        let store = self.clone();
        let id: Arc<str> = Arc::from(id);
        move |req: PendingRequest| {
            let (outcome, delay) = store.serve(&id, req.requested.active);
            async move {
                tokio::time::sleep(delay).await;
                outcome
            }
        }
    }
}
