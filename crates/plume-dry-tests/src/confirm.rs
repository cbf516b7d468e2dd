// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Confirm port fake whose calls are answered by the test.

use plume_optimistic::{
    ActionState, Confirm, ConfirmError, ConfirmFuture, Generation, PendingRequest,
};
use std::collections::HashMap;
use std::future::ready;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::oneshot;

/// How a [`ScriptedConfirm`] answers new calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmMode {
    /// Park the call until the test resolves its generation.
    Manual,
    /// Answer immediately with the requested state.
    Accept,
    /// Answer immediately with this error.
    Reject(ConfirmError),
}

/// Scriptable [`Confirm`] implementation.
///
/// In [`ConfirmMode::Manual`] every call parks on a oneshot keyed by its
/// generation, so a test can resolve overlapping calls in any order.
/// Clones share the script.
#[derive(Clone)]
pub struct ScriptedConfirm {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    mode: ConfirmMode,
    parked: HashMap<Generation, oneshot::Sender<Result<ActionState, ConfirmError>>>,
    requests: Vec<PendingRequest>,
}

impl ScriptedConfirm {
    /// Fake answering according to `mode`.
    pub fn new(mode: ConfirmMode) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                mode,
                parked: HashMap::new(),
                requests: Vec::new(),
            })),
        }
    }

    /// Fake that parks every call.
    pub fn manual() -> Self {
        Self::new(ConfirmMode::Manual)
    }

    /// Fake that confirms every request as asked.
    pub fn accepting() -> Self {
        Self::new(ConfirmMode::Accept)
    }

    /// Fake that fails every request with `error`.
    pub fn rejecting(error: ConfirmError) -> Self {
        Self::new(ConfirmMode::Reject(error))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Change how later calls are answered; parked calls stay parked.
    pub fn set_mode(&self, mode: ConfirmMode) {
        self.lock().mode = mode;
    }

    /// Every request received so far, in call order.
    pub fn requests(&self) -> Vec<PendingRequest> {
        self.lock().requests.clone()
    }

    /// Generations currently parked, oldest first.
    pub fn parked(&self) -> Vec<Generation> {
        let mut gens: Vec<_> = self.lock().parked.keys().copied().collect();
        gens.sort();
        gens
    }

    /// Answer the parked call for `generation`. Returns false if no such
    /// call is parked.
    pub fn resolve(
        &self,
        generation: Generation,
        outcome: Result<ActionState, ConfirmError>,
    ) -> bool {
        let Some(tx) = self.lock().parked.remove(&generation) else {
            return false;
        };
        tx.send(outcome).is_ok()
    }

    /// Answer the parked call for `generation` with `state`.
    pub fn succeed(&self, generation: Generation, state: ActionState) -> bool {
        self.resolve(generation, Ok(state))
    }

    /// Fail the parked call for `generation`.
    pub fn fail(&self, generation: Generation, error: ConfirmError) -> bool {
        self.resolve(generation, Err(error))
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&self, request: PendingRequest) -> ConfirmFuture {
        let mut inner = self.lock();
        inner.requests.push(request);
        match inner.mode.clone() {
            ConfirmMode::Accept => Box::pin(ready(Ok::<_, ConfirmError>(request.requested))),
            ConfirmMode::Reject(error) => Box::pin(ready(Err::<ActionState, _>(error))),
            ConfirmMode::Manual => {
                let (tx, rx) = oneshot::channel();
                inner.parked.insert(request.generation, tx);
                Box::pin(async move {
                    rx.await.unwrap_or_else(|_| {
                        Err(ConfirmError::Unavailable("scripted call dropped".into()))
                    })
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plume_optimistic::OptimisticCell;

    fn request() -> PendingRequest {
        OptimisticCell::new(ActionState::new(false, 1)).begin()
    }

    #[tokio::test]
    async fn accepting_echoes_requested_state() {
        let fake = ScriptedConfirm::accepting();
        let out = fake.confirm(request()).await;
        assert_eq!(out, Ok(ActionState::new(true, 2)));
        assert_eq!(fake.requests().len(), 1);
    }

    #[tokio::test]
    async fn manual_calls_wait_for_resolution() {
        let fake = ScriptedConfirm::manual();
        let req = request();
        let fut = fake.confirm(req);
        assert_eq!(fake.parked(), vec![req.generation]);
        assert!(fake.fail(req.generation, ConfirmError::Rejected("nope".into())));
        assert_eq!(fut.await, Err(ConfirmError::Rejected("nope".into())));
        assert!(!fake.succeed(req.generation, ActionState::default()));
    }

    #[tokio::test]
    async fn switching_mode_leaves_parked_calls_parked() {
        let fake = ScriptedConfirm::manual();
        let first = request();
        let parked = fake.confirm(first);
        fake.set_mode(ConfirmMode::Reject(ConfirmError::Unavailable("offline".into())));

        let mut cell = OptimisticCell::new(ActionState::new(false, 1));
        cell.begin();
        let second = cell.begin();
        assert_eq!(fake.confirm(second).await, Err(ConfirmError::Unavailable("offline".into())));
        assert_eq!(fake.parked(), vec![first.generation]);

        assert!(fake.succeed(first.generation, ActionState::new(true, 2)));
        assert_eq!(parked.await, Ok(ActionState::new(true, 2)));
    }
}
