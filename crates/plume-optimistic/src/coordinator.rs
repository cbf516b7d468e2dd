// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Async driver around [`OptimisticCell`]: publishes state, runs the confirm
//! port on the Tokio runtime, and fans events out to observers.

use crate::cell::{OptimisticCell, Settlement};
use crate::confirm::{Confirm, ConfirmError};
use crate::observer::{CoordinatorEvent, Observer, TracingObserver};
use crate::reconcile::{LikeToggle, Reconciler};
use crate::state::{ActionState, Generation, PendingRequest};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// What subscribers see on every publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    /// Published state.
    pub state: ActionState,
    /// Whether the newest generation is still unconfirmed.
    pub pending: bool,
}

struct Shared<R> {
    cell: Mutex<OptimisticCell<R>>,
    publish: watch::Sender<Snapshot>,
    confirm: Box<dyn Confirm>,
    observers: Vec<Box<dyn Observer>>,
    label: Arc<str>,
}

impl<R: Reconciler> Shared<R> {
    fn lock(&self) -> MutexGuard<'_, OptimisticCell<R>> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Publishing happens under the cell lock so subscribers never see
    // snapshots out of order.
    fn publish(&self, cell: &OptimisticCell<R>) {
        self.publish.send_replace(Snapshot {
            state: cell.state(),
            pending: cell.is_pending(),
        });
    }

    fn emit(&self, event: &CoordinatorEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }

    fn settle(
        &self,
        generation: Generation,
        outcome: Result<ActionState, ConfirmError>,
    ) -> Settlement {
        let settlement = {
            let mut cell = self.lock();
            let settlement = cell.settle(generation, outcome);
            if settlement.applied() {
                self.publish(&cell);
            }
            settlement
        };
        self.emit(&CoordinatorEvent::Settled {
            generation,
            settlement: settlement.clone(),
        });
        settlement
    }
}

/// Optimistic coordinator for one toggle on one item.
///
/// Cloning yields another handle to the same state; each UI context should
/// build its own coordinator rather than share a global one.
pub struct Coordinator<R = LikeToggle> {
    shared: Arc<Shared<R>>,
}

impl<R> Clone for Coordinator<R> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl Coordinator<LikeToggle> {
    /// Start configuring a like-toggle coordinator seeded with `initial`.
    pub fn builder(initial: ActionState) -> CoordinatorBuilder<LikeToggle> {
        CoordinatorBuilder {
            initial,
            reconciler: LikeToggle,
            observers: Vec::new(),
            label: Arc::from("action"),
        }
    }

    /// Like-toggle coordinator with default logging.
    pub fn new(initial: ActionState, confirm: impl Confirm) -> Self {
        Self::builder(initial).build(confirm)
    }
}

impl<R: Reconciler> Coordinator<R> {
    /// Apply the optimistic update now and confirm it in the background.
    ///
    /// The optimistic state is visible through [`state`](Self::state) before
    /// this returns. Failures never surface here; they roll back (if still
    /// current) and reach observers.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn trigger(&self) -> Trigger {
        let request = {
            let mut cell = self.shared.lock();
            let request = cell.begin();
            self.shared.publish(&cell);
            request
        };
        self.shared.emit(&CoordinatorEvent::Optimistic {
            generation: request.generation,
            state: request.requested,
        });

        let span = tracing::debug_span!(
            "confirm",
            action = &*self.shared.label,
            generation = request.generation.get()
        );
        let confirming = self.shared.confirm.confirm(request);
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(
            async move {
                // separate task: a panicking confirm still settles its generation
                let outcome = match tokio::spawn(confirming).await {
                    Ok(outcome) => outcome,
                    Err(err) => Err(ConfirmError::Aborted(err.to_string())),
                };
                shared.settle(request.generation, outcome)
            }
            .instrument(span),
        );

        Trigger { request, task }
    }

    /// Latest published state, optimistic or confirmed.
    pub fn state(&self) -> ActionState {
        self.shared.lock().state()
    }

    /// True while the newest trigger has not been confirmed or rolled back.
    pub fn is_pending(&self) -> bool {
        self.shared.lock().is_pending()
    }

    /// Newest generation issued and still unsettled.
    pub fn current_generation(&self) -> Option<Generation> {
        self.shared.lock().current_generation()
    }

    /// Receiver that observes every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.publish.subscribe()
    }

    /// Wait until no trigger is pending. Returns the settled state.
    pub async fn idle(&self) -> ActionState {
        let mut rx = self.subscribe();
        // the watch guard must drop before `rx`
        let settled = rx.wait_for(|snap| !snap.pending).await.map(|snap| snap.state);
        // sender lives in `shared`, which `self` keeps alive
        settled.unwrap_or_else(|_| self.state())
    }

    /// Replace the state with a fresh snapshot; in-flight confirmations
    /// become stale.
    pub fn reset(&self, snapshot: ActionState) {
        {
            let mut cell = self.shared.lock();
            cell.reset(snapshot);
            self.shared.publish(&cell);
        }
        self.shared.emit(&CoordinatorEvent::Reset { state: snapshot });
    }
}

/// Builder for [`Coordinator`].
pub struct CoordinatorBuilder<R> {
    initial: ActionState,
    reconciler: R,
    observers: Vec<Box<dyn Observer>>,
    label: Arc<str>,
}

impl<R: Reconciler> CoordinatorBuilder<R> {
    /// Name used in log records and tracing spans (e.g. `"post-42/like"`).
    pub fn label(mut self, label: impl Into<Arc<str>>) -> Self {
        self.label = label.into();
        self
    }

    /// Replace the optimistic transition.
    pub fn reconciler<R2: Reconciler>(self, reconciler: R2) -> CoordinatorBuilder<R2> {
        CoordinatorBuilder {
            initial: self.initial,
            reconciler,
            observers: self.observers,
            label: self.label,
        }
    }

    /// Add an observer; observers run in registration order after the
    /// built-in tracing observer.
    pub fn observer(mut self, observer: impl Observer) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Finish with the confirm port.
    pub fn build(self, confirm: impl Confirm) -> Coordinator<R> {
        let mut observers: Vec<Box<dyn Observer>> =
            vec![Box::new(TracingObserver::new(Arc::clone(&self.label)))];
        observers.extend(self.observers);
        let (publish, _) = watch::channel(Snapshot {
            state: self.initial,
            pending: false,
        });
        Coordinator {
            shared: Arc::new(Shared {
                cell: Mutex::new(OptimisticCell::with_reconciler(
                    self.initial,
                    self.reconciler,
                )),
                publish,
                confirm: Box::new(confirm),
                observers,
                label: self.label,
            }),
        }
    }
}

/// Handle to one trigger. Dropping it does not cancel the confirmation.
#[derive(Debug)]
pub struct Trigger {
    request: PendingRequest,
    task: JoinHandle<Settlement>,
}

impl Trigger {
    /// Generation issued for this trigger.
    pub fn generation(&self) -> Generation {
        self.request.generation
    }

    /// The request handed to the confirm port.
    pub fn request(&self) -> PendingRequest {
        self.request
    }

    /// Wait for the confirmation and report what it did to the state.
    ///
    /// If the runtime shut down first, the outcome is reported as discarded.
    pub async fn settled(self) -> Settlement {
        self.task.await.unwrap_or_else(|err| Settlement::Discarded {
            error: Some(ConfirmError::Aborted(err.to_string())),
        })
    }
}
