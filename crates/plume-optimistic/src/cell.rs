// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Synchronous optimistic state machine.
//!
//! [`OptimisticCell::begin`] applies the reconciler and issues a generation;
//! [`OptimisticCell::settle`] applies an outcome only if its generation is
//! still the newest one issued. The async [`Coordinator`](crate::Coordinator)
//! is a thin driver around this type.

use crate::confirm::ConfirmError;
use crate::reconcile::{LikeToggle, Reconciler};
use crate::state::{ActionState, Generation, PendingRequest};

/// What settling a generation did to the published state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Current generation succeeded; state replaced with the authoritative value.
    Confirmed(ActionState),
    /// Current generation failed; state restored to what it was before the trigger.
    RolledBack {
        /// State now published.
        restored: ActionState,
        /// Failure reported by the confirm port.
        error: ConfirmError,
    },
    /// Generation was superseded (or already settled); state untouched.
    Discarded {
        /// Failure of the discarded outcome, `None` if it had succeeded.
        error: Option<ConfirmError>,
    },
}

impl Settlement {
    /// Whether this settlement changed the published state's ownership
    /// (confirmed or rolled back).
    pub fn applied(&self) -> bool {
        !matches!(self, Self::Discarded { .. })
    }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    generation: Generation,
    prior: ActionState,
}

/// Owns one [`ActionState`] and the generation bookkeeping around it.
#[derive(Debug)]
pub struct OptimisticCell<R = LikeToggle> {
    state: ActionState,
    reconciler: R,
    next: Generation,
    in_flight: Option<InFlight>,
}

impl OptimisticCell<LikeToggle> {
    /// Cell for a like-style toggle starting at `initial`.
    pub fn new(initial: ActionState) -> Self {
        Self::with_reconciler(initial, LikeToggle)
    }
}

impl<R: Reconciler> OptimisticCell<R> {
    /// Cell with a custom optimistic transition.
    pub fn with_reconciler(initial: ActionState, reconciler: R) -> Self {
        Self {
            state: initial,
            reconciler,
            next: Generation::FIRST,
            in_flight: None,
        }
    }

    /// Latest published state (optimistic or confirmed).
    pub fn state(&self) -> ActionState {
        self.state
    }

    /// True while the newest generation has not settled.
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Newest generation issued, if any.
    pub fn current_generation(&self) -> Option<Generation> {
        self.in_flight.map(|f| f.generation)
    }

    /// Apply the optimistic transition and issue a new generation.
    ///
    /// Any older in-flight generation is superseded from this point on.
    pub fn begin(&mut self) -> PendingRequest {
        let prior = self.state;
        let requested = self.reconciler.compute_optimistic(&prior);
        let generation = self.next;
        self.next = generation.next();
        self.in_flight = Some(InFlight { generation, prior });
        self.state = requested;
        PendingRequest {
            generation,
            prior,
            requested,
        }
    }

    /// Apply the outcome of `generation`'s confirmation.
    ///
    /// Outcomes for anything other than the newest unsettled generation are
    /// discarded, so each generation affects the state at most once.
    pub fn settle(
        &mut self,
        generation: Generation,
        outcome: Result<ActionState, ConfirmError>,
    ) -> Settlement {
        let flight = match self.in_flight {
            Some(f) if f.generation == generation => f,
            _ => {
                return Settlement::Discarded {
                    error: outcome.err(),
                }
            }
        };
        self.in_flight = None;
        match outcome {
            Ok(confirmed) => {
                self.state = confirmed;
                Settlement::Confirmed(confirmed)
            }
            Err(error) => {
                self.state = flight.prior;
                Settlement::RolledBack {
                    restored: flight.prior,
                    error,
                }
            }
        }
    }

    /// Replace the state with a fresh snapshot (e.g. after a page refetch).
    ///
    /// Every in-flight generation becomes stale; their outcomes will be
    /// discarded.
    pub fn reset(&mut self, snapshot: ActionState) {
        self.state = snapshot;
        self.in_flight = None;
    }
}
