// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Observer fake that records coordinator events.

use plume_optimistic::{CoordinatorEvent, Generation, Observer, Settlement};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Records every [`CoordinatorEvent`]; clones share the log.
#[derive(Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<CoordinatorEvent>>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CoordinatorEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// All events so far, in delivery order.
    pub fn events(&self) -> Vec<CoordinatorEvent> {
        self.lock().clone()
    }

    /// Settlements so far, in delivery order.
    pub fn settlements(&self) -> Vec<(Generation, Settlement)> {
        self.lock()
            .iter()
            .filter_map(|e| match e {
                CoordinatorEvent::Settled {
                    generation,
                    settlement,
                } => Some((*generation, settlement.clone())),
                _ => None,
            })
            .collect()
    }

    /// Number of rollbacks observed.
    pub fn rollbacks(&self) -> usize {
        self.settlements()
            .iter()
            .filter(|(_, s)| matches!(s, Settlement::RolledBack { .. }))
            .count()
    }
}

impl Observer for RecordingObserver {
    fn on_event(&self, event: &CoordinatorEvent) {
        self.lock().push(event.clone());
    }
}
