// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Observer port for coordinator lifecycle events, plus the stock
//! observers (tracing log, notice board).

use crate::cell::Settlement;
use crate::state::{ActionState, Generation};
use plume_app_core::notice::{NoticeBoard, NoticeKind};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Something the coordinator did, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A trigger published its optimistic state.
    Optimistic {
        /// Generation issued for the trigger.
        generation: Generation,
        /// State now published.
        state: ActionState,
    },
    /// A generation's confirmation resolved.
    Settled {
        /// Generation that resolved.
        generation: Generation,
        /// Effect on the published state.
        settlement: Settlement,
    },
    /// The owner replaced the state with a fresh snapshot.
    Reset {
        /// State now published.
        state: ActionState,
    },
}

/// Receives [`CoordinatorEvent`]s. Called outside the coordinator's lock,
/// on whichever task produced the event; implementations should return
/// quickly.
pub trait Observer: Send + Sync + 'static {
    /// Handle one event.
    fn on_event(&self, event: &CoordinatorEvent);
}

impl<F> Observer for F
where
    F: Fn(&CoordinatorEvent) + Send + Sync + 'static,
{
    fn on_event(&self, event: &CoordinatorEvent) {
        self(event);
    }
}

/// Logs every event through `tracing`; rollbacks at `warn`, the rest at `debug`.
#[derive(Debug, Clone)]
pub struct TracingObserver {
    label: Arc<str>,
}

impl TracingObserver {
    /// Observer tagging its records with `action = label`.
    pub fn new(label: impl Into<Arc<str>>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Observer for TracingObserver {
    fn on_event(&self, event: &CoordinatorEvent) {
        let action = &*self.label;
        match event {
            CoordinatorEvent::Optimistic { generation, state } => {
                debug!(action, %generation, %state, "optimistic update");
            }
            CoordinatorEvent::Settled {
                generation,
                settlement,
            } => match settlement {
                Settlement::Confirmed(state) => {
                    debug!(action, %generation, %state, "confirmed");
                }
                Settlement::RolledBack { restored, error } => {
                    warn!(
                        action,
                        %generation,
                        %restored,
                        %error,
                        "confirmation failed, rolled back"
                    );
                }
                Settlement::Discarded { error: None } => {
                    debug!(action, %generation, "stale confirmation discarded");
                }
                Settlement::Discarded { error: Some(error) } => {
                    debug!(action, %generation, %error, "stale failure discarded");
                }
            },
            CoordinatorEvent::Reset { state } => {
                debug!(action, %state, "reset to snapshot");
            }
        }
    }
}

/// Posts an error notice whenever a rollback happens.
#[derive(Debug, Clone)]
pub struct NoticeObserver {
    board: Arc<Mutex<NoticeBoard>>,
    title: String,
    ttl: Duration,
}

impl NoticeObserver {
    /// Post `title` to `board` for `ttl` on each rollback.
    pub fn new(board: Arc<Mutex<NoticeBoard>>, title: impl Into<String>, ttl: Duration) -> Self {
        Self {
            board,
            title: title.into(),
            ttl,
        }
    }
}

impl Observer for NoticeObserver {
    fn on_event(&self, event: &CoordinatorEvent) {
        if let CoordinatorEvent::Settled {
            settlement: Settlement::RolledBack { error, .. },
            ..
        } = event
        {
            let mut board = self.board.lock().unwrap_or_else(PoisonError::into_inner);
            board.post(
                NoticeKind::Error,
                self.title.as_str(),
                Some(error.to_string()),
                self.ttl,
                Instant::now(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::ConfirmError;

    fn rolled_back(generation: Generation) -> CoordinatorEvent {
        CoordinatorEvent::Settled {
            generation,
            settlement: Settlement::RolledBack {
                restored: ActionState::new(true, 5),
                error: ConfirmError::Unavailable("offline".into()),
            },
        }
    }

    #[test]
    fn rollbacks_post_one_deduped_notice() {
        let board = Arc::new(Mutex::new(NoticeBoard::new(4)));
        let observer =
            NoticeObserver::new(board.clone(), "Failed to toggle like", Duration::from_secs(4));
        observer.on_event(&rolled_back(Generation::FIRST));
        observer.on_event(&rolled_back(Generation::FIRST));
        let views = board.lock().unwrap().visible(Instant::now());
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].kind, NoticeKind::Error);
        assert_eq!(views[0].body.as_deref(), Some("unavailable: offline"));
    }

    #[test]
    fn confirmations_post_nothing() {
        let board = Arc::new(Mutex::new(NoticeBoard::new(4)));
        let observer = NoticeObserver::new(board.clone(), "x", Duration::from_secs(1));
        observer.on_event(&CoordinatorEvent::Settled {
            generation: Generation::FIRST,
            settlement: Settlement::Confirmed(ActionState::default()),
        });
        assert!(board.lock().unwrap().is_empty());
    }
}
