// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Optimistic coordination for toggle-style user actions (like, bookmark,
//! follow).
//!
//! A [`Coordinator`] applies the user's action to its [`ActionState`]
//! immediately, asks an injected [`Confirm`] port for the authoritative
//! result, and then either adopts that result or rolls back. Every trigger
//! gets a fresh [`Generation`]; only the newest generation may touch the
//! state when it resolves, so under rapid repeated toggling the last
//! *request* wins rather than the last *response*.
//!
//! The generation rules live in [`OptimisticCell`], a synchronous state
//! machine that event loops without a Tokio runtime can drive directly.
//!
//! ```no_run
//! use plume_optimistic::{ActionState, ConfirmError, Coordinator, PendingRequest};
//!
//! # async fn demo() {
//! let likes = Coordinator::builder(ActionState::new(false, 10))
//!     .label("post-42/like")
//!     .build(|req: PendingRequest| async move {
//!         Ok::<_, ConfirmError>(req.requested)
//!     });
//!
//! let pending = likes.trigger();
//! assert_eq!(likes.state(), ActionState::new(true, 11));
//! pending.settled().await;
//! # }
//! ```

mod cell;
mod confirm;
mod coordinator;
mod observer;
mod reconcile;
mod state;

pub use cell::{OptimisticCell, Settlement};
pub use confirm::{Confirm, ConfirmError, ConfirmFuture, WithTimeout};
pub use coordinator::{Coordinator, CoordinatorBuilder, Snapshot, Trigger};
pub use observer::{CoordinatorEvent, NoticeObserver, Observer, TracingObserver};
pub use reconcile::{compute_optimistic, LikeToggle, Reconciler};
pub use state::{ActionState, Generation, PendingRequest};
