// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pure optimistic transitions.

use crate::state::ActionState;

/// Computes the state the UI should show before the backend has answered.
///
/// Implementations must be pure and total: no I/O, no panics, same input
/// same output.
pub trait Reconciler: Send + Sync + 'static {
    /// Next optimistic state given the current published state.
    fn compute_optimistic(&self, current: &ActionState) -> ActionState;
}

/// Flip `active` and move `count` by one in the same direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct LikeToggle;

impl Reconciler for LikeToggle {
    fn compute_optimistic(&self, current: &ActionState) -> ActionState {
        compute_optimistic(current)
    }
}

/// The like-toggle transition; `count` clamps at zero.
pub const fn compute_optimistic(current: &ActionState) -> ActionState {
    if current.active {
        ActionState::new(false, current.count.saturating_sub(1))
    } else {
        ActionState::new(true, current.count.saturating_add(1))
    }
}

impl<F> Reconciler for F
where
    F: Fn(&ActionState) -> ActionState + Send + Sync + 'static,
{
    fn compute_optimistic(&self, current: &ActionState) -> ActionState {
        self(current)
    }
}
