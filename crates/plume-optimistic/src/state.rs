// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Values the coordinator mutates and the request it hands to `Confirm`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Toggle state of one action on one item, e.g. "liked, 11 likes".
///
/// `count` is unsigned; every transition saturates at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ActionState {
    /// Whether the current user has the action applied.
    pub active: bool,
    /// Aggregate count across all users.
    pub count: u64,
}

impl ActionState {
    /// Build a state from its parts.
    pub const fn new(active: bool, count: u64) -> Self {
        Self { active, count }
    }
}

impl fmt::Display for ActionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.active { "on" } else { "off" };
        write!(f, "{mark}/{}", self.count)
    }
}

/// Monotonic id of one `trigger()`; the first trigger is generation 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The first generation a coordinator hands out.
    pub const FIRST: Self = Self(0);

    /// Raw counter value.
    pub const fn get(self) -> u64 {
        self.0
    }

    pub(crate) const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// One in-flight confirmation as seen by the [`Confirm`](crate::Confirm) port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRequest {
    /// Generation this request was issued under.
    pub generation: Generation,
    /// State immediately before the optimistic update; restored on failure.
    pub prior: ActionState,
    /// Optimistic state the user asked for.
    pub requested: ActionState,
}
