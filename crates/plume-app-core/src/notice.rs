// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Bounded notice queue (toasts) with TTL and dedupe.
//!
//! Rapid repeated failures (a user hammering a like button while offline)
//! collapse into one notice whose timer is refreshed instead of flooding the
//! queue.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Window within which an identical notice refreshes the existing entry.
pub const DEDUPE_WINDOW: Duration = Duration::from_millis(500);

/// Notice severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Informational note.
    Info,
    /// Something the user may want to retry.
    Warn,
    /// An action failed and was reverted.
    Error,
}

/// Identifier for a notice entry.
pub type NoticeId = u64;

#[derive(Debug, Clone)]
struct Notice {
    id: NoticeId,
    kind: NoticeKind,
    title: String,
    body: Option<String>,
    ttl: Duration,
    created: Instant,
}

impl Notice {
    fn alive_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.created) < self.ttl
    }
}

/// Rendering-friendly view of a notice.
#[derive(Debug, Clone, PartialEq)]
pub struct NoticeView {
    /// Stable identifier.
    pub id: NoticeId,
    /// Severity.
    pub kind: NoticeKind,
    /// Short title line.
    pub title: String,
    /// Optional detail text.
    pub body: Option<String>,
    /// 1.0 -> just shown, 0.0 -> expired.
    pub remaining: f32,
}

/// In-memory notice queue; the oldest entry is evicted when full.
#[derive(Debug)]
pub struct NoticeBoard {
    queue: VecDeque<Notice>,
    capacity: usize,
    next_id: NoticeId,
}

impl NoticeBoard {
    /// Create a board holding at most `capacity` notices (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            capacity: capacity.max(1),
            next_id: 1,
        }
    }

    /// Post a notice. An identical notice posted within [`DEDUPE_WINDOW`]
    /// is refreshed in place and keeps its id.
    pub fn post<T, B>(
        &mut self,
        kind: NoticeKind,
        title: T,
        body: B,
        ttl: Duration,
        now: Instant,
    ) -> NoticeId
    where
        T: Into<String>,
        B: Into<Option<String>>,
    {
        let title = title.into();
        let body = body.into();

        if let Some(existing) = self.queue.iter_mut().find(|n| {
            n.kind == kind
                && n.title == title
                && n.body == body
                && now.saturating_duration_since(n.created) <= DEDUPE_WINDOW
        }) {
            existing.created = now;
            existing.ttl = ttl;
            return existing.id;
        }

        let id = self.next_id;
        self.next_id += 1;
        if self.queue.len() == self.capacity {
            self.queue.pop_front();
        }
        self.queue.push_back(Notice {
            id,
            kind,
            title,
            body,
            ttl,
            created: now,
        });
        id
    }

    /// Remove a notice before it expires. Returns whether it was present.
    pub fn dismiss(&mut self, id: NoticeId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|n| n.id != id);
        self.queue.len() != before
    }

    /// Drop expired notices (call once per frame/tick).
    pub fn retain_visible(&mut self, now: Instant) {
        self.queue.retain(|n| n.alive_at(now));
    }

    /// Number of stored notices, expired or not.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the board holds no notices.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Render-ready notices that are still alive at `now`.
    pub fn visible(&self, now: Instant) -> Vec<NoticeView> {
        self.queue
            .iter()
            .filter(|n| n.alive_at(now))
            .map(|n| NoticeView {
                id: n.id,
                kind: n.kind,
                title: n.title.clone(),
                body: n.body.clone(),
                remaining: 1.0
                    - (now.saturating_duration_since(n.created).as_secs_f32()
                        / n.ttl.as_secs_f32()),
            })
            .collect()
    }
}
