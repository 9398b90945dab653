//! Single-shot timer queue.
//!
//! The queue does not use internal threads or sleep. Callers pass a
//! monotonic millisecond clock to `schedule()` and `pop_due()`, and the
//! owner pops expired timers from its own `tick()`.
//!
//! ```ignore
//! let mut timers = TimerQueue::new();
//! let h = timers.schedule(now, 3000, Kind::Deadline);
//! timers.cancel(h); // idempotent
//! while let Some(expired) = timers.pop_due(now) { /* ... */ }
//! ```

use serde::{Deserialize, Serialize};

/// Opaque id of a scheduled timer. Never reused within a queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Lifetime counters. `scheduled == cancelled + fired + live` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerStats {
    pub scheduled: u64,
    pub cancelled: u64,
    pub fired: u64,
}

/// A timer removed from the queue by `pop_due()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expired<K> {
    pub handle: TimerHandle,
    /// Scheduled expiry, which may be earlier than the `now` passed to `pop_due()`.
    pub due_ms: u64,
    pub kind: K,
}

#[derive(Debug, Clone)]
struct Entry<K> {
    handle: TimerHandle,
    due_ms: u64,
    kind: K,
}

#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    next_id: u64,
    pending: Vec<Entry<K>>,
    stats: TimerStats,
}

impl<K: Copy> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: Vec::new(),
            stats: TimerStats::default(),
        }
    }

    /// Arm a timer that expires `duration_ms` after `now_ms`.
    pub fn schedule(&mut self, now_ms: u64, duration_ms: u64, kind: K) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.push(Entry {
            handle,
            due_ms: now_ms.saturating_add(duration_ms),
            kind,
        });
        self.stats.scheduled += 1;
        handle
    }

    /// Cancel a timer. Returns `true` only if it was still live; cancelling
    /// a fired or already-cancelled handle does nothing.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.pending.iter().position(|e| e.handle == handle) {
            Some(idx) => {
                self.pending.swap_remove(idx);
                self.stats.cancelled += 1;
                true
            }
            None => false,
        }
    }

    /// Cancel every live timer whose kind matches. Returns how many were cancelled.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|e| !pred(&e.kind));
        let removed = before - self.pending.len();
        self.stats.cancelled += removed as u64;
        removed
    }

    pub fn live_count(&self) -> usize {
        self.pending.len()
    }

    pub fn count_where(&self, mut pred: impl FnMut(&K) -> bool) -> usize {
        self.pending.iter().filter(|e| pred(&e.kind)).count()
    }

    /// Earliest expiry among live timers.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.pending.iter().map(|e| e.due_ms).min()
    }

    /// Remove and return the earliest expired timer, if any.
    ///
    /// Timers that expire at the same instant pop in scheduling order.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<Expired<K>> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.handle))
            .map(|(idx, _)| idx)?;
        let entry = self.pending.swap_remove(idx);
        self.stats.fired += 1;
        Some(Expired {
            handle: entry.handle,
            due_ms: entry.due_ms,
            kind: entry.kind,
        })
    }

    pub fn stats(&self) -> TimerStats {
        self.stats
    }
}

impl<K: Copy> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}
