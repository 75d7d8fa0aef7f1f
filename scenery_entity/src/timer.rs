// Copyright 2025 the Scenery Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Virtual-time scheduler.
//!
//! Time is an abstract `u64` (milliseconds by convention) that only moves when
//! the host advances it. Timers fire in due-time order; timers due at the same
//! instant fire in the order they were armed.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::{trace, warn};

use crate::entity::EntityId;

/// Handle for a scheduled timer. An interval keeps its id across repeats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TimerId(u64);

/// The component a timer is delivered to.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct TimerOwner {
    /// Entity carrying the component.
    pub entity: EntityId,
    /// Component name.
    pub component: String,
}

#[derive(Clone, Debug)]
struct Pending {
    id: TimerId,
    owner: TimerOwner,
    period: Option<u64>,
}

/// Ordered set of pending timers plus the current time.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: u64,
    next_seq: u64,
    // (due, arm sequence) → timer
    queue: BTreeMap<(u64, u64), Pending>,
    keys: FxHashMap<TimerId, (u64, u64)>,
}

impl Scheduler {
    /// An empty scheduler at time 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current time.
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True when nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// When the earliest pending timer is due.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().map(|(due, _)| *due)
    }

    /// Fire once, `delay` units from now.
    pub fn set_timeout(&mut self, owner: TimerOwner, delay: u64) -> TimerId {
        let id = TimerId(self.next_seq);
        self.arm(id, owner, delay, None);
        id
    }

    /// Fire every `period` units, first after one period. A zero period is raised to 1.
    pub fn set_interval(&mut self, owner: TimerOwner, period: u64) -> TimerId {
        let period = if period == 0 {
            warn!(component = %owner.component, "zero interval raised to 1");
            1
        } else {
            period
        };
        let id = TimerId(self.next_seq);
        self.arm(id, owner, period, Some(period));
        id
    }

    /// Cancel a timer. Returns `false` if it is not pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.keys.remove(&id) {
            Some(key) => {
                self.queue.remove(&key);
                trace!(?id, "timer cancelled");
                true
            }
            None => false,
        }
    }

    /// True while `id` is scheduled.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.keys.contains_key(&id)
    }

    /// Cancel every timer of `entity`, or only those of one of its components.
    /// Returns how many were cancelled.
    pub fn cancel_owned_by(&mut self, entity: EntityId, component: Option<&str>) -> usize {
        let doomed: Vec<TimerId> = self
            .queue
            .values()
            .filter(|p| {
                p.owner.entity == entity && component.is_none_or(|c| p.owner.component == c)
            })
            .map(|p| p.id)
            .collect();
        for id in &doomed {
            self.cancel(*id);
        }
        doomed.len()
    }

    /// Pop the earliest timer due at or before `until`, moving the clock to its
    /// due time. Intervals are re-armed before returning.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, TimerOwner)> {
        let (&key, _) = self.queue.iter().next().filter(|((due, _), _)| *due <= until)?;
        let pending = self.queue.remove(&key)?;
        self.keys.remove(&pending.id);
        self.now = self.now.max(key.0);
        if let Some(period) = pending.period {
            self.arm(pending.id, pending.owner.clone(), period, Some(period));
        }
        Some((pending.id, pending.owner))
    }

    /// Move the clock forward to `t` without firing anything. Never moves backward.
    pub fn set_now(&mut self, t: u64) {
        self.now = self.now.max(t);
    }

    fn arm(&mut self, id: TimerId, owner: TimerOwner, delay: u64, period: Option<u64>) {
        let key = (self.now.saturating_add(delay), self.next_seq);
        self.next_seq += 1;
        self.queue.insert(key, Pending { id, owner, period });
        self.keys.insert(id, key);
    }
}
