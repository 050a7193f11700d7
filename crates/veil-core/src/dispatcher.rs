//! Scheduling policies between host notifications and reconciliation passes.
//!
//! Nothing here owns a timer. Callers feed the current `Instant` in and poll for due
//! work, which keeps the engine synchronous and lets tests step time by hand.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::config::CoreConfig;
use crate::engine::PassKind;
use crate::events::{HostEvent, TriggerClass};

/// Coalescing timer: each trigger pushes the deadline out, so only the last trigger
/// of a burst fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Returns true once when the deadline has passed, then disarms.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

/// Fixed-delay invocations that are never merged.
#[derive(Debug, Clone)]
pub struct DeferredQueue {
    delay: Duration,
    due: VecDeque<Instant>,
}

impl DeferredQueue {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            due: VecDeque::new(),
        }
    }

    pub fn push(&mut self, now: Instant) {
        self.due.push_back(now + self.delay);
    }

    /// Pop and count every invocation due at `now`.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut fired = 0;
        while self.due.front().is_some_and(|due| *due <= now) {
            self.due.pop_front();
            fired += 1;
        }
        fired
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.due.front().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.due.is_empty()
    }

    fn drain(&mut self) -> usize {
        let count = self.due.len();
        self.due.clear();
        count
    }
}

/// Maps host events onto the two trigger classes and their scheduling policies.
#[derive(Debug, Clone)]
pub struct EventDispatcher {
    full: Debouncer,
    incremental: DeferredQueue,
}

impl EventDispatcher {
    pub fn new(config: &CoreConfig) -> Self {
        Self {
            full: Debouncer::new(config.full_check_debounce()),
            incremental: DeferredQueue::new(config.incremental_delay()),
        }
    }

    pub fn dispatch(&mut self, event: HostEvent, now: Instant) {
        match event.trigger_class() {
            TriggerClass::Structural => {
                tracing::debug!(?event, "Scheduling debounced full check");
                self.full.trigger(now);
            }
            TriggerClass::Append => {
                tracing::debug!(?event, "Scheduling incremental check");
                self.incremental.push(now);
            }
        }
    }

    pub fn schedule_full(&mut self, now: Instant) {
        self.full.trigger(now);
    }

    /// Passes that are due at `now`, incremental ones first.
    pub fn due(&mut self, now: Instant) -> Vec<PassKind> {
        let mut passes = vec![PassKind::Incremental; self.incremental.poll(now)];
        if self.full.poll(now) {
            passes.push(PassKind::Full);
        }
        passes
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.full.deadline(), self.incremental.next_deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.full.is_pending() && self.incremental.is_empty()
    }

    /// Everything still scheduled, regardless of deadlines. Used at shutdown.
    pub fn drain_all(&mut self) -> Vec<PassKind> {
        let mut passes = vec![PassKind::Incremental; self.incremental.drain()];
        if self.full.is_pending() {
            self.full.cancel();
            passes.push(PassKind::Full);
        }
        passes
    }
}
