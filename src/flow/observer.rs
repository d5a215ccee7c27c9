//! Transition observers: timestamping and activity logging.
//!
//! The state machine reports transitions without reading a clock; the
//! emitter here stamps them with a sequence number and wall-clock time
//! before handing them to observers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::transition::Transition;

/// A transition stamped for the activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub transition: Transition,
}

/// Receives every transition the driver applies, in order.
pub trait TransitionObserver: Send + Sync {
    fn observe(&self, entry: &ActivityEntry);
}

impl<F> TransitionObserver for F
where
    F: Fn(&ActivityEntry) + Send + Sync,
{
    fn observe(&self, entry: &ActivityEntry) {
        self(entry)
    }
}

/// Writes each transition as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TransitionObserver for TracingObserver {
    fn observe(&self, entry: &ActivityEntry) {
        tracing::info!(
            seq = entry.seq,
            from = %entry.transition.from,
            to = %entry.transition.to,
            "{}",
            entry.transition.summary()
        );
    }
}

/// Bounded in-memory activity log; the oldest entries are evicted first.
#[derive(Debug)]
pub struct ActivityLog {
    capacity: usize,
    entries: Mutex<VecDeque<ActivityEntry>>,
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::with_capacity(256)
    }
}

impl ActivityLog {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            entries: Mutex::new(VecDeque::new()),
        }
    }

    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.entries
            .lock()
            .map(|entries| entries.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}

impl TransitionObserver for ActivityLog {
    fn observe(&self, entry: &ActivityEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            if entries.len() == self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry.clone());
        }
    }
}

/// Stamps transitions and fans them out to observers.
pub(crate) struct ActivityEmitter {
    seq: u64,
    observers: Vec<Arc<dyn TransitionObserver>>,
}

impl ActivityEmitter {
    pub(crate) fn new(observers: Vec<Arc<dyn TransitionObserver>>) -> Self {
        Self { seq: 1, observers }
    }

    pub(crate) fn emit(&mut self, transitions: Vec<Transition>) {
        for transition in transitions {
            let entry = ActivityEntry {
                seq: self.seq,
                timestamp: Utc::now(),
                transition,
            };
            self.seq += 1;
            for observer in &self.observers {
                observer.observe(&entry);
            }
        }
    }
}
