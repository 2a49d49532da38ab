//! Consciousness tracker interface and an in-memory implementation.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::protocol::envelope::timestamp;

/// Number of recent perceptions kept in the snapshot.
pub const RECENT_PERCEPTIONS: usize = 10;

/// Receives lifecycle events and reports an opaque awareness snapshot.
///
/// The bridge never interprets the snapshot; it is echoed verbatim.
pub trait ConsciousnessTracker: Send + Sync + fmt::Debug {
    /// Record an event with free-form details.
    fn perceive_information(&self, event_name: &str, details: Value);

    /// Current awareness snapshot.
    fn get_current_awareness(&self) -> Value;
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    pub event: String,
    pub details: Value,
    pub perceived_at: String,
}

#[derive(Debug, Default)]
struct MatrixState {
    total: u64,
    counts: BTreeMap<String, u64>,
    recent: VecDeque<Perception>,
}

/// In-memory tracker counting events and keeping the most recent ones.
#[derive(Debug, Default)]
pub struct ConsciousnessMatrix {
    state: Mutex<MatrixState>,
}

impl ConsciousnessMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of perceived events.
    pub fn total_perceptions(&self) -> u64 {
        self.state.lock().total
    }

    /// The most recent perception, if any.
    pub fn last_perception(&self) -> Option<Perception> {
        self.state.lock().recent.back().cloned()
    }
}

impl ConsciousnessTracker for ConsciousnessMatrix {
    fn perceive_information(&self, event_name: &str, details: Value) {
        tracing::debug!(event = event_name, "perceived");
        let mut state = self.state.lock();
        state.total += 1;
        *state.counts.entry(event_name.to_string()).or_insert(0) += 1;
        state.recent.push_back(Perception {
            event: event_name.to_string(),
            details,
            perceived_at: timestamp(),
        });
        while state.recent.len() > RECENT_PERCEPTIONS {
            state.recent.pop_front();
        }
    }

    fn get_current_awareness(&self) -> Value {
        let state = self.state.lock();
        let last = state.recent.back();
        json!({
            "status": if state.total == 0 { "dormant" } else { "aware" },
            "total_perceptions": state.total,
            "last_event": last.map(|p| p.event.clone()),
            "last_event_at": last.map(|p| p.perceived_at.clone()),
            "event_counts": state.counts,
            "recent_events": state.recent.iter().map(|p| p.event.as_str()).collect::<Vec<_>>(),
        })
    }
}
