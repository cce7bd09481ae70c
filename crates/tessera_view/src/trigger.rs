//! Trigger bus
//!
//! Widgets talk to each other through string signals. A sender lists its
//! trigger targets; when it asks the tree to send, every target whose
//! required state matches the sender's `state_num` gets the signal pushed
//! onto its inbox. The receiver consumes signals with
//! [`TriggerInbox::take`] whenever it gets around to it.
//!
//! A signal may carry a parameter after a colon: `"open:settings"` matched
//! against the prefix `"open"` yields `"settings"`. A bare `"open"` yields
//! `"TRUE"`.

use std::collections::VecDeque;

use crate::tree::WidgetId;

/// Returned by [`TriggerInbox::take`] for signals without a parameter
pub const TRIGGER_TRUE: &str = "TRUE";

/// How a trigger target is addressed
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetRef {
    /// Widget name, looked up on first send and cached
    Unresolved(String),
    /// Direct handle; a removed widget simply no longer resolves
    Resolved(WidgetId),
}

/// One outgoing trigger registration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerTarget {
    pub target: TargetRef,
    pub signal: String,
    /// Only send while the sender's `state_num` equals this
    pub required_state: Option<u32>,
}

impl TriggerTarget {
    pub fn new(target: TargetRef, signal: impl Into<String>) -> Self {
        Self {
            target,
            signal: signal.into(),
            required_state: None,
        }
    }

    pub fn when(mut self, state: u32) -> Self {
        self.required_state = Some(state);
        self
    }

    /// Whether a sender in `state` should deliver this target
    pub fn applies_to(&self, state: u32) -> bool {
        self.required_state.map_or(true, |required| required == state)
    }
}

/// FIFO queue of received, unconsumed signals
#[derive(Clone, Debug, Default)]
pub struct TriggerInbox {
    queue: VecDeque<String>,
}

impl TriggerInbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, signal: impl Into<String>) {
        self.queue.push_back(signal.into());
    }

    /// Remove the oldest signal starting with `prefix` and return its parameter
    pub fn take(&mut self, prefix: &str) -> Option<String> {
        let index = self
            .queue
            .iter()
            .position(|signal| signal.starts_with(prefix))?;
        let signal = self.queue.remove(index)?;
        Some(parameter(&signal, prefix))
    }

    /// Whether a signal starting with `prefix` is waiting
    pub fn has(&self, prefix: &str) -> bool {
        self.queue.iter().any(|signal| signal.starts_with(prefix))
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}

/// Strip `prefix` and one `:` separator from `signal`
fn parameter(signal: &str, prefix: &str) -> String {
    let rest = &signal[prefix.len()..];
    let rest = rest.strip_prefix(':').unwrap_or(rest);
    if rest.is_empty() {
        TRIGGER_TRUE.to_string()
    } else {
        rest.to_string()
    }
}
