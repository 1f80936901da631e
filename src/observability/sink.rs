//! Destinations for stubbed-ACL warnings.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

/// Receives the operator warnings a stubbed ACL emits on every call.
pub trait StubSink: Send + Sync {
    fn warn(&self, message: &str);
}

/// Forwards stub warnings to `tracing` at WARN level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl StubSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "ipgate::stub", "{message}");
    }
}

/// Keeps the most recent warnings in memory, dropping the oldest once
/// `capacity` is reached.
#[derive(Debug)]
pub struct MemorySink {
    capacity: usize,
    messages: Mutex<VecDeque<String>>,
}

impl MemorySink {
    pub const DEFAULT_CAPACITY: usize = 1024;

    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Sink that retains at most `capacity` warnings (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            messages: Mutex::new(VecDeque::with_capacity(capacity.min(Self::DEFAULT_CAPACITY))),
        }
    }

    /// Retained warnings, oldest first.
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl StubSink for MemorySink {
    fn warn(&self, message: &str) {
        let mut messages = self.messages.lock().unwrap_or_else(PoisonError::into_inner);
        if messages.len() == self.capacity {
            messages.pop_front();
        }
        messages.push_back(message.to_string());
    }
}
