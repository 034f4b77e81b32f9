//! Bounded identifier -> native handle index.
//!
//! # Invariants
//! - At most one entry per identifier.
//! - `len() <= capacity()`; inserting past capacity evicts the oldest entry.
//! - Entries leave only through `remove` or eviction.

use crate::platform::NativeHandle;
use std::collections::{HashMap, VecDeque};

/// Tracked state of one delivered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub handle: NativeHandle,
    /// Whether an action button was attached at delivery.
    pub has_action: bool,
}

/// Result of one `insert` call.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Previous entry stored under the same identifier.
    pub replaced: Option<IndexEntry>,
    /// Oldest entry dropped to stay within capacity.
    pub evicted: Option<(String, IndexEntry)>,
}

#[derive(Debug)]
pub struct ActiveNotificationIndex {
    capacity: usize,
    entries: HashMap<String, IndexEntry>,
    order: VecDeque<String>,
}

impl ActiveNotificationIndex {
    /// Creates an empty index; a zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, identifier: &str, entry: IndexEntry) -> InsertOutcome {
        let replaced = self.entries.insert(identifier.to_string(), entry);
        if replaced.is_some() {
            self.order.retain(|existing| existing != identifier);
        }
        self.order.push_back(identifier.to_string());

        let mut evicted = None;
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                evicted = self
                    .entries
                    .remove(&oldest)
                    .map(|entry| (oldest, entry));
            }
        }

        InsertOutcome { replaced, evicted }
    }

    pub fn remove(&mut self, identifier: &str) -> Option<IndexEntry> {
        let entry = self.entries.remove(identifier)?;
        self.order.retain(|existing| existing != identifier);
        Some(entry)
    }

    pub fn get(&self, identifier: &str) -> Option<&IndexEntry> {
        self.entries.get(identifier)
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Identifiers from oldest to newest.
    pub fn identifiers(&self) -> Vec<String> {
        self.order.iter().cloned().collect()
    }
}
