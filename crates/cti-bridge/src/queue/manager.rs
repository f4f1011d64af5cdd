//! # Contact Queue Implementation
//!
//! Holds the calls waiting on a "create new record" resolution. The CRM
//! shows at most one new-record modal at a time, so entries are promoted
//! one by one; everything here is plain bookkeeping with two invariants:
//!
//! - at most one entry is `current` (its modal is the one on screen)
//! - a call identity appears at most once

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::widget::{Call, CallKey};

/// One call awaiting a "new contact" resolution
#[derive(Debug, Clone)]
pub struct PendingContact {
    /// The originating call
    pub call: Call,
    /// Opaque payload replayed to open this entry's new-record modal
    pub continuation: Value,
    /// The modal has been opened at least once
    pub opened: bool,
    /// The modal currently on screen belongs to this entry
    pub current: bool,
    /// When the entry was queued
    pub queued_at: DateTime<Utc>,
}

impl PendingContact {
    pub fn new(call: Call, continuation: Value) -> Self {
        Self {
            call,
            continuation,
            opened: false,
            current: false,
            queued_at: Utc::now(),
        }
    }

    pub fn key(&self) -> CallKey {
        self.call.key()
    }
}

/// FIFO queue of pending new-contact entries
///
/// Single-owner, mutated only from the engine's event loop; the engine
/// wraps it in a lock.
#[derive(Debug, Default)]
pub struct ContactQueue {
    entries: VecDeque<PendingContact>,
}

impl ContactQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CallKey) -> bool {
        self.entries.iter().any(|e| e.key() == *key)
    }

    pub fn get(&self, key: &CallKey) -> Option<&PendingContact> {
        self.entries.iter().find(|e| e.key() == *key)
    }

    /// Iterate entries in queue order
    pub fn entries(&self) -> impl Iterator<Item = &PendingContact> {
        self.entries.iter()
    }

    /// Does any entry own the modal currently on screen?
    pub fn has_current(&self) -> bool {
        self.entries.iter().any(|e| e.current)
    }

    /// Number of entries whose modal has been opened
    pub fn opened_count(&self) -> usize {
        self.entries.iter().filter(|e| e.opened).count()
    }

    /// Enqueue an entry. Duplicate call identities are dropped.
    ///
    /// Returns `true` if the entry was added.
    pub fn push(&mut self, entry: PendingContact) -> bool {
        let key = entry.key();
        if self.contains(&key) {
            warn!("📋 call {} already queued for contact creation, not re-queuing", key);
            return false;
        }
        debug!("📋 queued call {} for contact creation (queue depth: {})",
               key, self.entries.len() + 1);
        self.entries.push_back(entry);
        true
    }

    /// Promote a specific entry to current, demoting any other
    ///
    /// Returns the entry's continuation payload for the screen-pop, or
    /// `None` if the key is unknown.
    pub fn promote(&mut self, key: &CallKey) -> Option<Value> {
        if !self.contains(key) {
            return None;
        }
        for entry in &mut self.entries {
            entry.current = false;
        }
        let entry = self.entries.iter_mut().find(|e| e.key() == *key)?;
        entry.opened = true;
        entry.current = true;
        Some(entry.continuation.clone())
    }

    /// Promote the oldest not-yet-opened entry, demoting any current one
    ///
    /// Returns the promoted key and its continuation payload.
    pub fn promote_next(&mut self) -> Option<(CallKey, Value)> {
        let key = self
            .entries
            .iter()
            .find(|e| !e.opened)
            .map(PendingContact::key)?;
        let continuation = self.promote(&key)?;
        Some((key, continuation))
    }

    /// Remove and return the current entry, if any
    pub fn take_current(&mut self) -> Option<PendingContact> {
        let index = self.entries.iter().position(|e| e.current)?;
        self.entries.remove(index)
    }

    /// Remove an entry by call identity
    pub fn remove(&mut self, key: &CallKey) -> Option<PendingContact> {
        let index = self.entries.iter().position(|e| e.key() == *key)?;
        self.entries.remove(index)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
