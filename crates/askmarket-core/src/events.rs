//! Event bus for marketplace notifications
//!
//! Events are broadcast to live subscribers and kept in a bounded journal
//! so responders that poll can catch up. Publishing never suspends: it runs
//! inside the marketplace transaction, right after the commit.

use std::collections::VecDeque;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use askmarket_types::{MarketEvent, RequestId};
use tokio::sync::broadcast;

/// Broadcast channel plus bounded journal
pub struct EventBus {
    sender: broadcast::Sender<MarketEvent>,
    journal: RwLock<VecDeque<MarketEvent>>,
    journal_capacity: usize,
}

impl EventBus {
    pub fn new(channel_capacity: usize, journal_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            sender,
            journal: RwLock::new(VecDeque::with_capacity(journal_capacity.min(1024))),
            journal_capacity: journal_capacity.max(1),
        }
    }

    /// Publish committed events in order
    pub fn publish(&self, events: Vec<MarketEvent>) {
        if events.is_empty() {
            return;
        }
        let mut journal = self.write_journal();
        for event in events {
            tracing::debug!(summary = %event.summary(), "event");
            journal.push_back(event.clone());
            // Ignore send errors (no receivers)
            let _ = self.sender.send(event);
        }
        // Keep bounded
        while journal.len() > self.journal_capacity {
            journal.pop_front();
        }
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<MarketEvent> {
        self.sender.subscribe()
    }

    /// Most recent events, newest first
    pub fn recent(&self, limit: usize) -> Vec<MarketEvent> {
        let journal = self.read_journal();
        journal.iter().rev().take(limit).cloned().collect()
    }

    /// Every retained event, oldest first
    pub fn journal(&self) -> Vec<MarketEvent> {
        self.read_journal().iter().cloned().collect()
    }

    /// Retained events about one request, oldest first
    pub fn for_request(&self, request_id: RequestId) -> Vec<MarketEvent> {
        let journal = self.read_journal();
        journal
            .iter()
            .filter(|e| e.request_id() == Some(request_id))
            .cloned()
            .collect()
    }

    // A panic while holding the lock leaves the journal intact, so keep using it.
    fn read_journal(&self) -> RwLockReadGuard<'_, VecDeque<MarketEvent>> {
        self.journal.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_journal(&self) -> RwLockWriteGuard<'_, VecDeque<MarketEvent>> {
        self.journal.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
