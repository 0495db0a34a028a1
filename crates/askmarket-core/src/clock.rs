//! Logical clocks
//!
//! Timestamps on requests, responses and ratings come from a [`Clock`]
//! injected by the host. The marketplace reads the clock once per committed
//! operation, after every check has passed.

use std::sync::atomic::{AtomicU64, Ordering};

use askmarket_types::Timestamp;

/// Source of monotonic logical timestamps
pub trait Clock: Send + Sync {
    /// Timestamp for the operation being committed
    fn now(&self) -> Timestamp;
}

/// Block-height style clock: every reading is one height above the last
#[derive(Debug, Default)]
pub struct BlockClock {
    height: AtomicU64,
}

impl BlockClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// First reading returns `height`
    pub fn starting_at(height: Timestamp) -> Self {
        Self {
            height: AtomicU64::new(height),
        }
    }

    /// Height the next reading will return
    pub fn peek(&self) -> Timestamp {
        self.height.load(Ordering::SeqCst)
    }
}

impl Clock for BlockClock {
    fn now(&self) -> Timestamp {
        self.height.fetch_add(1, Ordering::SeqCst)
    }
}

/// Wall-clock milliseconds, never moving backwards
#[derive(Debug, Default)]
pub struct WallClock {
    last: AtomicU64,
}

impl WallClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for WallClock {
    fn now(&self) -> Timestamp {
        let wall = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let previous = self.last.fetch_max(wall, Ordering::SeqCst);
        previous.max(wall)
    }
}
