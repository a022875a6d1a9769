//! LRU Tracker Module
//!
//! Recency ordering of stored addresses for capacity eviction.

use std::collections::{BTreeMap, HashMap};

// == LRU Tracker ==
/// Orders addresses by last access.
///
/// Every touch stamps the address with a fresh tick; the smallest tick is
/// the least recently used address.
#[derive(Debug, Default)]
pub struct LruTracker {
    /// Next tick to hand out
    clock: u64,
    /// Address -> tick of its last access
    ticks: HashMap<String, u64>,
    /// Tick -> address, oldest first
    order: BTreeMap<u64, String>,
}

impl LruTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks `address` as the most recently used.
    pub fn touch(&mut self, address: &str) {
        let tick = self.clock;
        self.clock += 1;

        if let Some(old) = self.ticks.insert(address.to_string(), tick) {
            self.order.remove(&old);
        }
        self.order.insert(tick, address.to_string());
    }

    // == Remove ==
    /// Stops tracking `address`. Unknown addresses are ignored.
    pub fn remove(&mut self, address: &str) {
        if let Some(tick) = self.ticks.remove(address) {
            self.order.remove(&tick);
        }
    }

    // == Evict Oldest ==
    /// Removes and returns the least recently used address.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let (_, address) = self.order.pop_first()?;
        self.ticks.remove(&address);
        Some(address)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}
