//! Eviction Module
//!
//! Eviction policies and the order tracker that picks a victim when the
//! cache is full.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// == Eviction Policy ==
/// Which active entry to drop when an insertion would exceed capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Least recently accessed
    #[default]
    Lru,
    /// Lowest access count, oldest insertion on ties
    Lfu,
    /// First inserted
    Fifo,
}

impl FromStr for EvictionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "lfu" => Ok(Self::Lfu),
            "fifo" => Ok(Self::Fifo),
            other => Err(format!("unknown eviction policy '{}'", other)),
        }
    }
}

impl fmt::Display for EvictionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Lru => "lru",
            Self::Lfu => "lfu",
            Self::Fifo => "fifo",
        };
        f.write_str(name)
    }
}

// == Eviction Tracker ==
/// Tracks access and insertion order of active keys.
///
/// - `recency`: front = most recently used, back = least recently used
/// - `insertion`: front = inserted first
#[derive(Debug)]
pub struct EvictionTracker<K> {
    recency: VecDeque<K>,
    insertion: VecDeque<K>,
}

impl<K> Default for EvictionTracker<K> {
    fn default() -> Self {
        Self {
            recency: VecDeque::new(),
            insertion: VecDeque::new(),
        }
    }
}

impl<K: Clone + PartialEq> EvictionTracker<K> {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Insert ==
    /// Registers a newly stored key as both newest and most recently used.
    ///
    /// Re-inserting an existing key moves it to the back of the insertion order.
    pub fn insert(&mut self, key: K) {
        self.remove(&key);
        self.recency.push_front(key.clone());
        self.insertion.push_back(key);
    }

    // == Touch ==
    /// Marks a tracked key as recently used.
    pub fn touch(&mut self, key: &K) {
        if let Some(pos) = self.recency.iter().position(|k| k == key) {
            if let Some(k) = self.recency.remove(pos) {
                self.recency.push_front(k);
            }
        }
    }

    // == Remove ==
    pub fn remove(&mut self, key: &K) {
        self.recency.retain(|k| k != key);
        self.insertion.retain(|k| k != key);
    }

    // == Select Victim ==
    /// Picks the key to evict under `policy` without removing it.
    ///
    /// `access_count` supplies hit counts for LFU.
    pub fn select_victim<F>(&self, policy: EvictionPolicy, access_count: F) -> Option<K>
    where
        F: Fn(&K) -> u64,
    {
        match policy {
            EvictionPolicy::Lru => self.recency.back().cloned(),
            EvictionPolicy::Fifo => self.insertion.front().cloned(),
            // min_by_key keeps the first minimum, i.e. the oldest insertion
            EvictionPolicy::Lfu => self.insertion.iter().min_by_key(|k| access_count(k)).cloned(),
        }
    }
}
