//! Bounded metadata cache.
//!
//! Token metadata is close to immutable on chain, so entries never
//! expire; the risk is unbounded growth across a long-running monitor
//! watching many wallets. Capacity comes from configuration and the
//! oldest insertion is evicted first. The lock is scoped to the map
//! mutation and is never held across I/O.

use super::types::TokenMetadata;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

pub struct MetadataCache {
    inner: Mutex<CacheInner>,
    capacity: usize,
}

struct CacheInner {
    entries: HashMap<String, TokenMetadata>,
    insertion_order: VecDeque<String>,
}

impl MetadataCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                entries: HashMap::new(),
                insertion_order: VecDeque::new(),
            }),
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, mint: &str) -> Option<TokenMetadata> {
        self.inner.lock().entries.get(mint).cloned()
    }

    pub fn insert(&self, metadata: TokenMetadata) {
        let mut inner = self.inner.lock();

        if inner.entries.insert(metadata.mint.clone(), metadata.clone()).is_none() {
            inner.insertion_order.push_back(metadata.mint);
        }

        while inner.entries.len() > self.capacity {
            match inner.insertion_order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
