//! Least Recently Used eviction over variable-sized objects.
//!
//! The primitive policy of the crate and the building block of the
//! segmented and frequency-gated policies. A recency list orders resident
//! objects MRU → LRU; admission evicts from the back until the incoming
//! object fits the byte budget.
//!
//! ```text
//!   admit({id:9, size:4}), capacity 10, resident 8 bytes
//!
//!   head ─► [7/5B] ◄──► [3/3B] ◄── tail
//!                          │
//!                          ▼  evict until 8+4 ≤ 10
//!   head ─► [9/4B] ◄──► [7/5B]
//! ```
//!
//! Beyond the common [`Cache`] contract, `LruCache` exposes the handful of
//! operations the composite policies are built from: [`evict_return`]
//! (ownership of the victim transfers to the caller, who may re-admit it
//! into another segment), [`admit_with_return`] (window admission reporting
//! every displaced victim), and [`peek_lru`] (non-destructive tail read for
//! frequency comparisons).
//!
//! [`evict_return`]: LruCache::evict_return
//! [`admit_with_return`]: LruCache::admit_with_return
//! [`peek_lru`]: LruCache::peek_lru

use crate::ds::RecencyList;
use crate::policy::log_event;
use crate::traits::{Cache, Request};

const DEFAULT_CAPACITY: u64 = 1 << 20;

/// LRU cache over a byte budget.
#[derive(Debug)]
pub struct LruCache {
    list: RecencyList,
    capacity: u64,
}

impl Default for LruCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl LruCache {
    /// Creates an LRU cache with the given byte capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            list: RecencyList::new(),
            capacity,
        }
    }

    /// Returns the number of resident objects.
    pub fn len(&self) -> usize {
        self.list.len()
    }

    /// Returns `true` if no object is resident.
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Returns `true` if an object with the id is resident.
    pub fn contains(&self, id: u64) -> bool {
        self.list.contains(id)
    }

    /// Removes the LRU object and returns it; ownership transfers to the
    /// caller. `None` on an empty cache.
    pub fn evict_return(&mut self) -> Option<Request> {
        let victim = *self.list.back()?;
        log_event("e", self.list.bytes(), victim.id, victim.size);
        self.list.pop_back()
    }

    /// Returns the LRU object without removing it.
    pub fn peek_lru(&self) -> Option<Request> {
        self.list.back().copied()
    }

    /// Admits `req`, returning every victim displaced to make room, in
    /// eviction order. Used by the W-TinyLFU window, whose victims are then
    /// offered to the main cache.
    pub fn admit_with_return(&mut self, req: &Request) -> Vec<Request> {
        let mut victims = Vec::new();
        if req.size > self.capacity {
            log_event("L", self.capacity, req.id, req.size);
            tracing::warn!(id = req.id, size = req.size, capacity = self.capacity,
                "window admission larger than the window");
            return victims;
        }
        while self.list.bytes() + req.size > self.capacity {
            match self.evict_return() {
                Some(victim) => victims.push(victim),
                None => break,
            }
        }
        self.admit(req);
        victims
    }

    /// Hit test without promotion; FIFO's lookup.
    pub(crate) fn lookup_keep_order(&mut self, req: &Request) -> bool {
        if self.list.contains(req.id) {
            log_event("h", 0, req.id, req.size);
            true
        } else {
            false
        }
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.list.debug_validate_invariants();
    }
}

impl Cache for LruCache {
    fn lookup(&mut self, req: &Request) -> bool {
        if self.list.touch(req.id) {
            log_event("h", 0, req.id, req.size);
            true
        } else {
            false
        }
    }

    fn admit(&mut self, req: &Request) {
        if req.size > self.capacity {
            log_event("L", self.capacity, req.id, req.size);
            return;
        }
        // at most one resident object per id
        if self.list.remove(req.id).is_some() {
            log_event("e", self.list.bytes(), req.id, req.size);
        }
        while self.list.bytes() + req.size > self.capacity {
            self.evict();
        }
        self.list.push_front(*req);
        log_event("a", self.list.bytes(), req.id, req.size);
    }

    fn evict(&mut self) {
        self.evict_return();
    }

    fn evict_request(&mut self, req: &Request) {
        if self.list.contains(req.id) {
            log_event("e", self.list.bytes(), req.id, req.size);
            self.list.remove(req.id);
        }
    }

    fn set_capacity(&mut self, bytes: u64) {
        self.capacity = bytes;
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn current_size(&self) -> u64 {
        self.list.bytes()
    }
}
