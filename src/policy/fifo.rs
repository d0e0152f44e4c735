//! First-In First-Out eviction.
//!
//! Identical to [`LruCache`] except that a hit does not reorder: insertion
//! order alone governs eviction.

use crate::policy::lru::LruCache;
use crate::traits::{Cache, Request};

/// FIFO cache over a byte budget.
#[derive(Debug, Default)]
pub struct FifoCache {
    inner: LruCache,
}

impl FifoCache {
    /// Creates a FIFO cache with the given byte capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: LruCache::new(capacity),
        }
    }

    /// Returns `true` if an object with the id is resident.
    pub fn contains(&self, id: u64) -> bool {
        self.inner.contains(id)
    }

    /// Returns the number of resident objects.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if no object is resident.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Cache for FifoCache {
    fn lookup(&mut self, req: &Request) -> bool {
        self.inner.lookup_keep_order(req)
    }

    fn admit(&mut self, req: &Request) {
        self.inner.admit(req);
    }

    fn evict(&mut self) {
        self.inner.evict();
    }

    fn evict_request(&mut self, req: &Request) {
        self.inner.evict_request(req);
    }

    fn set_capacity(&mut self, bytes: u64) {
        self.inner.set_capacity(bytes);
    }

    fn capacity(&self) -> u64 {
        self.inner.capacity()
    }

    fn current_size(&self) -> u64 {
        self.inner.current_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_do_not_save_the_oldest() {
        let mut cache = FifoCache::new(10);
        cache.admit(&Request::new(1, 5));
        cache.admit(&Request::new(2, 4));

        // a hit on 1 would save it under LRU; FIFO still evicts it first
        assert!(cache.lookup(&Request::new(1, 5)));
        cache.admit(&Request::new(3, 4));

        assert!(!cache.contains(1));
        assert!(cache.contains(2));
        assert!(cache.contains(3));
    }

    #[test]
    fn lookup_misses_on_absent_id() {
        let mut cache = FifoCache::new(10);
        assert!(!cache.lookup(&Request::new(7, 1)));
    }

    #[test]
    fn eviction_follows_insertion_order() {
        let mut cache = FifoCache::new(3);
        cache.admit(&Request::new(1, 1));
        cache.admit(&Request::new(2, 1));
        cache.admit(&Request::new(3, 1));
        cache.lookup(&Request::new(1, 1));
        cache.lookup(&Request::new(2, 1));

        cache.admit(&Request::new(4, 1));
        assert!(!cache.contains(1));
        cache.admit(&Request::new(5, 1));
        assert!(!cache.contains(2));
    }
}
