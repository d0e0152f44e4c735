//! TinyLFU: frequency-gated admission over an LRU victim.
//!
//! An LRU whose eviction loop consults a Count-Min sketch: the tail is
//! displaced only when its frequency estimate is strictly below the
//! incoming candidate's. If the comparison fails, eviction stops and the
//! candidate is not admitted, so an incoming cold object can never push out
//! a hot one.

use crate::policy::log_event;
use crate::policy::lru::LruCache;
use crate::sketch::{CountMinSketch, DEFAULT_SKETCH_SEED};
use crate::traits::{Cache, Request};

/// LRU with a Count-Min admission gate.
#[derive(Debug)]
pub struct TinyLfuCache {
    inner: LruCache,
    sketch: CountMinSketch,
}

impl Default for TinyLfuCache {
    fn default() -> Self {
        Self::new(LruCache::default().capacity())
    }
}

impl TinyLfuCache {
    /// Creates a TinyLFU cache with the given byte capacity. The sketch is
    /// sized like W-TinyLFU's: width `capacity / 2`, depth 2.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: LruCache::new(capacity),
            sketch: CountMinSketch::new(capacity / 2, 2, DEFAULT_SKETCH_SEED),
        }
    }

    /// Returns the sketch's frequency estimate for the id.
    pub fn frequency_estimate(&self, id: u64) -> u8 {
        self.sketch.point_est(id)
    }

    /// Returns `true` if an object with the id is resident.
    pub fn contains(&self, id: u64) -> bool {
        self.inner.contains(id)
    }

    /// Removes the tail only if it is strictly colder than `candidate`;
    /// returns the victim, or `None` when the tail defended its slot.
    fn evict_return_if_colder(&mut self, candidate: u64) -> Option<Request> {
        let victim = self.inner.peek_lru()?;
        if self.sketch.point_est(victim.id) < self.sketch.point_est(candidate) {
            self.inner.evict_return()
        } else {
            None
        }
    }
}

impl Cache for TinyLfuCache {
    fn lookup(&mut self, req: &Request) -> bool {
        self.sketch.update(req.id, 1);
        self.inner.lookup(req)
    }

    fn admit(&mut self, req: &Request) {
        if req.size > self.inner.capacity() {
            log_event("L", self.inner.capacity(), req.id, req.size);
            return;
        }
        while self.inner.current_size() + req.size > self.inner.capacity() {
            if self.evict_return_if_colder(req.id).is_none() {
                // the tail is at least as popular as the candidate
                return;
            }
        }
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
        self.sketch = CountMinSketch::new(bytes / 2, 2, DEFAULT_SKETCH_SEED);
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

    fn drive(cache: &mut TinyLfuCache, req: &Request) {
        if !cache.lookup(req) {
            cache.admit(req);
        }
    }

    #[test]
    fn cold_candidate_cannot_displace_a_hot_tail() {
        // capacity 2, unit sizes, request sequence A,A,A,B,C
        let mut cache = TinyLfuCache::new(2);
        let (a, b, c) = (Request::new(1, 1), Request::new(2, 1), Request::new(3, 1));

        drive(&mut cache, &a);
        drive(&mut cache, &a);
        drive(&mut cache, &a);
        drive(&mut cache, &b);
        drive(&mut cache, &c);

        assert!(cache.contains(a.id));
        assert!(cache.contains(b.id));
        assert!(!cache.contains(c.id));
    }

    #[test]
    fn hot_candidate_displaces_a_cold_tail() {
        let mut cache = TinyLfuCache::new(2);
        let (a, b, c) = (Request::new(1, 1), Request::new(2, 1), Request::new(3, 1));

        drive(&mut cache, &a);
        drive(&mut cache, &b);
        // c becomes hotter than both residents before its admission attempt
        cache.lookup(&c);
        cache.lookup(&c);
        drive(&mut cache, &c);

        assert!(cache.contains(c.id));
        assert_eq!(cache.current_size(), 2);
    }

    #[test]
    fn abandoned_admission_leaves_size_unchanged() {
        let mut cache = TinyLfuCache::new(4);
        let a = Request::new(1, 4);
        drive(&mut cache, &a);
        drive(&mut cache, &a);

        let before = cache.current_size();
        // one-shot candidate needs the whole budget but is colder than a
        drive(&mut cache, &Request::new(2, 4));
        assert_eq!(cache.current_size(), before);
        assert!(cache.contains(1));
    }

    #[test]
    fn lookup_counts_frequency_even_on_miss() {
        let mut cache = TinyLfuCache::new(10);
        let a = Request::new(1, 1);
        cache.lookup(&a);
        cache.lookup(&a);
        assert_eq!(cache.frequency_estimate(1), 2);
    }

    #[test]
    fn oversized_request_is_refused() {
        let mut cache = TinyLfuCache::new(4);
        cache.admit(&Request::new(1, 5));
        assert_eq!(cache.current_size(), 0);
    }
}
