//! Segmented four-level LRU.
//!
//! Four independent LRU segments with equal byte budgets (rounding
//! remainder to segment 0). New objects enter segment 0; a hit in segment
//! `i < 3` promotes the object to segment `i + 1`. Promotion into a full
//! segment demotes that segment's LRU victims one level down, cascading
//! until everything fits, so an object must keep earning hits to stay in
//! the upper levels.
//!
//! ```text
//!   admit ──► [seg 0] ─hit─► [seg 1] ─hit─► [seg 2] ─hit─► [seg 3]
//!   evict ◄──   ▲ ◄─demote──   ▲ ◄─demote──   ▲ ◄─demote──
//! ```

use crate::policy::lru::LruCache;
use crate::traits::{Cache, Request};

const SEGMENTS: usize = 4;

/// Four-segment LRU over a byte budget.
#[derive(Debug)]
pub struct S4LruCache {
    segments: [LruCache; SEGMENTS],
    capacity: u64,
}

impl Default for S4LruCache {
    fn default() -> Self {
        Self::new(LruCache::default().capacity())
    }
}

impl S4LruCache {
    /// Creates an S4LRU cache with the given total byte capacity.
    pub fn new(capacity: u64) -> Self {
        let mut cache = Self {
            segments: std::array::from_fn(|_| LruCache::new(0)),
            capacity: 0,
        };
        cache.set_capacity(capacity);
        cache
    }

    /// Returns the index of the segment holding the id, if resident.
    pub fn segment_of(&self, id: u64) -> Option<usize> {
        self.segments.iter().position(|segment| segment.contains(id))
    }

    /// Returns `true` if an object with the id is resident in any segment.
    pub fn contains(&self, id: u64) -> bool {
        self.segment_of(id).is_some()
    }

    fn segment_admit(&mut self, idx: usize, req: &Request) {
        if idx == 0 {
            self.segments[0].admit(req);
            return;
        }
        while self.segments[idx].current_size() + req.size > self.segments[idx].capacity() {
            // demote this segment's victim one level down
            match self.segments[idx].evict_return() {
                Some(victim) => self.segment_admit(idx - 1, &victim),
                None => break,
            }
        }
        self.segments[idx].admit(req);
    }
}

impl Cache for S4LruCache {
    fn lookup(&mut self, req: &Request) -> bool {
        for idx in 0..SEGMENTS {
            if self.segments[idx].lookup(req) {
                if idx < SEGMENTS - 1 {
                    self.segments[idx].evict_request(req);
                    self.segment_admit(idx + 1, req);
                }
                return true;
            }
        }
        false
    }

    fn admit(&mut self, req: &Request) {
        self.segments[0].admit(req);
    }

    fn evict(&mut self) {
        self.segments[0].evict();
    }

    fn evict_request(&mut self, req: &Request) {
        for segment in &mut self.segments {
            segment.evict_request(req);
        }
    }

    fn set_capacity(&mut self, bytes: u64) {
        self.capacity = bytes;
        let per_segment = bytes / SEGMENTS as u64;
        let mut remainder = bytes;
        for segment in &mut self.segments {
            segment.set_capacity(per_segment);
            remainder -= per_segment;
        }
        if remainder > 0 {
            self.segments[0].set_capacity(per_segment + remainder);
        }
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn current_size(&self) -> u64 {
        self.segments.iter().map(|segment| segment.current_size()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_splits_evenly_with_remainder_to_segment_zero() {
        let cache = S4LruCache::new(10);
        assert_eq!(cache.segments[0].capacity(), 4);
        assert_eq!(cache.segments[1].capacity(), 2);
        assert_eq!(cache.segments[2].capacity(), 2);
        assert_eq!(cache.segments[3].capacity(), 2);
        assert_eq!(cache.capacity(), 10);
    }

    #[test]
    fn hits_climb_the_segments() {
        let mut cache = S4LruCache::new(8);
        let a = Request::new(1, 1);
        cache.admit(&a);
        assert_eq!(cache.segment_of(1), Some(0));

        assert!(cache.lookup(&a));
        assert_eq!(cache.segment_of(1), Some(1));
        assert!(cache.lookup(&a));
        assert_eq!(cache.segment_of(1), Some(2));
        assert!(cache.lookup(&a));
        assert_eq!(cache.segment_of(1), Some(3));

        // already at the top: another hit stays put
        assert!(cache.lookup(&a));
        assert_eq!(cache.segment_of(1), Some(3));
    }

    #[test]
    fn promotion_demotes_the_target_segment_victim() {
        let mut cache = S4LruCache::new(8);
        let (a, b, c) = (Request::new(1, 1), Request::new(2, 1), Request::new(3, 1));
        for req in [&a, &b, &c] {
            cache.admit(req);
            assert!(cache.lookup(req));
        }
        // segment 1 holds 2 bytes at most: promoting c demoted a
        assert_eq!(cache.segment_of(1), Some(0));
        assert_eq!(cache.segment_of(2), Some(1));
        assert_eq!(cache.segment_of(3), Some(1));
    }

    #[test]
    fn no_segment_exceeds_its_capacity() {
        let mut cache = S4LruCache::new(8);
        for id in 0..20u64 {
            let req = Request::new(id, 1);
            if !cache.lookup(&req) {
                cache.admit(&req);
            }
            // re-request half of them to drive promotions
            if id % 2 == 0 {
                cache.lookup(&req);
            }
            for segment in &cache.segments {
                assert!(segment.current_size() <= segment.capacity());
            }
        }
        assert!(cache.current_size() <= cache.capacity());
    }

    #[test]
    fn evict_request_reaches_every_segment() {
        let mut cache = S4LruCache::new(8);
        let a = Request::new(1, 1);
        cache.admit(&a);
        cache.lookup(&a);
        assert_eq!(cache.segment_of(1), Some(1));

        cache.evict_request(&a);
        assert!(!cache.contains(1));
    }

    #[test]
    fn evict_drains_segment_zero() {
        let mut cache = S4LruCache::new(8);
        cache.admit(&Request::new(1, 1));
        cache.admit(&Request::new(2, 1));
        cache.evict();
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
    }
}
