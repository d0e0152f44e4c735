//! Two-segment SLRU, the main store of W-TinyLFU.
//!
//! A probationary segment (20% of the budget) and a protected segment
//! (80%); a hit in probationary promotes to protected, with protected's
//! victims demoted back rather than dropped. The cache also owns the
//! frequency machinery W-TinyLFU consults: a Count-Min sketch (width
//! `total/2`, depth 2) and a door-keeper (width `total`, one hash).
//!
//! [`admit_from_window`] is the TinyLFU filter between the window's losing
//! candidate and this cache's own losing candidate: probationary is
//! pre-evicted until the incoming fits, and the last expelled victim's
//! `door_keeper + count_min` estimate is compared against the incoming's;
//! whichever is strictly hotter gets the slot (ties favor the incoming).
//! Victims expelled before the last one are discarded outright.
//!
//! [`admit_from_window`]: SlruCache::admit_from_window

use crate::policy::log_event;
use crate::policy::lru::LruCache;
use crate::sketch::{COUNTER_MAX, CountMinSketch, DEFAULT_SKETCH_SEED, DoorKeeper};
use crate::traits::{Cache, Request};

const SEGMENTS: usize = 2;
const PROBATIONARY_FRAC: f64 = 0.2;
const PROTECTED_FRAC: f64 = 0.8;

/// Two-segment SLRU with the W-TinyLFU frequency sketches.
#[derive(Debug)]
pub struct SlruCache {
    segments: [LruCache; SEGMENTS],
    capacity: u64,
    count_min: CountMinSketch,
    door_keeper: DoorKeeper,
}

impl Default for SlruCache {
    fn default() -> Self {
        Self::new(LruCache::default().capacity())
    }
}

impl SlruCache {
    /// Creates an SLRU with the given total byte capacity; sketches are
    /// initialized against the same total.
    pub fn new(capacity: u64) -> Self {
        let mut cache = Self {
            segments: std::array::from_fn(|_| LruCache::new(0)),
            capacity: 0,
            count_min: CountMinSketch::new(capacity / 2, 2, DEFAULT_SKETCH_SEED),
            door_keeper: DoorKeeper::new(capacity, 1, DEFAULT_SKETCH_SEED),
        };
        cache.set_capacity(capacity);
        cache
    }

    /// Rebuilds the sketch and door-keeper sized against `total` bytes
    /// (window plus main under W-TinyLFU).
    pub fn init_sketches(&mut self, total: u64) {
        self.count_min = CountMinSketch::new(total / 2, 2, DEFAULT_SKETCH_SEED);
        self.door_keeper = DoorKeeper::new(total, 1, DEFAULT_SKETCH_SEED);
    }

    /// Bumps the id's sketch counter; a saturated counter flushes the
    /// door-keeper, which bounds the filter's false-positive rate.
    pub fn update_count_min(&mut self, id: u64) {
        if self.count_min.update(id, 1) == COUNTER_MAX {
            self.door_keeper.reset();
        }
    }

    /// Marks the id in the door-keeper.
    pub fn update_door_keeper(&mut self, id: u64) {
        self.door_keeper.update(id);
    }

    /// Returns `true` if the door-keeper has seen the id since its last
    /// flush.
    pub fn door_keeper_contains(&self, id: u64) -> bool {
        self.door_keeper.point_est(id) > 0
    }

    /// Combined frequency estimate used by the admission comparisons.
    pub fn frequency_estimate(&self, id: u64) -> u32 {
        self.count_min.point_est(id) as u32 + self.door_keeper.point_est(id) as u32
    }

    /// Admits a victim just expelled from the W-TinyLFU window, filtered
    /// against this cache's own losing candidate.
    pub fn admit_from_window(&mut self, req: &Request) {
        if req.size > self.segments[0].capacity() {
            log_event("L", self.capacity, req.id, req.size);
            return;
        }
        let mut last_victim: Option<Request> = None;
        while self.segments[0].current_size() + req.size > self.segments[0].capacity() {
            match self.segments[0].evict_return() {
                Some(victim) => last_victim = Some(victim),
                None => break,
            }
        }
        match last_victim {
            Some(victim) => {
                log_event("a", self.current_size(), req.id, req.size);
                if self.frequency_estimate(victim.id) > self.frequency_estimate(req.id) {
                    self.segments[0].admit(&victim);
                } else {
                    self.segments[0].admit(req);
                }
            },
            None => self.segments[0].admit(req),
        }
    }

    /// Admits into segment `idx`, demoting that segment's victims one level
    /// down until the incoming fits.
    pub fn segment_admit(&mut self, idx: usize, req: &Request) {
        if idx == 0 {
            self.segments[0].admit(req);
            return;
        }
        while self.segments[idx].current_size() + req.size > self.segments[idx].capacity() {
            match self.segments[idx].evict_return() {
                Some(victim) => self.segment_admit(idx - 1, &victim),
                None => break,
            }
        }
        self.segments[idx].admit(req);
    }

    /// Removes and returns the LRU object of segment `idx`.
    pub fn evict_return_from(&mut self, idx: usize) -> Option<Request> {
        self.segments[idx].evict_return()
    }

    /// Returns the byte sum resident in segment `idx`.
    pub fn segment_current_size(&self, idx: usize) -> u64 {
        self.segments[idx].current_size()
    }

    /// Returns the byte budget of segment `idx`.
    pub fn segment_capacity(&self, idx: usize) -> u64 {
        self.segments[idx].capacity()
    }

    /// Returns the index of the segment holding the id, if resident.
    pub fn segment_of(&self, id: u64) -> Option<usize> {
        self.segments.iter().position(|segment| segment.contains(id))
    }

    /// Returns `true` if an object with the id is resident in any segment.
    pub fn contains(&self, id: u64) -> bool {
        self.segment_of(id).is_some()
    }
}

impl Cache for SlruCache {
    fn lookup(&mut self, req: &Request) -> bool {
        for idx in 0..SEGMENTS {
            if self.segments[idx].lookup(req) {
                if idx == 0 {
                    self.segments[0].evict_request(req);
                    self.segment_admit(1, req);
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
        let probationary = (bytes as f64 * PROBATIONARY_FRAC).floor() as u64;
        let protected = (bytes as f64 * PROTECTED_FRAC).floor() as u64;
        let remainder = bytes - probationary - protected;
        self.segments[0].set_capacity(probationary + remainder);
        self.segments[1].set_capacity(protected);
    }

    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn current_size(&self) -> u64 {
        self.segments.iter().map(|segment| segment.current_size()).sum()
    }
}
