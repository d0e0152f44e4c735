//! Admission only after N observed requests.
//!
//! Keeps a per-id request counter and refuses admission until an id has been
//! requested more than `n` times, filtering one-hit wonders out of the
//! cache. The counter also advances on hits, so a resident object keeps
//! accruing credit and re-admission after an eviction is essentially free.

use rustc_hash::FxHashMap;

use crate::policy::lru::LruCache;
use crate::traits::{Cache, Request, rejected_param, unrecognized_param};

const DEFAULT_N_PARAM: u64 = 2;

/// LRU gated by a per-id request count (parameter `n`, default 2).
#[derive(Debug)]
pub struct FilterCache {
    inner: LruCache,
    n_param: u64,
    filter: FxHashMap<u64, u64>,
}

impl Default for FilterCache {
    fn default() -> Self {
        Self {
            inner: LruCache::default(),
            n_param: DEFAULT_N_PARAM,
            filter: FxHashMap::default(),
        }
    }
}

impl FilterCache {
    /// Creates a filter cache with the given byte capacity.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: LruCache::new(capacity),
            n_param: DEFAULT_N_PARAM,
            filter: FxHashMap::default(),
        }
    }

    /// Returns how often the id has been requested.
    pub fn observed_count(&self, id: u64) -> u64 {
        self.filter.get(&id).copied().unwrap_or(0)
    }

    /// Returns `true` if an object with the id is resident.
    pub fn contains(&self, id: u64) -> bool {
        self.inner.contains(id)
    }
}

impl Cache for FilterCache {
    fn lookup(&mut self, req: &Request) -> bool {
        *self.filter.entry(req.id).or_insert(0) += 1;
        self.inner.lookup(req)
    }

    fn admit(&mut self, req: &Request) {
        if self.observed_count(req.id) <= self.n_param {
            return;
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
    }

    fn capacity(&self) -> u64 {
        self.inner.capacity()
    }

    fn current_size(&self) -> u64 {
        self.inner.current_size()
    }

    fn set_param(&mut self, name: &str, value: &str) {
        if name == "n" {
            match value.parse::<u64>() {
                Ok(n) if n > 0 => self.n_param = n,
                _ => rejected_param(name, value),
            }
        } else {
            unrecognized_param(name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive_miss(cache: &mut FilterCache, req: &Request) {
        if !cache.lookup(req) {
            cache.admit(req);
        }
    }

    #[test]
    fn needs_more_than_n_requests() {
        let mut cache = FilterCache::new(100);

        let a = Request::new(1, 10);
        drive_miss(&mut cache, &a); // count 1: refused
        assert!(!cache.contains(1));
        drive_miss(&mut cache, &a); // count 2: refused
        assert!(!cache.contains(1));
        drive_miss(&mut cache, &a); // count 3 > n=2: admitted
        assert!(cache.contains(1));
    }

    #[test]
    fn hits_keep_accruing_credit() {
        let mut cache = FilterCache::new(100);
        let a = Request::new(1, 10);
        for _ in 0..5 {
            drive_miss(&mut cache, &a);
        }
        assert_eq!(cache.observed_count(1), 5);

        // after eviction, re-admission is immediate
        cache.evict_request(&a);
        assert!(!cache.contains(1));
        drive_miss(&mut cache, &a);
        assert!(cache.contains(1));
    }

    #[test]
    fn n_parameter_raises_the_gate() {
        let mut cache = FilterCache::new(100);
        cache.set_param("n", "4");
        let a = Request::new(1, 10);
        for _ in 0..4 {
            drive_miss(&mut cache, &a);
            assert!(!cache.contains(1));
        }
        drive_miss(&mut cache, &a);
        assert!(cache.contains(1));
    }

    #[test]
    fn zero_n_is_rejected() {
        let mut cache = FilterCache::new(100);
        cache.set_param("n", "0");
        let a = Request::new(1, 10);
        drive_miss(&mut cache, &a);
        // gate still the default 2
        assert!(!cache.contains(1));
    }
}
