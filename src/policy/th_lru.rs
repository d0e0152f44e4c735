//! LRU eviction with a hard size admission threshold.

use crate::policy::lru::LruCache;
use crate::traits::{Cache, Request, rejected_param, unrecognized_param};

const DEFAULT_THRESHOLD: u64 = 524288;

/// LRU that refuses objects at or above a size threshold.
///
/// The threshold is set through parameter `t` as a log2 exponent:
/// `set_param("t", "17")` admits only objects smaller than 128 KiB.
#[derive(Debug)]
pub struct ThLruCache {
    inner: LruCache,
    size_threshold: u64,
}

impl Default for ThLruCache {
    fn default() -> Self {
        Self {
            inner: LruCache::default(),
            size_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl ThLruCache {
    /// Creates a threshold LRU with the given byte capacity and the default
    /// 512 KiB threshold.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: LruCache::new(capacity),
            size_threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Returns the current admission threshold in bytes.
    pub fn size_threshold(&self) -> u64 {
        self.size_threshold
    }

    /// Returns `true` if an object with the id is resident.
    pub fn contains(&self, id: u64) -> bool {
        self.inner.contains(id)
    }
}

impl Cache for ThLruCache {
    fn lookup(&mut self, req: &Request) -> bool {
        self.inner.lookup(req)
    }

    fn admit(&mut self, req: &Request) {
        if req.size < self.size_threshold {
            self.inner.admit(req);
        }
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
        if name == "t" {
            match value.parse::<f64>() {
                Ok(t) if t > 0.0 => self.size_threshold = f64::powf(2.0, t) as u64,
                _ => rejected_param(name, value),
            }
        } else {
            unrecognized_param(name);
        }
    }
}
