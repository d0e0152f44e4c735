//! LRU eviction with size-aware probabilistic admission.

use rand::Rng;

use crate::policy::lru::LruCache;
use crate::rng;
use crate::traits::{Cache, Request, rejected_param, unrecognized_param};

const DEFAULT_C_PARAM: f64 = 262144.0;

/// LRU that admits an object with probability `exp(-size / c)`.
///
/// Large objects are exponentially less likely to enter, which protects the
/// cache from being flushed by a few big one-hit wonders. The scale is set
/// through parameter `c` as a log2 exponent. Draws come from the
/// process-wide generator in [`crate::rng`], so runs replay under a fixed
/// seed.
#[derive(Debug)]
pub struct ExpLruCache {
    inner: LruCache,
    c_param: f64,
}

impl Default for ExpLruCache {
    fn default() -> Self {
        Self {
            inner: LruCache::default(),
            c_param: DEFAULT_C_PARAM,
        }
    }
}

impl ExpLruCache {
    /// Creates an ExpLRU with the given byte capacity and the default scale.
    pub fn new(capacity: u64) -> Self {
        Self {
            inner: LruCache::new(capacity),
            c_param: DEFAULT_C_PARAM,
        }
    }

    /// Returns the admission scale `c`.
    pub fn c_param(&self) -> f64 {
        self.c_param
    }

    /// Returns `true` if an object with the id is resident.
    pub fn contains(&self, id: u64) -> bool {
        self.inner.contains(id)
    }

    /// Returns the number of resident objects.
    pub fn len(&self) -> usize {
        self.inner.len()
    }
}

impl Cache for ExpLruCache {
    fn lookup(&mut self, req: &Request) -> bool {
        self.inner.lookup(req)
    }

    fn admit(&mut self, req: &Request) {
        let admission_prob = f64::exp(-(req.size as f64) / self.c_param);
        if rng::with(|r| r.gen_bool(admission_prob)) {
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
        if name == "c" {
            match value.parse::<f64>() {
                Ok(c) if c > 0.0 => self.c_param = f64::powf(2.0, c),
                _ => rejected_param(name, value),
            }
        } else {
            unrecognized_param(name);
        }
    }
}
