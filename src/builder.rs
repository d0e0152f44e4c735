//! Unified cache builder for all eviction policies.
//!
//! Provides a simple API to create caches behind the common [`Cache`]
//! contract, including construction from the policy names a trace driver
//! passes on its command line.
//!
//! ## Example
//!
//! ```
//! use cachesim::builder::{CacheBuilder, PolicyKind};
//! use cachesim::traits::{Cache, Request};
//!
//! let mut cache = CacheBuilder::new(100).build(PolicyKind::Lru);
//! cache.admit(&Request::new(1, 40));
//! assert!(cache.lookup(&Request::new(1, 40)));
//! ```

use std::str::FromStr;

use crate::error::ConfigError;
use crate::policy::adapt_size::AdaptSizeCache;
use crate::policy::exp_lru::ExpLruCache;
use crate::policy::fifo::FifoCache;
use crate::policy::filter::FilterCache;
use crate::policy::lru::LruCache;
use crate::policy::s4_lru::S4LruCache;
use crate::policy::slru::SlruCache;
use crate::policy::th_lru::ThLruCache;
use crate::policy::tiny_lfu::TinyLfuCache;
use crate::policy::w_tiny_lfu::WTinyLfuCache;
use crate::traits::Cache;

/// Available cache eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Least Recently Used eviction.
    Lru,
    /// First In, First Out eviction.
    Fifo,
    /// LRU with a hard size admission threshold.
    ThLru,
    /// LRU with exponential-in-size probabilistic admission.
    ExpLru,
    /// LRU admitting only after more than `n` observed requests.
    Filter,
    /// Self-tuning size-aware admission over LRU.
    AdaptSize,
    /// Segmented four-level LRU.
    S4Lru,
    /// Two-segment SLRU (probationary/protected).
    Slru,
    /// Frequency-gated LRU with a Count-Min sketch.
    TinyLfu,
    /// Windowed TinyLFU with an adaptive window.
    WTinyLfu,
}

impl FromStr for PolicyKind {
    type Err = ConfigError;

    /// Parses the policy names used by the trace driver.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "LRU" => Ok(Self::Lru),
            "FIFO" => Ok(Self::Fifo),
            "ThLRU" => Ok(Self::ThLru),
            "ExpLRU" => Ok(Self::ExpLru),
            "Filter" => Ok(Self::Filter),
            "AdaptSize" => Ok(Self::AdaptSize),
            "S4LRU" => Ok(Self::S4Lru),
            "SLRU" => Ok(Self::Slru),
            "TinyLFU" => Ok(Self::TinyLfu),
            "W-TinyLFU" | "WTinyLFU" => Ok(Self::WTinyLfu),
            other => Err(ConfigError::new(format!("unknown policy: {other}"))),
        }
    }
}

/// Builder for creating cache instances.
pub struct CacheBuilder {
    capacity: u64,
}

impl CacheBuilder {
    /// Creates a builder with the given byte capacity.
    pub fn new(capacity: u64) -> Self {
        Self { capacity }
    }

    /// Builds a cache with the given policy.
    pub fn build(self, kind: PolicyKind) -> Box<dyn Cache> {
        match kind {
            PolicyKind::Lru => Box::new(LruCache::new(self.capacity)),
            PolicyKind::Fifo => Box::new(FifoCache::new(self.capacity)),
            PolicyKind::ThLru => Box::new(ThLruCache::new(self.capacity)),
            PolicyKind::ExpLru => Box::new(ExpLruCache::new(self.capacity)),
            PolicyKind::Filter => Box::new(FilterCache::new(self.capacity)),
            PolicyKind::AdaptSize => Box::new(AdaptSizeCache::new(self.capacity)),
            PolicyKind::S4Lru => Box::new(S4LruCache::new(self.capacity)),
            PolicyKind::Slru => Box::new(SlruCache::new(self.capacity)),
            PolicyKind::TinyLfu => Box::new(TinyLfuCache::new(self.capacity)),
            PolicyKind::WTinyLfu => Box::new(WTinyLfuCache::new(self.capacity)),
        }
    }

    /// Builds a cache from a trace-driver policy name.
    pub fn try_build(self, name: &str) -> Result<Box<dyn Cache>, ConfigError> {
        Ok(self.build(name.parse()?))
    }
}
