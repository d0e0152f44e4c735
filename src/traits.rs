//! # Cache Policy Contract
//!
//! Every policy in this crate is driven through the same [`Cache`] trait, so
//! a simulator can swap eviction strategies behind `Box<dyn Cache>` without
//! touching the request loop.
//!
//! ## Contract
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────┐
//!   │                     Cache                            │
//!   │                                                      │
//!   │  lookup(&mut, &Request) → bool     hit test + touch  │
//!   │  admit(&mut, &Request)             policy admission  │
//!   │  evict(&mut)                       drop one victim   │
//!   │  evict_request(&mut, &Request)     drop specific id  │
//!   │  set_capacity(&mut, u64)           byte budget       │
//!   │  capacity(&) → u64                                   │
//!   │  current_size(&) → u64                               │
//!   │  set_param(&mut, &str, &str)       policy tuning     │
//!   └──────────────────────────────────────────────────────┘
//! ```
//!
//! The simulator's request loop is always `lookup` first, then `admit` on a
//! miss. `lookup` is read-only with respect to `current_size`; after any
//! operation `current_size <= capacity` holds.
//!
//! ## Parameters
//!
//! | Policy      | Name | Meaning                              |
//! |-------------|------|--------------------------------------|
//! | ThLRU       | `t`  | log2 of the size admission threshold |
//! | ExpLRU      | `c`  | log2 of the admission scale          |
//! | FilterCache | `n`  | required request count before admit  |
//! | AdaptSize   | `t`  | reconfiguration interval (requests)  |
//! | AdaptSize   | `i`  | max golden-section iterations        |
//! | W-TinyLFU   | any  | window percentage, 0..=100           |
//!
//! Unknown names emit one diagnostic line and are otherwise ignored.

use std::fmt;

/// A single request against the cache: an object id and its size in bytes.
///
/// Two requests are identical iff both fields match. An admission for an id
/// already resident with a different size is treated as a new object; size
/// changes are never tracked implicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Request {
    pub id: u64,
    pub size: u64,
}

impl Request {
    /// Creates a request for object `id` of `size` bytes.
    #[inline]
    pub fn new(id: u64, size: u64) -> Self {
        Self { id, size }
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}B", self.id, self.size)
    }
}

/// Common contract implemented by every cache policy.
///
/// # Example
///
/// ```
/// use cachesim::policy::lru::LruCache;
/// use cachesim::traits::{Cache, Request};
///
/// let mut cache = LruCache::new(10);
/// let a = Request::new(1, 5);
/// assert!(!cache.lookup(&a));
/// cache.admit(&a);
/// assert!(cache.lookup(&a));
/// assert_eq!(cache.current_size(), 5);
/// ```
pub trait Cache {
    /// Searches for the request's id. Policies with a recency order move the
    /// object to the most-recently-used position on hit.
    fn lookup(&mut self, req: &Request) -> bool;

    /// Offers the object for admission after a miss. The policy may refuse;
    /// on success it evicts until the object fits, then inserts it.
    fn admit(&mut self, req: &Request);

    /// Evicts one object chosen by the policy. No-op on an empty cache.
    fn evict(&mut self);

    /// Evicts the object with the request's id, if resident. Idempotent.
    fn evict_request(&mut self, req: &Request);

    /// Sets the byte budget. Only records the new value; resident objects
    /// are displaced by subsequent admissions, not eagerly.
    fn set_capacity(&mut self, bytes: u64);

    /// Returns the byte budget.
    fn capacity(&self) -> u64;

    /// Returns the byte sum of resident objects.
    fn current_size(&self) -> u64;

    /// Sets a policy tuning parameter from its string form. Unknown names
    /// and malformed values emit a single diagnostic and are ignored.
    fn set_param(&mut self, name: &str, value: &str) {
        let _ = value;
        unrecognized_param(name);
    }
}

/// Emits the single diagnostic line required for unrecognized parameters.
pub(crate) fn unrecognized_param(name: &str) {
    tracing::warn!(parameter = name, "unrecognized parameter");
}

/// Emits the diagnostic for a recognized parameter with a bad value.
pub(crate) fn rejected_param(name: &str, value: &str) {
    tracing::warn!(parameter = name, value, "ignoring out-of-range parameter value");
}
