//! Process-wide pseudo-random generator for the randomized policies.
//!
//! ExpLRU's Bernoulli admission and AdaptSize's uniform draw share one
//! generator, seeded once, so a simulation replays identically for a given
//! seed. Call [`reseed`] before traffic begins to make runs reproducible.
//!
//! Single-threaded simulators only contend on this lock with themselves;
//! the mutex exists so the generator can live in a `static`.

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const DEFAULT_SEED: u64 = 1969;

static GENERATOR: Lazy<Mutex<SmallRng>> =
    Lazy::new(|| Mutex::new(SmallRng::seed_from_u64(DEFAULT_SEED)));

/// Re-seeds the process-wide generator. Affects every randomized policy
/// from the next draw onward.
pub fn reseed(seed: u64) {
    *GENERATOR.lock() = SmallRng::seed_from_u64(seed);
}

/// Runs `f` with exclusive access to the process-wide generator.
pub fn with<R>(f: impl FnOnce(&mut SmallRng) -> R) -> R {
    f(&mut GENERATOR.lock())
}
