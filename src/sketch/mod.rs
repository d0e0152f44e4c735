pub mod count_min;
pub mod door_keeper;

pub use count_min::{COUNTER_MAX, CountMinSketch};
pub use door_keeper::DoorKeeper;

/// Seed used by the frequency policies when they build their own sketches.
pub const DEFAULT_SKETCH_SEED: u64 = 1033096058;
