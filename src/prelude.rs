pub use crate::builder::{CacheBuilder, PolicyKind};
pub use crate::ds::RecencyList;
pub use crate::policy::adapt_size::AdaptSizeCache;
pub use crate::policy::exp_lru::ExpLruCache;
pub use crate::policy::fifo::FifoCache;
pub use crate::policy::filter::FilterCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::s4_lru::S4LruCache;
pub use crate::policy::slru::SlruCache;
pub use crate::policy::th_lru::ThLruCache;
pub use crate::policy::tiny_lfu::TinyLfuCache;
pub use crate::policy::w_tiny_lfu::WTinyLfuCache;
pub use crate::sketch::{CountMinSketch, DoorKeeper};
pub use crate::traits::{Cache, Request};
