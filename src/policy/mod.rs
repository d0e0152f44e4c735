pub mod adapt_size;
pub mod exp_lru;
pub mod fifo;
pub mod filter;
pub mod lru;
pub mod s4_lru;
pub mod slru;
pub mod th_lru;
pub mod tiny_lfu;
pub mod w_tiny_lfu;

/// One-letter event channel: `h` hit, `a` admit, `e` evict, `L` rejected as
/// oversized. Informational only; nothing in the crate reads it back.
pub(crate) fn log_event(event: &str, current_size: u64, id: u64, size: u64) {
    tracing::trace!(target: "cachesim::events", event, current_size, id, size);
}
