//! Short-lived in-memory response cache.
//!
//! Entries are keyed by the request path plus query and judged fresh lazily
//! at lookup time against a fixed time-to-live. Nothing is persisted.

mod clock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use store::{CacheEntry, ResponseCache, CACHE_TTL};
