//! In-memory cache for extraction results.
//!
//! Results are keyed by a fingerprint of the raw URL and live for a bounded
//! time. The store is process-local and best-effort:
//!
//! - SHA-256 fingerprints of the requested URL
//! - Lazy TTL expiry on read
//! - Oldest-first batch eviction once the store grows past its cap
//! - Injectable clock for deterministic expiry

pub mod clock;
pub mod hash;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use hash::fingerprint;
pub use store::FingerprintCache;
