//! Core types and shared functionality for pricewatch.
//!
//! This crate provides:
//! - The normalized price record returned to callers
//! - In-memory fingerprint cache with TTL and size bounds
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod result;

pub use cache::{Clock, FingerprintCache, ManualClock, SystemClock, fingerprint};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use result::ExtractionResult;
