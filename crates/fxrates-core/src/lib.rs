//! Core request-pipeline contracts for fxrates.
//!
//! This crate contains:
//! - Canonical date format, bounds, and validation
//! - Range normalization for date-span queries
//! - The stacked rolling-window rate gate
//! - The TTL response cache

pub mod cache;
pub mod dates;
pub mod error;
pub mod limiter;

pub use cache::{CachedResponse, ResponseCache};
pub use dates::{normalize_range, validate, DateBounds, DATE_FORMAT};
pub use error::{DateError, DateField, InvertedBounds};
pub use limiter::{GatePolicy, QuotaRule, RateGate};
