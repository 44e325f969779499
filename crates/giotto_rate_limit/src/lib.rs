//! Rate limiting against external provider quotas.
//!
//! This crate provides admission control for calls to external services. A
//! [`RateLimiter`] wraps any async operation with a replenishing token
//! reservoir, an optional minimum spacing between admissions, and an optional
//! ceiling on concurrent in-flight calls. Calls that cannot be admitted
//! immediately queue in strict submission order and resolve once capacity
//! frees up.
//!
//! [`RateLimiter::schedule`] never retries; [`RateLimiter::execute`] is the
//! opt-in variant that retries transient failures with exponential backoff,
//! classified through the `RetryableError` trait rather than by inspecting
//! error message text.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;

pub use config::{RateLimiterConfig, RateLimiterConfigBuilder};
pub use limiter::{RateLimiter, RateLimiterStats};
