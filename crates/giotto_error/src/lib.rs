//! Error types for the Giotto library.
//!
//! This crate provides the foundation error types used throughout the Giotto
//! ecosystem.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use giotto_error::{ConfigError, GiottoResult};
//!
//! fn load_profile() -> GiottoResult<String> {
//!     Err(ConfigError::new("Missing service profile"))?
//! }
//!
//! match load_profile() {
//!     Ok(profile) => println!("Got: {}", profile),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod breaker;
mod config;
mod error;
mod operation;
mod pipeline;
mod rate_limit;

pub use breaker::{BreakerError, BreakerErrorKind};
pub use config::ConfigError;
pub use error::{GiottoError, GiottoErrorKind, GiottoResult};
pub use operation::{OperationError, OperationErrorKind, RetryableError};
pub use pipeline::{PipelineError, PipelineErrorKind};
pub use rate_limit::{RateLimitError, RateLimitErrorKind};
