//! Rate limiter error types.

/// Specific error conditions for rate limiting operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum RateLimitErrorKind {
    /// Limiter was stopped with pending work discarded
    #[display("Rate limiter '{}' stopped, queued call discarded", _0)]
    QueueDrained(String),
    /// Call submitted after the limiter stopped accepting work
    #[display("Rate limiter '{}' is stopped", _0)]
    Stopped(String),
    /// Invalid limiter configuration
    #[display("Invalid rate limiter configuration: {}", _0)]
    InvalidConfig(String),
}

/// Rate limiting error with source location tracking.
///
/// # Examples
///
/// ```
/// use giotto_error::{RateLimitError, RateLimitErrorKind};
///
/// let err = RateLimitError::new(RateLimitErrorKind::Stopped("social".to_string()));
/// assert!(format!("{}", err).contains("stopped"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Rate Limit Error: {} at line {} in {}", kind, line, file)]
pub struct RateLimitError {
    /// The kind of error that occurred
    pub kind: RateLimitErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl RateLimitError {
    /// Create a new RateLimitError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: RateLimitErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
