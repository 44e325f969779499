//! Operation error types and retry classification.

/// Failure conditions for a protected external call.
///
/// These cover the ways a call to a social platform or generation API can
/// fail once it has been admitted by the breaker and the rate limiter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum OperationErrorKind {
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    Http {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Network-level failure before a response arrived
    #[display("Network error: {}", _0)]
    Network(String),
    /// Provider signalled quota exhaustion
    #[display("Rate limited by provider: {}", _0)]
    RateLimited(String),
    /// Response arrived but could not be interpreted
    #[display("Invalid response: {}", _0)]
    InvalidResponse(String),
    /// Provider rejected the request outright
    #[display("Provider error: {}", _0)]
    Provider(String),
}

impl OperationErrorKind {
    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            OperationErrorKind::Http { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            OperationErrorKind::Network(_) => true,
            OperationErrorKind::RateLimited(_) => true,
            _ => false,
        }
    }

    /// Get retry strategy parameters for this error type.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    pub fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self {
            OperationErrorKind::Http { status_code, .. } => match *status_code {
                429 => (5000, 3, 40),
                503 => (2000, 5, 60),
                500 | 502 | 504 => (1000, 3, 8),
                408 => (2000, 4, 30),
                _ => (2000, 5, 60),
            },
            OperationErrorKind::RateLimited(_) => (5000, 3, 40),
            OperationErrorKind::Network(_) => (2000, 5, 60),
            _ => (2000, 5, 60),
        }
    }
}

/// Operation error with source location tracking.
///
/// # Examples
///
/// ```
/// use giotto_error::{OperationError, OperationErrorKind};
///
/// let err = OperationError::new(OperationErrorKind::Http {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(format!("{}", err).contains("503"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Operation Error: {} at line {} in {}", kind, line, file)]
pub struct OperationError {
    /// The kind of error that occurred
    pub kind: OperationErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl OperationError {
    /// Create a new OperationError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: OperationErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// This trait allows error types to specify whether they should trigger a retry
/// and what retry strategy parameters to use.
///
/// # Examples
///
/// ```
/// use giotto_error::{OperationError, OperationErrorKind, RetryableError};
///
/// let err = OperationError::new(OperationErrorKind::Http {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
///
/// assert!(err.is_retryable());
/// let (backoff, retries, max_delay) = err.retry_strategy_params();
/// assert_eq!(backoff, 2000);
/// assert_eq!(retries, 5);
/// ```
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    ///
    /// Transient errors like 503 (service unavailable), 429 (rate limit),
    /// or network failures should return true. Permanent errors like 401
    /// (unauthorized) or 400 (bad request) should return false.
    fn is_retryable(&self) -> bool;

    /// Get retry strategy parameters for this error.
    ///
    /// Returns `(initial_backoff_ms, max_retries, max_delay_secs)`.
    /// Default implementation returns standard parameters.
    ///
    /// Override this to provide error-specific retry strategies:
    /// - Rate limit errors (429): Longer delays, fewer retries
    /// - Server overload (503): Standard delays, more patient
    /// - Server errors (500): Quick retries, fail fast
    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        (2000, 5, 60) // Default: 2s initial, 5 retries, 60s cap
    }
}

impl RetryableError for OperationError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        self.kind.retry_strategy_params()
    }
}
