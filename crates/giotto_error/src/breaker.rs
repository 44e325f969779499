//! Circuit breaker error types.

use crate::RetryableError;

/// Specific error conditions raised by a circuit breaker.
///
/// Both kinds are distinct from the wrapped operation's own errors, so
/// callers can tell "dependency marked unhealthy" apart from "this specific
/// call failed".
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum BreakerErrorKind {
    /// Circuit is open; the call was rejected without being attempted
    #[display("Circuit '{}' is open, call rejected", _0)]
    CircuitOpen(String),
    /// Call exceeded the breaker's timeout budget
    #[display("Call through circuit '{}' timed out after {}ms", name, budget_ms)]
    CallTimeout {
        /// Name of the circuit
        name: String,
        /// Timeout budget that was exceeded, in milliseconds
        budget_ms: u64,
    },
}

/// Circuit breaker error with source location tracking.
///
/// # Examples
///
/// ```
/// use giotto_error::{BreakerError, BreakerErrorKind};
///
/// let err = BreakerError::new(BreakerErrorKind::CircuitOpen("social".to_string()));
/// assert!(format!("{}", err).contains("open"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Breaker Error: {} at line {} in {}", kind, line, file)]
pub struct BreakerError {
    /// The kind of error that occurred
    pub kind: BreakerErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl BreakerError {
    /// Create a new BreakerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: BreakerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

impl RetryableError for BreakerError {
    fn is_retryable(&self) -> bool {
        match &self.kind {
            // An open circuit means the dependency is known-bad; retrying
            // immediately would defeat the fail-fast contract.
            BreakerErrorKind::CircuitOpen(_) => false,
            BreakerErrorKind::CallTimeout { .. } => true,
        }
    }
}
