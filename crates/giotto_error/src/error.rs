//! Top-level error wrapper types.

use crate::{
    BreakerError, ConfigError, OperationError, PipelineError, RateLimitError, RetryableError,
};

/// This is the foundation error enum for the Giotto workspace. Each crate
/// contributes the variant covering its own failure domain.
///
/// # Examples
///
/// ```
/// use giotto_error::{ConfigError, GiottoError};
///
/// let config_err = ConfigError::new("Malformed profile");
/// let err: GiottoError = config_err.into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum GiottoErrorKind {
    /// Circuit breaker error
    #[from(BreakerError)]
    Breaker(BreakerError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Protected operation error
    #[from(OperationError)]
    Operation(OperationError),
    /// Pipeline execution error
    #[from(PipelineError)]
    Pipeline(PipelineError),
    /// Rate limiter error
    #[from(RateLimitError)]
    RateLimit(RateLimitError),
}

/// Giotto error with kind discrimination.
///
/// # Examples
///
/// ```
/// use giotto_error::{ConfigError, GiottoResult};
///
/// fn might_fail() -> GiottoResult<()> {
///     Err(ConfigError::new("Missing field"))?
/// }
///
/// match might_fail() {
///     Ok(_) => println!("Success"),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Giotto Error: {}", _0)]
pub struct GiottoError(Box<GiottoErrorKind>);

impl GiottoError {
    /// Create a new error from a kind.
    pub fn new(kind: GiottoErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &GiottoErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to GiottoErrorKind
impl<T> From<T> for GiottoError
where
    T: Into<GiottoErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

impl RetryableError for GiottoError {
    fn is_retryable(&self) -> bool {
        match self.kind() {
            GiottoErrorKind::Breaker(e) => e.is_retryable(),
            GiottoErrorKind::Operation(e) => e.is_retryable(),
            // Configuration, pipeline, and limiter lifecycle failures are
            // not transient; retrying cannot change the outcome.
            GiottoErrorKind::Config(_)
            | GiottoErrorKind::Pipeline(_)
            | GiottoErrorKind::RateLimit(_) => false,
        }
    }

    fn retry_strategy_params(&self) -> (u64, usize, u64) {
        match self.kind() {
            GiottoErrorKind::Operation(e) => e.retry_strategy_params(),
            _ => (2000, 5, 60),
        }
    }
}

/// Result type for Giotto operations.
///
/// # Examples
///
/// ```
/// use giotto_error::{GiottoResult, OperationError, OperationErrorKind};
///
/// fn post_content() -> GiottoResult<String> {
///     Err(OperationError::new(OperationErrorKind::Network(
///         "connection reset".to_string(),
///     )))?
/// }
/// ```
pub type GiottoResult<T> = std::result::Result<T, GiottoError>;
