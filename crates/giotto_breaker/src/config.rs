//! Configuration for circuit breaker instances.

use derive_builder::Builder;
use derive_getters::Getters;
use std::time::Duration;

/// Configuration for a single circuit breaker.
///
/// Built with [`CircuitBreakerConfig::builder`]. Only `name` is required;
/// the remaining fields default to values suitable for a remote HTTP
/// dependency.
///
/// # Examples
///
/// ```
/// use giotto_breaker::CircuitBreakerConfig;
/// use std::time::Duration;
///
/// let config = CircuitBreakerConfig::builder()
///     .name("social")
///     .call_timeout(Duration::from_secs(5))
///     .error_threshold_percent(50.0)
///     .reset_timeout(Duration::from_secs(30))
///     .volume_threshold(10u32)
///     .build()
///     .unwrap();
/// assert_eq!(config.name(), "social");
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Getters)]
#[builder(setter(into))]
pub struct CircuitBreakerConfig {
    /// Name of the protected dependency, used in errors, logs, and events.
    name: String,

    /// Budget for a single wrapped call. A call that does not settle within
    /// this duration counts as a failure.
    #[builder(default = "Duration::from_secs(10)")]
    call_timeout: Duration,

    /// Failure percentage at or above which the circuit opens.
    #[builder(default = "50.0")]
    error_threshold_percent: f64,

    /// Cooldown an open circuit waits before admitting a probe.
    #[builder(default = "Duration::from_secs(30)")]
    reset_timeout: Duration,

    /// Minimum attempts in the rolling window before the threshold applies.
    #[builder(default = "5")]
    volume_threshold: u32,

    /// Age beyond which call outcomes leave the rolling window.
    #[builder(default = "Duration::from_secs(60)")]
    rolling_window: Duration,
}

impl CircuitBreakerConfig {
    /// Creates a new config builder.
    pub fn builder() -> CircuitBreakerConfigBuilder {
        CircuitBreakerConfigBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = CircuitBreakerConfig::builder()
            .name("generation")
            .build()
            .unwrap();
        assert_eq!(config.name(), "generation");
        assert_eq!(*config.call_timeout(), Duration::from_secs(10));
        assert_eq!(*config.error_threshold_percent(), 50.0);
        assert_eq!(*config.reset_timeout(), Duration::from_secs(30));
        assert_eq!(*config.volume_threshold(), 5);
        assert_eq!(*config.rolling_window(), Duration::from_secs(60));
    }

    #[test]
    fn builder_requires_name() {
        assert!(CircuitBreakerConfig::builder().build().is_err());
    }
}
