//! Configuration for rate limiter instances.

use derive_builder::Builder;
use derive_getters::Getters;
use std::time::Duration;

/// Configuration for a single rate limiter.
///
/// One limiter instance covers one protected resource class (for example,
/// one per external API). `None` for `min_interval` or `max_concurrent`
/// means no spacing requirement and no concurrency ceiling, matching the
/// unlimited convention used for provider tiers.
///
/// # Examples
///
/// ```
/// use giotto_rate_limit::RateLimiterConfig;
/// use std::time::Duration;
///
/// let config = RateLimiterConfig::builder()
///     .name("generation")
///     .reservoir_max(10u32)
///     .refill_amount(10u32)
///     .refill_interval(Duration::from_secs(60))
///     .min_interval(Duration::from_millis(200))
///     .max_concurrent(2u32)
///     .build()
///     .unwrap();
/// assert_eq!(*config.reservoir_max(), 10);
/// ```
#[derive(Debug, Clone, PartialEq, Builder, Getters)]
#[builder(setter(into))]
pub struct RateLimiterConfig {
    /// Name of the throttled resource class, used in errors and logs.
    #[builder(default = "String::from(\"default\")")]
    name: String,

    /// Maximum tokens the reservoir can hold. The reservoir starts full.
    reservoir_max: u32,

    /// Tokens added on each refill tick, capped at `reservoir_max`.
    refill_amount: u32,

    /// Interval between refill ticks.
    refill_interval: Duration,

    /// Minimum spacing between successive admissions. `None` disables the
    /// spacing requirement.
    #[builder(default)]
    min_interval: Option<Duration>,

    /// Ceiling on simultaneously in-flight calls. `None` disables the
    /// ceiling.
    #[builder(default)]
    max_concurrent: Option<u32>,
}

impl RateLimiterConfig {
    /// Creates a new config builder.
    pub fn builder() -> RateLimiterConfigBuilder {
        RateLimiterConfigBuilder::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_applies_defaults() {
        let config = RateLimiterConfig::builder()
            .reservoir_max(5u32)
            .refill_amount(5u32)
            .refill_interval(Duration::from_secs(1))
            .build()
            .unwrap();
        assert_eq!(config.name(), "default");
        assert_eq!(*config.min_interval(), None);
        assert_eq!(*config.max_concurrent(), None);
    }

    #[test]
    fn builder_requires_reservoir_fields() {
        assert!(RateLimiterConfig::builder().name("social").build().is_err());
    }
}
