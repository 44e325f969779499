//! TOML-based configuration for resilience profiles.
//!
//! This module provides per-service resilience profiles loaded from TOML.
//! The configuration system supports:
//! - Bundled defaults (include_str! from giotto.toml)
//! - User overrides (./giotto.toml or ~/.config/giotto/giotto.toml)
//! - Automatic merging with user values taking precedence

use config::{Config, File, FileFormat};
use giotto_breaker::CircuitBreakerConfig;
use giotto_error::{ConfigError, GiottoResult};
use giotto_rate_limit::RateLimiterConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, instrument};

/// Circuit breaker settings for one service profile.
///
/// All fields have defaults suitable for a remote HTTP dependency.
///
/// # Example
///
/// ```toml
/// [services.social.breaker]
/// call_timeout_ms = 10_000
/// error_threshold_percent = 50.0
/// reset_timeout_ms = 30_000
/// volume_threshold = 5
/// rolling_window_ms = 60_000
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BreakerSettings {
    /// Budget for a single wrapped call, in milliseconds
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Failure percentage at or above which the circuit opens
    #[serde(default = "default_error_threshold_percent")]
    pub error_threshold_percent: f64,

    /// Cooldown before an open circuit admits a probe, in milliseconds
    #[serde(default = "default_reset_timeout_ms")]
    pub reset_timeout_ms: u64,

    /// Minimum attempts in the rolling window before the threshold applies
    #[serde(default = "default_volume_threshold")]
    pub volume_threshold: u32,

    /// Length of the rolling window, in milliseconds
    #[serde(default = "default_rolling_window_ms")]
    pub rolling_window_ms: u64,
}

fn default_call_timeout_ms() -> u64 {
    10_000
}

fn default_error_threshold_percent() -> f64 {
    50.0
}

fn default_reset_timeout_ms() -> u64 {
    30_000
}

fn default_volume_threshold() -> u32 {
    5
}

fn default_rolling_window_ms() -> u64 {
    60_000
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self {
            call_timeout_ms: default_call_timeout_ms(),
            error_threshold_percent: default_error_threshold_percent(),
            reset_timeout_ms: default_reset_timeout_ms(),
            volume_threshold: default_volume_threshold(),
            rolling_window_ms: default_rolling_window_ms(),
        }
    }
}

/// Rate limiter settings for one service profile.
///
/// `min_interval_ms` and `max_concurrent` are optional, where `None`
/// indicates no spacing requirement and no concurrency ceiling.
///
/// # Example
///
/// ```toml
/// [services.social.limiter]
/// reservoir_max = 30
/// refill_amount = 30
/// refill_interval_ms = 60_000
/// min_interval_ms = 2_000
/// max_concurrent = 2
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LimiterSettings {
    /// Maximum tokens the reservoir can hold
    pub reservoir_max: u32,

    /// Tokens added on each refill tick
    pub refill_amount: u32,

    /// Interval between refill ticks, in milliseconds
    pub refill_interval_ms: u64,

    /// Minimum spacing between successive admissions, in milliseconds
    #[serde(default)]
    pub min_interval_ms: Option<u64>,

    /// Maximum concurrent in-flight calls
    #[serde(default)]
    pub max_concurrent: Option<u32>,
}

/// Resilience profile for one protected service.
///
/// A profile produces one breaker and one limiter instance, both dedicated
/// to that service. Health signals and quotas are never shared across
/// services.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServiceProfile {
    /// Circuit breaker settings
    #[serde(default)]
    pub breaker: BreakerSettings,

    /// Rate limiter settings
    pub limiter: LimiterSettings,
}

impl ServiceProfile {
    /// Builds the typed breaker config for this profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot form a valid config.
    pub fn breaker_config(&self, name: impl Into<String>) -> GiottoResult<CircuitBreakerConfig> {
        CircuitBreakerConfig::builder()
            .name(name)
            .call_timeout(Duration::from_millis(self.breaker.call_timeout_ms))
            .error_threshold_percent(self.breaker.error_threshold_percent)
            .reset_timeout(Duration::from_millis(self.breaker.reset_timeout_ms))
            .volume_threshold(self.breaker.volume_threshold)
            .rolling_window(Duration::from_millis(self.breaker.rolling_window_ms))
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid breaker settings: {}", e)).into())
    }

    /// Builds the typed limiter config for this profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot form a valid config.
    pub fn limiter_config(&self, name: impl Into<String>) -> GiottoResult<RateLimiterConfig> {
        let mut builder = RateLimiterConfig::builder();
        builder
            .name(name)
            .reservoir_max(self.limiter.reservoir_max)
            .refill_amount(self.limiter.refill_amount)
            .refill_interval(Duration::from_millis(self.limiter.refill_interval_ms));
        if let Some(min_interval_ms) = self.limiter.min_interval_ms {
            builder.min_interval(Duration::from_millis(min_interval_ms));
        }
        if let Some(max_concurrent) = self.limiter.max_concurrent {
            builder.max_concurrent(max_concurrent);
        }
        builder
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid limiter settings: {}", e)).into())
    }
}

/// Top-level Giotto configuration.
///
/// Loads resilience profiles from TOML files with a precedence system:
/// 1. Bundled defaults (include_str! from giotto.toml)
/// 2. User override (./giotto.toml or ~/.config/giotto/giotto.toml)
///
/// # Example
///
/// ```no_run
/// use giotto::GiottoConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = GiottoConfig::load()?;
/// let profile = config.get_service("social").unwrap();
/// println!("social reservoir: {}", profile.limiter.reservoir_max);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct GiottoConfig {
    /// Map of service name to resilience profile
    #[serde(default)]
    pub services: HashMap<String, ServiceProfile>,
}

impl GiottoConfig {
    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> GiottoResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                ))
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)).into())
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (giotto.toml shipped with library)
    /// 2. User config in home directory (~/.config/giotto/giotto.toml)
    /// 3. User config in current directory (./giotto.toml)
    ///
    /// User config files are optional and will be silently skipped if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if any present source fails to parse.
    #[instrument]
    pub fn load() -> GiottoResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        // Bundled default configuration
        const DEFAULT_CONFIG: &str = include_str!("../../../giotto.toml");

        let mut builder = Config::builder()
            // Start with bundled defaults
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        // Add user config from home directory (optional)
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/giotto/giotto.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        // Add user config from current directory (optional, highest precedence)
        builder = builder.add_source(File::with_name("giotto").required(false));

        // Build and deserialize
        builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)).into())
    }

    /// Get the resilience profile for a service.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use giotto::GiottoConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = GiottoConfig::load()?;
    /// let generation = config.get_service("generation").unwrap();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self))]
    pub fn get_service(&self, service: &str) -> Option<ServiceProfile> {
        debug!(service, "Looking up service profile");
        self.services.get(service).cloned()
    }
}
