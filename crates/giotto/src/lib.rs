//! Giotto - Resilience and Orchestration for LLM Social Bots
//!
//! Giotto provides the fault-tolerance core of a content bot: it decides
//! *when* and *whether* a call to an unreliable external service (a social
//! platform, a generation API) is allowed to proceed, and *how* a sequence
//! of dependent calls is executed and aborted.
//!
//! # Features
//!
//! - **Circuit Breaking**: per-dependency health tracking with fail-fast
//!   rejection and single-probe recovery
//! - **Rate Limiting**: token reservoir with FIFO queueing, spacing, and
//!   concurrency ceilings against provider quotas
//! - **Classified Retry**: opt-in exponential backoff driven by structured
//!   error classification, never message matching
//! - **Pipelines**: named, ordered steps threading a shared context with
//!   fail-fast semantics and full execution reports
//! - **Configuration**: TOML service profiles with bundled defaults and
//!   user overrides
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use giotto::{CircuitBreaker, GiottoConfig, Pipeline, RateLimiter, StepContext};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = GiottoConfig::load()?;
//!     let profile = config.get_service("social").expect("bundled profile");
//!
//!     let limiter = RateLimiter::new(profile.limiter_config("social")?);
//!     let breaker = CircuitBreaker::new(profile.breaker_config("social")?);
//!
//!     let pipeline = Pipeline::builder("post_content")
//!         .step_fn("post", move |context: StepContext| {
//!             let limiter = limiter.clone();
//!             let breaker = breaker.clone();
//!             async move {
//!                 let content = context.get_str("content").unwrap_or_default().to_string();
//!                 breaker
//!                     .call(|| limiter.schedule(|| post_to_platform(&content)))
//!                     .await?;
//!                 Ok(StepContext::new())
//!             }
//!         })
//!         .build();
//!
//!     let report = pipeline.execute(StepContext::new()).await;
//!     println!("success: {}", report.success());
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! Giotto is organized as a workspace with focused crates:
//!
//! - `giotto_error` - Error types and retry classification
//! - `giotto_breaker` - Circuit breaker
//! - `giotto_rate_limit` - Rate limiter and classified retry
//! - `giotto_pipeline` - Pipeline executor and step context
//!
//! This crate (`giotto`) re-exports everything for convenience and adds the
//! TOML configuration layer. Composition order for a protected call is
//! limiter inside breaker: the limiter gates admission, the breaker gates
//! health, and the pipeline stays unaware of both.

// Re-export core crates (always available)
pub use giotto_breaker::*;
pub use giotto_error::*;
pub use giotto_pipeline::*;
pub use giotto_rate_limit::*;

mod config;

pub use config::{BreakerSettings, GiottoConfig, LimiterSettings, ServiceProfile};

// OpenTelemetry observability module
#[cfg(feature = "observability")]
pub mod observability;
