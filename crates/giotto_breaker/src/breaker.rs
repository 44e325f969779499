//! Circuit breaker implementation.

use crate::{
    BreakerEvent, CallOutcome, CircuitBreakerConfig, CircuitState, RollingStats, StatsSnapshot,
};
use giotto_error::{BreakerError, BreakerErrorKind, GiottoResult};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, instrument, warn};

/// Guards calls to a single unreliable dependency.
///
/// The breaker wraps an async operation and tracks its outcomes in a rolling
/// window. While `Closed`, calls proceed under the configured timeout budget;
/// once the failure rate crosses the threshold (with enough volume), the
/// circuit opens and calls fail fast with a circuit-open error until the
/// reset timeout elapses, after which exactly one probe is admitted.
///
/// Handles are cheap to clone; clones share state, so one instance (however
/// many handles exist) guards one logical dependency.
///
/// # Examples
///
/// ```rust,ignore
/// use giotto_breaker::{CircuitBreaker, CircuitBreakerConfig};
///
/// let breaker = CircuitBreaker::new(
///     CircuitBreakerConfig::builder()
///         .name("social")
///         .build()?,
/// );
///
/// let posted = breaker
///     .call(|| async { social_client.post(&content).await })
///     .await?;
/// ```
#[derive(Clone)]
pub struct CircuitBreaker {
    config: Arc<CircuitBreakerConfig>,
    inner: Arc<Mutex<Inner>>,
    events: broadcast::Sender<BreakerEvent>,
}

#[derive(Debug)]
struct Inner {
    state: CircuitState,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
    stats: RollingStats,
}

/// How a call was admitted: as a regular closed-state call or as the single
/// half-open probe. The distinction decides how its outcome feeds back.
enum Admission {
    Regular,
    Probe,
}

impl CircuitBreaker {
    /// Creates a closed breaker from the given configuration.
    pub fn new(config: CircuitBreakerConfig) -> Self {
        let stats = RollingStats::new(*config.rolling_window());
        let (events, _) = broadcast::channel(32);
        Self {
            config: Arc::new(config),
            inner: Arc::new(Mutex::new(Inner {
                state: CircuitState::Closed,
                opened_at: None,
                probe_in_flight: false,
                stats,
            })),
            events,
        }
    }

    /// Configuration this breaker was built with.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Subscribe to state-change events.
    ///
    /// Events are delivered best-effort; a subscriber that falls behind the
    /// channel capacity misses the oldest events.
    pub fn subscribe(&self) -> broadcast::Receiver<BreakerEvent> {
        self.events.subscribe()
    }

    /// Current circuit state.
    pub async fn state(&self) -> CircuitState {
        self.inner.lock().await.state
    }

    /// Snapshot of the rolling call-outcome window.
    pub async fn stats(&self) -> StatsSnapshot {
        self.inner.lock().await.stats.snapshot()
    }

    /// Runs `op` through the breaker.
    ///
    /// Fails fast with a circuit-open error while the circuit is open or
    /// while a half-open probe is outstanding; the operation is never invoked
    /// in that case. An admitted call runs under the configured timeout
    /// budget, and a call that does not settle in time surfaces a
    /// call-timeout error and counts as a failure. The operation's own errors
    /// propagate unchanged.
    #[instrument(skip(self, op), fields(circuit = %self.config.name()))]
    pub async fn call<F, Fut, T>(&self, op: F) -> GiottoResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GiottoResult<T>>,
    {
        let admission = self.admit().await?;
        match timeout(*self.config.call_timeout(), op()).await {
            Ok(Ok(value)) => {
                self.on_success(&admission).await;
                Ok(value)
            }
            Ok(Err(err)) => {
                self.on_failure(&admission, CallOutcome::Failure).await;
                Err(err)
            }
            Err(_) => {
                let budget_ms = self.config.call_timeout().as_millis() as u64;
                warn!(budget_ms, "call exceeded timeout budget");
                self.on_failure(&admission, CallOutcome::Timeout).await;
                Err(BreakerError::new(BreakerErrorKind::CallTimeout {
                    name: self.config.name().clone(),
                    budget_ms,
                })
                .into())
            }
        }
    }

    /// Decides whether a call may proceed, transitioning `Open -> HalfOpen`
    /// when the reset timeout has elapsed.
    async fn admit(&self) -> GiottoResult<Admission> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            CircuitState::Closed => Ok(Admission::Regular),
            CircuitState::Open => {
                let cooled_down = inner
                    .opened_at
                    .map(|at| at.elapsed() >= *self.config.reset_timeout())
                    .unwrap_or(true);
                if cooled_down {
                    inner.state = CircuitState::HalfOpen;
                    inner.probe_in_flight = true;
                    info!("cooldown elapsed, admitting probe");
                    self.emit(BreakerEvent::HalfOpened {
                        name: self.config.name().clone(),
                    });
                    Ok(Admission::Probe)
                } else {
                    inner.stats.record(CallOutcome::Rejection);
                    debug!("circuit open, rejecting call");
                    Err(self.open_error())
                }
            }
            CircuitState::HalfOpen => {
                if inner.probe_in_flight {
                    inner.stats.record(CallOutcome::Rejection);
                    debug!("probe outstanding, rejecting call");
                    Err(self.open_error())
                } else {
                    // The previous probe settled without closing the circuit;
                    // its failure path already moved the state back to Open,
                    // so reaching here means a fresh probe slot.
                    inner.probe_in_flight = true;
                    Ok(Admission::Probe)
                }
            }
        }
    }

    async fn on_success(&self, admission: &Admission) {
        let mut inner = self.inner.lock().await;
        match admission {
            Admission::Probe => {
                inner.probe_in_flight = false;
                inner.state = CircuitState::Closed;
                inner.opened_at = None;
                inner.stats.clear();
                info!("probe succeeded, closing circuit");
                self.emit(BreakerEvent::Closed {
                    name: self.config.name().clone(),
                });
            }
            Admission::Regular => {
                inner.stats.record(CallOutcome::Success);
            }
        }
    }

    async fn on_failure(&self, admission: &Admission, outcome: CallOutcome) {
        let mut inner = self.inner.lock().await;
        match admission {
            Admission::Probe => {
                inner.stats.record(outcome);
                inner.probe_in_flight = false;
                inner.state = CircuitState::Open;
                inner.opened_at = Some(Instant::now());
                warn!("probe failed, reopening circuit");
                self.emit(BreakerEvent::Opened {
                    name: self.config.name().clone(),
                });
            }
            Admission::Regular => {
                inner.stats.record(outcome);
                // A regular call may settle after the circuit already opened
                // for other reasons; only a closed circuit can trip.
                if inner.state == CircuitState::Closed {
                    self.maybe_trip(&mut inner);
                }
            }
        }
    }

    fn maybe_trip(&self, inner: &mut Inner) {
        let snapshot = inner.stats.snapshot();
        if snapshot.total() >= u64::from(*self.config.volume_threshold())
            && snapshot.failure_rate() >= *self.config.error_threshold_percent()
        {
            inner.state = CircuitState::Open;
            inner.opened_at = Some(Instant::now());
            warn!(
                attempts = snapshot.total(),
                failure_rate = snapshot.failure_rate(),
                "failure threshold crossed, opening circuit"
            );
            self.emit(BreakerEvent::Opened {
                name: self.config.name().clone(),
            });
        }
    }

    fn open_error(&self) -> giotto_error::GiottoError {
        BreakerError::new(BreakerErrorKind::CircuitOpen(self.config.name().clone())).into()
    }

    fn emit(&self, event: BreakerEvent) {
        // Send fails only when no subscriber exists, which is fine.
        let _ = self.events.send(event);
    }
}
