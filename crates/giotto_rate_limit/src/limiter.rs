//! Rate limiter implementation.
//!
//! The limiter keeps an explicit token reservoir and a FIFO queue of waiting
//! calls behind a single mutex, so the admission test (token available,
//! concurrency slot free, minimum spacing elapsed) and the corresponding
//! bookkeeping happen as one indivisible step. A background task refills the
//! reservoir on a fixed interval and drains the queue head-first as capacity
//! becomes available.

use crate::RateLimiterConfig;
use derive_getters::Getters;
use giotto_error::{GiottoResult, RateLimitError, RateLimitErrorKind, RetryableError};
use serde::Serialize;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex, Notify};
use tokio::time::{interval, sleep_until, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

type Waiter = oneshot::Sender<GiottoResult<()>>;

/// Throttles and queues calls against a provider quota.
///
/// Admission requires, atomically: at least one reservoir token, a free
/// concurrency slot, and the minimum inter-admission spacing elapsed. Calls
/// that cannot be admitted immediately queue in strict submission order;
/// refill ticks, call completions, and spacing timers drain the queue from
/// the head.
///
/// Handles are cheap to clone and share state: one instance per protected
/// resource class, created at startup and stopped (drained or discarded) at
/// shutdown.
///
/// # Examples
///
/// ```rust,ignore
/// use giotto_rate_limit::{RateLimiter, RateLimiterConfig};
/// use std::time::Duration;
///
/// let limiter = RateLimiter::new(
///     RateLimiterConfig::builder()
///         .name("social")
///         .reservoir_max(30u32)
///         .refill_amount(30u32)
///         .refill_interval(Duration::from_secs(60))
///         .max_concurrent(4u32)
///         .build()?,
/// );
///
/// let response = limiter
///     .schedule(|| async { social_client.post(&content).await })
///     .await?;
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    shared: Arc<Shared>,
}

struct Shared {
    config: RateLimiterConfig,
    state: Mutex<State>,
    completed: AtomicU64,
    idle: Notify,
}

struct State {
    reservoir: u32,
    last_admit: Option<Instant>,
    running: u32,
    queue: VecDeque<Waiter>,
    stopped: bool,
    spacing_timer_armed: bool,
    refill_retired: bool,
}

/// Counts exposed for backpressure monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Getters)]
pub struct RateLimiterStats {
    /// Calls currently executing
    running: u32,
    /// Calls waiting in the admission queue
    queued: u32,
    /// Calls that finished executing since the limiter was created
    completed: u64,
}

impl RateLimiter {
    /// Creates a limiter with a full reservoir and starts its refill task.
    ///
    /// Must be called from within a tokio runtime. The refill task holds a
    /// weak reference and exits once every handle to the limiter is dropped.
    pub fn new(config: RateLimiterConfig) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                reservoir: *config.reservoir_max(),
                last_admit: None,
                running: 0,
                queue: VecDeque::new(),
                stopped: false,
                spacing_timer_armed: false,
                refill_retired: false,
            }),
            completed: AtomicU64::new(0),
            idle: Notify::new(),
            config,
        });

        let weak = Arc::downgrade(&shared);
        let refill_interval = *shared.config.refill_interval();
        tokio::spawn(async move {
            let mut ticker = interval(refill_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(shared) = weak.upgrade() else { break };
                if Shared::refill(&shared).await {
                    break;
                }
            }
        });

        Self { shared }
    }

    /// Configuration this limiter was built with.
    pub fn config(&self) -> &RateLimiterConfig {
        &self.shared.config
    }

    /// Current running/queued/completed counts.
    pub async fn stats(&self) -> RateLimiterStats {
        let state = self.shared.state.lock().await;
        RateLimiterStats {
            running: state.running,
            queued: state.queue.len() as u32,
            completed: self.shared.completed.load(Ordering::Relaxed),
        }
    }

    /// Runs `op` once admission control allows it.
    ///
    /// The returned future resolves only once the operation has actually
    /// executed (or admission failed). A failed operation is not retried;
    /// see [`RateLimiter::execute`] for the classified-retry variant.
    #[instrument(skip(self, op), fields(limiter = %self.shared.config.name()))]
    pub async fn schedule<F, Fut, T>(&self, op: F) -> GiottoResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = GiottoResult<T>>,
    {
        Shared::admit(&self.shared).await?;
        // The guard returns the concurrency slot even if the caller is
        // cancelled while the operation is in flight.
        let guard = AdmitGuard {
            shared: Some(Arc::clone(&self.shared)),
        };
        let result = op().await;
        guard.release().await;
        result
    }

    /// Runs `op` with rate limiting and automatic retry for transient errors.
    ///
    /// For each attempt the call goes through normal admission, then:
    /// - a success returns immediately;
    /// - an error whose [`RetryableError::is_retryable`] is true is retried
    ///   with exponential backoff (2s initial, doubling, 60s cap, jittered,
    ///   at most 5 retries);
    /// - any other error returns immediately.
    ///
    /// Retry eligibility comes from the structured error classification,
    /// never from matching on error message text.
    #[instrument(skip(self, op), fields(limiter = %self.shared.config.name()))]
    pub async fn execute<F, Fut, T>(&self, op: F) -> GiottoResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = GiottoResult<T>>,
    {
        use tokio_retry2::strategy::{jitter, ExponentialBackoff};
        use tokio_retry2::{Retry, RetryError};

        let retry_strategy = ExponentialBackoff::from_millis(2000)
            .factor(2)
            .max_delay(Duration::from_secs(60))
            .map(jitter)
            .take(5);

        Retry::spawn(retry_strategy, || async {
            let result = self.schedule(&op).await;
            match result {
                Ok(value) => Ok(value),
                Err(e) => {
                    if e.is_retryable() {
                        warn!("transient error, will retry: {}", e);
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    } else {
                        warn!("permanent error, failing immediately: {}", e);
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        })
        .await
    }

    /// Sets the live token count without restarting the limiter.
    ///
    /// The value is capped at `reservoir_max`. Raising the count may unblock
    /// queued calls, which are admitted in submission order.
    #[instrument(skip(self), fields(limiter = %self.shared.config.name()))]
    pub async fn update_reservoir(&self, tokens: u32) {
        let mut state = self.shared.state.lock().await;
        state.reservoir = tokens.min(*self.shared.config.reservoir_max());
        info!(reservoir = state.reservoir, "reservoir updated");
        Shared::drain_locked(&self.shared, &mut state);
    }

    /// Stops the limiter.
    ///
    /// With `drain_pending = true`, already-queued calls are allowed to
    /// complete before this method returns; with `false`, queued-but-not-
    /// started calls fail immediately with a queue-drained error. Either
    /// way, calls submitted after `stop` fail with a stopped error, and
    /// calls already executing run to completion.
    #[instrument(skip(self), fields(limiter = %self.shared.config.name()))]
    pub async fn stop(&self, drain_pending: bool) {
        {
            let mut state = self.shared.state.lock().await;
            state.stopped = true;
            if !drain_pending {
                let discarded = state.queue.len();
                while let Some(waiter) = state.queue.pop_front() {
                    let _ = waiter.send(Err(RateLimitError::new(
                        RateLimitErrorKind::QueueDrained(self.shared.config.name().clone()),
                    )
                    .into()));
                }
                state.refill_retired = true;
                info!(discarded, "limiter stopped, pending queue discarded");
                return;
            }
            info!(
                queued = state.queue.len(),
                running = state.running,
                "limiter stopping, draining pending queue"
            );
        }

        loop {
            let notified = self.shared.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut state = self.shared.state.lock().await;
                if state.queue.is_empty() && state.running == 0 {
                    state.refill_retired = true;
                    break;
                }
            }
            notified.await;
        }
        debug!("pending queue drained, limiter stopped");
    }
}

impl Shared {
    /// Waits until the admission test passes for this call.
    async fn admit(shared: &Arc<Shared>) -> GiottoResult<()> {
        let rx = {
            let mut state = shared.state.lock().await;
            if state.stopped {
                return Err(RateLimitError::new(RateLimitErrorKind::Stopped(
                    shared.config.name().clone(),
                ))
                .into());
            }
            if state.queue.is_empty() && Self::admissible(&shared.config, &state) {
                Self::commit(&mut state);
                return Ok(());
            }
            let (tx, rx) = oneshot::channel();
            state.queue.push_back(tx);
            debug!(queued = state.queue.len(), "call queued");
            Self::drain_locked(shared, &mut state);
            rx
        };
        match rx.await {
            Ok(outcome) => outcome,
            // The sender half only disappears when the limiter itself did.
            Err(_) => Err(RateLimitError::new(RateLimitErrorKind::Stopped(
                shared.config.name().clone(),
            ))
            .into()),
        }
    }

    /// The admission test. Must be called with the state lock held so the
    /// check and the following commit are indivisible.
    fn admissible(config: &RateLimiterConfig, state: &State) -> bool {
        if state.reservoir == 0 {
            return false;
        }
        if let Some(max) = config.max_concurrent() {
            if state.running >= *max {
                return false;
            }
        }
        Self::spacing_elapsed(config, state)
    }

    fn spacing_elapsed(config: &RateLimiterConfig, state: &State) -> bool {
        match (config.min_interval(), state.last_admit) {
            (Some(min_interval), Some(last_admit)) => last_admit.elapsed() >= *min_interval,
            _ => true,
        }
    }

    fn commit(state: &mut State) {
        state.reservoir -= 1;
        state.running += 1;
        state.last_admit = Some(Instant::now());
    }

    /// Admits queued calls head-first while capacity allows.
    ///
    /// When the head is blocked only by the spacing requirement, a one-shot
    /// timer is armed to resume draining at the earliest admissible instant.
    fn drain_locked(shared: &Arc<Shared>, state: &mut State) {
        loop {
            if state.queue.is_empty() {
                break;
            }
            if state.reservoir == 0 {
                debug!("reservoir depleted, waiting for refill");
                break;
            }
            if let Some(max) = shared.config.max_concurrent() {
                if state.running >= *max {
                    break;
                }
            }
            if let (Some(min_interval), Some(last_admit)) =
                (shared.config.min_interval(), state.last_admit)
            {
                let ready_at = last_admit + *min_interval;
                if Instant::now() < ready_at {
                    if !state.spacing_timer_armed {
                        state.spacing_timer_armed = true;
                        let weak = Arc::downgrade(shared);
                        tokio::spawn(async move {
                            sleep_until(ready_at).await;
                            if let Some(shared) = weak.upgrade() {
                                let mut state = shared.state.lock().await;
                                state.spacing_timer_armed = false;
                                Shared::drain_locked(&shared, &mut state);
                            }
                        });
                    }
                    break;
                }
            }
            let Some(waiter) = state.queue.pop_front() else {
                break;
            };
            Self::commit(state);
            if waiter.send(Ok(())).is_err() {
                // The caller went away before admission; hand its capacity
                // back and keep draining.
                state.reservoir += 1;
                state.running -= 1;
            }
        }
        if state.queue.is_empty() && state.running == 0 {
            shared.idle.notify_waiters();
        }
    }

    /// One refill tick. Returns true once the limiter is retired.
    async fn refill(shared: &Arc<Shared>) -> bool {
        let mut state = shared.state.lock().await;
        if state.refill_retired {
            return true;
        }
        let refilled = state
            .reservoir
            .saturating_add(*shared.config.refill_amount())
            .min(*shared.config.reservoir_max());
        if refilled != state.reservoir {
            debug!(reservoir = refilled, "reservoir refilled");
        }
        state.reservoir = refilled;
        Self::drain_locked(shared, &mut state);
        false
    }

    /// Returns a concurrency slot and drains the queue.
    async fn release(shared: &Arc<Shared>) {
        let mut state = shared.state.lock().await;
        state.running = state.running.saturating_sub(1);
        shared.completed.fetch_add(1, Ordering::Relaxed);
        Self::drain_locked(shared, &mut state);
    }
}

/// Returns the admitted call's concurrency slot exactly once, even if the
/// caller is cancelled mid-flight.
struct AdmitGuard {
    shared: Option<Arc<Shared>>,
}

impl AdmitGuard {
    async fn release(mut self) {
        if let Some(shared) = self.shared.take() {
            Shared::release(&shared).await;
        }
    }
}

impl Drop for AdmitGuard {
    fn drop(&mut self) {
        if let Some(shared) = self.shared.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    Shared::release(&shared).await;
                });
            }
        }
    }
}
