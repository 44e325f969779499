//! Circuit states and state-change events.

use serde::{Deserialize, Serialize};

/// Health state of a circuit.
///
/// Transitions are restricted to `Closed -> Open`, `Open -> HalfOpen`
/// (after the reset timeout), `HalfOpen -> Closed` (probe succeeds), and
/// `HalfOpen -> Open` (probe fails). No other edges exist.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, strum::Display,
)]
pub enum CircuitState {
    /// Calls flow through; failures are tallied in the rolling window.
    Closed,
    /// Calls fail fast; the dependency is marked unhealthy.
    Open,
    /// A single probe call is testing whether the dependency recovered.
    HalfOpen,
}

/// State-change notification emitted by a breaker.
///
/// Subscribers (loggers, metrics) register through
/// [`CircuitBreaker::subscribe`](crate::CircuitBreaker::subscribe)
/// independently of breaker logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BreakerEvent {
    /// Circuit opened after crossing the failure threshold or a failed probe.
    Opened {
        /// Name of the circuit
        name: String,
    },
    /// Cooldown elapsed; a single probe is being admitted.
    HalfOpened {
        /// Name of the circuit
        name: String,
    },
    /// Probe succeeded; circuit closed and stats were reset.
    Closed {
        /// Name of the circuit
        name: String,
    },
}

impl BreakerEvent {
    /// Name of the circuit this event concerns.
    pub fn circuit(&self) -> &str {
        match self {
            BreakerEvent::Opened { name }
            | BreakerEvent::HalfOpened { name }
            | BreakerEvent::Closed { name } => name,
        }
    }
}
