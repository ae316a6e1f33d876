//! Retry policy and the per-request retry state machine.

use crate::ClientError;
use std::time::Duration;

/// Bounded exponential backoff without jitter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`)
    pub max_retries: u32,
    /// Delay before the first retry; doubles for each further retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(10_000),
        }
    }
}

impl RetryPolicy {
    /// Default backoff with `max_retries` retries
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(0)
    }

    /// Set the initial delay
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the delay cap
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay after the failed attempt `attempt` (0-indexed):
    /// `min(base_delay * 2^attempt, max_delay)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
            .min(self.max_delay)
    }

    /// State that follows a failed attempt
    pub fn after_failure(&self, attempt: u32, error: &ClientError) -> RetryState {
        if error.is_retryable() && attempt < self.max_retries {
            RetryState::BackingOff(attempt)
        } else {
            RetryState::Exhausted
        }
    }
}

/// States of one logical request
///
/// ```text
/// Attempting(n) --2xx--------------------------------> Succeeded
/// Attempting(n) --retryable, n < max_retries---------> BackingOff(n)
/// Attempting(n) --terminal or last attempt-----------> Exhausted
/// BackingOff(n) --delay elapsed----------------------> Attempting(n + 1)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Attempt `n` (0-indexed) is in flight
    Attempting(u32),
    /// Sleeping after failed attempt `n`
    BackingOff(u32),
    /// A 2xx response was received
    Succeeded,
    /// No further attempts; the last error is final
    Exhausted,
}

impl RetryState {
    /// Initial state
    pub fn start() -> Self {
        Self::Attempting(0)
    }

    /// Transition after a successful attempt
    pub fn on_success(self) -> Self {
        match self {
            Self::Attempting(_) => Self::Succeeded,
            other => other,
        }
    }

    /// Transition after a failed attempt
    pub fn on_failure(self, policy: &RetryPolicy, error: &ClientError) -> Self {
        match self {
            Self::Attempting(n) => policy.after_failure(n, error),
            other => other,
        }
    }

    /// Transition once the backoff delay has elapsed
    pub fn on_backoff_elapsed(self) -> Self {
        match self {
            Self::BackingOff(n) => Self::Attempting(n + 1),
            other => other,
        }
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Exhausted)
    }
}
