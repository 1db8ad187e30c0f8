//! Reconnect delays
//!
//! Capped exponential backoff with symmetric jitter. [`ReconnectPolicy::fixed`]
//! gives a constant delay with no jitter.

use std::time::Duration;

use rand::Rng;
use serde::Deserialize;

/// Delay parameters, in the units used by the config file.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    /// First delay after a drop, and the delay after every successful connect.
    pub initial_delay_ms: u64,
    /// Upper bound for any delay, jitter included.
    pub max_delay_ms: u64,
    /// Growth factor per consecutive failure. Values below 1 are treated as 1.
    pub multiplier: f64,
    /// Relative jitter in `[0, 1]`; 0.2 spreads each delay over ±20%.
    pub jitter: f64,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            multiplier: 2.0,
            jitter: 0.2,
        }
    }
}

impl ReconnectPolicy {
    /// Constant delay, no growth, no jitter.
    pub fn fixed(delay: Duration) -> Self {
        let ms = delay.as_millis() as u64;
        Self {
            initial_delay_ms: ms,
            max_delay_ms: ms,
            multiplier: 1.0,
            jitter: 0.0,
        }
    }
}

/// Per-connection backoff state.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    /// Delay before jitter for the next attempt.
    current_ms: f64,
}

impl Backoff {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            current_ms: policy.initial_delay_ms as f64,
        }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    /// Delay to wait before the next attempt; advances the backoff.
    pub fn next_delay(&mut self) -> Duration {
        let max_ms = self.policy.max_delay_ms.max(self.policy.initial_delay_ms) as f64;
        let base = self.current_ms.min(max_ms);

        let jitter = self.policy.jitter.clamp(0.0, 1.0);
        let delay = if jitter > 0.0 {
            let factor = 1.0 + rand::thread_rng().gen_range(-jitter..=jitter);
            (base * factor).min(max_ms)
        } else {
            base
        };

        self.current_ms = (base * self.policy.multiplier.max(1.0)).min(max_ms);

        Duration::from_millis(delay.round() as u64)
    }

    /// Start over from the initial delay.
    pub fn reset(&mut self) {
        self.current_ms = self.policy.initial_delay_ms as f64;
    }
}
