use std::{num::NonZeroU32, time::Duration};

use serde::{Deserialize, Deserializer};

const DEFAULT_ATTEMPTS: NonZeroU32 = NonZeroU32::MIN.saturating_add(2);

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    #[default]
    Fixed,
    /// Doubles the wait after every failed attempt, up to `max_interval`.
    Exponential,
}

/// How often and how patiently a failing request is repeated.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RetryPolicy {
    max_attempts: NonZeroU32,
    #[serde(rename = "interval_secs", deserialize_with = "seconds")]
    interval: Duration,
    backoff: Backoff,
    #[serde(rename = "max_interval_secs", deserialize_with = "seconds")]
    max_interval: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: NonZeroU32, interval: Duration, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            interval,
            backoff,
            max_interval: Self::default().max_interval.max(interval),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    /// Time to wait after the `failed_attempt`th attempt (counting from 1) before trying again.
    ///
    /// Returns `None` when no attempt is left.
    pub fn delay_after(&self, failed_attempt: u32) -> Option<Duration> {
        if failed_attempt >= self.max_attempts() {
            return None;
        }
        let delay = match self.backoff {
            Backoff::Fixed => self.interval,
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(failed_attempt.saturating_sub(1));
                self.interval
                    .checked_mul(factor)
                    .unwrap_or(self.max_interval)
                    .min(self.max_interval)
            }
        };
        Some(delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_ATTEMPTS,
            interval: Duration::from_secs(5),
            backoff: Backoff::Fixed,
            max_interval: Duration::from_secs(300),
        }
    }
}

fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_secs)
}
