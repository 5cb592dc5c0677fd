use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};

use crate::config::PipelineConfig;
use crate::error::Error;

/// Bounded retry budget shared by the tracker and model clients.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Extra attempts after a rate limit, timeout or 5xx.
    pub max_retries: u32,
    /// Extra attempts after an empty or unusable reply.
    pub malformed_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_max_interval(self.max_delay)
            .with_multiplier(2.0)
            .with_max_elapsed_time(None)
            .build()
    }

    /// Next wait, stretched to honour a `Retry-After` hint up to `max_delay`.
    pub fn next_delay(&self, backoff: &mut ExponentialBackoff, err: &Error) -> Duration {
        let delay = backoff
            .next_backoff()
            .unwrap_or(self.max_delay)
            .min(self.max_delay);
        match err.retry_after() {
            Some(secs) => delay.max(Duration::from_secs(secs).min(self.max_delay)),
            None => delay,
        }
    }
}

impl From<&PipelineConfig> for RetryPolicy {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            malformed_retries: 1,
            initial_delay: config.retry_delay,
            max_delay: config.retry_delay * 32,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}
