//! Fixed-delay pacing between files

use crate::config::UploadConfig;
use std::time::Duration;
use tokio::time::sleep;

/// Sleeps a fixed interval after every processed file
///
/// Cliniko allows 200 requests per minute; each file costs two API calls, so
/// a 300 ms pause keeps a sequential run under the quota.
#[derive(Debug, Clone, Copy)]
pub struct RateLimiter {
    interval: Duration,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(Duration::from_millis(config.rate_limit_interval_ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Wait the full interval
    pub async fn pause(&self) {
        if !self.interval.is_zero() {
            sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_from_config_default() {
        let limiter = RateLimiter::from_config(&UploadConfig::default());
        assert_eq!(limiter.interval(), Duration::from_millis(300));
    }

    #[tokio::test]
    async fn test_pause_waits_full_interval() {
        let limiter = RateLimiter::new(Duration::from_millis(50));
        let start = Instant::now();
        limiter.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
