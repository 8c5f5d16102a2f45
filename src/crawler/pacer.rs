//! Minimum-interval pacing between dependent fetches
//!
//! The session asks the pacer before every fetch and reports back when the
//! fetch has finished, successfully or not. The first fetch goes out
//! immediately; later ones wait until the configured interval has passed
//! since the previous fetch completed, so a slow page never shortens the gap.

use crate::config::PacingConfig;
use std::time::{Duration, Instant};

/// Enforces a minimum delay between the end of one request and the next
#[derive(Debug, Clone)]
pub struct Pacer {
    min_interval: Duration,
    last_finished: Option<Instant>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_finished: None,
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(Duration::from_millis(config.min_interval_ms))
    }

    /// Returns None if a request can be made now, or the duration to wait otherwise
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        let last = self.last_finished?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < self.min_interval).then(|| self.min_interval - elapsed)
    }

    /// Records that the previous request completed at `now`
    pub fn finished(&mut self, now: Instant) {
        self.last_finished = Some(now);
    }

    /// Sleeps until the next request is allowed
    pub async fn wait(&self) {
        if let Some(wait) = self.time_until_next_request(Instant::now()) {
            tracing::debug!("Pacing: waiting {}ms before next request", wait.as_millis());
            tokio::time::sleep(wait).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_request_is_immediate() {
        let pacer = Pacer::new(Duration::from_millis(1000));
        assert_eq!(pacer.time_until_next_request(Instant::now()), None);
    }

    #[test]
    fn test_time_until_next_request() {
        let mut pacer = Pacer::new(Duration::from_millis(1000));
        let done = Instant::now();
        pacer.finished(done);

        let wait = pacer
            .time_until_next_request(done + Duration::from_millis(400))
            .unwrap();
        assert_eq!(wait, Duration::from_millis(600));

        assert_eq!(
            pacer.time_until_next_request(done + Duration::from_millis(1000)),
            None
        );
    }

    #[test]
    fn test_zero_interval_never_waits() {
        let mut pacer = Pacer::from_config(&PacingConfig { min_interval_ms: 0 });
        let now = Instant::now();
        pacer.finished(now);
        assert_eq!(pacer.time_until_next_request(now), None);
    }

    #[tokio::test]
    async fn test_interval_counts_from_completion() {
        let mut pacer = Pacer::new(Duration::from_millis(100));

        pacer.wait().await;
        // A slow request: the interval must start only once it is done
        tokio::time::sleep(Duration::from_millis(80)).await;
        pacer.finished(Instant::now());

        let released = Instant::now();
        pacer.wait().await;
        assert!(released.elapsed() >= Duration::from_millis(90));
    }
}
