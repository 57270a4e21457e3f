use crate::clock::{Clock, TokioClock};
use rand::Rng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::trace;

/// Sliding window policy: at most `max_requests` grants in any rolling `window`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitConfig {
    pub max_requests: usize,
    pub window: Duration,
    /// Shortest sleep taken when the window is saturated.
    pub floor: Duration,
    /// Inclusive bounds of the random delay added after every grant.
    pub jitter: (Duration, Duration),
}

impl Default for RateLimitConfig {
    // SEC fair access is 10 requests/s; 8 per 10s keeps the spider well clear of it
    fn default() -> Self {
        Self {
            max_requests: 8,
            window: Duration::from_secs(10),
            floor: Duration::from_millis(100),
            jitter: (Duration::from_millis(100), Duration::from_millis(500)),
        }
    }
}

/// Request throttle shared by every worker that talks to a rate-limited API.
///
/// The window of granted timestamps is the only state mutated across workers; eviction, the
/// saturation check, and recording a grant all happen under one lock.
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    granted: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self::with_clock(config, Arc::new(TokioClock))
    }

    pub fn with_clock(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let capacity = config.max_requests;
        Self {
            config,
            clock,
            granted: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Wait until one more request fits in the window, record it, then sleep a random jitter.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut granted = self.granted.lock().await;
                let now = self.clock.now();

                while let Some(oldest) = granted.front() {
                    if now.saturating_duration_since(*oldest) >= self.config.window {
                        granted.pop_front();
                    } else {
                        break;
                    }
                }

                if granted.len() < self.config.max_requests.max(1) {
                    granted.push_back(now);
                    None
                } else {
                    // saturated: the front of the queue is the next slot to free up
                    let oldest = granted.front().copied().unwrap_or(now);
                    let expires_in = self
                        .config
                        .window
                        .saturating_sub(now.saturating_duration_since(oldest));
                    Some(expires_in.max(self.config.floor))
                }
            };

            match wait {
                None => break,
                Some(wait) => {
                    trace!("rate limit window saturated, waiting {wait:?}");
                    self.clock.sleep(wait).await;
                }
            }
        }

        let jitter = self.jitter();
        if !jitter.is_zero() {
            self.clock.sleep(jitter).await;
        }
    }

    fn jitter(&self) -> Duration {
        let (low, high) = self.config.jitter;
        if high <= low {
            return low;
        }
        let secs = rand::thread_rng().gen_range(low.as_secs_f64()..=high.as_secs_f64());
        Duration::from_secs_f64(secs)
    }
}

//////////////////////////////////////////////////////////////
// -- TESTS --
//////////////////////////////////////////////////////////////
