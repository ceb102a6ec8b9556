//! Adaptive request throttling for polite month-by-month fetching.
//!
//! The [`RateLimiter`] enforces a minimum gap between consecutive requests
//! and, after failures, stretches that gap with exponential backoff capped
//! at a maximum delay.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use patro_core::throttle::{RateLimitConfig, RateLimiter};
//!
//! # async fn run() {
//! let config = RateLimitConfig::new(Duration::from_secs(1))
//!     .with_max_delay(Duration::from_secs(30));
//! let mut limiter = RateLimiter::new(config);
//!
//! limiter.wait_for_next_request().await; // first call never waits
//! limiter.record_error();
//! assert_eq!(limiter.current_delay(), Duration::from_secs(2));
//! # }
//! ```

use std::time::Duration;

use tokio::time::Instant;

/// Configuration for the rate limiter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Delay between consecutive requests while no failures are pending.
    pub min_delay: Duration,

    /// Upper bound for the backoff delay.
    pub max_delay: Duration,

    /// Double the delay for every consecutive failure.
    pub exponential_backoff: bool,
}

impl RateLimitConfig {
    /// Create a config with the given minimum delay, a 30 s cap and backoff
    /// enabled.
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay: Duration::from_secs(30),
            exponential_backoff: true,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Always use `min_delay`, regardless of failures.
    pub fn without_backoff(mut self) -> Self {
        self.exponential_backoff = false;
        self
    }
}

impl Default for RateLimitConfig {
    /// 1 second between months, backing off up to 30 seconds.
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

/// Tracks the last request time and consecutive failures for one
/// acquisition session.
///
/// Methods take `&mut self`: a limiter belongs to exactly one session and
/// is never shared between concurrent sessions.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    last_request: Option<Instant>,
    consecutive_errors: u32,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            last_request: None,
            consecutive_errors: 0,
        }
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    /// Delay the next request must respect, given the current failure count.
    ///
    /// `min_delay` while no backoff is active, otherwise
    /// `min(min_delay * 2^errors, max_delay)`.
    pub fn current_delay(&self) -> Duration {
        if !self.config.exponential_backoff || self.consecutive_errors == 0 {
            return self.config.min_delay;
        }
        2u32.checked_pow(self.consecutive_errors)
            .and_then(|factor| self.config.min_delay.checked_mul(factor))
            .map_or(self.config.max_delay, |d| d.min(self.config.max_delay))
    }

    /// Sleep until the current delay has elapsed since the previous request,
    /// then stamp the resume time as the last request.
    ///
    /// The first call after construction or [`reset`](Self::reset) returns
    /// immediately.
    pub async fn wait_for_next_request(&mut self) {
        if let Some(last) = self.last_request {
            let required = self.current_delay();
            let elapsed = last.elapsed();
            if elapsed < required {
                let sleep_duration = required - elapsed;
                tracing::debug!(
                    delay_ms = %sleep_duration.as_millis(),
                    consecutive_errors = self.consecutive_errors,
                    "Throttling request"
                );
                tokio::time::sleep(sleep_duration).await;
            }
        }
        self.last_request = Some(Instant::now());
    }

    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
    }

    pub fn record_error(&mut self) {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
        tracing::debug!(
            consecutive_errors = self.consecutive_errors,
            next_delay_ms = %self.current_delay().as_millis(),
            "Recorded request failure"
        );
    }

    /// Forget the last request time and the failure count.
    pub fn reset(&mut self) {
        self.last_request = None;
        self.consecutive_errors = 0;
    }
}
