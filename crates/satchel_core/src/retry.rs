//! Retry configuration for flush passes.

use std::time::Duration;

/// Configuration for per-pass delivery retries.
///
/// A flush pass attempts the head operation up to
/// `max_attempts_per_pass` times with capped exponential backoff between
/// attempts. Operations that still fail stay queued for the next trigger;
/// the bound exists so one bad pass cannot stall its caller, not to
/// abandon writes.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum delivery attempts for one operation within one pass.
    pub max_attempts_per_pass: u32,
    /// Delay before the second attempt.
    pub initial_delay: Duration,
    /// Ceiling for the backoff delay.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub add_jitter: bool,
}

impl RetryConfig {
    /// Creates a retry configuration with the default backoff curve.
    pub fn new(max_attempts_per_pass: u32) -> Self {
        Self {
            max_attempts_per_pass,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    /// Creates a configuration that attempts each operation once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts_per_pass: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            add_jitter: false,
        }
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Calculates the delay before a given attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let base_delay = self.initial_delay.as_secs_f64()
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);

        let delay_secs = base_delay.min(self.max_delay.as_secs_f64());

        if self.add_jitter {
            // Up to 25% jitter.
            let jitter = delay_secs * 0.25 * time_jitter();
            Duration::from_secs_f64(delay_secs + jitter)
        } else {
            Duration::from_secs_f64(delay_secs)
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Deterministic-enough jitter without an RNG dependency.
fn time_jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .subsec_nanos();
    (nanos % 1000) as f64 / 1000.0
}
