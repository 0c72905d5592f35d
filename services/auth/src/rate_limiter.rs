//! Rate limiter for preventing brute force attacks
//!
//! Login attempts are counted per username. Once a key exhausts its
//! attempts inside the window it is banned for the configured duration.
//! Keys whose window and ban have both run out are swept at most once per
//! window, so the table only holds keys seen recently.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::warn;

/// Login attempt limits
#[derive(Debug, Clone)]
pub struct RateLimiterConfig {
    /// Attempts allowed inside one window
    pub max_attempts: u32,
    /// Window length in seconds
    pub window_seconds: u64,
    /// Ban length in seconds
    pub ban_duration_seconds: u64,
}

impl Default for RateLimiterConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_seconds: 300,
            ban_duration_seconds: 3600,
        }
    }
}

#[derive(Debug)]
struct Attempts {
    count: u32,
    last_attempt: Instant,
    banned_until: Option<Instant>,
}

impl Attempts {
    fn new(now: Instant) -> Self {
        Self {
            count: 0,
            last_attempt: now,
            banned_until: None,
        }
    }

    /// Clear an expired ban or window; true while a ban is still active
    fn refresh(&mut self, now: Instant, window: Duration) -> bool {
        match self.banned_until {
            Some(until) if now < until => return true,
            Some(_) => {
                self.count = 0;
                self.banned_until = None;
            }
            None => {}
        }

        if now.duration_since(self.last_attempt) >= window {
            self.count = 0;
        }

        false
    }

    /// Nothing left to remember: no active ban and the window has passed
    fn is_stale(&self, now: Instant, window: Duration) -> bool {
        self.banned_until.is_none_or(|until| now >= until)
            && now.duration_since(self.last_attempt) >= window
    }
}

#[derive(Debug)]
struct Tracker {
    entries: HashMap<String, Attempts>,
    last_sweep: Instant,
}

impl Tracker {
    fn sweep(&mut self, now: Instant, window: Duration) {
        if now.duration_since(self.last_sweep) < window {
            return;
        }

        self.entries
            .retain(|_, attempts| !attempts.is_stale(now, window));
        self.last_sweep = now;
    }
}

/// Per-key attempt counter shared across requests
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimiterConfig,
    tracker: Arc<Mutex<Tracker>>,
}

impl RateLimiter {
    pub fn new(config: RateLimiterConfig) -> Self {
        Self {
            config,
            tracker: Arc::new(Mutex::new(Tracker {
                entries: HashMap::new(),
                last_sweep: Instant::now(),
            })),
        }
    }

    /// Record an attempt for `key` and report whether it may proceed
    pub async fn is_allowed(&self, key: &str) -> Result<bool> {
        let now = Instant::now();
        let window = Duration::from_secs(self.config.window_seconds);
        let mut tracker = self.tracker.lock().await;

        tracker.sweep(now, window);

        let attempts = tracker
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Attempts::new(now));

        if attempts.refresh(now, window) {
            return Ok(false);
        }

        if attempts.count >= self.config.max_attempts {
            attempts.banned_until =
                Some(now + Duration::from_secs(self.config.ban_duration_seconds));
            warn!(
                "Banned key {} for {} seconds",
                key, self.config.ban_duration_seconds
            );
            return Ok(false);
        }

        attempts.count += 1;
        attempts.last_attempt = now;

        Ok(true)
    }

    /// Forget the attempts recorded for `key`, unless it is banned
    pub async fn reset(&self, key: &str) {
        let mut tracker = self.tracker.lock().await;
        if tracker
            .entries
            .get(key)
            .is_some_and(|attempts| attempts.banned_until.is_none())
        {
            tracker.entries.remove(key);
        }
    }
}
