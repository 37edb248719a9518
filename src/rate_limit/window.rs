//! Sliding window bookkeeping.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use kleinanzeigen_api_client::rate_limit::SlidingWindow;
//!
//! let mut window = SlidingWindow::new(Duration::from_secs(1), 2);
//! assert!(window.try_acquire().is_ok());
//! assert!(window.try_acquire().is_ok());
//! assert!(window.try_acquire().is_err());
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A sliding window rate limiter.
///
/// Tracks accepted request timestamps in chronological order and admits at
/// most `max_requests` of them in any trailing `window`. Accepted entries are
/// never dropped early; capacity is enforced by refusing new ones.
#[derive(Debug)]
pub struct SlidingWindow {
    /// Accepted request timestamps, oldest first
    requests: VecDeque<Instant>,
    /// Window duration
    window: Duration,
    /// Maximum requests per window
    max_requests: u32,
}

impl SlidingWindow {
    /// Create a new sliding window.
    pub fn new(window: Duration, max_requests: u32) -> Self {
        Self {
            requests: VecDeque::with_capacity(max_requests as usize),
            window,
            max_requests,
        }
    }

    /// Try to record a request now.
    ///
    /// Returns `Ok(())` if allowed, or `Err(wait_time)` until the oldest
    /// retained request leaves the window.
    pub fn try_acquire(&mut self) -> Result<(), Duration> {
        self.prune();

        if (self.requests.len() as u32) < self.max_requests {
            self.requests.push_back(Instant::now());
            Ok(())
        } else {
            let wait_time = self
                .requests
                .front()
                .map(|oldest| self.window.saturating_sub(oldest.elapsed()))
                .unwrap_or_default();
            Err(wait_time)
        }
    }

    /// Number of requests that would be admitted right now.
    pub fn remaining(&mut self) -> u32 {
        self.prune();
        self.max_requests.saturating_sub(self.requests.len() as u32)
    }

    /// Forget every recorded request.
    pub fn clear(&mut self) {
        self.requests.clear();
    }

    /// Window duration.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Maximum requests per window.
    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    /// Drop timestamps that have left the window.
    fn prune(&mut self) {
        while self
            .requests
            .front()
            .is_some_and(|ts| ts.elapsed() >= self.window)
        {
            self.requests.pop_front();
        }
    }
}
