//! Shared request rate limiter.

use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::rate_limit::SlidingWindow;

/// Upper bound on a single sleep while waiting for capacity.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A sliding window rate limiter shared by every request a client makes.
///
/// Each acquisition attempt prunes, checks and records under one lock. The
/// lock is released before sleeping, so waiters poll rather than queue and no
/// FIFO order is promised.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use kleinanzeigen_api_client::rate_limit::RateLimiter;
///
/// # #[tokio::main]
/// # async fn main() {
/// let limiter = RateLimiter::new(2, Duration::from_secs(1));
/// assert!(limiter.acquire(None).await);
/// assert!(limiter.acquire(None).await);
/// assert!(!limiter.acquire(Some(Duration::from_millis(10))).await);
/// # }
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    window: Mutex<SlidingWindow>,
    poll_interval: Duration,
}

impl RateLimiter {
    /// Create a limiter admitting `max_requests` per `window`.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            window: Mutex::new(SlidingWindow::new(window, max_requests)),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the maximum sleep between capacity checks.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Wait for permission to make a request.
    ///
    /// With `timeout = None` this waits until capacity frees up. With a
    /// timeout it returns `false` as soon as the projected wait would exceed
    /// it; a refused attempt never records a timestamp.
    pub async fn acquire(&self, timeout: Option<Duration>) -> bool {
        let start = Instant::now();

        loop {
            let wait_time = {
                let mut window = self.window.lock().await;
                match window.try_acquire() {
                    Ok(()) => return true,
                    Err(wait_time) => wait_time,
                }
            };

            if let Some(timeout) = timeout {
                if start.elapsed() + wait_time > timeout {
                    tracing::debug!(
                        "Rate limit permit not available within {:?} (next in {:?})",
                        timeout,
                        wait_time
                    );
                    return false;
                }
            }

            tokio::time::sleep(wait_time.min(self.poll_interval)).await;
        }
    }

    /// Point-in-time count of requests that would be admitted now.
    pub async fn available_requests(&self) -> u32 {
        self.window.lock().await.remaining()
    }

    /// Forget every recorded request.
    pub async fn reset(&self) {
        self.window.lock().await.clear();
    }

    /// Maximum requests per window.
    pub async fn max_requests(&self) -> u32 {
        self.window.lock().await.max_requests()
    }

    /// Window duration.
    pub async fn window(&self) -> Duration {
        self.window.lock().await.window()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(
            super::limits::MAX_REQUESTS,
            Duration::from_secs(super::limits::WINDOW_SECONDS),
        )
    }
}
