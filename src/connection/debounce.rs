//! # Trailing-Edge Debounce
//!
//! Coalesces rapid repeated inputs into one delayed value.
//!
//! Every [`Debouncer::push`] cancels whatever was pending and restarts the
//! quiet window, so at most one value is ever pending. The owner drives the
//! timer: it sleeps until [`Debouncer::deadline`] and then calls
//! [`Debouncer::poll`].
//!
//! ```
//! use std::time::Duration;
//! use tokio::time::Instant;
//! use sweep_dash::connection::debounce::Debouncer;
//!
//! let mut debounce = Debouncer::new(Duration::from_millis(500));
//! let t0 = Instant::now();
//!
//! debounce.push(10, t0);
//! debounce.push(11, t0 + Duration::from_millis(100));
//!
//! assert_eq!(debounce.poll(t0 + Duration::from_millis(500)), None);
//! assert_eq!(debounce.poll(t0 + Duration::from_millis(600)), Some(11));
//! ```

use std::time::Duration;
use tokio::time::Instant;

/// Trailing-edge debouncer holding at most one pending value
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    deadline: Instant,
    value: T,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet window
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Quiet window length
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending value and restart the quiet window
    ///
    /// # Returns
    ///
    /// * `bool` - true if an earlier pending value was cancelled
    pub fn push(&mut self, value: T, now: Instant) -> bool {
        self.pending
            .replace(Pending {
                deadline: now + self.delay,
                value,
            })
            .is_some()
    }

    /// When the pending value becomes due, if any
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Whether a value is waiting for its quiet window to end
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Take the pending value if its quiet window has elapsed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some(p) if p.deadline <= now => self.pending.take().map(|p| p.value),
            _ => None,
        }
    }

    /// Drop the pending value without firing
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }
}
