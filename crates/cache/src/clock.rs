//! Time abstraction for testability
//!
//! Provides a trait-based approach to time operations that allows for
//! deterministic testing without relying on actual time passage. Cell
//! expiration timestamps are absolute milliseconds since the UNIX epoch,
//! so the trait exposes both monotonic and wall-clock time.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use cellar_cache::{Clock, MockClock, SystemClock};
//!
//! // Use system clock in production
//! let clock = SystemClock;
//! let now = clock.now();
//!
//! // Use mock clock in tests
//! let mock = MockClock::new();
//! let start = mock.now();
//! mock.advance(Duration::from_secs(5));
//! let end = mock.now();
//! assert_eq!(end.duration_since(start), Duration::from_secs(5));
//! ```

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Trait for time operations to enable testing
///
/// This trait provides an abstraction over time operations, allowing the
/// cache to work with either real system time or mocked time for testing.
pub trait Clock: Send + Sync {
    /// Get current instant (monotonic time)
    ///
    /// Returns a monotonic timestamp suitable for measuring durations.
    fn now(&self) -> Instant;

    /// Get current system time (wall clock)
    ///
    /// Returns the current wall clock time.
    fn system_time(&self) -> SystemTime;

    /// Get milliseconds since UNIX epoch
    ///
    /// Convenience method for getting the current time as milliseconds
    /// since the UNIX epoch (January 1, 1970). Expiration timestamps are
    /// computed and compared in this unit.
    fn millis_since_epoch(&self) -> u64 {
        self.system_time().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis() as u64
    }
}

/// Real system clock implementation
///
/// This implementation uses the actual system clock for time operations.
/// Use this in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient sharing
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn system_time(&self) -> SystemTime {
        (**self).system_time()
    }
}

/// Mock clock for deterministic testing
///
/// This implementation allows you to control time in tests, making them
/// deterministic and fast. You can advance time manually without actually
/// waiting. Clones share the same elapsed offset, so a clone handed to a
/// cache stays in sync with the clone kept by the test.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use cellar_cache::{Clock, MockClock};
///
/// let clock = MockClock::new();
/// let start = clock.millis_since_epoch();
///
/// // Simulate 5 seconds passing
/// clock.advance(Duration::from_secs(5));
///
/// assert_eq!(clock.millis_since_epoch(), start + 5000);
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
    base_system_time: SystemTime,
}

impl MockClock {
    /// Create a new mock clock
    ///
    /// The clock starts at the current real time but can be advanced
    /// manually without real time passing.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
            base_system_time: SystemTime::now(),
        }
    }

    /// Advance the mock clock by a duration
    ///
    /// This simulates the passage of time without actual delays.
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    /// Get the total time this clock has been advanced
    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or_default()
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    fn system_time(&self) -> SystemTime {
        self.base_system_time + self.elapsed()
    }
}
