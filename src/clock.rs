//! Clock abstraction for eviction timestamps
//!
//! All time-dependent state in the uniqueness stores goes through the
//! [`Clock`] trait so that eviction behavior can be driven deterministically
//! in tests instead of sleeping on the real clock.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Wall-clock timestamp in milliseconds since the UNIX epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct EpochMillis(pub u64);

impl EpochMillis {
    pub const ZERO: EpochMillis = EpochMillis(0);

    pub fn from_millis(ms: u64) -> Self {
        EpochMillis(ms)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Age of `earlier` relative to `self`, saturating at zero
    pub fn age_since(&self, earlier: EpochMillis) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl std::ops::Add<Duration> for EpochMillis {
    type Output = EpochMillis;

    fn add(self, rhs: Duration) -> Self::Output {
        EpochMillis(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

/// Time source for insertion timestamps
///
/// Implementations:
/// - `SystemClock`: real wall-clock time
/// - `ManualClock`: explicitly advanced, for deterministic tests
pub trait Clock: Send + Sync + Clone + 'static {
    fn now(&self) -> EpochMillis;
}

/// Production clock anchored to the system time at construction
#[derive(Clone)]
pub struct SystemClock {
    start: Instant,
    start_millis: u64,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        use std::time::{SystemTime, UNIX_EPOCH};
        let start_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before UNIX_EPOCH")
            .as_millis() as u64;
        SystemClock {
            start: Instant::now(),
            start_millis,
        }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> EpochMillis {
        let elapsed = self.start.elapsed().as_millis() as u64;
        EpochMillis(self.start_millis + elapsed)
    }
}

/// Manually advanced clock for deterministic eviction tests
///
/// Time only moves when `advance_ms()` or `set()` is called. Clones share
/// the underlying counter.
#[derive(Clone)]
pub struct ManualClock {
    time_ms: Arc<AtomicU64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        ManualClock {
            time_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance_ms(&self, ms: u64) {
        self.time_ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, time_ms: u64) {
        self.time_ms.store(time_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> EpochMillis {
        EpochMillis(self.time_ms.load(Ordering::SeqCst))
    }
}
