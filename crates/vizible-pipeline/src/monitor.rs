//! Link liveness tracking.
//!
//! The sensor unit pushes one record roughly every few hundred
//! milliseconds while it is powered. Tracking the arrival time of the
//! last parsed reading lets callers distinguish "link open but sensor
//! silent" from "link streaming normally" without touching the read
//! thread.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Process-wide monotonic base. All timestamps are microseconds since
/// the first call in this process.
static APP_START: OnceLock<Instant> = OnceLock::new();

/// Microseconds elapsed since the process-wide base instant.
pub fn monotonic_micros() -> u64 {
    let start = APP_START.get_or_init(Instant::now);
    start.elapsed().as_micros() as u64
}

/// Tracks when the last sensor reading was parsed.
///
/// `0` means "no reading seen yet". The read thread stores, everyone
/// else loads; Relaxed ordering is enough because the value is only
/// used for staleness checks.
#[derive(Debug, Default)]
pub struct ConnectionMonitor {
    last_reading_us: AtomicU64,
}

impl ConnectionMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that a reading was just parsed. Called from the read
    /// thread only.
    pub fn register_reading(&self) {
        // Offset by 1 so that a reading at t=0 is distinguishable from
        // "never seen".
        self.last_reading_us
            .store(monotonic_micros().max(1), Ordering::Relaxed);
    }

    /// Time since the last parsed reading, or `None` if no reading has
    /// been seen yet.
    pub fn time_since_last_reading(&self) -> Option<Duration> {
        let last = self.last_reading_us.load(Ordering::Relaxed);
        if last == 0 {
            return None;
        }
        Some(Duration::from_micros(
            monotonic_micros().saturating_sub(last),
        ))
    }

    /// Whether a reading arrived within `window`.
    ///
    /// Returns `false` both when the stream has gone stale and when no
    /// reading has been seen at all.
    pub fn is_active(&self, window: Duration) -> bool {
        match self.time_since_last_reading() {
            Some(elapsed) => elapsed <= window,
            None => false,
        }
    }
}
