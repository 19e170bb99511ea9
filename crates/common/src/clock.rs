//! Clock utilities for detection sessions.
//!
//! Every session is anchored to a monotonic epoch recorded when the camera
//! is acquired. Wall-clock timestamps handed to observers are derived from
//! that epoch, so they never run backwards while the session is active even
//! if the system clock is adjusted.

use std::time::Instant;

use chrono::{DateTime, Utc};

/// A session clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment the session started).
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session started.
    epoch: Instant,

    /// Wall-clock time at epoch.
    epoch_wall: DateTime<Utc>,
}

impl SessionClock {
    /// Create a new session clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: Utc::now(),
        }
    }

    /// Create a clock from a known epoch.
    pub fn from_epoch(epoch: Instant, wall: DateTime<Utc>) -> Self {
        Self {
            epoch,
            epoch_wall: wall,
        }
    }

    /// Get nanoseconds elapsed since session start.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Get seconds elapsed since session start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> DateTime<Utc> {
        self.epoch_wall
    }

    /// Monotonic wall-clock timestamp: epoch wall time plus elapsed
    /// monotonic time.
    pub fn now(&self) -> DateTime<Utc> {
        let elapsed = chrono::Duration::from_std(self.epoch.elapsed())
            .unwrap_or_else(|_| chrono::Duration::zero());
        self.epoch_wall + elapsed
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }
}
