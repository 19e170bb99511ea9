//! The sampling task owned by an active session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use wakesight_common::clock::SessionClock;
use wakesight_detection_core::{MotionAnalyzer, MotionAssessment};
use wakesight_motion_model::MotionData;
use wakesight_platform_core::CaptureConstraints;

use crate::backend::FrameSource;
use crate::controller::AutoWakeEvent;
use crate::scheduler::{CancelToken, Ticker};
use crate::session::{Session, SessionStats, MAX_ANALYSIS_HEIGHT, MAX_ANALYSIS_WIDTH};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum TickOutcome {
    /// The session was stopped; nothing was touched.
    Cancelled,
    /// The frame read failed; nothing was published.
    Skipped,
    Sampled(MotionData),
}

/// Owns the frame source and the previous frame while a session is active.
pub(crate) struct Sampler {
    source: Box<dyn FrameSource>,
    analyzer: MotionAnalyzer,
    state: Arc<watch::Sender<Session>>,
    wake_tx: broadcast::Sender<AutoWakeEvent>,
    token: CancelToken,
    clock: SessionClock,
    max_width: u32,
    max_height: u32,
    stats: SessionStats,
}

impl Sampler {
    pub(crate) fn new(
        source: Box<dyn FrameSource>,
        state: Arc<watch::Sender<Session>>,
        wake_tx: broadcast::Sender<AutoWakeEvent>,
        token: CancelToken,
        constraints: &CaptureConstraints,
    ) -> Self {
        let stats = state.borrow().stats;
        Self {
            source,
            analyzer: MotionAnalyzer::new(),
            state,
            wake_tx,
            token,
            clock: SessionClock::start(),
            // Hand-built configs skip from_defaults validation.
            max_width: constraints.max_width.min(MAX_ANALYSIS_WIDTH),
            max_height: constraints.max_height.min(MAX_ANALYSIS_HEIGHT),
            stats,
        }
    }

    /// Tick until cancelled, then hand the frame source back.
    ///
    /// The analyzer, and with it the previous frame, is dropped here.
    pub(crate) async fn run(mut self, ticker: Ticker) -> Box<dyn FrameSource> {
        tracing::debug!(
            source = self.source.name(),
            interval_ms = ticker.interval().as_millis() as u64,
            "Sampling task started"
        );
        while ticker.wait().await {
            if self.tick() == TickOutcome::Cancelled {
                break;
            }
        }
        tracing::debug!(
            source = self.source.name(),
            processed = self.stats.ticks_processed,
            skipped = self.stats.ticks_skipped,
            "Sampling task finished"
        );
        self.source
    }

    /// Run one sampling cycle synchronously.
    pub(crate) fn tick(&mut self) -> TickOutcome {
        if self.token.is_cancelled() {
            return TickOutcome::Cancelled;
        }

        let frame = match self.source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.ticks_skipped += 1;
                tracing::warn!(
                    source = self.source.name(),
                    error = %e,
                    "Frame read failed, skipping tick"
                );
                return TickOutcome::Skipped;
            }
        };
        let frame = frame.fit_within(self.max_width, self.max_height);

        // Settings are read fresh so changes only affect this and later ticks.
        let (sensitivity, auto_wake_enabled, previous_motion_time) = {
            let session = self.state.borrow();
            (
                session.sensitivity,
                session.auto_wake_enabled,
                session.current_motion.last_motion_time,
            )
        };

        let assessment = self.analyzer.analyze(frame, sensitivity);
        let motion = assemble_motion(&assessment, previous_motion_time, self.clock.now());
        let wake = auto_wake_enabled && assessment.exceeds_auto_wake();

        self.stats.ticks_processed += 1;
        if motion.is_motion_detected {
            self.stats.motion_ticks += 1;
        }
        if wake {
            self.stats.auto_wake_events += 1;
        }

        let stats = self.stats;
        let token = &self.token;
        let applied = self.state.send_if_modified(|session| {
            // Checked under the state lock: stop() cancels under the same lock.
            if token.is_cancelled() {
                return false;
            }
            session.current_motion = motion;
            session.stats = stats;
            true
        });
        if !applied {
            return TickOutcome::Cancelled;
        }

        if wake {
            tracing::info!(
                raw_intensity = assessment.raw_intensity,
                threshold = assessment.threshold,
                direction = %motion.motion_direction,
                "Auto-wake triggered"
            );
            // No subscribers is not an error.
            let _ = self.wake_tx.send(AutoWakeEvent {
                motion,
                raw_intensity: assessment.raw_intensity,
                threshold: assessment.threshold,
                sensitivity,
            });
        }

        TickOutcome::Sampled(motion)
    }
}

/// Turn an assessment into the observable sample.
///
/// `last_motion_time` only moves on detected motion and never goes
/// backwards relative to the previous sample.
pub(crate) fn assemble_motion(
    assessment: &MotionAssessment,
    previous_motion_time: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> MotionData {
    let last_motion_time = if assessment.is_motion_detected {
        Some(previous_motion_time.map_or(now, |previous| previous.max(now)))
    } else {
        previous_motion_time
    };

    MotionData {
        is_motion_detected: assessment.is_motion_detected,
        motion_intensity: assessment.motion_intensity,
        last_motion_time,
        motion_direction: assessment.direction,
        confidence_level: assessment.confidence_level,
    }
}
