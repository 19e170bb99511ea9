//! Motion detection controller.
//!
//! Owns the session state machine:
//!
//! ```text
//! Idle ──start()──▶ Initializing ──ok──▶ Active ──stop()──▶ Stopped
//!                        │                                    ▲
//!                        └──acquisition failure──▶ Error ─────┘ stop()
//! ```
//!
//! `start()` may be called again from `Stopped` or `Error`; nothing is
//! retried automatically.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use wakesight_common::error::{WakesightError, WakesightResult};
use wakesight_motion_model::{MotionData, Sensitivity};

use crate::backend::{default_source, FrameSource};
use crate::sampler::Sampler;
use crate::scheduler::{CancelToken, Ticker};
use crate::session::{Session, SessionConfig};

/// Buffered auto-wake events per subscriber before the oldest are dropped.
const AUTO_WAKE_CAPACITY: usize = 16;

/// Emitted when motion is strong enough to wake a sleeping consumer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AutoWakeEvent {
    /// The sample that triggered the event.
    pub motion: MotionData,
    /// Unnormalized mean moved difference.
    pub raw_intensity: f64,
    /// Pixel threshold in force for the triggering tick.
    pub threshold: u32,
    pub sensitivity: Sensitivity,
}

struct RunningSampler {
    token: CancelToken,
    task: JoinHandle<Box<dyn FrameSource>>,
}

/// Drives one frame source through detection sessions.
pub struct MotionController {
    config: SessionConfig,
    /// Present whenever no sampling task holds the source.
    source: Option<Box<dyn FrameSource>>,
    state: Arc<watch::Sender<Session>>,
    wake_tx: broadcast::Sender<AutoWakeEvent>,
    running: Option<RunningSampler>,
}

impl MotionController {
    pub fn new(config: SessionConfig, source: Box<dyn FrameSource>) -> Self {
        let (state, _) = watch::channel(Session::new(&config));
        let (wake_tx, _) = broadcast::channel(AUTO_WAKE_CAPACITY);
        Self {
            config,
            source: Some(source),
            state: Arc::new(state),
            wake_tx,
            running: None,
        }
    }

    /// Controller over this platform's camera.
    pub fn with_default_source(config: SessionConfig) -> WakesightResult<Self> {
        Ok(Self::new(config, default_source()?))
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Acquire the frame source and begin sampling.
    ///
    /// Suspends while the source negotiates. On failure the session moves
    /// to `Error`, its `error` field is populated and the returned error is
    /// always an acquisition error.
    pub async fn start(&mut self) -> WakesightResult<()> {
        if self.running.is_some() {
            return Err(WakesightError::session("Detection session is already active"));
        }
        let Some(mut source) = self.source.take() else {
            let err = WakesightError::unavailable("Frame source was lost by a previous session");
            tracing::warn!(error = %err, "Cannot start without a frame source");
            self.state.send_modify(|session| session.fail(&err));
            return Err(err);
        };

        tracing::info!(
            source = source.name(),
            sensitivity = %self.state.borrow().sensitivity,
            "Starting detection session"
        );
        self.state.send_modify(Session::begin_initializing);

        let geometry = match source.open(&self.config.constraints).await {
            Ok(geometry) => geometry,
            Err(e) => {
                let err = if e.is_acquisition() {
                    e
                } else {
                    WakesightError::unavailable(e.to_string())
                };
                tracing::warn!(source = source.name(), error = %err, "Camera acquisition failed");
                self.state.send_modify(|session| session.fail(&err));
                self.source = Some(source);
                return Err(err);
            }
        };

        self.state.send_modify(|session| session.activate(geometry));

        let token = CancelToken::new();
        let sampler = Sampler::new(
            source,
            self.state.clone(),
            self.wake_tx.clone(),
            token.clone(),
            &self.config.constraints,
        );
        let ticker = Ticker::new(self.config.tick_interval, token.clone());
        let task = tokio::spawn(sampler.run(ticker));
        self.running = Some(RunningSampler { token, task });

        tracing::info!(%geometry, "Detection session active");
        Ok(())
    }

    /// Stop sampling and release the frame source. Idempotent.
    ///
    /// Once this returns no further motion updates are published.
    pub async fn stop(&mut self) {
        let running = self.running.take();
        self.state.send_modify(|session| {
            if let Some(running) = &running {
                running.token.cancel();
            }
            session.mark_stopped();
        });

        let Some(running) = running else {
            tracing::debug!("Stop requested with no active sampling task");
            return;
        };

        match running.task.await {
            Ok(mut source) => {
                if let Err(e) = source.close().await {
                    tracing::warn!(source = source.name(), error = %e, "Failed to close frame source");
                }
                self.source = Some(source);
            }
            Err(e) => {
                tracing::error!(error = %e, "Sampling task ended abnormally, frame source dropped");
            }
        }

        let stats = self.state.borrow().stats;
        tracing::info!(
            processed = stats.ticks_processed,
            skipped = stats.ticks_skipped,
            motion = stats.motion_ticks,
            auto_wake = stats.auto_wake_events,
            "Detection session stopped"
        );
    }

    /// Change the sensitivity used by subsequent ticks.
    pub fn set_sensitivity(&self, level: Sensitivity) {
        self.state.send_if_modified(|session| {
            if session.sensitivity == level {
                return false;
            }
            tracing::info!(from = %session.sensitivity, to = %level, "Sensitivity changed");
            session.sensitivity = level;
            true
        });
    }

    /// Gate auto-wake events for subsequent ticks.
    pub fn set_auto_wake_enabled(&self, enabled: bool) {
        self.state.send_if_modified(|session| {
            if session.auto_wake_enabled == enabled {
                return false;
            }
            tracing::info!(enabled, "Auto-wake toggled");
            session.auto_wake_enabled = enabled;
            true
        });
    }

    /// Current session state.
    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().is_active
    }

    /// Receive every session state change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Receive auto-wake events emitted after this call.
    pub fn subscribe_auto_wake(&self) -> broadcast::Receiver<AutoWakeEvent> {
        self.wake_tx.subscribe()
    }
}

impl Drop for MotionController {
    fn drop(&mut self) {
        // The task exits at its next wakeup and drops the source with it.
        if let Some(running) = self.running.take() {
            running.token.cancel();
        }
    }
}
