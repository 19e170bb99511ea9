//! Detection session configuration and observable state.

use std::time::Duration;

use serde::Serialize;
use wakesight_common::config::DetectionDefaults;
use wakesight_common::error::{WakesightError, WakesightResult};
use wakesight_motion_model::{FrameGeometry, MotionData, Sensitivity};
use wakesight_platform_core::CaptureConstraints;

/// Default delay between the end of one tick and the start of the next.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Largest frame the analyzer is ever handed. Bigger frames are downscaled.
pub const MAX_ANALYSIS_WIDTH: u32 = 320;
pub const MAX_ANALYSIS_HEIGHT: u32 = 240;

/// Configuration for a detection session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// What to ask of the camera.
    pub constraints: CaptureConstraints,

    /// Initial sensitivity.
    pub sensitivity: Sensitivity,

    /// Whether auto-wake events are emitted initially.
    pub auto_wake_enabled: bool,

    /// Delay between ticks, measured from tick completion.
    pub tick_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            constraints: CaptureConstraints::default(),
            sensitivity: Sensitivity::Medium,
            auto_wake_enabled: true,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

impl SessionConfig {
    /// Build a typed session configuration from the persisted defaults.
    pub fn from_defaults(defaults: &DetectionDefaults) -> WakesightResult<Self> {
        let sensitivity: Sensitivity = defaults
            .sensitivity
            .parse()
            .map_err(|e| WakesightError::config(format!("{e}")))?;

        if defaults.tick_interval_ms == 0 {
            return Err(WakesightError::config("tick_interval_ms must be positive"));
        }
        if defaults.max_width == 0 || defaults.max_height == 0 {
            return Err(WakesightError::config(
                "max_width and max_height must be positive",
            ));
        }
        if defaults.max_width > MAX_ANALYSIS_WIDTH || defaults.max_height > MAX_ANALYSIS_HEIGHT {
            return Err(WakesightError::config(format!(
                "max_width x max_height of {}x{} exceeds the {MAX_ANALYSIS_WIDTH}x{MAX_ANALYSIS_HEIGHT} analysis bound",
                defaults.max_width, defaults.max_height
            )));
        }

        let constraints = CaptureConstraints {
            ideal_width: defaults.max_width,
            ideal_height: defaults.max_height,
            ideal_fps: defaults.ideal_fps.max(1),
            max_width: defaults.max_width,
            max_height: defaults.max_height,
            open_timeout: Duration::from_millis(defaults.open_timeout_ms),
            device: defaults.device.clone(),
        };

        Ok(Self {
            constraints,
            sensitivity,
            auto_wake_enabled: defaults.auto_wake,
            tick_interval: Duration::from_millis(defaults.tick_interval_ms),
        })
    }
}

/// Lifecycle state of a detection session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, never started.
    #[default]
    Idle,
    /// Waiting for the frame source to negotiate.
    Initializing,
    /// Sampling ticks are running.
    Active,
    /// Stopped by the caller.
    Stopped,
    /// The last start attempt failed.
    Error,
}

/// Counters accumulated over the lifetime of a controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Ticks that produced a motion sample.
    pub ticks_processed: u64,
    /// Ticks whose frame read failed.
    pub ticks_skipped: u64,
    /// Ticks that detected motion.
    pub motion_ticks: u64,
    /// Auto-wake events emitted.
    pub auto_wake_events: u64,
}

/// Observable snapshot of a detection session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub state: SessionState,
    pub is_active: bool,
    pub is_initialized: bool,
    pub sensitivity: Sensitivity,
    pub auto_wake_enabled: bool,
    pub error: Option<String>,
    pub current_motion: MotionData,
    /// Geometry reported by the frame source at start.
    pub geometry: Option<FrameGeometry>,
    pub stats: SessionStats,
}

impl Session {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            state: SessionState::Idle,
            is_active: false,
            is_initialized: false,
            sensitivity: config.sensitivity,
            auto_wake_enabled: config.auto_wake_enabled,
            error: None,
            current_motion: MotionData::default(),
            geometry: None,
            stats: SessionStats::default(),
        }
    }

    pub(crate) fn begin_initializing(&mut self) {
        self.state = SessionState::Initializing;
        self.is_active = false;
        self.is_initialized = false;
        self.error = None;
    }

    pub(crate) fn activate(&mut self, geometry: FrameGeometry) {
        self.state = SessionState::Active;
        self.is_active = true;
        self.is_initialized = true;
        self.geometry = Some(geometry);
        self.current_motion = MotionData::still(self.current_motion.last_motion_time);
    }

    pub(crate) fn fail(&mut self, error: &WakesightError) {
        self.state = SessionState::Error;
        self.is_active = false;
        self.is_initialized = false;
        self.error = Some(error.to_string());
    }

    pub(crate) fn mark_stopped(&mut self) {
        self.state = SessionState::Stopped;
        self.is_active = false;
        self.is_initialized = false;
    }
}
