//! Wakesight platform core contracts.
//!
//! This crate contains cross-platform camera data structures used by the
//! capture engine and platform crates without coupling to a concrete OS
//! backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Information about a detected camera device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CameraInfo {
    /// Human readable device name (e.g. "Integrated Camera").
    pub name: String,
    /// Platform device path or identifier (e.g. "/dev/video0").
    pub device: String,
    /// Whether the current process may open the device.
    pub accessible: bool,
    /// Webcam likelihood score. Higher is a better candidate, zero means
    /// the device is known not to be a webcam.
    pub priority: u32,
}

/// Platform family the engine is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Linux,
    Windows,
    MacOS,
    #[default]
    Unknown,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "linux") {
            Platform::Linux
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::MacOS
        } else {
            Platform::Unknown
        }
    }
}

/// What the engine asks of a camera when opening it.
///
/// The ideal values are preferences: a source may deliver larger frames,
/// which the caller then downscales to fit `max_width x max_height`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub ideal_fps: u32,
    pub max_width: u32,
    pub max_height: u32,
    /// Upper bound on device negotiation, including the wait for the first
    /// frame with a stable geometry.
    pub open_timeout: Duration,
    /// Explicit device to open. `None` selects the preferred camera.
    pub device: Option<String>,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 320,
            ideal_height: 240,
            ideal_fps: 15,
            max_width: 320,
            max_height: 240,
            open_timeout: Duration::from_secs(5),
            device: None,
        }
    }
}

/// Pick the best camera: highest priority among accessible devices,
/// earliest entry on ties. Devices with priority zero are never chosen.
pub fn select_preferred_camera(cameras: &[CameraInfo]) -> Option<&CameraInfo> {
    cameras
        .iter()
        .filter(|c| c.accessible && c.priority > 0)
        .fold(None, |best: Option<&CameraInfo>, candidate| match best {
            Some(current) if current.priority >= candidate.priority => Some(current),
            _ => Some(candidate),
        })
}
