//! V4L2 camera discovery.
//!
//! Strategy:
//! 1. Enumerate `/dev/video0`–`/dev/video15`
//! 2. Read the sysfs name from `/sys/class/video4linux/videoN/name`
//! 3. Score each device: webcam-like names and confirmed capture support
//!    rank higher, tuners and capture cards are rejected outright
//! 4. Check whether this process may open the node (`video` group)

use std::ffi::CString;
use std::path::Path;

use wakesight_common::error::WakesightResult;
use wakesight_platform_core::{select_preferred_camera, CameraInfo};

/// Highest `/dev/videoN` index scanned.
const MAX_VIDEO_NODES: u32 = 16;

const WEBCAM_KEYWORDS: &[&str] = &[
    "webcam",
    "camera",
    "cam",
    "facetime",
    "logitech",
    "microsoft",
    "creative",
    "razer",
    "elgato",
    "obs",
    "virtual",
    "v4l2loopback",
];

const NON_WEBCAM_KEYWORDS: &[&str] = &[
    "tuner",
    "tv",
    "dvb",
    "hdmi",
    "capture",
    "encoder",
    "decoder",
    "hauppauge",
    "blackmagic",
    "magewell",
];

/// Enumerate V4L2 camera nodes.
pub fn detect_cameras() -> WakesightResult<Vec<CameraInfo>> {
    tracing::debug!("Detecting V4L2 cameras");

    let mut cameras = Vec::new();
    for idx in 0..MAX_VIDEO_NODES {
        let device = format!("/dev/video{idx}");
        if !Path::new(&device).exists() {
            continue;
        }

        let name = read_sysfs_name(idx).unwrap_or_else(|| format!("video{idx}"));
        let supports_capture = query_v4l2_capture_capability(&device);
        let priority = webcam_priority(&name, supports_capture);
        let accessible = is_device_accessible(&device);

        tracing::debug!(device = %device, name = %name, priority, accessible, "Found V4L2 node");
        cameras.push(CameraInfo {
            name,
            device,
            accessible,
            priority,
        });
    }

    Ok(cameras)
}

/// The best camera on this machine, if any.
pub fn detect_default_camera() -> Option<CameraInfo> {
    let cameras = detect_cameras().ok()?;
    let best = select_preferred_camera(&cameras).cloned();
    if let Some(ref camera) = best {
        tracing::info!(device = %camera.device, name = %camera.name, "Selected camera device");
    }
    best
}

/// Score a V4L2 device as a webcam candidate (higher = more likely a webcam).
/// Returns 0 if the device is definitely not a webcam.
pub fn webcam_priority(device_name: &str, supports_capture: Option<bool>) -> u32 {
    let name = device_name.to_lowercase();

    if NON_WEBCAM_KEYWORDS.iter().any(|kw| name.contains(kw)) {
        return 0;
    }

    let has_webcam_keyword = WEBCAM_KEYWORDS.iter().any(|kw| name.contains(kw));

    match (has_webcam_keyword, supports_capture) {
        (true, Some(true)) => 100, // Named webcam + confirmed capture
        (true, _) => 80,           // Named webcam (no v4l2-ctl available)
        (false, Some(true)) => 50, // Confirmed capture, generic name
        (false, Some(false)) => 0, // Confirmed non-capture (metadata node)
        (false, None) => 10,       // Unknown, low priority fallback
    }
}

/// Whether the current process can open `device` for reading and writing.
pub fn is_device_accessible(device: &str) -> bool {
    let Ok(path) = CString::new(device) else {
        return false;
    };
    // SAFETY: `path` is a valid NUL-terminated string for the duration of the call.
    unsafe { libc::access(path.as_ptr(), libc::R_OK | libc::W_OK) == 0 }
}

fn read_sysfs_name(idx: u32) -> Option<String> {
    let path = format!("/sys/class/video4linux/video{idx}/name");
    let name = std::fs::read_to_string(path).ok()?;
    let trimmed = name.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Use `v4l2-ctl` to check if a device reports Video Capture capability.
/// Returns `None` if v4l2-ctl is not installed.
fn query_v4l2_capture_capability(device: &str) -> Option<bool> {
    let output = std::process::Command::new("v4l2-ctl")
        .args(["--device", device, "--info"])
        .output()
        .ok()?;

    if !output.status.success() {
        return Some(false);
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();
    Some(stdout.contains("video capture"))
}
