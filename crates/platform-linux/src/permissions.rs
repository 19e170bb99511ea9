//! Permission detection and guidance for Linux.
//!
//! Wakesight needs a readable camera node (or portal consent when
//! sandboxed) and the GStreamer plugins that feed frames to the engine.

use serde::Serialize;

use crate::camera::detect_cameras;
use crate::portal::{is_portal_available, is_sandboxed};

/// A system capability that Wakesight may need.
#[derive(Debug, Clone, Serialize)]
pub struct Capability {
    pub name: String,
    pub description: String,
    pub available: bool,
    pub required: bool,
    pub fix_instructions: Option<String>,
}

/// Check all capabilities and report status.
pub fn check_capabilities() -> Vec<Capability> {
    vec![
        check_camera_present(),
        check_camera_access(),
        check_camera_portal(),
        check_gstreamer_plugins(),
    ]
}

/// Check that at least one webcam-like V4L2 node exists.
fn check_camera_present() -> Capability {
    let cameras = detect_cameras().unwrap_or_default();
    let available = cameras.iter().any(|c| c.priority > 0);

    Capability {
        name: "Camera Device".to_string(),
        description: "Video4Linux webcam used as the motion source".to_string(),
        available,
        required: true,
        fix_instructions: if available {
            None
        } else {
            Some(
                "Connect a webcam and verify /dev/video* exists (v4l2-ctl --list-devices)"
                    .to_string(),
            )
        },
    }
}

/// Check that the user may open the camera node directly.
fn check_camera_access() -> Capability {
    let cameras = detect_cameras().unwrap_or_default();
    let available = cameras.iter().any(|c| c.priority > 0 && c.accessible);

    Capability {
        name: "Camera Access".to_string(),
        description: "Read/write permission on the camera device node".to_string(),
        available,
        // Sandboxed runs go through the portal instead.
        required: !is_sandboxed(),
        fix_instructions: if available {
            None
        } else {
            Some(
                "Add user to video group: sudo usermod -aG video $USER (logout required)"
                    .to_string(),
            )
        },
    }
}

/// Check the XDG Camera portal (only required inside a sandbox).
fn check_camera_portal() -> Capability {
    let sandboxed = is_sandboxed();
    let available = is_portal_available();

    Capability {
        name: "Camera Portal".to_string(),
        description: "XDG Desktop Portal for camera consent in sandboxed sessions".to_string(),
        available,
        required: sandboxed,
        fix_instructions: if !available && sandboxed {
            Some("Install xdg-desktop-portal and a desktop backend (GNOME, KDE, wlr)".to_string())
        } else {
            None
        },
    }
}

/// Check that the GStreamer elements used by the frame pipeline exist.
fn check_gstreamer_plugins() -> Capability {
    let available = ["v4l2src", "videoconvert", "videoscale", "appsink"]
        .iter()
        .all(|element| gst_element_exists(element));

    Capability {
        name: "GStreamer Plugins".to_string(),
        description: "v4l2src, videoconvert, videoscale and appsink elements".to_string(),
        available,
        required: true,
        fix_instructions: if available {
            None
        } else {
            Some(
                "Install plugins: sudo apt install gstreamer1.0-plugins-base gstreamer1.0-plugins-good"
                    .to_string(),
            )
        },
    }
}

fn gst_element_exists(element: &str) -> bool {
    std::process::Command::new("gst-inspect-1.0")
        .args(["--exists", element])
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Whether every required capability is available.
pub fn all_required_available(capabilities: &[Capability]) -> bool {
    capabilities
        .iter()
        .filter(|c| c.required)
        .all(|c| c.available)
}

/// Print a user-friendly capability report.
pub fn print_capability_report(capabilities: &[Capability]) {
    println!("Wakesight System Capabilities:");
    println!("{}", "-".repeat(60));

    for cap in capabilities {
        let status = if cap.available {
            "[OK]"
        } else if cap.required {
            "[MISSING - REQUIRED]"
        } else {
            "[MISSING - OPTIONAL]"
        };

        println!("  {} {}: {}", status, cap.name, cap.description);

        if let Some(ref fix) = cap.fix_instructions {
            println!("    Fix: {fix}");
        }
    }
}
