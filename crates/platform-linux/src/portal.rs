//! XDG Desktop Portal camera access.
//!
//! Inside a Flatpak sandbox `/dev/video*` is not reachable. Camera access
//! has to be granted through `org.freedesktop.portal.Camera`, which hands
//! back a PipeWire remote restricted to camera nodes.
//!
//! # Flow
//!
//! 1. Connect to the portal and check `IsCameraPresent`
//! 2. `AccessCamera`: the user is asked for consent
//! 3. `OpenPipeWireRemote`: receive a PipeWire socket fd
//! 4. Hand the fd to `pipewiresrc fd=...`

use std::os::fd::{AsRawFd, OwnedFd, RawFd};

use ashpd::desktop::camera::Camera;
use wakesight_common::error::{WakesightError, WakesightResult};

/// A granted camera portal session.
///
/// Holds the PipeWire remote open for as long as it is alive.
#[derive(Debug)]
pub struct CameraPortalSession {
    remote: OwnedFd,
}

impl CameraPortalSession {
    /// File descriptor of the PipeWire remote, for `pipewiresrc fd=`.
    pub fn pipewire_fd(&self) -> RawFd {
        self.remote.as_raw_fd()
    }
}

/// Whether the process runs inside a Flatpak sandbox.
pub fn is_sandboxed() -> bool {
    std::env::var("FLATPAK_ID").is_ok() || std::path::Path::new("/.flatpak-info").exists()
}

/// Check if a portal-capable desktop session is likely available.
pub fn is_portal_available() -> bool {
    std::env::var("DBUS_SESSION_BUS_ADDRESS").is_ok()
        && (std::env::var("WAYLAND_DISPLAY").is_ok()
            || std::env::var("XDG_SESSION_TYPE")
                .map(|v| v == "wayland")
                .unwrap_or(false)
            || is_sandboxed())
}

/// Ask the portal for camera access and open a PipeWire remote.
///
/// Suspends until the user answers the consent dialog.
pub async fn request_camera_access() -> WakesightResult<CameraPortalSession> {
    tracing::info!("Requesting camera access through the XDG Camera portal");

    let camera = Camera::new()
        .await
        .map_err(|e| WakesightError::unavailable(format!("Camera portal unavailable: {e}")))?;

    let present = camera.is_present().await.map_err(|e| {
        WakesightError::unavailable(format!("Camera portal presence query failed: {e}"))
    })?;
    if !present {
        return Err(WakesightError::unavailable(
            "Camera portal reports no camera present",
        ));
    }

    camera
        .request_access()
        .await
        .and_then(|request| request.response())
        .map_err(|e| WakesightError::permission_denied(format!("Camera access refused: {e}")))?;

    let remote = camera.open_pipe_wire_remote().await.map_err(|e| {
        WakesightError::unavailable(format!("Failed to open PipeWire camera remote: {e}"))
    })?;

    tracing::info!("Camera portal access granted");
    Ok(CameraPortalSession { remote })
}
