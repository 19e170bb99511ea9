use wakesight_common::error::{WakesightError, WakesightResult};
use wakesight_motion_model::{FrameGeometry, PixelBuffer};
use wakesight_platform_core::CaptureConstraints;
use wakesight_platform_linux::portal::{
    is_portal_available, is_sandboxed, request_camera_access, CameraPortalSession,
};
use wakesight_platform_linux::{detect_default_camera, is_device_accessible};

use crate::backend::FrameSource;
use crate::pipeline::{build_pipewire_pipeline, build_v4l2_pipeline, GstFramePipeline};

/// Linux camera source.
///
/// Inside a Flatpak sandbox the camera comes from the XDG camera portal as
/// a PipeWire remote; otherwise the V4L2 node is opened directly.
pub struct LinuxCameraSource {
    pipeline: Option<GstFramePipeline>,
    portal_session: Option<CameraPortalSession>,
    device: Option<String>,
}

impl LinuxCameraSource {
    pub fn new() -> Self {
        Self {
            pipeline: None,
            portal_session: None,
            device: None,
        }
    }

    /// Device path of the open camera, if opened through V4L2.
    pub fn device(&self) -> Option<&str> {
        self.device.as_deref()
    }

    fn resolve_device(constraints: &CaptureConstraints) -> WakesightResult<String> {
        if let Some(device) = &constraints.device {
            return Ok(device.clone());
        }
        detect_default_camera()
            .map(|camera| {
                tracing::info!(device = %camera.device, name = %camera.name, "Selected camera");
                camera.device
            })
            .ok_or_else(|| WakesightError::unavailable("No accessible camera found"))
    }

    async fn open_portal(
        &mut self,
        constraints: &CaptureConstraints,
    ) -> WakesightResult<GstFramePipeline> {
        if !is_portal_available() {
            return Err(WakesightError::unavailable(
                "Running sandboxed but the camera portal is not available",
            ));
        }
        let session = request_camera_access().await?;
        let pipeline = build_pipewire_pipeline(session.pipewire_fd(), constraints)?;
        self.portal_session = Some(session);
        Ok(pipeline)
    }

    fn open_v4l2(&mut self, constraints: &CaptureConstraints) -> WakesightResult<GstFramePipeline> {
        let device = Self::resolve_device(constraints)?;
        if !std::path::Path::new(&device).exists() {
            return Err(WakesightError::unavailable(format!(
                "Camera device {device} does not exist"
            )));
        }
        if !is_device_accessible(&device) {
            return Err(WakesightError::permission_denied(format!(
                "No read/write access to {device}. Add your user to the 'video' group"
            )));
        }
        let pipeline = build_v4l2_pipeline(&device, constraints)?;
        self.device = Some(device);
        Ok(pipeline)
    }
}

impl Default for LinuxCameraSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FrameSource for LinuxCameraSource {
    async fn open(&mut self, constraints: &CaptureConstraints) -> WakesightResult<FrameGeometry> {
        if self.pipeline.is_some() {
            return Err(WakesightError::session("Camera source is already open"));
        }

        let mut pipeline = if is_sandboxed() {
            tracing::info!("Sandboxed session detected, requesting camera portal");
            self.open_portal(constraints).await?
        } else {
            self.open_v4l2(constraints)?
        };

        match pipeline.start(constraints.open_timeout).await {
            Ok(geometry) => {
                self.pipeline = Some(pipeline);
                Ok(geometry)
            }
            Err(e) => {
                self.portal_session = None;
                self.device = None;
                Err(e)
            }
        }
    }

    fn read_frame(&mut self) -> WakesightResult<PixelBuffer> {
        match self.pipeline.as_mut() {
            Some(pipeline) => pipeline.read_frame(),
            None => Err(WakesightError::frame("Camera source is not open")),
        }
    }

    async fn close(&mut self) -> WakesightResult<()> {
        let result = match self.pipeline.take() {
            Some(mut pipeline) => pipeline.stop(),
            None => Ok(()),
        };
        self.portal_session = None;
        self.device = None;
        result
    }

    fn name(&self) -> &str {
        "linux-camera"
    }
}
