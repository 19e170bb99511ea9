use wakesight_common::error::{WakesightError, WakesightResult};
use wakesight_motion_model::{FrameGeometry, PixelBuffer};
use wakesight_platform_core::CaptureConstraints;

use crate::backend::FrameSource;
use crate::pipeline::{build_avf_pipeline, GstFramePipeline};

/// macOS camera source backed by `avfvideosrc`.
///
/// Camera consent is handled by the OS on first use; a refusal surfaces as
/// a pipeline start failure.
pub struct MacOSCameraSource {
    pipeline: Option<GstFramePipeline>,
}

impl MacOSCameraSource {
    pub fn new() -> Self {
        Self { pipeline: None }
    }
}

impl Default for MacOSCameraSource {
    fn default() -> Self {
        Self::new()
    }
}

/// AVFoundation addresses cameras by index; non-numeric devices fall back to 0.
fn device_index(constraints: &CaptureConstraints) -> u32 {
    constraints
        .device
        .as_deref()
        .and_then(|d| d.parse().ok())
        .unwrap_or(0)
}

#[async_trait::async_trait]
impl FrameSource for MacOSCameraSource {
    async fn open(&mut self, constraints: &CaptureConstraints) -> WakesightResult<FrameGeometry> {
        if self.pipeline.is_some() {
            return Err(WakesightError::session("Camera source is already open"));
        }
        let mut pipeline = build_avf_pipeline(device_index(constraints), constraints)?;
        let geometry = pipeline.start(constraints.open_timeout).await?;
        self.pipeline = Some(pipeline);
        Ok(geometry)
    }

    fn read_frame(&mut self) -> WakesightResult<PixelBuffer> {
        match self.pipeline.as_mut() {
            Some(pipeline) => pipeline.read_frame(),
            None => Err(WakesightError::frame("Camera source is not open")),
        }
    }

    async fn close(&mut self) -> WakesightResult<()> {
        match self.pipeline.take() {
            Some(mut pipeline) => pipeline.stop(),
            None => Ok(()),
        }
    }

    fn name(&self) -> &str {
        "macos-camera"
    }
}
