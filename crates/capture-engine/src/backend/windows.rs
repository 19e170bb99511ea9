use wakesight_common::error::{WakesightError, WakesightResult};
use wakesight_motion_model::{FrameGeometry, PixelBuffer};
use wakesight_platform_core::CaptureConstraints;

use crate::backend::FrameSource;
use crate::pipeline::{build_mf_pipeline, GstFramePipeline};

/// Windows camera source backed by Media Foundation (`mfvideosrc`).
pub struct WindowsCameraSource {
    pipeline: Option<GstFramePipeline>,
}

impl WindowsCameraSource {
    pub fn new() -> Self {
        Self { pipeline: None }
    }
}

impl Default for WindowsCameraSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FrameSource for WindowsCameraSource {
    async fn open(&mut self, constraints: &CaptureConstraints) -> WakesightResult<FrameGeometry> {
        if self.pipeline.is_some() {
            return Err(WakesightError::session("Camera source is already open"));
        }
        let index = match constraints.device.as_deref() {
            None => 0,
            Some(device) => device.parse().map_err(|_| {
                WakesightError::unavailable(format!(
                    "Windows cameras are selected by index, got '{device}'"
                ))
            })?,
        };
        let mut pipeline = build_mf_pipeline(index, constraints)?;
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
        "windows-camera"
    }
}
