//! GStreamer frame pipelines.
//!
//! Every camera backend ends in the same tail:
//! `videoconvert ! videoscale ! videorate ! video/x-raw,format=RGBA,... ! appsink`.
//! The appsink keeps only the newest buffer (`max-buffers=1 drop=true`), so a
//! read always returns the most recent camera frame instead of a backlog.

use std::sync::OnceLock;
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use wakesight_common::error::{AcquisitionKind, WakesightError, WakesightResult};
use wakesight_motion_model::{FrameGeometry, PixelBuffer};
use wakesight_platform_core::CaptureConstraints;

/// Name of the appsink element in every launch string.
const SINK_NAME: &str = "framesink";

/// How long a steady-state read waits for a buffer before giving up.
const READ_TIMEOUT: Duration = Duration::from_millis(50);

/// Runtime statistics from a frame pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    /// Frames pulled from the appsink.
    pub frames_pulled: u64,

    /// Reads that found no frame within the timeout.
    pub frames_missed: u64,
}

impl PipelineStats {
    /// Missed reads as a percentage of all reads.
    pub fn miss_rate(&self) -> f64 {
        let total = self.frames_pulled + self.frames_missed;
        if total == 0 {
            return 0.0;
        }
        self.frames_missed as f64 / total as f64 * 100.0
    }
}

/// A running GStreamer pipeline that ends in an RGBA appsink.
pub struct GstFramePipeline {
    name: String,
    pipeline: gst::Pipeline,
    sink: gst::Element,
    running: bool,
    stats: PipelineStats,
}

impl GstFramePipeline {
    pub fn from_launch(name: impl Into<String>, launch: &str) -> WakesightResult<Self> {
        init_gstreamer()?;
        let name = name.into();

        let element = gst::parse::launch(launch).map_err(|e| {
            WakesightError::unavailable(format!("Failed to build {name} pipeline: {e}"))
        })?;

        let pipeline = element.dynamic_cast::<gst::Pipeline>().map_err(|_| {
            WakesightError::unavailable("Launch string did not produce a pipeline")
        })?;

        let sink = pipeline.by_name(SINK_NAME).ok_or_else(|| {
            WakesightError::unavailable(format!("{name} pipeline has no '{SINK_NAME}' appsink"))
        })?;

        Ok(Self {
            name,
            pipeline,
            sink,
            running: false,
            stats: PipelineStats::default(),
        })
    }

    /// Set the pipeline to Playing and wait for the first frame.
    ///
    /// Returns the geometry the camera settled on. Failures are mapped onto
    /// acquisition kinds using the pipeline's bus error, if any.
    pub async fn start(&mut self, open_timeout: Duration) -> WakesightResult<FrameGeometry> {
        tracing::info!(pipeline = %self.name, "Starting frame pipeline");

        if let Err(e) = self.pipeline.set_state(gst::State::Playing) {
            let detail = self.bus_error().unwrap_or_else(|| format!("{e:?}"));
            self.shutdown();
            return Err(WakesightError::acquisition(
                classify_acquisition_failure(&detail),
                format!("Failed to start {} pipeline: {detail}", self.name),
            ));
        }
        self.running = true;

        // Negotiation is asynchronous: the first buffer is the earliest point
        // at which the camera's geometry is known to be stable.
        let sink = self.sink.clone();
        let first = tokio::task::spawn_blocking(move || pull_frame(&sink, open_timeout))
            .await
            .map_err(|e| WakesightError::unavailable(format!("Frame wait task failed: {e}")))?;

        match first {
            Ok(Some(frame)) => {
                self.stats.frames_pulled += 1;
                let geometry = frame.geometry();
                tracing::info!(pipeline = %self.name, %geometry, "Camera geometry negotiated");
                Ok(geometry)
            }
            Ok(None) => {
                let err = match self.bus_error() {
                    Some(detail) => WakesightError::acquisition(
                        classify_acquisition_failure(&detail),
                        format!("{} pipeline failed: {detail}", self.name),
                    ),
                    None => WakesightError::timeout(format!(
                        "{} pipeline produced no frame within {}ms",
                        self.name,
                        open_timeout.as_millis()
                    )),
                };
                self.shutdown();
                Err(err)
            }
            Err(e) => {
                self.shutdown();
                Err(WakesightError::unavailable(e.to_string()))
            }
        }
    }

    /// Pull the newest frame. Errors are per-read and non-fatal.
    pub fn read_frame(&mut self) -> WakesightResult<PixelBuffer> {
        if !self.running {
            return Err(WakesightError::frame(format!(
                "{} pipeline is not running",
                self.name
            )));
        }
        let sink = &self.sink;
        match off_worker(|| pull_frame(sink, READ_TIMEOUT))? {
            Some(frame) => {
                self.stats.frames_pulled += 1;
                Ok(frame)
            }
            None => {
                self.stats.frames_missed += 1;
                Err(WakesightError::frame(format!(
                    "{} pipeline had no frame ready",
                    self.name
                )))
            }
        }
    }

    /// Stop the pipeline and release the device.
    pub fn stop(&mut self) -> WakesightResult<()> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        self.pipeline.set_state(gst::State::Null).map_err(|e| {
            WakesightError::platform(format!("Failed to stop {} pipeline: {e:?}", self.name))
        })?;
        tracing::info!(
            pipeline = %self.name,
            frames = self.stats.frames_pulled,
            missed = self.stats.frames_missed,
            miss_rate = self.stats.miss_rate(),
            "Frame pipeline stopped"
        );
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    fn shutdown(&mut self) {
        self.running = false;
        let _ = self.pipeline.set_state(gst::State::Null);
    }

    fn bus_error(&self) -> Option<String> {
        let bus = self.pipeline.bus()?;
        let msg = bus.pop_filtered(&[gst::MessageType::Error])?;
        match msg.view() {
            gst::MessageView::Error(e) => Some(match e.debug() {
                Some(debug) => format!("{} ({debug})", e.error()),
                None => e.error().to_string(),
            }),
            _ => None,
        }
    }
}

impl Drop for GstFramePipeline {
    fn drop(&mut self) {
        if self.running {
            self.shutdown();
        }
    }
}

/// Map a GStreamer error message to the acquisition failure it describes.
pub fn classify_acquisition_failure(detail: &str) -> AcquisitionKind {
    let lower = detail.to_lowercase();
    if lower.contains("permission denied") || lower.contains("not permitted") {
        AcquisitionKind::PermissionDenied
    } else if lower.contains("timed out") || lower.contains("timeout") {
        AcquisitionKind::Timeout
    } else {
        AcquisitionKind::Unavailable
    }
}

/// Caps and appsink tail shared by every camera pipeline.
fn frame_tail(constraints: &CaptureConstraints) -> String {
    let fps = constraints.ideal_fps.clamp(1, 30);
    format!(
        "videoconvert ! videoscale ! videorate ! video/x-raw,format=RGBA,width={w},height={h},framerate={fps}/1 ! appsink name={SINK_NAME} max-buffers=1 drop=true sync=false",
        w = constraints.ideal_width,
        h = constraints.ideal_height,
    )
}

/// V4L2 camera node (Linux, unsandboxed).
pub fn build_v4l2_pipeline(
    device: &str,
    constraints: &CaptureConstraints,
) -> WakesightResult<GstFramePipeline> {
    let device = escape_value(device);
    let launch = format!(
        "v4l2src device=\"{device}\" do-timestamp=true ! {}",
        frame_tail(constraints)
    );
    GstFramePipeline::from_launch("camera-v4l2", &launch)
}

/// PipeWire camera remote handed out by the camera portal.
pub fn build_pipewire_pipeline(
    fd: i32,
    constraints: &CaptureConstraints,
) -> WakesightResult<GstFramePipeline> {
    let launch = format!(
        "pipewiresrc fd={fd} do-timestamp=true ! {}",
        frame_tail(constraints)
    );
    GstFramePipeline::from_launch("camera-pipewire", &launch)
}

/// AVFoundation camera (macOS).
pub fn build_avf_pipeline(
    device_index: u32,
    constraints: &CaptureConstraints,
) -> WakesightResult<GstFramePipeline> {
    let launch = format!(
        "avfvideosrc device-index={device_index} ! {}",
        frame_tail(constraints)
    );
    GstFramePipeline::from_launch("camera-avf", &launch)
}

/// Media Foundation camera (Windows).
pub fn build_mf_pipeline(
    device_index: u32,
    constraints: &CaptureConstraints,
) -> WakesightResult<GstFramePipeline> {
    let launch = format!(
        "mfvideosrc device-index={device_index} ! {}",
        frame_tail(constraints)
    );
    GstFramePipeline::from_launch("camera-mf", &launch)
}

/// Run a short blocking call without stalling other tasks on a tokio worker.
///
/// `block_in_place` is only legal on the multi-thread runtime; elsewhere
/// the call runs inline.
fn off_worker<T>(f: impl FnOnce() -> T) -> T {
    use tokio::runtime::{Handle, RuntimeFlavor};

    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

fn pull_frame(sink: &gst::Element, timeout: Duration) -> WakesightResult<Option<PixelBuffer>> {
    let timeout_ns = timeout.as_nanos() as u64;
    let sample = sink.emit_by_name::<Option<gst::Sample>>("try-pull-sample", &[&timeout_ns]);
    match sample {
        Some(sample) => sample_to_buffer(&sample).map(Some),
        None => Ok(None),
    }
}

fn sample_to_buffer(sample: &gst::Sample) -> WakesightResult<PixelBuffer> {
    let caps = sample
        .caps()
        .ok_or_else(|| WakesightError::frame("Sample has no caps"))?;
    let structure = caps
        .structure(0)
        .ok_or_else(|| WakesightError::frame("Sample caps are empty"))?;
    let width = structure
        .get::<i32>("width")
        .map_err(|e| WakesightError::frame(format!("Sample caps lack width: {e}")))?;
    let height = structure
        .get::<i32>("height")
        .map_err(|e| WakesightError::frame(format!("Sample caps lack height: {e}")))?;

    let geometry = FrameGeometry::new(width.max(0) as u32, height.max(0) as u32);
    let buffer = sample
        .buffer()
        .ok_or_else(|| WakesightError::frame("Sample has no buffer"))?;
    let map = buffer
        .map_readable()
        .map_err(|e| WakesightError::frame(format!("Failed to map frame buffer: {e}")))?;

    // RGBA rows are always 4-byte aligned, so rows are tightly packed;
    // trailing padding past the last row is dropped.
    let bytes = map.as_slice();
    let expected = geometry.byte_len();
    if bytes.len() < expected {
        return Err(WakesightError::frame(format!(
            "Frame {geometry} needs {expected} bytes, buffer has {}",
            bytes.len()
        )));
    }

    PixelBuffer::new(geometry.width, geometry.height, bytes[..expected].to_vec())
        .map_err(|e| WakesightError::frame(e.to_string()))
}

fn init_gstreamer() -> WakesightResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    let init_res = GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string()));
    match init_res {
        Ok(()) => Ok(()),
        Err(e) => Err(WakesightError::unavailable(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

fn escape_value(value: &str) -> String {
    value.replace('"', "\\\"")
}
