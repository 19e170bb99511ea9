use wakesight_common::error::WakesightResult;
use wakesight_motion_model::{FrameGeometry, PixelBuffer};
use wakesight_platform_core::CaptureConstraints;

/// A camera-like producer of RGBA frames.
///
/// `open` may suspend while the device negotiates; it resolves once the
/// source can report a stable geometry. `read_frame` is synchronous and
/// returns the newest frame; a failed read is a per-tick error, not a
/// session failure.
#[async_trait::async_trait]
pub trait FrameSource: Send {
    /// Acquire the device. Failures carry an acquisition kind.
    async fn open(&mut self, constraints: &CaptureConstraints) -> WakesightResult<FrameGeometry>;

    /// Return the most recent frame.
    fn read_frame(&mut self) -> WakesightResult<PixelBuffer>;

    /// Release the device. Safe to call on a source that never opened.
    async fn close(&mut self) -> WakesightResult<()>;

    /// Short label for logs.
    fn name(&self) -> &str;
}

#[cfg(target_os = "linux")]
pub mod linux;
pub mod macos;
pub mod synthetic;
pub mod windows;

#[cfg(target_os = "linux")]
pub use linux::LinuxCameraSource;
pub use macos::MacOSCameraSource;
pub use synthetic::{SourceCounters, SyntheticSource};
pub use windows::WindowsCameraSource;

/// The camera source for the platform this binary runs on.
pub fn default_source() -> WakesightResult<Box<dyn FrameSource>> {
    #[cfg(target_os = "linux")]
    {
        Ok(Box::new(LinuxCameraSource::new()))
    }
    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(WindowsCameraSource::new()))
    }
    #[cfg(target_os = "macos")]
    {
        Ok(Box::new(MacOSCameraSource::new()))
    }
    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    {
        Err(wakesight_common::error::WakesightError::unsupported(
            "No camera backend for this platform",
        ))
    }
}
