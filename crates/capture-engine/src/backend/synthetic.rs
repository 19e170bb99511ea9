//! Deterministic frame source for simulation and tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use wakesight_common::error::{AcquisitionKind, WakesightError, WakesightResult};
use wakesight_motion_model::{FrameGeometry, PixelBuffer};
use wakesight_platform_core::CaptureConstraints;

use crate::backend::FrameSource;

/// One entry in a scripted frame sequence.
#[derive(Debug, Clone)]
pub enum ScriptedRead {
    Frame(PixelBuffer),
    /// The read fails with a frame error carrying this message.
    Fail(String),
    /// The read panics with this message, taking the sampling task down.
    Panic(String),
}

type FrameGenerator = Box<dyn FnMut(u64) -> WakesightResult<PixelBuffer> + Send>;

/// Observes a [`SyntheticSource`] after it has been moved into a session.
#[derive(Debug, Clone, Default)]
pub struct SourceCounters {
    cells: Arc<CounterCells>,
}

#[derive(Debug, Default)]
struct CounterCells {
    opens: AtomicU64,
    closes: AtomicU64,
    reads: AtomicU64,
    open: AtomicBool,
}

impl SourceCounters {
    pub fn opens(&self) -> u64 {
        self.cells.opens.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> u64 {
        self.cells.closes.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> u64 {
        self.cells.reads.load(Ordering::SeqCst)
    }

    /// Whether the source currently holds its (pretend) device.
    pub fn is_open(&self) -> bool {
        self.cells.open.load(Ordering::SeqCst)
    }
}

pub struct SyntheticSource {
    geometry: FrameGeometry,
    generator: FrameGenerator,
    failing_opens: u32,
    open_failure: AcquisitionKind,
    open_delay: Duration,
    frame_index: u64,
    counters: SourceCounters,
}

impl SyntheticSource {
    fn with_generator(geometry: FrameGeometry, generator: FrameGenerator) -> Self {
        Self {
            geometry,
            generator,
            failing_opens: 0,
            open_failure: AcquisitionKind::Unavailable,
            open_delay: Duration::ZERO,
            frame_index: 0,
            counters: SourceCounters::default(),
        }
    }

    /// Play `reads` in order, then keep repeating the last good frame.
    pub fn scripted(reads: Vec<ScriptedRead>) -> Self {
        let geometry = reads
            .iter()
            .find_map(|read| match read {
                ScriptedRead::Frame(frame) => Some(frame.geometry()),
                ScriptedRead::Fail(_) | ScriptedRead::Panic(_) => None,
            })
            .unwrap_or(FrameGeometry::new(1, 1));

        let mut queue: VecDeque<ScriptedRead> = reads.into();
        let mut last: Option<PixelBuffer> = None;
        let generator = move |_index: u64| match queue.pop_front() {
            Some(ScriptedRead::Frame(frame)) => {
                last = Some(frame.clone());
                Ok(frame)
            }
            Some(ScriptedRead::Fail(message)) => Err(WakesightError::frame(message)),
            Some(ScriptedRead::Panic(message)) => panic!("{message}"),
            None => last
                .clone()
                .ok_or_else(|| WakesightError::frame("Script has no frames")),
        };
        Self::with_generator(geometry, Box::new(generator))
    }

    /// Scripted source where every read succeeds.
    pub fn from_frames(frames: Vec<PixelBuffer>) -> Self {
        Self::scripted(frames.into_iter().map(ScriptedRead::Frame).collect())
    }

    /// A uniform frame that never changes.
    pub fn still(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let frame = PixelBuffer::filled(width, height, rgba);
        Self::with_generator(frame.geometry(), Box::new(move |_| Ok(frame.clone())))
    }

    /// A bright block sweeping left to right over a dark background,
    /// advancing one eighth of the width per frame and wrapping around.
    pub fn sweeping_block(width: u32, height: u32) -> Self {
        let geometry = FrameGeometry::new(width, height);
        let block_w = (width / 8).max(1);
        let top = height / 4;
        let bottom = height - height / 4;
        let generator = move |index: u64| {
            let steps = (width / block_w).max(1) as u64;
            let left = (index % steps) as u32 * block_w;
            Ok(PixelBuffer::from_fn(width, height, |x, y| {
                if (left..left + block_w).contains(&x) && (top..bottom).contains(&y) {
                    [230, 220, 210, 255]
                } else {
                    [20, 20, 30, 255]
                }
            }))
        };
        Self::with_generator(geometry, Box::new(generator))
    }

    /// Fail the next `count` opens with `kind`.
    pub fn fail_opens(mut self, kind: AcquisitionKind, count: u32) -> Self {
        self.open_failure = kind;
        self.failing_opens = count;
        self
    }

    /// Suspend inside `open` for `delay`, like a camera negotiating.
    pub fn with_open_delay(mut self, delay: Duration) -> Self {
        self.open_delay = delay;
        self
    }

    pub fn counters(&self) -> SourceCounters {
        self.counters.clone()
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }
}

#[async_trait::async_trait]
impl FrameSource for SyntheticSource {
    async fn open(&mut self, _constraints: &CaptureConstraints) -> WakesightResult<FrameGeometry> {
        if self.counters.is_open() {
            return Err(WakesightError::session("Synthetic source is already open"));
        }
        if !self.open_delay.is_zero() {
            tokio::time::sleep(self.open_delay).await;
        }
        if self.failing_opens > 0 {
            self.failing_opens -= 1;
            return Err(WakesightError::acquisition(
                self.open_failure,
                "Synthetic open failure",
            ));
        }

        self.counters.cells.opens.fetch_add(1, Ordering::SeqCst);
        self.counters.cells.open.store(true, Ordering::SeqCst);
        Ok(self.geometry)
    }

    fn read_frame(&mut self) -> WakesightResult<PixelBuffer> {
        if !self.counters.is_open() {
            return Err(WakesightError::frame("Synthetic source is not open"));
        }
        self.counters.cells.reads.fetch_add(1, Ordering::SeqCst);
        let index = self.frame_index;
        self.frame_index += 1;
        (self.generator)(index)
    }

    async fn close(&mut self) -> WakesightResult<()> {
        if self.counters.cells.open.swap(false, Ordering::SeqCst) {
            self.counters.cells.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "synthetic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_reads_play_in_order_then_repeat() {
        let a = PixelBuffer::filled(2, 2, [1, 1, 1, 255]);
        let b = PixelBuffer::filled(2, 2, [2, 2, 2, 255]);
        let mut source = SyntheticSource::scripted(vec![
            ScriptedRead::Frame(a.clone()),
            ScriptedRead::Fail("glitch".into()),
            ScriptedRead::Frame(b.clone()),
        ]);
        let geometry = source.open(&CaptureConstraints::default()).await.unwrap();
        assert_eq!(geometry, FrameGeometry::new(2, 2));

        assert_eq!(source.read_frame().unwrap(), a);
        assert!(source.read_frame().is_err());
        assert_eq!(source.read_frame().unwrap(), b);
        assert_eq!(source.read_frame().unwrap(), b);
        assert_eq!(source.counters().reads(), 4);
    }

    #[tokio::test]
    #[should_panic(expected = "sensor fault")]
    async fn scripted_panic_unwinds_the_reader() {
        let mut source = SyntheticSource::scripted(vec![
            ScriptedRead::Frame(PixelBuffer::filled(2, 2, [0, 0, 0, 255])),
            ScriptedRead::Panic("sensor fault".into()),
        ]);
        source.open(&CaptureConstraints::default()).await.unwrap();
        assert!(source.read_frame().is_ok());
        let _ = source.read_frame();
    }

    #[tokio::test]
    async fn failed_opens_are_counted_down() {
        let mut source =
            SyntheticSource::still(4, 4, [0, 0, 0, 255]).fail_opens(AcquisitionKind::PermissionDenied, 1);
        let counters = source.counters();

        let err = source.open(&CaptureConstraints::default()).await.unwrap_err();
        assert_eq!(err.acquisition_kind(), Some(AcquisitionKind::PermissionDenied));
        assert!(!counters.is_open());

        source.open(&CaptureConstraints::default()).await.unwrap();
        assert!(counters.is_open());
        assert_eq!(counters.opens(), 1);
    }

    #[tokio::test]
    async fn reads_require_an_open_source() {
        let mut source = SyntheticSource::still(4, 4, [0, 0, 0, 255]);
        assert!(source.read_frame().is_err());
        source.open(&CaptureConstraints::default()).await.unwrap();
        assert!(source.read_frame().is_ok());
        source.close().await.unwrap();
        source.close().await.unwrap();
        assert_eq!(source.counters().closes(), 1);
        assert!(source.read_frame().is_err());
    }

    #[tokio::test]
    async fn sweeping_block_moves_between_frames() {
        let mut source = SyntheticSource::sweeping_block(64, 48);
        source.open(&CaptureConstraints::default()).await.unwrap();
        let first = source.read_frame().unwrap();
        let second = source.read_frame().unwrap();
        assert_ne!(first, second);
        assert_eq!(first.geometry(), FrameGeometry::new(64, 48));
    }
}
