//! Frame differencing.
//!
//! For every pixel the summed absolute RGB difference is computed
//! (`|Rc-Rp| + |Gc-Gp| + |Bc-Bp|`, alpha ignored). Pixels whose difference
//! exceeds the threshold are "moved"; their differences feed both the
//! aggregate raw intensity and the moved-diff map used for direction
//! classification.

use wakesight_motion_model::{FrameGeometry, PixelBuffer, BYTES_PER_PIXEL};

/// Raw intensity divisor for the exposed `[0, 1]` motion intensity.
pub const INTENSITY_SCALE: f64 = 100.0;

/// Raw intensity divisor for the `[0, 1]` confidence level.
pub const CONFIDENCE_SCALE: f64 = 50.0;

/// Row-major map of moved-pixel differences. Pixels that did not move are 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffMap {
    geometry: FrameGeometry,
    values: Vec<u32>,
}

impl DiffMap {
    pub fn zeroed(geometry: FrameGeometry) -> Self {
        Self {
            geometry,
            values: vec![0; geometry.pixel_count()],
        }
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    /// Moved difference at `(x, y)`; 0 for unmoved or out-of-bounds pixels.
    pub fn get(&self, x: u32, y: u32) -> u32 {
        if x >= self.geometry.width || y >= self.geometry.height {
            return 0;
        }
        self.values[y as usize * self.geometry.width as usize + x as usize]
    }

    /// Iterate `(x, y, moved_diff)` over every pixel.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, u32)> + '_ {
        let width = self.geometry.width.max(1);
        self.values
            .iter()
            .enumerate()
            .map(move |(idx, &value)| ((idx as u32) % width, (idx as u32) / width, value))
    }

    /// Sum of all moved differences.
    pub fn total(&self) -> u64 {
        self.values.iter().map(|&v| v as u64).sum()
    }
}

/// Aggregate result of comparing two frames.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffReport {
    pub threshold: u32,
    pub total_moved_diff: u64,
    pub moved_pixel_count: u64,
    pub map: DiffMap,
}

impl DiffReport {
    /// Mean difference of the moved pixels, 0 when nothing moved.
    ///
    /// This is the unnormalized value compared against the threshold.
    pub fn raw_intensity(&self) -> f64 {
        if self.moved_pixel_count == 0 {
            return 0.0;
        }
        self.total_moved_diff as f64 / self.moved_pixel_count as f64
    }

    pub fn is_motion_detected(&self) -> bool {
        self.raw_intensity() > self.threshold as f64
    }

    /// Raw intensity divided by [`INTENSITY_SCALE`], clamped to `[0, 1]`.
    pub fn motion_intensity(&self) -> f64 {
        (self.raw_intensity() / INTENSITY_SCALE).clamp(0.0, 1.0)
    }

    /// Raw intensity divided by [`CONFIDENCE_SCALE`], clamped to `[0, 1]`.
    pub fn confidence_level(&self) -> f64 {
        (self.raw_intensity() / CONFIDENCE_SCALE).clamp(0.0, 1.0)
    }
}

/// Compare two frames of equal geometry.
///
/// Returns `None` when the geometries differ.
pub fn diff_frames(
    current: &PixelBuffer,
    previous: &PixelBuffer,
    threshold: u32,
) -> Option<DiffReport> {
    if current.geometry() != previous.geometry() {
        return None;
    }

    let mut map = DiffMap::zeroed(current.geometry());
    let mut total_moved_diff = 0u64;
    let mut moved_pixel_count = 0u64;

    let pixels = current
        .data()
        .chunks_exact(BYTES_PER_PIXEL)
        .zip(previous.data().chunks_exact(BYTES_PER_PIXEL));

    for (idx, (cur, prev)) in pixels.enumerate() {
        let diff = cur[0].abs_diff(prev[0]) as u32
            + cur[1].abs_diff(prev[1]) as u32
            + cur[2].abs_diff(prev[2]) as u32;

        if diff > threshold {
            total_moved_diff += diff as u64;
            moved_pixel_count += 1;
            map.values[idx] = diff;
        }
    }

    Some(DiffReport {
        threshold,
        total_moved_diff,
        moved_pixel_count,
        map,
    })
}

/// What the engine did with a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DiffOutcome {
    /// No comparable previous frame: the frame was stored, nothing computed.
    Baseline,
    /// The frame was compared against the previous one.
    Compared(DiffReport),
}

/// Owns the single retained previous frame.
#[derive(Debug, Default)]
pub struct DiffEngine {
    previous: Option<PixelBuffer>,
}

impl DiffEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compare `current` against the retained frame, then retain `current`.
    ///
    /// The first frame, and any frame whose geometry differs from the
    /// retained one, becomes the new baseline without a comparison.
    pub fn compare(&mut self, current: PixelBuffer, threshold: u32) -> DiffOutcome {
        let outcome = match self.previous.as_ref() {
            Some(previous) => match diff_frames(&current, previous, threshold) {
                Some(report) => DiffOutcome::Compared(report),
                None => {
                    tracing::debug!(
                        previous = %previous.geometry(),
                        current = %current.geometry(),
                        "Frame geometry changed; resetting baseline"
                    );
                    DiffOutcome::Baseline
                }
            },
            None => DiffOutcome::Baseline,
        };
        self.previous = Some(current);
        outcome
    }

    pub fn has_previous(&self) -> bool {
        self.previous.is_some()
    }

    /// Drop the retained frame.
    pub fn reset(&mut self) {
        self.previous = None;
    }
}
