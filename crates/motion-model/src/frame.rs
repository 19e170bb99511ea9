//! RGBA pixel buffers.
//!
//! Frames are stored row-major, four bytes per pixel (`R, G, B, A`).
//! Alpha is carried along but never takes part in motion analysis.

use serde::{Deserialize, Serialize};

/// Bytes per RGBA pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Width and height of a frame in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
}

impl FrameGeometry {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels in a frame of this geometry.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of bytes an RGBA frame of this geometry occupies.
    pub fn byte_len(&self) -> usize {
        self.pixel_count() * BYTES_PER_PIXEL
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether this geometry fits inside `max_width x max_height`.
    pub fn fits_within(&self, max_width: u32, max_height: u32) -> bool {
        self.width <= max_width && self.height <= max_height
    }

    /// Largest geometry with the same aspect ratio that fits inside
    /// `max_width x max_height`. Never upscales; never returns a zero side.
    pub fn scaled_to_fit(&self, max_width: u32, max_height: u32) -> Self {
        if self.is_empty() || self.fits_within(max_width, max_height) {
            return *self;
        }
        let scale_x = max_width as f64 / self.width as f64;
        let scale_y = max_height as f64 / self.height as f64;
        let scale = scale_x.min(scale_y);
        let width = ((self.width as f64 * scale).floor() as u32).clamp(1, max_width.max(1));
        let height = ((self.height as f64 * scale).floor() as u32).clamp(1, max_height.max(1));
        Self { width, height }
    }
}

impl std::fmt::Display for FrameGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Errors raised when constructing a pixel buffer.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("Frame {geometry} needs {expected} bytes, got {actual}")]
    LengthMismatch {
        geometry: FrameGeometry,
        expected: usize,
        actual: usize,
    },

    #[error("Frame has an empty geometry ({geometry})")]
    EmptyGeometry { geometry: FrameGeometry },
}

/// An owned RGBA frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    geometry: FrameGeometry,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes. The length must match the geometry exactly.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let geometry = FrameGeometry::new(width, height);
        if geometry.is_empty() {
            return Err(FrameError::EmptyGeometry { geometry });
        }
        let expected = geometry.byte_len();
        if data.len() != expected {
            return Err(FrameError::LengthMismatch {
                geometry,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { geometry, data })
    }

    /// A frame where every pixel has the same colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        Self::from_fn(width, height, |_, _| rgba)
    }

    /// Build a frame by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let geometry = FrameGeometry::new(width, height);
        let mut data = Vec::with_capacity(geometry.byte_len());
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self { geometry, data }
    }

    pub fn width(&self) -> u32 {
        self.geometry.width
    }

    pub fn height(&self) -> u32 {
        self.geometry.height
    }

    pub fn geometry(&self) -> FrameGeometry {
        self.geometry
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// RGBA value at `(x, y)`, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.geometry.width || y >= self.geometry.height {
            return None;
        }
        let offset = self.offset(x, y);
        let px = &self.data[offset..offset + BYTES_PER_PIXEL];
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Overwrite the pixel at `(x, y)`. Out-of-bounds writes are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        if x >= self.geometry.width || y >= self.geometry.height {
            return;
        }
        let offset = self.offset(x, y);
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&rgba);
    }

    /// Nearest-neighbour resample to an exact geometry.
    pub fn resize_nearest(&self, width: u32, height: u32) -> Self {
        if width == self.geometry.width && height == self.geometry.height {
            return self.clone();
        }
        let src_w = self.geometry.width as u64;
        let src_h = self.geometry.height as u64;
        Self::from_fn(width, height, |x, y| {
            let sx = (x as u64 * src_w / width.max(1) as u64) as u32;
            let sy = (y as u64 * src_h / height.max(1) as u64) as u32;
            let offset = self.offset(sx, sy);
            let px = &self.data[offset..offset + BYTES_PER_PIXEL];
            [px[0], px[1], px[2], px[3]]
        })
    }

    /// Downscale (preserving aspect ratio) so the frame fits inside
    /// `max_width x max_height`. Frames that already fit are returned as-is.
    pub fn fit_within(self, max_width: u32, max_height: u32) -> Self {
        let target = self.geometry.scaled_to_fit(max_width, max_height);
        if target == self.geometry {
            return self;
        }
        self.resize_nearest(target.width, target.height)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.geometry.width as usize + x as usize) * BYTES_PER_PIXEL
    }
}
