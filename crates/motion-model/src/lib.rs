//! Wakesight Motion Model
//!
//! Defines the data contracts shared by the detection core and the
//! capture engine:
//! - **Frames:** RGBA pixel buffers at bounded resolution
//! - **Motion:** Per-cycle motion samples, directions, and sensitivity levels
//!
//! Nothing in here performs I/O. Buffers are plain owned memory and every
//! motion value is produced fresh each sampling cycle.

pub mod frame;
pub mod motion;

pub use frame::*;
pub use motion::*;
