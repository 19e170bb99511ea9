//! Wakesight Detection Core
//!
//! Turns pairs of consecutive frames into motion assessments:
//! - **Threshold:** Sensitivity level to per-pixel difference threshold
//! - **Diff:** Per-pixel RGB differences and aggregate raw intensity
//! - **Direction:** Dominant movement direction from the moved-diff map
//! - **Analyzer:** Owns the previous frame and combines the steps
//!
//! This crate is pure computation — no I/O, no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod analyzer;
pub mod diff;
pub mod direction;
pub mod threshold;

pub use analyzer::{MotionAnalyzer, MotionAssessment};
pub use diff::{DiffEngine, DiffMap, DiffOutcome, DiffReport};
pub use direction::{classify_direction, RegionSums};
pub use threshold::{auto_wake_threshold, threshold};
