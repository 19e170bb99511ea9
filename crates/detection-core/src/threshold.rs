//! Sensitivity to pixel-difference threshold mapping.
//!
//! Lower thresholds are more sensitive: smaller colour changes count as
//! movement. The table is evaluated fresh every sampling cycle, so a
//! sensitivity change only affects cycles that start after it.

use wakesight_motion_model::Sensitivity;

/// Per-pixel summed RGB difference above which a pixel counts as moved.
pub const fn threshold(sensitivity: Sensitivity) -> u32 {
    match sensitivity {
        Sensitivity::Low => 50,
        Sensitivity::Medium => 30,
        Sensitivity::High => 15,
    }
}

/// Raw intensity an auto-wake trigger must exceed.
pub const fn auto_wake_threshold(sensitivity: Sensitivity) -> u32 {
    threshold(sensitivity) * 2
}
