//! Wakesight Linux Platform Integration
//!
//! Platform-specific implementations for Linux:
//! - **Camera Discovery:** V4L2 device enumeration and webcam scoring
//! - **Camera Portal:** XDG Desktop Portal camera consent for sandboxed runs
//! - **Permissions:** Capability detection and user guidance

pub mod camera;
pub mod permissions;
pub mod portal;

pub use camera::*;
