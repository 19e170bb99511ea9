//! Wakesight Capture Engine
//!
//! Runs motion detection sessions against a live camera. A session owns a
//! frame source for its active lifetime and samples it on a fixed,
//! non-overlapping tick.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │               MotionController                │
//! │  start() / stop() / set_sensitivity() / ...   │
//! │        │                          ▲           │
//! │        ▼                          │ watch     │
//! │  ┌──────────────────────────┐  ┌──┴────────┐  │
//! │  │ Sampler (tokio task)     │─▶│  Session  │  │
//! │  │  Ticker ─▶ FrameSource   │  └───────────┘  │
//! │  │        ─▶ MotionAnalyzer │── broadcast ──▶ AutoWakeEvent
//! │  └──────────────────────────┘                 │
//! └──────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod controller;
pub mod pipeline;
mod sampler;
pub mod scheduler;
pub mod session;

pub use backend::{default_source, FrameSource, SourceCounters, SyntheticSource};
pub use controller::{AutoWakeEvent, MotionController};
pub use session::*;
