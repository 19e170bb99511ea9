//! Error types shared across Wakesight crates.

use std::fmt;

/// Why a camera device could not be acquired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquisitionKind {
    /// The user or the OS refused access to the device.
    PermissionDenied,
    /// No device, device busy, or the backend failed to start.
    Unavailable,
    /// The device never reported a stable frame geometry.
    Timeout,
}

impl fmt::Display for AcquisitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AcquisitionKind::PermissionDenied => "permission denied",
            AcquisitionKind::Unavailable => "device unavailable",
            AcquisitionKind::Timeout => "negotiation timed out",
        };
        f.write_str(label)
    }
}

/// Top-level error type for Wakesight operations.
#[derive(Debug, thiserror::Error)]
pub enum WakesightError {
    #[error("Acquisition error ({kind}): {message}")]
    Acquisition {
        kind: AcquisitionKind,
        message: String,
    },

    #[error("Frame error: {message}")]
    Frame { message: String },

    #[error("Processing error: {message}")]
    Processing { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Platform error: {message}")]
    Platform { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using WakesightError.
pub type WakesightResult<T> = Result<T, WakesightError>;

impl WakesightError {
    pub fn acquisition(kind: AcquisitionKind, msg: impl Into<String>) -> Self {
        Self::Acquisition {
            kind,
            message: msg.into(),
        }
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::acquisition(AcquisitionKind::PermissionDenied, msg)
    }

    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::acquisition(AcquisitionKind::Unavailable, msg)
    }

    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::acquisition(AcquisitionKind::Timeout, msg)
    }

    pub fn frame(msg: impl Into<String>) -> Self {
        Self::Frame {
            message: msg.into(),
        }
    }

    pub fn processing(msg: impl Into<String>) -> Self {
        Self::Processing {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn platform(msg: impl Into<String>) -> Self {
        Self::Platform {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error is fatal to a session start (device acquisition).
    pub fn is_acquisition(&self) -> bool {
        matches!(self, Self::Acquisition { .. })
    }

    /// The acquisition failure kind, if this is an acquisition error.
    pub fn acquisition_kind(&self) -> Option<AcquisitionKind> {
        match self {
            Self::Acquisition { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
