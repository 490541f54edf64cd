//! Error types for the viewer core
//!
//! Every condition in this taxonomy is recovered locally: load failures leave
//! the session rendering without a model, malformed colors fall back to opaque
//! white, missing slots are skipped, and a load that resolves after disposal
//! is discarded. The variants exist so those recoveries are reported through
//! the logging channel with one consistent vocabulary, not so callers can
//! match on them.

use thiserror::Error;

/// Errors that can occur inside the viewer core
#[derive(Error, Debug)]
pub enum ViewerError {
    /// The kit asset fetch or decode failed (or timed out). The session
    /// proceeds to rendering with no model attached.
    #[error("failed to load kit asset '{location}': {reason}")]
    AssetLoad { location: String, reason: String },

    /// A color was supplied for a slot name the loaded asset does not expose.
    /// Assets legitimately omit regions, so this is skipped, not raised.
    #[error("material slot '{slot}' not present in the loaded asset; color ignored")]
    MaterialSlotNotFound { slot: String },

    /// A color string matched neither `RRGGBB` nor `RRGGBBAA`.
    #[error("invalid color format '{input}'; falling back to opaque white")]
    InvalidColorFormat { input: String },

    /// An asynchronous asset resolution arrived after teardown was requested.
    #[error("kit asset resolved after session disposal; result discarded")]
    DisposalRace,

    /// Settings file I/O error
    #[error("settings I/O error: {0}")]
    SettingsIo(#[from] std::io::Error),

    /// Settings serialization/deserialization error
    #[error("settings serialization error: {0}")]
    SettingsSerialization(#[from] serde_json::Error),
}

/// Result type alias for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;
