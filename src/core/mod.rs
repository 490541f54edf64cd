//! Core module - lifecycle state machine and viewer infrastructure
//!
//! Provides the foundational state machine and configuration surface for the
//! kit viewer using Bevy's state system.
//!
//! # Architecture Overview
//!
//! ## State Architecture
//!
//! - [`ViewerState`] - session lifecycle (`Uninitialized` → `Loading` →
//!   `Ready` → `Rendering` → `Disposed`, with a `Failed` branch that still
//!   reaches `Rendering`)
//! - [`SessionLive`] - computed state active whenever the session holds or is
//!   acquiring a scene
//!
//! ## Resources
//!
//! - [`ViewportConfig`] - host-supplied surface dimensions and pixel density
//! - [`ViewerSettings`] - rotation and material-finish preferences, persisted
//!   as JSON
//!
//! ## Core Plugin
//!
//! [`CorePlugin`] wires state initialization, transition validation and
//! logging, settings persistence, and viewport/window synchronization. It has
//! no dependencies on the other viewer plugins and must be added first.

pub mod error;
pub mod plugin;
pub mod settings;
pub mod settings_persistence;
pub mod states;
pub mod viewport;

// Re-export commonly used items
pub use error::{ViewerError, ViewerResult};
pub use plugin::CorePlugin;
pub use settings::ViewerSettings;
pub use states::{SessionLive, SessionScoped, ViewerState};
pub use viewport::{ViewportConfig, MAX_DEVICE_PIXEL_RATIO};
