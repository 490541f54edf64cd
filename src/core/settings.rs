//! Viewer settings resource
//!
//! Host-tunable behavior that is not tied to a single frame: the idle
//! turntable rotation and the matte-cloth roughness floor. Persisted across
//! sessions as JSON (see [`super::settings_persistence`]).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Resource tracking viewer behavior settings
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Resource)]
pub struct ViewerSettings {
    /// Whether the kit spins continuously while rendering
    pub auto_rotate: bool,

    /// Yaw increment applied to the kit each rendered frame, in radians
    pub rotation_step: f32,

    /// Lower bound enforced on the perceptual roughness of recolored
    /// regions. Garment materials are pushed toward a matte cloth finish;
    /// raise or lower this if an asset's authored look should win.
    pub roughness_floor: f32,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            auto_rotate: true,
            rotation_step: 0.01,
            roughness_floor: 0.5,
        }
    }
}
