//! Rendering module - per-frame behavior of the kit viewer
//!
//! Groups the three rendering concerns of a session:
//!
//! - `materials` - resolving host colors onto the named material slots
//! - `camera` - one-shot bounding-box framing and resize reframing
//! - `rotation` - the fixed-step idle turntable
//!
//! All per-frame systems here are gated on the lifecycle state: recoloring
//! and rotation run only while `Rendering`, reframing whenever the session is
//! live. Leaving those states is what cancels the work - nothing here owns a
//! timer or its own scheduling.

pub mod camera;
pub mod materials;
pub mod rotation;

use bevy::prelude::*;

use crate::core::states::{SessionLive, ViewerState};
use crate::core::viewport::ViewportConfig;

pub use camera::{framing_distance, ViewerCamera, FRAMING_PADDING, VERTICAL_FOV_DEGREES};
pub use materials::{apply_color, KitColors, KitSlotNames};
pub use rotation::auto_rotate_kit;

/// Plugin wiring the per-frame render behavior
pub struct KitRenderPlugin;

impl Plugin for KitRenderPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KitColors>();
        app.init_resource::<KitSlotNames>();

        app.add_systems(
            Update,
            (
                // Host recolors apply within the tick that delivers them.
                materials::bind_kit_colors.run_if(
                    resource_changed::<KitColors>.and(in_state(ViewerState::Rendering)),
                ),
                rotation::auto_rotate_kit.run_if(in_state(ViewerState::Rendering)),
                camera::reframe_on_viewport_change
                    .run_if(resource_changed::<ViewportConfig>.and(in_state(SessionLive))),
            ),
        );
    }
}
