//! Idle turntable rotation
//!
//! While the frame schedule runs, the kit root's yaw advances by a fixed
//! angular step each tick (the host supplies radians per frame, not per
//! second). Disabled entirely when auto-rotate is off; the accumulated angle
//! survives recolors and viewport resizes because neither path touches the
//! root transform.

use bevy::prelude::*;

use crate::core::settings::ViewerSettings;
use crate::session::RenderSession;

/// System applying the per-frame yaw step to the kit root
pub fn auto_rotate_kit(
    settings: Res<ViewerSettings>,
    session: Res<RenderSession>,
    mut transforms: Query<&mut Transform>,
) {
    if !settings.auto_rotate {
        return;
    }
    let Some(root) = session.kit_root else {
        return;
    };
    if let Ok(mut transform) = transforms.get_mut(root) {
        transform.rotate_y(settings.rotation_step);
    }
}
