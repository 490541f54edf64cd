//! kitviewer - embeddable real-time 3D sports kit viewer
//!
//! One viewer instance loads one kit asset, indexes its named material
//! regions, recolors them on host demand, frames the camera from the asset's
//! bounding box, optionally spins the kit, and tears every GPU-side resource
//! down exactly once on disposal.
//!
//! The host supplies four things: a [`KitAssetLocation`], a [`KitColors`]
//! resource it may mutate at any time, a [`ViewportConfig`] it may resize,
//! and [`ViewerSettings`] for rotation and finish. Everything else -
//! loading, slot resolution, framing, the frame schedule, teardown - is
//! owned by [`KitViewerPlugin`].

pub mod assets;
pub mod color;
pub mod core;
pub mod rendering;
pub mod session;

use bevy::prelude::*;

pub use self::assets::KitAssetLocation;
pub use self::color::ColorSpec;
pub use self::core::{CorePlugin, ViewerSettings, ViewerState, ViewportConfig};
pub use self::rendering::{KitColors, KitSlotNames};
pub use self::session::{request_dispose, RenderSession};

/// Umbrella plugin: the complete kit viewer
///
/// Registers core state management, asset loading, the render session
/// lifecycle, and the per-frame render behavior, in that order.
pub struct KitViewerPlugin;

impl Plugin for KitViewerPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            self::core::CorePlugin,
            self::assets::KitAssetPlugin,
            self::session::SessionPlugin,
            self::rendering::KitRenderPlugin,
        ));
    }
}
