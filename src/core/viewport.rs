//! Viewport configuration resource
//!
//! The host owns the viewport: it decides how many logical pixels the viewer
//! gets and may change its mind at any time. A change here resizes the
//! drawable surface and updates the camera aspect - nothing is reloaded and
//! the current rotation angle is untouched.
//!
//! The device pixel ratio is capped at 2 so a retina-class display does not
//! quadruple the fragment cost of what is usually a small embedded widget.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use bevy::window::{PresentMode, PrimaryWindow, Window, WindowResized, WindowResolution};

/// Upper bound applied to the host-reported device pixel ratio
pub const MAX_DEVICE_PIXEL_RATIO: f32 = 2.0;

/// Host-supplied viewport dimensions and pixel density
#[derive(Resource, Debug, Clone, PartialEq, Reflect)]
#[reflect(Resource)]
pub struct ViewportConfig {
    /// Drawable width in logical pixels
    pub width_px: u32,
    /// Drawable height in logical pixels
    pub height_px: u32,
    /// Host-reported device pixel ratio; read back through
    /// [`ViewportConfig::scale_factor`], which applies the cap
    pub device_pixel_ratio: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width_px: 480,
            height_px: 640,
            device_pixel_ratio: 1.0,
        }
    }
}

impl ViewportConfig {
    pub fn new(width_px: u32, height_px: u32, device_pixel_ratio: f32) -> Self {
        Self {
            width_px,
            height_px,
            device_pixel_ratio,
        }
    }

    /// Width over height, guarded against a zero-height viewport
    pub fn aspect_ratio(&self) -> f32 {
        self.width_px as f32 / self.height_px.max(1) as f32
    }

    /// Effective render scale: the host's device pixel ratio, capped at 2
    pub fn scale_factor(&self) -> f32 {
        self.device_pixel_ratio.min(MAX_DEVICE_PIXEL_RATIO)
    }

    /// Create the viewer window from this configuration
    ///
    /// The window is transparent: the viewer never paints an opaque clear
    /// color, so whatever the host draws behind the surface shows through.
    pub fn to_window(&self) -> Window {
        Window {
            title: "Kit Viewer".to_string(),
            resolution: WindowResolution::new(self.width_px, self.height_px)
                .with_scale_factor_override(self.scale_factor()),
            transparent: true,
            resizable: true,
            present_mode: PresentMode::AutoVsync,
            ..default()
        }
    }
}

/// Apply host viewport changes to the drawable surface
///
/// Runs when [`ViewportConfig`] changes. Only touches the window resolution;
/// camera aspect and framing distance are updated by the camera module from
/// the same change signal.
pub fn apply_viewport_to_window(
    viewport: Res<ViewportConfig>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows.single_mut() else {
        return;
    };
    let same_size = window.resolution.width() as u32 == viewport.width_px
        && window.resolution.height() as u32 == viewport.height_px;
    if same_size {
        return;
    }
    window.resolution = WindowResolution::new(viewport.width_px, viewport.height_px)
        .with_scale_factor_override(viewport.scale_factor());
    info!(
        "[VIEWPORT] surface resized to {}x{} (scale {})",
        viewport.width_px,
        viewport.height_px,
        viewport.scale_factor()
    );
}

/// Keep [`ViewportConfig`] in sync with OS-driven window resizes
///
/// The guard against equal dimensions stops the window-write / resize-message
/// pair from ping-ponging.
pub fn sync_viewport_from_window(
    mut resized: MessageReader<WindowResized>,
    mut viewport: ResMut<ViewportConfig>,
) {
    for event in resized.read() {
        let (width, height) = (event.width as u32, event.height as u32);
        if width == viewport.width_px && height == viewport.height_px {
            continue;
        }
        viewport.width_px = width;
        viewport.height_px = height;
    }
}
