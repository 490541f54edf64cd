//! Demo host for the kit viewer
//!
//! Plays the role the embedding application would: supplies the asset
//! location, the three region colors, viewport dimensions, and rotation
//! flags from the command line, then runs the viewer windowed. Press Escape
//! to dispose the session (deterministic teardown) and exit.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use clap::Parser;

use kitviewer::assets::KitAssetLocation;
use kitviewer::core::settings_persistence::load_settings_system;
use kitviewer::core::{ViewerSettings, ViewerState, ViewportConfig};
use kitviewer::rendering::KitColors;
use kitviewer::session::{release_session, request_dispose, RenderSession};
use kitviewer::KitViewerPlugin;

/// Command-line arguments supplied by the "host"
#[derive(Parser, Debug)]
#[command(name = "kitviewer", about = "Embeddable 3D sports kit viewer - demo host")]
struct HostArgs {
    /// Kit asset to load, relative to the assets directory
    #[arg(long, default_value = "models/kit/maillot.glb")]
    asset: String,

    /// Shirt / primary region color (#RRGGBB or #RRGGBBAA)
    #[arg(long)]
    shirt: Option<String>,

    /// Shorts / secondary region color
    #[arg(long)]
    shorts: Option<String>,

    /// Socks / tertiary region color
    #[arg(long)]
    socks: Option<String>,

    /// Viewport width in logical pixels
    #[arg(long, default_value_t = 480)]
    width: u32,

    /// Viewport height in logical pixels
    #[arg(long, default_value_t = 640)]
    height: u32,

    /// Device pixel ratio reported by the host (capped at 2)
    #[arg(long, default_value_t = 1.0)]
    device_pixel_ratio: f32,

    /// Disable the idle turntable rotation
    #[arg(long)]
    no_rotate: bool,

    /// Yaw step per frame, in radians
    #[arg(long)]
    rotation_step: Option<f32>,
}

/// CLI values that override the persisted settings for this run
#[derive(Resource, Debug, Clone)]
struct HostOverrides {
    auto_rotate: Option<bool>,
    rotation_step: Option<f32>,
}

fn main() {
    let args = HostArgs::parse();
    let viewport = ViewportConfig::new(args.width, args.height, args.device_pixel_ratio);

    App::new()
        .insert_resource(viewport.clone())
        .insert_resource(KitAssetLocation(args.asset.clone()))
        .insert_resource(KitColors {
            shirt: args.shirt,
            shorts: args.shorts,
            socks: args.socks,
        })
        .insert_resource(HostOverrides {
            auto_rotate: args.no_rotate.then_some(false),
            rotation_step: args.rotation_step,
        })
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(viewport.to_window()),
            ..default()
        }))
        .add_plugins(KitViewerPlugin)
        .add_systems(Startup, apply_host_overrides.after(load_settings_system))
        .add_systems(Update, dispose_on_escape)
        .add_systems(
            OnEnter(ViewerState::Disposed),
            exit_after_release.after(release_session),
        )
        .run();
}

/// Let explicit CLI flags win over whatever was persisted
fn apply_host_overrides(overrides: Res<HostOverrides>, mut settings: ResMut<ViewerSettings>) {
    if let Some(auto_rotate) = overrides.auto_rotate {
        settings.auto_rotate = auto_rotate;
    }
    if let Some(step) = overrides.rotation_step {
        settings.rotation_step = step;
    }
    info!(
        "[HOST] settings: auto_rotate={}, rotation_step={}",
        settings.auto_rotate, settings.rotation_step
    );
}

/// Escape requests disposal - the deterministic teardown path
fn dispose_on_escape(
    keys: Res<ButtonInput<KeyCode>>,
    session: ResMut<RenderSession>,
    next_state: ResMut<NextState<ViewerState>>,
) {
    if keys.just_pressed(KeyCode::Escape) {
        request_dispose(session, next_state);
    }
}

/// Quit once the session has released its resources
fn exit_after_release(mut exit: MessageWriter<AppExit>) {
    info!("[HOST] session disposed; exiting");
    exit.write(AppExit::Success);
}
