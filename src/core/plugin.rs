//! Core plugin for the kit viewer
//!
//! Sets up the foundational pieces every other viewer plugin depends on:
//! - the [`ViewerState`] lifecycle state machine with transition validation
//! - host-facing configuration resources ([`ViewportConfig`], [`ViewerSettings`])
//! - settings persistence
//! - viewport/window synchronization
//!
//! Add this plugin before the asset, session, and rendering plugins; the
//! umbrella [`crate::KitViewerPlugin`] already does so in the right order.

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use bevy::window::WindowResized;

use super::settings::ViewerSettings;
use super::settings_persistence::{load_settings_system, save_settings_system};
use super::states::{
    log_state_heartbeat, validate_and_log_transitions, SessionLive, StateHeartbeatTimer,
    ViewerState,
};
use super::viewport::{apply_viewport_to_window, sync_viewport_from_window, ViewportConfig};

/// Foundation plugin: states, configuration, persistence
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        // Headless hosts (tests, embedders on MinimalPlugins) don't carry the
        // state machinery; full hosts already have it.
        if !app.is_plugin_added::<StatesPlugin>() {
            app.add_plugins(StatesPlugin);
        }

        // Lifecycle state machine
        app.init_state::<ViewerState>()
            .add_computed_state::<SessionLive>()
            .init_resource::<StateHeartbeatTimer>();

        // Host-facing configuration. init_resource keeps a host-inserted
        // value if one is already present.
        app.init_resource::<ViewportConfig>();
        app.init_resource::<ViewerSettings>();

        app.register_type::<ViewportConfig>()
            .register_type::<ViewerSettings>();

        // Resize messages may arrive before any window plugin registers them
        // (headless hosts); registration is idempotent.
        app.add_message::<WindowResized>();

        app.add_systems(Startup, load_settings_system);

        app.add_systems(
            Update,
            (
                validate_and_log_transitions,
                log_state_heartbeat,
                save_settings_system,
                sync_viewport_from_window,
                apply_viewport_to_window.run_if(resource_changed::<ViewportConfig>),
            ),
        );
    }
}
