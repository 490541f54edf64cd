//! Settings persistence system
//!
//! Saves and loads [`ViewerSettings`] to/from a JSON file in the platform
//! configuration directory, so rotation and finish preferences survive across
//! viewer sessions.
//!
//! # Error Handling
//!
//! Both directions degrade gracefully: a missing or unreadable file falls
//! back to defaults, and a failed save is logged without interrupting
//! rendering.

use bevy::prelude::*;
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};

use super::error::ViewerResult;
use super::settings::ViewerSettings;

/// Settings filename
const SETTINGS_FILENAME: &str = "viewer_settings.json";

/// Resolve the settings file path
///
/// Points at `viewer_settings.json` in the user's configuration directory,
/// falling back to the working directory when no config dir can be resolved.
fn get_settings_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("com", "kitviewer", "KitViewer") {
        proj_dirs.config_dir().join(SETTINGS_FILENAME)
    } else {
        PathBuf::from(SETTINGS_FILENAME)
    }
}

fn read_settings(path: &Path) -> ViewerResult<ViewerSettings> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn write_settings(path: &Path, settings: &ViewerSettings) -> ViewerResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(settings)?)?;
    Ok(())
}

/// Load settings from file on startup
///
/// Runs early in the startup schedule so the loaded values are in place
/// before the session attaches. Any failure means defaults.
pub fn load_settings_system(mut commands: Commands) {
    let settings_path = get_settings_path();

    if settings_path.exists() {
        match read_settings(&settings_path) {
            Ok(settings) => {
                info!("[SETTINGS] loaded settings from {:?}", settings_path);
                commands.insert_resource(settings);
                return;
            }
            Err(e) => {
                warn!(
                    "[SETTINGS] failed to load settings from {:?}: {}. Using defaults.",
                    settings_path, e
                );
            }
        }
    } else {
        info!(
            "[SETTINGS] no settings file at {:?}; using defaults",
            settings_path
        );
    }

    commands.insert_resource(ViewerSettings::default());
}

/// Save settings to file when they change
///
/// Watches [`ViewerSettings`] and persists it on change. The `is_added`
/// guard keeps the initial insertion (startup load) from immediately writing
/// the file back.
pub fn save_settings_system(settings: Res<ViewerSettings>) {
    if !settings.is_changed() || settings.is_added() {
        return;
    }

    let settings_path = get_settings_path();
    match write_settings(&settings_path, &settings) {
        Ok(()) => info!("[SETTINGS] saved settings to {:?}", settings_path),
        Err(e) => error!(
            "[SETTINGS] failed to save settings to {:?}: {}",
            settings_path, e
        ),
    }
}
