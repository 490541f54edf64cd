//! Asset management module
//!
//! Loads the session's single kit asset (a GLTF file) and turns it into an
//! attached, addressable scene:
//!
//! 1. [`start_kit_loading`] hands the location to the asset server once.
//! 2. [`poll_kit_loading`] watches the load state each tick. On success it
//!    spawns the GLTF scene *hidden* under a kit-root entity; on failure or
//!    timeout it routes the session to the `Failed` state.
//! 3. [`index_kit_materials`] waits for the scene instance to materialize,
//!    then builds the material slot index: every mesh whose material carries
//!    a name in the GLTF's named-material table gets a session-owned clone of
//!    that material, registered under the name. Unnamed materials are not
//!    indexed - a host cannot target what has no name.
//!
//! The loader never returns an error to its caller. Failures are logged and
//! absorbed; the session keeps rendering a lights-only scene.
//!
//! # Disposal race
//!
//! A fetch that resolves after teardown was requested must not touch the
//! disposed session: both polling and indexing check the session's liveness
//! flag first and discard their result instead of attaching it.

use bevy::asset::{AssetLoadFailedEvent, LoadState};
use bevy::ecs::message::MessageReader;
use bevy::gltf::Gltf;
use bevy::prelude::*;
use std::collections::HashMap;

use crate::core::error::ViewerError;
use crate::core::states::{SessionScoped, ViewerState};
use crate::session::{MaterialSlot, RenderSession};

/// How long a fetch may stay in flight before it is treated as failed
pub const LOAD_TIMEOUT_SECS: f32 = 30.0;

/// Location of the kit asset, fixed for the session's lifetime
///
/// The host inserts this before (or instead of) requesting a load; without
/// it the viewer stays `Uninitialized`.
#[derive(Resource, Debug, Clone)]
pub struct KitAssetLocation(pub String);

/// Resource tracking the kit asset handle and load progress
#[derive(Resource, Default)]
pub struct KitAssets {
    /// The kit GLTF file
    pub kit_gltf: Handle<Gltf>,

    /// Whether loading has been started
    pub loading_started: bool,

    /// Whether loading has failed
    pub failed: bool,

    /// Error message if loading failed
    pub error_message: Option<String>,
}

/// Plugin wiring the load/poll/index systems into the `Loading` state
pub struct KitAssetPlugin;

impl Plugin for KitAssetPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<KitAssets>();
        app.add_message::<AssetLoadFailedEvent<Gltf>>();
        app.add_systems(OnEnter(ViewerState::Loading), start_kit_loading);
        app.add_systems(
            Update,
            (
                poll_kit_loading,
                handle_kit_load_failures,
                index_kit_materials,
            )
                .run_if(in_state(ViewerState::Loading)),
        );
    }
}

/// Record a load failure and route the session to the `Failed` state
fn report_load_failure(
    kit_assets: &mut KitAssets,
    next_state: &mut NextState<ViewerState>,
    location: &str,
    reason: String,
) {
    let err = ViewerError::AssetLoad {
        location: location.to_string(),
        reason,
    };
    error!("[ASSETS] {err}");
    kit_assets.failed = true;
    kit_assets.error_message = Some(err.to_string());
    next_state.set(ViewerState::Failed);
}

fn location_str<'a>(location: &'a Option<Res<'a, KitAssetLocation>>) -> &'a str {
    location.as_ref().map(|l| l.0.as_str()).unwrap_or("<unset>")
}

/// System to initiate the kit asset load
///
/// Runs once on entering `Loading`. The fetch is one-shot per session; there
/// is no automatic retry.
pub fn start_kit_loading(
    asset_server: Res<AssetServer>,
    location: Option<Res<KitAssetLocation>>,
    mut kit_assets: ResMut<KitAssets>,
    mut next_state: ResMut<NextState<ViewerState>>,
) {
    if kit_assets.loading_started {
        return;
    }

    let Some(location) = location else {
        report_load_failure(
            &mut kit_assets,
            &mut next_state,
            "<unset>",
            "no kit asset location configured".to_string(),
        );
        return;
    };

    info!("[ASSETS] loading kit asset from '{}'", location.0);
    kit_assets.kit_gltf = asset_server.load::<Gltf>(location.0.clone());
    kit_assets.loading_started = true;
}

/// System to watch the kit load state
///
/// On success, spawns the GLTF scene hidden under the kit-root entity; the
/// kit only becomes visible after colors are bound and the camera framed.
/// Failure and timeout both route to `Failed`.
pub fn poll_kit_loading(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    gltf_assets: Res<Assets<Gltf>>,
    location: Option<Res<KitAssetLocation>>,
    mut kit_assets: ResMut<KitAssets>,
    mut session: ResMut<RenderSession>,
    time: Res<Time>,
    mut loading_start: Local<Option<f32>>,
    mut next_state: ResMut<NextState<ViewerState>>,
) {
    if !kit_assets.loading_started || kit_assets.failed {
        return;
    }

    // Teardown may have been requested earlier this tick; a resolving load
    // must not mutate a disposed session.
    if session.disposed {
        debug!("[ASSETS] {}", ViewerError::DisposalRace);
        if let Some(root) = session.kit_root.take() {
            commands.entity(root).despawn();
        }
        return;
    }

    let elapsed = time.elapsed_secs();
    if loading_start.is_none() {
        *loading_start = Some(elapsed);
    }
    if let Some(start) = *loading_start {
        if elapsed - start > LOAD_TIMEOUT_SECS {
            if let Some(root) = session.kit_root.take() {
                commands.entity(root).despawn();
            }
            report_load_failure(
                &mut kit_assets,
                &mut next_state,
                location_str(&location),
                format!("load timed out after {LOAD_TIMEOUT_SECS} seconds"),
            );
            return;
        }
    }

    // Scene already spawned; indexing takes over from here.
    if session.kit_root.is_some() {
        return;
    }

    match asset_server.load_state(&kit_assets.kit_gltf) {
        LoadState::Loaded => {
            let Some(gltf) = gltf_assets.get(&kit_assets.kit_gltf) else {
                return;
            };
            let Some(scene) = gltf
                .default_scene
                .clone()
                .or_else(|| gltf.scenes.first().cloned())
            else {
                report_load_failure(
                    &mut kit_assets,
                    &mut next_state,
                    location_str(&location),
                    "kit asset contains no scenes".to_string(),
                );
                return;
            };

            let root = commands
                .spawn((
                    SceneRoot(scene),
                    Transform::default(),
                    Visibility::Hidden,
                    SessionScoped,
                    Name::new("Kit Root"),
                ))
                .id();
            session.kit_root = Some(root);
            info!("[ASSETS] kit asset decoded; spawning scene instance");
        }
        LoadState::Failed(_) => {
            report_load_failure(
                &mut kit_assets,
                &mut next_state,
                location_str(&location),
                "fetch or decode failed".to_string(),
            );
        }
        LoadState::NotLoaded | LoadState::Loading => {
            // Still in flight; the scene renders lights-only meanwhile.
        }
    }
}

/// System to consume asset-server failure messages (backup channel)
///
/// The load-state poll already catches failures; this surfaces the richer
/// error detail the asset server attaches to the message.
pub fn handle_kit_load_failures(
    mut failed_events: MessageReader<AssetLoadFailedEvent<Gltf>>,
    location: Option<Res<KitAssetLocation>>,
    mut kit_assets: ResMut<KitAssets>,
    mut next_state: ResMut<NextState<ViewerState>>,
) {
    if kit_assets.failed {
        return;
    }

    for event in failed_events.read() {
        if event.id == kit_assets.kit_gltf.id() {
            report_load_failure(
                &mut kit_assets,
                &mut next_state,
                location_str(&location),
                format!("{:?}", event.error),
            );
        }
    }
}

/// System to build the material slot index once the scene instance exists
///
/// Walks the spawned hierarchy; every mesh whose material resolves to a name
/// in the GLTF's named-material table gets a session-owned material clone
/// (recoloring one viewer must never leak into another viewing the same
/// file). The first reference under a name forms a `Single` slot; further
/// references upgrade it to `Multi`. On completion the session moves to
/// `Ready`, where binding and framing run before the kit becomes visible.
pub fn index_kit_materials(
    mut commands: Commands,
    kit_assets: Res<KitAssets>,
    gltf_assets: Res<Assets<Gltf>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut session: ResMut<RenderSession>,
    children: Query<&Children>,
    material_refs: Query<&MeshMaterial3d<StandardMaterial>>,
    mut next_state: ResMut<NextState<ViewerState>>,
) {
    let Some(root) = session.kit_root else {
        return;
    };

    if session.disposed {
        debug!("[ASSETS] {}", ViewerError::DisposalRace);
        commands.entity(root).despawn();
        session.kit_root = None;
        return;
    }

    // Collect the mesh entities of the instance; empty means the scene
    // spawner has not materialized it yet.
    let mut mesh_entities = Vec::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if let Ok(entity_children) = children.get(entity) {
            stack.extend(entity_children.iter());
        }
        if material_refs.contains(entity) {
            mesh_entities.push(entity);
        }
    }
    if mesh_entities.is_empty() {
        return;
    }

    let Some(gltf) = gltf_assets.get(&kit_assets.kit_gltf) else {
        return;
    };

    // Slots are addressed by the authored material names.
    let mut names: HashMap<AssetId<StandardMaterial>, &str> = HashMap::new();
    for (name, handle) in gltf.named_materials.iter() {
        if !name.is_empty() {
            names.insert(handle.id(), name.as_ref());
        }
    }

    let mut indexed = 0usize;
    for entity in mesh_entities {
        let Ok(source) = material_refs.get(entity) else {
            continue;
        };
        let Some(name) = names.get(&source.0.id()) else {
            continue;
        };
        let Some(material) = materials.get(&source.0).cloned() else {
            continue;
        };

        let owned = materials.add(material);
        commands
            .entity(entity)
            .insert(MeshMaterial3d(owned.clone()));

        match session.slots.get_mut(*name) {
            Some(slot) => slot.push(owned),
            None => {
                session
                    .slots
                    .insert((*name).to_string(), MaterialSlot::Single(owned));
            }
        }
        indexed += 1;
    }

    info!(
        "[ASSETS] indexed {} material reference(s) across {} slot(s)",
        indexed,
        session.slots.len()
    );
    next_state.set(ViewerState::Ready);
}
