//! Render session - the aggregate root of one viewer instance
//!
//! A [`RenderSession`] owns everything one embedded viewer holds on the GPU:
//! the kit scene hierarchy, the material slot index built from it, and (via
//! the [`SessionScoped`] marker) the session camera and lights. Nothing here
//! is shared across viewer instances - two viewers showing the same file each
//! decode and own their own copy.
//!
//! # Lifecycle
//!
//! - `Startup`: the camera and lights spawn and, if an asset location is
//!   configured, the session moves to `Loading`.
//! - `OnEnter(Ready)`: colors are bound, the camera framed, and only then is
//!   the kit made visible - the first visible frame always carries the host
//!   colors. The frame schedule starts right after.
//! - `OnEnter(Failed)`: the frame schedule starts with no model attached.
//! - `OnEnter(Disposed)`: [`release_session`] walks the hierarchy and
//!   releases every geometry and material asset exactly once, then drops the
//!   camera and lights. Idempotent and safe to reach before any load.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::assets::KitAssets;
use crate::core::states::{SessionScoped, ViewerState};
use crate::rendering::camera::{frame_kit_camera, spawn_viewer_camera};
use crate::rendering::materials::bind_kit_colors;

/// One named, addressable region of the kit's surface
///
/// A region is backed by one material reference or, for multi-material
/// meshes, an ordered list of them. Every operation on a slot applies
/// uniformly to all members.
#[derive(Debug, Clone)]
pub enum MaterialSlot {
    Single(Handle<StandardMaterial>),
    Multi(Vec<Handle<StandardMaterial>>),
}

impl MaterialSlot {
    /// All material references backing this slot
    pub fn handles(&self) -> &[Handle<StandardMaterial>] {
        match self {
            Self::Single(handle) => std::slice::from_ref(handle),
            Self::Multi(handles) => handles,
        }
    }

    /// Register an additional reference, upgrading `Single` to `Multi`
    pub fn push(&mut self, handle: Handle<StandardMaterial>) {
        match self {
            Self::Single(first) => {
                let first = first.clone();
                *self = Self::Multi(vec![first, handle]);
            }
            Self::Multi(handles) => handles.push(handle),
        }
    }

    pub fn len(&self) -> usize {
        self.handles().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles().is_empty()
    }
}

/// Aggregate root owning one viewer instance's scene and GPU handles
#[derive(Resource, Debug, Default)]
pub struct RenderSession {
    /// Root entity of the spawned kit hierarchy, if a load succeeded
    pub kit_root: Option<Entity>,

    /// Slot index: authored material name -> session-owned references
    pub slots: HashMap<String, MaterialSlot>,

    /// Vertical half-extent captured at framing time, reused on resize
    pub framed_half_height: Option<f32>,

    /// Liveness flag: set the moment teardown is requested. Checked by every
    /// asynchronous completion before it mutates the session.
    pub disposed: bool,

    /// Whether the one-shot resource release has already run
    pub released: bool,
}

/// Plugin wiring session lifecycle into the state machine
pub struct SessionPlugin;

impl Plugin for SessionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<RenderSession>();
        app.add_systems(
            Startup,
            (spawn_viewer_camera, spawn_session_lights, attach_session).chain(),
        );
        // Binder before framer, both strictly before the kit becomes visible.
        app.add_systems(
            OnEnter(ViewerState::Ready),
            (
                bind_kit_colors,
                frame_kit_camera,
                attach_kit_scene,
                begin_rendering,
            )
                .chain(),
        );
        app.add_systems(OnEnter(ViewerState::Failed), begin_rendering);
        app.add_systems(OnEnter(ViewerState::Disposed), release_session);
    }
}

/// System to attach the viewer to its viewport and request the asset load
pub fn attach_session(
    session: Res<RenderSession>,
    location: Option<Res<crate::assets::KitAssetLocation>>,
    mut next_state: ResMut<NextState<ViewerState>>,
) {
    if session.disposed {
        return;
    }
    match location {
        Some(location) => {
            info!("[SESSION] attached; requesting kit asset '{}'", location.0);
            next_state.set(ViewerState::Loading);
        }
        None => {
            warn!("[SESSION] no kit asset location configured; viewer stays uninitialized");
        }
    }
}

/// Spawn the session's lighting rig
///
/// A key directional light plus a fill light; this is the entire scene while
/// the asset is in flight or after a failed load.
fn spawn_session_lights(mut commands: Commands) {
    commands.spawn((
        DirectionalLight {
            illuminance: 12_000.0,
            shadows_enabled: false,
            color: Color::WHITE,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::XYZ,
            -std::f32::consts::FRAC_PI_4,
            std::f32::consts::FRAC_PI_4,
            0.0,
        )),
        SessionScoped,
        Name::new("Key Light"),
    ));

    commands.spawn((
        PointLight {
            intensity: 300_000.0,
            range: 50.0,
            shadows_enabled: false,
            color: Color::WHITE,
            ..default()
        },
        Transform::from_xyz(-2.0, 1.0, 3.0),
        SessionScoped,
        Name::new("Fill Light"),
    ));
}

/// System to make the framed, recolored kit visible
fn attach_kit_scene(session: Res<RenderSession>, mut visibilities: Query<&mut Visibility>) {
    let Some(root) = session.kit_root else {
        return;
    };
    if let Ok(mut visibility) = visibilities.get_mut(root) {
        *visibility = Visibility::Visible;
        info!("[SESSION] kit attached to scene");
    }
}

/// System to start the repeating frame schedule
fn begin_rendering(
    state: Res<State<ViewerState>>,
    session: Res<RenderSession>,
    mut next_state: ResMut<NextState<ViewerState>>,
) {
    if session.disposed {
        return;
    }
    if *state.get() == ViewerState::Failed {
        info!("[SESSION] rendering without a model (load failed)");
    }
    next_state.set(ViewerState::Rendering);
}

/// Request teardown of the session
///
/// Sets the liveness flag synchronously (so completions later in the same
/// tick already see it) and routes the state machine to `Disposed`, which
/// cancels the frame-gated systems before [`release_session`] runs.
pub fn request_dispose(
    mut session: ResMut<RenderSession>,
    mut next_state: ResMut<NextState<ViewerState>>,
) {
    if session.disposed {
        return;
    }
    session.disposed = true;
    info!("[SESSION] disposal requested");
    next_state.set(ViewerState::Disposed);
}

/// System releasing every session-owned GPU resource exactly once
///
/// Walks the kit hierarchy releasing each mesh's geometry and every material
/// reference (single or multi), despawns it, then despawns the remaining
/// session-scoped entities (camera, lights) - the session's binding to its
/// drawable surface. Safe to call when no asset ever loaded and safe to call
/// repeatedly.
pub fn release_session(
    mut commands: Commands,
    mut session: ResMut<RenderSession>,
    mut kit_assets: ResMut<KitAssets>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    children: Query<&Children>,
    mesh_handles: Query<&Mesh3d>,
    material_handles: Query<&MeshMaterial3d<StandardMaterial>>,
    scoped: Query<Entity, With<SessionScoped>>,
) {
    if session.released {
        debug!("[SESSION] release called again; nothing left to do");
        return;
    }
    session.disposed = true;

    let mut released_meshes = 0usize;
    let mut released_materials = 0usize;

    let despawned_root = session.kit_root.take();
    if let Some(root) = despawned_root {
        let mut stack = vec![root];
        while let Some(entity) = stack.pop() {
            if let Ok(entity_children) = children.get(entity) {
                stack.extend(entity_children.iter());
            }
            if let Ok(mesh) = mesh_handles.get(entity) {
                if meshes.remove(&mesh.0).is_some() {
                    released_meshes += 1;
                }
            }
            if let Ok(material) = material_handles.get(entity) {
                if materials.remove(&material.0).is_some() {
                    released_materials += 1;
                }
            }
        }
        commands.entity(root).despawn();
    }

    // Slot references not reachable through the entity walk (already
    // re-pointed meshes, multi-slot members) are released here; removing an
    // id twice is a no-op.
    for (_, slot) in session.slots.drain() {
        for handle in slot.handles() {
            if materials.remove(handle).is_some() {
                released_materials += 1;
            }
        }
    }

    // Drop the strong GLTF handle so the decoded asset can unload.
    kit_assets.kit_gltf = Handle::default();

    // Surface binding: the session camera and lights go last. The kit root
    // also carries the marker but has already been despawned above.
    for entity in scoped.iter() {
        if Some(entity) == despawned_root {
            continue;
        }
        commands.entity(entity).despawn();
    }

    session.framed_half_height = None;
    session.released = true;
    info!(
        "[SESSION] released {} mesh(es) and {} material(s)",
        released_meshes, released_materials
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle_a() -> Handle<StandardMaterial> {
        Handle::default()
    }

    #[test]
    fn test_single_slot_upgrades_to_multi() {
        let mut slot = MaterialSlot::Single(handle_a());
        assert_eq!(slot.len(), 1);

        slot.push(handle_a());
        assert!(matches!(slot, MaterialSlot::Multi(_)));
        assert_eq!(slot.len(), 2);

        slot.push(handle_a());
        assert_eq!(slot.len(), 3);
    }

    #[test]
    fn test_slot_handles_exposes_all_members() {
        let slot = MaterialSlot::Multi(vec![handle_a(), handle_a()]);
        assert_eq!(slot.handles().len(), 2);
        assert!(!slot.is_empty());
    }

    #[test]
    fn test_fresh_session_is_live_and_empty() {
        let session = RenderSession::default();
        assert!(session.kit_root.is_none());
        assert!(session.slots.is_empty());
        assert!(!session.disposed);
        assert!(!session.released);
    }
}
