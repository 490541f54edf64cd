//! Camera framing - fit the whole kit into the viewport
//!
//! Framing is a one-shot computation, not per-frame work: it runs once when
//! an asset finishes loading and once per viewport resize. The kit's
//! axis-aligned bounding box is accumulated over every mesh in the hierarchy,
//! the *asset root* is translated so the box center sits on the world origin
//! (the camera is never used for centering), and the camera backs up along
//! +Z far enough for the box's full vertical extent to fit the field of view,
//! with a small padding margin so the silhouette never touches the viewport
//! edge.
//!
//! A degenerate (zero-size) bounding box falls back to a fixed minimum
//! distance; if no usable box exists at all the camera keeps its last known
//! good state. Framing never fails.

use bevy::camera::primitives::MeshAabb;
use bevy::prelude::*;

use crate::core::states::SessionScoped;
use crate::core::viewport::ViewportConfig;
use crate::session::RenderSession;

/// Vertical field of view of the viewer camera, degrees
pub const VERTICAL_FOV_DEGREES: f32 = 45.0;

/// Margin multiplier keeping the kit silhouette off the viewport edge
pub const FRAMING_PADDING: f32 = 1.1;

/// Fallback camera distance for a degenerate bounding box
pub const MIN_FRAMING_DISTANCE: f32 = 1.0;

/// Camera distance before any asset has been framed
const DEFAULT_CAMERA_DISTANCE: f32 = 3.0;

/// Marker component for the session's camera
#[derive(Component, Debug, Default)]
pub struct ViewerCamera;

/// Spawn the session camera
///
/// Transparent clear color: the viewer never paints an opaque background, so
/// the host surface shows through around the kit.
pub fn spawn_viewer_camera(mut commands: Commands, viewport: Res<ViewportConfig>) {
    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(Color::NONE),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: VERTICAL_FOV_DEGREES.to_radians(),
            aspect_ratio: viewport.aspect_ratio(),
            ..default()
        }),
        Transform::from_xyz(0.0, 0.0, DEFAULT_CAMERA_DISTANCE).looking_at(Vec3::ZERO, Vec3::Y),
        ViewerCamera,
        SessionScoped,
        Name::new("Viewer Camera"),
    ));
}

/// Minimal camera distance fitting a vertical half-extent into the FOV
///
/// `half_height / tan(fov / 2)`, padded by [`FRAMING_PADDING`]. A
/// non-positive or non-finite half-extent falls back to
/// [`MIN_FRAMING_DISTANCE`] - never a division by zero, never infinity.
pub fn framing_distance(half_height: f32, vertical_fov: f32) -> f32 {
    if !half_height.is_finite() || half_height <= 0.0 {
        return MIN_FRAMING_DISTANCE;
    }
    half_height / (vertical_fov * 0.5).tan() * FRAMING_PADDING
}

/// Point the camera at the origin from the framing distance and refresh the
/// projection aspect
fn apply_framing(
    transform: &mut Transform,
    projection: &mut Projection,
    half_height: f32,
    viewport: &ViewportConfig,
) {
    if let Projection::Perspective(perspective) = projection {
        perspective.aspect_ratio = viewport.aspect_ratio();
        let distance = framing_distance(half_height, perspective.fov);
        *transform = Transform::from_xyz(0.0, 0.0, distance).looking_at(Vec3::ZERO, Vec3::Y);
    }
}

/// Accumulate the world-space AABB over every mesh under `root`
///
/// The root is still at identity when this runs (framing happens before the
/// frame schedule starts), so world space and asset-local space coincide.
fn scene_bounds(
    root: Entity,
    children: &Query<&Children>,
    mesh_query: &Query<(&Mesh3d, &GlobalTransform)>,
    meshes: &Assets<Mesh>,
) -> Option<(Vec3, Vec3)> {
    let mut min = Vec3::MAX;
    let mut max = Vec3::MIN;
    let mut found = false;

    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        if let Ok(entity_children) = children.get(entity) {
            stack.extend(entity_children.iter());
        }
        let Ok((mesh_handle, global)) = mesh_query.get(entity) else {
            continue;
        };
        let Some(aabb) = meshes.get(&mesh_handle.0).and_then(|mesh| mesh.compute_aabb()) else {
            continue;
        };

        let center = Vec3::from(aabb.center);
        let half_extents = Vec3::from(aabb.half_extents);
        for corner_x in [-1.0f32, 1.0] {
            for corner_y in [-1.0f32, 1.0] {
                for corner_z in [-1.0f32, 1.0] {
                    let corner = center
                        + half_extents * Vec3::new(corner_x, corner_y, corner_z);
                    let point = global.transform_point(corner);
                    min = min.min(point);
                    max = max.max(point);
                }
            }
        }
        found = true;
    }

    found.then_some((min, max))
}

/// System framing the camera around the freshly loaded kit
///
/// Runs once on entering `Ready`, after colors are bound and before the kit
/// becomes visible. Recenters the asset root on the origin and captures the
/// vertical half-extent for later resize reframing.
pub fn frame_kit_camera(
    mut session: ResMut<RenderSession>,
    viewport: Res<ViewportConfig>,
    meshes: Res<Assets<Mesh>>,
    children: Query<&Children>,
    mesh_query: Query<(&Mesh3d, &GlobalTransform)>,
    mut roots: Query<&mut Transform, Without<ViewerCamera>>,
    mut camera: Query<(&mut Transform, &mut Projection), With<ViewerCamera>>,
) {
    if session.disposed {
        return;
    }
    let Some(root) = session.kit_root else {
        // Failed load: no model, the camera keeps its last known good state.
        return;
    };

    let Some((min, max)) = scene_bounds(root, &children, &mesh_query, &meshes) else {
        warn!("[CAMERA] kit has no measurable geometry; keeping previous framing");
        return;
    };

    // Center the asset on the origin by moving its root, not the camera.
    let bounds_center = (min + max) * 0.5;
    if let Ok(mut root_transform) = roots.get_mut(root) {
        root_transform.translation -= bounds_center;
    }

    let half_height = (max.y - min.y) * 0.5;
    session.framed_half_height = Some(half_height);

    let Ok((mut cam_transform, mut projection)) = camera.single_mut() else {
        return;
    };
    apply_framing(&mut cam_transform, &mut projection, half_height, &viewport);

    info!(
        "[CAMERA] framed kit: half_height={:.3}, distance={:.3}, aspect={:.3}",
        half_height,
        cam_transform.translation.z,
        viewport.aspect_ratio()
    );
}

/// System reframing on viewport changes
///
/// Updates projection aspect and camera distance from the half-extent
/// captured at load time. No asset reload, no touch of the kit's rotation.
pub fn reframe_on_viewport_change(
    session: Res<RenderSession>,
    viewport: Res<ViewportConfig>,
    mut camera: Query<(&mut Transform, &mut Projection), With<ViewerCamera>>,
) {
    if session.disposed {
        return;
    }
    let Ok((mut cam_transform, mut projection)) = camera.single_mut() else {
        return;
    };

    match session.framed_half_height {
        Some(half_height) => {
            apply_framing(&mut cam_transform, &mut projection, half_height, &viewport);
        }
        None => {
            // Nothing framed yet (still loading, or no model): aspect only.
            if let Projection::Perspective(perspective) = &mut *projection {
                perspective.aspect_ratio = viewport.aspect_ratio();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framing_distance_bounds() {
        //! For any FOV in (0, 180) degrees the distance stays within
        //! [h / tan(fov/2), 1.2 * h / tan(fov/2)]
        let half_height = 0.9;
        for fov_degrees in [1.0f32, 30.0, 45.0, 60.0, 90.0, 120.0, 179.0] {
            let fov = fov_degrees.to_radians();
            let minimal = half_height / (fov * 0.5).tan();
            let distance = framing_distance(half_height, fov);
            assert!(
                distance >= minimal && distance <= 1.2 * minimal,
                "fov {} deg: distance {} outside [{}, {}]",
                fov_degrees,
                distance,
                minimal,
                1.2 * minimal
            );
        }
    }

    #[test]
    fn test_framing_distance_degenerate_box() {
        //! Zero, negative, and non-finite half-extents fall back to the
        //! fixed minimum instead of dividing by zero
        let fov = VERTICAL_FOV_DEGREES.to_radians();
        assert_eq!(framing_distance(0.0, fov), MIN_FRAMING_DISTANCE);
        assert_eq!(framing_distance(-1.0, fov), MIN_FRAMING_DISTANCE);
        assert_eq!(framing_distance(f32::NAN, fov), MIN_FRAMING_DISTANCE);
        assert_eq!(framing_distance(f32::INFINITY, fov), MIN_FRAMING_DISTANCE);
    }

    #[test]
    fn test_framing_distance_is_finite_and_positive() {
        for half_height in [0.01f32, 0.5, 1.0, 10.0, 1000.0] {
            let distance = framing_distance(half_height, VERTICAL_FOV_DEGREES.to_radians());
            assert!(distance.is_finite());
            assert!(distance > 0.0);
        }
    }
}
