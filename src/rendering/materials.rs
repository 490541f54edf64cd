//! Material binding - host colors onto named kit regions
//!
//! The host supplies up to three nullable color strings (shirt, shorts,
//! socks). Whenever the asset finishes loading, or any of those inputs
//! changes afterwards, the binder resolves each region's slot in the session
//! index and applies the parsed color to every material reference behind it.
//!
//! Rules applied per material:
//! - base color comes from the parsed RGB (+ alpha);
//! - an alpha below 1.0 switches the material to blended transparency - the
//!   flag is only ever turned on, never automatically reverted;
//! - perceptual roughness is clamped up to the configured cloth floor so
//!   recolored regions keep a matte finish;
//! - metalness is zeroed - kits are not metallic.
//!
//! A `None` color and an absent slot are both no-ops, and applying the same
//! `(slot, color)` pair twice leaves the material in the identical state.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::color::{self, ColorSpec};
use crate::core::error::ViewerError;
use crate::core::settings::ViewerSettings;
use crate::session::{MaterialSlot, RenderSession};

/// Host-supplied nullable color strings for the three kit regions
///
/// `None` means "leave this region's authored appearance alone". The host
/// mutates this resource at will; changes are applied within the same tick.
#[derive(Resource, Debug, Clone, Default)]
pub struct KitColors {
    /// Shirt / primary region
    pub shirt: Option<String>,
    /// Shorts / secondary region
    pub shorts: Option<String>,
    /// Socks / tertiary region
    pub socks: Option<String>,
}

/// Slot names addressed by the three fixed regions
///
/// Defaults match the naming convention of the kit assets this viewer ships
/// with; hosts with differently authored assets override the resource.
#[derive(Resource, Debug, Clone)]
pub struct KitSlotNames {
    pub shirt: String,
    pub shorts: String,
    pub socks: String,
}

impl Default for KitSlotNames {
    fn default() -> Self {
        Self {
            shirt: "M_Couleur_Shirt".to_string(),
            shorts: "M_Couleur_Short".to_string(),
            socks: "M_Couleur_Socks".to_string(),
        }
    }
}

/// Apply one color to one named slot
///
/// `color == None` leaves the slot untouched. An unknown slot name is skipped
/// (assets legitimately omit regions). Otherwise every material reference in
/// the slot receives the color, the transparency flag when translucent, the
/// roughness floor, and zeroed metalness. Mutating through `Assets` marks the
/// material for GPU re-upload.
pub fn apply_color(
    materials: &mut Assets<StandardMaterial>,
    slots: &HashMap<String, MaterialSlot>,
    slot_name: &str,
    color: Option<ColorSpec>,
    roughness_floor: f32,
) {
    let Some(spec) = color else {
        return;
    };
    let Some(slot) = slots.get(slot_name) else {
        debug!(
            "[MATERIALS] {}",
            ViewerError::MaterialSlotNotFound {
                slot: slot_name.to_string(),
            }
        );
        return;
    };

    for handle in slot.handles() {
        let Some(material) = materials.get_mut(handle) else {
            continue;
        };
        material.base_color = spec.to_color();
        if spec.is_translucent() {
            material.alpha_mode = AlphaMode::Blend;
        }
        material.perceptual_roughness = material.perceptual_roughness.clamp(roughness_floor, 1.0);
        material.metallic = 0.0;
    }
}

/// System binding the three current host colors to the session's slots
///
/// Runs once when the loaded asset enters `Ready` (before it becomes
/// visible) and again whenever [`KitColors`] changes while rendering. The
/// change path touches materials only - never camera state, rotation angle,
/// or the loaded asset.
pub fn bind_kit_colors(
    session: Res<RenderSession>,
    colors: Res<KitColors>,
    slot_names: Res<KitSlotNames>,
    settings: Res<ViewerSettings>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if session.disposed || session.slots.is_empty() {
        return;
    }

    let floor = settings.roughness_floor;
    apply_color(
        &mut materials,
        &session.slots,
        &slot_names.shirt,
        colors.shirt.as_deref().map(color::parse),
        floor,
    );
    apply_color(
        &mut materials,
        &session.slots,
        &slot_names.shorts,
        colors.shorts.as_deref().map(color::parse),
        floor,
    );
    apply_color(
        &mut materials,
        &session.slots,
        &slot_names.socks,
        colors.socks.as_deref().map(color::parse),
        floor,
    );
    debug!(
        "[MATERIALS] bound kit colors across {} indexed slot(s)",
        session.slots.len()
    );
}
