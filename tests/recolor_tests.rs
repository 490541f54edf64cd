//! Integration tests for material slot binding
//!
//! Exercises the binder against real `StandardMaterial` assets in a headless
//! app: the three-region recolor scenario, slot-miss tolerance, idempotence,
//! and the one-way transparency flag.

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use std::collections::HashMap;

use kitviewer::color;
use kitviewer::rendering::apply_color;
use kitviewer::session::MaterialSlot;

const ROUGHNESS_FLOOR: f32 = 0.5;

fn material_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(AssetPlugin::default());
    app.init_asset::<StandardMaterial>();
    app
}

/// A glossy, slightly metallic authored material - the binder should
/// flatten it toward cloth.
fn authored_material() -> StandardMaterial {
    StandardMaterial {
        base_color: Color::srgb(0.7, 0.7, 0.7),
        perceptual_roughness: 0.3,
        metallic: 0.4,
        ..default()
    }
}

struct SlotFixture {
    shirt: Handle<StandardMaterial>,
    shorts: Handle<StandardMaterial>,
    socks: Handle<StandardMaterial>,
    slots: HashMap<String, MaterialSlot>,
}

fn build_slots(materials: &mut Assets<StandardMaterial>) -> SlotFixture {
    let shirt = materials.add(authored_material());
    let shorts = materials.add(authored_material());
    let socks = materials.add(authored_material());

    let mut slots = HashMap::new();
    slots.insert(
        "M_Couleur_Shirt".to_string(),
        MaterialSlot::Single(shirt.clone()),
    );
    slots.insert(
        "M_Couleur_Short".to_string(),
        MaterialSlot::Single(shorts.clone()),
    );
    slots.insert(
        "M_Couleur_Socks".to_string(),
        MaterialSlot::Single(socks.clone()),
    );

    SlotFixture {
        shirt,
        shorts,
        socks,
        slots,
    }
}

#[test]
fn test_three_region_recolor_scenario() {
    //! Shirt #FF0000, shorts #00FF0080, socks absent: the shirt ends opaque
    //! red, the shorts translucent green with blending on, and the socks
    //! keep their authored appearance.
    let mut app = material_app();
    let mut materials = app
        .world_mut()
        .resource_mut::<Assets<StandardMaterial>>();
    let fixture = build_slots(&mut materials);

    apply_color(
        &mut materials,
        &fixture.slots,
        "M_Couleur_Shirt",
        Some(color::parse("#FF0000")),
        ROUGHNESS_FLOOR,
    );
    apply_color(
        &mut materials,
        &fixture.slots,
        "M_Couleur_Short",
        Some(color::parse("#00FF0080")),
        ROUGHNESS_FLOOR,
    );
    apply_color(
        &mut materials,
        &fixture.slots,
        "M_Couleur_Socks",
        None,
        ROUGHNESS_FLOOR,
    );

    let shirt = materials.get(&fixture.shirt).expect("shirt material");
    assert_eq!(shirt.base_color, Color::srgba_u8(255, 0, 0, 255));
    assert_eq!(shirt.alpha_mode, AlphaMode::Opaque);
    assert_eq!(shirt.metallic, 0.0);
    assert_eq!(
        shirt.perceptual_roughness, ROUGHNESS_FLOOR,
        "authored roughness below the floor gets clamped up"
    );

    let shorts = materials.get(&fixture.shorts).expect("shorts material");
    let srgba = shorts.base_color.to_srgba();
    assert!((srgba.alpha - 0.502).abs() < 1e-3, "alpha = 0x80 / 255");
    assert!((srgba.green - 1.0).abs() < 1e-6);
    assert!(srgba.red.abs() < 1e-6);
    assert_eq!(shorts.alpha_mode, AlphaMode::Blend);

    let socks = materials.get(&fixture.socks).expect("socks material");
    let authored = authored_material();
    assert_eq!(socks.base_color, authored.base_color);
    assert_eq!(socks.alpha_mode, authored.alpha_mode);
    assert_eq!(socks.perceptual_roughness, authored.perceptual_roughness);
    assert_eq!(socks.metallic, authored.metallic);
}

#[test]
fn test_absent_slot_is_a_no_op() {
    //! Coloring a slot the asset does not expose must not panic and must
    //! leave every existing slot's material untouched.
    let mut app = material_app();
    let mut materials = app
        .world_mut()
        .resource_mut::<Assets<StandardMaterial>>();
    let fixture = build_slots(&mut materials);

    apply_color(
        &mut materials,
        &fixture.slots,
        "M_Couleur_Cap",
        Some(color::parse("#123456")),
        ROUGHNESS_FLOOR,
    );

    let authored = authored_material();
    for handle in [&fixture.shirt, &fixture.shorts, &fixture.socks] {
        let material = materials.get(handle).expect("material");
        assert_eq!(material.base_color, authored.base_color);
        assert_eq!(material.perceptual_roughness, authored.perceptual_roughness);
        assert_eq!(material.metallic, authored.metallic);
        assert_eq!(material.alpha_mode, authored.alpha_mode);
    }
}

#[test]
fn test_recolor_is_idempotent() {
    //! Applying the same (slot, color) pair twice yields the identical
    //! material state.
    let mut app = material_app();
    let mut materials = app
        .world_mut()
        .resource_mut::<Assets<StandardMaterial>>();
    let fixture = build_slots(&mut materials);

    let spec = Some(color::parse("#336699CC"));
    apply_color(
        &mut materials,
        &fixture.slots,
        "M_Couleur_Shirt",
        spec,
        ROUGHNESS_FLOOR,
    );
    let first = materials.get(&fixture.shirt).expect("material").clone();

    apply_color(
        &mut materials,
        &fixture.slots,
        "M_Couleur_Shirt",
        spec,
        ROUGHNESS_FLOOR,
    );
    let second = materials.get(&fixture.shirt).expect("material");

    assert_eq!(first.base_color, second.base_color);
    assert_eq!(first.alpha_mode, second.alpha_mode);
    assert_eq!(first.perceptual_roughness, second.perceptual_roughness);
    assert_eq!(first.metallic, second.metallic);
}

#[test]
fn test_transparency_is_never_auto_reverted() {
    //! A translucent color turns blending on; a later opaque color does not
    //! silently turn it back off.
    let mut app = material_app();
    let mut materials = app
        .world_mut()
        .resource_mut::<Assets<StandardMaterial>>();
    let fixture = build_slots(&mut materials);

    apply_color(
        &mut materials,
        &fixture.slots,
        "M_Couleur_Shirt",
        Some(color::parse("#FF000080")),
        ROUGHNESS_FLOOR,
    );
    assert_eq!(
        materials.get(&fixture.shirt).expect("material").alpha_mode,
        AlphaMode::Blend
    );

    apply_color(
        &mut materials,
        &fixture.slots,
        "M_Couleur_Shirt",
        Some(color::parse("#FF0000")),
        ROUGHNESS_FLOOR,
    );
    assert_eq!(
        materials.get(&fixture.shirt).expect("material").alpha_mode,
        AlphaMode::Blend,
        "blending stays on once enabled"
    );
}

#[test]
fn test_multi_slot_applies_to_every_member() {
    //! A multi-material region recolors all of its references uniformly.
    let mut app = material_app();
    let mut materials = app
        .world_mut()
        .resource_mut::<Assets<StandardMaterial>>();

    let front = materials.add(authored_material());
    let back = materials.add(authored_material());
    let mut slots = HashMap::new();
    slots.insert(
        "M_Couleur_Shirt".to_string(),
        MaterialSlot::Multi(vec![front.clone(), back.clone()]),
    );

    apply_color(
        &mut materials,
        &slots,
        "M_Couleur_Shirt",
        Some(color::parse("#0000FF")),
        ROUGHNESS_FLOOR,
    );

    for handle in [&front, &back] {
        let material = materials.get(handle).expect("material");
        assert_eq!(material.base_color, Color::srgba_u8(0, 0, 255, 255));
        assert_eq!(material.metallic, 0.0);
    }
}

#[test]
fn test_authored_roughness_above_floor_is_kept() {
    //! The floor is a lower bound, not an override: an authored roughness
    //! already above it survives the recolor.
    let mut app = material_app();
    let mut materials = app
        .world_mut()
        .resource_mut::<Assets<StandardMaterial>>();

    let handle = materials.add(StandardMaterial {
        perceptual_roughness: 0.8,
        ..default()
    });
    let mut slots = HashMap::new();
    slots.insert("M_Couleur_Shirt".to_string(), MaterialSlot::Single(handle.clone()));

    apply_color(
        &mut materials,
        &slots,
        "M_Couleur_Shirt",
        Some(color::parse("#FF0000")),
        ROUGHNESS_FLOOR,
    );

    assert_eq!(
        materials.get(&handle).expect("material").perceptual_roughness,
        0.8
    );
}
