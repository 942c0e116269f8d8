//! Shared meshes and materials, plus the builders that assemble the UFO,
//! rocket and payload models from primitives.
//!
//! Models are built around their sim origin: the rocket base sits at the
//! origin with the nose up local +Y, the saucer is centered on its hull and
//! payloads are centered on their bus.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use bevy::prelude::*;

use crate::config::{
    FAIRING_HEIGHT, INTERSTAGE_HEIGHT, LOWER_STAGE_HEIGHT, NOZZLE_HEIGHT, ROCKET_MAIN_RADIUS,
    UFO_DOME_BASE_RADIUS, UFO_DOME_HEIGHT_FACTOR, UFO_ENGINE_HEIGHT, UFO_ENGINE_RADIUS,
    UFO_FLAME_HEIGHT, UFO_FLAME_RADIUS, UFO_LOWER_TAPER_RADIUS, UFO_MAX_RADIUS, UFO_PILOT_SIZE,
    UFO_RIM_LIGHT_COUNT, UFO_TOTAL_THICKNESS, UFO_UPPER_TAPER_RADIUS, UPPER_STAGE_HEIGHT,
};
use crate::sim::hostile::{DOME_GLOW, HULL_GLOW};

pub const UFO_PILOT_Y: f32 = UFO_TOTAL_THICKNESS * 0.5 + UFO_PILOT_SIZE;
pub const UFO_FLAME_Y: f32 = -UFO_TOTAL_THICKNESS * 0.5 - UFO_ENGINE_HEIGHT - UFO_FLAME_HEIGHT * 0.5;
const UFO_RIM_LIGHT_SIZE: f32 = 0.08;

pub const EXHAUST_RADIUS: f32 = ROCKET_MAIN_RADIUS * 0.8;
pub const EXHAUST_LENGTH: f32 = 1.0;

#[derive(Resource)]
pub struct SceneAssets {
    // ufo
    pub ufo_upper_hull: Handle<Mesh>,
    pub ufo_lower_hull: Handle<Mesh>,
    pub ufo_dome: Handle<Mesh>,
    pub ufo_engine: Handle<Mesh>,
    pub ufo_flame: Handle<Mesh>,
    pub ufo_pilot: Handle<Mesh>,
    pub ufo_rim_light: Handle<Mesh>,
    pub pilot_material: Handle<StandardMaterial>,

    // rocket
    pub nozzle: Handle<Mesh>,
    pub lower_stage: Handle<Mesh>,
    pub interstage: Handle<Mesh>,
    pub upper_stage: Handle<Mesh>,
    pub fairing: Handle<Mesh>,
    pub fin: Handle<Mesh>,
    pub exhaust: Handle<Mesh>,
    pub rocket_body: Handle<StandardMaterial>,
    pub rocket_trim: Handle<StandardMaterial>,

    // effects
    pub missile: Handle<Mesh>,
    pub missile_material: Handle<StandardMaterial>,
    pub fireball: Handle<Mesh>,
    pub spark: Handle<Mesh>,

    // payloads
    pub payload_bus: Handle<Mesh>,
    pub payload_panel: Handle<Mesh>,
    pub payload_antenna: Handle<Mesh>,
    pub payload_material: Handle<StandardMaterial>,
    pub panel_material: Handle<StandardMaterial>,
    pub highlight_material: Handle<StandardMaterial>,
    pub orbit_material: Handle<StandardMaterial>,
}

pub fn setup_scene_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let half_thickness = UFO_TOTAL_THICKNESS * 0.5;

    let assets = SceneAssets {
        ufo_upper_hull: meshes.add(ConicalFrustum {
            radius_top: UFO_MAX_RADIUS * UFO_UPPER_TAPER_RADIUS,
            radius_bottom: UFO_MAX_RADIUS,
            height: half_thickness,
        }),
        ufo_lower_hull: meshes.add(ConicalFrustum {
            radius_top: UFO_MAX_RADIUS,
            radius_bottom: UFO_MAX_RADIUS * UFO_LOWER_TAPER_RADIUS,
            height: half_thickness,
        }),
        ufo_dome: meshes.add(Sphere::new(UFO_DOME_BASE_RADIUS).mesh().uv(32, 16)),
        ufo_engine: meshes.add(Cylinder::new(UFO_ENGINE_RADIUS, UFO_ENGINE_HEIGHT)),
        ufo_flame: meshes.add(Cone {
            radius: UFO_FLAME_RADIUS,
            height: UFO_FLAME_HEIGHT,
        }),
        ufo_pilot: meshes.add(Sphere::new(UFO_PILOT_SIZE).mesh().uv(16, 8)),
        ufo_rim_light: meshes.add(Sphere::new(UFO_RIM_LIGHT_SIZE).mesh().uv(8, 4)),
        pilot_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.3, 0.8, 0.35),
            perceptual_roughness: 0.6,
            ..default()
        }),

        nozzle: meshes.add(ConicalFrustum {
            radius_top: ROCKET_MAIN_RADIUS * 0.6,
            radius_bottom: ROCKET_MAIN_RADIUS * 0.9,
            height: NOZZLE_HEIGHT,
        }),
        lower_stage: meshes.add(Cylinder::new(ROCKET_MAIN_RADIUS, LOWER_STAGE_HEIGHT)),
        interstage: meshes.add(Cylinder::new(ROCKET_MAIN_RADIUS * 0.92, INTERSTAGE_HEIGHT)),
        upper_stage: meshes.add(Cylinder::new(ROCKET_MAIN_RADIUS, UPPER_STAGE_HEIGHT)),
        fairing: meshes.add(Cone {
            radius: ROCKET_MAIN_RADIUS,
            height: FAIRING_HEIGHT,
        }),
        fin: meshes.add(Cuboid::new(0.04, 0.6, 0.35)),
        exhaust: meshes.add(Cone {
            radius: EXHAUST_RADIUS,
            height: EXHAUST_LENGTH,
        }),
        rocket_body: materials.add(StandardMaterial {
            base_color: Color::srgb(0.92, 0.92, 0.95),
            metallic: 0.3,
            perceptual_roughness: 0.4,
            ..default()
        }),
        rocket_trim: materials.add(StandardMaterial {
            base_color: Color::srgb(0.15, 0.15, 0.18),
            metallic: 0.6,
            perceptual_roughness: 0.5,
            ..default()
        }),

        missile: meshes.add(Capsule3d::new(0.06, 0.4)),
        missile_material: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.6, 0.2),
            emissive: LinearRgba::rgb(1.0, 0.45, 0.1) * 6.0,
            unlit: true,
            ..default()
        }),
        fireball: meshes.add(Sphere::new(1.0).mesh().uv(32, 16)),
        spark: meshes.add(Sphere::new(0.05).mesh().uv(6, 3)),

        payload_bus: meshes.add(Cuboid::new(0.3, 0.3, 0.3)),
        payload_panel: meshes.add(Cuboid::new(0.7, 0.02, 0.25)),
        payload_antenna: meshes.add(Cylinder::new(0.02, 0.25)),
        payload_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.85, 0.7, 0.3),
            metallic: 0.8,
            perceptual_roughness: 0.3,
            ..default()
        }),
        panel_material: materials.add(StandardMaterial {
            base_color: Color::srgb(0.1, 0.2, 0.55),
            metallic: 0.5,
            perceptual_roughness: 0.3,
            ..default()
        }),
        highlight_material: materials.add(StandardMaterial {
            base_color: Color::srgb(1.0, 0.84, 0.0),
            emissive: LinearRgba::rgb(1.0, 0.84, 0.0) * 2.0,
            ..default()
        }),
        orbit_material: materials.add(StandardMaterial {
            base_color: Color::srgba(1.0, 1.0, 1.0, 0.15),
            alpha_mode: AlphaMode::Blend,
            unlit: true, // glowing effect
            ..default()
        }),
    };

    commands.insert_resource(assets);
}

pub fn glow(color: Vec3, intensity: f32) -> LinearRgba {
    LinearRgba::from(Color::srgb(color.x, color.y, color.z)) * intensity
}

// per-instance materials for parts whose glow is animated
pub struct UfoParts {
    pub hull: Handle<StandardMaterial>,
    pub dome: Handle<StandardMaterial>,
    pub engine: Handle<StandardMaterial>,
    pub flame: Handle<StandardMaterial>,
    pub rim: Vec<Handle<StandardMaterial>>,
    pub flame_entity: Entity,
    pub pilot_entity: Entity,
    pub flame_light: Entity,
    pub cabin_light: Entity,
}

pub fn spawn_ufo(
    commands: &mut Commands,
    assets: &SceneAssets,
    materials: &mut Assets<StandardMaterial>,
    root: Entity,
) -> UfoParts {
    let half_thickness = UFO_TOTAL_THICKNESS * 0.5;

    let hull = materials.add(StandardMaterial {
        base_color: Color::srgb(0.55, 0.55, 0.62),
        metallic: 0.9,
        perceptual_roughness: 0.25,
        emissive: glow(HULL_GLOW, 0.35),
        ..default()
    });
    let dome = materials.add(StandardMaterial {
        base_color: Color::srgba(0.6, 0.5, 0.9, 0.45),
        alpha_mode: AlphaMode::Blend,
        emissive: glow(DOME_GLOW, 0.5),
        ..default()
    });
    let engine = materials.add(StandardMaterial {
        base_color: Color::srgb(0.2, 0.2, 0.25),
        emissive: glow(Vec3::new(0.3, 0.9, 1.0), 2.5),
        ..default()
    });
    let flame = materials.add(StandardMaterial {
        base_color: Color::srgba(0.4, 0.9, 1.0, 0.8),
        alpha_mode: AlphaMode::Add,
        emissive: glow(Vec3::new(0.4, 0.9, 1.0), 2.5),
        unlit: true,
        ..default()
    });

    let mut part = |mesh: &Handle<Mesh>, material: &Handle<StandardMaterial>, transform: Transform| {
        commands
            .spawn((
                Mesh3d(mesh.clone()),
                MeshMaterial3d(material.clone()),
                transform,
                ChildOf(root),
            ))
            .id()
    };

    part(&assets.ufo_upper_hull, &hull, Transform::from_xyz(0.0, half_thickness * 0.5, 0.0));
    part(&assets.ufo_lower_hull, &hull, Transform::from_xyz(0.0, -half_thickness * 0.5, 0.0));
    part(
        &assets.ufo_dome,
        &dome,
        Transform::from_xyz(0.0, half_thickness, 0.0)
            .with_scale(Vec3::new(1.0, UFO_DOME_HEIGHT_FACTOR, 1.0)),
    );
    part(
        &assets.ufo_engine,
        &engine,
        Transform::from_xyz(0.0, -half_thickness - UFO_ENGINE_HEIGHT * 0.5, 0.0),
    );
    // cone tip points down, away from the hull
    let flame_entity = part(
        &assets.ufo_flame,
        &flame,
        Transform::from_xyz(0.0, UFO_FLAME_Y, 0.0).with_rotation(Quat::from_rotation_x(PI)),
    );
    let pilot_entity = part(
        &assets.ufo_pilot,
        &assets.pilot_material,
        Transform::from_xyz(0.0, UFO_PILOT_Y, 0.0),
    );

    let rim: Vec<Handle<StandardMaterial>> = (0..UFO_RIM_LIGHT_COUNT)
        .map(|i| {
            let hue = i as f32 / UFO_RIM_LIGHT_COUNT as f32;
            let color = Vec3::new(0.6 + 0.4 * (hue * TAU).sin(), 0.3, 1.0);
            materials.add(StandardMaterial {
                base_color: Color::srgb(color.x, color.y, color.z),
                emissive: glow(color, 3.5),
                unlit: true,
                ..default()
            })
        })
        .collect();
    for (i, material) in rim.iter().enumerate() {
        let angle = i as f32 / UFO_RIM_LIGHT_COUNT as f32 * TAU;
        let position = Vec3::new(angle.cos() * UFO_MAX_RADIUS, 0.0, angle.sin() * UFO_MAX_RADIUS);
        part(&assets.ufo_rim_light, material, Transform::from_translation(position));
    }

    let cabin_light = commands
        .spawn((
            PointLight {
                color: Color::srgb(0.7, 0.6, 1.0),
                intensity: 0.0,
                range: 6.0,
                ..default()
            },
            Transform::from_xyz(0.0, UFO_PILOT_Y, 0.0),
            ChildOf(root),
        ))
        .id();
    let flame_light = commands
        .spawn((
            PointLight {
                color: Color::srgb(0.4, 0.9, 1.0),
                intensity: 0.0,
                range: 8.0,
                ..default()
            },
            Transform::from_xyz(0.0, UFO_FLAME_Y, 0.0),
            ChildOf(root),
        ))
        .id();

    UfoParts {
        hull,
        dome,
        engine,
        flame,
        rim,
        flame_entity,
        pilot_entity,
        flame_light,
        cabin_light,
    }
}

/// Rocket parts stacked from the base. Returns the exhaust plume entity and
/// its material.
pub fn spawn_rocket(
    commands: &mut Commands,
    assets: &SceneAssets,
    materials: &mut Assets<StandardMaterial>,
    root: Entity,
) -> (Entity, Handle<StandardMaterial>) {
    let mut y = 0.0;
    let mut stack = |commands: &mut Commands, mesh: &Handle<Mesh>, material: &Handle<StandardMaterial>, height: f32| {
        commands.spawn((
            Mesh3d(mesh.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_xyz(0.0, y + height * 0.5, 0.0),
            ChildOf(root),
        ));
        y += height;
    };

    stack(commands, &assets.nozzle, &assets.rocket_trim, NOZZLE_HEIGHT);
    stack(commands, &assets.lower_stage, &assets.rocket_body, LOWER_STAGE_HEIGHT);
    stack(commands, &assets.interstage, &assets.rocket_trim, INTERSTAGE_HEIGHT);
    stack(commands, &assets.upper_stage, &assets.rocket_body, UPPER_STAGE_HEIGHT);
    stack(commands, &assets.fairing, &assets.rocket_body, FAIRING_HEIGHT);

    for i in 0..4 {
        let angle = i as f32 * TAU / 4.0;
        let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * (ROCKET_MAIN_RADIUS + 0.15);
        commands.spawn((
            Mesh3d(assets.fin.clone()),
            MeshMaterial3d(assets.rocket_trim.clone()),
            Transform::from_translation(offset + Vec3::Y * (NOZZLE_HEIGHT + 0.3))
                .with_rotation(Quat::from_rotation_y(FRAC_PI_2 - angle)),
            ChildOf(root),
        ));
    }

    let exhaust_material = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 0.55, 0.15, 0.85),
        alpha_mode: AlphaMode::Add,
        emissive: LinearRgba::rgb(1.0, 0.5, 0.1) * 3.0,
        unlit: true,
        ..default()
    });
    let exhaust = commands
        .spawn((
            Mesh3d(assets.exhaust.clone()),
            MeshMaterial3d(exhaust_material.clone()),
            exhaust_transform(1.0),
            Visibility::Hidden,
            ChildOf(root),
        ))
        .id();

    (exhaust, exhaust_material)
}

// plume hangs below the nozzle, tip pointing away from the rocket
pub fn exhaust_transform(length: f32) -> Transform {
    Transform::from_xyz(0.0, -EXHAUST_LENGTH * length * 0.5, 0.0)
        .with_rotation(Quat::from_rotation_x(PI))
        .with_scale(Vec3::new(1.0, length, 1.0))
}

/// Returns the meshes that swap to the highlight material.
pub fn spawn_payload(commands: &mut Commands, assets: &SceneAssets, root: Entity) -> Vec<Entity> {
    let bus = commands
        .spawn((
            Mesh3d(assets.payload_bus.clone()),
            MeshMaterial3d(assets.payload_material.clone()),
            Transform::default(),
            ChildOf(root),
        ))
        .id();

    for side in [-1.0, 1.0] {
        commands.spawn((
            Mesh3d(assets.payload_panel.clone()),
            MeshMaterial3d(assets.panel_material.clone()),
            Transform::from_xyz(side * 0.5, 0.0, 0.0),
            ChildOf(root),
        ));
    }

    // antenna faces the body (local +Y)
    commands.spawn((
        Mesh3d(assets.payload_antenna.clone()),
        MeshMaterial3d(assets.rocket_trim.clone()),
        Transform::from_xyz(0.0, 0.275, 0.0),
        ChildOf(root),
    ));

    vec![bus]
}

// create line mesh from a series of points
// wraps around
pub fn create_trail_mesh(points: &[Vec3]) -> Mesh {
    let positions: Vec<[f32; 3]> = points.iter().map(|p| [p.x, p.y, p.z]).collect();

    // create line segments
    let mut indices = Vec::with_capacity(points.len() * 2);
    for i in 0..points.len() {
        let next_i = (i + 1) % points.len(); // wrap
        indices.push(i as u32);
        indices.push(next_i as u32);
    }

    let mut mesh = Mesh::new(
        bevy::render::render_resource::PrimitiveTopology::LineList,
        bevy::render::render_asset::RenderAssetUsages::default(),
    );
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    mesh.insert_indices(bevy::render::mesh::Indices::U32(indices));

    mesh
}
