use bevy::prelude::*;
use bevy::render::render_resource::Face;

use crate::sim::body::ShellLayer;
use crate::systems::earth::textures::BodyTextures;

const NIGHT_OPACITY: f32 = 0.7;
const CLOUD_OPACITY: f32 = 0.3;
const INNER_GLOW_OPACITY: f32 = 0.25;
const OUTER_GLOW_OPACITY: f32 = 0.12;

// material for one body shell
pub fn shell_material(layer: ShellLayer, textures: &BodyTextures) -> StandardMaterial {
    match layer {
        ShellLayer::Surface => StandardMaterial {
            base_color_texture: Some(textures.day.clone()),
            normal_map_texture: textures.normal.clone(),
            metallic: 0.0,
            perceptual_roughness: 0.8,
            ..default()
        },
        // city lights, added on top of the day side
        ShellLayer::NightLights => StandardMaterial {
            base_color: Color::srgba(1.0, 1.0, 1.0, NIGHT_OPACITY),
            base_color_texture: Some(textures.night.clone()),
            alpha_mode: AlphaMode::Add,
            unlit: true,
            ..default()
        },
        ShellLayer::Clouds => StandardMaterial {
            base_color: Color::srgba(1.0, 1.0, 1.0, CLOUD_OPACITY),
            base_color_texture: Some(textures.clouds.clone()),
            alpha_mode: AlphaMode::Add,
            perceptual_roughness: 1.0,
            ..default()
        },
        // glows render back faces only so they read as a halo around the rim
        ShellLayer::InnerGlow => glow(Srgba::rgb_u8(0x8b, 0xbd, 0xff), INNER_GLOW_OPACITY),
        ShellLayer::OuterGlow => glow(Srgba::rgb_u8(0xad, 0xd8, 0xe6), OUTER_GLOW_OPACITY),
    }
}

fn glow(color: Srgba, opacity: f32) -> StandardMaterial {
    StandardMaterial {
        base_color: color.with_alpha(opacity).into(),
        alpha_mode: AlphaMode::Add,
        cull_mode: Some(Face::Front),
        unlit: true,
        ..default()
    }
}
