//! Texture provider for the body shells.
//!
//! `TextureSource::Files` loads images through the asset server.
//! `TextureSource::Procedural` paints equirectangular maps from seeded Perlin
//! noise so the scene runs without any files on disk.

use std::f32::consts::{PI, TAU};

use bevy::prelude::*;
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use image::{Rgba, RgbaImage};
use noise::{NoiseFn, Perlin};

use crate::config::TextureSource;

pub const MAP_WIDTH: u32 = 512;
pub const MAP_HEIGHT: u32 = 256;

const SEA_LEVEL: f32 = 0.5;
const ICE_LATITUDE: f32 = 1.2;

#[derive(Debug, Clone)]
pub struct BodyTextures {
    pub day: Handle<Image>,
    pub normal: Option<Handle<Image>>,
    pub clouds: Handle<Image>,
    pub night: Handle<Image>,
}

pub fn load_body_textures(
    source: &TextureSource,
    asset_server: &AssetServer,
    images: &mut Assets<Image>,
) -> BodyTextures {
    match source {
        TextureSource::Files { day, normal, clouds, night } => {
            info!("Loading body textures from {}", day);
            BodyTextures {
                day: asset_server.load(day.clone()),
                normal: normal.as_ref().map(|path| asset_server.load(path.clone())),
                clouds: asset_server.load(clouds.clone()),
                night: asset_server.load(night.clone()),
            }
        }
        TextureSource::Procedural { seed } => {
            info!("Painting procedural body textures (seed {})", seed);
            let maps = ProceduralMaps::paint(*seed);
            BodyTextures {
                day: images.add(to_image(maps.day)),
                normal: None,
                clouds: images.add(to_image(maps.clouds)),
                night: images.add(to_image(maps.night)),
            }
        }
    }
}

fn to_image(map: RgbaImage) -> Image {
    let (width, height) = map.dimensions();
    Image::new(
        Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        map.into_raw(),
        TextureFormat::Rgba8UnormSrgb,
        RenderAssetUsages::RENDER_WORLD,
    )
}

pub struct ProceduralMaps {
    pub day: RgbaImage,
    pub night: RgbaImage,
    pub clouds: RgbaImage,
}

impl ProceduralMaps {
    pub fn paint(seed: u32) -> Self {
        let terrain = Fbm::new(seed, 5);
        let cities = Fbm::new(seed.wrapping_add(1), 3);
        let cover = Fbm::new(seed.wrapping_add(2), 5);
        let elevation = |p: Vec3| terrain.sample(p * 2.5);

        let day = RgbaImage::from_fn(MAP_WIDTH, MAP_HEIGHT, |x, y| {
            let (p, latitude) = sphere_point(x, y);
            day_color(elevation(p), latitude)
        });

        let night = RgbaImage::from_fn(MAP_WIDTH, MAP_HEIGHT, |x, y| {
            let (p, _) = sphere_point(x, y);
            if elevation(p) < SEA_LEVEL {
                return Rgba([0, 0, 0, 255]);
            }
            // sparse clusters of city light
            let glow = ((cities.sample(p * 18.0) - 0.62) / 0.15).clamp(0.0, 1.0);
            Rgba([(255.0 * glow) as u8, (200.0 * glow) as u8, (120.0 * glow) as u8, 255])
        });

        let clouds = RgbaImage::from_fn(MAP_WIDTH, MAP_HEIGHT, |x, y| {
            let (p, _) = sphere_point(x, y);
            let v = (((cover.sample(p * 4.0) - 0.45) / 0.3).clamp(0.0, 1.0) * 255.0) as u8;
            Rgba([v, v, v, 255])
        });

        Self { day, night, clouds }
    }
}

// unit sphere point for an equirectangular pixel, plus its latitude
fn sphere_point(x: u32, y: u32) -> (Vec3, f32) {
    let longitude = (x as f32 + 0.5) / MAP_WIDTH as f32 * TAU;
    let latitude = (0.5 - (y as f32 + 0.5) / MAP_HEIGHT as f32) * PI;
    let p = Vec3::new(
        latitude.cos() * longitude.cos(),
        latitude.sin(),
        latitude.cos() * longitude.sin(),
    );
    (p, latitude)
}

fn day_color(height: f32, latitude: f32) -> Rgba<u8> {
    if latitude.abs() > ICE_LATITUDE {
        return Rgba([235, 240, 245, 255]);
    }
    if height < SEA_LEVEL {
        let depth = ((SEA_LEVEL - height) / SEA_LEVEL).clamp(0.0, 1.0);
        let shallow = Vec3::new(40.0, 90.0, 160.0);
        let deep = Vec3::new(8.0, 24.0, 70.0);
        return rgba(shallow.lerp(deep, depth.sqrt()));
    }
    let rise = ((height - SEA_LEVEL) / (1.0 - SEA_LEVEL)).clamp(0.0, 1.0);
    let lowland = Vec3::new(60.0, 110.0, 50.0);
    let highland = Vec3::new(130.0, 105.0, 70.0);
    rgba(lowland.lerp(highland, rise))
}

fn rgba(c: Vec3) -> Rgba<u8> {
    Rgba([c.x as u8, c.y as u8, c.z as u8, 255])
}

/// Fractal sum of Perlin octaves, normalized to [0, 1].
pub struct Fbm {
    perlin: Perlin,
    octaves: u32,
}

impl Fbm {
    pub fn new(seed: u32, octaves: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
            octaves,
        }
    }

    pub fn sample(&self, p: Vec3) -> f32 {
        let mut value = 0.0;
        let mut total = 0.0;
        let mut amplitude = 0.5;
        let mut frequency = 1.0;

        for _ in 0..self.octaves {
            let q = [p.x as f64 * frequency, p.y as f64 * frequency, p.z as f64 * frequency];
            value += amplitude * (self.perlin.get(q) * 0.5 + 0.5);
            total += amplitude;
            amplitude *= 0.5;
            frequency *= 2.0;
        }

        (value / total).clamp(0.0, 1.0) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_paints_the_same_maps() {
        let a = ProceduralMaps::paint(3);
        let b = ProceduralMaps::paint(3);
        assert_eq!(a.day.as_raw(), b.day.as_raw());
        assert_eq!(a.clouds.dimensions(), (MAP_WIDTH, MAP_HEIGHT));

        let c = ProceduralMaps::paint(4);
        assert_ne!(a.day.as_raw(), c.day.as_raw());
    }

    #[test]
    fn noise_stays_normalized() {
        let fbm = Fbm::new(9, 5);
        for i in 0..500 {
            let p = Vec3::new(i as f32 * 0.37, i as f32 * -0.21, i as f32 * 0.05);
            let v = fbm.sample(p);
            assert!((0.0..=1.0).contains(&v));
        }
    }

    #[test]
    fn has_both_land_and_sea() {
        let maps = ProceduralMaps::paint(7);
        let night_lit = maps.night.pixels().filter(|p| p.0[0] > 0).count();
        let blue = maps
            .day
            .pixels()
            .filter(|p| p.0[2] > p.0[1] && p.0[2] > p.0[0])
            .count();
        let total = (MAP_WIDTH * MAP_HEIGHT) as usize;
        assert!(blue > total / 10 && blue < total * 9 / 10, "sea pixels {blue}");
        assert!(night_lit < total / 2);
    }
}
