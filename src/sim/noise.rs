//! Deterministic value noise and world classification
//!
//! Everything here is a pure function of integer inputs. Spawning and terrain
//! rendering query the same tiles independently and must always agree.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::world_to_tile;

const WET_SEED: u32 = 0x1f12_3bb5;
const WET_DETAIL_SEED: u32 = 0x5eed_0a11;
const TEMP_SEED: u32 = 0x7a3c_91e4;
const TEMP_DETAIL_SEED: u32 = 0x0b5d_c3a7;
const ROAD_SEED: u32 = 0x3c6e_f372;
const PLAZA_SEED: u32 = 0x9e37_79b9;
const WATER_SEED: u32 = 0xa54f_f53a;
const WATER_DETAIL_SEED: u32 = 0x510e_527f;

/// Size of a plaza cell in tiles
const PLAZA_CELL: i32 = 48;

/// Integer hash mix. Shared by noise, loot rolls and the upgrade shuffle.
#[inline]
pub fn mix32(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x7feb_352d);
    h ^= h >> 15;
    h = h.wrapping_mul(0x846c_a68b);
    h ^= h >> 16;
    h
}

/// Hash of a lattice point, in [0, 1)
#[inline]
pub fn hash2d(x: i32, y: i32, seed: u32) -> f32 {
    let h = (x as u32).wrapping_mul(374_761_393)
        ^ (y as u32).wrapping_mul(668_265_263)
        ^ seed.wrapping_mul(2_654_435_761);
    // Top 24 bits are exact in an f32 mantissa
    (mix32(h) >> 8) as f32 / 16_777_216.0
}

/// Hash of an (id, bucket) pair, in [0, 1)
#[inline]
pub fn hash_roll(id: u32, bucket: u32, salt: u32) -> f32 {
    hash2d(id as i32, bucket as i32, salt)
}

#[inline]
fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Smoothed 2D value noise in [0, 1]
pub fn value_noise(x: f32, y: f32, seed: u32) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let tx = smoothstep(x - x0);
    let ty = smoothstep(y - y0);
    let (ix, iy) = (x0 as i32, y0 as i32);

    let n00 = hash2d(ix, iy, seed);
    let n10 = hash2d(ix.wrapping_add(1), iy, seed);
    let n01 = hash2d(ix, iy.wrapping_add(1), seed);
    let n11 = hash2d(ix.wrapping_add(1), iy.wrapping_add(1), seed);

    lerp(lerp(n00, n10, tx), lerp(n01, n11, tx), ty)
}

/// Noise field sampled at a tile, with `scale` tiles per lattice cell
#[inline]
fn field(tile_x: i32, tile_y: i32, scale: f32, seed: u32) -> f32 {
    value_noise(tile_x as f32 / scale, tile_y as f32 / scale, seed)
}

/// Biome of a tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Biome {
    Forest,
    Desert,
    Snow,
}

impl Biome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Biome::Forest => "forest",
            Biome::Desert => "desert",
            Biome::Snow => "snow",
        }
    }
}

/// Wetness field in [0, 1]
pub fn wetness(tile_x: i32, tile_y: i32) -> f32 {
    0.65 * field(tile_x, tile_y, 24.0, WET_SEED) + 0.35 * field(tile_x, tile_y, 9.0, WET_DETAIL_SEED)
}

/// Temperature field in [0, 1], sampled at an offset to decorrelate from wetness
pub fn temperature(tile_x: i32, tile_y: i32) -> f32 {
    let (x, y) = (tile_x.wrapping_add(913), tile_y.wrapping_sub(421));
    0.7 * field(x, y, 30.0, TEMP_SEED) + 0.3 * field(x, y, 11.0, TEMP_DETAIL_SEED)
}

/// Classify the biome of a tile
pub fn sample_biome(tile_x: i32, tile_y: i32) -> Biome {
    let wet = wetness(tile_x, tile_y);
    let temp = temperature(tile_x, tile_y);
    if temp > 0.66 && wet < 0.52 {
        Biome::Desert
    } else if temp < 0.4 {
        Biome::Snow
    } else {
        Biome::Forest
    }
}

/// Water body threshold per biome (higher = drier)
fn water_threshold(biome: Biome) -> f32 {
    match biome {
        Biome::Forest => 0.68,
        Biome::Desert => 0.80,
        Biome::Snow => 0.72,
    }
}

/// Whether a tile is water
pub fn is_water_tile(tile_x: i32, tile_y: i32) -> bool {
    // Spawn area is always dry land
    if tile_x.abs() <= 3 && tile_y.abs() <= 3 {
        return false;
    }
    let body = field(tile_x, tile_y, 18.0, WATER_SEED);
    let detail = field(tile_x, tile_y, 5.0, WATER_DETAIL_SEED);
    body * 0.8 + detail * 0.2 > water_threshold(sample_biome(tile_x, tile_y))
}

/// Whether a tile is part of a road lane or a plaza
pub fn is_road_tile(tile_x: i32, tile_y: i32) -> bool {
    if is_water_tile(tile_x, tile_y) {
        return false;
    }

    // Lanes follow a contour line of a slow noise field
    let lane = field(tile_x, tile_y, 40.0, ROAD_SEED);
    if (lane - 0.5).abs() < 0.018 {
        return true;
    }

    // Plazas: a 5x5 square at the center of some cells
    let cell_x = tile_x.div_euclid(PLAZA_CELL);
    let cell_y = tile_y.div_euclid(PLAZA_CELL);
    if hash2d(cell_x, cell_y, PLAZA_SEED) >= 0.18 {
        return false;
    }
    let local_x = tile_x.rem_euclid(PLAZA_CELL) - PLAZA_CELL / 2;
    let local_y = tile_y.rem_euclid(PLAZA_CELL) - PLAZA_CELL / 2;
    local_x.abs() <= 2 && local_y.abs() <= 2
}

/// Everything the simulation needs to know about the ground under a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Terrain {
    pub biome: Biome,
    pub water: bool,
    pub road: bool,
}

impl Terrain {
    /// Movement multiplier for walkers on this terrain
    pub fn speed_factor(&self) -> f32 {
        if self.water {
            0.6
        } else if self.road {
            1.12
        } else {
            1.0
        }
    }
}

/// Classify the tile under a world position
pub fn terrain_at(pos: Vec2) -> Terrain {
    let (tx, ty) = world_to_tile(pos);
    let water = is_water_tile(tx, ty);
    Terrain {
        biome: sample_biome(tx, ty),
        water,
        road: !water && is_road_tile(tx, ty),
    }
}
