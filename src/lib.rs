//! Wildland Survivor - simulation core of the arcade mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world sampling, spawning, combat, progression)
//! - `session`: Fixed-step frame loop, autosave and run lifecycle
//! - `highscores`: Sorted, bounded leaderboard
//! - `persistence`: Save/load with field-by-field sanitization
//! - `platform`: Input snapshot handed over by the host
//! - `debug`: Introspection payloads for tests and tooling
//! - `web`: Browser bindings (wasm32 only)

pub mod debug;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod session;
pub mod settings;
pub mod sim;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::{Leaderboard, LeaderboardEntry};
pub use session::Session;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Largest wall-clock delta accepted per frame callback
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// World tile edge length in world units
    pub const TILE_SIZE: f32 = 32.0;

    /// Player collision radius
    pub const PLAYER_RADIUS: f32 = 14.0;
    /// Auto-fire acquisition range
    pub const TARGET_RANGE: f32 = 420.0;
    /// Enemies farther than this from the player are removed
    pub const DESPAWN_RADIUS: f32 = 1400.0;
    /// Spawn ring around the player
    pub const SPAWN_RING_MIN: f32 = 640.0;
    pub const SPAWN_RING_MAX: f32 = 760.0;

    /// Seconds between contact hits from the same enemy
    pub const CONTACT_COOLDOWN: f32 = 0.7;
    /// Fraction of armor subtracted from incoming contact damage
    pub const ARMOR_FACTOR: f32 = 0.6;

    /// Difficulty coefficient growth per second and cap
    pub const DIFFICULTY_GROWTH: f32 = 1.0 / 400.0;
    pub const DIFFICULTY_MAX: f32 = 3.0;

    /// Survival milestone period (seconds)
    pub const MILESTONE_SECS: f32 = 60.0;

    /// Number of selectable avatars
    pub const AVATAR_COUNT: u8 = 4;
}

/// Squared distance between two points
#[inline]
pub fn dist_sq(a: Vec2, b: Vec2) -> f32 {
    (a - b).length_squared()
}

/// Circle-circle overlap test (touching counts as overlap)
#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    dist_sq(a, b) <= r * r
}

/// Convert a world position to its integer tile coordinate
#[inline]
pub fn world_to_tile(pos: Vec2) -> (i32, i32) {
    let t = consts::TILE_SIZE;
    ((pos.x / t).floor() as i32, (pos.y / t).floor() as i32)
}

/// Unit vector for an angle in radians
#[inline]
pub fn angle_to_dir(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Browser logging hookup (wasm32 only)
#[cfg(target_arch = "wasm32")]
pub fn init_wasm_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
}
