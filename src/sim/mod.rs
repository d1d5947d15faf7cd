//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG and integer hashing only
//! - Stable iteration order (by entity ID)
//! - No rendering, storage or platform dependencies

pub mod collision;
pub mod combat;
pub mod noise;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod tick;

pub use noise::{Biome, Terrain, is_road_tile, is_water_tile, sample_biome, terrain_at};
pub use progression::{UpgradeChoice, UpgradeKind};
pub use state::{
    EffectKind, Enemy, EnemyKind, EntityRegistry, GameEvent, GamePhase, GameState, Gem,
    PlayerState, Projectile, Supply, SupplyKind,
};
pub use tick::{TickInput, autopilot_direction, finish_run, tick};
