//! Introspection payloads for tests and tooling
//!
//! Bounded so a snapshot stays readable however crowded the world gets:
//! only the entities nearest the player are listed per category.

use glam::Vec2;
use serde::Serialize;

use crate::dist_sq;
use crate::highscores::LeaderboardEntry;
use crate::sim::state::{GamePhase, GameState, PlayerState};
use crate::sim::terrain_at;

pub const MAX_ENEMIES_LISTED: usize = 16;
pub const MAX_PROJECTILES_LISTED: usize = 16;
pub const MAX_GEMS_LISTED: usize = 12;
pub const MAX_SUPPLIES_LISTED: usize = 6;
pub const LEADERBOARD_LISTED: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerSummary {
    pub pos: [f32; 2],
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub exp: u32,
    pub exp_next: u32,
    pub attack: f32,
    pub armor: f32,
    pub attack_interval: f32,
    pub move_speed: f32,
    pub pierce: u32,
    pub pickup_radius: f32,
    pub weapon_tier: u8,
    pub armor_tier: u8,
    pub orbit_level: u8,
    pub nova_level: u8,
    pub split_level: u8,
    pub kills: u32,
}

impl From<&PlayerState> for PlayerSummary {
    fn from(p: &PlayerState) -> Self {
        Self {
            pos: p.pos.to_array(),
            hp: p.hp,
            max_hp: p.max_hp,
            level: p.level,
            exp: p.exp,
            exp_next: p.exp_next,
            attack: p.attack,
            armor: p.armor,
            attack_interval: p.attack_interval,
            move_speed: p.move_speed,
            pierce: p.pierce,
            pickup_radius: p.pickup_radius,
            weapon_tier: p.weapon_tier,
            armor_tier: p.armor_tier,
            orbit_level: p.orbit_level,
            nova_level: p.nova_level,
            split_level: p.split_level,
            kills: p.kills,
        }
    }
}

/// One listed entity
#[derive(Debug, Clone, Serialize)]
pub struct EntitySummary {
    pub id: u32,
    pub kind: String,
    pub pos: [f32; 2],
    pub distance: f32,
    /// Remaining hp (enemies), ttl (others)
    pub value: f32,
}

/// Total live entities per category
#[derive(Debug, Clone, Serialize)]
pub struct Counts {
    pub enemies: usize,
    pub projectiles: usize,
    pub gems: usize,
    pub supplies: usize,
    pub effects: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DebugSnapshot {
    pub seed: u64,
    pub tick: u64,
    pub elapsed: f32,
    pub phase: String,
    pub choices: Vec<String>,
    pub difficulty: f32,
    pub biome: String,
    pub score: u64,
    pub best_score: u64,
    pub player: PlayerSummary,
    pub counts: Counts,
    pub enemies: Vec<EntitySummary>,
    pub projectiles: Vec<EntitySummary>,
    pub gems: Vec<EntitySummary>,
    pub supplies: Vec<EntitySummary>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl DebugSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Closest `max` items to `origin`, ties broken by id
fn nearest<T>(
    items: &[T],
    origin: Vec2,
    max: usize,
    describe: impl Fn(&T) -> (u32, String, Vec2, f32),
) -> Vec<EntitySummary> {
    let mut listed: Vec<(f32, EntitySummary)> = items
        .iter()
        .map(|item| {
            let (id, kind, pos, value) = describe(item);
            let d2 = dist_sq(pos, origin);
            (
                d2,
                EntitySummary {
                    id,
                    kind,
                    pos: pos.to_array(),
                    distance: d2.sqrt(),
                    value,
                },
            )
        })
        .collect();
    listed.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.id.cmp(&b.1.id)));
    listed.truncate(max);
    listed.into_iter().map(|(_, s)| s).collect()
}

pub fn snapshot(state: &GameState) -> DebugSnapshot {
    let world = &state.world;
    let origin = world.player.pos;

    let phase = match &state.phase {
        GamePhase::Running => "running",
        GamePhase::AwaitingUpgrade { .. } => "awaiting_upgrade",
        GamePhase::GameOver => "game_over",
    };

    DebugSnapshot {
        seed: state.seed,
        tick: state.time_ticks,
        elapsed: state.elapsed,
        phase: phase.to_string(),
        choices: state
            .phase
            .choices()
            .iter()
            .map(|c| c.title.en.clone())
            .collect(),
        difficulty: state.difficulty,
        biome: terrain_at(origin).biome.as_str().to_string(),
        score: state.score,
        best_score: state.best_score,
        player: PlayerSummary::from(&world.player),
        counts: Counts {
            enemies: world.enemies.len(),
            projectiles: world.projectiles.len(),
            gems: world.gems.len(),
            supplies: world.supplies.len(),
            effects: world.effects.len(),
        },
        enemies: nearest(&world.enemies, origin, MAX_ENEMIES_LISTED, |e| {
            (e.id, format!("{:?}", e.kind), e.pos, e.hp)
        }),
        projectiles: nearest(&world.projectiles, origin, MAX_PROJECTILES_LISTED, |p| {
            (p.id, format!("{:?}", p.style), p.pos, p.ttl)
        }),
        gems: nearest(&world.gems, origin, MAX_GEMS_LISTED, |g| {
            (g.id, format!("gem x{}", g.exp), g.pos, g.ttl)
        }),
        supplies: nearest(&world.supplies, origin, MAX_SUPPLIES_LISTED, |s| {
            (s.id, format!("{:?}", s.kind), s.pos, s.ttl)
        }),
        leaderboard: state.leaderboard.top(LEADERBOARD_LISTED).to_vec(),
    }
}
