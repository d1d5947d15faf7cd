//! Versioned run snapshot
//!
//! Live entities are not persisted: a restored run resumes with the player,
//! timers, score counters and leaderboard, and the world refills around it.
//! Loading never fails. Every field is read on its own and falls back to its
//! default when missing or malformed.

use glam::Vec2;
use serde::Serialize;
use serde_json::Value;

use super::sanitize::{self, Object};
use crate::consts::{AVATAR_COUNT, DIFFICULTY_MAX};
use crate::highscores::Leaderboard;
use crate::sim::progression::{UpgradeChoice, UpgradeKind};
use crate::sim::state::{GamePhase, GameState, PlayerState, RngState};

/// Current save format
pub const SAVE_VERSION: u32 = 1;

/// Snapshot of a run between ticks. Read back only through `from_json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSaveData {
    pub version: u32,
    pub seed: u64,
    pub avatar: u8,
    pub account: String,
    pub player: PlayerState,
    pub elapsed: f32,
    pub difficulty: f32,
    pub best_score: u64,
    pub boss_kills: u32,
    pub bonus_score: u64,
    pub milestones: u32,
    pub last_elite_wave: u32,
    pub last_boss_wave: u32,
    pub rng_draws: u64,
    /// Options of a level-up that was still open
    pub pending: Vec<UpgradeKind>,
    pub game_over: bool,
    pub submitted: bool,
    pub leaderboard: Leaderboard,
}

impl RunSaveData {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            version: SAVE_VERSION,
            seed: state.seed,
            avatar: state.avatar,
            account: state.account.clone(),
            player: state.world.player.clone(),
            elapsed: state.elapsed,
            difficulty: state.difficulty,
            best_score: state.best_score,
            boss_kills: state.boss_kills,
            bonus_score: state.bonus_score,
            milestones: state.milestones,
            last_elite_wave: state.spawner.last_elite_wave,
            last_boss_wave: state.spawner.last_boss_wave,
            rng_draws: state.rng.draws,
            pending: state.phase.choices().iter().map(|c| c.kind).collect(),
            game_over: state.is_game_over(),
            submitted: state.submitted,
            leaderboard: state.leaderboard.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse untrusted text. Unreadable or non-object roots give None.
    pub fn from_json(text: &str) -> Option<Self> {
        let value: Value = match serde_json::from_str(text) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Run save unreadable: {}", e);
                return None;
            }
        };
        let Some(obj) = value.as_object() else {
            log::warn!("Run save root is not an object");
            return None;
        };
        Self::from_object(obj)
    }

    fn from_object(obj: &Object) -> Option<Self> {
        let version = sanitize::u32_or(obj, "version", SAVE_VERSION);
        if version > SAVE_VERSION {
            log::warn!("Run save version {} is newer than {}", version, SAVE_VERSION);
            return None;
        }

        let player = match obj.get("player") {
            Some(Value::Object(p)) => player_from_object(p),
            _ => PlayerState::default(),
        };
        let pending = match obj.get("pending") {
            Some(value @ Value::Array(_)) => {
                serde_json::from_value::<Vec<UpgradeKind>>(value.clone()).unwrap_or_default()
            }
            _ => Vec::new(),
        };
        let leaderboard = obj
            .get("leaderboard")
            .map(Leaderboard::from_value)
            .unwrap_or_default();

        Some(Self {
            version: SAVE_VERSION,
            seed: sanitize::uint_or(obj, "seed", 1, u64::MAX),
            avatar: sanitize::u8_or(obj, "avatar", 0).min(AVATAR_COUNT - 1),
            account: sanitize::string(obj, "account")
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "guest".to_string()),
            player,
            elapsed: sanitize::f32_or(obj, "elapsed", 0.0).max(0.0),
            difficulty: sanitize::f32_or(obj, "difficulty", 1.0).clamp(1.0, DIFFICULTY_MAX),
            best_score: sanitize::uint_or(obj, "best_score", 0, u64::MAX),
            boss_kills: sanitize::u32_or(obj, "boss_kills", 0),
            bonus_score: sanitize::uint_or(obj, "bonus_score", 0, u64::MAX),
            milestones: sanitize::u32_or(obj, "milestones", 0),
            last_elite_wave: sanitize::u32_or(obj, "last_elite_wave", 0),
            last_boss_wave: sanitize::u32_or(obj, "last_boss_wave", 0),
            rng_draws: sanitize::uint_or(obj, "rng_draws", 0, u64::MAX),
            pending,
            game_over: sanitize::bool_or(obj, "game_over", false),
            submitted: sanitize::bool_or(obj, "submitted", false),
            leaderboard,
        })
    }

    /// Rebuild a game state. A finished run comes back as a fresh run that
    /// keeps the cross-run data.
    pub fn restore(self) -> GameState {
        let mut state = GameState::new(self.seed);
        state.avatar = self.avatar.min(AVATAR_COUNT - 1);
        state.account = self.account;
        state.leaderboard = self.leaderboard;
        state.best_score = self
            .best_score
            .max(state.leaderboard.top_score().unwrap_or(0));

        if self.game_over {
            state.reset();
            state.take_events();
            return state;
        }

        let mut player = self.player;
        player.clamp();
        state.world.player = player;
        state.elapsed = self.elapsed;
        state.difficulty = self.difficulty;
        state.boss_kills = self.boss_kills;
        state.bonus_score = self.bonus_score;
        state.milestones = self.milestones;
        state.submitted = self.submitted;
        state.spawner.last_elite_wave = self.last_elite_wave;
        state.spawner.last_boss_wave = self.last_boss_wave;
        state.rng = RngState {
            seed: self.seed,
            draws: self.rng_draws,
        };

        let choices: Vec<UpgradeChoice> = self.pending.into_iter().map(UpgradeChoice::from).collect();
        if !choices.is_empty() {
            state.phase = GamePhase::AwaitingUpgrade { choices };
        }
        state.score = state.compute_score();
        state
    }
}

/// Read a player field by field, then clamp into documented ranges
fn player_from_object(obj: &Object) -> PlayerState {
    let d = PlayerState::default();
    let max_hp = sanitize::f32_or(obj, "max_hp", d.max_hp);
    let mut p = PlayerState {
        pos: sanitize::vec2_or(obj, "pos", d.pos),
        vel: Vec2::ZERO,
        facing: sanitize::vec2_or(obj, "facing", d.facing),
        hp: sanitize::f32_or(obj, "hp", max_hp),
        max_hp,
        level: sanitize::u32_or(obj, "level", d.level),
        exp: sanitize::u32_or(obj, "exp", d.exp),
        exp_next: d.exp_next,
        move_speed: sanitize::f32_or(obj, "move_speed", d.move_speed),
        attack: sanitize::f32_or(obj, "attack", d.attack),
        armor: sanitize::f32_or(obj, "armor", d.armor),
        attack_timer: sanitize::f32_or(obj, "attack_timer", d.attack_timer),
        attack_interval: sanitize::f32_or(obj, "attack_interval", d.attack_interval),
        projectile_speed: sanitize::f32_or(obj, "projectile_speed", d.projectile_speed),
        pierce: sanitize::u32_or(obj, "pierce", d.pierce),
        pickup_radius: sanitize::f32_or(obj, "pickup_radius", d.pickup_radius),
        weapon_tier: sanitize::u8_or(obj, "weapon_tier", d.weapon_tier),
        armor_tier: sanitize::u8_or(obj, "armor_tier", d.armor_tier),
        orbit_level: sanitize::u8_or(obj, "orbit_level", d.orbit_level),
        nova_level: sanitize::u8_or(obj, "nova_level", d.nova_level),
        split_level: sanitize::u8_or(obj, "split_level", d.split_level),
        orbit_angle: sanitize::f32_or(obj, "orbit_angle", d.orbit_angle),
        nova_timer: sanitize::f32_or(obj, "nova_timer", d.nova_timer),
        kills: sanitize::u32_or(obj, "kills", d.kills),
    };
    p.clamp();
    p
}
