//! Game state and core simulation types
//!
//! All state that must be persisted or observed between ticks lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::noise::{Biome, mix32};
use super::progression::UpgradeChoice;
use super::spawn::SpawnSchedule;
use crate::consts::*;
use crate::highscores::Leaderboard;

/// Documented stat ranges. Every mutation of a player stat ends in a clamp.
pub mod limits {
    pub const MAX_HP: (f32, f32) = (40.0, 2000.0);
    pub const LEVEL: (u32, u32) = (1, 999);
    pub const MOVE_SPEED: (f32, f32) = (120.0, 420.0);
    pub const ATTACK: (f32, f32) = (4.0, 900.0);
    pub const ARMOR: (f32, f32) = (0.0, 60.0);
    pub const ATTACK_INTERVAL: (f32, f32) = (0.12, 1.2);
    pub const PROJECTILE_SPEED: (f32, f32) = (260.0, 1200.0);
    pub const PIERCE: (u32, u32) = (0, 8);
    pub const PICKUP_RADIUS: (f32, f32) = (40.0, 320.0);
    pub const GEAR_TIER: u8 = 5;
    pub const ORBIT_MAX: u8 = 5;
    pub const NOVA_MAX: u8 = 5;
    pub const SPLIT_MAX: u8 = 3;
}

/// Clamp a float stat, mapping non-finite values to `fallback` first
#[inline]
pub fn clamp_stat(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    let value = if value.is_finite() { value } else { fallback };
    value.clamp(min, max)
}

/// Experience needed to go from `level` to `level + 1`
pub fn exp_for_level(level: u32) -> u32 {
    let l = level.max(1) as f32 - 1.0;
    (18.0 + l * 9.0 + l.powf(1.35) * 4.0).round() as u32
}

/// Current phase of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Simulation advancing normally
    Running,
    /// A level-up offered choices; everything else is frozen until one is applied
    AwaitingUpgrade { choices: Vec<UpgradeChoice> },
    /// Player died, simulation frozen until restart
    GameOver,
}

impl GamePhase {
    pub fn is_running(&self) -> bool {
        matches!(self, GamePhase::Running)
    }

    pub fn choices(&self) -> &[UpgradeChoice] {
        match self {
            GamePhase::AwaitingUpgrade { choices } => choices,
            _ => &[],
        }
    }
}

/// The player character
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Unit vector of the last non-zero movement direction
    pub facing: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub level: u32,
    pub exp: u32,
    pub exp_next: u32,
    pub move_speed: f32,
    pub attack: f32,
    pub armor: f32,
    /// Seconds until the next auto-fire volley
    pub attack_timer: f32,
    pub attack_interval: f32,
    pub projectile_speed: f32,
    pub pierce: u32,
    pub pickup_radius: f32,
    pub weapon_tier: u8,
    pub armor_tier: u8,
    pub orbit_level: u8,
    pub nova_level: u8,
    pub split_level: u8,
    /// Current blade ring angle (radians)
    pub orbit_angle: f32,
    /// Seconds until the next nova burst
    pub nova_timer: f32,
    pub kills: u32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            facing: Vec2::X,
            hp: 100.0,
            max_hp: 100.0,
            level: 1,
            exp: 0,
            exp_next: exp_for_level(1),
            move_speed: 170.0,
            attack: 12.0,
            armor: 0.0,
            attack_timer: 0.0,
            attack_interval: 0.62,
            projectile_speed: 520.0,
            pierce: 0,
            pickup_radius: 70.0,
            weapon_tier: 0,
            armor_tier: 0,
            orbit_level: 0,
            nova_level: 0,
            split_level: 0,
            orbit_angle: 0.0,
            nova_timer: 0.0,
            kills: 0,
        }
    }
}

impl PlayerState {
    /// Re-establish every documented range and invariant
    pub fn clamp(&mut self) {
        self.clamp_stats();
        if self.exp >= self.exp_next {
            self.exp = self.exp_next - 1;
        }
    }

    /// Clamp everything except banked experience, which a level-up loop
    /// is still spending
    pub fn clamp_stats(&mut self) {
        let d = PlayerState::default();

        if !self.pos.is_finite() {
            self.pos = Vec2::ZERO;
        }
        if !self.vel.is_finite() {
            self.vel = Vec2::ZERO;
        }
        self.facing = self.facing.try_normalize().unwrap_or(Vec2::X);

        self.max_hp = clamp_stat(self.max_hp, limits::MAX_HP, d.max_hp);
        self.hp = clamp_stat(self.hp, (0.0, self.max_hp), self.max_hp);

        self.level = self.level.clamp(limits::LEVEL.0, limits::LEVEL.1);
        self.exp_next = exp_for_level(self.level);

        self.move_speed = clamp_stat(self.move_speed, limits::MOVE_SPEED, d.move_speed);
        self.attack = clamp_stat(self.attack, limits::ATTACK, d.attack);
        self.armor = clamp_stat(self.armor, limits::ARMOR, d.armor);
        self.attack_interval =
            clamp_stat(self.attack_interval, limits::ATTACK_INTERVAL, d.attack_interval);
        self.attack_timer = clamp_stat(self.attack_timer, (0.0, self.attack_interval), 0.0);
        self.projectile_speed =
            clamp_stat(self.projectile_speed, limits::PROJECTILE_SPEED, d.projectile_speed);
        self.pierce = self.pierce.clamp(limits::PIERCE.0, limits::PIERCE.1);
        self.pickup_radius = clamp_stat(self.pickup_radius, limits::PICKUP_RADIUS, d.pickup_radius);

        self.weapon_tier = self.weapon_tier.min(limits::GEAR_TIER);
        self.armor_tier = self.armor_tier.min(limits::GEAR_TIER);
        self.orbit_level = self.orbit_level.min(limits::ORBIT_MAX);
        self.nova_level = self.nova_level.min(limits::NOVA_MAX);
        self.split_level = self.split_level.min(limits::SPLIT_MAX);

        self.orbit_angle = if self.orbit_angle.is_finite() {
            self.orbit_angle.rem_euclid(std::f32::consts::TAU)
        } else {
            0.0
        };
        self.nova_timer = clamp_stat(self.nova_timer, (0.0, 10.0), 0.0);
    }

    /// Heal by `amount`, never past max hp
    pub fn heal(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.hp = (self.hp + amount).min(self.max_hp);
        }
    }

    /// Apply incoming damage, never below zero
    pub fn take_damage(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.hp = (self.hp - amount).max(0.0);
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }

    pub fn hp_fraction(&self) -> f32 {
        self.hp / self.max_hp
    }
}

/// Enemy types. The last two are bosses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Slime,
    Bat,
    Wolf,
    Skeleton,
    Scorpion,
    Mummy,
    Wisp,
    Golem,
    Titan,
    Wyrm,
}

/// Per-kind base stats
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnemyBase {
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
    pub radius: f32,
    /// Total experience dropped, split across gem chunks
    pub exp: u32,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 10] = [
        EnemyKind::Slime,
        EnemyKind::Bat,
        EnemyKind::Wolf,
        EnemyKind::Skeleton,
        EnemyKind::Scorpion,
        EnemyKind::Mummy,
        EnemyKind::Wisp,
        EnemyKind::Golem,
        EnemyKind::Titan,
        EnemyKind::Wyrm,
    ];

    pub fn base(&self) -> EnemyBase {
        let (hp, speed, damage, radius, exp) = match self {
            EnemyKind::Slime => (22.0, 70.0, 6.0, 14.0, 3),
            EnemyKind::Bat => (14.0, 120.0, 4.0, 11.0, 2),
            EnemyKind::Wolf => (30.0, 105.0, 8.0, 15.0, 4),
            EnemyKind::Skeleton => (40.0, 80.0, 9.0, 15.0, 5),
            EnemyKind::Scorpion => (34.0, 95.0, 10.0, 15.0, 5),
            EnemyKind::Mummy => (70.0, 62.0, 12.0, 17.0, 8),
            EnemyKind::Wisp => (26.0, 115.0, 7.0, 12.0, 4),
            EnemyKind::Golem => (180.0, 52.0, 18.0, 24.0, 24),
            EnemyKind::Titan => (1400.0, 58.0, 26.0, 40.0, 160),
            EnemyKind::Wyrm => (1150.0, 72.0, 22.0, 36.0, 150),
        };
        EnemyBase { hp, speed, damage, radius, exp }
    }

    pub fn is_boss(&self) -> bool {
        matches!(self, EnemyKind::Titan | EnemyKind::Wyrm)
    }

    pub fn is_elite(&self) -> bool {
        matches!(self, EnemyKind::Golem)
    }

    /// Number of gem chunks dropped on death
    pub fn gem_chunks(&self) -> u32 {
        if self.is_boss() {
            6
        } else if self.is_elite() {
            3
        } else if matches!(self, EnemyKind::Mummy) {
            2
        } else {
            1
        }
    }

    /// Chance that any gem drops at all
    pub fn gem_chance(&self) -> f32 {
        if self.is_boss() || self.is_elite() {
            1.0
        } else if matches!(self, EnemyKind::Mummy | EnemyKind::Skeleton) {
            0.9
        } else {
            0.78
        }
    }

    /// Chance of a supply drop
    pub fn supply_chance(&self) -> f32 {
        if self.is_boss() {
            1.0
        } else if self.is_elite() {
            0.25
        } else {
            0.015
        }
    }

    /// Biome support unit accompanying heavy waves
    pub fn support_for(biome: Biome) -> EnemyKind {
        match biome {
            Biome::Forest => EnemyKind::Wolf,
            Biome::Desert => EnemyKind::Mummy,
            Biome::Snow => EnemyKind::Wisp,
        }
    }
}

/// A live enemy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub hp: f32,
    pub max_hp: f32,
    pub speed: f32,
    pub damage: f32,
    pub radius: f32,
    /// Seconds until this enemy may deal contact damage again
    pub contact_cd: f32,
    /// Seconds until orbit blades may hit this enemy again
    pub orbit_cd: f32,
}

impl Enemy {
    /// Subtract damage; hp may go negative until the cull pass
    pub fn hit(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.hp -= amount;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.hp <= 0.0
    }
}

/// Projectile visual style (follows weapon tier)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectileStyle {
    Arrow,
    Bolt,
    Orb,
}

impl ProjectileStyle {
    pub fn for_tier(tier: u8) -> Self {
        match tier {
            0..=1 => ProjectileStyle::Arrow,
            2..=3 => ProjectileStyle::Bolt,
            _ => ProjectileStyle::Orb,
        }
    }
}

/// Elemental tag (follows the biome the shot was fired in)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    Nature,
    Fire,
    Frost,
}

impl From<Biome> for Element {
    fn from(biome: Biome) -> Self {
        match biome {
            Biome::Forest => Element::Nature,
            Biome::Desert => Element::Fire,
            Biome::Snow => Element::Frost,
        }
    }
}

/// A player projectile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub style: ProjectileStyle,
    pub element: Element,
    pub pos: Vec2,
    pub vel: Vec2,
    pub ttl: f32,
    pub damage: f32,
    pub radius: f32,
    /// Enemies this projectile may still pass through
    pub pierce: u32,
    /// Enemies already struck (each enemy is hit at most once)
    #[serde(default)]
    pub hit_ids: Vec<u32>,
}

/// An experience gem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gem {
    pub id: u32,
    pub pos: Vec2,
    pub exp: u32,
    pub ttl: f32,
    /// Pulled toward the player regardless of distance
    #[serde(default)]
    pub magnetized: bool,
}

/// Supply crate payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyKind {
    Heal,
    Magnet,
    WeaponCrate,
    ArmorCrate,
}

impl SupplyKind {
    pub const ALL: [SupplyKind; 4] = [
        SupplyKind::Heal,
        SupplyKind::Magnet,
        SupplyKind::WeaponCrate,
        SupplyKind::ArmorCrate,
    ];

    /// Pick a kind from a roll in [0, 1]
    pub fn from_roll(roll: f32) -> Self {
        if roll < 0.35 {
            SupplyKind::Heal
        } else if roll < 0.55 {
            SupplyKind::Magnet
        } else if roll < 0.8 {
            SupplyKind::WeaponCrate
        } else {
            SupplyKind::ArmorCrate
        }
    }
}

/// A supply pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Supply {
    pub id: u32,
    pub kind: SupplyKind,
    pub pos: Vec2,
    pub ttl: f32,
}

/// Transient, gameplay-neutral effects for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    NovaRing,
    HitSpark,
    DeathPuff,
    LevelUp,
    BossWarning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub id: u32,
    pub kind: EffectKind,
    pub pos: Vec2,
    pub radius: f32,
    pub ttl: f32,
}

/// Maximum transient effects kept alive
pub const MAX_EFFECTS: usize = 128;

/// Owner of every live entity in a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRegistry {
    pub player: PlayerState,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub gems: Vec<Gem>,
    pub supplies: Vec<Supply>,
    pub effects: Vec<Effect>,
    next_enemy_id: u32,
    next_projectile_id: u32,
    next_gem_id: u32,
    next_supply_id: u32,
    next_effect_id: u32,
}

impl EntityRegistry {
    pub fn new(player: PlayerState) -> Self {
        Self {
            player,
            ..Default::default()
        }
    }

    fn bump(counter: &mut u32) -> u32 {
        *counter = counter.wrapping_add(1);
        *counter
    }

    pub fn add_enemy(&mut self, kind: EnemyKind, pos: Vec2, hp: f32, speed: f32, damage: f32) -> u32 {
        let id = Self::bump(&mut self.next_enemy_id);
        let hp = hp.max(1.0);
        self.enemies.push(Enemy {
            id,
            kind,
            pos,
            hp,
            max_hp: hp,
            speed,
            damage,
            radius: kind.base().radius,
            contact_cd: 0.0,
            orbit_cd: 0.0,
        });
        id
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_projectile(
        &mut self,
        style: ProjectileStyle,
        element: Element,
        pos: Vec2,
        vel: Vec2,
        ttl: f32,
        damage: f32,
        radius: f32,
        pierce: u32,
    ) -> u32 {
        let id = Self::bump(&mut self.next_projectile_id);
        self.projectiles.push(Projectile {
            id,
            style,
            element,
            pos,
            vel,
            ttl,
            damage,
            radius,
            pierce,
            hit_ids: Vec::new(),
        });
        id
    }

    pub fn add_gem(&mut self, pos: Vec2, exp: u32, ttl: f32) -> u32 {
        let id = Self::bump(&mut self.next_gem_id);
        self.gems.push(Gem {
            id,
            pos,
            exp: exp.max(1),
            ttl,
            magnetized: false,
        });
        id
    }

    pub fn add_supply(&mut self, kind: SupplyKind, pos: Vec2, ttl: f32) -> u32 {
        let id = Self::bump(&mut self.next_supply_id);
        self.supplies.push(Supply { id, kind, pos, ttl });
        id
    }

    pub fn add_effect(&mut self, kind: EffectKind, pos: Vec2, radius: f32, ttl: f32) {
        if self.effects.len() >= MAX_EFFECTS {
            self.effects.remove(0);
        }
        let id = Self::bump(&mut self.next_effect_id);
        self.effects.push(Effect { id, kind, pos, radius, ttl });
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn enemy_mut(&mut self, id: u32) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    /// Damage an enemy by id. Missing ids are ignored.
    pub fn damage_enemy(&mut self, id: u32, amount: f32) -> bool {
        match self.enemy_mut(id) {
            Some(enemy) => {
                enemy.hit(amount);
                true
            }
            None => false,
        }
    }

    /// Remove an enemy by id. Missing ids are ignored.
    pub fn remove_enemy(&mut self, id: u32) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(idx))
    }

    pub fn boss_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.kind.is_boss()).count()
    }

    /// Keep id order stable for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|e| e.id);
        self.projectiles.sort_by_key(|p| p.id);
        self.gems.sort_by_key(|g| g.id);
        self.supplies.sort_by_key(|s| s.id);
    }
}

/// Seeded PCG32 stream whose position survives serialization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub draws: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, draws: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        let mut rng = Pcg32::seed_from_u64(self.seed);
        rng.advance(self.draws);
        rng
    }

    /// Next uniform value in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        let mut rng = self.to_rng();
        self.draws += 1;
        rng.random::<f32>()
    }

    /// Uniform value in [lo, hi)
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

/// Notable happenings during a tick, drained by the session
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LevelUp { level: u32 },
    UpgradeApplied { title: String },
    EliteWave { wave: u32 },
    BossWave { wave: u32, bosses: u32 },
    BossDefeated { kind: EnemyKind },
    SupplyDropped { kind: SupplyKind },
    Milestone { minutes: u32 },
    GameOver { score: u64, rank: Option<usize> },
    Restarted,
}

/// Complete game state (single authoritative value)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// General-purpose roll stream
    pub rng: RngState,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Survival time in seconds
    pub elapsed: f32,
    /// Difficulty coefficient
    pub difficulty: f32,
    pub world: EntityRegistry,
    pub spawner: SpawnSchedule,
    pub score: u64,
    pub boss_kills: u32,
    /// Bonus score from supplies that could not upgrade anything
    pub bonus_score: u64,
    pub milestones: u32,
    /// Whether this run's result reached the leaderboard already
    pub submitted: bool,
    /// Rank achieved on game over
    pub last_rank: Option<usize>,

    // Cross-run data, preserved by restart
    pub avatar: u8,
    pub account: String,
    pub best_score: u64,
    pub leaderboard: Leaderboard,

    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh run with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: RngState::new(seed),
            phase: GamePhase::Running,
            time_ticks: 0,
            elapsed: 0.0,
            difficulty: 1.0,
            world: EntityRegistry::new(PlayerState::default()),
            spawner: SpawnSchedule::default(),
            score: 0,
            boss_kills: 0,
            bonus_score: 0,
            milestones: 0,
            submitted: false,
            last_rank: None,
            avatar: 0,
            account: String::from("guest"),
            best_score: 0,
            leaderboard: Leaderboard::new(),
            events: Vec::new(),
        }
    }

    /// Start a new run in place, keeping avatar, account, best score and leaderboard
    pub fn reset(&mut self) {
        let seed = next_run_seed(self.seed);
        let mut fresh = GameState::new(seed);
        fresh.avatar = self.avatar;
        fresh.account = std::mem::take(&mut self.account);
        fresh.best_score = self.best_score;
        fresh.leaderboard = std::mem::take(&mut self.leaderboard);
        *self = fresh;
        self.events.push(GameEvent::Restarted);
    }

    /// Player shortcut
    pub fn player(&self) -> &PlayerState {
        &self.world.player
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.phase, GamePhase::GameOver)
    }

    /// Stable identity of this run for leaderboard submission
    pub fn run_id(&self) -> String {
        format!("run-{:016x}", self.seed)
    }

    /// Score formula shared by the live HUD value and the final result
    pub fn compute_score(&self) -> u64 {
        let p = &self.world.player;
        p.kills as u64 * 10
            + self.boss_kills as u64 * 500
            + self.elapsed.max(0.0).floor() as u64 * 3
            + (p.level.saturating_sub(1)) as u64 * 40
            + self.milestones as u64 * 150
            + self.bonus_score
    }

    /// Drain pending events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Seed for the run that follows `seed`
pub fn next_run_seed(seed: u64) -> u64 {
    let lo = mix32(seed as u32 ^ 0x68e3_1da4) as u64;
    let hi = mix32((seed >> 32) as u32 ^ 0xb5ad_4ece) as u64;
    (hi << 32 | lo) ^ 0x9e37_79b9_7f4a_7c15
}
