//! Spawn scheduling: regular packs, elite waves, boss waves and supply drops

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::noise::{Biome, terrain_at};
use super::state::{EffectKind, EnemyKind, GameEvent, GameState, RngState, SupplyKind};
use crate::angle_to_dir;
use crate::consts::*;

/// Seconds between elite waves
pub const ELITE_WAVE_SECS: f32 = 58.0;
/// Seconds between boss waves
pub const BOSS_WAVE_SECS: f32 = 90.0;
/// Regular spawn interval bounds
pub const SPAWN_INTERVAL_START: f32 = 1.15;
pub const SPAWN_INTERVAL_FLOOR: f32 = 0.28;
/// Supply drop interval bounds
pub const SUPPLY_INTERVAL_MIN: f32 = 8.5;
pub const SUPPLY_INTERVAL_MAX: f32 = 16.0;
/// Upper bound on simultaneously live enemies
pub const MAX_ENEMIES: usize = 220;
/// Lifetime of a dropped supply (seconds)
pub const SUPPLY_TTL: f32 = 30.0;

/// Timers and wave markers owned by the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnSchedule {
    pub spawn_clock: f32,
    /// Index of the last elite wave that fired (0 = none)
    pub last_elite_wave: u32,
    /// Index of the last boss wave that fired (0 = none)
    pub last_boss_wave: u32,
    /// Seconds until the next supply drop
    pub supply_timer: f32,
}

impl Default for SpawnSchedule {
    fn default() -> Self {
        Self {
            spawn_clock: 0.0,
            last_elite_wave: 0,
            last_boss_wave: 0,
            supply_timer: 12.0,
        }
    }
}

/// Scaled stats for a freshly spawned enemy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnStats {
    pub hp: f32,
    pub speed: f32,
    pub damage: f32,
}

/// Regular spawn interval; shrinks with time down to a floor
pub fn spawn_interval(elapsed: f32) -> f32 {
    (SPAWN_INTERVAL_START - elapsed.max(0.0) * 0.0045).max(SPAWN_INTERVAL_FLOOR)
}

/// Enemies per regular pack, 1..=4
pub fn pack_size(elapsed: f32, level: u32, roll: f32) -> u32 {
    let base = 1 + (elapsed.max(0.0) / 75.0) as u32 + level / 6;
    let bump = u32::from(roll < 0.25);
    (base + bump).clamp(1, 4)
}

/// Decision tree for regular spawns
pub fn pick_enemy_kind(biome: Biome, roll: f32, elite_roll: f32, elapsed: f32) -> EnemyKind {
    if elapsed >= 150.0 {
        let elite_chance = 0.04 + (elapsed / 3000.0).min(0.06);
        if elite_roll < elite_chance {
            return EnemyKind::Golem;
        }
    }

    let early = elapsed < 40.0;
    match biome {
        Biome::Forest => {
            if early {
                if roll < 0.6 { EnemyKind::Slime } else { EnemyKind::Bat }
            } else if roll < 0.35 {
                EnemyKind::Slime
            } else if roll < 0.6 {
                EnemyKind::Bat
            } else if roll < 0.85 {
                EnemyKind::Wolf
            } else {
                EnemyKind::Skeleton
            }
        }
        Biome::Desert => {
            if early {
                if roll < 0.55 { EnemyKind::Scorpion } else { EnemyKind::Bat }
            } else if roll < 0.4 {
                EnemyKind::Scorpion
            } else if roll < 0.7 {
                EnemyKind::Mummy
            } else if roll < 0.85 {
                EnemyKind::Skeleton
            } else {
                EnemyKind::Bat
            }
        }
        Biome::Snow => {
            if early {
                if roll < 0.6 { EnemyKind::Wisp } else { EnemyKind::Wolf }
            } else if roll < 0.4 {
                EnemyKind::Wisp
            } else if roll < 0.7 {
                EnemyKind::Wolf
            } else if roll < 0.9 {
                EnemyKind::Skeleton
            } else {
                EnemyKind::Slime
            }
        }
    }
}

/// Scale base stats by elapsed time, player level and difficulty.
///
/// Non-decreasing in `elapsed` and `level` for every kind.
pub fn scaled_stats(kind: EnemyKind, elapsed: f32, level: u32, difficulty: f32) -> SpawnStats {
    let base = kind.base();
    let minutes = elapsed.max(0.0) / 60.0;
    let lv = level.max(1) as f32 - 1.0;
    let difficulty = difficulty.clamp(1.0, DIFFICULTY_MAX);

    let (hp_scale, speed_scale, damage_scale) = if kind.is_boss() {
        (
            (1.0 + 0.5 * minutes + 0.08 * lv) * difficulty,
            1.0 + (0.02 * minutes).min(0.25),
            (1.0 + 0.12 * minutes + 0.015 * lv) * difficulty.sqrt(),
        )
    } else {
        (
            (1.0 + 0.35 * minutes + 0.045 * lv) * difficulty,
            1.0 + (0.04 * minutes + 0.006 * lv).min(0.45),
            (1.0 + 0.18 * minutes + 0.02 * lv) * difficulty.sqrt(),
        )
    };

    SpawnStats {
        hp: base.hp * hp_scale,
        speed: base.speed * speed_scale,
        damage: base.damage * damage_scale,
    }
}

/// Boss kind for a wave: alternates by parity, flipped in snow
pub fn boss_kind_for(biome: Biome, wave: u32) -> EnemyKind {
    let odd = wave % 2 == 1;
    match (biome == Biome::Snow, odd) {
        (false, true) | (true, false) => EnemyKind::Titan,
        _ => EnemyKind::Wyrm,
    }
}

/// Supply interval, re-rolled after each drop
pub fn supply_interval(elapsed: f32, roll: f32) -> f32 {
    let base = (SUPPLY_INTERVAL_MAX - elapsed.max(0.0) * 0.01)
        .clamp(SUPPLY_INTERVAL_MIN, SUPPLY_INTERVAL_MAX);
    (base * (0.8 + 0.4 * roll)).clamp(SUPPLY_INTERVAL_MIN, SUPPLY_INTERVAL_MAX)
}

/// Angle steps tried before a point on water is accepted
const LAND_RETRIES: u32 = 4;
const LAND_STEP: f32 = 0.7;

/// Point at `dist` from `center`, rotated off water when a dry spot is
/// within a few steps of `theta`
fn land_point(center: Vec2, theta: f32, dist: f32) -> (Vec2, Biome) {
    let at = |step: u32| center + angle_to_dir(theta + LAND_STEP * step as f32) * dist;
    let mut pos = at(0);
    let mut terrain = terrain_at(pos);
    for step in 1..=LAND_RETRIES {
        if !terrain.water {
            break;
        }
        pos = at(step);
        terrain = terrain_at(pos);
    }
    (pos, terrain.biome)
}

/// Pick a spawn point on the ring around `center`, steering clear of water
fn spawn_point(center: Vec2, rng: &mut RngState) -> (Vec2, Biome) {
    let theta = rng.range(0.0, std::f32::consts::TAU);
    let dist = rng.range(SPAWN_RING_MIN, SPAWN_RING_MAX);
    land_point(center, theta, dist)
}

fn spawn_enemy(state: &mut GameState, kind: EnemyKind, pos: Vec2) -> u32 {
    let stats = scaled_stats(kind, state.elapsed, state.world.player.level, state.difficulty);
    state.world.add_enemy(kind, pos, stats.hp, stats.speed, stats.damage)
}

/// Advance spawn timers by one sub-step
pub fn update(state: &mut GameState, dt: f32) {
    update_regular(state, dt);
    update_elite_wave(state);
    update_boss_wave(state);
    update_supply(state, dt);
}

fn update_regular(state: &mut GameState, dt: f32) {
    state.spawner.spawn_clock += dt;
    let interval = spawn_interval(state.elapsed);
    if state.spawner.spawn_clock < interval {
        return;
    }
    state.spawner.spawn_clock -= interval;

    if state.world.enemies.len() >= MAX_ENEMIES {
        return;
    }

    let center = state.world.player.pos;
    let count = pack_size(state.elapsed, state.world.player.level, state.rng.next_f32());
    let (anchor, biome) = spawn_point(center, &mut state.rng);
    for i in 0..count {
        let roll = state.rng.next_f32();
        let elite_roll = state.rng.next_f32();
        let kind = pick_enemy_kind(biome, roll, elite_roll, state.elapsed);
        // Packs fan out around a shared anchor
        let offset = angle_to_dir(i as f32 * 2.1) * (i as f32 * 26.0);
        let id = spawn_enemy(state, kind, anchor + offset);
        log::debug!("spawned {:?} #{} in {}", kind, id, biome.as_str());
    }
}

fn update_elite_wave(state: &mut GameState) {
    let wave = (state.elapsed / ELITE_WAVE_SECS).floor() as u32;
    if wave <= state.spawner.last_elite_wave {
        return;
    }
    state.spawner.last_elite_wave = wave;

    let center = state.world.player.pos;
    let (pos, biome) = spawn_point(center, &mut state.rng);
    spawn_enemy(state, EnemyKind::Golem, pos);
    spawn_enemy(state, EnemyKind::support_for(biome), pos + Vec2::new(40.0, 0.0));

    log::info!("Elite wave {} ({})", wave, biome.as_str());
    state.events.push(GameEvent::EliteWave { wave });
}

fn update_boss_wave(state: &mut GameState) {
    let wave = (state.elapsed / BOSS_WAVE_SECS).floor() as u32;
    if wave <= state.spawner.last_boss_wave {
        return;
    }
    state.spawner.last_boss_wave = wave;

    let center = state.world.player.pos;
    let (pos, biome) = spawn_point(center, &mut state.rng);
    let first = boss_kind_for(biome, wave);
    spawn_enemy(state, first, pos);

    let support = EnemyKind::support_for(biome);
    spawn_enemy(state, support, pos + Vec2::new(50.0, 0.0));
    spawn_enemy(state, support, pos + Vec2::new(-50.0, 0.0));

    let mut bosses = 1;
    if wave >= 3 && state.rng.next_f32() < 0.35 {
        let second = if first == EnemyKind::Titan { EnemyKind::Wyrm } else { EnemyKind::Titan };
        // Opposite side of the ring from the first boss
        let offset = pos - center;
        let (mirror, _) = land_point(
            center,
            offset.y.atan2(offset.x) + std::f32::consts::PI,
            offset.length(),
        );
        spawn_enemy(state, second, mirror);
        bosses += 1;
    }

    state.world.add_effect(EffectKind::BossWarning, pos, 90.0, 2.0);
    log::info!("Boss wave {}: {:?} x{} ({})", wave, first, bosses, biome.as_str());
    state.events.push(GameEvent::BossWave { wave, bosses });
}

fn update_supply(state: &mut GameState, dt: f32) {
    state.spawner.supply_timer -= dt;
    if state.spawner.supply_timer > 0.0 {
        return;
    }

    let kind = SupplyKind::from_roll(state.rng.next_f32());
    let theta = state.rng.range(0.0, std::f32::consts::TAU);
    let dist = state.rng.range(180.0, 320.0);
    let (pos, _) = land_point(state.world.player.pos, theta, dist);
    state.world.add_supply(kind, pos, SUPPLY_TTL);

    state.spawner.supply_timer = supply_interval(state.elapsed, state.rng.next_f32());
    state.events.push(GameEvent::SupplyDropped { kind });
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_kind() -> impl Strategy<Value = EnemyKind> {
        proptest::sample::select(EnemyKind::ALL.to_vec())
    }

    #[test]
    fn test_spawn_interval_shrinks_to_floor() {
        assert_eq!(spawn_interval(0.0), SPAWN_INTERVAL_START);
        assert!(spawn_interval(60.0) < spawn_interval(30.0));
        assert_eq!(spawn_interval(10_000.0), SPAWN_INTERVAL_FLOOR);
    }

    #[test]
    fn test_pack_size_bounds() {
        assert_eq!(pack_size(0.0, 1, 0.9), 1);
        assert_eq!(pack_size(0.0, 1, 0.1), 2);
        assert_eq!(pack_size(100_000.0, 999, 0.0), 4);
    }

    #[test]
    fn test_early_game_has_no_elites() {
        for biome in [Biome::Forest, Biome::Desert, Biome::Snow] {
            for i in 0..20 {
                let roll = i as f32 / 20.0;
                let kind = pick_enemy_kind(biome, roll, 0.0, 30.0);
                assert!(!kind.is_elite() && !kind.is_boss());
            }
        }
    }

    #[test]
    fn test_boss_kind_alternates() {
        assert_ne!(boss_kind_for(Biome::Forest, 1), boss_kind_for(Biome::Forest, 2));
        assert_ne!(boss_kind_for(Biome::Forest, 1), boss_kind_for(Biome::Snow, 1));
    }

    #[test]
    fn test_first_boss_wave_fires_once() {
        let mut state = GameState::new(42);
        state.elapsed = 90.0;
        state.spawner.last_elite_wave = 1;
        state.spawner.supply_timer = 100.0;

        update(&mut state, 0.0);
        let bosses = state.world.enemies.iter().filter(|e| e.kind.is_boss()).count();
        assert_eq!(bosses, 1);
        assert_eq!(state.world.enemies.len(), 3, "boss plus two support units");
        assert_eq!(state.spawner.last_boss_wave, 1);

        update(&mut state, 0.0);
        assert_eq!(state.world.boss_count(), 1, "same wave must not re-fire");
    }

    #[test]
    fn test_elite_wave_spawns_heavy_and_support() {
        let mut state = GameState::new(3);
        state.elapsed = 58.0;
        state.spawner.supply_timer = 100.0;
        update(&mut state, 0.0);
        assert_eq!(state.spawner.last_elite_wave, 1);
        assert!(state.world.enemies.iter().any(|e| e.kind == EnemyKind::Golem));
        assert_eq!(state.world.enemies.len(), 2);
    }

    #[test]
    fn test_supply_drop_rerolls_timer() {
        let mut state = GameState::new(5);
        state.spawner.supply_timer = 0.01;
        update_supply(&mut state, 0.02);
        assert_eq!(state.world.supplies.len(), 1);
        let d = state.world.supplies[0].pos.distance(state.world.player.pos);
        assert!((179.0..=321.0).contains(&d), "dropped {} away", d);
        let t = state.spawner.supply_timer;
        assert!((SUPPLY_INTERVAL_MIN..=SUPPLY_INTERVAL_MAX).contains(&t));
    }

    #[test]
    fn test_regular_spawns_accumulate() {
        let mut state = GameState::new(11);
        state.spawner.supply_timer = 1000.0;
        for _ in 0..120 {
            update(&mut state, SIM_DT);
        }
        assert!(!state.world.enemies.is_empty());
        for e in &state.world.enemies {
            assert!(e.hp <= e.max_hp);
        }
    }

    proptest! {
        #[test]
        fn prop_scaling_monotonic_in_time(
            kind in any_kind(),
            t in 0.0f32..3600.0,
            dt in 0.0f32..600.0,
            level in 1u32..200,
            difficulty in 1.0f32..3.0,
        ) {
            let a = scaled_stats(kind, t, level, difficulty);
            let b = scaled_stats(kind, t + dt, level, difficulty);
            prop_assert!(b.hp >= a.hp);
            prop_assert!(b.speed >= a.speed);
            prop_assert!(b.damage >= a.damage);
        }

        #[test]
        fn prop_scaling_monotonic_in_level(
            kind in any_kind(),
            t in 0.0f32..3600.0,
            level in 1u32..500,
            dl in 0u32..100,
            difficulty in 1.0f32..3.0,
        ) {
            let a = scaled_stats(kind, t, level, difficulty);
            let b = scaled_stats(kind, t, level + dl, difficulty);
            prop_assert!(b.hp >= a.hp);
            prop_assert!(b.speed >= a.speed);
            prop_assert!(b.damage >= a.damage);
        }

        #[test]
        fn prop_land_point_avoids_water_when_it_can(
            x in -20_000.0f32..20_000.0,
            y in -20_000.0f32..20_000.0,
            theta in 0.0f32..std::f32::consts::TAU,
            dist in 150.0f32..700.0,
        ) {
            let center = Vec2::new(x, y);
            let (pos, biome) = land_point(center, theta, dist);
            let terrain = terrain_at(pos);
            prop_assert_eq!(terrain.biome, biome);
            prop_assert!((pos.distance(center) - dist).abs() < 0.5);

            let dry_nearby = (0..=LAND_RETRIES).any(|step| {
                let candidate = center + angle_to_dir(theta + LAND_STEP * step as f32) * dist;
                !terrain_at(candidate).water
            });
            if dry_nearby {
                prop_assert!(!terrain.water);
            }
        }

        #[test]
        fn prop_supply_interval_bounded(t in 0.0f32..100_000.0, roll in 0.0f32..1.0) {
            let v = supply_interval(t, roll);
            prop_assert!((SUPPLY_INTERVAL_MIN..=SUPPLY_INTERVAL_MAX).contains(&v));
        }
    }
}
