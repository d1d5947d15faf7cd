//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use glam::Vec2;

use super::state::{GameEvent, GamePhase, GameState};
use super::{combat, progression, spawn};
use crate::consts::*;
use crate::highscores::LeaderboardEntry;
use crate::{angle_to_dir, dist_sq};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired movement direction (any length, zero = stand still)
    pub move_dir: Vec2,
    /// Abandon the current run and start over
    pub restart: bool,
    /// Index of the upgrade to take while a level-up is pending
    pub pick: Option<usize>,
    /// Let the heuristic choose the pending upgrade
    pub smart_pick: bool,
    /// Cycle to the next avatar
    pub swap_avatar: bool,
    /// Idle/demo mode - AI plays the game
    pub idle_mode: bool,
    /// Wall-clock time (Unix ms) recorded on leaderboard entries
    pub now_ms: f64,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.restart {
        log::info!("Restarting run (previous seed {:#x})", state.seed);
        state.reset();
        return;
    }

    if input.swap_avatar {
        state.avatar = (state.avatar + 1) % AVATAR_COUNT;
    }

    // Idle/demo mode - AI plays the game
    let mut input = input.clone();
    if input.idle_mode {
        input.smart_pick = true;
        input.move_dir = autopilot_direction(state);
    }
    let input = &input;

    if let GamePhase::AwaitingUpgrade { choices } = &state.phase {
        let index = if input.smart_pick {
            Some(progression::smart_pick(&state.world.player, choices))
        } else {
            input.pick
        };
        if let Some(index) = index {
            progression::choose(state, index);
        }
    }

    // Level-up choices and game over freeze the world
    if !state.phase.is_running() {
        return;
    }

    state.time_ticks += 1;
    state.elapsed += dt;
    state.difficulty = (1.0 + state.elapsed * DIFFICULTY_GROWTH).min(DIFFICULTY_MAX);

    spawn::update(state, dt);
    combat::update(state, input.move_dir, dt);

    let reached = (state.elapsed / MILESTONE_SECS).floor() as u32;
    while state.milestones < reached {
        state.milestones += 1;
        let minutes = (state.milestones as f32 * MILESTONE_SECS / 60.0).round() as u32;
        log::info!("Survived {} minute(s)", minutes);
        state.events.push(GameEvent::Milestone { minutes });
    }

    if state.is_game_over() {
        finish_run(state, input.now_ms);
    } else {
        state.score = state.compute_score();
    }

    state.world.normalize_order();
}

/// Record the final result. Runs at most once per run.
pub fn finish_run(state: &mut GameState, now_ms: f64) {
    if state.submitted {
        return;
    }
    state.score = state.compute_score();
    state.submitted = true;

    let player = &state.world.player;
    let entry = LeaderboardEntry {
        id: state.run_id(),
        account: state.account.clone(),
        avatar: state.avatar,
        score: state.score,
        kills: player.kills,
        level: player.level,
        survival_secs: state.elapsed,
        timestamp: if now_ms.is_finite() { now_ms.max(0.0) } else { 0.0 },
    };
    let rank = state.leaderboard.submit(entry);
    state.last_rank = rank;
    state.best_score = state.best_score.max(state.score);

    match rank {
        Some(rank) => log::info!("Run {} placed #{} with {}", state.run_id(), rank, state.score),
        None => log::info!("Run {} did not place ({})", state.run_id(), state.score),
    }
    state.events.push(GameEvent::GameOver {
        score: state.score,
        rank,
    });
}

/// Steering for idle mode: back away from nearby enemies, otherwise collect
/// the closest pickup, otherwise wander in a slow loop.
pub fn autopilot_direction(state: &GameState) -> Vec2 {
    let player = &state.world.player;

    let mut threat = Vec2::ZERO;
    for enemy in &state.world.enemies {
        let away = player.pos - enemy.pos;
        let dist = away.length();
        let danger = 220.0 + enemy.radius;
        if dist < danger && dist > f32::EPSILON {
            let weight = if enemy.kind.is_boss() { 2.0 } else { 1.0 };
            threat += away / dist * (1.0 - dist / danger) * weight;
        }
    }
    if threat.length_squared() > 0.04 {
        return threat.normalize_or_zero();
    }

    let nearest = state
        .world
        .supplies
        .iter()
        .map(|s| s.pos)
        .chain(state.world.gems.iter().map(|g| g.pos))
        .min_by(|a, b| dist_sq(*a, player.pos).total_cmp(&dist_sq(*b, player.pos)));
    if let Some(target) = nearest {
        return (target - player.pos).normalize_or_zero();
    }

    // Oscillating offset keeps the loop from tracing the same circle
    let t = state.time_ticks as f32 * 0.01;
    angle_to_dir(t * 0.5 + t.sin() * 0.3 + (t * 0.7).sin() * 0.15)
}
