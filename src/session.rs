//! Run lifecycle: fixed-step frame loop, host actions and persistence
//!
//! The host calls `frame` once per display refresh with the wall-clock delta.
//! Everything observable (state, snapshots, saves) happens between sub-steps.

use crate::consts::*;
use crate::debug::{self, DebugSnapshot};
use crate::highscores::Leaderboard;
use crate::persistence::{self, RUN_KEY, RunSaveData, Store};
use crate::platform::{Action, InputState};
use crate::settings::Settings;
use crate::sim::{GameEvent, GameState, tick};

/// Events kept for the host between drains
const MAX_PENDING_EVENTS: usize = 64;

/// Owns the authoritative game state and its storage
pub struct Session<S: Store> {
    state: GameState,
    settings: Settings,
    store: S,
    input: InputState,
    accumulator: f32,
    /// Simulated seconds since the last autosave
    since_autosave: f32,
    /// Host wall clock, advanced by frame deltas
    wall_clock_ms: f64,
    was_game_over: bool,
    events: Vec<GameEvent>,
}

impl<S: Store> Session<S> {
    /// Cold start: settings and run from the store, then fold in an external
    /// leaderboard snapshot if the host has one.
    pub fn new(store: S, seed: u64, leaderboard_seed: Option<&str>, now_ms: f64) -> Self {
        let settings = Settings::load(&store);
        let mut state = match persistence::load_run(&store, RUN_KEY) {
            Some(save) => {
                log::info!("Resuming saved run (seed {:#x})", save.seed);
                save.restore()
            }
            None => {
                log::info!("Starting new run with seed {:#x}", seed);
                GameState::new(seed)
            }
        };

        if let Some(text) = leaderboard_seed {
            state.leaderboard.merge(Leaderboard::from_json(text));
            state.best_score = state
                .best_score
                .max(state.leaderboard.top_score().unwrap_or(0));
        }

        let was_game_over = state.is_game_over();
        Self {
            state,
            settings,
            store,
            input: InputState::new(),
            accumulator: 0.0,
            since_autosave: 0.0,
            wall_clock_ms: if now_ms.is_finite() { now_ms } else { 0.0 },
            was_game_over,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn wall_clock_ms(&self) -> f64 {
        self.wall_clock_ms
    }

    /// Label recorded on leaderboard entries
    pub fn set_account(&mut self, account: &str) {
        let account = account.trim();
        if !account.is_empty() {
            self.state.account = account.to_string();
        }
    }

    /// Run the fixed-step loop for one display frame. Returns sub-steps run.
    pub fn frame(&mut self, wall_dt: f32) -> u32 {
        let dt = if wall_dt.is_finite() && wall_dt > 0.0 {
            wall_dt.min(MAX_FRAME_DT)
        } else {
            0.0
        };
        self.wall_clock_ms += dt as f64 * 1000.0;
        self.handle_host_actions();

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= SIM_DT {
            self.step();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Advance `ms` of wall-clock time synchronously, frame by frame
    pub fn advance_time(&mut self, ms: f64) -> u32 {
        if !ms.is_finite() || ms <= 0.0 {
            return 0;
        }
        let mut remaining = ms / 1000.0;
        let mut substeps = 0;
        while remaining > 0.0 {
            let chunk = remaining.min(MAX_FRAME_DT as f64);
            substeps += self.frame(chunk as f32);
            remaining -= chunk;
        }
        substeps
    }

    fn step(&mut self) {
        let input = self.input.take_tick_input(self.wall_clock_ms);
        let ticks_before = self.state.time_ticks;

        tick(&mut self.state, &input, SIM_DT);

        self.events.extend(self.state.take_events());
        if self.events.len() > MAX_PENDING_EVENTS {
            let excess = self.events.len() - MAX_PENDING_EVENTS;
            self.events.drain(..excess);
        }

        if input.restart {
            self.since_autosave = 0.0;
            self.was_game_over = false;
            self.save();
            return;
        }

        let game_over = self.state.is_game_over();
        if game_over && !self.was_game_over {
            self.save();
        }
        self.was_game_over = game_over;

        if self.state.time_ticks != ticks_before {
            self.since_autosave += SIM_DT;
            if self.since_autosave >= self.settings.autosave_interval_secs {
                self.save();
            }
        }
    }

    fn handle_host_actions(&mut self) {
        for action in self.input.take_host_actions() {
            match action {
                Action::ToggleMute => {
                    self.settings.toggle_mute();
                    log::info!("Muted: {}", self.settings.muted);
                    self.settings.save(&mut self.store);
                }
                Action::ToggleFullscreen => {
                    self.settings.toggle_fullscreen();
                    self.settings.save(&mut self.store);
                }
                Action::ToggleIdle => {
                    self.input.idle_mode = !self.input.idle_mode;
                    log::info!("Idle mode: {}", self.input.idle_mode);
                }
                _ => {}
            }
        }
    }

    /// Persist the run now. Failures are logged and the run continues.
    pub fn save(&mut self) -> bool {
        self.since_autosave = 0.0;
        let data = RunSaveData::from_state(&self.state);
        persistence::save_run(&mut self.store, RUN_KEY, &data)
    }

    /// Events since the last drain (oldest first)
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn debug_snapshot(&self) -> DebugSnapshot {
        debug::snapshot(&self.state)
    }

    /// Final save on teardown; hands the store back
    pub fn shutdown(mut self) -> S {
        log::info!("Session shutting down at {:.1}s", self.state.elapsed);
        self.save();
        self.settings.save(&mut self.store);
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::GamePhase;

    fn session() -> Session<MemoryStore> {
        Session::new(MemoryStore::new(), 42, None, 0.0)
    }

    #[test]
    fn test_zero_time_is_idempotent() {
        let mut s = session();
        s.advance_time(500.0);
        let before = s.state().clone();
        assert_eq!(s.advance_time(0.0), 0);
        assert_eq!(s.frame(0.0), 0);
        assert_eq!(s.frame(f32::NAN), 0);
        assert_eq!(s.frame(-1.0), 0);
        assert_eq!(s.state(), &before);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut s = session();
        let steps = s.frame(5.0);
        assert!(steps <= (MAX_FRAME_DT / SIM_DT).ceil() as u32);
        assert!(s.state().elapsed <= MAX_FRAME_DT + SIM_DT);
    }

    #[test]
    fn test_advance_time_runs_sub_steps() {
        let mut s = session();
        let steps = s.advance_time(1000.0);
        assert!((59..=60).contains(&steps), "ran {} steps", steps);
        assert_eq!(s.state().time_ticks, steps as u64);
    }

    #[test]
    fn test_autosave_lands_in_store() {
        let mut s = session();
        s.advance_time(6000.0);
        assert!(s.store().contains(RUN_KEY));
    }

    #[test]
    fn test_save_failure_does_not_stop_run() {
        let mut s = Session::new(MemoryStore::with_quota(8), 42, None, 0.0);
        s.advance_time(12_000.0);
        assert!(s.state().elapsed > 0.0);
        assert!(!s.store().contains(RUN_KEY));
        assert!(!s.save());
    }

    #[test]
    fn test_resume_from_store() {
        let mut s = session();
        s.advance_time(3000.0);
        let elapsed = s.state().elapsed;
        let seed = s.state().seed;
        let store = s.shutdown();

        let resumed = Session::new(store, 7, None, 0.0);
        assert_eq!(resumed.state().seed, seed);
        assert_eq!(resumed.state().elapsed, elapsed);
    }

    #[test]
    fn test_restart_between_steps() {
        let mut s = session();
        s.advance_time(2000.0);
        s.input_mut().press(Action::Restart);
        s.advance_time(100.0);
        assert!(s.state().elapsed < 0.2);
        assert!(s.state().phase.is_running());
        assert!(s.take_events().contains(&GameEvent::Restarted));
    }

    #[test]
    fn test_game_over_saved_and_submitted() {
        let mut s = session();
        s.state.world.player.hp = 0.0;
        s.advance_time(100.0);
        assert!(matches!(s.state().phase, GamePhase::GameOver));
        assert_eq!(s.state().leaderboard.len(), 1);

        let saved = persistence::load_run(s.store(), RUN_KEY).unwrap();
        assert!(saved.game_over);
        assert_eq!(saved.leaderboard.len(), 1);
    }

    #[test]
    fn test_leaderboard_seed_is_sanitized_and_merged() {
        let seed = r#"[
            {"id": "a", "score": 900, "level": 7},
            {"id": "", "score": 5000},
            {"id": "b", "score": "NaN"}
        ]"#;
        let s = Session::new(MemoryStore::new(), 1, Some(seed), 0.0);
        assert_eq!(s.state().leaderboard.len(), 1);
        assert_eq!(s.state().best_score, 900);
    }

    #[test]
    fn test_mute_toggle_persists() {
        let mut s = session();
        s.input_mut().key_down("m");
        s.frame(SIM_DT);
        assert!(s.settings().muted);
        assert!(Settings::load(s.store()).muted);
    }
}
