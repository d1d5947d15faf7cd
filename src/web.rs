//! Browser bindings
//!
//! The page owns the canvas and the animation frame callback; it forwards key
//! events and frame deltas here and reads the state back as JSON.

use wasm_bindgen::prelude::*;

use crate::persistence::LocalStore;
use crate::platform;
use crate::session::Session;

#[wasm_bindgen]
pub struct WebGame {
    session: Session<LocalStore>,
    last_time: f64,
}

#[wasm_bindgen]
impl WebGame {
    /// `leaderboard_seed` is an optional JSON snapshot from the host page
    #[wasm_bindgen(constructor)]
    pub fn new(leaderboard_seed: Option<String>) -> WebGame {
        crate::init_wasm_logging();
        log::info!("Wildland Survivor starting...");
        let now = platform::now_ms();
        let session = Session::new(LocalStore, now as u64, leaderboard_seed.as_deref(), now);
        WebGame {
            session,
            last_time: 0.0,
        }
    }

    /// requestAnimationFrame callback with its timestamp (ms)
    pub fn frame(&mut self, time: f64) -> u32 {
        let dt = if self.last_time > 0.0 {
            ((time - self.last_time) / 1000.0) as f32
        } else {
            crate::consts::SIM_DT
        };
        self.last_time = time;
        self.session.frame(dt)
    }

    pub fn key_down(&mut self, key: &str) -> bool {
        self.session.input_mut().key_down(key)
    }

    pub fn key_up(&mut self, key: &str) {
        self.session.input_mut().key_up(key);
    }

    /// Window blur: drop held keys so the player stops
    pub fn blur(&mut self) {
        self.session.input_mut().clear();
    }

    pub fn set_account(&mut self, account: &str) {
        self.session.set_account(account);
    }

    /// Page hide / unload
    pub fn save(&mut self) -> bool {
        self.session.save()
    }

    /// Render-side view of the world
    pub fn state_json(&self) -> String {
        serde_json::to_string(self.session.state()).unwrap_or_default()
    }

    pub fn debug_json(&self) -> String {
        self.session.debug_snapshot().to_json().unwrap_or_default()
    }

    /// Advance simulated time synchronously (automation hook)
    pub fn advance_time(&mut self, ms: f64) -> u32 {
        self.session.advance_time(ms)
    }
}
