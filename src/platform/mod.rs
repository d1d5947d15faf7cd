//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input events (keyboard state handed to the session)
//! - Wall-clock time
//! - Storage (see `persistence::store`)

pub mod input;

pub use input::{Action, InputState};

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}
