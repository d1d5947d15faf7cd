//! Keyboard state between frames
//!
//! Held directions are level-triggered. Actions are edge-triggered: each press
//! is delivered to exactly one tick and then cleared.

use glam::Vec2;

use crate::sim::TickInput;

/// One-shot commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Restart,
    PickFirst,
    PickSecond,
    PickThird,
    SmartPick,
    SwapAvatar,
    ToggleMute,
    ToggleFullscreen,
    ToggleIdle,
}

impl Action {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "r" | "R" => Some(Action::Restart),
            "1" => Some(Action::PickFirst),
            "2" => Some(Action::PickSecond),
            "3" => Some(Action::PickThird),
            " " | "Enter" => Some(Action::SmartPick),
            "c" | "C" => Some(Action::SwapAvatar),
            "m" | "M" => Some(Action::ToggleMute),
            "f" | "F" => Some(Action::ToggleFullscreen),
            "i" | "I" => Some(Action::ToggleIdle),
            _ => None,
        }
    }
}

/// Held direction keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Held {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

/// Input accumulated by the host between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: Held,
    pressed: Vec<Action>,
    /// Idle/demo mode latch
    pub idle_mode: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    fn direction_slot(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "w" | "W" | "ArrowUp" => Some(&mut self.held.up),
            "s" | "S" | "ArrowDown" => Some(&mut self.held.down),
            "a" | "A" | "ArrowLeft" => Some(&mut self.held.left),
            "d" | "D" | "ArrowRight" => Some(&mut self.held.right),
            _ => None,
        }
    }

    /// Key pressed. Returns whether the key was recognized.
    pub fn key_down(&mut self, key: &str) -> bool {
        if let Some(slot) = self.direction_slot(key) {
            *slot = true;
            return true;
        }
        match Action::from_key(key) {
            Some(action) => {
                self.press(action);
                true
            }
            None => false,
        }
    }

    pub fn key_up(&mut self, key: &str) {
        if let Some(slot) = self.direction_slot(key) {
            *slot = false;
        }
    }

    /// Queue an action for the next tick (repeats collapse)
    pub fn press(&mut self, action: Action) {
        if !self.pressed.contains(&action) {
            self.pressed.push(action);
        }
    }

    /// Release everything (window blur)
    pub fn clear(&mut self) {
        self.held = Held::default();
        self.pressed.clear();
    }

    /// Unit direction of the held keys (y grows downward as on screen)
    pub fn move_dir(&self) -> Vec2 {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        Vec2::new(
            axis(self.held.left, self.held.right),
            axis(self.held.up, self.held.down),
        )
        .normalize_or_zero()
    }

    /// Drain queued presses that are handled outside the simulation
    pub fn take_host_actions(&mut self) -> Vec<Action> {
        let (host, sim): (Vec<Action>, Vec<Action>) = self.pressed.drain(..).partition(|a| {
            matches!(
                a,
                Action::ToggleMute | Action::ToggleFullscreen | Action::ToggleIdle
            )
        });
        self.pressed = sim;
        host
    }

    /// Build the input for one tick and clear the one-shot actions
    pub fn take_tick_input(&mut self, now_ms: f64) -> TickInput {
        let mut input = TickInput {
            move_dir: self.move_dir(),
            idle_mode: self.idle_mode,
            now_ms,
            ..Default::default()
        };
        for action in self.pressed.drain(..) {
            match action {
                Action::Restart => input.restart = true,
                Action::PickFirst => input.pick = Some(0),
                Action::PickSecond => input.pick = Some(1),
                Action::PickThird => input.pick = Some(2),
                Action::SmartPick => input.smart_pick = true,
                Action::SwapAvatar => input.swap_avatar = true,
                Action::ToggleMute | Action::ToggleFullscreen | Action::ToggleIdle => {}
            }
        }
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_is_normalized() {
        let mut input = InputState::new();
        input.key_down("w");
        input.key_down("ArrowRight");
        let dir = input.move_dir();
        assert!((dir.length() - 1.0).abs() < 1e-5);
        assert!(dir.x > 0.0 && dir.y < 0.0);

        input.key_up("w");
        assert_eq!(input.move_dir(), Vec2::X);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut input = InputState::new();
        input.key_down("a");
        input.key_down("d");
        assert_eq!(input.move_dir(), Vec2::ZERO);
    }

    #[test]
    fn test_actions_are_edge_triggered() {
        let mut input = InputState::new();
        input.key_down("2");
        input.key_down("r");
        input.key_down("d");

        let first = input.take_tick_input(0.0);
        assert_eq!(first.pick, Some(1));
        assert!(first.restart);
        assert_eq!(first.move_dir, Vec2::X);

        let second = input.take_tick_input(0.0);
        assert_eq!(second.pick, None);
        assert!(!second.restart);
        assert_eq!(second.move_dir, Vec2::X, "held keys persist");
    }

    #[test]
    fn test_host_actions_split_off() {
        let mut input = InputState::new();
        input.key_down("m");
        input.key_down("Enter");
        assert_eq!(input.take_host_actions(), vec![Action::ToggleMute]);
        assert!(input.take_tick_input(0.0).smart_pick);
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let mut input = InputState::new();
        assert!(!input.key_down("F13"));
        assert_eq!(input.take_tick_input(0.0).pick, None);
    }
}
