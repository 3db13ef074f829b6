//! Keyboard state by logical action
//!
//! Hosts report raw key names; the game reads actions. Movement is level
//! triggered. Fire, pause, restart and debug toggle are latched so a held key
//! triggers once until it is released.

use crate::sim::TickInput;

/// Logical game actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveLeft,
    MoveRight,
    Fire,
    Pause,
    Restart,
    DebugToggle,
}

impl Action {
    const ALL: [Action; 6] = [
        Action::MoveLeft,
        Action::MoveRight,
        Action::Fire,
        Action::Pause,
        Action::Restart,
        Action::DebugToggle,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Latched actions need a release before they trigger again
    pub fn is_latched(self) -> bool {
        !matches!(self, Action::MoveLeft | Action::MoveRight)
    }
}

/// Actions bound to a key name (`KeyboardEvent.key` spelling)
///
/// Enter is bound to both pause and restart; only one of them has an effect
/// in any given mode.
pub fn actions_for_key(key: &str) -> &'static [Action] {
    match key {
        "ArrowLeft" | "a" | "A" => &[Action::MoveLeft],
        "ArrowRight" | "d" | "D" => &[Action::MoveRight],
        " " | "Space" => &[Action::Fire],
        "Enter" => &[Action::Pause, Action::Restart],
        "p" | "P" | "Escape" => &[Action::Pause],
        "r" | "R" => &[Action::Restart],
        "F1" => &[Action::DebugToggle],
        _ => &[],
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ActionState {
    held: bool,
    /// Press not yet consumed
    pending: bool,
}

/// Current input, fed by key events and drained once per frame
#[derive(Debug, Clone, Default)]
pub struct InputState {
    actions: [ActionState; 6],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key going down; returns whether the key is bound
    pub fn key_down(&mut self, key: &str) -> bool {
        let actions = actions_for_key(key);
        for &action in actions {
            self.press(action);
        }
        !actions.is_empty()
    }

    pub fn key_up(&mut self, key: &str) -> bool {
        let actions = actions_for_key(key);
        for &action in actions {
            self.release(action);
        }
        !actions.is_empty()
    }

    pub fn press(&mut self, action: Action) {
        let state = &mut self.actions[action.index()];
        // Auto-repeat while held does not re-arm a latched action
        if !state.held {
            state.pending = true;
        }
        state.held = true;
    }

    pub fn release(&mut self, action: Action) {
        self.actions[action.index()].held = false;
    }

    pub fn is_held(&self, action: Action) -> bool {
        self.actions[action.index()].held
    }

    /// Consume a press: true once per press for latched actions, while held
    /// for movement
    pub fn take(&mut self, action: Action) -> bool {
        let state = &mut self.actions[action.index()];
        if action.is_latched() {
            std::mem::take(&mut state.pending)
        } else {
            state.held
        }
    }

    /// Build this frame's simulation input, consuming latched presses
    pub fn tick_input(&mut self, idle_mode: bool) -> TickInput {
        TickInput {
            move_left: self.take(Action::MoveLeft),
            move_right: self.take(Action::MoveRight),
            fire: self.take(Action::Fire),
            pause: self.take(Action::Pause),
            restart: self.take(Action::Restart),
            idle_mode,
        }
    }

    /// Drop everything (focus lost)
    pub fn clear(&mut self) {
        for action in Action::ALL {
            self.actions[action.index()] = ActionState::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latched_fire() {
        let mut input = InputState::new();
        input.key_down(" ");
        assert!(input.take(Action::Fire));
        // Still held: no retrigger
        input.key_down(" ");
        assert!(!input.take(Action::Fire));
        input.key_up(" ");
        input.key_down(" ");
        assert!(input.take(Action::Fire));
    }

    #[test]
    fn test_movement_is_level_triggered() {
        let mut input = InputState::new();
        input.key_down("ArrowLeft");
        assert!(input.take(Action::MoveLeft));
        assert!(input.take(Action::MoveLeft));
        input.key_up("ArrowLeft");
        assert!(!input.take(Action::MoveLeft));
    }

    #[test]
    fn test_key_map() {
        assert_eq!(actions_for_key("d"), &[Action::MoveRight]);
        assert_eq!(actions_for_key("Escape"), &[Action::Pause]);
        assert_eq!(actions_for_key("Enter"), &[Action::Pause, Action::Restart]);
        assert_eq!(actions_for_key("F1"), &[Action::DebugToggle]);
        assert!(actions_for_key("q").is_empty());
    }

    #[test]
    fn test_tick_input_consumes_presses() {
        let mut input = InputState::new();
        input.key_down("p");
        input.key_down("ArrowRight");
        let first = input.tick_input(false);
        assert!(first.pause);
        assert!(first.move_right);
        let second = input.tick_input(false);
        assert!(!second.pause);
        assert!(second.move_right);
    }

    #[test]
    fn test_clear() {
        let mut input = InputState::new();
        input.key_down("ArrowLeft");
        input.key_down(" ");
        input.clear();
        assert!(!input.is_held(Action::MoveLeft));
        assert!(!input.take(Action::Fire));
    }
}
