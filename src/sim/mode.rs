//! Top-level game mode

use serde::{Deserialize, Serialize};

/// Which phase of the game is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Title screen (initialization goes straight to Playing)
    Menu,
    /// Active gameplay
    Playing,
    /// Game is paused, state preserved
    Paused,
    /// Run ended
    GameOver,
    /// Run won (only reachable through an external trigger)
    GameWon,
}

impl Mode {
    /// Run has finished, either way
    pub fn is_finished(&self) -> bool {
        matches!(self, Mode::GameOver | Mode::GameWon)
    }
}

/// Current mode plus the one it replaced
///
/// The previous mode is kept for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeMachine {
    current: Mode,
    previous: Option<Mode>,
}

impl Default for ModeMachine {
    fn default() -> Self {
        Self {
            current: Mode::Menu,
            previous: None,
        }
    }
}

impl ModeMachine {
    pub fn current(&self) -> Mode {
        self.current
    }

    pub fn previous(&self) -> Option<Mode> {
        self.previous
    }

    /// Record a transition; returns the mode that was replaced
    pub fn set(&mut self, next: Mode) -> Mode {
        let prior = self.current;
        self.previous = Some(prior);
        self.current = next;
        log::info!("Mode change: {:?} -> {:?}", prior, next);
        prior
    }

    pub fn is_playing(&self) -> bool {
        self.current == Mode::Playing
    }

    pub fn is_paused(&self) -> bool {
        self.current == Mode::Paused
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_finished()
    }
}
