//! Player preferences
//!
//! Persisted separately from the high scores.

use serde::{Deserialize, Serialize};

use crate::persistence::{Storage, StorageError, load_json, save_json};

/// Storage key for settings
pub const STORAGE_KEY: &str = "invader_rush_settings";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,

    // === HUD ===
    /// Show FPS and object count
    pub show_debug: bool,

    // === Accessibility ===
    /// Reduced motion (no invincibility blink)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,

            show_debug: false,

            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Whether the ship should blink while invincible
    pub fn effective_blink(&self) -> bool {
        !self.reduced_motion
    }

    /// Load settings; missing or corrupt data falls back to defaults
    pub fn load<S: Storage + ?Sized>(storage: &S) -> Self {
        match load_json::<S, Self>(storage, STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Settings unreadable, using defaults: {err}");
                Self::default()
            }
        }
    }

    pub fn save<S: Storage + ?Sized>(&self, storage: &mut S) -> Result<(), StorageError> {
        save_json(storage, STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}
