//! Invader Rush - a marching-formation arcade shooter
//!
//! Core modules:
//! - `sim`: Frame-driven simulation (formation, projectiles, collisions, game mode)
//! - `renderer`: Draw intents handed to whatever canvas the host provides
//! - `platform`: Clock, input latching, diagnostics and logging setup
//! - `persistence`: Key/value storage backends (memory, file, LocalStorage)
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod game;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use highscores::{HighScoreStore, HighScores, ScoreBook};
pub use settings::Settings;
pub use tuning::Tuning;

/// Playfield and entity geometry
pub mod consts {
    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Player ship
    pub const PLAYER_WIDTH: f32 = 60.0;
    pub const PLAYER_HEIGHT: f32 = 30.0;
    pub const PLAYER_SPAWN_X: f32 = FIELD_WIDTH / 2.0 - PLAYER_WIDTH / 2.0;
    pub const PLAYER_SPAWN_Y: f32 = FIELD_HEIGHT - 60.0;
    pub const PLAYER_MAX_HEALTH: u8 = 10;

    /// Projectiles (both flavors share geometry)
    pub const PROJECTILE_WIDTH: f32 = 3.0;
    pub const PROJECTILE_HEIGHT: f32 = 15.0;

    /// Enemy formation layout
    pub const ENEMY_WIDTH: f32 = 40.0;
    pub const ENEMY_HEIGHT: f32 = 30.0;
    pub const ENEMY_ROWS: usize = 5;
    pub const ENEMY_COLS: usize = 11;
    pub const ENEMY_SPACING_X: f32 = 50.0;
    pub const ENEMY_SPACING_Y: f32 = 40.0;
    pub const FORMATION_ORIGIN_X: f32 = 80.0;
    pub const FORMATION_ORIGIN_Y: f32 = 80.0;

    /// Formation choreography
    pub const FORMATION_EDGE_MARGIN: f32 = 10.0;
    pub const FORMATION_DROP: f32 = 20.0;
    pub const FORMATION_STEP: f32 = 10.0;
    /// Enemies whose x differs by less than this share a column
    pub const COLUMN_TOLERANCE: f32 = 5.0;

    /// Bonus craft
    pub const BONUS_WIDTH: f32 = 70.0;
    pub const BONUS_HEIGHT: f32 = 30.0;
    pub const BONUS_Y: f32 = 50.0;

    /// Barriers
    pub const BARRIER_COUNT: usize = 4;
    pub const BARRIER_SPACING: f32 = 160.0;
    pub const BARRIER_ORIGIN_X: f32 = 100.0;
    pub const BARRIER_Y: f32 = FIELD_HEIGHT - 150.0;
    pub const SEGMENT_SIZE: f32 = 10.0;
    pub const SEGMENT_ROWS: usize = 6;
    pub const SEGMENT_COLS: usize = 8;
    pub const SEGMENT_INTEGRITY: u8 = 4;

    /// Collision inset applied to each rectangle side
    pub const COLLISION_TOLERANCE: f32 = 2.0;
    /// Game ends when the formation's lower edge comes this close to the player
    pub const INVASION_MARGIN: f32 = 20.0;
}
