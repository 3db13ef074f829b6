//! Data-driven game balance
//!
//! Every knob defaults to the classic arcade feel. A JSON document may
//! override any subset of fields; missing fields keep their defaults.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a tuning document was rejected
#[derive(Debug)]
pub enum TuningError {
    /// Document is not valid JSON for the tuning schema
    Parse(serde_json::Error),
    /// A field holds a value the simulation cannot run with
    Invalid { field: &'static str, reason: &'static str },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "tuning parse error: {err}"),
            Self::Invalid { field, reason } => write!(f, "invalid tuning `{field}`: {reason}"),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err)
    }
}

/// Balance parameters; frame counts are simulation ticks, intervals are ms
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub starting_lives: u8,
    /// Horizontal ship speed (px/frame)
    pub player_speed: f32,
    /// Frames between accepted shots
    pub reload_frames: u32,
    /// Frames of invincibility after a hit
    pub damage_invincibility_frames: u32,
    /// Frames of invincibility after a respawn
    pub respawn_invincibility_frames: u32,
    /// Concurrent player projectiles allowed on screen
    pub max_player_projectiles: usize,
    /// Enemy projectile pool pre-warm
    pub enemy_projectile_prewarm: usize,
    pub player_projectile_speed: f32,
    pub enemy_projectile_speed: f32,

    /// Formation move interval at level 1 (ms)
    pub base_move_interval_ms: f32,
    /// Floor for the move interval (ms)
    pub min_move_interval_ms: f32,
    /// Interval reduction per level (ms)
    pub move_interval_per_level_ms: f32,
    pub starting_speed_multiplier: f32,
    pub speed_increment_per_level: f32,
    /// Enemy fire chance per formation step: base + level * slope
    pub base_fire_chance: f32,
    pub fire_chance_per_level: f32,

    /// Bonus craft spawn chance per frame while inactive
    pub bonus_spawn_chance: f32,
    pub bonus_speed: f32,
    pub bonus_rewards: Vec<u64>,

    /// Level-clear award is `new_level * level_clear_bonus`
    pub level_clear_bonus: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_lives: 3,
            player_speed: 5.0,
            reload_frames: 20,
            damage_invincibility_frames: 60,
            respawn_invincibility_frames: 180,
            max_player_projectiles: 3,
            enemy_projectile_prewarm: 20,
            player_projectile_speed: 8.0,
            enemy_projectile_speed: 5.0,

            base_move_interval_ms: 60.0,
            min_move_interval_ms: 15.0,
            move_interval_per_level_ms: 3.0,
            starting_speed_multiplier: 0.7,
            speed_increment_per_level: 0.2,
            base_fire_chance: 0.1,
            fire_chance_per_level: 0.05,

            bonus_spawn_chance: 0.001,
            bonus_speed: 2.0,
            bonus_rewards: vec![50, 100, 150, 300],

            level_clear_bonus: 100,
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would stall or break the simulation
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: &'static str) -> Result<(), TuningError> {
            Err(TuningError::Invalid { field, reason })
        }

        if self.starting_lives == 0 {
            return invalid("starting_lives", "must be at least 1");
        }
        if self.min_move_interval_ms <= 0.0 {
            return invalid("min_move_interval_ms", "must be positive");
        }
        if self.base_move_interval_ms < self.min_move_interval_ms {
            return invalid("base_move_interval_ms", "must not be below the minimum interval");
        }
        if self.max_player_projectiles == 0 {
            return invalid("max_player_projectiles", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.bonus_spawn_chance) {
            return invalid("bonus_spawn_chance", "must be within [0, 1]");
        }
        if !(0.0..=1.0).contains(&self.base_fire_chance) {
            return invalid("base_fire_chance", "must be within [0, 1]");
        }
        if self.bonus_rewards.is_empty() {
            return invalid("bonus_rewards", "must list at least one reward");
        }
        if self.player_projectile_speed <= 0.0 || self.enemy_projectile_speed <= 0.0 {
            return invalid("projectile_speed", "must be positive");
        }
        if self.player_speed <= 0.0 {
            return invalid("player_speed", "must be positive");
        }
        // A stalled craft would never leave the field
        if self.bonus_speed <= 0.0 {
            return invalid("bonus_speed", "must be positive");
        }
        if self.move_interval_per_level_ms < 0.0 {
            return invalid("move_interval_per_level_ms", "must not be negative");
        }
        if self.starting_speed_multiplier <= 0.0 {
            return invalid("starting_speed_multiplier", "must be positive");
        }
        if self.speed_increment_per_level < 0.0 {
            return invalid("speed_increment_per_level", "must not be negative");
        }
        if self.fire_chance_per_level < 0.0 {
            return invalid("fire_chance_per_level", "must not be negative");
        }
        Ok(())
    }

    /// Formation move interval for a level, floored at the minimum
    pub fn move_interval_for_level(&self, level: u32) -> f32 {
        (self.base_move_interval_ms - level as f32 * self.move_interval_per_level_ms)
            .max(self.min_move_interval_ms)
    }

    /// Probability that the formation fires on a given step
    pub fn fire_chance_for_level(&self, level: u32) -> f32 {
        self.base_fire_chance + level as f32 * self.fire_chance_per_level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let tuning = Tuning::from_json(r#"{ "starting_lives": 5, "bonus_rewards": [10] }"#)
            .expect("valid tuning");
        assert_eq!(tuning.starting_lives, 5);
        assert_eq!(tuning.bonus_rewards, vec![10]);
        assert_eq!(tuning.reload_frames, 20);
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Tuning::from_json(r#"{ "bonus_spawn_chance": 2.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "bonus_spawn_chance",
                ..
            }
        ));
        assert!(matches!(
            Tuning::from_json("not json"),
            Err(TuningError::Parse(_))
        ));

        for (json, field) in [
            (r#"{ "bonus_speed": 0.0 }"#, "bonus_speed"),
            (r#"{ "bonus_speed": -2.0 }"#, "bonus_speed"),
            (r#"{ "player_speed": -5.0 }"#, "player_speed"),
            (r#"{ "move_interval_per_level_ms": -3.0 }"#, "move_interval_per_level_ms"),
            (r#"{ "speed_increment_per_level": -0.2 }"#, "speed_increment_per_level"),
        ] {
            match Tuning::from_json(json) {
                Err(TuningError::Invalid { field: got, .. }) => assert_eq!(got, field, "{json}"),
                other => panic!("{json} accepted: {other:?}"),
            }
        }
    }

    #[test]
    fn test_move_interval_is_floored() {
        let tuning = Tuning::default();
        assert_eq!(tuning.move_interval_for_level(2), 54.0);
        assert_eq!(tuning.move_interval_for_level(15), 15.0);
        assert_eq!(tuning.move_interval_for_level(100), 15.0);
    }

    #[test]
    fn test_fire_chance_scales_with_level() {
        let tuning = Tuning::default();
        assert!((tuning.fire_chance_for_level(1) - 0.15).abs() < 1e-6);
        assert!(tuning.fire_chance_for_level(4) > tuning.fire_chance_for_level(3));
    }
}
