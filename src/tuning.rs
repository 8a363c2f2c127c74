//! Data-driven game balance
//!
//! Every gameplay number that a designer might want to tweak. Loaded from
//! JSON (missing fields fall back to defaults) and validated before use.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Balance configuration errors
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Ship ===
    /// Normal movement speed (pixels/sec)
    pub ship_fast_speed: f32,
    /// Focus-mode movement speed
    pub ship_focus_speed: f32,
    /// Graze detection radius around the ship center
    pub graze_radius: f32,
    /// Seconds between player spreads
    pub fire_cooldown: f32,
    /// Seconds of invulnerability after taking a hit
    pub invulnerability: f32,
    /// Time-slow duration in seconds
    pub special_duration: f32,
    /// Movement multiplier for everything but the ship during time-slow
    pub time_slow_factor: f32,
    /// Meter consumed by one time-slow
    pub special_cost: i32,
    /// Lives at session start
    pub start_life: u8,
    /// Side-shot slope multiplier while focused
    pub focus_spread: f32,

    // === Rewards ===
    pub graze_score: u64,
    pub graze_meter: i32,
    pub kill_meter: i32,

    // === Projectiles ===
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    pub shot_speed: f32,

    // === Enemies ===
    pub enemy_radius: f32,
    pub enemy_hp: i32,
    pub enemy_speed_min: f32,
    pub enemy_speed_max: f32,
    pub enemy_score: u64,
    pub enemy_fire_min: f32,
    pub enemy_fire_max: f32,
    pub flash_duration: f32,
    pub ring_hp: i32,
    pub ring_speed_min: f32,
    pub ring_speed_max: f32,
    /// Damage dealt to an enemy that rams the ship
    pub ram_damage: i32,

    // === Boss ===
    pub boss_radius: f32,
    pub boss_speed: f32,
    pub boss_score: u64,
    /// Revolutions per second of the spiral volley
    pub boss_spin: f32,
    pub boss_hp_base: i32,
    pub boss_hp_per_level: i32,

    // === Waves ===
    /// Every Nth level is a boss level
    pub boss_every: u32,
    pub wave_base_enemies: u32,
    pub wave_enemies_per_level: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            ship_fast_speed: 300.0,
            ship_focus_speed: 150.0,
            graze_radius: 16.0,
            fire_cooldown: 1.0 / 6.0,
            invulnerability: 1.0,
            special_duration: 2.0,
            time_slow_factor: 0.25,
            special_cost: 100,
            start_life: 5,
            focus_spread: 8.0,

            graze_score: 1,
            graze_meter: 10,
            kill_meter: 1,

            bullet_speed: 300.0,
            bullet_radius: 8.0,
            shot_speed: 400.0,

            enemy_radius: 10.0,
            enemy_hp: 3,
            enemy_speed_min: 50.0,
            enemy_speed_max: 100.0,
            enemy_score: 2,
            enemy_fire_min: 1.5,
            enemy_fire_max: 3.0,
            flash_duration: 0.2,
            ring_hp: 6,
            ring_speed_min: 50.0,
            ring_speed_max: 75.0,
            ram_damage: 3,

            boss_radius: 40.0,
            boss_speed: 50.0,
            boss_score: 20,
            boss_spin: 0.5,
            boss_hp_base: 50,
            boss_hp_per_level: 10,

            boss_every: 4,
            wave_base_enemies: 3,
            wave_enemies_per_level: 2,
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
        let positive = [
            ("ship_fast_speed", self.ship_fast_speed),
            ("ship_focus_speed", self.ship_focus_speed),
            ("fire_cooldown", self.fire_cooldown),
            ("invulnerability", self.invulnerability),
            ("special_duration", self.special_duration),
            ("bullet_speed", self.bullet_speed),
            ("shot_speed", self.shot_speed),
            ("enemy_fire_min", self.enemy_fire_min),
            ("flash_duration", self.flash_duration),
            ("boss_speed", self.boss_speed),
            ("enemy_speed_min", self.enemy_speed_min),
            ("ring_speed_min", self.ring_speed_min),
            ("graze_radius", self.graze_radius),
            ("bullet_radius", self.bullet_radius),
            ("enemy_radius", self.enemy_radius),
            ("boss_radius", self.boss_radius),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be positive",
                });
            }
        }

        let ranges = [
            ("enemy_fire_max", self.enemy_fire_min, self.enemy_fire_max),
            ("enemy_speed_max", self.enemy_speed_min, self.enemy_speed_max),
            ("ring_speed_max", self.ring_speed_min, self.ring_speed_max),
        ];
        for (field, min, max) in ranges {
            if !(max >= min) {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be at least the matching minimum",
                });
            }
        }
        if !(self.time_slow_factor > 0.0 && self.time_slow_factor <= 1.0) {
            return Err(TuningError::Invalid {
                field: "time_slow_factor",
                reason: "must be in (0, 1]",
            });
        }
        let hit_points = [
            ("enemy_hp", self.enemy_hp),
            ("ring_hp", self.ring_hp),
            ("boss_hp_base", self.boss_hp_base),
        ];
        for (field, value) in hit_points {
            if value <= 0 {
                return Err(TuningError::Invalid {
                    field,
                    reason: "must be positive",
                });
            }
        }
        if self.boss_hp_per_level < 0 {
            return Err(TuningError::Invalid {
                field: "boss_hp_per_level",
                reason: "must not be negative",
            });
        }
        // Level 1 is the smallest regular wave
        if self.wave_base_enemies.saturating_add(self.wave_enemies_per_level) == 0 {
            return Err(TuningError::Invalid {
                field: "wave_enemies_per_level",
                reason: "waves must spawn at least one enemy",
            });
        }
        if self.boss_every == 0 {
            return Err(TuningError::Invalid {
                field: "boss_every",
                reason: "must be non-zero",
            });
        }
        if self.start_life == 0 {
            return Err(TuningError::Invalid {
                field: "start_life",
                reason: "must be non-zero",
            });
        }
        Ok(())
    }

    /// Is `level` a boss level?
    pub fn is_boss_level(&self, level: u32) -> bool {
        level % self.boss_every == 0
    }

    /// Enemy count for a regular wave
    pub fn wave_size(&self, level: u32) -> u32 {
        self.wave_base_enemies + level * self.wave_enemies_per_level
    }

    /// Boss hit points for a boss level
    pub fn boss_hp(&self, level: u32) -> i32 {
        self.boss_hp_base + level as i32 * self.boss_hp_per_level
    }

    /// Seconds between boss volleys (faster on later boss levels)
    pub fn boss_fire_cooldown(&self, level: u32) -> f32 {
        1.0 / (10.0 * level.max(1) as f32 / self.boss_every as f32)
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
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "start_life": 3, "graze_meter": 5 }"#).unwrap();
        assert_eq!(tuning.start_life, 3);
        assert_eq!(tuning.graze_meter, 5);
        assert_eq!(tuning.enemy_hp, 3);
    }

    #[test]
    fn test_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_rejects_bad_time_slow() {
        let err = Tuning::from_json(r#"{ "time_slow_factor": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "time_slow_factor",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_cooldown() {
        let tuning = Tuning {
            fire_cooldown: 0.0,
            ..Default::default()
        };
        assert!(tuning.validate().is_err());
    }

    fn invalid_field(tuning: Tuning) -> &'static str {
        match tuning.validate() {
            Err(TuningError::Invalid { field, .. }) => field,
            other => panic!("expected invalid tuning, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_empty_waves() {
        let tuning = Tuning {
            wave_base_enemies: 0,
            wave_enemies_per_level: 0,
            ..Default::default()
        };
        assert_eq!(invalid_field(tuning), "wave_enemies_per_level");

        // Base of zero is fine while the per-level term is positive
        let tuning = Tuning {
            wave_base_enemies: 0,
            ..Default::default()
        };
        assert!(tuning.validate().is_ok());
    }

    #[test]
    fn test_rejects_shrinking_boss() {
        let tuning = Tuning {
            boss_hp_per_level: -10,
            ..Default::default()
        };
        assert_eq!(invalid_field(tuning), "boss_hp_per_level");
    }

    #[test]
    fn test_rejects_bad_radii_and_speeds() {
        let tuning = Tuning {
            bullet_radius: 0.0,
            ..Default::default()
        };
        assert_eq!(invalid_field(tuning), "bullet_radius");

        let tuning = Tuning {
            enemy_speed_min: 120.0,
            ..Default::default()
        };
        assert_eq!(invalid_field(tuning), "enemy_speed_max");

        let tuning = Tuning {
            ring_speed_min: -5.0,
            ..Default::default()
        };
        assert_eq!(invalid_field(tuning), "ring_speed_min");
    }

    #[test]
    fn test_wave_formulas() {
        let tuning = Tuning::default();
        assert_eq!(tuning.wave_size(1), 5);
        assert_eq!(tuning.wave_size(5), 13);
        assert!(tuning.is_boss_level(8));
        assert!(!tuning.is_boss_level(6));
        assert_eq!(tuning.boss_hp(8), 130);
        assert!((tuning.boss_fire_cooldown(4) - 0.1).abs() < 1e-6);
        assert!((tuning.boss_fire_cooldown(8) - 0.05).abs() < 1e-6);
    }
}
