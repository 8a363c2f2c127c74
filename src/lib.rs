//! Danmaku - A bullet-hell arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, timers, collisions, waves, session)
//! - `platform`: Browser/native glue (keyboard state, frame clock)
//! - `audio`: Web Audio cue player (wasm only)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player audio preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use settings::Settings;
pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Arena dimensions (pixels, origin top-left, y grows downward)
    pub const ARENA_WIDTH: f32 = 600.0;
    pub const ARENA_HEIGHT: f32 = 600.0;

    /// Frame delta upper bound (prevents physics explosions on lag spikes)
    pub const MAX_FRAME_DT: f32 = 1.0 / 12.0;
    /// Nominal frame delta used by tests and the headless runner
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Special meter bounds
    pub const METER_MAX: i32 = 300;
    /// Meter needed to trigger time-slow
    pub const METER_CHARGED: i32 = 100;

    /// Extra off-screen margin before an enemy is disabled
    pub const ENEMY_OFFSCREEN_MARGIN: f32 = 100.0;

    /// Ship spawn point
    pub const SHIP_START: Vec2 = Vec2::new(300.0, 550.0);
    /// Ship sprite half-extents (used for arena clamping)
    pub const SHIP_HALF_SIZE: Vec2 = Vec2::new(16.0, 16.0);
    /// Ship hit-box half-extents (used for damage)
    pub const HITBOX_HALF_SIZE: Vec2 = Vec2::new(3.0, 3.0);

    /// Sprite half-extents for collision bounds
    pub const ENEMY_HALF_SIZE: Vec2 = Vec2::new(16.0, 16.0);
    pub const BOSS_HALF_SIZE: Vec2 = Vec2::new(40.0, 40.0);
    pub const BULLET_HALF_SIZE: Vec2 = Vec2::new(8.0, 8.0);
    pub const SHOT_HALF_SIZE: Vec2 = Vec2::new(4.0, 8.0);

    /// Explosion sprite sheet: 7 frames played at 60/7 fps
    pub const EXPLOSION_FRAMES: u32 = 7;
    pub const EXPLOSION_FPS: f32 = 60.0 / 7.0;

    /// Background scroll speeds (pixels/sec)
    pub const BG_SPEED_NORMAL: f32 = 10.0;
    pub const BG_SPEED_BOSS_ENTRY: f32 = 2.0;
    pub const BG_SPEED_BOSS_FIGHT: f32 = 0.0;
    pub const BG_SPEED_VICTORY: f32 = 10.0;
}

/// Unit vector pointing at `theta` radians
#[inline]
pub fn unit_from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}

/// Uniform sample in `[a, b)` that tolerates `a > b` (mirrors `a + t * (b - a)`)
#[inline]
pub fn lerp_random<R: rand::Rng + ?Sized>(rng: &mut R, a: f32, b: f32) -> f32 {
    a + rng.random::<f32>() * (b - a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_normalize_zero_vector_is_zero() {
        assert_eq!(Vec2::ZERO.normalize_or_zero(), Vec2::ZERO);
    }

    #[test]
    fn test_add_combines_each_axis() {
        let sum = Vec2::new(1.0, 2.0) + Vec2::new(10.0, 20.0);
        assert_eq!(sum, Vec2::new(11.0, 22.0));
    }

    #[test]
    fn test_unit_from_angle() {
        let v = unit_from_angle(std::f32::consts::FRAC_PI_2);
        assert!(v.x.abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_lerp_random_reversed_range() {
        let mut rng = Pcg32::seed_from_u64(7);
        for _ in 0..100 {
            let v = lerp_random(&mut rng, 0.0, -50.0);
            assert!(v <= 0.0 && v > -50.0);
        }
    }

    proptest! {
        #[test]
        fn prop_normalize_is_unit(x in -1.0e4f32..1.0e4, y in -1.0e4f32..1.0e4) {
            prop_assume!(x.abs() > 1e-3 || y.abs() > 1e-3);
            let n = Vec2::new(x, y).normalize_or_zero();
            prop_assert!((n.length() - 1.0).abs() < 1e-4);
        }
    }
}
