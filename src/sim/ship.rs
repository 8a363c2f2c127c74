//! The player ship
//!
//! Reads one input snapshot per step, builds velocity, and reports which
//! gated actions fired. Spawning and session bookkeeping happen in `state`.

use glam::Vec2;

use super::collision::Rect;
use super::tick::TickInput;
use super::timer::CooldownTimer;
use crate::consts::*;
use crate::tuning::Tuning;

/// Tint applied while invulnerable
pub const INVULNERABLE_TINT: u32 = 0xF99FAA;
/// Neutral tint
pub const NORMAL_TINT: u32 = 0xFFFFFF;

/// What the ship asked for during input processing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShipActions {
    /// Fire a spread this step
    pub fire: bool,
    /// Start time-slow this step
    pub special_started: bool,
    /// Time-slow ran out this step
    pub special_ended: bool,
}

/// Player ship
#[derive(Debug, Clone)]
pub struct Ship {
    pub pos: Vec2,
    pub vel: Vec2,
    pub fast_speed: f32,
    pub focus_speed: f32,
    pub speed: f32,
    pub focused: bool,
    pub graze_radius: f32,
    /// Cooling while invulnerable
    pub invul: CooldownTimer,
    pub fire: CooldownTimer,
    pub special: CooldownTimer,
    // Visual hooks (written here, read only by the host)
    pub alpha: f32,
    pub hitbox_alpha: f32,
    pub tint: u32,
}

impl Ship {
    pub fn new(pos: Vec2, tuning: &Tuning) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            fast_speed: tuning.ship_fast_speed,
            focus_speed: tuning.ship_focus_speed,
            speed: tuning.ship_fast_speed,
            focused: false,
            graze_radius: tuning.graze_radius,
            invul: CooldownTimer::ready(tuning.invulnerability),
            fire: CooldownTimer::ready(tuning.fire_cooldown),
            special: CooldownTimer::ready(tuning.special_duration),
            alpha: 1.0,
            hitbox_alpha: 0.0,
            tint: NORMAL_TINT,
        }
    }

    /// Put the ship back on the spawn point with fresh timers
    pub fn reset(&mut self, pos: Vec2) {
        self.pos = pos;
        self.vel = Vec2::ZERO;
        self.speed = self.fast_speed;
        self.invul.reset();
        self.fire.reset();
        self.special.reset();
        self.set_focus(false);
        self.set_invulnerable(false);
    }

    /// Process one input snapshot
    ///
    /// `meter` gates the special. Timers tick with real time: the ship is
    /// never slowed by time dilation.
    pub fn process_input(&mut self, input: &TickInput, meter: i32, dt: f32) -> ShipActions {
        let mut actions = ShipActions::default();

        self.set_focus(input.focus);
        self.vel = input.direction() * self.speed;

        if input.fire && self.fire.trigger() {
            actions.fire = true;
        }
        self.fire.tick(dt);

        if input.special && meter >= METER_CHARGED && self.special.trigger() {
            actions.special_started = true;
        }
        if self.special.tick(dt) {
            actions.special_ended = true;
        }

        if self.invul.tick(dt) {
            self.set_invulnerable(false);
        }

        actions
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
        self.speed = if focused {
            self.focus_speed
        } else {
            self.fast_speed
        };
        self.alpha = if focused { 0.75 } else { 1.0 };
        self.hitbox_alpha = if focused { 1.0 } else { 0.0 };
    }

    /// Move by velocity, clamped inside the arena
    pub fn advance(&mut self, dt: f32) {
        let next = self.pos + self.vel * dt;
        let max = Vec2::new(ARENA_WIDTH, ARENA_HEIGHT) - SHIP_HALF_SIZE;
        self.pos = next.clamp(SHIP_HALF_SIZE, max);
    }

    /// Damage box (much smaller than the sprite)
    pub fn hitbox(&self) -> Rect {
        Rect::centered(self.pos, HITBOX_HALF_SIZE)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invul.is_cooling()
    }

    pub fn set_invulnerable(&mut self, value: bool) {
        if value {
            self.invul.hold();
        } else {
            self.invul.release();
        }
        self.tint = if value {
            INVULNERABLE_TINT
        } else {
            NORMAL_TINT
        };
    }

    /// Stay invulnerable for at least `duration` seconds
    pub fn extend_invulnerability(&mut self, duration: f32) {
        self.invul.hold_for(duration);
        self.tint = INVULNERABLE_TINT;
    }
}
