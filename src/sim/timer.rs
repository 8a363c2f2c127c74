//! Cooldown timer shared by every gated action
//!
//! Two states: ready and cooling. `trigger` consumes readiness, `tick` counts
//! down while cooling and flips back to ready when the period elapses.

/// Edge-triggered cooldown latch
#[derive(Debug, Clone, PartialEq)]
pub struct CooldownTimer {
    ready: bool,
    cooldown: f32,
    remaining: f32,
}

impl CooldownTimer {
    /// Create a timer with period `cooldown`.
    ///
    /// `initial_offset` is added to the first countdown so sibling timers can
    /// start out of phase. `start_ready` picks the initial state.
    pub fn new(cooldown: f32, initial_offset: f32, start_ready: bool) -> Self {
        Self {
            ready: start_ready,
            cooldown,
            remaining: cooldown + initial_offset,
        }
    }

    /// A timer that starts ready with no phase offset
    pub fn ready(cooldown: f32) -> Self {
        Self::new(cooldown, 0.0, true)
    }

    /// Consume readiness. Returns true if the timer was ready.
    pub fn trigger(&mut self) -> bool {
        let was_ready = self.ready;
        self.ready = false;
        was_ready
    }

    /// Advance the countdown. Returns true on the step the period elapses.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.ready {
            return false;
        }
        self.remaining -= dt;
        if self.remaining <= 0.0 {
            // Carry the overshoot into the next period
            self.remaining += self.cooldown;
            self.ready = true;
            return true;
        }
        false
    }

    /// Force the timer into the cooling state without touching `remaining`
    pub fn hold(&mut self) {
        self.ready = false;
    }

    /// Force the timer ready (cancels any countdown in progress)
    pub fn release(&mut self) {
        self.ready = true;
    }

    /// Cool for at least `duration` from now
    pub fn hold_for(&mut self, duration: f32) {
        self.ready = false;
        self.remaining = self.remaining.max(duration);
    }

    /// Restore the pristine state: ready with a full period queued
    pub fn reset(&mut self) {
        self.ready = true;
        self.remaining = self.cooldown;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_cooling(&self) -> bool {
        !self.ready
    }

    pub fn remaining(&self) -> f32 {
        self.remaining
    }
}
