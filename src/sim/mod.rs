//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Variable timestep, clamped on entry
//! - Seeded RNG only (one per session)
//! - Stable iteration order (insertion order per entity list)
//! - No rendering, audio or platform dependencies: effects leave as events

pub mod collision;
pub mod entity;
pub mod event;
pub mod ship;
pub mod state;
pub mod tick;
pub mod timer;
pub mod wave;

pub use collision::{Rect, circles_touch};
pub use entity::{
    Background, BossState, Bullet, Damage, Enemy, EnemyKind, EnemyStep, Explosion, Mover, Shot,
    Volley,
};
pub use event::{EntityId, EntityKind, GameEvent, SoundCue};
pub use ship::{Ship, ShipActions};
pub use state::{GamePhase, GameState};
pub use tick::{TickInput, clamp_frame_dt, tick};
pub use timer::CooldownTimer;
pub use wave::new_wave;
