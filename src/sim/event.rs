//! Events emitted by the simulation for the host to consume
//!
//! The renderer subscribes to spawn/despawn, the audio player to sound cues.
//! Nothing in the simulation reads these back.

use serde::{Deserialize, Serialize};

/// Unique per-session entity handle
pub type EntityId = u32;

/// What kind of entity was spawned (picks the sprite on the host side)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Enemy,
    Ring,
    Boss,
    Bullet,
    Shot,
    Explosion,
}

/// Fire-and-forget audio cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundCue {
    /// Player fired a spread
    Shot,
    /// Basic enemy volley
    Bullet,
    /// Ring/Boss volley
    BulletSmall,
    /// Ship took damage
    Hit,
    /// Enemy destroyed
    Explode,
    /// Shot struck an enemy
    ShotHit,
    /// Bullet grazed
    Graze,
    /// Meter crossed the charge threshold
    Power,
}

impl SoundCue {
    /// Relative playback gain
    pub fn gain(&self) -> f32 {
        match self {
            SoundCue::Explode | SoundCue::ShotHit => 0.75,
            SoundCue::Graze => 0.5,
            SoundCue::Power => 1.25,
            _ => 1.0,
        }
    }
}

/// Simulation output event
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Attach to the render tree
    Spawned { id: EntityId, kind: EntityKind },
    /// Detach from the render tree
    Despawned { id: EntityId },
    /// Play a cue
    Sound(SoundCue),
}
