//! Session state and bookkeeping
//!
//! One `GameState` per play session. It owns every entity, the aggregate
//! counters and the outgoing event buffer; nothing lives in globals.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::entity::{Background, Bullet, Damage, Enemy, Explosion, Shot, Volley};
use super::event::{EntityId, EntityKind, GameEvent, SoundCue};
use super::ship::Ship;
use super::wave;
use crate::consts::*;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Waiting for the player to start
    Title,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended
    GameOver,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Current wave (1-based)
    pub level: u32,
    pub score: u64,
    pub life: u8,
    /// Special meter in [0, METER_MAX]
    pub meter: i32,
    /// Global time dilation for everything but the ship
    pub time_mod: f32,
    /// Simulation step counter
    pub time_ticks: u64,
    pub ship: Ship,
    pub background: Background,
    /// Live entities (insertion order)
    pub enemies: Vec<Enemy>,
    pub bullets: Vec<Bullet>,
    pub shots: Vec<Shot>,
    pub explosions: Vec<Explosion>,
    // Visual hooks
    /// Desaturation filter while time-slow is active
    pub desaturated: bool,
    /// Meter at or above the charge threshold
    pub meter_charged: bool,
    /// Pause key state last step (edge detection)
    pub(crate) pause_latch: bool,
    pub(crate) events: Vec<GameEvent>,
    next_id: EntityId,
}

impl GameState {
    /// Create a session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a session with custom tuning (sitting on the title screen)
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Title,
            level: 1,
            score: 0,
            life: tuning.start_life,
            meter: 0,
            time_mod: 1.0,
            time_ticks: 0,
            ship: Ship::new(SHIP_START, &tuning),
            background: Background::default(),
            enemies: Vec::new(),
            bullets: Vec::new(),
            shots: Vec::new(),
            explosions: Vec::new(),
            desaturated: false,
            meter_charged: false,
            pause_latch: false,
            events: Vec::new(),
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn is_paused(&self) -> bool {
        self.phase == GamePhase::Paused
    }

    /// Pause from outside the input stream (focus loss). No-op unless playing.
    pub fn pause(&mut self) {
        if self.phase == GamePhase::Playing {
            self.phase = GamePhase::Paused;
            log::info!("Paused");
        }
    }

    /// Hand pending events to the host
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn play(&mut self, cue: SoundCue) {
        self.events.push(GameEvent::Sound(cue));
    }

    // === Session lifecycle ===

    /// Reset counters and start wave 1
    pub fn start_game(&mut self) {
        self.clear_entities();

        self.level = 1;
        self.score = 0;
        self.life = self.tuning.start_life;
        self.meter = 0;
        self.meter_charged = false;
        self.time_mod = 1.0;
        self.desaturated = false;
        self.background = Background::default();
        self.ship.reset(SHIP_START);
        self.phase = GamePhase::Playing;

        log::info!("Session started (seed {})", self.seed);
        wave::new_wave(self);
    }

    /// Stop the session and despawn everything
    pub fn end_game(&mut self) {
        self.phase = GamePhase::GameOver;
        self.clear_entities();
        log::info!("Game over - score {} on wave {}", self.score, self.level);
    }

    fn clear_entities(&mut self) {
        let ids: Vec<EntityId> = self
            .enemies
            .iter()
            .map(|e| e.id)
            .chain(self.bullets.iter().map(|b| b.id))
            .chain(self.shots.iter().map(|s| s.id))
            .chain(self.explosions.iter().map(|e| e.id))
            .collect();
        for id in ids {
            self.emit(GameEvent::Despawned { id });
        }
        self.enemies.clear();
        self.bullets.clear();
        self.shots.clear();
        self.explosions.clear();
    }

    // === Counters ===

    pub fn score_add(&mut self, value: u64) {
        self.score += value;
    }

    /// Remove life (never below zero). Any real damage grants invulnerability.
    pub fn life_sub(&mut self, value: u8) {
        self.life = self.life.saturating_sub(value);
        if value > 0 {
            self.ship.set_invulnerable(true);
        }
    }

    /// Adjust the meter, clamped to [0, METER_MAX]
    pub fn meter_add(&mut self, value: i32) {
        let previous = self.meter;
        self.meter = self.meter.saturating_add(value).clamp(0, METER_MAX);
        if self.meter >= METER_CHARGED && previous < METER_CHARGED {
            self.play(SoundCue::Power);
            self.meter_charged = true;
        }
        if self.meter < METER_CHARGED {
            self.meter_charged = false;
        }
    }

    // === Spawning ===

    pub fn spawn_enemy(&mut self, enemy: Enemy) {
        self.emit(GameEvent::Spawned {
            id: enemy.id,
            kind: enemy.entity_kind(),
        });
        self.enemies.push(enemy);
    }

    pub fn spawn_bullet(&mut self, pos: Vec2, heading: Vec2) {
        let id = self.next_entity_id();
        let bullet = Bullet::new(
            id,
            pos,
            heading,
            self.tuning.bullet_speed,
            self.tuning.bullet_radius,
        );
        self.emit(GameEvent::Spawned {
            id,
            kind: EntityKind::Bullet,
        });
        self.bullets.push(bullet);
    }

    pub fn spawn_shot(&mut self, pos: Vec2, heading: Vec2) {
        let id = self.next_entity_id();
        self.emit(GameEvent::Spawned {
            id,
            kind: EntityKind::Shot,
        });
        self.shots
            .push(Shot::new(id, pos, heading, self.tuning.shot_speed));
    }

    pub fn spawn_explosion(&mut self, pos: Vec2) {
        let id = self.next_entity_id();
        self.emit(GameEvent::Spawned {
            id,
            kind: EntityKind::Explosion,
        });
        self.explosions.push(Explosion::new(id, pos));
    }

    // === Actions ===

    /// Player spread: one straight shot, two angled side shots
    pub fn fire_shot(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        let spread = if self.ship.focused {
            self.tuning.focus_spread
        } else {
            1.0
        };
        let pos = self.ship.pos;

        self.spawn_shot(pos, Vec2::new(0.0, -1.0));
        self.spawn_shot(pos + Vec2::new(-10.0, 5.0), Vec2::new(-1.0, -6.0 * spread));
        self.spawn_shot(pos + Vec2::new(10.0, 5.0), Vec2::new(1.0, -6.0 * spread));
        self.play(SoundCue::Shot);
    }

    /// Spawn an enemy volley
    pub fn fire_volley(&mut self, volley: Volley) {
        if self.phase != GamePhase::Playing {
            return;
        }
        for heading in &volley.headings {
            self.spawn_bullet(volley.origin, *heading);
        }
        self.play(volley.cue);
    }

    /// Start time-slow: dilate everything but the ship, spend meter
    pub fn slow_time(&mut self) {
        self.time_mod = self.tuning.time_slow_factor;
        self.desaturated = true;
        self.meter_add(-self.tuning.special_cost);
        self.ship
            .extend_invulnerability(self.tuning.special_duration);
        log::debug!("Time-slow on (meter now {})", self.meter);
    }

    /// End time-slow
    pub fn reset_time(&mut self) {
        self.time_mod = 1.0;
        self.desaturated = false;
        log::debug!("Time-slow off");
    }

    /// Damage enemy `index`. Returns true if this hit killed it.
    pub fn hit_enemy(&mut self, index: usize, dmg: i32) -> bool {
        let Some(enemy) = self.enemies.get_mut(index) else {
            return false;
        };
        match enemy.take_damage(dmg) {
            Damage::Killed => {
                let (id, pos, boss) = (enemy.id, enemy.mover.pos, enemy.is_boss());
                self.play(SoundCue::Explode);
                self.spawn_explosion(pos);
                self.emit(GameEvent::Despawned { id });
                if boss {
                    self.background.speed = BG_SPEED_VICTORY;
                    log::info!("Boss down on wave {}", self.level);
                }
                true
            }
            Damage::Wounded | Damage::Ignored => false,
        }
    }
}
