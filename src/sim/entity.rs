//! Moving entities: enemies, bullets, shots, explosions, background
//!
//! Entities are plain data plus the per-kind behavior that only touches the
//! entity itself. Anything with side effects on the session (spawning
//! bullets, scoring, background changes) is reported back to the caller.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::{FRAC_PI_4, TAU};

use super::collision::Rect;
use super::event::{EntityId, EntityKind, SoundCue};
use super::timer::CooldownTimer;
use crate::consts::*;
use crate::tuning::Tuning;
use crate::{lerp_random, unit_from_angle};

/// Straight-line translation shared by every moving entity
#[derive(Debug, Clone, PartialEq)]
pub struct Mover {
    pub pos: Vec2,
    /// Unit heading (or zero)
    pub heading: Vec2,
    pub speed: f32,
    pub alive: bool,
}

impl Mover {
    pub fn new(pos: Vec2, heading: Vec2, speed: f32) -> Self {
        Self {
            pos,
            heading: heading.normalize_or_zero(),
            speed,
            alive: true,
        }
    }

    /// Translate along the heading
    #[inline]
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.heading * self.speed * dt;
    }

    /// Flag dead. Returns true if this call did the killing.
    pub fn disable(&mut self) -> bool {
        let was_alive = self.alive;
        self.alive = false;
        was_alive
    }

    /// Outside the arena expanded by `margin` on every side
    pub fn is_outside_arena(&self, margin: Vec2) -> bool {
        self.pos.x <= -margin.x
            || self.pos.x >= ARENA_WIDTH + margin.x
            || self.pos.y <= -margin.y
            || self.pos.y >= ARENA_HEIGHT + margin.y
    }
}

/// Boss-only state
#[derive(Debug, Clone, PartialEq)]
pub struct BossState {
    /// Still descending into the arena (no wall reflection concerns yet)
    pub entering: bool,
    /// Spiral phase accumulator, kept in [0, 2π)
    pub fire_angle: f32,
    /// Revolutions per second
    pub spin: f32,
}

/// Enemy behavior variants
#[derive(Debug, Clone, PartialEq)]
pub enum EnemyKind {
    /// Forward-biased three bullet spread
    Basic,
    /// Eight bullets in a full circle
    Ring,
    /// Two opposite bullets along a rotating angle
    Boss(BossState),
}

/// Bullets an enemy wants spawned this step
#[derive(Debug, Clone, PartialEq)]
pub struct Volley {
    pub origin: Vec2,
    pub headings: Vec<Vec2>,
    pub cue: SoundCue,
}

/// Side effects of one enemy step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnemyStep {
    pub volley: Option<Volley>,
    /// Boss finished its entry run this step
    pub boss_engaged: bool,
}

/// Outcome of applying damage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Damage {
    /// Target was already dead
    Ignored,
    /// Target survived (now flashing)
    Wounded,
    /// Target died this call
    Killed,
}

/// An enemy ship
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EntityId,
    pub kind: EnemyKind,
    pub mover: Mover,
    /// Wall-reflection radius
    pub radius: f32,
    pub hp: i32,
    pub fire: CooldownTimer,
    pub flash: CooldownTimer,
    /// Score credited when shot down
    pub score: u64,
    /// Additive blend while the hit-flash runs
    pub flashing: bool,
}

impl Enemy {
    /// Random downward-biased heading
    pub fn random_heading<R: Rng + ?Sized>(rng: &mut R) -> Vec2 {
        let mut dir = unit_from_angle(rng.random_range(0.0..TAU));
        dir.y *= 2.0;
        if dir.y < 0.0 {
            dir.y = -dir.y;
        }
        if dir.y == 0.0 {
            dir.y = -1.0;
        }
        dir.y = dir.y.max(0.25);
        dir.normalize_or_zero()
    }

    fn random_fire_timer<R: Rng + ?Sized>(rng: &mut R, tuning: &Tuning) -> CooldownTimer {
        let cooldown = lerp_random(rng, tuning.enemy_fire_min, tuning.enemy_fire_max);
        let offset = lerp_random(rng, -cooldown / 2.0, cooldown);
        CooldownTimer::new(cooldown, offset, false)
    }

    pub fn basic<R: Rng + ?Sized>(id: EntityId, pos: Vec2, rng: &mut R, tuning: &Tuning) -> Self {
        let heading = Self::random_heading(rng);
        let speed = lerp_random(rng, tuning.enemy_speed_min, tuning.enemy_speed_max);
        Self {
            id,
            kind: EnemyKind::Basic,
            mover: Mover::new(pos, heading, speed),
            radius: tuning.enemy_radius,
            hp: tuning.enemy_hp,
            fire: Self::random_fire_timer(rng, tuning),
            flash: CooldownTimer::ready(tuning.flash_duration),
            score: tuning.enemy_score,
            flashing: false,
        }
    }

    pub fn ring<R: Rng + ?Sized>(id: EntityId, pos: Vec2, rng: &mut R, tuning: &Tuning) -> Self {
        let heading = Self::random_heading(rng);
        let speed = lerp_random(rng, tuning.ring_speed_min, tuning.ring_speed_max);
        Self {
            id,
            kind: EnemyKind::Ring,
            mover: Mover::new(pos, heading, speed),
            radius: tuning.enemy_radius,
            hp: tuning.ring_hp,
            fire: Self::random_fire_timer(rng, tuning),
            flash: CooldownTimer::ready(tuning.flash_duration),
            score: tuning.enemy_score,
            flashing: false,
        }
    }

    pub fn boss(id: EntityId, pos: Vec2, hp: i32, level: u32, tuning: &Tuning) -> Self {
        Self {
            id,
            kind: EnemyKind::Boss(BossState {
                entering: true,
                fire_angle: 0.0,
                spin: tuning.boss_spin,
            }),
            mover: Mover::new(pos, Vec2::Y, tuning.boss_speed),
            radius: tuning.boss_radius,
            hp,
            fire: CooldownTimer::new(tuning.boss_fire_cooldown(level), 0.0, false),
            flash: CooldownTimer::ready(tuning.flash_duration),
            score: tuning.boss_score,
            flashing: false,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.mover.alive
    }

    pub fn is_boss(&self) -> bool {
        matches!(self.kind, EnemyKind::Boss(_))
    }

    pub fn entity_kind(&self) -> EntityKind {
        match self.kind {
            EnemyKind::Basic => EntityKind::Enemy,
            EnemyKind::Ring => EntityKind::Ring,
            EnemyKind::Boss(_) => EntityKind::Boss,
        }
    }

    pub fn bounds(&self) -> Rect {
        let half = if self.is_boss() {
            BOSS_HALF_SIZE
        } else {
            ENEMY_HALF_SIZE
        };
        Rect::centered(self.mover.pos, half)
    }

    /// Translate, run the fire timer, run the hit-flash timer
    pub fn step(&mut self, dt: f32) -> EnemyStep {
        let mut out = EnemyStep::default();

        if let EnemyKind::Boss(boss) = &mut self.kind {
            boss.fire_angle = (boss.fire_angle + boss.spin * TAU * dt).rem_euclid(TAU);
        }

        self.mover.advance(dt);

        if self.fire.trigger() {
            out.volley = Some(self.volley());
        }
        self.fire.tick(dt);

        if self.flash.tick(dt) {
            self.flashing = false;
        }

        if let EnemyKind::Boss(boss) = &mut self.kind {
            if boss.entering && self.mover.pos.y > ARENA_HEIGHT / 4.0 {
                boss.entering = false;
                self.mover.heading = Vec2::X;
                out.boss_engaged = true;
            }
        }

        out
    }

    /// Bullet pattern for this kind, aimed from the current position
    pub fn volley(&self) -> Volley {
        let (headings, cue) = match &self.kind {
            EnemyKind::Basic => (
                vec![Vec2::new(0.0, 1.0), Vec2::new(1.0, 2.0), Vec2::new(-1.0, 2.0)],
                SoundCue::Bullet,
            ),
            EnemyKind::Ring => (
                (0..8)
                    .map(|i| unit_from_angle(i as f32 * FRAC_PI_4))
                    .collect(),
                SoundCue::BulletSmall,
            ),
            EnemyKind::Boss(boss) => {
                let dir = unit_from_angle(boss.fire_angle);
                (vec![dir, -dir], SoundCue::BulletSmall)
            }
        };
        Volley {
            origin: self.mover.pos,
            headings,
            cue,
        }
    }

    /// Touching the left or right play-field edge
    pub fn touches_side_wall(&self) -> bool {
        self.mover.pos.x <= self.radius || self.mover.pos.x >= ARENA_WIDTH - self.radius
    }

    pub fn reflect_x(&mut self) {
        self.mover.heading.x = -self.mover.heading.x;
    }

    pub fn reflect_y(&mut self) {
        self.mover.heading.y = -self.mover.heading.y;
    }

    /// Apply damage. Dead enemies ignore further hits.
    pub fn take_damage(&mut self, dmg: i32) -> Damage {
        if !self.mover.alive {
            return Damage::Ignored;
        }
        self.hp -= dmg;
        if self.hp <= 0 {
            self.mover.alive = false;
            self.flashing = false;
            Damage::Killed
        } else {
            self.flashing = true;
            self.flash.trigger();
            Damage::Wounded
        }
    }
}

/// Enemy-fired projectile
#[derive(Debug, Clone)]
pub struct Bullet {
    pub id: EntityId,
    pub mover: Mover,
    pub radius: f32,
    grazed: bool,
}

impl Bullet {
    pub fn new(id: EntityId, pos: Vec2, heading: Vec2, speed: f32, radius: f32) -> Self {
        Self {
            id,
            mover: Mover::new(pos, heading, speed),
            radius,
            grazed: false,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.mover.pos, BULLET_HALF_SIZE)
    }

    pub fn is_grazed(&self) -> bool {
        self.grazed
    }

    /// Mark grazed. Returns true only the first time.
    pub fn graze(&mut self) -> bool {
        let first = !self.grazed;
        self.grazed = true;
        first
    }
}

/// Player-fired projectile
#[derive(Debug, Clone)]
pub struct Shot {
    pub id: EntityId,
    pub mover: Mover,
}

impl Shot {
    pub fn new(id: EntityId, pos: Vec2, heading: Vec2, speed: f32) -> Self {
        Self {
            id,
            mover: Mover::new(pos, heading, speed),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::centered(self.mover.pos, SHOT_HALF_SIZE)
    }
}

/// One-shot explosion animation
#[derive(Debug, Clone)]
pub struct Explosion {
    pub id: EntityId,
    pub pos: Vec2,
    pub elapsed: f32,
}

impl Explosion {
    pub const DURATION: f32 = EXPLOSION_FRAMES as f32 / EXPLOSION_FPS;

    pub fn new(id: EntityId, pos: Vec2) -> Self {
        Self {
            id,
            pos,
            elapsed: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.elapsed += dt;
    }

    /// Current sprite-sheet frame
    pub fn frame(&self) -> u32 {
        ((self.elapsed * EXPLOSION_FPS) as u32).min(EXPLOSION_FRAMES - 1)
    }

    pub fn is_playing(&self) -> bool {
        self.elapsed < Self::DURATION
    }
}

/// Vertically scrolling star field
#[derive(Debug, Clone, PartialEq)]
pub struct Background {
    pub offset: f32,
    pub speed: f32,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            offset: 0.0,
            speed: BG_SPEED_NORMAL,
        }
    }
}

impl Background {
    pub fn advance(&mut self, dt: f32) {
        self.offset += self.speed * dt;
    }
}
