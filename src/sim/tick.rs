//! Per-frame simulation step
//!
//! Order matters and is fixed: background, ship, movers, collisions,
//! cleanup, game-over check, wave advance.

use glam::Vec2;

use super::collision::circles_touch;
use super::event::{GameEvent, SoundCue};
use super::state::{GamePhase, GameState};
use super::wave;
use crate::consts::*;

/// Input snapshot for a single step (held state, read once)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
    /// Focus modifier (slow movement, steep spread)
    pub focus: bool,
    /// Fire key held (independent of the focus modifier)
    pub fire: bool,
    /// Time-slow key held
    pub special: bool,
    /// Pause key held (toggles on the press edge)
    pub pause: bool,
    /// Start a new session from the title or game-over screen
    pub start: bool,
}

impl TickInput {
    /// Normalized movement direction (zero when no key or opposing keys)
    pub fn direction(&self) -> Vec2 {
        let mut dir = Vec2::ZERO;
        if self.right {
            dir.x += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.down {
            dir.y += 1.0;
        }
        if self.up {
            dir.y -= 1.0;
        }
        dir.normalize_or_zero()
    }
}

/// Sanitize a raw frame delta: never negative, never above the lag clamp
#[inline]
pub fn clamp_frame_dt(dt: f32) -> f32 {
    if dt.is_finite() {
        dt.clamp(0.0, MAX_FRAME_DT)
    } else {
        0.0
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Pause toggles on the key-down edge only
    let pause_pressed = input.pause && !state.pause_latch;
    state.pause_latch = input.pause;
    if pause_pressed {
        match state.phase {
            GamePhase::Playing => {
                state.pause();
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                log::info!("Resumed");
            }
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Title | GamePhase::GameOver => {
            if input.start {
                state.start_game();
            }
            return;
        }
        GamePhase::Paused => return,
        GamePhase::Playing => {}
    }

    let dt = clamp_frame_dt(dt);
    state.time_ticks += 1;

    state.background.advance(dt);

    // Ship runs on real time
    let actions = state.ship.process_input(input, state.meter, dt);
    if actions.fire {
        state.fire_shot();
    }
    if actions.special_started {
        state.slow_time();
    }
    if actions.special_ended {
        state.reset_time();
    }
    state.ship.advance(dt);

    let scaled_dt = dt * state.time_mod;
    move_bullets(state, scaled_dt);
    move_enemies(state, scaled_dt);
    move_shots(state, scaled_dt);

    resolve_collisions(state);

    cleanup(state, dt);

    if state.life == 0 {
        state.end_game();
        return;
    }

    if state.enemies.is_empty() {
        state.level += 1;
        wave::new_wave(state);
    }
}

fn move_bullets(state: &mut GameState, dt: f32) {
    for bullet in state.bullets.iter_mut() {
        bullet.mover.advance(dt);
        if bullet.mover.is_outside_arena(Vec2::ZERO) && bullet.mover.disable() {
            state.events.push(GameEvent::Despawned { id: bullet.id });
        }
    }
}

fn move_enemies(state: &mut GameState, dt: f32) {
    // Volleys append to `bullets`, so index instead of iterating
    for i in 0..state.enemies.len() {
        let mut steps = vec![state.enemies[i].step(dt)];

        // Bounce off the side walls, then step again so the enemy clears it
        if state.enemies[i].touches_side_wall() {
            state.enemies[i].reflect_x();
            steps.push(state.enemies[i].step(dt));
        }

        for step in steps {
            if let Some(volley) = step.volley {
                state.fire_volley(volley);
            }
            if step.boss_engaged {
                state.background.speed = BG_SPEED_BOSS_FIGHT;
                log::debug!("Boss engaged");
            }
        }

        let enemy = &mut state.enemies[i];
        if enemy
            .mover
            .is_outside_arena(Vec2::splat(ENEMY_OFFSCREEN_MARGIN))
            && enemy.mover.disable()
        {
            let id = enemy.id;
            state.events.push(GameEvent::Despawned { id });
        }
    }
}

fn move_shots(state: &mut GameState, dt: f32) {
    for shot in state.shots.iter_mut() {
        shot.mover.advance(dt);
        if shot.mover.is_outside_arena(Vec2::ZERO) && shot.mover.disable() {
            state.events.push(GameEvent::Despawned { id: shot.id });
        }
    }
}

/// Pairwise collision pass (bullets, then enemies)
fn resolve_collisions(state: &mut GameState) {
    // Bullet vs ship, then graze against the same bullet
    for i in 0..state.bullets.len() {
        if !state.bullets[i].mover.alive {
            continue;
        }
        // Snapshot so a bullet that hits is still judged for graze this pass
        let invulnerable = state.ship.is_invulnerable();
        let hitbox = state.ship.hitbox();

        if !invulnerable && state.bullets[i].bounds().intersects(&hitbox) {
            state.play(SoundCue::Hit);
            if state.bullets[i].mover.disable() {
                let id = state.bullets[i].id;
                state.emit(GameEvent::Despawned { id });
            }
            state.life_sub(1);
        }

        let bullet = &mut state.bullets[i];
        if !invulnerable
            && !bullet.is_grazed()
            && circles_touch(
                bullet.mover.pos,
                bullet.radius,
                state.ship.pos,
                state.ship.graze_radius,
            )
            && bullet.graze()
        {
            state.play(SoundCue::Graze);
            state.meter_add(state.tuning.graze_meter);
            state.score_add(state.tuning.graze_score);
        }
    }

    for e in 0..state.enemies.len() {
        // Shots vs enemy
        for s in 0..state.shots.len() {
            if !state.enemies[e].is_alive() {
                break;
            }
            if !state.shots[s].mover.alive {
                continue;
            }
            if state.enemies[e].bounds().intersects(&state.shots[s].bounds()) {
                state.play(SoundCue::ShotHit);
                if state.shots[s].mover.disable() {
                    let id = state.shots[s].id;
                    state.emit(GameEvent::Despawned { id });
                }
                if state.hit_enemy(e, 1) {
                    let value = state.enemies[e].score;
                    state.score_add(value);
                    state.meter_add(state.tuning.kill_meter);
                }
            }
        }

        // Enemy rams ship: both take damage
        if state.enemies[e].is_alive()
            && !state.ship.is_invulnerable()
            && state.enemies[e].bounds().intersects(&state.ship.hitbox())
        {
            state.play(SoundCue::Hit);
            state.life_sub(1);
            state.hit_enemy(e, state.tuning.ram_damage);
        }
    }
}

/// Drop dead entities and finished explosions
fn cleanup(state: &mut GameState, dt: f32) {
    state.bullets.retain(|b| b.mover.alive);
    state.shots.retain(|s| s.mover.alive);
    state.enemies.retain(|e| e.is_alive());

    for explosion in state.explosions.iter_mut() {
        explosion.advance(dt);
    }
    let events = &mut state.events;
    state.explosions.retain(|e| {
        if e.is_playing() {
            true
        } else {
            events.push(GameEvent::Despawned { id: e.id });
            false
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Bullet;

    fn playing(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        state.start_game();
        state.drain_events();
        state
    }

    /// Park every enemy far from the ship with its guns silenced
    fn pacify(state: &mut GameState) {
        for enemy in state.enemies.iter_mut() {
            enemy.mover.pos = Vec2::new(300.0, 100.0);
            enemy.mover.speed = 0.0;
            enemy.fire = crate::sim::CooldownTimer::new(1000.0, 0.0, false);
        }
    }

    #[test]
    fn test_title_waits_for_start() {
        let mut state = GameState::new(5);
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.phase, GamePhase::Title);

        let input = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(!state.enemies.is_empty());
    }

    #[test]
    fn test_pause_toggles_on_edge() {
        let mut state = playing(1);
        pacify(&mut state);
        let held = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &held, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Holding does not toggle back
        tick(&mut state, &held, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        // Release then press again resumes
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.phase, GamePhase::Paused);
        tick(&mut state, &held, FRAME_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_paused_state_is_frozen() {
        let mut state = playing(2);
        state.phase = GamePhase::Paused;
        let before: Vec<Vec2> = state.enemies.iter().map(|e| e.mover.pos).collect();
        let ticks = state.time_ticks;
        let input = TickInput {
            left: true,
            fire: true,
            ..Default::default()
        };
        for _ in 0..30 {
            tick(&mut state, &input, FRAME_DT);
        }
        let after: Vec<Vec2> = state.enemies.iter().map(|e| e.mover.pos).collect();
        assert_eq!(before, after);
        assert_eq!(state.time_ticks, ticks);
        assert!(state.shots.is_empty());
    }

    #[test]
    fn test_frame_dt_is_clamped() {
        assert_eq!(clamp_frame_dt(1.0), MAX_FRAME_DT);
        assert_eq!(clamp_frame_dt(-0.5), 0.0);
        assert_eq!(clamp_frame_dt(f32::NAN), 0.0);
        assert_eq!(clamp_frame_dt(0.01), 0.01);

        let mut state = playing(3);
        pacify(&mut state);
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        let x = state.ship.pos.x;
        tick(&mut state, &right, 5.0);
        assert!((state.ship.pos.x - (x + 300.0 * MAX_FRAME_DT)).abs() < 1e-3);
    }

    #[test]
    fn test_opposing_keys_cancel() {
        let input = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        assert_eq!(input.direction(), Vec2::ZERO);
    }

    #[test]
    fn test_bullet_hits_ship() {
        let mut state = playing(4);
        pacify(&mut state);
        let ship = state.ship.pos;
        state.spawn_bullet(ship, Vec2::Y);
        state.bullets[0].mover.speed = 0.0;
        state.drain_events();

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.life, 4);
        assert!(state.bullets.is_empty());
        assert!(state.ship.is_invulnerable());
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Sound(SoundCue::Hit)));
    }

    #[test]
    fn test_hit_bullet_still_grazes_same_frame() {
        // Hit and graze both credit the same bullet in one pass
        let mut state = playing(5);
        pacify(&mut state);
        let ship = state.ship.pos;
        state.spawn_bullet(ship, Vec2::Y);
        state.bullets[0].mover.speed = 0.0;

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.life, 4);
        assert_eq!(state.score, 1);
        assert_eq!(state.meter, 10);
    }

    #[test]
    fn test_near_miss_grazes_once() {
        let mut state = playing(6);
        pacify(&mut state);
        let ship = state.ship.pos;
        state.spawn_bullet(ship + Vec2::new(20.0, 0.0), Vec2::Y);
        state.bullets[0].mover.speed = 0.0;

        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), FRAME_DT);
        }
        assert_eq!(state.life, 5);
        assert_eq!(state.score, 1);
        assert_eq!(state.meter, 10);
        assert!(state.bullets[0].is_grazed());
    }

    #[test]
    fn test_invulnerable_ship_ignores_bullets() {
        let mut state = playing(7);
        pacify(&mut state);
        state.ship.set_invulnerable(true);
        let ship = state.ship.pos;
        state.spawn_bullet(ship, Vec2::Y);
        state.bullets[0].mover.speed = 0.0;

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.life, 5);
        assert_eq!(state.bullets.len(), 1);
        assert!(!state.bullets[0].is_grazed());
    }

    #[test]
    fn test_shot_kills_enemy_and_credits() {
        let mut state = playing(8);
        pacify(&mut state);
        state.enemies.truncate(2);
        state.enemies[0].hp = 1;
        let target = state.enemies[0].mover.pos;
        state.spawn_shot(target, Vec2::NEG_Y);
        state.shots[0].mover.speed = 0.0;

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.enemies.len(), 1);
        assert!(state.shots.is_empty());
        assert_eq!(state.score, 2);
        assert_eq!(state.meter, 1);
        assert_eq!(state.explosions.len(), 1);
    }

    #[test]
    fn test_one_shot_one_hit() {
        // Two stacked enemies: the single shot only damages the first
        let mut state = playing(9);
        pacify(&mut state);
        state.enemies.truncate(2);
        let target = state.enemies[0].mover.pos;
        state.spawn_shot(target, Vec2::NEG_Y);
        state.shots[0].mover.speed = 0.0;
        let hp = state.enemies[1].hp;

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.enemies[1].hp, hp);
        assert_eq!(state.enemies[0].hp, hp - 1);
    }

    #[test]
    fn test_ram_damages_both() {
        let mut state = playing(10);
        pacify(&mut state);
        state.enemies.truncate(2);
        state.enemies[0].mover.pos = state.ship.pos;
        let hp = state.enemies[0].hp;

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.life, 4);
        // Default enemy has 3 hp: the ram kills it without score credit
        assert!(hp <= state.tuning.ram_damage);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_offscreen_movers_are_disabled() {
        let mut state = playing(11);
        pacify(&mut state);
        state.spawn_bullet(Vec2::new(300.0, 599.0), Vec2::Y);
        state.spawn_shot(Vec2::new(300.0, 1.0), Vec2::NEG_Y);
        state.enemies[0].mover.pos = Vec2::new(300.0, ARENA_HEIGHT + 99.0);
        state.enemies[0].mover.heading = Vec2::Y;
        state.enemies[0].mover.speed = 100.0;
        let enemies = state.enemies.len();

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert!(state.bullets.is_empty());
        assert!(state.shots.is_empty());
        assert_eq!(state.enemies.len(), enemies - 1);
    }

    #[test]
    fn test_enemy_reflects_off_wall() {
        let mut state = playing(12);
        pacify(&mut state);
        state.enemies[0].mover.pos = Vec2::new(12.0, 200.0);
        state.enemies[0].mover.heading = Vec2::new(-1.0, 0.0);
        state.enemies[0].mover.speed = 300.0;

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert!(state.enemies[0].mover.heading.x > 0.0);
        assert!(state.enemies[0].mover.pos.x > 7.0);
    }

    #[test]
    fn test_time_slow_dilates_everything_but_ship() {
        let mut state = playing(13);
        pacify(&mut state);
        state.meter = 150;
        state.spawn_bullet(Vec2::new(100.0, 100.0), Vec2::Y);
        let bullet_y = state.bullets[0].mover.pos.y;
        let ship_x = state.ship.pos.x;

        let input = TickInput {
            special: true,
            left: true,
            ..Default::default()
        };
        tick(&mut state, &input, FRAME_DT);
        assert_eq!(state.meter, 50);
        assert_eq!(state.time_mod, 0.25);
        assert!(state.ship.is_invulnerable());
        // Bullet moved at quarter speed, ship at full speed
        let moved = state.bullets[0].mover.pos.y - bullet_y;
        assert!((moved - 300.0 * FRAME_DT * 0.25).abs() < 1e-3);
        assert!((ship_x - state.ship.pos.x - 300.0 * FRAME_DT).abs() < 1e-3);

        // Two seconds later time is back to normal
        for _ in 0..125 {
            tick(&mut state, &TickInput::default(), FRAME_DT);
        }
        assert_eq!(state.time_mod, 1.0);
        assert!(!state.desaturated);
    }

    #[test]
    fn test_game_over_when_life_runs_out() {
        let mut state = playing(14);
        pacify(&mut state);
        state.life = 1;
        let ship = state.ship.pos;
        state.spawn_bullet(ship, Vec2::Y);
        state.bullets[0].mover.speed = 0.0;

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.bullets.is_empty() && state.enemies.is_empty());

        // Nothing happens until a restart
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_cleared_wave_advances_level() {
        let mut state = playing(15);
        state.enemies.clear();
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.level, 2);
        assert_eq!(state.enemies.len(), 7);
    }

    #[test]
    fn test_explosions_expire() {
        let mut state = playing(16);
        pacify(&mut state);
        state.spawn_explosion(Vec2::new(50.0, 50.0));
        let id = state.explosions[0].id;
        state.drain_events();
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), FRAME_DT);
        }
        assert!(state.explosions.is_empty());
        assert!(state.drain_events().contains(&GameEvent::Despawned { id }));
    }

    #[test]
    fn test_grazed_bullet_never_regrazes() {
        let mut state = playing(17);
        pacify(&mut state);
        let id = state.next_entity_id();
        let mut bullet = Bullet::new(id, state.ship.pos + Vec2::new(18.0, 0.0), Vec2::Y, 0.0, 8.0);
        bullet.graze();
        state.bullets.push(bullet);

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.score, 0);
        assert_eq!(state.meter, 0);
    }

    #[test]
    fn test_boss_controls_background() {
        let mut state = playing(18);
        state.enemies.clear();
        state.level = 4;
        crate::sim::wave::create_boss(&mut state, 90);
        state.enemies[0].fire = crate::sim::CooldownTimer::new(1000.0, 0.0, false);
        assert_eq!(state.background.speed, BG_SPEED_BOSS_ENTRY);

        // Descends from y = -50 to the quarter line at 50 px/s
        let mut frames = 0;
        while state.background.speed != BG_SPEED_BOSS_FIGHT && frames < 600 {
            tick(&mut state, &TickInput::default(), FRAME_DT);
            frames += 1;
        }
        assert_eq!(state.background.speed, BG_SPEED_BOSS_FIGHT);
        assert!((235..=250).contains(&frames));
        assert_eq!(state.enemies[0].mover.heading, Vec2::X);

        // Killing shot: the background speeds back up
        state.enemies[0].hp = 1;
        let boss = state.enemies[0].mover.pos;
        state.spawn_shot(boss, Vec2::NEG_Y);
        state.shots[0].mover.speed = 0.0;
        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert!(state.enemies.iter().all(|e| !e.is_boss()));
        assert_eq!(state.background.speed, BG_SPEED_VICTORY);
        assert_eq!(state.score, state.tuning.boss_score);
    }

    #[test]
    fn test_invulnerable_ship_cannot_be_rammed() {
        let mut state = playing(19);
        pacify(&mut state);
        state.enemies.truncate(2);
        state.enemies[0].mover.pos = state.ship.pos;
        state.ship.extend_invulnerability(1.0);
        let hp = state.enemies[0].hp;

        tick(&mut state, &TickInput::default(), FRAME_DT);
        assert_eq!(state.life, 5);
        assert_eq!(state.enemies[0].hp, hp);
        assert_eq!(state.enemies.len(), 2);
    }
}
