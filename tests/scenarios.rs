//! End-to-end session scenarios driven through the public API

use std::collections::HashSet;

use danmaku::consts::{FRAME_DT, METER_MAX};
use danmaku::sim::{
    Damage, Enemy, EntityKind, GameEvent, GamePhase, GameState, TickInput, tick,
};
use danmaku::Tuning;
use glam::Vec2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_pcg::Pcg32;

fn started(seed: u64) -> GameState {
    let mut state = GameState::new(seed);
    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start, FRAME_DT);
    state.drain_events();
    state
}

/// Leave exactly one enemy, parked mid-arena and holding fire
fn lone_enemy(state: &mut GameState) {
    state.enemies.truncate(1);
    let enemy = &mut state.enemies[0];
    enemy.mover.pos = Vec2::new(300.0, 150.0);
    enemy.mover.speed = 0.0;
    enemy.fire = danmaku::sim::CooldownTimer::new(1000.0, 0.0, false);
}

#[test]
fn enemy_dies_on_third_hit_and_is_removed() {
    let mut rng = Pcg32::seed_from_u64(1);
    let mut enemy = Enemy::basic(1, Vec2::new(100.0, 100.0), &mut rng, &Tuning::default());
    assert_eq!(enemy.hp, 3);
    assert_eq!(enemy.take_damage(1), Damage::Wounded);
    assert_eq!(enemy.take_damage(1), Damage::Wounded);
    assert_eq!(enemy.take_damage(1), Damage::Killed);

    // Same thing inside a session: gone after the next cleanup
    let mut state = started(1);
    lone_enemy(&mut state);
    let spare = state.enemies[0].clone();
    state.enemies.push(Enemy { id: 999, ..spare });
    let id = state.enemies[0].id;
    assert!(!state.hit_enemy(0, 1));
    assert!(!state.hit_enemy(0, 1));
    assert!(state.hit_enemy(0, 1));
    assert!(state.enemies.iter().any(|e| e.id == id));

    tick(&mut state, &TickInput::default(), FRAME_DT);
    assert!(state.enemies.iter().all(|e| e.id != id));
    assert!(
        state
            .drain_events()
            .iter()
            .any(|e| *e == GameEvent::Despawned { id })
    );
}

#[test]
fn bullet_on_vulnerable_ship_costs_one_life() {
    let mut state = started(2);
    lone_enemy(&mut state);
    assert!(!state.ship.is_invulnerable());
    let pos = state.ship.pos;
    state.spawn_bullet(pos, Vec2::Y);
    state.bullets[0].mover.speed = 0.0;
    let id = state.bullets[0].id;

    tick(&mut state, &TickInput::default(), FRAME_DT);
    assert_eq!(state.life, 4);
    assert!(state.bullets.iter().all(|b| b.id != id));
}

#[test]
fn level_eight_is_a_boss_wave() {
    let mut state = started(3);
    state.level = 7;
    state.enemies.clear();

    tick(&mut state, &TickInput::default(), FRAME_DT);
    assert_eq!(state.level, 8);
    assert_eq!(state.enemies.len(), 1);
    assert!(state.enemies[0].is_boss());
    assert_eq!(state.enemies[0].hp, 130);
    assert!(
        state
            .drain_events()
            .iter()
            .any(|e| matches!(e, GameEvent::Spawned { kind: EntityKind::Boss, .. }))
    );
}

#[test]
fn time_slow_runs_for_two_seconds() {
    let mut state = started(4);
    lone_enemy(&mut state);
    state.meter = 150;
    state.enemies[0].mover.speed = 60.0;
    state.enemies[0].mover.heading = Vec2::Y;

    let special = TickInput {
        special: true,
        ..Default::default()
    };
    tick(&mut state, &special, FRAME_DT);
    assert_eq!(state.meter, 50);
    assert!(state.ship.is_invulnerable());
    assert_eq!(state.time_mod, 0.25);

    let y = state.enemies[0].mover.pos.y;
    tick(&mut state, &TickInput::default(), FRAME_DT);
    let slow_step = state.enemies[0].mover.pos.y - y;
    assert!((slow_step - 60.0 * FRAME_DT * 0.25).abs() < 1e-3);

    // Still slow at 1.9s
    for _ in 0..112 {
        tick(&mut state, &TickInput::default(), FRAME_DT);
    }
    assert_eq!(state.time_mod, 0.25);

    for _ in 0..10 {
        tick(&mut state, &TickInput::default(), FRAME_DT);
    }
    assert_eq!(state.time_mod, 1.0);
    let y = state.enemies[0].mover.pos.y;
    tick(&mut state, &TickInput::default(), FRAME_DT);
    let full_step = state.enemies[0].mover.pos.y - y;
    assert!((full_step - 60.0 * FRAME_DT).abs() < 1e-3);
}

#[test]
fn same_seed_same_session() {
    let script = |frame: u32| TickInput {
        left: frame % 120 < 60,
        right: frame % 120 >= 60,
        fire: true,
        focus: frame % 300 > 200,
        ..Default::default()
    };
    let run = |seed: u64| {
        let mut state = started(seed);
        for frame in 0..1200 {
            tick(&mut state, &script(frame), FRAME_DT);
        }
        let positions: Vec<Vec2> = state.enemies.iter().map(|e| e.mover.pos).collect();
        (state.score, state.level, state.life, state.meter, positions)
    };
    assert_eq!(run(77), run(77));
}

#[test]
fn restart_after_game_over() {
    let mut state = started(5);
    state.life = 1;
    let pos = state.ship.pos;
    state.spawn_bullet(pos, Vec2::Y);
    tick(&mut state, &TickInput::default(), FRAME_DT);
    assert_eq!(state.phase, GamePhase::GameOver);

    let start = TickInput {
        start: true,
        ..Default::default()
    };
    tick(&mut state, &start, FRAME_DT);
    assert_eq!(state.phase, GamePhase::Playing);
    assert_eq!(state.life, 5);
    assert_eq!(state.score, 0);
    assert_eq!(state.level, 1);
    assert_eq!(state.time_mod, 1.0);
}

fn input_strategy() -> impl Strategy<Value = TickInput> {
    (any::<[bool; 7]>()).prop_map(|k| TickInput {
        left: k[0],
        right: k[1],
        up: k[2],
        down: k[3],
        focus: k[4],
        fire: k[5],
        special: k[6],
        ..Default::default()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn session_counters_stay_sane(
        seed in any::<u64>(),
        inputs in prop::collection::vec(input_strategy(), 1..400),
    ) {
        let mut state = started(seed);
        let mut grazed: HashSet<u32> = HashSet::new();
        let mut last_score = state.score;
        let mut last_life = state.life;

        for input in &inputs {
            tick(&mut state, input, FRAME_DT);
            if state.phase != GamePhase::Playing {
                break;
            }

            prop_assert!(state.score >= last_score);
            prop_assert!(state.life <= last_life);
            prop_assert!((0..=METER_MAX).contains(&state.meter));
            prop_assert!(state.time_mod == 1.0 || state.time_mod == 0.25);

            // A grazed bullet never becomes ungrazed
            for bullet in &state.bullets {
                if grazed.contains(&bullet.id) {
                    prop_assert!(bullet.is_grazed());
                }
                if bullet.is_grazed() {
                    grazed.insert(bullet.id);
                }
            }

            last_score = state.score;
            last_life = state.life;
        }
    }
}
