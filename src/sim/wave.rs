//! Wave progression
//!
//! Every `boss_every`-th level is a single boss with level-scaled hit
//! points; other levels spawn `base + level * per_level` enemies, mixing in
//! Ring enemies once the player is past the first boss.

use glam::Vec2;
use rand::Rng;

use super::entity::Enemy;
use super::state::GameState;
use crate::consts::*;
use crate::lerp_random;

/// Spawn the wave for `state.level`
pub fn new_wave(state: &mut GameState) {
    let level = state.level;
    if state.tuning.is_boss_level(level) {
        let hp = state.tuning.boss_hp(level);
        log::info!("Wave {}: boss with {} hp", level, hp);
        create_boss(state, hp);
    } else {
        let count = state.tuning.wave_size(level);
        log::info!("Wave {}: {} enemies", level, count);
        create_enemies(state, count);
    }
}

/// Spawn `count` regular enemies just above the arena
pub fn create_enemies(state: &mut GameState, count: u32) {
    for _ in 0..count {
        let rng = state.rng();
        let x = rng.random::<f32>() * (ARENA_WIDTH - 150.0) + 75.0;
        let y = lerp_random(rng, 0.0, -50.0);
        create_enemy(state, Vec2::new(x, y));
    }
}

/// Spawn one regular enemy, Ring or Basic depending on the level
pub fn create_enemy(state: &mut GameState, pos: Vec2) {
    let level = state.level;
    let id = state.next_entity_id();
    let roll = lerp_random(state.rng(), 0.0, 10.0);
    let ring = level > state.tuning.boss_every && roll < level as f32 / state.tuning.boss_every as f32;

    let tuning = state.tuning.clone();
    let enemy = if ring {
        Enemy::ring(id, pos, state.rng(), &tuning)
    } else {
        Enemy::basic(id, pos, state.rng(), &tuning)
    };
    state.spawn_enemy(enemy);
}

/// Spawn the boss above the arena center; the background slows for its entry
pub fn create_boss(state: &mut GameState, hp: i32) {
    let id = state.next_entity_id();
    let boss = Enemy::boss(
        id,
        Vec2::new(ARENA_WIDTH / 2.0, -50.0),
        hp,
        state.level,
        &state.tuning,
    );
    state.background.speed = BG_SPEED_BOSS_ENTRY;
    state.spawn_enemy(boss);
}
