//! Enemy spawning and removal.

use crate::assets::GameTextures;
use crate::components::*;
use crate::config::SimConfig;
use crate::systems::movement::DeltaTime;
use bevy_ecs::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::TAU;
use tracing::debug;

/// Number of enemy sprite variants.
pub const ENEMY_VARIANTS: usize = 3;

/// Time accumulated toward the next enemy spawn.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct SpawnTimer {
    pub elapsed: f32,
    pub interval: f32,
}

impl SpawnTimer {
    pub fn new(interval: f32) -> Self {
        Self {
            elapsed: 0.0,
            interval,
        }
    }

    /// Add `dt`; returns true (and starts over from zero) once the interval is reached.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            self.elapsed = 0.0;
            true
        } else {
            false
        }
    }
}

/// RNG driving spawn angle, distance and variant.
#[derive(Resource, Debug)]
pub struct SpawnRng(pub StdRng);

impl SpawnRng {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(StdRng::seed_from_u64(seed)),
            None => Self(StdRng::from_entropy()),
        }
    }
}

/// Next id handed to a spawned enemy. Ids increase in spawn order.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NextEnemyId(pub u32);

/// System that spawns one enemy around the player each time the spawn interval elapses.
///
/// The enemy appears at a random angle and a random distance in
/// `[spawn_distance_min, spawn_distance_max)` from the player.
pub fn enemy_spawn_system(
    mut commands: Commands,
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    textures: Res<GameTextures>,
    mut timer: ResMut<SpawnTimer>,
    mut rng: ResMut<SpawnRng>,
    mut next_id: ResMut<NextEnemyId>,
    player: Query<&Position, With<Player>>,
) {
    if !timer.tick(dt.0) {
        return;
    }
    let Ok(player_pos) = player.get_single() else {
        return;
    };

    let angle = rng.0.gen_range(0.0..TAU);
    let distance = if config.spawn_distance_max > config.spawn_distance_min {
        rng.0
            .gen_range(config.spawn_distance_min..config.spawn_distance_max)
    } else {
        config.spawn_distance_min
    };
    let variant = rng.0.gen_range(0..ENEMY_VARIANTS);

    let x = player_pos.x + angle.cos() * distance;
    let y = player_pos.y + angle.sin() * distance;
    let id = next_id.0;
    next_id.0 += 1;

    commands.spawn(EnemyBundle::new(
        id,
        x,
        y,
        variant,
        &config,
        textures.enemy(variant),
    ));
    debug!(enemy = id, x, y, variant, "enemy spawned");
}

/// System that removes enemies whose health reached zero.
pub fn despawn_dead_system(
    mut commands: Commands,
    query: Query<(Entity, &Enemy, &Health)>,
) {
    for (entity, enemy, health) in query.iter() {
        if health.is_dead() {
            commands.entity(entity).despawn();
            debug!(enemy = enemy.0, "enemy despawned");
        }
    }
}
