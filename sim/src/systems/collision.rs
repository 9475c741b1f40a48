//! Collision system - projectile hits and ship contact damage.
//!
//! Runs once per frame after every ship and projectile has moved. All tests
//! are axis-aligned box overlaps with strict edges.
//!
//! ## Phases
//!
//! 1. **Gather** - for each player projectile, list the enemies its box
//!    overlaps. Read-only, so with `--features parallel` it runs on rayon.
//! 2. **Apply** - walk the gathered hits in projectile order and deal damage.
//!    Sequential: whether a later projectile finds a live target depends on
//!    what earlier ones did.
//!
//! Enemy projectiles are then tested against the player, all of them before
//! any ship body, both in ascending enemy id.

use crate::components::*;
use crate::config::SimConfig;
use crate::view::Aabb;
use bevy_ecs::prelude::*;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Enemies destroyed by the player since the last restart.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct KillCount(pub u32);

/// An enemy as the gather phase sees it.
#[derive(Debug, Clone, Copy)]
struct Target {
    entity: Entity,
    bounds: Aabb,
}

/// Indices into `targets` (ascending) whose boxes `shot` overlaps.
fn overlapping(shot: &Aabb, targets: &[Target]) -> Vec<usize> {
    targets
        .iter()
        .enumerate()
        .filter(|(_, t)| shot.intersects(&t.bounds))
        .map(|(i, _)| i)
        .collect()
}

/// System that resolves every collision for the frame.
///
/// ## Data Access
/// - Reads: SimConfig, Enemy, Position, Hitbox, EnemyStats
/// - Writes: Health, ContactCooldown, Projectiles, KillCount
pub fn collision_system(
    config: Res<SimConfig>,
    mut kills: ResMut<KillCount>,
    mut player: Query<
        (&Position, &Hitbox, &mut Health, &mut ContactCooldown, &mut Projectiles),
        (With<Player>, Without<Enemy>),
    >,
    mut enemies: Query<
        (Entity, &Enemy, &Position, &Hitbox, &EnemyStats, &mut Health, &mut Projectiles),
        Without<Player>,
    >,
) {
    let Ok((player_pos, player_hitbox, mut player_health, mut contact, mut shots)) =
        player.get_single_mut()
    else {
        return;
    };

    // Ascending id = spawn order
    let mut ordered: Vec<(Enemy, Target)> = enemies
        .iter()
        .map(|(entity, id, pos, hitbox, _, _, _)| {
            (
                *id,
                Target {
                    entity,
                    bounds: hitbox.at(pos),
                },
            )
        })
        .collect();
    ordered.sort_by_key(|(id, _)| *id);
    let targets: Vec<Target> = ordered.into_iter().map(|(_, t)| t).collect();

    // GATHER
    let shot_bounds: Vec<Aabb> = shots
        .iter()
        .map(|p| p.bounds(config.projectile_half_extent))
        .collect();

    #[cfg(feature = "parallel")]
    let candidates: Vec<Vec<usize>> = shot_bounds
        .par_iter()
        .map(|shot| overlapping(shot, &targets))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let candidates: Vec<Vec<usize>> = shot_bounds
        .iter()
        .map(|shot| overlapping(shot, &targets))
        .collect();

    // APPLY
    let mut hit = vec![false; candidates.len()];
    for (shot_index, overlaps) in candidates.iter().enumerate() {
        for &target_index in overlaps {
            let entity = targets[target_index].entity;
            let Ok((_, id, _, _, _, mut health, _)) = enemies.get_mut(entity) else {
                continue;
            };
            if health.is_dead() {
                continue;
            }
            health.take_damage(config.projectile_damage);
            hit[shot_index] = true;
            if health.is_dead() {
                kills.0 += 1;
                debug!(enemy = id.0, kills = kills.0, "enemy destroyed");
            }
            break;
        }
    }

    if config.consume_player_projectiles_on_hit {
        let mut flags = hit.iter();
        shots.0.retain(|_| !flags.next().copied().unwrap_or(false));
    }

    let player_box = player_hitbox.at(player_pos);

    // Enemy fire: every enemy's shots land before any ramming is considered
    for target in &targets {
        let Ok((_, _, _, _, stats, _, mut enemy_shots)) = enemies.get_mut(target.entity) else {
            continue;
        };
        let before = enemy_shots.len();
        enemy_shots.0.retain(|p| !p.bounds(config.projectile_half_extent).intersects(&player_box));
        let landed = before - enemy_shots.len();
        for _ in 0..landed {
            damage_player(&mut player_health, &mut contact, stats.contact_damage);
        }
    }

    // Ramming
    for target in &targets {
        if !contact.is_ready() {
            break;
        }
        if !target.bounds.intersects(&player_box) {
            continue;
        }
        if let Ok((_, _, _, _, stats, _, _)) = enemies.get(target.entity) {
            damage_player(&mut player_health, &mut contact, stats.contact_damage);
        }
    }
}
