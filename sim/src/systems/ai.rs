//! AI systems for enemy ships.
//!
//! Enemies have no behavior states: every frame they look at the player, head
//! straight for it, and ease off to strafe once they are close and on screen.
//!
//! ## Data Access
//! - `enemy_awareness_system`: reads player Position, Camera, SimConfig; writes Awareness
//! - `enemy_aim_system`: reads player Position; writes enemy Facing
//! - `enemy_steering_system`: reads Awareness; writes enemy Velocity

use crate::components::*;
use crate::config::SimConfig;
use crate::view::Camera;
use bevy_ecs::prelude::*;

// ============================================================================
// AWARENESS SYSTEM
// ============================================================================

/// System that works out each enemy's range and visibility to the player.
pub fn enemy_awareness_system(
    config: Res<SimConfig>,
    camera: Res<Camera>,
    player: Query<&Position, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&Position, &EnemyStats, &mut Awareness), With<Enemy>>,
) {
    let Ok(player_pos) = player.get_single() else {
        return;
    };
    let view = camera.bounds().expanded(config.view_margin);

    for (pos, stats, mut awareness) in enemies.iter_mut() {
        let distance = pos.distance_to(player_pos);
        *awareness = Awareness {
            distance,
            in_range: stats.in_shooting_range(distance),
            visible: view.contains(pos.x, pos.y),
            can_see_player: stats.can_detect(distance),
        };
    }
}

// ============================================================================
// AIM SYSTEM
// ============================================================================

/// System that snaps every enemy's heading onto the player.
pub fn enemy_aim_system(
    player: Query<&Position, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&Position, &mut Facing), With<Enemy>>,
) {
    let Ok(player_pos) = player.get_single() else {
        return;
    };
    for (pos, mut facing) in enemies.iter_mut() {
        if let Some(target) = Facing::toward(pos, player_pos) {
            *facing = target;
        }
    }
}

// ============================================================================
// STEERING SYSTEM
// ============================================================================

/// System that points enemy velocity at the player.
///
/// Engaging enemies drop to a fraction of their speed so they hover and fire.
/// An enemy sitting exactly on the player keeps its previous velocity.
pub fn enemy_steering_system(
    player: Query<&Position, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&Position, &EnemyStats, &Awareness, &mut Velocity), With<Enemy>>,
) {
    let Ok(player_pos) = player.get_single() else {
        return;
    };
    for (pos, stats, awareness, mut vel) in enemies.iter_mut() {
        if let Some((dx, dy)) = pos.direction_to(player_pos) {
            vel.vx = dx * stats.speed;
            vel.vy = dy * stats.speed;
        }
        if awareness.is_engaging() {
            vel.vx *= stats.engaged_speed_factor;
            vel.vy *= stats.engaged_speed_factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(enemy_at: (f32, f32)) -> (World, Entity) {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(Camera::new(0.0, 0.0, 192.0, 108.0));
        world.spawn((Player, Position::new(0.0, 0.0)));
        let enemy = world
            .spawn(EnemyBundle::new(0, enemy_at.0, enemy_at.1, 0, &config, None))
            .id();
        world.insert_resource(config);
        (world, enemy)
    }

    fn run(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (enemy_awareness_system, enemy_aim_system, enemy_steering_system).chain(),
        );
        schedule.run(world);
    }

    #[test]
    fn test_close_visible_enemy_engages() {
        let (mut world, enemy) = setup((50.0, 0.0));
        run(&mut world);

        let awareness = world.get::<Awareness>(enemy).unwrap();
        assert!(awareness.in_range);
        assert!(awareness.visible);
        assert!(awareness.is_engaging());

        // Heading toward the player at 30% speed
        let vel = world.get::<Velocity>(enemy).unwrap();
        assert!((vel.vx + 60.0).abs() < 1e-3);
        assert!(vel.vy.abs() < 1e-3);

        let facing = world.get::<Facing>(enemy).unwrap();
        assert!((facing.degrees.abs() - 180.0).abs() < 1e-3);
    }

    #[test]
    fn test_distant_enemy_charges_at_full_speed() {
        let (mut world, enemy) = setup((0.0, 400.0));
        run(&mut world);

        let awareness = world.get::<Awareness>(enemy).unwrap();
        assert!(!awareness.in_range);
        assert!(!awareness.visible);
        assert!(awareness.can_see_player);

        let vel = world.get::<Velocity>(enemy).unwrap();
        assert!((vel.vy + 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_detection_range_does_not_gate_movement() {
        let (mut world, enemy) = setup((900.0, 0.0));
        run(&mut world);

        assert!(!world.get::<Awareness>(enemy).unwrap().can_see_player);
        let vel = world.get::<Velocity>(enemy).unwrap();
        assert!((vel.vx + 200.0).abs() < 1e-3);
    }
}
