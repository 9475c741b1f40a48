//! Combat systems - weapon cooldowns, firing, and projectile flight.
//!
//! Every ship owns its projectiles. Shots fly in a straight line and are only
//! removed when they leave the camera view expanded by `view_margin`; there is
//! no lifetime or range limit.

use crate::components::*;
use crate::config::SimConfig;
use crate::input::InputState;
use crate::systems::movement::DeltaTime;
use crate::view::Camera;
use bevy_ecs::prelude::*;
use tracing::trace;

/// System that recharges weapons on entities tagged `T`.
pub fn weapon_cooldown_system<T: Component>(
    dt: Res<DeltaTime>,
    mut query: Query<&mut Weapon, With<T>>,
) {
    for mut weapon in query.iter_mut() {
        weapon.tick(dt.0);
    }
}

/// System that fires the player's gun along its heading while the trigger is held.
pub fn player_fire_system(
    config: Res<SimConfig>,
    input: Res<InputState>,
    mut query: Query<(&Position, &Facing, &mut Weapon, &mut Projectiles), With<Player>>,
) {
    if !input.fire {
        return;
    }
    for (pos, facing, mut weapon, mut projectiles) in query.iter_mut() {
        if weapon.try_fire() {
            projectiles.0.push(Projectile::launch(
                pos.x,
                pos.y,
                facing.direction(),
                config.projectile_spawn_offset,
                config.projectile_speed,
            ));
            trace!(x = pos.x, y = pos.y, heading = facing.degrees, "player fired");
        }
    }
}

/// System that lets engaging enemies shoot at the player.
///
/// Range and visibility are checked from the position the shot leaves from,
/// after this frame's movement.
pub fn enemy_fire_system(
    config: Res<SimConfig>,
    camera: Res<Camera>,
    player: Query<&Position, (With<Player>, Without<Enemy>)>,
    mut enemies: Query<(&Enemy, &Position, &EnemyStats, &mut Weapon, &mut Projectiles)>,
) {
    let Ok(player_pos) = player.get_single() else {
        return;
    };
    let view = camera.bounds().expanded(config.view_margin);
    for (enemy, pos, stats, mut weapon, mut projectiles) in enemies.iter_mut() {
        let engaging =
            stats.in_shooting_range(pos.distance_to(player_pos)) && view.contains(pos.x, pos.y);
        if !engaging || !weapon.is_ready() {
            continue;
        }
        // No direction to shoot in when stacked on the player
        let Some(dir) = pos.direction_to(player_pos) else {
            continue;
        };
        weapon.try_fire();
        projectiles.0.push(Projectile::launch(
            pos.x,
            pos.y,
            dir,
            config.projectile_spawn_offset,
            config.projectile_speed,
        ));
        trace!(enemy = enemy.0, "enemy fired");
    }
}

/// System that moves projectiles owned by `T` and drops the ones that left
/// the expanded view.
pub fn projectile_system<T: Component>(
    dt: Res<DeltaTime>,
    config: Res<SimConfig>,
    camera: Res<Camera>,
    mut query: Query<&mut Projectiles, With<T>>,
) {
    let keep = camera.bounds().expanded(config.view_margin);
    for mut projectiles in query.iter_mut() {
        for projectile in projectiles.0.iter_mut() {
            projectile.advance(dt.0);
        }
        projectiles.0.retain(|p| keep.contains(p.x, p.y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::ai::{enemy_aim_system, enemy_awareness_system, enemy_steering_system};
    use crate::systems::movement::movement_system;

    fn player_world(dt: f32) -> (World, Entity) {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(DeltaTime(dt));
        world.insert_resource(Camera::new(0.0, 0.0, 192.0, 108.0));
        world.insert_resource(InputState {
            fire: true,
            ..Default::default()
        });
        let mut bundle = PlayerBundle::new(&config, None);
        bundle.position = Position::new(0.0, 0.0);
        let player = world.spawn(bundle).id();
        world.insert_resource(config);
        (world, player)
    }

    fn fire_schedule() -> Schedule {
        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                weapon_cooldown_system::<Player>,
                player_fire_system,
                projectile_system::<Player>,
            )
                .chain(),
        );
        schedule
    }

    #[test]
    fn test_player_fires_after_cooldown() {
        let (mut world, player) = player_world(0.1);
        let mut schedule = fire_schedule();

        // 0.25s cooldown: frames at t=0.1, 0.2 are too early
        schedule.run(&mut world);
        schedule.run(&mut world);
        assert!(world.get::<Projectiles>(player).unwrap().is_empty());

        schedule.run(&mut world);
        let projectiles = world.get::<Projectiles>(player).unwrap();
        assert_eq!(projectiles.len(), 1);
        // Heading 0° fires along +x from 25 units ahead, then moves one frame
        let shot = projectiles.0[0];
        assert!((shot.x - (25.0 + 80.0)).abs() < 1e-3);
        assert_eq!(shot.vy, 0.0);
    }

    #[test]
    fn test_cooldown_holds_for_any_frame_split() {
        let cooldown = SimConfig::default().player_shoot_cooldown;
        for dts in [
            vec![0.016_f32; 200],
            vec![0.1; 40],
            vec![0.07, 0.3, 0.01, 0.01, 0.2, 0.05, 0.5, 0.02, 0.02, 0.02, 0.25, 0.24, 0.26],
        ] {
            let (mut world, _) = player_world(0.0);
            let mut schedule = Schedule::default();
            schedule.add_systems(
                (weapon_cooldown_system::<Player>, player_fire_system).chain(),
            );

            let mut now = 0.0_f32;
            let mut shots = Vec::new();
            for dt in dts {
                world.resource_mut::<DeltaTime>().0 = dt;
                schedule.run(&mut world);
                now += dt;
                let mut query = world.query_filtered::<&Projectiles, With<Player>>();
                let fired = query.single(&world).len();
                if fired > shots.len() {
                    shots.push(now);
                }
            }

            assert!(shots.len() > 1);
            for pair in shots.windows(2) {
                assert!(pair[1] - pair[0] >= cooldown - 1e-4, "shots at {:?}", pair);
            }
        }
    }

    #[test]
    fn test_projectiles_outside_view_are_culled() {
        let (mut world, player) = player_world(0.1);
        world.resource_mut::<InputState>().fire = false;
        world.get_mut::<Projectiles>(player).unwrap().0 = vec![
            Projectile { x: 0.0, y: 0.0, vx: 0.0, vy: 0.0 },
            // Moves past the right edge (96 + 100) this frame
            Projectile { x: 190.0, y: 0.0, vx: 800.0, vy: 0.0 },
            Projectile { x: 10.0, y: 10.0, vx: 0.0, vy: 0.0 },
            Projectile { x: 0.0, y: -150.0, vx: 0.0, vy: -100.0 },
            Projectile { x: -5.0, y: 5.0, vx: 0.0, vy: 0.0 },
        ];

        let mut schedule = fire_schedule();
        schedule.run(&mut world);

        let remaining: Vec<_> = world
            .get::<Projectiles>(player)
            .unwrap()
            .iter()
            .map(|p| (p.x, p.y))
            .collect();
        assert_eq!(remaining, vec![(0.0, 0.0), (10.0, 10.0), (-5.0, 5.0)]);

        // Stays gone on later frames
        schedule.run(&mut world);
        assert_eq!(world.get::<Projectiles>(player).unwrap().len(), 3);
    }

    #[test]
    fn test_enemy_fires_when_engaging() {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(DeltaTime(1.0));
        world.insert_resource(Camera::new(0.0, 0.0, 192.0, 108.0));
        world.spawn((Player, Position::new(0.0, 0.0)));
        let enemy = world
            .spawn(EnemyBundle::new(0, 50.0, 0.0, 0, &config, None))
            .id();
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems((weapon_cooldown_system::<Enemy>, enemy_fire_system).chain());
        schedule.run(&mut world);

        let projectiles = world.get::<Projectiles>(enemy).unwrap();
        assert_eq!(projectiles.len(), 1);
        let shot = projectiles.0[0];
        assert!((shot.x - 25.0).abs() < 1e-3);
        assert!((shot.vx + 800.0).abs() < 1e-3);
        assert_eq!(world.get::<Weapon>(enemy).unwrap().since_shot, 0.0);

        // Off screen: weapon stays charged, nothing fired
        world.resource_mut::<Camera>().recenter(1000.0, 1000.0);
        schedule.run(&mut world);
        assert_eq!(world.get::<Projectiles>(enemy).unwrap().len(), 1);
        assert!(world.get::<Weapon>(enemy).unwrap().is_ready());
    }

    #[test]
    fn test_enemy_fires_once_it_closes_into_range() {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(DeltaTime(0.1));
        world.insert_resource(Camera::new(0.0, 0.0, 192.0, 108.0));
        world.spawn((Player, Position::new(0.0, 0.0)));
        // 80 units out: 120 > 100, so out of range before moving
        let mut bundle = EnemyBundle::new(0, 80.0, 0.0, 0, &config, None);
        bundle.weapon.since_shot = bundle.weapon.cooldown;
        let enemy = world.spawn(bundle).id();
        world.insert_resource(config);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                weapon_cooldown_system::<Enemy>,
                enemy_awareness_system,
                enemy_aim_system,
                enemy_steering_system,
                movement_system::<Enemy>,
                enemy_fire_system,
            )
                .chain(),
        );
        schedule.run(&mut world);

        // Charged at full speed to x=60 (90 <= 100), then fired from there
        assert!(!world.get::<Awareness>(enemy).unwrap().in_range);
        assert!((world.get::<Position>(enemy).unwrap().x - 60.0).abs() < 1e-3);
        let projectiles = world.get::<Projectiles>(enemy).unwrap();
        assert_eq!(projectiles.len(), 1);
        assert!((projectiles.0[0].x - 35.0).abs() < 1e-3);
    }
}
