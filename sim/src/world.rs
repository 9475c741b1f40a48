//! Game state machine and snapshot types.
//!
//! The `FrameSnapshot` struct provides a serializable view of one frame that
//! external renderers, tools, and tests can consume without touching the ECS.

use crate::components::*;
use crate::spatial::{CellCoord, SpatialGrid};
use crate::systems::collision::KillCount;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Top-level game state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Playing,
    GameOver,
}

impl GameState {
    /// Next state given this frame's player health and restart input.
    ///
    /// - Playing → GameOver when the player is dead
    /// - GameOver → Playing on restart
    pub fn next(self, player_dead: bool, restart: bool) -> GameState {
        match self {
            GameState::Playing if player_dead => GameState::GameOver,
            GameState::GameOver if restart => GameState::Playing,
            state => state,
        }
    }
}

/// Snapshot of the player ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: f32,
    pub health: f32,
    pub health_max: f32,
}

/// Snapshot of an enemy ship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub facing: f32,
    pub health: f32,
    pub health_max: f32,
    pub variant: usize,
    pub engaging: bool,
}

/// Snapshot of a projectile in flight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Firing enemy's id; `None` for the player.
    pub owner: Option<u32>,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

/// Complete state of one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Frames simulated since creation.
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub time: f32,
    pub state: GameState,
    pub kills: u32,
    pub player: Option<PlayerSnapshot>,
    /// Enemies in ascending id order.
    pub enemies: Vec<EnemySnapshot>,
    /// Player projectiles first, then each enemy's in id order.
    pub projectiles: Vec<ProjectileSnapshot>,
    /// Resident chunk coordinates, sorted.
    pub chunks: Vec<CellCoord>,
}

impl FrameSnapshot {
    /// Create a snapshot from the ECS world.
    pub fn from_world(world: &mut World, tick: u64, time: f32, state: GameState) -> Self {
        let mut projectiles = Vec::new();

        let mut player_query = world.query_filtered::<(
            &Position,
            &Velocity,
            &Facing,
            &Health,
            &Projectiles,
        ), With<Player>>();
        let player = player_query
            .iter(world)
            .next()
            .map(|(pos, vel, facing, health, shots)| {
                projectiles.extend(shots.iter().map(|p| shot_snapshot(None, p)));
                PlayerSnapshot {
                    x: pos.x,
                    y: pos.y,
                    vx: vel.vx,
                    vy: vel.vy,
                    facing: facing.degrees,
                    health: health.current,
                    health_max: health.max,
                }
            });

        let mut enemy_query = world.query::<(
            &Enemy,
            &Position,
            &Velocity,
            &Facing,
            &Health,
            &Appearance,
            &Awareness,
            &Projectiles,
        )>();
        let mut rows: Vec<_> = enemy_query.iter(world).collect();
        rows.sort_by_key(|row| *row.0);

        let mut enemies = Vec::with_capacity(rows.len());
        for (id, pos, vel, facing, health, appearance, awareness, shots) in rows {
            enemies.push(EnemySnapshot {
                id: id.0,
                x: pos.x,
                y: pos.y,
                vx: vel.vx,
                vy: vel.vy,
                facing: facing.degrees,
                health: health.current,
                health_max: health.max,
                variant: appearance.variant,
                engaging: awareness.is_engaging(),
            });
            projectiles.extend(shots.iter().map(|p| shot_snapshot(Some(id.0), p)));
        }

        let kills = world.get_resource::<KillCount>().map(|k| k.0).unwrap_or(0);
        let chunks = world
            .get_resource::<SpatialGrid>()
            .map(|grid| grid.resident_cells())
            .unwrap_or_default();

        Self {
            tick,
            time,
            state,
            kills,
            player,
            enemies,
            projectiles,
            chunks,
        }
    }

    /// Serialize snapshot to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize snapshot to pretty JSON string.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Read back a snapshot written by `to_json`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

fn shot_snapshot(owner: Option<u32>, p: &Projectile) -> ProjectileSnapshot {
    ProjectileSnapshot {
        owner,
        x: p.x,
        y: p.y,
        vx: p.vx,
        vy: p.vy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    #[test]
    fn test_state_transitions() {
        use GameState::*;
        assert_eq!(Playing.next(false, true), Playing);
        assert_eq!(Playing.next(true, false), GameOver);
        assert_eq!(GameOver.next(true, false), GameOver);
        assert_eq!(GameOver.next(false, false), GameOver);
        assert_eq!(GameOver.next(true, true), Playing);
    }

    #[test]
    fn test_snapshot_orders_enemies_and_projectiles() {
        let config = SimConfig::default();
        let mut world = World::new();
        world.insert_resource(KillCount(4));

        let mut player = PlayerBundle::new(&config, None);
        player.projectiles.0.push(Projectile { x: 1.0, y: 2.0, vx: 0.0, vy: -800.0 });
        world.spawn(player);

        let mut late = EnemyBundle::new(9, 10.0, 0.0, 2, &config, None);
        late.projectiles.0.push(Projectile { x: 9.0, y: 9.0, vx: 0.0, vy: 0.0 });
        world.spawn(late);
        world.spawn(EnemyBundle::new(3, 20.0, 0.0, 1, &config, None));

        let snapshot = FrameSnapshot::from_world(&mut world, 7, 0.5, GameState::Playing);

        assert_eq!(snapshot.kills, 4);
        assert_eq!(snapshot.player.map(|p| p.health), Some(200.0));
        assert_eq!(snapshot.enemies.iter().map(|e| e.id).collect::<Vec<_>>(), vec![3, 9]);
        assert_eq!(
            snapshot.projectiles.iter().map(|p| p.owner).collect::<Vec<_>>(),
            vec![None, Some(9)]
        );
        assert!(snapshot.chunks.is_empty());

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"Playing\""));
    }

    #[test]
    fn test_snapshot_json_roundtrip() {
        let snapshot = FrameSnapshot {
            tick: 42,
            time: 2.1,
            state: GameState::GameOver,
            kills: 3,
            player: None,
            enemies: vec![EnemySnapshot {
                id: 1,
                x: 10.0,
                y: 20.0,
                vx: 1.0,
                vy: 0.0,
                facing: -90.0,
                health: 25.0,
                health_max: 50.0,
                variant: 2,
                engaging: true,
            }],
            projectiles: vec![ProjectileSnapshot {
                owner: Some(1),
                x: 0.0,
                y: 0.0,
                vx: 800.0,
                vy: 0.0,
            }],
            chunks: vec![CellCoord::new(-1, 0)],
        };

        let restored = FrameSnapshot::from_json(&snapshot.to_json().unwrap()).unwrap();
        assert_eq!(restored.tick, 42);
        assert_eq!(restored.state, GameState::GameOver);
        assert_eq!(restored.enemies[0].id, 1);
        assert_eq!(restored.projectiles[0].owner, Some(1));
        assert_eq!(restored.chunks, vec![CellCoord::new(-1, 0)]);

        assert!(FrameSnapshot::from_json("{\"tick\": \"soon\"}").is_err());
    }
}
