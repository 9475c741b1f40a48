//! Public API for the simulation.
//!
//! This module provides the main interface for a host application (window,
//! renderer, input devices) to drive the game.
//!
//! ## Variable Timestep
//!
//! Each call to `step(dt, input)` runs exactly one frame with the given `dt`.
//! There is no accumulator: the host measures wall-clock time once per frame
//! and passes it straight through. `run` does this measuring itself.
//!
//! ## Game State
//!
//! The game is either `Playing` or `GameOver`. While game over, the schedule
//! does not run; only restart and quit input are honored.

use crate::assets::{AssetCache, GameTextures};
use crate::components::*;
use crate::config::SimConfig;
use crate::error::SimError;
use crate::input::{InputSource, InputState};
use crate::render::{RenderSurface, SpriteDraw, SpriteKind, SurfaceEvent};
use crate::spatial::{chunk_streaming_system, SpatialGrid};
use crate::systems::*;
use crate::view::Camera;
use crate::world::{FrameSnapshot, GameState};
use bevy_ecs::prelude::*;
use std::time::Instant;
use tracing::info;

/// What `render` reads to draw a ship and its shots.
type ShipSprite = (
    &'static Position,
    &'static Facing,
    &'static Hitbox,
    &'static Appearance,
    &'static Projectiles,
);

/// Outcome of a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame was simulated.
    Running,
    /// Waiting for restart or quit.
    GameOver,
    /// The host should shut down.
    Quit,
}

/// The main simulation world container.
///
/// Holds the ECS world and schedule, providing a clean API for:
/// - Initializing the simulation from a config and loaded textures
/// - Stepping the simulation forward one frame at a time
/// - Composing each frame onto a render surface
/// - Extracting state snapshots
pub struct SimWorld {
    world: World,
    schedule: Schedule,
    state: GameState,
    tick: u64,
    time: f32,
    player: Entity,
}

impl SimWorld {
    /// Create a simulation using textures already loaded into `assets`.
    pub fn new(config: SimConfig, assets: &AssetCache) -> Result<Self, SimError> {
        config.validate()?;
        Ok(Self::build(config, GameTextures::from_cache(assets)))
    }

    /// Default configuration without textures: chunks stream but never draw.
    pub fn headless() -> Self {
        Self::build(SimConfig::default(), GameTextures::default())
    }

    fn build(config: SimConfig, textures: GameTextures) -> Self {
        let mut world = World::new();

        // Core resources
        world.insert_resource(DeltaTime(0.0));
        world.insert_resource(InputState::default());
        world.insert_resource(Camera::from_config(&config));
        world.insert_resource(SpatialGrid::new(
            config.chunk_size,
            config.retain_radius,
            textures.background,
        ));

        // Spawning and scoring
        world.insert_resource(SpawnTimer::new(config.spawn_interval));
        world.insert_resource(SpawnRng::from_seed(config.seed));
        world.insert_resource(NextEnemyId::default());
        world.insert_resource(KillCount::default());

        let player = world.spawn(PlayerBundle::new(&config, textures.player)).id();
        world.insert_resource(textures);
        world.insert_resource(config);

        Self {
            world,
            schedule: Self::frame_schedule(),
            state: GameState::Playing,
            tick: 0,
            time: 0.0,
            player,
        }
    }

    /// One chained schedule per frame; see `systems` for the ordering.
    fn frame_schedule() -> Schedule {
        let mut schedule = Schedule::default();

        // Player
        schedule.add_systems(
            (
                weapon_cooldown_system::<Player>,
                contact_cooldown_system,
                player_control_system,
                movement_system::<Player>,
                player_fire_system,
                projectile_system::<Player>,
            )
                .chain(),
        );

        // World follows the player
        schedule.add_systems(
            (camera_follow_system, chunk_streaming_system, enemy_spawn_system)
                .chain()
                .after(projectile_system::<Player>),
        );

        // Enemies
        schedule.add_systems(
            (
                weapon_cooldown_system::<Enemy>,
                enemy_awareness_system,
                enemy_aim_system,
                enemy_steering_system,
                movement_system::<Enemy>,
                enemy_fire_system,
                projectile_system::<Enemy>,
            )
                .chain()
                .after(enemy_spawn_system),
        );

        // Resolution
        schedule.add_systems(
            (collision_system, despawn_dead_system)
                .chain()
                .after(projectile_system::<Enemy>),
        );

        schedule
    }

    /// Advance the game by one frame of `dt` seconds.
    pub fn step(&mut self, dt: f32, input: &InputState) -> FrameStatus {
        if input.quit {
            return FrameStatus::Quit;
        }
        self.world.insert_resource(*input);

        let player_dead = self
            .world
            .get::<Health>(self.player)
            .is_some_and(|h| h.is_dead());
        let next = self.state.next(player_dead, input.restart);

        match (self.state, next) {
            (GameState::Playing, GameState::GameOver) => {
                self.state = next;
                info!(
                    tick = self.tick,
                    kills = self.kills(),
                    "player destroyed, game over"
                );
                return FrameStatus::GameOver;
            }
            (GameState::GameOver, GameState::Playing) => {
                self.restart();
                return FrameStatus::Running;
            }
            (GameState::GameOver, _) => return FrameStatus::GameOver,
            _ => {}
        }

        self.world.resource_mut::<DeltaTime>().0 = dt;
        self.schedule.run(&mut self.world);

        self.tick += 1;
        self.time += dt;
        FrameStatus::Running
    }

    /// Reset the player, enemies, timers and score. Streamed chunks are kept.
    pub fn restart(&mut self) {
        let config = self.world.resource::<SimConfig>().clone();
        let player_texture = self.world.resource::<GameTextures>().player;

        self.world
            .entity_mut(self.player)
            .insert(PlayerBundle::new(&config, player_texture));

        let mut enemies = self.world.query_filtered::<Entity, With<Enemy>>();
        let doomed: Vec<Entity> = enemies.iter(&self.world).collect();
        for entity in doomed {
            self.world.despawn(entity);
        }

        self.world.insert_resource(SpawnTimer::new(config.spawn_interval));
        self.world.insert_resource(NextEnemyId::default());
        self.world.insert_resource(KillCount::default());
        self.world
            .resource_mut::<Camera>()
            .recenter(config.player_start.0, config.player_start.1);

        self.state = GameState::Playing;
        info!(tick = self.tick, "game restarted");
    }

    /// Compose the current frame onto `surface`.
    ///
    /// Order: background chunks, player, player projectiles, then each enemy
    /// (ascending id) followed by its projectiles.
    pub fn render(&mut self, surface: &mut dyn RenderSurface) {
        let camera = *self.world.resource::<Camera>();
        let shot_half = self.world.resource::<SimConfig>().projectile_half_extent;
        let shot_texture = self.world.resource::<GameTextures>().projectile;
        let shot_sprite = |p: &Projectile| {
            SpriteDraw::centered(SpriteKind::Projectile, shot_texture, p.x, p.y, shot_half, 0.0)
        };

        surface.clear();
        surface.set_view(&camera);
        self.world.resource::<SpatialGrid>().draw(surface);

        let mut player = self.world.query_filtered::<ShipSprite, With<Player>>();
        for (pos, facing, hitbox, appearance, shots) in player.iter(&self.world) {
            surface.draw(&SpriteDraw::centered(
                SpriteKind::Player,
                appearance.texture,
                pos.x,
                pos.y,
                hitbox.half_width,
                facing.sprite_rotation(),
            ));
            for shot in shots.iter() {
                surface.draw(&shot_sprite(shot));
            }
        }

        let mut enemies = self
            .world
            .query::<(&Enemy, &Position, &Facing, &Hitbox, &Appearance, &Projectiles)>();
        let mut rows: Vec<_> = enemies.iter(&self.world).collect();
        rows.sort_by_key(|row| *row.0);
        for (_, pos, facing, hitbox, appearance, shots) in rows {
            surface.draw(&SpriteDraw::centered(
                SpriteKind::Enemy,
                appearance.texture,
                pos.x,
                pos.y,
                hitbox.half_width,
                facing.sprite_rotation(),
            ));
            for shot in shots.iter() {
                surface.draw(&shot_sprite(shot));
            }
        }

        surface.display();
    }

    /// Poll the host, simulate one frame and draw it.
    pub fn run_frame(
        &mut self,
        surface: &mut dyn RenderSurface,
        source: &dyn InputSource,
        dt: f32,
    ) -> FrameStatus {
        let mut closed = false;
        while let Some(event) = surface.poll_event() {
            match event {
                SurfaceEvent::Closed => closed = true,
            }
        }
        if closed {
            return FrameStatus::Quit;
        }

        let input = InputState::poll(source);
        let status = self.step(dt, &input);
        if status != FrameStatus::Quit {
            self.render(surface);
        }
        status
    }

    /// Run frames until the surface closes or quit is pressed.
    ///
    /// `dt` is the wall-clock time since the previous frame started.
    pub fn run(&mut self, surface: &mut dyn RenderSurface, source: &dyn InputSource) {
        let mut last = Instant::now();
        loop {
            let now = Instant::now();
            let dt = now.duration_since(last).as_secs_f32();
            last = now;
            if self.run_frame(surface, source, dt) == FrameStatus::Quit {
                info!(tick = self.tick, time = self.time, "quitting");
                return;
            }
        }
    }

    /// Spawn an enemy directly, bypassing the spawn timer. Returns its entity.
    pub fn spawn_enemy(&mut self, x: f32, y: f32, variant: usize) -> Entity {
        let id = {
            let mut next = self.world.resource_mut::<NextEnemyId>();
            let id = next.0;
            next.0 += 1;
            id
        };
        let texture = self.world.resource::<GameTextures>().enemy(variant);
        let config = self.world.resource::<SimConfig>();
        let bundle = EnemyBundle::new(id, x, y, variant, config, texture);
        self.world.spawn(bundle).id()
    }

    /// Get a snapshot of the current frame.
    pub fn snapshot(&mut self) -> FrameSnapshot {
        FrameSnapshot::from_world(&mut self.world, self.tick, self.time, self.state)
    }

    /// Get the snapshot as a JSON string.
    pub fn snapshot_json(&mut self) -> Result<String, serde_json::Error> {
        self.snapshot().to_json()
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Get the number of simulated frames.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Get the elapsed simulation time.
    pub fn current_time(&self) -> f32 {
        self.time
    }

    pub fn kills(&self) -> u32 {
        self.world.resource::<KillCount>().0
    }

    pub fn enemy_count(&mut self) -> usize {
        let mut query = self.world.query_filtered::<(), With<Enemy>>();
        query.iter(&self.world).count()
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn player_health(&self) -> Option<Health> {
        self.world.get::<Health>(self.player).copied()
    }

    pub fn player_position(&self) -> Option<Position> {
        self.world.get::<Position>(self.player).copied()
    }

    pub fn config(&self) -> &SimConfig {
        self.world.resource::<SimConfig>()
    }

    pub fn grid(&self) -> &SpatialGrid {
        self.world.resource::<SpatialGrid>()
    }

    pub fn camera(&self) -> Camera {
        *self.world.resource::<Camera>()
    }

    /// Get direct access to the ECS world (for advanced usage).
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the ECS world (for advanced usage).
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }
}

impl Default for SimWorld {
    fn default() -> Self {
        Self::headless()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::StaticAssetLoader;
    use crate::render::FrameRecorder;
    use crate::spatial::CellCoord;

    const DT: f32 = 0.016;

    fn loaded_world() -> SimWorld {
        let mut loader = StaticAssetLoader::with_default_textures();
        let mut cache = AssetCache::new();
        cache.load_game_textures(&mut loader);
        SimWorld::new(
            SimConfig {
                seed: Some(1),
                ..Default::default()
            },
            &cache,
        )
        .unwrap()
    }

    fn idle() -> InputState {
        InputState::default()
    }

    #[test]
    fn test_new_world() {
        let sim = loaded_world();
        assert_eq!(sim.current_tick(), 0);
        assert_eq!(sim.state(), GameState::Playing);
        assert_eq!(sim.player_health().map(|h| h.current), Some(200.0));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = SimConfig {
            chunk_size: 0.0,
            ..Default::default()
        };
        let result = SimWorld::new(config, &AssetCache::new());
        assert!(matches!(result, Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_step_advances_tick_and_streams_chunks() {
        let mut sim = loaded_world();
        assert_eq!(sim.step(DT, &idle()), FrameStatus::Running);
        assert_eq!(sim.current_tick(), 1);

        // Player starts at (400, 300), inside chunk (0, 0)
        let grid = sim.grid();
        assert_eq!(grid.resident_count(), 25);
        assert_eq!(grid.focal_cell(), Some(CellCoord::new(0, 0)));
        assert!(grid.is_resident(CellCoord::new(-2, 2)));
        assert!(!grid.is_resident(CellCoord::new(3, 0)));
    }

    #[test]
    fn test_quit_stops_immediately() {
        let mut sim = loaded_world();
        let quit = InputState {
            quit: true,
            ..Default::default()
        };
        assert_eq!(sim.step(DT, &quit), FrameStatus::Quit);
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn test_enemies_spawn_on_interval() {
        let mut sim = loaded_world();
        for _ in 0..10 {
            sim.step(0.1, &idle());
        }
        assert_eq!(sim.enemy_count(), 1);

        let snapshot = sim.snapshot();
        let enemy = snapshot.enemies[0];
        let start = Position::new(400.0, 300.0);
        let d = Position::new(enemy.x, enemy.y).distance_to(&start);
        // Spawned 300..500 away, then moved at most one frame toward the player
        assert!(d > 270.0 && d < 500.1, "distance {}", d);
    }

    #[test]
    fn test_close_enemy_shoots_player() {
        let mut sim = loaded_world();
        let enemy = sim.spawn_enemy(450.0, 300.0, 1);
        sim.world_mut().get_mut::<Weapon>(enemy).unwrap().since_shot = 0.8;

        sim.step(DT, &idle());

        // The shot spawns 25 units out and reaches the player in the same frame
        assert_eq!(sim.player_health().map(|h| h.current), Some(190.0));
        assert!(sim.world().get::<Projectiles>(enemy).unwrap().is_empty());
        assert!(!sim.world().get::<Weapon>(enemy).unwrap().is_ready());
    }

    #[test]
    fn test_player_shot_passes_through_and_kills() {
        let mut sim = loaded_world();
        sim.spawn_enemy(520.0, 300.0, 0);
        let player = sim.player();
        sim.world_mut().get_mut::<Weapon>(player).unwrap().since_shot = 0.25;

        // Facing starts at 0°: pointer straight ahead keeps it there
        let fire = InputState {
            fire: true,
            ..InputState::pointing_at(1000.0, 300.0)
        };
        sim.step(DT, &fire);
        let hold = InputState::pointing_at(1000.0, 300.0);
        for _ in 0..9 {
            sim.step(DT, &hold);
        }

        // The shot is not consumed, so it hits on consecutive frames
        assert_eq!(sim.kills(), 1);
        assert_eq!(sim.enemy_count(), 0);
        assert_eq!(sim.snapshot().projectiles.len(), 1);
    }

    #[test]
    fn test_game_over_and_restart() {
        let mut sim = loaded_world();
        for _ in 0..20 {
            sim.step(0.1, &idle());
        }
        assert!(sim.enemy_count() > 0);
        let player = sim.player();
        sim.world_mut().get_mut::<Health>(player).unwrap().set(0.0);

        assert_eq!(sim.step(DT, &idle()), FrameStatus::GameOver);
        assert_eq!(sim.state(), GameState::GameOver);
        let tick = sim.current_tick();

        // Frozen: no simulation until restart
        assert_eq!(sim.step(DT, &idle()), FrameStatus::GameOver);
        assert_eq!(sim.current_tick(), tick);

        let chunks = sim.grid().resident_cells();
        let restart = InputState {
            restart: true,
            ..Default::default()
        };
        assert_eq!(sim.step(DT, &restart), FrameStatus::Running);
        assert_eq!(sim.state(), GameState::Playing);
        assert_eq!(sim.enemy_count(), 0);
        assert_eq!(sim.kills(), 0);
        assert_eq!(sim.player_health().map(|h| h.current), Some(200.0));
        assert_eq!(sim.player_position(), Some(Position::new(400.0, 300.0)));
        assert_eq!(sim.grid().resident_cells(), chunks);

        assert_eq!(sim.step(DT, &idle()), FrameStatus::Running);
    }

    #[test]
    fn test_restart_is_ignored_while_playing() {
        let mut sim = loaded_world();
        sim.step(0.5, &InputState { right: true, ..Default::default() });
        let moved = sim.player_position().unwrap();
        assert!((moved.x - 500.0).abs() < 1e-3);

        sim.step(DT, &InputState { restart: true, ..Default::default() });
        assert!(sim.player_position().unwrap().x >= moved.x);
    }

    #[test]
    fn test_render_emits_frame_in_order() {
        let mut sim = loaded_world();
        sim.spawn_enemy(600.0, 300.0, 2);
        sim.step(DT, &InputState::pointing_at(1000.0, 300.0));

        let mut surface = FrameRecorder::default();
        sim.render(&mut surface);

        assert_eq!(surface.frames, 1);
        assert_eq!(surface.count(SpriteKind::Background), 25);
        assert_eq!(surface.count(SpriteKind::Player), 1);
        assert_eq!(surface.count(SpriteKind::Enemy), 1);
        assert_eq!(surface.view, Some(sim.camera()));

        // Backgrounds first, then the player
        let first_ship = surface
            .draws
            .iter()
            .position(|d| d.kind != SpriteKind::Background)
            .unwrap();
        assert_eq!(first_ship, 25);
        assert_eq!(surface.draws[25].kind, SpriteKind::Player);
        // Ship art points up: facing 0° draws at 90°
        assert_eq!(surface.draws[25].rotation, 90.0);
    }

    #[test]
    fn test_missing_background_still_streams() {
        let mut sim = SimWorld::headless();
        sim.step(DT, &idle());

        let mut surface = FrameRecorder::default();
        sim.render(&mut surface);
        assert_eq!(sim.grid().resident_count(), 25);
        assert_eq!(surface.count(SpriteKind::Background), 0);
        assert_eq!(surface.count(SpriteKind::Player), 1);
    }

    #[test]
    fn test_closed_surface_quits() {
        let mut sim = loaded_world();
        let mut surface = FrameRecorder::default();
        surface.close();

        let source = idle();
        assert_eq!(sim.run_frame(&mut surface, &source, DT), FrameStatus::Quit);
        assert_eq!(surface.frames, 0);

        surface.close();
        sim.run(&mut surface, &source);
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn test_run_frame_renders() {
        let mut sim = loaded_world();
        let mut surface = FrameRecorder::default();
        let source = InputState::pointing_at(400.0, 0.0);

        for _ in 0..3 {
            assert_eq!(sim.run_frame(&mut surface, &source, DT), FrameStatus::Running);
        }
        assert_eq!(surface.frames, 3);
        assert_eq!(sim.current_tick(), 3);
    }

    #[test]
    fn test_snapshot_json() {
        let mut sim = loaded_world();
        sim.spawn_enemy(0.0, 0.0, 0);
        sim.step(DT, &idle());
        let json = sim.snapshot_json().unwrap();
        assert!(json.contains("\"enemies\""));
        assert!(json.contains("\"chunks\""));
        assert!(json.contains("Playing"));
    }
}
