//! Basic demonstration of the Driftfire simulation.
//!
//! Flies the player in a slow circle while firing, with a headless surface
//! standing in for a window.
//!
//! Run with: RUST_LOG=debug cargo run --example basic_demo

use driftfire_sim::{
    Action, AssetCache, FrameRecorder, FrameStatus, InputSource, InputState, SimConfig, SimWorld,
    SpriteKind, StaticAssetLoader,
};
use tracing_subscriber::EnvFilter;

/// Input that circles the player and aims ahead of it.
struct Autopilot {
    frame: u32,
    pointer: (f32, f32),
}

impl InputSource for Autopilot {
    fn is_pressed(&self, action: Action) -> bool {
        let phase = (self.frame / 60) % 4;
        match action {
            Action::MoveRight => phase == 0,
            Action::MoveDown => phase == 1,
            Action::MoveLeft => phase == 2,
            Action::MoveUp => phase == 3,
            Action::Fire => true,
            Action::Restart => true,
            Action::Quit => false,
        }
    }

    fn pointer_world_position(&self) -> (f32, f32) {
        self.pointer
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Driftfire - Simulation Demo ===\n");

    let mut loader = StaticAssetLoader::with_default_textures();
    let mut assets = AssetCache::new();
    assets.load_game_textures(&mut loader);

    let config = SimConfig {
        seed: Some(7),
        ..Default::default()
    };
    let mut sim = SimWorld::new(config, &assets)?;
    let mut surface = FrameRecorder::default();
    let mut pilot = Autopilot {
        frame: 0,
        pointer: (0.0, 0.0),
    };

    // 20 seconds at 60 frames per second
    let dt = 1.0 / 60.0;
    for frame in 0..1200 {
        pilot.frame = frame;
        if let Some(pos) = sim.player_position() {
            pilot.pointer = (pos.x + 100.0, pos.y - 50.0);
        }
        // Restart is held, so a game over only lasts one frame
        let status = sim.run_frame(&mut surface, &pilot, dt);
        if status == FrameStatus::GameOver {
            println!("*** game over at t={:.1}s ***", sim.current_time());
        }

        if (frame + 1) % 120 == 0 {
            let health = sim.player_health().map(|h| h.current).unwrap_or(0.0);
            println!(
                "t={:>5.1}s  enemies={:<3} kills={:<3} hp={:>5.1} chunks={} sprites={}",
                sim.current_time(),
                sim.enemy_count(),
                sim.kills(),
                health,
                sim.grid().resident_count(),
                surface.draws.len() - surface.count(SpriteKind::Background),
            );
        }
    }

    let quit = InputState {
        quit: true,
        ..Default::default()
    };
    assert_eq!(sim.step(dt, &quit), FrameStatus::Quit);

    println!("\n=== Final State (JSON) ===\n");
    println!("{}", sim.snapshot().to_json_pretty()?);
    Ok(())
}
