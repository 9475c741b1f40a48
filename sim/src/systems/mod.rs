//! ECS Systems for the Driftfire simulation.
//!
//! Systems contain the game logic that operates on components.
//!
//! ## Frame Order
//!
//! Every frame runs one chained schedule, so each step sees the results of
//! the previous one:
//!
//! **Player** - cooldowns, steering, movement, firing:
//! - `weapon_cooldown_system::<Player>`, `contact_cooldown_system`
//! - `player_control_system` - turn toward the pointer, velocity from keys
//! - `movement_system::<Player>`
//! - `player_fire_system`, `projectile_system::<Player>`
//!
//! **World** - follows the player:
//! - `camera_follow_system`
//! - `chunk_streaming_system` - loads/evicts background chunks
//! - `enemy_spawn_system`
//!
//! **Enemies** - awareness before steering, steering before firing:
//! - `weapon_cooldown_system::<Enemy>`
//! - `enemy_awareness_system`, `enemy_aim_system`, `enemy_steering_system`
//! - `movement_system::<Enemy>`
//! - `enemy_fire_system`, `projectile_system::<Enemy>`
//!
//! **Resolution**:
//! - `collision_system` - hits and contact damage
//! - `despawn_dead_system`

pub mod ai;
pub mod collision;
pub mod combat;
pub mod movement;
pub mod spawning;

pub use ai::*;
pub use collision::*;
pub use combat::*;
pub use movement::*;
pub use spawning::*;
