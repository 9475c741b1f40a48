//! Driftfire - Simulation Core
//!
//! A top-down arcade shooter: the player ship flies over an endless streamed
//! background while enemies spawn around it and close in.
//! Uses `bevy_ecs` for the entity-component-system architecture.
//!
//! Rendering, input devices and texture decoding stay with the host. The host
//! plugs them in through [`RenderSurface`], [`InputSource`] and [`AssetLoader`].

pub mod api;
pub mod assets;
pub mod components;
pub mod config;
pub mod error;
pub mod input;
pub mod render;
pub mod spatial;
pub mod systems;
pub mod view;
pub mod world;

pub use api::{FrameStatus, SimWorld};
pub use assets::{AssetCache, AssetLoader, GameTextures, StaticAssetLoader, TextureHandle};
pub use components::*;
pub use config::SimConfig;
pub use error::{AssetError, SimError};
pub use input::{Action, InputSource, InputState};
pub use render::{FrameRecorder, RenderSurface, SpriteDraw, SpriteKind, SurfaceEvent};
pub use spatial::{CellCoord, Chunk, SpatialGrid, StreamDelta};
pub use systems::*;
pub use view::{Aabb, Camera};
pub use world::{FrameSnapshot, GameState};
