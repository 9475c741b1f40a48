//! Render collaborator interface.
//!
//! The simulation owns no frame buffer. Each frame it describes what to draw
//! as [`SpriteDraw`] calls on a [`RenderSurface`] supplied by the application:
//!
//! ```text
//! clear → set_view(camera) → chunks → player → player shots
//!       → enemies + shots → display
//! ```

use crate::assets::TextureHandle;
use crate::spatial::ChunkVisual;
use crate::view::Camera;
use serde::{Deserialize, Serialize};

/// What kind of object a draw call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpriteKind {
    Background,
    Player,
    Enemy,
    Projectile,
}

/// One textured quad in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteDraw {
    pub kind: SpriteKind,
    /// Missing when the texture failed to load and no placeholder was made.
    pub texture: Option<TextureHandle>,
    /// Anchor position (top-left for backgrounds, center otherwise).
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation in degrees.
    pub rotation: f32,
}

impl SpriteDraw {
    pub fn background(visual: &ChunkVisual, chunk_size: f32) -> Self {
        Self {
            kind: SpriteKind::Background,
            texture: Some(visual.texture),
            x: visual.x,
            y: visual.y,
            width: chunk_size,
            height: chunk_size,
            rotation: 0.0,
        }
    }

    pub fn centered(
        kind: SpriteKind,
        texture: Option<TextureHandle>,
        x: f32,
        y: f32,
        half_extent: f32,
        rotation: f32,
    ) -> Self {
        Self {
            kind,
            texture,
            x,
            y,
            width: half_extent * 2.0,
            height: half_extent * 2.0,
            rotation,
        }
    }
}

/// Events the surface reports back to the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    Closed,
}

/// Drawing primitives provided by the graphics back-end.
pub trait RenderSurface {
    fn clear(&mut self);
    fn set_view(&mut self, camera: &Camera);
    fn draw(&mut self, sprite: &SpriteDraw);
    fn display(&mut self);
    fn poll_event(&mut self) -> Option<SurfaceEvent>;
}

/// Headless surface that records the most recent frame.
#[derive(Debug, Default, Clone)]
pub struct FrameRecorder {
    /// Draw calls since the last `clear`.
    pub draws: Vec<SpriteDraw>,
    pub view: Option<Camera>,
    /// Number of `display` calls.
    pub frames: u64,
    /// Events handed out by `poll_event`, front first.
    pub pending_events: Vec<SurfaceEvent>,
}

impl FrameRecorder {
    pub fn count(&self, kind: SpriteKind) -> usize {
        self.draws.iter().filter(|d| d.kind == kind).count()
    }

    /// Queue a close request for the next poll.
    pub fn close(&mut self) {
        self.pending_events.push(SurfaceEvent::Closed);
    }
}

impl RenderSurface for FrameRecorder {
    fn clear(&mut self) {
        self.draws.clear();
    }

    fn set_view(&mut self, camera: &Camera) {
        self.view = Some(*camera);
    }

    fn draw(&mut self, sprite: &SpriteDraw) {
        self.draws.push(*sprite);
    }

    fn display(&mut self) {
        self.frames += 1;
    }

    fn poll_event(&mut self) -> Option<SurfaceEvent> {
        if self.pending_events.is_empty() {
            None
        } else {
            Some(self.pending_events.remove(0))
        }
    }
}
