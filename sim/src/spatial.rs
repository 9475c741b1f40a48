//! Chunk streaming for the infinite background.
//!
//! The world is tiled by square chunks of `chunk_size` units. Only the
//! (2R+1)×(2R+1) block of chunks around the player is kept resident; moving
//! the focal point loads the new edge and evicts the old one.

use crate::assets::TextureHandle;
use crate::components::{Player, Position};
use crate::render::{RenderSurface, SpriteDraw};
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Largest resident radius; 64 keeps a 129×129 block.
pub const MAX_RETAIN_RADIUS: i32 = 64;

/// Integer chunk coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    pub x: i32,
    pub y: i32,
}

impl CellCoord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance between two cells.
    pub fn chebyshev(&self, other: &CellCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Where and how a chunk's background is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChunkVisual {
    pub texture: TextureHandle,
    /// World-space top-left corner.
    pub x: f32,
    pub y: f32,
    /// Scale that stretches the texture to exactly one chunk.
    pub scale_x: f32,
    pub scale_y: f32,
}

/// One resident tile of the background.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub coord: CellCoord,
    pub loaded: bool,
    pub visual: Option<ChunkVisual>,
}

impl Chunk {
    pub fn new(coord: CellCoord) -> Self {
        Self {
            coord,
            loaded: false,
            visual: None,
        }
    }

    /// Attach the shared background. Without a texture the chunk stays
    /// unloaded and is skipped when drawing.
    pub fn load(&mut self, texture: Option<TextureHandle>, chunk_size: f32) {
        if self.loaded {
            return;
        }
        let Some(texture) = texture else {
            warn!(
                cx = self.coord.x,
                cy = self.coord.y,
                "no background texture, chunk left unloaded"
            );
            return;
        };
        let x = self.coord.x as f32 * chunk_size;
        let y = self.coord.y as f32 * chunk_size;
        self.visual = Some(ChunkVisual {
            texture,
            x,
            y,
            scale_x: chunk_size / texture.width.max(1) as f32,
            scale_y: chunk_size / texture.height.max(1) as f32,
        });
        self.loaded = true;
        debug!(cx = self.coord.x, cy = self.coord.y, x, y, "chunk loaded");
    }

    pub fn unload(&mut self) {
        if !self.loaded {
            return;
        }
        self.loaded = false;
        debug!(cx = self.coord.x, cy = self.coord.y, "chunk unloaded");
    }
}

/// Cells that changed during one `update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDelta {
    pub loaded: Vec<CellCoord>,
    pub evicted: Vec<CellCoord>,
}

impl StreamDelta {
    pub fn is_empty(&self) -> bool {
        self.loaded.is_empty() && self.evicted.is_empty()
    }
}

/// Resident background chunks around a focal point.
#[derive(Resource, Debug)]
pub struct SpatialGrid {
    /// Chunk edge length in world units.
    pub chunk_size: f32,
    /// Chebyshev radius kept resident.
    pub retain_radius: i32,
    /// Shared background texture, if it loaded.
    texture: Option<TextureHandle>,
    cells: HashMap<CellCoord, Chunk>,
    focal: Option<CellCoord>,
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(600.0, 2, None)
    }
}

impl SpatialGrid {
    pub fn new(chunk_size: f32, retain_radius: i32, texture: Option<TextureHandle>) -> Self {
        Self {
            chunk_size,
            retain_radius,
            texture,
            cells: HashMap::new(),
            focal: None,
        }
    }

    /// Convert world coordinates to chunk coordinates.
    #[inline]
    pub fn world_to_cell(&self, x: f32, y: f32) -> CellCoord {
        CellCoord::new(
            (x / self.chunk_size).floor() as i32,
            (y / self.chunk_size).floor() as i32,
        )
    }

    /// Make the resident set exactly the neighborhood of the chunk under `(x, y)`.
    pub fn update(&mut self, x: f32, y: f32) -> StreamDelta {
        let center = self.world_to_cell(x, y);
        let r = self.retain_radius.clamp(0, MAX_RETAIN_RADIUS);
        let mut delta = StreamDelta::default();

        let side = (2 * r + 1) as usize;
        let mut required = HashSet::with_capacity(side * side);
        for dx in -r..=r {
            for dy in -r..=r {
                required.insert(CellCoord::new(
                    center.x.saturating_add(dx),
                    center.y.saturating_add(dy),
                ));
            }
        }

        // Load new chunks
        for coord in &required {
            if !self.cells.contains_key(coord) {
                let mut chunk = Chunk::new(*coord);
                chunk.load(self.texture, self.chunk_size);
                self.cells.insert(*coord, chunk);
                delta.loaded.push(*coord);
            }
        }

        // Evict chunks that fell out of range
        self.cells.retain(|coord, chunk| {
            if required.contains(coord) {
                true
            } else {
                chunk.unload();
                delta.evicted.push(*coord);
                false
            }
        });

        self.focal = Some(center);
        delta.loaded.sort();
        delta.evicted.sort();
        delta
    }

    /// Emit every loaded chunk's background.
    pub fn draw(&self, surface: &mut dyn RenderSurface) {
        for chunk in self.cells.values() {
            if !chunk.loaded {
                continue;
            }
            if let Some(visual) = chunk.visual {
                surface.draw(&SpriteDraw::background(&visual, self.chunk_size));
            }
        }
    }

    pub fn is_resident(&self, coord: CellCoord) -> bool {
        self.cells.contains_key(&coord)
    }

    pub fn chunk(&self, coord: CellCoord) -> Option<&Chunk> {
        self.cells.get(&coord)
    }

    pub fn resident_count(&self) -> usize {
        self.cells.len()
    }

    /// Resident coordinates in sorted order.
    pub fn resident_cells(&self) -> Vec<CellCoord> {
        let mut cells: Vec<_> = self.cells.keys().copied().collect();
        cells.sort();
        cells
    }

    /// Chunk the last `update` was centered on.
    pub fn focal_cell(&self) -> Option<CellCoord> {
        self.focal
    }
}

/// System that streams chunks around the player.
pub fn chunk_streaming_system(
    mut grid: ResMut<SpatialGrid>,
    player: Query<&Position, With<Player>>,
) {
    for pos in player.iter() {
        grid.update(pos.x, pos.y);
    }
}
