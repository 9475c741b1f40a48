//! Camera and world-space rectangles.

use crate::config::SimConfig;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in world space, stored as min/max corners.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    /// Box of the given half extents centered on `(x, y)`.
    pub fn centered(x: f32, y: f32, half_w: f32, half_h: f32) -> Self {
        Self::new(x - half_w, y - half_h, x + half_w, y + half_h)
    }

    /// Half-open overlap test: boxes that only touch do not intersect.
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min_x < other.max_x
            && self.max_x > other.min_x
            && self.min_y < other.max_y
            && self.max_y > other.min_y
    }

    /// Inclusive point containment.
    #[inline]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Grow the box by `margin` on every side.
    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(
            self.min_x - margin,
            self.min_y - margin,
            self.max_x + margin,
            self.max_y + margin,
        )
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

/// The camera following the player.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub center_x: f32,
    pub center_y: f32,
    /// Visible world width (already zoomed).
    pub width: f32,
    /// Visible world height (already zoomed).
    pub height: f32,
}

impl Camera {
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self { center_x, center_y, width, height }
    }

    /// Camera centered on the player start with the configured zoom applied.
    pub fn from_config(config: &SimConfig) -> Self {
        Self::new(
            config.player_start.0,
            config.player_start.1,
            config.view_width * config.view_zoom,
            config.view_height * config.view_zoom,
        )
    }

    pub fn recenter(&mut self, x: f32, y: f32) {
        self.center_x = x;
        self.center_y = y;
    }

    /// The visible world rectangle.
    pub fn bounds(&self) -> Aabb {
        Aabb::centered(self.center_x, self.center_y, self.width / 2.0, self.height / 2.0)
    }
}
