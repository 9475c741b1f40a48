//! Simulation tuning.
//!
//! Every gameplay constant lives in [`SimConfig`]. The defaults are the values
//! the game ships with; a JSON document can override any subset of them.

use crate::error::SimError;
use crate::spatial::MAX_RETAIN_RADIUS;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Configuration for the arcade simulation.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // --- World streaming ---
    /// Edge length of one background chunk in world units.
    pub chunk_size: f32,
    /// Chebyshev radius (in chunks) kept resident around the player.
    pub retain_radius: i32,

    // --- Camera ---
    /// Unzoomed view width.
    pub view_width: f32,
    /// Unzoomed view height.
    pub view_height: f32,
    /// View zoom factor (0.1 shows a tenth of the unzoomed size).
    pub view_zoom: f32,
    /// Margin added around the view for culling and enemy visibility.
    pub view_margin: f32,

    // --- Player ---
    pub player_start: (f32, f32),
    pub player_max_health: f32,
    /// Movement speed per active axis (units per second).
    pub player_speed: f32,
    /// Maximum turn rate in degrees per second.
    pub player_turn_rate: f32,
    pub player_shoot_cooldown: f32,
    /// Minimum time between two contact-damage applications.
    pub player_contact_cooldown: f32,
    pub player_half_extent: f32,

    // --- Enemies ---
    pub enemy_max_health: f32,
    pub enemy_speed: f32,
    /// Speed multiplier while engaging (in range and visible).
    pub enemy_engaged_speed_factor: f32,
    pub enemy_contact_damage: f32,
    pub enemy_shoot_cooldown: f32,
    pub enemy_detection_range: f32,
    pub enemy_shooting_range: f32,
    pub enemy_half_extent: f32,

    // --- Spawning ---
    /// Seconds between enemy spawns.
    pub spawn_interval: f32,
    pub spawn_distance_min: f32,
    pub spawn_distance_max: f32,
    /// RNG seed for spawning. `None` seeds from entropy.
    pub seed: Option<u64>,

    // --- Projectiles ---
    pub projectile_speed: f32,
    /// Distance in front of the shooter where projectiles appear.
    pub projectile_spawn_offset: f32,
    pub projectile_half_extent: f32,
    /// Damage a player projectile deals to an enemy.
    pub projectile_damage: f32,
    /// Remove a player projectile after its first hit.
    pub consume_player_projectiles_on_hit: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            chunk_size: 600.0,
            retain_radius: 2,

            view_width: 1920.0,
            view_height: 1080.0,
            view_zoom: 0.1,
            view_margin: 100.0,

            player_start: (400.0, 300.0),
            player_max_health: 200.0,
            player_speed: 200.0,
            player_turn_rate: 360.0,
            player_shoot_cooldown: 0.25,
            player_contact_cooldown: 1.0,
            player_half_extent: 16.0,

            enemy_max_health: 50.0,
            enemy_speed: 200.0,
            enemy_engaged_speed_factor: 0.3,
            enemy_contact_damage: 10.0,
            enemy_shoot_cooldown: 0.8,
            enemy_detection_range: 500.0,
            enemy_shooting_range: 100.0,
            enemy_half_extent: 12.0,

            spawn_interval: 1.0,
            spawn_distance_min: 300.0,
            spawn_distance_max: 500.0,
            seed: None,

            projectile_speed: 800.0,
            projectile_spawn_offset: 25.0,
            projectile_half_extent: 8.0,
            projectile_damage: 25.0,
            consume_player_projectiles_on_hit: false,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON override and validate it.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the simulation cannot run with.
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.chunk_size > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "chunk_size must be positive, got {}",
                self.chunk_size
            )));
        }
        if !(0..=MAX_RETAIN_RADIUS).contains(&self.retain_radius) {
            return Err(SimError::InvalidConfig(format!(
                "retain_radius must be in 0..={MAX_RETAIN_RADIUS}, got {}",
                self.retain_radius
            )));
        }
        if !(self.spawn_interval > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "spawn_interval must be positive, got {}",
                self.spawn_interval
            )));
        }
        if self.spawn_distance_min > self.spawn_distance_max {
            return Err(SimError::InvalidConfig(format!(
                "spawn band is inverted: {}..{}",
                self.spawn_distance_min, self.spawn_distance_max
            )));
        }
        if !(self.view_zoom > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "view_zoom must be positive, got {}",
                self.view_zoom
            )));
        }
        Ok(())
    }
}
