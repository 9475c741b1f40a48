//! ECS Components for the Driftfire simulation.
//!
//! Components are pure data containers attached to entities.
//! All game logic lives in systems that query these components.

use crate::assets::TextureHandle;
use crate::config::SimConfig;
use crate::view::Aabb;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

// ============================================================================
// SPATIAL COMPONENTS
// ============================================================================

/// 2D position in world space (y grows downward, screen convention).
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Unit vector pointing from `self` to `other`, or `None` if they coincide.
    pub fn direction_to(&self, other: &Position) -> Option<(f32, f32)> {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > 0.0 {
            Some((dx / dist, dy / dist))
        } else {
            None
        }
    }
}

/// 2D velocity vector.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity {
    pub vx: f32,
    pub vy: f32,
}

impl Velocity {
    pub fn new(vx: f32, vy: f32) -> Self {
        Self { vx, vy }
    }

    pub fn magnitude(&self) -> f32 {
        (self.vx * self.vx + self.vy * self.vy).sqrt()
    }
}

/// Heading in degrees, kept in [-180, 180]. 0° points along +x.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Facing {
    pub degrees: f32,
}

impl Facing {
    pub fn new(degrees: f32) -> Self {
        Self {
            degrees: wrap_degrees(degrees),
        }
    }

    /// Heading that looks from `from` toward `to`, if they differ.
    pub fn toward(from: &Position, to: &Position) -> Option<Self> {
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        if dx == 0.0 && dy == 0.0 {
            None
        } else {
            Some(Self::new(dy.atan2(dx).to_degrees()))
        }
    }

    /// Unit direction of this heading.
    pub fn direction(&self) -> (f32, f32) {
        let rad = self.degrees.to_radians();
        (rad.cos(), rad.sin())
    }

    /// Turn toward `target` by at most `max_step` degrees along the shorter arc.
    pub fn rotate_toward(&mut self, target: f32, max_step: f32) {
        let diff = wrap_degrees(target - self.degrees);
        if diff.abs() <= max_step {
            self.degrees = wrap_degrees(target);
        } else {
            self.degrees = wrap_degrees(self.degrees + max_step * diff.signum());
        }
    }

    /// Sprite rotation for rendering. Ship art points up, so add a quarter turn.
    pub fn sprite_rotation(&self) -> f32 {
        self.degrees + 90.0
    }
}

/// Wrap an angle into [-180, 180].
pub fn wrap_degrees(degrees: f32) -> f32 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && degrees > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Half extents of an entity's collision box, centered on its position.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hitbox {
    pub half_width: f32,
    pub half_height: f32,
}

impl Hitbox {
    pub fn square(half_extent: f32) -> Self {
        Self {
            half_width: half_extent,
            half_height: half_extent,
        }
    }

    pub fn at(&self, pos: &Position) -> Aabb {
        Aabb::centered(pos.x, pos.y, self.half_width, self.half_height)
    }
}

// ============================================================================
// IDENTITY COMPONENTS
// ============================================================================

/// Marker for the single player ship.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Player speed and turn rate.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerControl {
    /// Units per second along each active axis.
    pub speed: f32,
    /// Maximum turn rate in degrees per second.
    pub turn_rate: f32,
}

/// Marker plus spawn-order identifier for enemy ships.
#[derive(
    Component, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Enemy(pub u32);

/// Texture and size used to draw an entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Appearance {
    pub texture: Option<TextureHandle>,
    /// Index of the sprite variant (enemies only; 0 for the player).
    pub variant: usize,
}

// ============================================================================
// COMBAT COMPONENTS
// ============================================================================

/// Health of a ship, clamped to [0, max].
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    pub fn is_dead(&self) -> bool {
        !self.is_alive()
    }

    /// Subtract `amount`, flooring at zero. Negative amounts are ignored.
    pub fn take_damage(&mut self, amount: f32) {
        self.current = (self.current - amount.max(0.0)).max(0.0);
    }

    /// Overwrite health, clamped to [0, max].
    pub fn set(&mut self, value: f32) {
        self.current = value.clamp(0.0, self.max);
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100.0)
    }
}

/// Cooldown-gated gun.
///
/// `since_shot` counts up to `cooldown` and stays there; firing resets it.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub cooldown: f32,
    pub since_shot: f32,
}

impl Weapon {
    /// A weapon that becomes ready one full cooldown after creation.
    pub fn new(cooldown: f32) -> Self {
        Self {
            cooldown,
            since_shot: 0.0,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.since_shot = (self.since_shot + dt).min(self.cooldown);
    }

    pub fn is_ready(&self) -> bool {
        self.since_shot >= self.cooldown
    }

    /// Consume readiness. Returns false when still cooling down.
    pub fn try_fire(&mut self) -> bool {
        if self.is_ready() {
            self.since_shot = 0.0;
            true
        } else {
            false
        }
    }
}

/// Gate on how often contact damage may hurt the player.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContactCooldown {
    pub cooldown: f32,
    pub elapsed: f32,
}

impl ContactCooldown {
    /// Starts ready.
    pub fn new(cooldown: f32) -> Self {
        Self {
            cooldown,
            elapsed: cooldown,
        }
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed = (self.elapsed + dt).min(self.cooldown);
    }

    pub fn is_ready(&self) -> bool {
        self.elapsed >= self.cooldown
    }

    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Damage the player, restarting its contact-damage window.
pub fn damage_player(health: &mut Health, contact: &mut ContactCooldown, amount: f32) {
    health.take_damage(amount);
    contact.reset();
}

/// A single ballistic shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
}

impl Projectile {
    /// Spawn `offset` units along `dir` from `(x, y)`, travelling at `speed`.
    /// A zero direction fires straight up.
    pub fn launch(x: f32, y: f32, dir: (f32, f32), offset: f32, speed: f32) -> Self {
        let len = (dir.0 * dir.0 + dir.1 * dir.1).sqrt();
        let (ux, uy) = if len > 0.0 {
            (dir.0 / len, dir.1 / len)
        } else {
            (0.0, -1.0)
        };
        Self {
            x: x + ux * offset,
            y: y + uy * offset,
            vx: ux * speed,
            vy: uy * speed,
        }
    }

    pub fn advance(&mut self, dt: f32) {
        self.x += self.vx * dt;
        self.y += self.vy * dt;
    }

    pub fn bounds(&self, half_extent: f32) -> Aabb {
        Aabb::centered(self.x, self.y, half_extent, half_extent)
    }
}

/// Projectiles fired by an entity, in creation order.
#[derive(Component, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Projectiles(pub Vec<Projectile>);

impl Projectiles {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.0.iter()
    }
}

// ============================================================================
// ENEMY AI COMPONENTS
// ============================================================================

/// Per-enemy tuning.
#[derive(Component, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyStats {
    pub speed: f32,
    pub engaged_speed_factor: f32,
    pub contact_damage: f32,
    pub detection_range: f32,
    pub shooting_range: f32,
}

impl EnemyStats {
    pub fn from_config(config: &SimConfig) -> Self {
        Self {
            speed: config.enemy_speed,
            engaged_speed_factor: config.enemy_engaged_speed_factor,
            contact_damage: config.enemy_contact_damage,
            detection_range: config.enemy_detection_range,
            shooting_range: config.enemy_shooting_range,
        }
    }

    /// Close enough to open fire. Distance is scaled by 1.5 before comparing.
    pub fn in_shooting_range(&self, distance: f32) -> bool {
        distance * 1.5 <= self.shooting_range
    }

    pub fn can_detect(&self, distance: f32) -> bool {
        distance <= self.detection_range
    }
}

/// What an enemy knows about the player this frame.
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Awareness {
    pub distance: f32,
    pub in_range: bool,
    /// Inside the camera view expanded by the margin.
    pub visible: bool,
    /// Within detection range. Nothing gates on this yet.
    pub can_see_player: bool,
}

impl Awareness {
    /// In range and on screen: slow down and shoot.
    pub fn is_engaging(&self) -> bool {
        self.in_range && self.visible
    }
}

// ============================================================================
// BUNDLE HELPERS
// ============================================================================

/// Bundle for spawning the player ship.
#[derive(Bundle)]
pub struct PlayerBundle {
    pub marker: Player,
    pub control: PlayerControl,
    pub position: Position,
    pub velocity: Velocity,
    pub facing: Facing,
    pub health: Health,
    pub weapon: Weapon,
    pub contact: ContactCooldown,
    pub hitbox: Hitbox,
    pub projectiles: Projectiles,
    pub appearance: Appearance,
}

impl PlayerBundle {
    pub fn new(config: &SimConfig, texture: Option<TextureHandle>) -> Self {
        Self {
            marker: Player,
            control: PlayerControl {
                speed: config.player_speed,
                turn_rate: config.player_turn_rate,
            },
            position: Position::new(config.player_start.0, config.player_start.1),
            velocity: Velocity::default(),
            facing: Facing::default(),
            health: Health::new(config.player_max_health),
            weapon: Weapon::new(config.player_shoot_cooldown),
            contact: ContactCooldown::new(config.player_contact_cooldown),
            hitbox: Hitbox::square(config.player_half_extent),
            projectiles: Projectiles::default(),
            appearance: Appearance { texture, variant: 0 },
        }
    }
}

/// Bundle for spawning an enemy ship.
#[derive(Bundle)]
pub struct EnemyBundle {
    pub id: Enemy,
    pub position: Position,
    pub velocity: Velocity,
    pub facing: Facing,
    pub health: Health,
    pub weapon: Weapon,
    pub stats: EnemyStats,
    pub awareness: Awareness,
    pub hitbox: Hitbox,
    pub projectiles: Projectiles,
    pub appearance: Appearance,
}

impl EnemyBundle {
    pub fn new(
        id: u32,
        x: f32,
        y: f32,
        variant: usize,
        config: &SimConfig,
        texture: Option<TextureHandle>,
    ) -> Self {
        Self {
            id: Enemy(id),
            position: Position::new(x, y),
            velocity: Velocity::default(),
            facing: Facing::default(),
            health: Health::new(config.enemy_max_health),
            weapon: Weapon::new(config.enemy_shoot_cooldown),
            stats: EnemyStats::from_config(config),
            awareness: Awareness::default(),
            hitbox: Hitbox::square(config.enemy_half_extent),
            projectiles: Projectiles::default(),
            appearance: Appearance {
                texture,
                variant: variant.min(2),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps() {
        let mut health = Health::new(200.0);
        health.take_damage(250.0);
        assert_eq!(health.current, 0.0);
        assert!(health.is_dead());

        let mut health = Health::new(50.0);
        for amount in [0.0, 10.0, 3.5, 0.0, 100.0, 7.0] {
            health.take_damage(amount);
            assert!(health.current >= 0.0 && health.current <= health.max);
        }
        health.take_damage(-20.0);
        assert_eq!(health.current, 0.0);

        health.set(999.0);
        assert_eq!(health.current, 50.0);
    }

    #[test]
    fn test_weapon_cooldown_clamps_and_resets() {
        let mut weapon = Weapon::new(0.8);
        assert!(!weapon.try_fire());

        weapon.tick(5.0);
        assert_eq!(weapon.since_shot, 0.8);
        assert!(weapon.try_fire());
        assert!(!weapon.try_fire());

        weapon.tick(0.5);
        assert!(!weapon.is_ready());
        weapon.tick(0.3);
        assert!(weapon.is_ready());
    }

    #[test]
    fn test_wrap_degrees() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(180.0), 180.0);
        assert_eq!(wrap_degrees(-180.0), -180.0);
        assert_eq!(wrap_degrees(720.0), 0.0);
    }

    #[test]
    fn test_rotate_toward_takes_short_way() {
        // From 170° to -170° is 20° counter-clockwise through the wrap
        let mut facing = Facing::new(170.0);
        facing.rotate_toward(-170.0, 5.0);
        assert!((facing.degrees - 175.0).abs() < 1e-4);
        facing.rotate_toward(-170.0, 5.0);
        assert!((facing.degrees.abs() - 180.0).abs() < 1e-4);
        facing.rotate_toward(-170.0, 50.0);
        assert!((facing.degrees + 170.0).abs() < 1e-4);
    }

    #[test]
    fn test_projectile_launch() {
        let p = Projectile::launch(10.0, 10.0, (3.0, 4.0), 25.0, 800.0);
        assert!((p.x - 25.0).abs() < 1e-4);
        assert!((p.y - 30.0).abs() < 1e-4);
        assert!((p.vx - 480.0).abs() < 1e-3);
        assert!((p.vy - 640.0).abs() < 1e-3);

        let up = Projectile::launch(0.0, 0.0, (0.0, 0.0), 0.0, 800.0);
        assert_eq!((up.vx, up.vy), (0.0, -800.0));
    }

    #[test]
    fn test_shooting_range_is_scaled() {
        let stats = EnemyStats::from_config(&SimConfig::default());
        assert!(stats.in_shooting_range(50.0));
        assert!(stats.in_shooting_range(66.0));
        assert!(!stats.in_shooting_range(67.0));
    }
}
