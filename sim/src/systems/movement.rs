//! Movement systems - player steering, integration, and the follow camera.

use crate::components::*;
use crate::input::InputState;
use crate::view::Camera;
use bevy_ecs::prelude::*;

/// Resource containing the delta time for the current frame.
#[derive(Resource, Default)]
pub struct DeltaTime(pub f32);

/// System that turns the player toward the pointer and sets its velocity from
/// the movement keys.
///
/// Axes are not normalized: holding two directions moves faster diagonally.
pub fn player_control_system(
    dt: Res<DeltaTime>,
    input: Res<InputState>,
    mut query: Query<(&Position, &PlayerControl, &mut Facing, &mut Velocity), With<Player>>,
) {
    let (ax, ay) = input.axes();
    let pointer = Position::new(input.pointer.0, input.pointer.1);

    for (pos, control, mut facing, mut vel) in query.iter_mut() {
        if let Some(target) = Facing::toward(pos, &pointer) {
            facing.rotate_toward(target.degrees, control.turn_rate * dt.0);
        }
        vel.vx = ax * control.speed;
        vel.vy = ay * control.speed;
    }
}

/// System that applies velocity to position for entities tagged `T`.
pub fn movement_system<T: Component>(
    dt: Res<DeltaTime>,
    mut query: Query<(&mut Position, &Velocity), With<T>>,
) {
    let delta = dt.0;
    for (mut pos, vel) in query.iter_mut() {
        pos.x += vel.vx * delta;
        pos.y += vel.vy * delta;
    }
}

/// System that advances the player's contact-damage window.
pub fn contact_cooldown_system(dt: Res<DeltaTime>, mut query: Query<&mut ContactCooldown>) {
    for mut contact in query.iter_mut() {
        contact.tick(dt.0);
    }
}

/// System that recenters the camera on the player.
pub fn camera_follow_system(mut camera: ResMut<Camera>, query: Query<&Position, With<Player>>) {
    for pos in query.iter() {
        camera.recenter(pos.x, pos.y);
    }
}
