//! Per-frame input snapshot.
//!
//! The simulation never talks to a device. An [`InputSource`] collaborator is
//! polled once per frame into an [`InputState`], which the systems read.

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

/// Logical input actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Fire,
    Restart,
    Quit,
}

/// Collaborator answering "is this held right now" queries.
pub trait InputSource {
    fn is_pressed(&self, action: Action) -> bool;
    /// Cursor position mapped into world coordinates.
    fn pointer_world_position(&self) -> (f32, f32);
}

/// Input sampled for a single frame.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
    pub restart: bool,
    pub quit: bool,
    pub pointer: (f32, f32),
}

impl InputState {
    /// Sample every action from `source`.
    pub fn poll(source: &dyn InputSource) -> Self {
        Self {
            up: source.is_pressed(Action::MoveUp),
            down: source.is_pressed(Action::MoveDown),
            left: source.is_pressed(Action::MoveLeft),
            right: source.is_pressed(Action::MoveRight),
            fire: source.is_pressed(Action::Fire),
            restart: source.is_pressed(Action::Restart),
            quit: source.is_pressed(Action::Quit),
            pointer: source.pointer_world_position(),
        }
    }

    /// Idle input with the pointer at `(x, y)`.
    pub fn pointing_at(x: f32, y: f32) -> Self {
        Self {
            pointer: (x, y),
            ..Default::default()
        }
    }

    /// Movement axes as (-1, 0, 1) per axis. Opposite keys cancel.
    pub fn axes(&self) -> (f32, f32) {
        let axis = |neg: bool, pos: bool| (pos as i32 - neg as i32) as f32;
        (axis(self.left, self.right), axis(self.up, self.down))
    }
}

impl InputSource for InputState {
    fn is_pressed(&self, action: Action) -> bool {
        match action {
            Action::MoveUp => self.up,
            Action::MoveDown => self.down,
            Action::MoveLeft => self.left,
            Action::MoveRight => self.right,
            Action::Fire => self.fire,
            Action::Restart => self.restart,
            Action::Quit => self.quit,
        }
    }

    fn pointer_world_position(&self) -> (f32, f32) {
        self.pointer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes() {
        let mut input = InputState::default();
        assert_eq!(input.axes(), (0.0, 0.0));

        input.right = true;
        input.up = true;
        assert_eq!(input.axes(), (1.0, -1.0));

        input.left = true;
        assert_eq!(input.axes(), (0.0, -1.0));
    }

    #[test]
    fn test_poll_round_trips_through_source() {
        let source = InputState {
            fire: true,
            down: true,
            pointer: (3.0, 4.0),
            ..Default::default()
        };
        assert_eq!(InputState::poll(&source), source);
    }
}
