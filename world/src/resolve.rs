//! Elastic resolution of agent motion against the arena walls.

use glam::Vec2;
use monster_couch_core::{ArenaBounds, Axis};

/// Outcome of resolving an integrated position against the arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Resolution {
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) bounces: [Option<Axis>; 2],
}

/// Clamps the position into the arena and reflects the velocity on every axis
/// that reached a wall.
///
/// Axes are resolved independently, so a corner hit reflects both components.
/// The position is placed exactly on the wall and reflected once per axis,
/// even when the step overshot by more than one reflection's worth.
pub(crate) fn resolve(position: Vec2, velocity: Vec2, bounds: &ArenaBounds) -> Resolution {
    let min = bounds.min();
    let max = bounds.max();
    let mut resolved = position;
    let mut velocity = velocity;
    let mut bounces = [None, None];

    if position.x <= min.x {
        resolved.x = min.x;
        velocity = reflect(velocity, Vec2::X);
        bounces[0] = Some(Axis::Horizontal);
    } else if position.x >= max.x {
        resolved.x = max.x;
        velocity = reflect(velocity, Vec2::NEG_X);
        bounces[0] = Some(Axis::Horizontal);
    }

    if position.y <= min.y {
        resolved.y = min.y;
        velocity = reflect(velocity, Vec2::Y);
        bounces[1] = Some(Axis::Vertical);
    } else if position.y >= max.y {
        resolved.y = max.y;
        velocity = reflect(velocity, Vec2::NEG_Y);
        bounces[1] = Some(Axis::Vertical);
    }

    Resolution {
        position: resolved,
        velocity,
        bounces,
    }
}

/// Mirrors `velocity` about the plane with unit `normal`.
fn reflect(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}
