//! Weapon orientation: capped slew toward a target, smoothed return to rest.

use bevy::prelude::*;

/// Rotates `current` toward the look rotation `from → to`, by at most
/// `max_step` radians. Never overshoots; a degenerate direction keeps
/// `current`.
pub fn slew_towards(current: Quat, from: Vec3, to: Vec3, max_step: f32) -> Quat {
    let direction = to - from;
    if direction.length_squared() <= f32::EPSILON {
        return current;
    }

    let look = Transform::IDENTITY.looking_to(direction, Vec3::Y).rotation;
    let angle = current.angle_between(look);
    if angle <= max_step {
        return look;
    }

    current.slerp(look, max_step / angle).normalize()
}

/// One tick of exponential smoothing toward the rest (identity) orientation.
pub fn relax_towards_rest(local: Quat, blend: f32) -> Quat {
    local.lerp(Quat::IDENTITY, blend)
}
