//! Pure vector helpers for wall detection and velocity shaping.
//!
//! Convention: right-handed, Y up. A yaw of zero looks down -Z, with +X on
//! the right (`right = forward × up`).

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::OVERHANG_NORMAL_Y;

/// Which side of the character a wall is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

impl WallSide {
    /// +1 for a wall on the right, -1 for a wall on the left.
    pub fn sign(self) -> f32 {
        match self {
            WallSide::Left => -1.0,
            WallSide::Right => 1.0,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            WallSide::Left => WallSide::Right,
            WallSide::Right => WallSide::Left,
        }
    }
}

pub fn forward_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.sin(), 0.0, -yaw.cos())
}

pub fn right_from_yaw(yaw: f32) -> Vec3 {
    Vec3::new(yaw.cos(), 0.0, yaw.sin())
}

/// Inverse of [`forward_from_yaw`] for the horizontal part of `direction`.
pub fn yaw_from_direction(direction: Vec3) -> f32 {
    direction.x.atan2(-direction.z)
}

pub fn look_direction_from_angles(yaw: f32, pitch: f32) -> Vec3 {
    Vec3::new(
        yaw.sin() * pitch.cos(),
        pitch.sin(),
        -yaw.cos() * pitch.cos(),
    )
    .normalize()
}

/// Drop the vertical component.
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

pub fn horizontal(v: Vec3) -> Vec2 {
    Vec2::new(v.x, v.z)
}

pub fn with_horizontal(v: Vec3, h: Vec2) -> Vec3 {
    Vec3::new(h.x, v.y, h.y)
}

/// Whether a surface with this normal can be wall-run.
///
/// Overhangs (normal pointing down past a small tolerance) are rejected.
/// Otherwise the normal's elevation above the horizontal plane must be
/// below the walkable floor angle, i.e. the surface is too steep to stand on.
/// Only the direction of `normal` matters.
pub fn is_surface_wall_ran(normal: Vec3, walkable_floor_angle: f32) -> bool {
    let Some(normal) = normal.try_normalize() else {
        return false;
    };
    if normal.y < OVERHANG_NORMAL_Y {
        return false;
    }

    let Some(flat) = flatten(normal).try_normalize() else {
        return false;
    };
    let angle = flat.dot(normal).clamp(-1.0, 1.0).acos().to_degrees();
    angle < walkable_floor_angle
}

/// Resolve which side a wall is on and the direction to run along it.
///
/// A normal pointing toward the character's right means the wall is on the
/// left. The returned direction is horizontal, unit length, perpendicular to
/// the wall normal and on the character's forward side of the wall.
pub fn find_run_direction_and_side(wall_normal: Vec3, right: Vec3) -> (Vec3, WallSide) {
    let side = if horizontal(wall_normal).dot(horizontal(right)) > 0.0 {
        WallSide::Left
    } else {
        WallSide::Right
    };
    let direction = wall_normal
        .cross(Vec3::Y * side.sign())
        .normalize_or_zero();
    (direction, side)
}

/// Scale horizontal velocity down so its length is at most `max_speed`.
/// Vertical velocity is untouched.
pub fn clamp_horizontal_velocity(velocity: Vec3, max_speed: f32) -> Vec3 {
    let h = horizontal(velocity);
    let length = h.length();
    if max_speed <= 0.0 || length <= max_speed {
        return velocity;
    }
    with_horizontal(velocity, h * (max_speed / length))
}

/// Angle (degrees) between a surface normal and straight up.
pub fn slope_angle(normal: Vec3) -> f32 {
    normal
        .normalize_or_zero()
        .dot(Vec3::Y)
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees()
}
