//! Multi-jump accounting and launch velocity.

use glam::{Vec2, Vec3};

use crate::geometry::WallSide;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpCounter {
    jump_left: u32,
    max_jump: u32,
}

impl JumpCounter {
    pub fn new(max_jump: u32) -> Self {
        Self {
            jump_left: max_jump,
            max_jump,
        }
    }

    pub fn jump_left(&self) -> u32 {
        self.jump_left
    }

    pub fn max_jump(&self) -> u32 {
        self.max_jump
    }

    /// Try to spend a jump. Wall-running always allows one and spends nothing.
    pub fn jump_used(&mut self, is_wall_running: bool) -> bool {
        if is_wall_running {
            return true;
        }
        if self.jump_left > 0 {
            self.jump_left -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self, jumps: i64) {
        self.jump_left = jumps.clamp(0, self.max_jump as i64) as u32;
    }

    pub fn refill(&mut self) {
        self.jump_left = self.max_jump;
    }
}

/// Where a jump sends the character.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaunchContext {
    Grounded,
    Falling { move_axis: Vec2 },
    WallRunning { direction: Vec3, side: WallSide },
}

/// `(direction + up) * jump_z_velocity`, with the direction picked by context.
///
/// Off a wall the direction points away from it; in the air it follows the
/// move axis; on the ground the jump is straight up.
pub fn launch_velocity(
    context: LaunchContext,
    forward: Vec3,
    right: Vec3,
    jump_z_velocity: f32,
) -> Vec3 {
    let direction = match context {
        LaunchContext::Grounded => Vec3::ZERO,
        LaunchContext::Falling { move_axis } => right * move_axis.x + forward * move_axis.y,
        LaunchContext::WallRunning { direction, side } => direction.cross(Vec3::Y * -side.sign()),
    };
    (direction + Vec3::Y) * jump_z_velocity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{find_run_direction_and_side, forward_from_yaw, right_from_yaw};

    #[test]
    fn counts_down_and_refuses_when_empty() {
        let mut jumps = JumpCounter::new(2);
        assert!(jumps.jump_used(false));
        assert!(jumps.jump_used(false));
        assert_eq!(jumps.jump_left(), 0);
        assert!(!jumps.jump_used(false));
        assert_eq!(jumps.jump_left(), 0);
    }

    #[test]
    fn wall_running_jump_is_free() {
        let mut jumps = JumpCounter::new(2);
        jumps.reset(0);
        assert!(jumps.jump_used(true));
        assert_eq!(jumps.jump_left(), 0);
    }

    #[test]
    fn reset_clamps_to_range() {
        let mut jumps = JumpCounter::new(2);
        jumps.reset(5);
        assert_eq!(jumps.jump_left(), 2);
        jumps.reset(-3);
        assert_eq!(jumps.jump_left(), 0);
        jumps.reset(1);
        assert_eq!(jumps.jump_left(), 1);
        jumps.refill();
        assert_eq!(jumps.jump_left(), 2);
    }

    #[test]
    fn grounded_launch_is_vertical() {
        let v = launch_velocity(LaunchContext::Grounded, Vec3::NEG_Z, Vec3::X, 700.0);
        assert_eq!(v, Vec3::new(0.0, 700.0, 0.0));
    }

    #[test]
    fn falling_launch_follows_move_axis() {
        let forward = forward_from_yaw(0.0);
        let right = right_from_yaw(0.0);
        let v = launch_velocity(
            LaunchContext::Falling {
                move_axis: Vec2::new(1.0, 0.0),
            },
            forward,
            right,
            700.0,
        );
        assert!((v - Vec3::new(700.0, 700.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn wall_launch_points_away_from_wall() {
        for yaw in [0.0f32, 1.0, -2.2] {
            let right = right_from_yaw(yaw);
            for normal in [right, -right] {
                let (direction, side) = find_run_direction_and_side(normal, right);
                let v = launch_velocity(
                    LaunchContext::WallRunning { direction, side },
                    forward_from_yaw(yaw),
                    right,
                    700.0,
                );
                assert!(v.dot(normal) > 600.0, "yaw {} normal {:?}", yaw, normal);
                assert!((v.y - 700.0).abs() < 1e-3);
            }
        }
    }
}
