//! Wall-run session state and the per-tick wall re-check.

use glam::{Vec2, Vec3};

use crate::collision::{PhysicsWorld, SurfaceId};
use crate::config::{WALL_RUN_KEY_THRESHOLD, WALL_TRACE_LENGTH};
use crate::geometry::{self, WallSide};
use crate::timer::TimerHandle;

/// Why a wall-run ended. Decides how many jumps are handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallRunEnd {
    FallOff,
    JumpOff,
}

/// An active run along one wall.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallRunSession {
    pub wall: SurfaceId,
    pub side: WallSide,
    pub direction: Vec3,
    pub fallback: TimerHandle,
}

/// Result of re-tracing the wall during a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WallRunUpdate {
    /// Still on a wall on the same side
    Continue { wall: SurfaceId, direction: Vec3 },
    /// Wall gone, no longer runnable, or now on the other side
    Lost,
}

/// Forward held, and strafing toward the wall.
pub fn are_keys_required(move_axis: Vec2, side: WallSide) -> bool {
    let toward_wall = move_axis.x * side.sign();
    move_axis.y > WALL_RUN_KEY_THRESHOLD && toward_wall > WALL_RUN_KEY_THRESHOLD
}

/// Trace sideways toward `side` for a wall to run on.
pub fn trace_side(
    world: &PhysicsWorld,
    position: Vec3,
    right: Vec3,
    side: WallSide,
    walkable_floor_angle: f32,
) -> Option<(SurfaceId, Vec3, WallSide)> {
    let end = position + right * (WALL_TRACE_LENGTH * side.sign());
    let hit = world.line_trace(position, end)?;
    if !geometry::is_surface_wall_ran(hit.normal, walkable_floor_angle) {
        return None;
    }
    let (direction, found_side) = geometry::find_run_direction_and_side(hit.normal, right);
    Some((hit.surface, direction, found_side))
}

/// Trace both sides, right first, for the Wallrun action.
pub fn find_wall(
    world: &PhysicsWorld,
    position: Vec3,
    right: Vec3,
    walkable_floor_angle: f32,
) -> Option<(SurfaceId, Vec3, WallSide)> {
    trace_side(world, position, right, WallSide::Right, walkable_floor_angle)
        .or_else(|| trace_side(world, position, right, WallSide::Left, walkable_floor_angle))
}

/// Re-trace toward the session's side and recompute the run direction.
pub fn update_direction(
    world: &PhysicsWorld,
    position: Vec3,
    right: Vec3,
    session: &WallRunSession,
    walkable_floor_angle: f32,
) -> WallRunUpdate {
    match trace_side(world, position, right, session.side, walkable_floor_angle) {
        Some((wall, direction, side)) if side == session.side => {
            WallRunUpdate::Continue { wall, direction }
        }
        _ => WallRunUpdate::Lost,
    }
}
