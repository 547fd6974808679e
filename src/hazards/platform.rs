use glam::Vec3;

use crate::trigger::{ActorId, OverlapEventType, OverlapTracker, TriggerVolume};

const TRIGGER_OFFSET_FORWARD: f32 = 80.0;
const TRIGGER_OFFSET_UP: f32 = 150.0;
/// forward, up, side
const TRIGGER_HALF_EXTENTS: Vec3 = Vec3::new(40.0, 64.0, 96.0);

/// Platform with a trigger box in front and one behind, reporting which one
/// the player is standing in.
#[derive(Debug, Clone)]
pub struct SamplePlatform {
    pub front: TriggerVolume,
    pub back: TriggerVolume,
    front_overlaps: OverlapTracker,
    back_overlaps: OverlapTracker,
    is_front_collided: bool,
    is_back_collided: bool,
}

impl SamplePlatform {
    /// `forward` must be horizontal along X or Z; triggers are axis aligned.
    pub fn new(origin: Vec3, forward: Vec3) -> Self {
        let along_x = forward.x.abs() >= forward.z.abs();
        let sign = if along_x { forward.x.signum() } else { forward.z.signum() };
        let (axis, half_extents) = if along_x {
            (
                Vec3::X * sign,
                Vec3::new(TRIGGER_HALF_EXTENTS.x, TRIGGER_HALF_EXTENTS.y, TRIGGER_HALF_EXTENTS.z),
            )
        } else {
            (
                Vec3::Z * sign,
                Vec3::new(TRIGGER_HALF_EXTENTS.z, TRIGGER_HALF_EXTENTS.y, TRIGGER_HALF_EXTENTS.x),
            )
        };
        let up = Vec3::Y * TRIGGER_OFFSET_UP;
        Self {
            front: TriggerVolume::Box {
                center: origin + axis * TRIGGER_OFFSET_FORWARD + up,
                half_extents,
            },
            back: TriggerVolume::Box {
                center: origin - axis * TRIGGER_OFFSET_FORWARD + up,
                half_extents,
            },
            front_overlaps: OverlapTracker::new(),
            back_overlaps: OverlapTracker::new(),
            is_front_collided: false,
            is_back_collided: false,
        }
    }

    pub fn is_front_collided(&self) -> bool {
        self.is_front_collided
    }

    pub fn is_back_collided(&self) -> bool {
        self.is_back_collided
    }

    pub fn tick(&mut self, other: ActorId, bounds: (Vec3, Vec3)) {
        let front = self.front.intersects_aabb(bounds.0, bounds.1);
        if let Some(event) = self.front_overlaps.update(other, front) {
            self.is_front_collided = event.event_type == OverlapEventType::Begin;
            log::debug!("Platform front {:?}", event.event_type);
        }
        let back = self.back.intersects_aabb(bounds.0, bounds.1);
        if let Some(event) = self.back_overlaps.update(other, back) {
            self.is_back_collided = event.event_type == OverlapEventType::Begin;
            log::debug!("Platform back {:?}", event.event_type);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn around(center: Vec3) -> (Vec3, Vec3) {
        (center - Vec3::splat(10.0), center + Vec3::splat(10.0))
    }

    #[test]
    fn front_and_back_flags_follow_overlaps() {
        let mut platform = SamplePlatform::new(Vec3::ZERO, Vec3::X);
        let player = ActorId(1);

        platform.tick(player, around(Vec3::new(80.0, 150.0, 0.0)));
        assert!(platform.is_front_collided());
        assert!(!platform.is_back_collided());

        platform.tick(player, around(Vec3::new(-80.0, 150.0, 0.0)));
        assert!(!platform.is_front_collided());
        assert!(platform.is_back_collided());

        platform.tick(player, around(Vec3::new(0.0, 1000.0, 0.0)));
        assert!(!platform.is_front_collided());
        assert!(!platform.is_back_collided());
    }

    #[test]
    fn facing_z_swaps_extents() {
        let platform = SamplePlatform::new(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(platform.front.center(), Vec3::new(0.0, 150.0, -80.0));
        assert!(platform.front.contains_point(Vec3::new(90.0, 150.0, -80.0)));
        assert!(!platform.front.contains_point(Vec3::new(0.0, 150.0, -130.0)));
    }
}
