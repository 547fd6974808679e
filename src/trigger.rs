//! Trigger volumes and begin/end overlap tracking.

use std::collections::HashSet;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Identifies an actor that can overlap trigger volumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId(pub u64);

/// Trigger volume shapes, in world space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriggerVolume {
    /// Axis-aligned box
    Box { center: Vec3, half_extents: Vec3 },
    /// Sphere
    Sphere { center: Vec3, radius: f32 },
}

impl TriggerVolume {
    pub fn box_shape(center: Vec3, size: Vec3) -> Self {
        Self::Box {
            center,
            half_extents: size * 0.5,
        }
    }

    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere { center, radius }
    }

    pub fn center(&self) -> Vec3 {
        match *self {
            Self::Box { center, .. } | Self::Sphere { center, .. } => center,
        }
    }

    pub fn contains_point(&self, point: Vec3) -> bool {
        match *self {
            Self::Box {
                center,
                half_extents,
            } => {
                let d = (point - center).abs();
                d.x <= half_extents.x && d.y <= half_extents.y && d.z <= half_extents.z
            }
            Self::Sphere { center, radius } => point.distance_squared(center) <= radius * radius,
        }
    }

    /// Whether the volume intersects an axis-aligned box.
    pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
        match *self {
            Self::Box {
                center,
                half_extents,
            } => {
                let bmin = center - half_extents;
                let bmax = center + half_extents;
                bmin.x <= max.x
                    && bmax.x >= min.x
                    && bmin.y <= max.y
                    && bmax.y >= min.y
                    && bmin.z <= max.z
                    && bmax.z >= min.z
            }
            Self::Sphere { center, radius } => {
                let closest = center.clamp(min, max);
                closest.distance_squared(center) <= radius * radius
            }
        }
    }
}

/// Type of overlap event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapEventType {
    Begin,
    End,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapEvent {
    pub event_type: OverlapEventType,
    pub other: ActorId,
}

/// Remembers who is inside a volume and reports transitions only.
#[derive(Debug, Clone, Default)]
pub struct OverlapTracker {
    overlapping: HashSet<ActorId>,
}

impl OverlapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current overlap state of `other`; returns an event on change.
    pub fn update(&mut self, other: ActorId, is_overlapping: bool) -> Option<OverlapEvent> {
        let event_type = match (is_overlapping, self.overlapping.contains(&other)) {
            (true, false) => {
                self.overlapping.insert(other);
                OverlapEventType::Begin
            }
            (false, true) => {
                self.overlapping.remove(&other);
                OverlapEventType::End
            }
            _ => return None,
        };
        Some(OverlapEvent { event_type, other })
    }

    pub fn is_overlapping(&self, other: ActorId) -> bool {
        self.overlapping.contains(&other)
    }

    /// Forget everyone inside without emitting end events (collision turned off).
    pub fn reset(&mut self) {
        self.overlapping.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_contains_and_intersects() {
        let volume = TriggerVolume::box_shape(Vec3::ZERO, Vec3::splat(100.0));
        assert!(volume.contains_point(Vec3::new(49.0, -49.0, 0.0)));
        assert!(!volume.contains_point(Vec3::new(51.0, 0.0, 0.0)));
        assert!(volume.intersects_aabb(Vec3::splat(40.0), Vec3::splat(200.0)));
        assert!(!volume.intersects_aabb(Vec3::splat(60.0), Vec3::splat(200.0)));
    }

    #[test]
    fn sphere_intersects_nearby_box() {
        let volume = TriggerVolume::sphere(Vec3::ZERO, 10.0);
        assert!(volume.intersects_aabb(Vec3::new(5.0, -1.0, -1.0), Vec3::new(20.0, 1.0, 1.0)));
        assert!(!volume.intersects_aabb(Vec3::new(8.0, 8.0, 8.0), Vec3::splat(20.0)));
    }

    #[test]
    fn tracker_reports_transitions_once() {
        let mut tracker = OverlapTracker::new();
        let player = ActorId(1);
        assert_eq!(tracker.update(player, false), None);
        let begin = tracker.update(player, true).unwrap();
        assert_eq!(begin.event_type, OverlapEventType::Begin);
        assert_eq!(tracker.update(player, true), None);
        assert!(tracker.is_overlapping(player));
        let end = tracker.update(player, false).unwrap();
        assert_eq!(end.event_type, OverlapEventType::End);
        assert_eq!(tracker.update(player, false), None);
    }

    #[test]
    fn reset_allows_new_begin() {
        let mut tracker = OverlapTracker::new();
        tracker.update(ActorId(1), true);
        tracker.reset();
        assert!(tracker.update(ActorId(1), true).is_some());
    }
}
