//! Course layout: static boxes for collision, spawn points and hazard placement.

use std::collections::HashMap;
use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{PhysicsWorld, SurfaceId, box_triangles};
use crate::config::HazardConfig;
use crate::error::CourseError;
use crate::hazards::{Laser, ProximityMine, SamplePlatform};
use crate::trigger::TriggerVolume;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxDesc {
    pub name: String,
    pub min: Vec3,
    pub max: Vec3,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaserDesc {
    pub center: Vec3,
    pub size: Vec3,
    #[serde(default)]
    pub phase: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MineDesc {
    pub center: Vec3,
    pub radius: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformDesc {
    pub origin: Vec3,
    pub forward: Vec3,
}

/// Serializable course description.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CourseDesc {
    pub boxes: Vec<BoxDesc>,
    pub spawn_points: Vec<Vec3>,
    pub lasers: Vec<LaserDesc>,
    pub mines: Vec<MineDesc>,
    pub platforms: Vec<PlatformDesc>,
}

fn block(name: &str, min: [f32; 3], max: [f32; 3]) -> BoxDesc {
    BoxDesc {
        name: name.to_string(),
        min: Vec3::from_array(min),
        max: Vec3::from_array(max),
    }
}

impl CourseDesc {
    /// Built-in test course, running down -Z: a run-up, a pit crossed along a
    /// wall on the right, a low wall to vault, a laser gate, a mine and a platform.
    pub fn demo() -> Self {
        Self {
            boxes: vec![
                block("floor_start", [-1000.0, -100.0, -800.0], [1000.0, 0.0, 1000.0]),
                block("wall_right", [200.0, 0.0, -2600.0], [240.0, 800.0, -700.0]),
                block("floor_far", [-1000.0, -100.0, -6000.0], [1000.0, 0.0, -2500.0]),
                block("low_wall", [-300.0, 0.0, -3020.0], [300.0, 100.0, -3000.0]),
                block("ledge", [-1000.0, 0.0, -6000.0], [1000.0, 180.0, -5800.0]),
            ],
            spawn_points: vec![Vec3::new(0.0, 200.0, 500.0), Vec3::new(0.0, 200.0, 700.0)],
            lasers: vec![LaserDesc {
                center: Vec3::new(0.0, 100.0, -3800.0),
                size: Vec3::new(2000.0, 20.0, 20.0),
                phase: 0.0,
            }],
            mines: vec![MineDesc {
                center: Vec3::new(0.0, 0.0, -4500.0),
                radius: 150.0,
            }],
            platforms: vec![PlatformDesc {
                origin: Vec3::new(0.0, 0.0, -5200.0),
                forward: Vec3::NEG_Z,
            }],
        }
    }

    pub fn from_json(text: &str) -> Result<Self, CourseError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CourseError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let desc = Self::from_json(&text)?;
        log::info!("Loaded course from {}", path.as_ref().display());
        Ok(desc)
    }
}

/// A course turned into a collision world and hazard actors.
pub struct LoadedCourse {
    pub physics: PhysicsWorld,
    pub surfaces: HashMap<String, SurfaceId>,
    pub spawn_points: Vec<Vec3>,
    pub lasers: Vec<Laser>,
    pub mines: Vec<ProximityMine>,
    pub platforms: Vec<SamplePlatform>,
    pub bounds_min: Vec3,
    pub bounds_max: Vec3,
}

impl LoadedCourse {
    pub fn build(desc: &CourseDesc, hazards: &HazardConfig) -> Result<Self, CourseError> {
        if desc.boxes.is_empty() {
            return Err(CourseError::Empty);
        }
        if desc.spawn_points.is_empty() {
            return Err(CourseError::NoSpawnPoints);
        }

        let mut physics = PhysicsWorld::new();
        let mut surfaces = HashMap::new();
        let mut bounds_min = Vec3::splat(f32::MAX);
        let mut bounds_max = Vec3::splat(f32::MIN);

        for b in &desc.boxes {
            let (min, max) = (b.min.min(b.max), b.min.max(b.max));
            let (vertices, indices) = box_triangles(min, max);
            let id = physics.add_surface(b.name.clone(), &vertices, &indices)?;
            surfaces.insert(b.name.clone(), id);
            bounds_min = bounds_min.min(min);
            bounds_max = bounds_max.max(max);
        }

        let lasers = desc
            .lasers
            .iter()
            .map(|l| {
                Laser::new(TriggerVolume::box_shape(l.center, l.size), hazards).with_phase(l.phase)
            })
            .collect();
        let mines = desc
            .mines
            .iter()
            .map(|m| ProximityMine::new(m.center, m.radius, hazards))
            .collect();
        let platforms = desc
            .platforms
            .iter()
            .map(|p| SamplePlatform::new(p.origin, p.forward))
            .collect();

        log::info!(
            "Course built: {} surfaces, {} spawn points, bounds {:?} - {:?}",
            physics.surface_count(),
            desc.spawn_points.len(),
            bounds_min,
            bounds_max
        );

        Ok(Self {
            physics,
            surfaces,
            spawn_points: desc.spawn_points.clone(),
            lasers,
            mines,
            platforms,
            bounds_min,
            bounds_max,
        })
    }

    pub fn surface(&self, name: &str) -> Option<SurfaceId> {
        self.surfaces.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_course_builds() {
        let course = LoadedCourse::build(&CourseDesc::demo(), &HazardConfig::default()).unwrap();
        assert_eq!(course.physics.surface_count(), 5);
        assert!(course.surface("wall_right").is_some());
        assert_eq!(course.lasers.len(), 1);
        assert_eq!(course.mines.len(), 1);
        assert_eq!(course.platforms.len(), 1);
        assert_eq!(course.bounds_min.z, -6000.0);
        assert_eq!(course.bounds_max.y, 800.0);
    }

    #[test]
    fn empty_course_is_rejected() {
        let err = LoadedCourse::build(&CourseDesc::default(), &HazardConfig::default()).err();
        assert!(matches!(err, Some(CourseError::Empty)));
    }

    #[test]
    fn course_without_spawns_is_rejected() {
        let desc = CourseDesc {
            spawn_points: Vec::new(),
            ..CourseDesc::demo()
        };
        let err = LoadedCourse::build(&desc, &HazardConfig::default()).err();
        assert!(matches!(err, Some(CourseError::NoSpawnPoints)));
    }

    #[test]
    fn course_parses_from_json() {
        let desc = CourseDesc::from_json(
            r#"{
                "boxes": [{ "name": "floor", "min": [-100, -10, -100], "max": [100, 0, 100] }],
                "spawn_points": [[0, 100, 0]]
            }"#,
        )
        .unwrap();
        assert_eq!(desc.boxes.len(), 1);
        assert!(desc.lasers.is_empty());
        let course = LoadedCourse::build(&desc, &HazardConfig::default()).unwrap();
        let down = course
            .physics
            .line_trace(Vec3::new(0.0, 50.0, 0.0), Vec3::new(0.0, -50.0, 0.0));
        assert!(down.is_some());
    }
}
