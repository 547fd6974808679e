use glam::Vec3;
use parry3d::math::{Pose3, Vector};
use parry3d::query::{Ray, RayCast};
use parry3d::shape::TriMesh;

use crate::config::*;
use crate::error::CourseError;

/// Stable handle of a static surface in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub usize);

/// Result of a line trace that hit something.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceHit {
    pub surface: SurfaceId,
    pub point: Vec3,
    /// Unit normal facing back toward the trace origin.
    pub normal: Vec3,
    pub distance: f32,
}

/// Vertical capsule approximating the character body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    pub radius: f32,
    pub half_height: f32,
}

impl Default for Capsule {
    fn default() -> Self {
        Self {
            radius: CAPSULE_RADIUS,
            half_height: CAPSULE_HALF_HEIGHT,
        }
    }
}

impl Capsule {
    pub fn bounds(&self, center: Vec3) -> (Vec3, Vec3) {
        let extent = Vec3::new(self.radius, self.half_height, self.radius);
        (center - extent, center + extent)
    }
}

/// What happened when moving the character for one step.
#[derive(Debug, Clone, Default)]
pub struct MoveResult {
    pub position: Vec3,
    pub on_ground: bool,
    pub ground_normal: Option<Vec3>,
    pub hit_ceiling: bool,
    /// Walls the capsule is touching after resolution.
    pub wall_hits: Vec<TraceHit>,
    /// Walls within the wider wall-detection radius.
    pub nearby_walls: Vec<TraceHit>,
}

struct Surface {
    id: SurfaceId,
    name: String,
    trimesh: TriMesh,
}

/// Static collision geometry queried by line traces.
pub struct PhysicsWorld {
    surfaces: Vec<Surface>,
    next_id: usize,
}

const WALL_PROBE_DIRECTIONS: usize = 8;
const CONTACT_MARGIN: f32 = 2.0;

impl PhysicsWorld {
    pub fn new() -> Self {
        Self {
            surfaces: Vec::new(),
            next_id: 0,
        }
    }

    /// Add a surface made of triangles; returns its handle.
    pub fn add_surface(
        &mut self,
        name: impl Into<String>,
        vertices: &[Vec3],
        indices: &[[u32; 3]],
    ) -> Result<SurfaceId, CourseError> {
        let id = SurfaceId(self.next_id);
        if vertices.is_empty() || indices.is_empty() {
            return Err(CourseError::InvalidMesh(id.0));
        }

        let vertices: Vec<Vector> = vertices
            .iter()
            .map(|v| Vector::new(v.x, v.y, v.z))
            .collect();
        let trimesh =
            TriMesh::new(vertices, indices.to_vec()).map_err(|_| CourseError::InvalidMesh(id.0))?;

        self.next_id += 1;
        self.surfaces.push(Surface {
            id,
            name: name.into(),
            trimesh,
        });
        Ok(id)
    }

    /// Remove a surface, e.g. a destroyed wall. Returns false if it was unknown.
    pub fn remove_surface(&mut self, id: SurfaceId) -> bool {
        let Some(index) = self.surfaces.iter().position(|s| s.id == id) else {
            return false;
        };
        let surface = self.surfaces.remove(index);
        log::info!("Removed surface {} ({:?})", surface.name, id);
        true
    }

    pub fn contains(&self, id: SurfaceId) -> bool {
        self.surfaces.iter().any(|s| s.id == id)
    }

    pub fn surface_count(&self) -> usize {
        self.surfaces.len()
    }

    fn cast_ray(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<TraceHit> {
        let ray = Ray::new(
            Vector::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );

        let mut best: Option<TraceHit> = None;
        for surface in &self.surfaces {
            let Some(hit) = surface
                .trimesh
                .cast_ray_and_get_normal(&Pose3::IDENTITY, &ray, max_dist, true)
            else {
                continue;
            };
            if best.is_some_and(|b| b.distance <= hit.time_of_impact) {
                continue;
            }

            let mut normal =
                Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z).normalize_or_zero();
            // Triangle winding is not trusted; face the normal toward the ray.
            if normal.dot(dir) > 0.0 {
                normal = -normal;
            }
            best = Some(TraceHit {
                surface: surface.id,
                point: origin + dir * hit.time_of_impact,
                normal,
                distance: hit.time_of_impact,
            });
        }
        best
    }

    /// Trace a segment and return the closest hit, if any.
    pub fn line_trace(&self, start: Vec3, end: Vec3) -> Option<TraceHit> {
        let delta = end - start;
        let len = delta.length();
        if len <= 1e-6 {
            return None;
        }
        self.cast_ray(start, delta / len, len)
    }

    /// Raycast from previous position toward next; if geometry is hit along the segment,
    /// return a position clamped to just before the hit (anti-tunnelling).
    /// Uses three rays (step height, centre and head) and clamps to the earliest hit.
    pub fn clamp_desired_to_path(&self, prev_pos: Vec3, next_pos: Vec3, capsule: Capsule) -> Vec3 {
        let delta = next_pos - prev_pos;
        let len = delta.length();
        if len <= 1e-6 {
            return next_pos;
        }
        let dir = delta / len;
        let max_dist = len + capsule.radius;
        if !max_dist.is_finite() {
            return prev_pos;
        }

        // Ignore hits very close to origin (already inside or on surface)
        const MIN_TOI: f32 = 0.5;

        let feet = -capsule.half_height + STEP_OVER_HEIGHT.min(capsule.half_height);
        let mut min_hit = max_dist + 1.0;
        for height in [feet, 0.0, capsule.half_height] {
            let origin = prev_pos + Vec3::new(0.0, height, 0.0);
            if let Some(hit) = self.cast_ray(origin, dir, max_dist)
                && hit.distance > MIN_TOI
                && hit.distance < min_hit
            {
                min_hit = hit.distance;
            }
        }

        // Sideways the capsule surface leads its centre by the radius; downward
        // the feet ray already starts inside the capsule.
        let lead = capsule.radius * crate::geometry::horizontal(dir).length();
        let allowed = min_hit - lead;
        if allowed < len {
            let safe_dist = (allowed - PATH_HIT_MARGIN).max(0.0);
            prev_pos + dir * safe_dist
        } else {
            next_pos
        }
    }

    /// Resolve the capsule at `desired_position` against the world: snap to the
    /// ground, push out of walls and ceilings, and report contacts.
    pub fn move_character(
        &self,
        desired_position: Vec3,
        velocity: Vec3,
        capsule: Capsule,
    ) -> MoveResult {
        let mut result = MoveResult {
            position: desired_position,
            ..Default::default()
        };
        let step = STEP_OVER_HEIGHT.min(capsule.half_height);

        // Ground check from step height down past the feet
        let ground_origin = desired_position - Vec3::new(0.0, capsule.half_height - step, 0.0);
        if velocity.y <= 0.0
            && let Some(hit) = self.cast_ray(ground_origin, Vec3::NEG_Y, step + GROUND_SNAP_MARGIN)
        {
            result.on_ground = true;
            result.ground_normal = Some(hit.normal);
            result.position.y = hit.point.y + capsule.half_height;
        }

        // Wall checks (8 directions, 2 heights: step-over and upper body)
        let mut touching: Vec<TraceHit> = Vec::new();
        let mut nearby: Vec<TraceHit> = Vec::new();
        let probe_len = WALL_DETECTION_RADIUS.max(capsule.radius + CONTACT_MARGIN);
        for height in [-capsule.half_height + step, capsule.half_height * 0.5] {
            for i in 0..WALL_PROBE_DIRECTIONS {
                let angle = i as f32 * std::f32::consts::TAU / WALL_PROBE_DIRECTIONS as f32;
                let dir = Vec3::new(angle.cos(), 0.0, angle.sin());
                let origin = result.position + Vec3::new(0.0, height, 0.0);
                let Some(hit) = self.cast_ray(origin, dir, probe_len) else {
                    continue;
                };
                // Horizontal distance from the capsule axis to the surface plane
                let plane_dist = hit.distance * (-dir.dot(hit.normal)).max(0.0);
                let flat_normal = crate::geometry::flatten(hit.normal).normalize_or_zero();
                if plane_dist < capsule.radius && flat_normal != Vec3::ZERO {
                    result.position += flat_normal * (capsule.radius - plane_dist);
                }

                let contact = TraceHit {
                    distance: plane_dist,
                    ..hit
                };
                if plane_dist <= capsule.radius + CONTACT_MARGIN {
                    keep_closest(&mut touching, contact);
                }
                if plane_dist <= WALL_DETECTION_RADIUS {
                    keep_closest(&mut nearby, contact);
                }
            }
        }
        result.wall_hits = touching;
        result.nearby_walls = nearby;

        // Ceiling check, only when moving up
        if velocity.y > 0.0 {
            let head_clearance = capsule.half_height;
            if let Some(hit) = self.cast_ray(result.position, Vec3::Y, head_clearance)
                && hit.distance < head_clearance
            {
                result.position.y -= head_clearance - hit.distance;
                result.hit_ceiling = true;
            }
        }

        result
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}

fn keep_closest(hits: &mut Vec<TraceHit>, hit: TraceHit) {
    match hits.iter_mut().find(|h| h.surface == hit.surface) {
        Some(existing) if hit.distance < existing.distance => *existing = hit,
        Some(_) => {}
        None => hits.push(hit),
    }
}

/// Triangles of an axis-aligned box, for building surfaces.
pub fn box_triangles(min: Vec3, max: Vec3) -> (Vec<Vec3>, Vec<[u32; 3]>) {
    let vertices = vec![
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(max.x, max.y, max.z),
        Vec3::new(min.x, max.y, max.z),
    ];
    let indices = vec![
        [0, 2, 1],
        [0, 3, 2], // -Z
        [4, 5, 6],
        [4, 6, 7], // +Z
        [0, 4, 7],
        [0, 7, 3], // -X
        [1, 2, 6],
        [1, 6, 5], // +X
        [0, 1, 5],
        [0, 5, 4], // -Y
        [3, 7, 6],
        [3, 6, 2], // +Y
    ];
    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world_with_box(min: Vec3, max: Vec3) -> (PhysicsWorld, SurfaceId) {
        let mut world = PhysicsWorld::new();
        let (v, i) = box_triangles(min, max);
        let id = world.add_surface("box", &v, &i).unwrap();
        (world, id)
    }

    #[test]
    fn line_trace_hits_box_face() {
        let (world, id) = world_with_box(
            Vec3::new(100.0, 0.0, -100.0),
            Vec3::new(120.0, 300.0, 100.0),
        );
        let hit = world
            .line_trace(Vec3::new(0.0, 100.0, 0.0), Vec3::new(250.0, 100.0, 0.0))
            .expect("should hit the box");
        assert_eq!(hit.surface, id);
        assert!((hit.distance - 100.0).abs() < 1e-3);
        assert!((hit.normal - Vec3::NEG_X).length() < 1e-4);
    }

    #[test]
    fn line_trace_misses_when_short() {
        let (world, _) = world_with_box(
            Vec3::new(100.0, 0.0, -100.0),
            Vec3::new(120.0, 300.0, 100.0),
        );
        assert!(world.line_trace(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)).is_none());
        assert!(world.line_trace(Vec3::ZERO, Vec3::ZERO).is_none());
    }

    #[test]
    fn removed_surface_is_not_hit() {
        let (mut world, id) = world_with_box(
            Vec3::new(100.0, 0.0, -100.0),
            Vec3::new(120.0, 300.0, 100.0),
        );
        assert!(world.remove_surface(id));
        assert!(!world.contains(id));
        assert!(
            world
                .line_trace(Vec3::new(0.0, 100.0, 0.0), Vec3::new(250.0, 100.0, 0.0))
                .is_none()
        );
        assert!(!world.remove_surface(id));
    }

    #[test]
    fn empty_surface_is_rejected() {
        let mut world = PhysicsWorld::new();
        assert!(matches!(world.add_surface("empty", &[], &[]), Err(CourseError::InvalidMesh(0))));
    }

    #[test]
    fn character_lands_on_floor() {
        let (world, _) = world_with_box(
            Vec3::new(-1000.0, -50.0, -1000.0),
            Vec3::new(1000.0, 0.0, 1000.0),
        );
        let capsule = Capsule::default();
        let desired = Vec3::new(0.0, capsule.half_height - 3.0, 0.0);
        let result = world.move_character(desired, Vec3::new(0.0, -100.0, 0.0), capsule);
        assert!(result.on_ground);
        assert!((result.position.y - capsule.half_height).abs() < 1e-3);
        assert!(result.wall_hits.is_empty());
    }

    #[test]
    fn character_is_pushed_out_of_wall() {
        let (world, id) = world_with_box(
            Vec3::new(40.0, -500.0, -500.0),
            Vec3::new(80.0, 500.0, 500.0),
        );
        let capsule = Capsule::default();
        let result = world.move_character(Vec3::ZERO, Vec3::ZERO, capsule);
        assert!(result.position.x <= 40.0 - capsule.radius + 1e-3);
        assert_eq!(result.wall_hits.len(), 1);
        assert_eq!(result.wall_hits[0].surface, id);
        assert!((result.wall_hits[0].normal - Vec3::NEG_X).length() < 1e-4);
    }

    #[test]
    fn path_clamp_stops_before_wall() {
        let (world, _) = world_with_box(
            Vec3::new(300.0, -500.0, -500.0),
            Vec3::new(340.0, 500.0, 500.0),
        );
        let capsule = Capsule::default();
        let clamped = world.clamp_desired_to_path(Vec3::ZERO, Vec3::new(1000.0, 0.0, 0.0), capsule);
        assert!(clamped.x < 300.0 - capsule.radius + 1e-3);
        assert!(clamped.x > 200.0);
    }
}
