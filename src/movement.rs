//! Character movement component: velocity, movement modes and per-mode physics.
//!
//! The component integrates velocity for one step and hands the desired
//! position to [`PhysicsWorld`] for resolution. Mode changes that the owner
//! cares about (landing, apex, leaving a slide) are reported in [`StepReport`].

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::collision::{Capsule, MoveResult, PhysicsWorld, TraceHit};
use crate::config::*;
use crate::geometry::{self, flatten};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CustomMovementMode {
    Slide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementMode {
    Walking,
    Falling,
    Flying,
    Custom(CustomMovementMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionMode {
    QueryAndPhysics,
    NoCollision,
}

/// What changed during a step.
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub landed: bool,
    pub reached_apex: bool,
    pub exited_slide: bool,
    pub wall_hits: Vec<TraceHit>,
    pub nearby_walls: Vec<TraceHit>,
}

#[derive(Debug, Clone)]
pub struct MovementComponent {
    pub velocity: Vec3,
    pub mode: MovementMode,
    pub gravity_scale: f32,
    pub air_control: f32,
    pub max_walk_speed: f32,
    pub jump_z_velocity: f32,
    pub walkable_floor_angle: f32,
    pub ground_friction: f32,
    pub braking_deceleration: f32,
    pub capsule: Capsule,
    pub collision: CollisionMode,
    // slide tunables
    pub slide_min_speed: f32,
    pub slide_enter_impulse: f32,
    pub slide_gravity_force: f32,
    pub slide_friction: f32,
    pending_input: Vec3,
    ground_normal: Option<Vec3>,
}

impl MovementComponent {
    pub fn new(config: &crate::config::GameConfig) -> Self {
        Self {
            velocity: Vec3::ZERO,
            mode: MovementMode::Falling,
            gravity_scale: config.movement.initial_gravity,
            air_control: AIR_CONTROL_DEFAULT,
            max_walk_speed: config.movement.walk_speed,
            jump_z_velocity: config.movement.jump_z_velocity,
            walkable_floor_angle: config.movement.walkable_floor_angle,
            ground_friction: config.movement.ground_friction,
            braking_deceleration: config.movement.braking_deceleration,
            capsule: Capsule::default(),
            collision: CollisionMode::QueryAndPhysics,
            slide_min_speed: config.slide.min_speed,
            slide_enter_impulse: config.slide.enter_impulse,
            slide_gravity_force: config.slide.gravity_force,
            slide_friction: config.slide.friction,
            pending_input: Vec3::ZERO,
            ground_normal: None,
        }
    }

    pub fn is_falling(&self) -> bool {
        self.mode == MovementMode::Falling
    }

    pub fn is_custom_movement_mode(&self, custom: CustomMovementMode) -> bool {
        self.mode == MovementMode::Custom(custom)
    }

    pub fn max_speed(&self) -> f32 {
        self.max_walk_speed
    }

    pub fn set_movement_mode(&mut self, mode: MovementMode) {
        if self.mode != mode {
            log::debug!("Movement mode {:?} -> {:?}", self.mode, mode);
            self.mode = mode;
        }
    }

    /// Accumulate movement input for the next step (world-space direction times scale).
    pub fn add_movement_input(&mut self, direction: Vec3, scale: f32) {
        self.pending_input += direction * scale;
    }

    pub fn pending_input(&self) -> Vec3 {
        self.pending_input
    }

    /// Replace or add to velocity and switch to falling, like a jump pad.
    pub fn launch(&mut self, launch_velocity: Vec3, xy_override: bool, z_override: bool) {
        let h = if xy_override {
            flatten(launch_velocity)
        } else {
            flatten(self.velocity) + flatten(launch_velocity)
        };
        let y = if z_override {
            launch_velocity.y
        } else {
            self.velocity.y + launch_velocity.y
        };
        self.velocity = Vec3::new(h.x, y, h.z);
        if launch_velocity.y > 0.0 {
            self.set_movement_mode(MovementMode::Falling);
        }
    }

    pub fn enter_slide(&mut self) {
        self.velocity += flatten(self.velocity).normalize_or_zero() * self.slide_enter_impulse;
        self.set_movement_mode(MovementMode::Custom(CustomMovementMode::Slide));
    }

    pub fn exit_slide(&mut self) {
        self.set_movement_mode(MovementMode::Walking);
    }

    fn is_walkable(&self, normal: Vec3) -> bool {
        geometry::slope_angle(normal) <= self.walkable_floor_angle
    }

    /// Floor within two half-heights below the capsule centre.
    fn slide_surface(&self, world: &PhysicsWorld, position: Vec3) -> Option<TraceHit> {
        let end = position + Vec3::NEG_Y * self.capsule.half_height * 2.0;
        world.line_trace(position, end)
    }

    fn can_keep_sliding(&self, world: &PhysicsWorld, position: Vec3) -> bool {
        self.slide_surface(world, position).is_some()
            && flatten(self.velocity).length_squared() >= self.slide_min_speed.powi(2)
    }

    /// Advance one step. `right` is the owner's right vector (slide strafing).
    pub fn step(
        &mut self,
        dt: f32,
        position: &mut Vec3,
        right: Vec3,
        world: &PhysicsWorld,
    ) -> StepReport {
        let mut report = StepReport::default();
        let input = std::mem::take(&mut self.pending_input);
        if dt < MIN_TICK_TIME {
            return report;
        }
        let accel_dir = {
            let flat = flatten(input);
            if flat.length_squared() > 1.0 {
                flat.normalize()
            } else {
                flat
            }
        };
        let prev_vertical = self.velocity.y;

        match self.mode {
            MovementMode::Walking => self.phys_walking(dt, accel_dir),
            MovementMode::Falling => self.phys_falling(dt, accel_dir),
            MovementMode::Flying => self.phys_flying(dt, input.clamp_length_max(1.0)),
            MovementMode::Custom(CustomMovementMode::Slide) => {
                if !self.can_keep_sliding(world, *position) {
                    self.exit_slide();
                    report.exited_slide = true;
                    self.phys_walking(dt, accel_dir);
                } else {
                    self.phys_slide(dt, accel_dir, right);
                }
            }
        }

        let prev_pos = *position;
        let desired = prev_pos + self.velocity * dt;

        if self.collision == CollisionMode::NoCollision {
            *position = desired;
            return report;
        }

        let desired = world.clamp_desired_to_path(prev_pos, desired, self.capsule);
        let MoveResult {
            position: resolved,
            on_ground,
            ground_normal,
            hit_ceiling,
            wall_hits,
            nearby_walls,
        } = world.move_character(desired, self.velocity, self.capsule);
        *position = resolved;

        if hit_ceiling && self.velocity.y > 0.0 {
            self.velocity.y = 0.0;
        }
        // Stop pushing into walls we are touching
        for hit in &wall_hits {
            let n = flatten(hit.normal).normalize_or_zero();
            let into = self.velocity.dot(n);
            if into < 0.0 {
                self.velocity -= n * into;
            }
        }

        let walkable_ground = on_ground && ground_normal.is_some_and(|n| self.is_walkable(n));
        self.ground_normal = if walkable_ground { ground_normal } else { None };

        match self.mode {
            MovementMode::Falling => {
                if prev_vertical > 0.0 && self.velocity.y <= 0.0 {
                    report.reached_apex = true;
                }
                if walkable_ground {
                    self.velocity.y = 0.0;
                    self.set_movement_mode(MovementMode::Walking);
                    report.landed = true;
                }
            }
            MovementMode::Walking => {
                if !walkable_ground {
                    self.set_movement_mode(MovementMode::Falling);
                }
            }
            MovementMode::Custom(CustomMovementMode::Slide) => {
                if walkable_ground {
                    self.velocity.y = 0.0;
                }
                if !self.can_keep_sliding(world, *position) {
                    self.exit_slide();
                    report.exited_slide = true;
                }
            }
            MovementMode::Flying => {}
        }

        report.wall_hits = wall_hits;
        report.nearby_walls = nearby_walls;
        report
    }

    fn phys_walking(&mut self, dt: f32, accel_dir: Vec3) {
        if accel_dir == Vec3::ZERO {
            self.brake(dt, self.ground_friction);
        } else {
            // Ease toward the target so impulses (dash, slide exit) bleed off
            let target = accel_dir * self.max_walk_speed;
            let blend = (self.ground_friction * dt).min(1.0);
            let h = flatten(self.velocity);
            let h = h + (target - h) * blend;
            self.velocity.x = h.x;
            self.velocity.z = h.z;
        }
        self.velocity.y = 0.0;
    }

    fn phys_falling(&mut self, dt: f32, accel_dir: Vec3) {
        let air_accel = self.max_walk_speed * 4.0 * self.air_control;
        self.velocity += accel_dir * air_accel * dt;
        self.velocity.y -= GRAVITY * self.gravity_scale * dt;
    }

    fn phys_flying(&mut self, dt: f32, accel_dir: Vec3) {
        if accel_dir == Vec3::ZERO {
            self.brake(dt, self.ground_friction);
            self.velocity.y = 0.0;
        } else {
            self.velocity = accel_dir * self.max_walk_speed;
        }
    }

    /// Slide physics: surface gravity, sideways-only steering and low friction.
    fn phys_slide(&mut self, dt: f32, accel_dir: Vec3, right: Vec3) {
        self.velocity += Vec3::NEG_Y * self.slide_gravity_force * dt;

        let steer = if accel_dir.normalize_or_zero().dot(right).abs() > 0.5 {
            accel_dir.project_onto(right)
        } else {
            Vec3::ZERO
        };
        self.velocity += steer * self.max_walk_speed * dt;

        let h = flatten(self.velocity);
        let speed = h.length();
        if speed > 0.0 {
            let drop = speed * self.slide_friction * dt;
            let scale = ((speed - drop) / speed).max(0.0);
            self.velocity.x *= scale;
            self.velocity.z *= scale;
        }
    }

    fn brake(&mut self, dt: f32, friction: f32) {
        let h = flatten(self.velocity);
        let speed = h.length();
        if speed <= 0.0 {
            return;
        }
        let drop = (self.braking_deceleration + friction * speed) * dt;
        let scale = ((speed - drop) / speed).max(0.0);
        self.velocity.x *= scale;
        self.velocity.z *= scale;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::box_triangles;
    use crate::config::GameConfig;

    fn flat_world() -> PhysicsWorld {
        let mut world = PhysicsWorld::new();
        let (v, i) = box_triangles(
            Vec3::new(-5000.0, -100.0, -5000.0),
            Vec3::new(5000.0, 0.0, 5000.0),
        );
        world.add_surface("floor", &v, &i).unwrap();
        world
    }

    #[test]
    fn falls_and_lands() {
        let world = flat_world();
        let mut movement = MovementComponent::new(&GameConfig::default());
        let mut pos = Vec3::new(0.0, 300.0, 0.0);
        let mut landed = false;
        for _ in 0..120 {
            let report = movement.step(1.0 / 60.0, &mut pos, Vec3::X, &world);
            if report.landed {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(movement.mode, MovementMode::Walking);
        assert!((pos.y - CAPSULE_HALF_HEIGHT).abs() < 1e-2);
        assert_eq!(movement.velocity.y, 0.0);
    }

    #[test]
    fn walks_at_max_speed() {
        let world = flat_world();
        let mut movement = MovementComponent::new(&GameConfig::default());
        movement.mode = MovementMode::Walking;
        let mut pos = Vec3::new(0.0, CAPSULE_HALF_HEIGHT, 0.0);
        for _ in 0..60 {
            movement.add_movement_input(Vec3::NEG_Z, 1.0);
            movement.step(1.0 / 60.0, &mut pos, Vec3::X, &world);
        }
        assert!((movement.velocity.length() - movement.max_walk_speed).abs() < 1.0);
        assert!(pos.z < -300.0);
        assert_eq!(movement.mode, MovementMode::Walking);
    }

    #[test]
    fn launch_overrides_vertical_and_falls() {
        let mut movement = MovementComponent::new(&GameConfig::default());
        movement.mode = MovementMode::Walking;
        movement.velocity = Vec3::new(100.0, 0.0, 0.0);
        movement.launch(Vec3::new(0.0, 700.0, 50.0), false, true);
        assert_eq!(movement.velocity, Vec3::new(100.0, 700.0, 50.0));
        assert!(movement.is_falling());
    }

    #[test]
    fn apex_is_reported_once() {
        let world = flat_world();
        let mut movement = MovementComponent::new(&GameConfig::default());
        movement.velocity = Vec3::new(0.0, 100.0, 0.0);
        let mut pos = Vec3::new(0.0, 500.0, 0.0);
        let mut apexes = 0;
        for _ in 0..30 {
            if movement.step(1.0 / 60.0, &mut pos, Vec3::X, &world).reached_apex {
                apexes += 1;
            }
        }
        assert_eq!(apexes, 1);
    }

    #[test]
    fn slide_exits_when_too_slow() {
        let world = flat_world();
        let mut movement = MovementComponent::new(&GameConfig::default());
        movement.mode = MovementMode::Walking;
        movement.velocity = Vec3::new(0.0, 0.0, -100.0);
        movement.enter_slide();
        assert!(movement.is_custom_movement_mode(CustomMovementMode::Slide));
        let mut pos = Vec3::new(0.0, CAPSULE_HALF_HEIGHT, 0.0);
        let mut exited = false;
        for _ in 0..600 {
            if movement.step(1.0 / 60.0, &mut pos, Vec3::X, &world).exited_slide {
                exited = true;
                break;
            }
        }
        assert!(exited);
        assert_eq!(movement.mode, MovementMode::Walking);
    }

    #[test]
    fn no_collision_passes_through_geometry() {
        let world = flat_world();
        let mut movement = MovementComponent::new(&GameConfig::default());
        movement.collision = CollisionMode::NoCollision;
        movement.velocity = Vec3::new(0.0, -1000.0, 0.0);
        let mut pos = Vec3::new(0.0, 50.0, 0.0);
        movement.step(0.2, &mut pos, Vec3::X, &world);
        assert!(pos.y < 0.0);
        assert!(movement.is_falling());
    }

    #[test]
    fn flying_follows_input_in_three_dimensions() {
        let world = PhysicsWorld::new();
        let mut movement = MovementComponent::new(&GameConfig::default());
        movement.mode = MovementMode::Flying;
        movement.add_movement_input(Vec3::Y, 1.0);
        let mut pos = Vec3::ZERO;
        movement.step(0.1, &mut pos, Vec3::X, &world);
        assert!((pos.y - movement.max_walk_speed * 0.1).abs() < 1e-3);
    }
}
