//! The playable parkour character: input handlers, wall-running, jumping,
//! sliding, dashing, vaulting and health on top of [`MovementComponent`].

use glam::{Vec2, Vec3};

use crate::collision::{PhysicsWorld, SurfaceId, TraceHit};
use crate::config::*;
use crate::geometry::{self, WallSide};
use crate::input::{InputAction, InputFrame, TriggerEvent};
use crate::jump::{self, JumpCounter, LaunchContext};
use crate::level::LevelRequest;
use crate::movement::{CollisionMode, CustomMovementMode, MovementComponent, MovementMode};
use crate::timer::{TimerHandle, TimerManager};
use crate::trigger::ActorId;
use crate::vault::{self, VaultMove, VaultOutcome};
use crate::wallrun::{self, WallRunEnd, WallRunSession, WallRunUpdate};

const MAX_PITCH: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharacterTimer {
    WallRunFallback,
    SlideEnd,
    CapsuleRestore,
    DashEnd,
    VaultFinish,
    JumpRefill,
}

/// Things that happened to the character, drained by the game each frame.
#[derive(Debug, Clone, PartialEq)]
pub enum CharacterEvent {
    WallRunStarted(WallSide),
    WallRunEnded(WallRunEnd),
    Jumped { jumps_left: u32 },
    Landed,
    SlideStarted,
    SlideEnded,
    Dashed,
    Vaulted(VaultOutcome),
    Damaged { amount: f32, health: f32 },
    Died,
}

pub struct Character {
    pub id: ActorId,
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Degrees, positive leans right
    pub camera_roll: f32,
    pub movement: MovementComponent,
    pub jumps: JumpCounter,
    config: GameConfig,
    timers: TimerManager<CharacterTimer>,

    wall_run: Option<WallRunSession>,
    wall_to_run_on: Option<SurfaceId>,
    last_wall_run_surface: Option<SurfaceId>,
    has_landed_after_wall_run: bool,

    is_sprinting: bool,
    is_walking: bool,
    is_dashing: bool,
    was_sliding_long_time: bool,
    is_dead: bool,
    health: f32,
    move_axis: Vec2,

    slide_timer: Option<TimerHandle>,
    restore_timer: Option<TimerHandle>,
    dash_timer: Option<TimerHandle>,
    refill_timer: Option<TimerHandle>,
    vault: Option<(TimerHandle, VaultMove)>,

    events: Vec<CharacterEvent>,
    level_requests: Vec<LevelRequest>,
}

impl Character {
    pub fn new(id: ActorId, spawn_position: Vec3, config: &GameConfig) -> Self {
        Self {
            id,
            position: spawn_position,
            yaw: 0.0,
            pitch: 0.0,
            camera_roll: 0.0,
            movement: MovementComponent::new(config),
            jumps: JumpCounter::new(config.jump.max_jump),
            config: config.clone(),
            timers: TimerManager::new(),
            wall_run: None,
            wall_to_run_on: None,
            last_wall_run_surface: None,
            has_landed_after_wall_run: true,
            is_sprinting: false,
            is_walking: false,
            is_dashing: false,
            was_sliding_long_time: false,
            is_dead: false,
            health: config.health.max_health,
            move_axis: Vec2::ZERO,
            slide_timer: None,
            restore_timer: None,
            dash_timer: None,
            refill_timer: None,
            vault: None,
            events: Vec::new(),
            level_requests: Vec::new(),
        }
    }

    pub fn forward(&self) -> Vec3 {
        geometry::forward_from_yaw(self.yaw)
    }

    pub fn right(&self) -> Vec3 {
        geometry::right_from_yaw(self.yaw)
    }

    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::new(0.0, CAMERA_OFFSET_Y, 0.0) - self.forward() * CAMERA_OFFSET_BACK
    }

    pub fn look_direction(&self) -> Vec3 {
        geometry::look_direction_from_angles(self.yaw, self.pitch)
    }

    /// World-space box around the capsule, for trigger tests.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        self.movement.capsule.bounds(self.position)
    }

    pub fn is_wall_running(&self) -> bool {
        self.wall_run.is_some()
    }

    pub fn wall_run_side(&self) -> Option<WallSide> {
        self.wall_run.map(|s| s.side)
    }

    pub fn wall_run_direction(&self) -> Option<Vec3> {
        self.wall_run.map(|s| s.direction)
    }

    pub fn wall_to_run_on(&self) -> Option<SurfaceId> {
        self.wall_to_run_on
    }

    pub fn has_landed_after_wall_run(&self) -> bool {
        self.has_landed_after_wall_run
    }

    pub fn is_sprinting(&self) -> bool {
        self.is_sprinting
    }

    pub fn is_walking(&self) -> bool {
        self.is_walking
    }

    pub fn is_dashing(&self) -> bool {
        self.is_dashing
    }

    pub fn is_sliding(&self) -> bool {
        self.movement.is_custom_movement_mode(CustomMovementMode::Slide)
    }

    pub fn was_sliding_long_time(&self) -> bool {
        self.was_sliding_long_time
    }

    pub fn is_vaulting(&self) -> bool {
        self.vault.is_some()
    }

    pub fn is_dead(&self) -> bool {
        self.is_dead
    }

    pub fn health(&self) -> f32 {
        self.health
    }

    pub fn take_events(&mut self) -> Vec<CharacterEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn take_level_requests(&mut self) -> Vec<LevelRequest> {
        std::mem::take(&mut self.level_requests)
    }

    /// Run one frame: handle input, step movement and fire timers.
    pub fn tick(&mut self, dt: f32, frame: &InputFrame, world: &PhysicsWorld) {
        if self.is_dead {
            return;
        }

        self.look(frame.look_delta);
        self.move_axis = frame.move_axis;
        self.dispatch_actions(frame, world);

        if !self.is_vaulting() {
            let input = self.forward() * self.move_axis.y + self.right() * self.move_axis.x;
            self.movement.add_movement_input(input, 1.0);
        }

        if self.is_wall_running() {
            self.update_wall_run(world);
        }

        if self.movement.is_falling() && !self.is_wall_running() {
            let movement = &self.config.movement;
            self.movement.gravity_scale = if self.movement.velocity.y > 0.0 {
                movement.initial_gravity
            } else {
                movement.falling_gravity
            };
            if !self.is_dashing {
                self.clamp_horizontal_velocity();
            }
        }

        let right = self.right();
        let report = self.movement.step(dt, &mut self.position, right, world);

        if report.exited_slide {
            self.finish_slide();
        }
        if report.reached_apex {
            self.on_jump_apex();
        }
        if report.landed {
            self.on_landed();
        }
        for hit in &report.wall_hits {
            self.on_capsule_hit(hit);
        }
        self.update_wall_detection(&report.nearby_walls, world);

        for fired in self.timers.tick(dt) {
            self.on_timer(fired);
        }

        self.update_camera_tilt(dt);
    }

    fn look(&mut self, delta: Vec2) {
        let sensitivity = MOUSE_SENSITIVITY * self.config.movement.sensitivity;
        self.yaw += delta.x * sensitivity;
        self.pitch = (self.pitch - delta.y * sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
    }

    fn dispatch_actions(&mut self, frame: &InputFrame, world: &PhysicsWorld) {
        for &(action, event) in &frame.actions {
            match (action, event) {
                (InputAction::Sprint, TriggerEvent::Started) => self.sprint_start(),
                (InputAction::Sprint, TriggerEvent::Completed) => self.sprint_end(),
                (InputAction::Walk, TriggerEvent::Started) => self.walk_start(),
                (InputAction::Walk, TriggerEvent::Completed) => self.walk_end(),
                (InputAction::Slide, TriggerEvent::Started) => self.slide_start(),
                (InputAction::Slide, TriggerEvent::Completed) => self.slide_released(),
                (InputAction::Dash, TriggerEvent::Started) => self.dash(),
                (InputAction::Vault, TriggerEvent::Started) => self.vault(world),
                (InputAction::Wallrun, TriggerEvent::Started) => self.call_begin_wall_run(world),
                (InputAction::Wallrun, TriggerEvent::Completed) => self.call_end_wall_run(),
                (InputAction::Jump, TriggerEvent::Started) => self.custom_jump(),
                (InputAction::Jump, TriggerEvent::Completed) => self.jump_released(),
                _ => {}
            }
        }
    }

    fn refresh_max_speed(&mut self) {
        let movement = &self.config.movement;
        self.movement.max_walk_speed = if self.is_sprinting {
            movement.sprint_speed
        } else if self.is_walking {
            movement.slow_walk_speed
        } else {
            movement.walk_speed
        };
    }

    pub fn sprint_start(&mut self) {
        self.is_sprinting = true;
        self.refresh_max_speed();
        log::debug!("Sprint start, max speed {}", self.movement.max_walk_speed);
    }

    pub fn sprint_end(&mut self) {
        self.is_sprinting = false;
        self.refresh_max_speed();
        log::debug!("Sprint end, max speed {}", self.movement.max_walk_speed);
    }

    pub fn walk_start(&mut self) {
        if self.is_sprinting {
            return;
        }
        self.is_walking = true;
        self.refresh_max_speed();
    }

    pub fn walk_end(&mut self) {
        self.is_walking = false;
        self.refresh_max_speed();
    }

    // Wall running

    pub fn begin_wall_run(&mut self, wall: SurfaceId, direction: Vec3, side: WallSide) {
        if self.is_wall_running() {
            return;
        }
        let fallback = self.timers.set_timer(
            CharacterTimer::WallRunFallback,
            self.config.wall_run.max_duration,
            false,
        );
        self.movement.air_control = AIR_CONTROL_WALL_RUN;
        self.movement.gravity_scale = self.config.wall_run.gravity_scale;
        self.movement.velocity.y = 0.0;
        self.wall_run = Some(WallRunSession {
            wall,
            side,
            direction,
            fallback,
        });
        self.last_wall_run_surface = Some(wall);
        self.has_landed_after_wall_run = false;
        log::info!("Wall run started on {:?} ({:?} side)", wall, side);
        self.events.push(CharacterEvent::WallRunStarted(side));
    }

    pub fn end_wall_run(&mut self, why: WallRunEnd) {
        let Some(session) = self.wall_run.take() else {
            return;
        };
        match why {
            WallRunEnd::FallOff => self.jumps.reset(1),
            WallRunEnd::JumpOff => self.jumps.reset(self.jumps.max_jump() as i64),
        }
        self.movement.air_control = AIR_CONTROL_DEFAULT;
        self.movement.gravity_scale = self.config.movement.initial_gravity;
        self.timers.clear_timer(session.fallback);
        log::info!("Wall run ended: {:?}", why);
        self.events.push(CharacterEvent::WallRunEnded(why));
    }

    /// Wallrun action pressed: look for a wall to either side.
    fn call_begin_wall_run(&mut self, world: &PhysicsWorld) {
        if self.is_wall_running() {
            return;
        }
        let angle = self.movement.walkable_floor_angle;
        let found = wallrun::find_wall(world, self.position, self.right(), angle);
        if let Some((wall, direction, side)) = found
            && self.can_run_on(wall)
        {
            self.begin_wall_run(wall, direction, side);
        }
    }

    /// A wall already run on is off limits until the next landing.
    fn can_run_on(&self, wall: SurfaceId) -> bool {
        self.has_landed_after_wall_run || self.last_wall_run_surface != Some(wall)
    }

    fn call_end_wall_run(&mut self) {
        self.end_wall_run(WallRunEnd::FallOff);
    }

    pub fn update_wall_run(&mut self, world: &PhysicsWorld) {
        let Some(session) = self.wall_run else {
            return;
        };
        if !wallrun::are_keys_required(self.move_axis, session.side) {
            return;
        }
        let angle = self.movement.walkable_floor_angle;
        match wallrun::update_direction(world, self.position, self.right(), &session, angle) {
            WallRunUpdate::Continue { wall, direction } => {
                let speed = self.config.wall_run.speed;
                self.movement.velocity = Vec3::new(direction.x * speed, 0.0, direction.z * speed);
                self.wall_run = Some(WallRunSession {
                    wall,
                    direction,
                    ..session
                });
            }
            WallRunUpdate::Lost => self.end_wall_run(WallRunEnd::FallOff),
        }
    }

    fn on_capsule_hit(&mut self, hit: &TraceHit) {
        if self.is_wall_running() || !self.movement.is_falling() {
            return;
        }
        if !geometry::is_surface_wall_ran(hit.normal, self.movement.walkable_floor_angle) {
            return;
        }
        if !self.can_run_on(hit.surface) {
            return;
        }
        let (direction, side) = geometry::find_run_direction_and_side(hit.normal, self.right());
        if wallrun::are_keys_required(self.move_axis, side) {
            self.begin_wall_run(hit.surface, direction, side);
        } else {
            self.end_wall_run(WallRunEnd::FallOff);
        }
    }

    /// Track the closest runnable wall within the detection radius.
    fn update_wall_detection(&mut self, nearby: &[TraceHit], world: &PhysicsWorld) {
        let angle = self.movement.walkable_floor_angle;
        let detected = nearby
            .iter()
            .filter(|h| geometry::is_surface_wall_ran(h.normal, angle))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
            .map(|h| h.surface);

        let previous = self.wall_to_run_on;
        if detected != previous {
            log::debug!("Wall to run on {:?} -> {:?}", previous, detected);
            self.wall_to_run_on = detected;
        }

        if let Some(session) = self.wall_run {
            let lost_overlap = previous == Some(session.wall) && detected != Some(session.wall);
            if lost_overlap || !world.contains(session.wall) {
                self.end_wall_run(WallRunEnd::FallOff);
            }
        }
    }

    // Jumping

    fn custom_jump(&mut self) {
        if self.is_vaulting() {
            return;
        }
        let running = self.is_wall_running();
        if !self.jumps.jump_used(running) {
            log::debug!("No jumps left");
            return;
        }

        let context = match self.wall_run {
            Some(session) => LaunchContext::WallRunning {
                direction: session.direction,
                side: session.side,
            },
            None if self.movement.is_falling() => LaunchContext::Falling {
                move_axis: self.move_axis,
            },
            None => LaunchContext::Grounded,
        };
        let velocity = jump::launch_velocity(
            context,
            self.forward(),
            self.right(),
            self.movement.jump_z_velocity,
        );

        let was_sliding = self.is_sliding();
        self.movement.launch(velocity, false, true);
        if was_sliding {
            self.finish_slide();
        }
        if running {
            self.end_wall_run(WallRunEnd::JumpOff);
        }
        log::debug!("Jump, {} left", self.jumps.jump_left());
        self.events.push(CharacterEvent::Jumped {
            jumps_left: self.jumps.jump_left(),
        });
    }

    fn jump_released(&mut self) {
        let Some(delay) = self.config.jump.refill_delay else {
            return;
        };
        if self.jumps.jump_left() == 0 && self.refill_timer.is_none() {
            self.refill_timer = Some(
                self.timers
                    .set_timer(CharacterTimer::JumpRefill, delay.max(0.0), false),
            );
        }
    }

    fn on_jump_apex(&mut self) {
        if self.is_wall_running() {
            return;
        }
        self.movement.gravity_scale = self.config.movement.jump_gravity;
    }

    fn on_landed(&mut self) {
        self.end_wall_run(WallRunEnd::FallOff);
        self.jumps.reset(self.jumps.max_jump() as i64);
        self.movement.gravity_scale = self.config.movement.initial_gravity;
        self.has_landed_after_wall_run = true;
        if let Some(handle) = self.refill_timer.take() {
            self.timers.clear_timer(handle);
        }
        log::info!("Landed at {:?}", self.position);
        self.events.push(CharacterEvent::Landed);
    }

    fn clamp_horizontal_velocity(&mut self) {
        self.movement.velocity =
            geometry::clamp_horizontal_velocity(self.movement.velocity, self.movement.max_speed());
    }

    // Sliding

    /// Resize the capsule keeping the feet where they are.
    fn set_capsule_half_height(&mut self, half_height: f32) {
        let delta = half_height - self.movement.capsule.half_height;
        self.position.y += delta;
        self.movement.capsule.half_height = half_height;
    }

    pub fn slide_start(&mut self) {
        if !self.is_sprinting
            || self.movement.is_falling()
            || self.is_sliding()
            || self.is_vaulting()
        {
            return;
        }
        if let Some(handle) = self.restore_timer.take() {
            self.timers.clear_timer(handle);
        }
        self.set_capsule_half_height(SLIDE_HALF_HEIGHT);
        self.movement.collision = CollisionMode::QueryAndPhysics;
        self.movement.enter_slide();
        self.was_sliding_long_time = false;
        self.slide_timer = Some(self.timers.set_timer(
            CharacterTimer::SlideEnd,
            self.config.slide.duration,
            false,
        ));
        log::debug!("Slide start");
        self.events.push(CharacterEvent::SlideStarted);
    }

    fn slide_released(&mut self) {
        if self.is_sliding() || self.slide_timer.is_some() {
            self.finish_slide();
        }
    }

    /// Leave the slide and schedule the capsule to stand back up.
    fn finish_slide(&mut self) {
        if let Some(handle) = self.slide_timer.take() {
            self.timers.clear_timer(handle);
        }
        if self.is_sliding() {
            self.movement.exit_slide();
        }
        if self.movement.capsule.half_height < CAPSULE_HALF_HEIGHT && self.restore_timer.is_none() {
            self.restore_timer = Some(self.timers.set_timer(
                CharacterTimer::CapsuleRestore,
                self.config.slide.capsule_restore_delay,
                false,
            ));
            log::debug!("Slide end");
            self.events.push(CharacterEvent::SlideEnded);
        }
    }

    // Dash

    pub fn dash(&mut self) {
        if self.is_dashing || self.is_vaulting() {
            return;
        }
        let impulse = self.forward() * self.config.dash.force;
        self.movement.launch(impulse, true, false);
        self.is_dashing = true;
        self.dash_timer = Some(
            self.timers
                .set_timer(CharacterTimer::DashEnd, self.config.dash.time, false),
        );
        self.events.push(CharacterEvent::Dashed);
    }

    // Vaulting

    pub fn vault(&mut self, world: &PhysicsWorld) {
        if self.is_vaulting() {
            return;
        }
        let outcome = vault::classify(
            world,
            self.position,
            self.forward(),
            self.movement.capsule,
            &self.config.vault,
        );
        log::debug!("Vault probe: {:?}", outcome);
        let Some(plan) = outcome.movement() else {
            return;
        };

        self.end_wall_run(WallRunEnd::FallOff);
        if self.is_sliding() {
            self.finish_slide();
        }
        self.movement.collision = CollisionMode::NoCollision;
        self.movement.set_movement_mode(MovementMode::Flying);
        self.movement.velocity = Vec3::ZERO;
        self.yaw = plan.yaw;
        self.position = plan.target;
        let handle = self
            .timers
            .set_timer(CharacterTimer::VaultFinish, plan.duration, false);
        self.vault = Some((handle, plan));
        log::info!("Vault: {:?}", outcome);
        self.events.push(CharacterEvent::Vaulted(outcome));
    }

    fn finish_vault(&mut self) {
        let Some((_, plan)) = self.vault.take() else {
            return;
        };
        self.movement.collision = CollisionMode::QueryAndPhysics;
        self.movement.set_movement_mode(MovementMode::Walking);
        self.yaw = plan.yaw;
    }

    // Health

    pub fn apply_damage(&mut self, amount: f32) {
        if self.is_dead || amount <= 0.0 {
            return;
        }
        self.health = (self.health - amount).max(0.0);
        log::info!("Took {} damage, health {}", amount, self.health);
        self.events.push(CharacterEvent::Damaged {
            amount,
            health: self.health,
        });
        if self.health <= 0.0 {
            self.is_dead = true;
            log::info!("Player died");
            self.events.push(CharacterEvent::Died);
            self.level_requests
                .push(LevelRequest::Open(self.config.levels.main_menu.clone()));
        }
    }

    fn on_timer(&mut self, timer: CharacterTimer) {
        match timer {
            CharacterTimer::WallRunFallback => {
                log::debug!("Wall run time limit reached");
                self.end_wall_run(WallRunEnd::FallOff);
            }
            CharacterTimer::SlideEnd => {
                self.slide_timer = None;
                self.was_sliding_long_time = true;
                self.finish_slide();
            }
            CharacterTimer::CapsuleRestore => {
                self.restore_timer = None;
                self.set_capsule_half_height(CAPSULE_HALF_HEIGHT);
            }
            CharacterTimer::DashEnd => {
                self.dash_timer = None;
                self.is_dashing = false;
            }
            CharacterTimer::VaultFinish => self.finish_vault(),
            CharacterTimer::JumpRefill => {
                self.refill_timer = None;
                self.jumps.reset(self.jumps.max_jump() as i64);
            }
        }
    }

    fn update_camera_tilt(&mut self, dt: f32) {
        let target = match self.wall_run {
            // Lean away from the wall
            Some(session) => -session.side.sign() * self.config.wall_run.camera_tilt,
            None => 0.0,
        };
        let max_step = self.config.wall_run.camera_tilt_rate * dt;
        self.camera_roll += (target - self.camera_roll).clamp(-max_step, max_step);
    }

    /// Put the character back at `spawn_position` with a clean state.
    pub fn respawn(&mut self, spawn_position: Vec3) {
        self.end_play();
        self.movement.capsule.half_height = CAPSULE_HALF_HEIGHT;
        self.movement.collision = CollisionMode::QueryAndPhysics;
        self.movement.velocity = Vec3::ZERO;
        self.movement.set_movement_mode(MovementMode::Falling);
        self.movement.air_control = AIR_CONTROL_DEFAULT;
        self.movement.gravity_scale = self.config.movement.initial_gravity;
        self.position = spawn_position;
        self.camera_roll = 0.0;
        self.jumps.refill();
        self.is_dashing = false;
        self.has_landed_after_wall_run = true;
        self.wall_to_run_on = None;
    }

    /// Cancel every pending timer; nothing scheduled by this character fires afterwards.
    pub fn end_play(&mut self) {
        self.timers.clear_all();
        self.wall_run = None;
        self.slide_timer = None;
        self.restore_timer = None;
        self.dash_timer = None;
        self.refill_timer = None;
        self.vault = None;
    }
}
