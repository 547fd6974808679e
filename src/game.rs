use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::character::{Character, CharacterEvent};
use crate::collision::PhysicsWorld;
use crate::config::*;
use crate::course::LoadedCourse;
use crate::hazards::{Laser, LevelTimer, ProximityMine, SamplePlatform};
use crate::input::{InputFrame, InputState};
use crate::level::LevelRequest;
use crate::trigger::ActorId;

pub const PLAYER_ID: ActorId = ActorId(1);

/// Owns the course, the player and the hazards, and runs one frame at a time.
pub struct GameState {
    pub character: Character,
    pub physics: PhysicsWorld,
    pub lasers: Vec<Laser>,
    pub mines: Vec<ProximityMine>,
    pub platforms: Vec<SamplePlatform>,
    pub level_timer: LevelTimer,
    pub spawn_points: Vec<Vec3>,
    pub map_bounds: (Vec3, Vec3),
    config: GameConfig,
    rng: SmallRng,
    level_requests: Vec<LevelRequest>,
    elapsed: f32,
}

impl GameState {
    pub fn new(course: LoadedCourse, config: &GameConfig, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let spawn_idx = rng.random_range(0..course.spawn_points.len().max(1));
        let initial_spawn = course
            .spawn_points
            .get(spawn_idx)
            .copied()
            .unwrap_or(Vec3::ZERO);

        let character = Character::new(PLAYER_ID, initial_spawn, config);
        let mut lasers = course.lasers;
        for laser in &mut lasers {
            laser.begin_play(PLAYER_ID);
        }
        let mut level_timer = LevelTimer::new(
            config.hazards.level_time_limit,
            config.levels.time_up.clone(),
        );
        level_timer.begin_play();

        log::info!("Player spawned at {:?}", initial_spawn);

        Self {
            character,
            physics: course.physics,
            lasers,
            mines: course.mines,
            platforms: course.platforms,
            level_timer,
            spawn_points: course.spawn_points,
            map_bounds: (course.bounds_min, course.bounds_max),
            config: config.clone(),
            rng,
            level_requests: Vec::new(),
            elapsed: 0.0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Resolve input and advance one frame. `dt` is clamped to avoid tunnelling after stalls.
    pub fn update(&mut self, dt: f32, input: &mut InputState) {
        let frame = input.frame(&self.config.bindings);
        input.end_frame();
        self.step(dt, &frame);
    }

    /// Advance one frame with already-resolved input.
    pub fn step(&mut self, dt: f32, frame: &InputFrame) {
        // A NaN frame would poison every timer
        let dt = if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 };
        self.elapsed += dt;

        self.character.tick(dt, frame, &self.physics);
        self.update_hazards(dt);
        self.check_respawn();

        self.level_requests.extend(self.character.take_level_requests());
        if let Some(request) = self.level_timer.tick(dt) {
            self.level_requests.push(request);
        }
    }

    fn update_hazards(&mut self, dt: f32) {
        let bounds = self.character.bounds();
        let id = self.character.id;

        for laser in &mut self.lasers {
            if let Some(request) = laser.tick(dt, id, bounds, &self.config.levels.laser_death) {
                self.level_requests.push(request);
            }
        }

        for mine in &mut self.mines {
            if let Some(explosion) = mine.tick(dt, id, bounds)
                && explosion.target == id
            {
                self.character.apply_damage(explosion.damage);
            }
        }
        self.mines.retain(|m| !m.is_destroyed());

        for platform in &mut self.platforms {
            platform.tick(id, bounds);
        }
    }

    fn check_respawn(&mut self) {
        let (bounds_min, bounds_max) = self.map_bounds;
        let pos = self.character.position;
        let outside = pos.x < bounds_min.x - RESPAWN_MARGIN
            || pos.x > bounds_max.x + RESPAWN_MARGIN
            || pos.y < bounds_min.y - RESPAWN_MARGIN
            || pos.y > bounds_max.y + RESPAWN_MARGIN
            || pos.z < bounds_min.z - RESPAWN_MARGIN
            || pos.z > bounds_max.z + RESPAWN_MARGIN;

        if outside {
            log::info!("Player fell out of course, respawning");
            self.respawn_player();
        }
    }

    pub fn respawn_player(&mut self) {
        if self.spawn_points.is_empty() {
            return;
        }
        let idx = self.rng.random_range(0..self.spawn_points.len());
        self.character.respawn(self.spawn_points[idx]);
    }

    /// Ask the host to reload the level, stopping the countdown first.
    pub fn safe_level_reload(&mut self) {
        let request = self.level_timer.safe_level_reload();
        self.level_requests.push(request);
    }

    pub fn take_level_requests(&mut self) -> Vec<LevelRequest> {
        std::mem::take(&mut self.level_requests)
    }

    pub fn take_character_events(&mut self) -> Vec<CharacterEvent> {
        self.character.take_events()
    }

    /// Tear down every actor's timers.
    pub fn end_play(&mut self) {
        self.character.end_play();
        for laser in &mut self.lasers {
            laser.end_play();
        }
        for mine in &mut self.mines {
            mine.end_play();
        }
        self.level_timer.end_play();
    }
}
