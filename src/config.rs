use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::input::KeyBindings;

// Character dimensions (position is the capsule centre)
pub const CAPSULE_RADIUS: f32 = 55.0;
pub const CAPSULE_HALF_HEIGHT: f32 = 96.0;
pub const SLIDE_HALF_HEIGHT: f32 = 48.0;
pub const CAMERA_OFFSET_Y: f32 = 60.0; // above capsule centre
pub const CAMERA_OFFSET_BACK: f32 = 10.0;
pub const STEP_OVER_HEIGHT: f32 = 45.0; // can step over obstacles this tall
pub const GROUND_SNAP_MARGIN: f32 = 5.0; // extra distance for ground detection tolerance
pub const PATH_HIT_MARGIN: f32 = 1.0;

// Physics
pub const GRAVITY: f32 = 980.0;
pub const MOUSE_SENSITIVITY: f32 = 0.002;
pub const MAX_FRAME_DT: f32 = 0.1;
pub const MIN_TICK_TIME: f32 = 1e-6;
pub const WALKABLE_FLOOR_ANGLE: f32 = 44.765;

// Wall running
pub const WALL_TRACE_LENGTH: f32 = 250.0;
pub const WALL_DETECTION_RADIUS: f32 = CAPSULE_RADIUS + 25.0;
pub const OVERHANG_NORMAL_Y: f32 = -0.05;
pub const WALL_RUN_KEY_THRESHOLD: f32 = 0.1;
pub const AIR_CONTROL_DEFAULT: f32 = 0.05;
pub const AIR_CONTROL_WALL_RUN: f32 = 1.0;

// Map
pub const RESPAWN_MARGIN: f32 = 2000.0;

/// Speeds and physics tunables of the movement component.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub slow_walk_speed: f32,
    pub jump_z_velocity: f32,
    pub walkable_floor_angle: f32,
    pub ground_friction: f32,
    pub braking_deceleration: f32,
    pub initial_gravity: f32,
    pub jump_gravity: f32,
    pub falling_gravity: f32,
    pub sensitivity: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            walk_speed: 600.0,
            sprint_speed: 1000.0,
            slow_walk_speed: 250.0,
            jump_z_velocity: 700.0,
            walkable_floor_angle: WALKABLE_FLOOR_ANGLE,
            ground_friction: 8.0,
            braking_deceleration: 2048.0,
            initial_gravity: 1.0,
            jump_gravity: 1.0,
            falling_gravity: 2.0,
            sensitivity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConfig {
    pub max_jump: u32,
    /// Seconds after releasing jump with no jumps left before they refill.
    /// `None` keeps jumps empty until landing or leaving a wall.
    pub refill_delay: Option<f32>,
}

impl Default for JumpConfig {
    fn default() -> Self {
        Self {
            max_jump: 2,
            refill_delay: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WallRunConfig {
    pub speed: f32,
    /// Hard limit on a single run before it ends with a fall-off.
    pub max_duration: f32,
    pub gravity_scale: f32,
    /// Degrees of camera roll while running.
    pub camera_tilt: f32,
    /// Degrees per second.
    pub camera_tilt_rate: f32,
}

impl Default for WallRunConfig {
    fn default() -> Self {
        Self {
            speed: 1000.0,
            max_duration: 2.0,
            gravity_scale: 0.0,
            camera_tilt: 15.0,
            camera_tilt_rate: 90.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlideConfig {
    pub min_speed: f32,
    pub enter_impulse: f32,
    pub gravity_force: f32,
    pub friction: f32,
    pub duration: f32,
    pub capsule_restore_delay: f32,
}

impl Default for SlideConfig {
    fn default() -> Self {
        Self {
            min_speed: 350.0,
            enter_impulse: 500.0,
            gravity_force: 5000.0,
            friction: 1.3,
            duration: 2.0,
            capsule_restore_delay: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashConfig {
    pub force: f32,
    pub time: f32,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            force: 2500.0,
            time: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// How far below the actor origin the wall probe starts.
    pub probe_drop: f32,
    pub reach: f32,
    /// Walls taller than this above the probe hit are climbed, not vaulted.
    pub climb_height: f32,
    /// Depth of the second top probe that decides wall thickness.
    pub thickness_probe: f32,
    pub thick_tolerance: f32,
    pub head_clearance: f32,
    pub climb_duration: f32,
    pub get_up_duration: f32,
    pub vault_duration: f32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            probe_drop: 44.0,
            reach: 70.0,
            climb_height: 60.0,
            thickness_probe: 50.0,
            thick_tolerance: 30.0,
            head_clearance: 200.0,
            climb_duration: 4.0,
            get_up_duration: 4.0,
            vault_duration: 3.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub max_health: f32,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self { max_health: 5.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HazardConfig {
    pub laser_online_time: f32,
    pub laser_offline_time: f32,
    pub mine_delay: f32,
    pub mine_damage: f32,
    pub level_time_limit: u32,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            laser_online_time: 2.0,
            laser_offline_time: 1.5,
            mine_delay: 2.0,
            mine_damage: 1.0,
            level_time_limit: 180,
        }
    }
}

/// Level names the game asks the host to open.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelNames {
    pub main_menu: String,
    pub laser_death: String,
    pub time_up: String,
}

impl Default for LevelNames {
    fn default() -> Self {
        Self {
            main_menu: "Main_Menu".to_string(),
            laser_death: "LaserDeath".to_string(),
            time_up: "Time".to_string(),
        }
    }
}

/// Everything tunable, loadable from a JSON file. Missing fields keep their defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub movement: MovementConfig,
    pub jump: JumpConfig,
    pub wall_run: WallRunConfig,
    pub slide: SlideConfig,
    pub dash: DashConfig,
    pub vault: VaultConfig,
    pub health: HealthConfig,
    pub hazards: HazardConfig,
    pub levels: LevelNames,
    pub bindings: KeyBindings,
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json(&text)?;
        log::info!("Loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("movement.walk_speed", self.movement.walk_speed),
            ("movement.sprint_speed", self.movement.sprint_speed),
            ("movement.slow_walk_speed", self.movement.slow_walk_speed),
            ("movement.jump_z_velocity", self.movement.jump_z_velocity),
            ("wall_run.speed", self.wall_run.speed),
            ("wall_run.max_duration", self.wall_run.max_duration),
            ("slide.duration", self.slide.duration),
            ("dash.time", self.dash.time),
            ("hazards.mine_delay", self.hazards.mine_delay),
            ("health.max_health", self.health.max_health),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be positive, got {}", value),
                });
            }
        }

        if !(0.0..90.0).contains(&self.movement.walkable_floor_angle) {
            return Err(ConfigError::Invalid {
                field: "movement.walkable_floor_angle",
                reason: format!("{} is not within [0, 90)", self.movement.walkable_floor_angle),
            });
        }
        if self.jump.max_jump == 0 {
            return Err(ConfigError::Invalid {
                field: "jump.max_jump",
                reason: "at least one jump is required".to_string(),
            });
        }
        if self.hazards.laser_online_time + self.hazards.laser_offline_time <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "hazards.laser_online_time",
                reason: "laser duty cycle must have a positive period".to_string(),
            });
        }
        if let Some(delay) = self.jump.refill_delay
            && delay < 0.0
        {
            log::warn!("Negative jump refill delay {}, refilling immediately", delay);
        }
        Ok(())
    }
}
