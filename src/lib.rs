//! First-person parkour movement: wall-running, sliding, vaulting, sprinting,
//! chained jumps, course hazards and a level countdown, simulated headless
//! against static collision geometry.

pub mod character;
pub mod collision;
pub mod config;
pub mod course;
pub mod error;
pub mod game;
pub mod geometry;
pub mod hazards;
pub mod input;
pub mod jump;
pub mod level;
pub mod movement;
pub mod timer;
pub mod trigger;
pub mod vault;
pub mod wallrun;

pub use character::{Character, CharacterEvent};
pub use config::GameConfig;
pub use course::{CourseDesc, LoadedCourse};
pub use game::GameState;
pub use input::{InputAction, InputFrame, InputState, TriggerEvent};
pub use level::LevelRequest;
