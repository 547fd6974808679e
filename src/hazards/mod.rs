//! Standalone hazard actors placed on a course.

pub mod laser;
pub mod level_timer;
pub mod mine;
pub mod platform;

pub use laser::Laser;
pub use level_timer::LevelTimer;
pub use mine::{Explosion, ProximityMine};
pub use platform::SamplePlatform;
