use glam::Vec3;

use crate::config::HazardConfig;
use crate::level::LevelRequest;
use crate::trigger::{ActorId, OverlapEventType, OverlapTracker, TriggerVolume};

/// Laser beam with an on/off duty cycle. Touching it while lit kills the run.
#[derive(Debug, Clone)]
pub struct Laser {
    pub volume: TriggerVolume,
    online_time: f32,
    offline_time: f32,
    tracking_time: f32,
    active: bool,
    player: Option<ActorId>,
    overlaps: OverlapTracker,
}

impl Laser {
    pub fn new(volume: TriggerVolume, config: &HazardConfig) -> Self {
        Self {
            volume,
            online_time: config.laser_online_time,
            offline_time: config.laser_offline_time,
            tracking_time: 0.0,
            active: false,
            player: None,
            overlaps: OverlapTracker::new(),
        }
    }

    /// Start phase offset, for staggering several lasers.
    pub fn with_phase(mut self, seconds: f32) -> Self {
        self.tracking_time = seconds;
        self
    }

    pub fn begin_play(&mut self, player: ActorId) {
        self.player = Some(player);
    }

    pub fn end_play(&mut self) {
        self.player = None;
        self.overlaps.reset();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tracking_time(&self) -> f32 {
        self.tracking_time
    }

    fn advance(&mut self, dt: f32) {
        self.tracking_time += dt;

        if self.tracking_time > 0.0 && self.tracking_time < self.online_time && !self.active {
            self.active = true;
            log::debug!("Laser online");
        } else if self.tracking_time >= self.online_time
            && self.tracking_time <= self.online_time + self.offline_time
            && self.active
        {
            self.active = false;
            // Collision is off, so whoever was inside is forgotten
            self.overlaps.reset();
            log::debug!("Laser offline");
        }

        let period = self.online_time + self.offline_time;
        if period > 0.0 {
            while self.tracking_time > period {
                self.tracking_time -= period;
            }
        }
    }

    /// Advance the duty cycle and test the player's bounds against the beam.
    pub fn tick(
        &mut self,
        dt: f32,
        other: ActorId,
        bounds: (Vec3, Vec3),
        death_level: &str,
    ) -> Option<LevelRequest> {
        self.advance(dt);
        if !self.active {
            return None;
        }

        let touching = self.volume.intersects_aabb(bounds.0, bounds.1);
        let event = self.overlaps.update(other, touching)?;
        if event.event_type == OverlapEventType::Begin && self.player == Some(event.other) {
            log::info!("Player hit laser at {:?}", self.volume.center());
            return Some(LevelRequest::Open(death_level.to_string()));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: ActorId = ActorId(1);
    const FAR: (Vec3, Vec3) = (Vec3::splat(1000.0), Vec3::splat(1100.0));
    const INSIDE: (Vec3, Vec3) = (Vec3::splat(-10.0), Vec3::splat(10.0));

    fn laser() -> Laser {
        let mut laser = Laser::new(
            TriggerVolume::box_shape(Vec3::ZERO, Vec3::new(400.0, 10.0, 10.0)),
            &HazardConfig::default(),
        );
        laser.begin_play(PLAYER);
        laser
    }

    #[test]
    fn duty_cycle_toggles_and_wraps() {
        let mut laser = laser();
        laser.tick(0.1, PLAYER, FAR, "LaserDeath");
        assert!(laser.is_active());
        laser.tick(2.0, PLAYER, FAR, "LaserDeath");
        assert!(!laser.is_active());
        laser.tick(1.0, PLAYER, FAR, "LaserDeath");
        assert!(!laser.is_active());
        // 3.6 s wraps past the 3.5 s period
        laser.tick(0.5, PLAYER, FAR, "LaserDeath");
        assert!(laser.tracking_time() < 0.2);
        laser.tick(0.1, PLAYER, FAR, "LaserDeath");
        assert!(laser.is_active());
    }

    #[test]
    fn touching_lit_laser_requests_death_level() {
        let mut laser = laser();
        let request = laser.tick(0.1, PLAYER, INSIDE, "LaserDeath");
        assert_eq!(request, Some(LevelRequest::Open("LaserDeath".to_string())));
        // Staying inside does not repeat the request
        assert_eq!(laser.tick(0.1, PLAYER, INSIDE, "LaserDeath"), None);
    }

    #[test]
    fn dark_laser_is_harmless() {
        let mut laser = laser().with_phase(2.2);
        assert_eq!(laser.tick(0.1, PLAYER, INSIDE, "LaserDeath"), None);
        assert!(!laser.is_active());
    }

    #[test]
    fn relighting_on_player_kills() {
        let mut laser = laser().with_phase(2.0);
        assert_eq!(laser.tick(0.1, PLAYER, INSIDE, "LaserDeath"), None);
        // Wraps back to the start of the cycle while the player stands in the beam
        assert_eq!(laser.tick(1.5, PLAYER, INSIDE, "LaserDeath"), None);
        assert!(laser.tick(0.1, PLAYER, INSIDE, "LaserDeath").is_some());
    }

    #[test]
    fn without_cached_player_nothing_happens() {
        let mut laser = laser();
        laser.end_play();
        assert_eq!(laser.tick(0.1, PLAYER, INSIDE, "LaserDeath"), None);
    }
}
