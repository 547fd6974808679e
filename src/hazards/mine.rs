use glam::Vec3;

use crate::config::HazardConfig;
use crate::timer::{TimerHandle, TimerManager};
use crate::trigger::{ActorId, OverlapEventType, OverlapTracker, TriggerVolume};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MineTimer {
    Explode,
}

/// Damage dealt by an exploding mine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Explosion {
    pub target: ActorId,
    pub damage: f32,
}

/// Arms when the player steps into its radius and explodes after a delay
/// unless they leave first.
#[derive(Debug, Clone)]
pub struct ProximityMine {
    pub volume: TriggerVolume,
    delay: f32,
    damage: f32,
    timers: TimerManager<MineTimer>,
    fuse: Option<TimerHandle>,
    target: Option<ActorId>,
    overlaps: OverlapTracker,
    destroyed: bool,
}

impl ProximityMine {
    pub fn new(center: Vec3, radius: f32, config: &HazardConfig) -> Self {
        Self {
            volume: TriggerVolume::sphere(center, radius),
            delay: config.mine_delay,
            damage: config.mine_damage,
            timers: TimerManager::new(),
            fuse: None,
            target: None,
            overlaps: OverlapTracker::new(),
            destroyed: false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.fuse.is_some_and(|h| self.timers.is_active(h))
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn end_play(&mut self) {
        self.timers.clear_all();
        self.fuse = None;
    }

    pub fn tick(&mut self, dt: f32, player: ActorId, bounds: (Vec3, Vec3)) -> Option<Explosion> {
        if self.destroyed {
            return None;
        }

        let touching = self.volume.intersects_aabb(bounds.0, bounds.1);
        if let Some(event) = self.overlaps.update(player, touching) {
            match event.event_type {
                OverlapEventType::Begin => {
                    log::debug!("Mine armed by {:?}", event.other);
                    self.target = Some(event.other);
                    self.fuse = Some(self.timers.set_timer(MineTimer::Explode, self.delay, false));
                }
                OverlapEventType::End => {
                    if let Some(fuse) = self.fuse.take() {
                        self.timers.clear_timer(fuse);
                        log::debug!("Mine disarmed");
                    }
                }
            }
        }

        for fired in self.timers.tick(dt) {
            match fired {
                MineTimer::Explode => {
                    let target = self.target?;
                    self.destroyed = true;
                    self.end_play();
                    log::info!("Mine at {:?} exploded", self.volume.center());
                    return Some(Explosion {
                        target,
                        damage: self.damage,
                    });
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLAYER: ActorId = ActorId(7);
    const INSIDE: (Vec3, Vec3) = (Vec3::splat(-10.0), Vec3::splat(10.0));
    const OUTSIDE: (Vec3, Vec3) = (Vec3::splat(500.0), Vec3::splat(600.0));

    fn mine() -> ProximityMine {
        ProximityMine::new(Vec3::ZERO, 100.0, &HazardConfig::default())
    }

    #[test]
    fn explodes_after_delay() {
        let mut mine = mine();
        assert_eq!(mine.tick(0.5, PLAYER, INSIDE), None);
        assert!(mine.is_armed());
        assert_eq!(mine.tick(1.0, PLAYER, INSIDE), None);
        let explosion = mine.tick(1.1, PLAYER, INSIDE).unwrap();
        assert_eq!(explosion.target, PLAYER);
        assert_eq!(explosion.damage, 1.0);
        assert!(mine.is_destroyed());
        assert_eq!(mine.tick(5.0, PLAYER, INSIDE), None);
    }

    #[test]
    fn leaving_cancels_fuse() {
        let mut mine = mine();
        mine.tick(1.0, PLAYER, INSIDE);
        mine.tick(0.5, PLAYER, OUTSIDE);
        assert!(!mine.is_armed());
        assert_eq!(mine.tick(5.0, PLAYER, OUTSIDE), None);
        assert!(!mine.is_destroyed());
    }

    #[test]
    fn re_entering_restarts_fuse() {
        let mut mine = mine();
        mine.tick(1.5, PLAYER, INSIDE);
        mine.tick(0.1, PLAYER, OUTSIDE);
        assert_eq!(mine.tick(1.5, PLAYER, INSIDE), None);
        assert!(mine.tick(0.6, PLAYER, INSIDE).is_some());
    }
}
