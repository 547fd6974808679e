use crate::level::LevelRequest;
use crate::timer::{TimerHandle, TimerManager};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LevelTimerEvent {
    Second,
}

/// Per-level countdown. When it runs out the time-up level is requested.
#[derive(Debug, Clone)]
pub struct LevelTimer {
    time: u32,
    timers: TimerManager<LevelTimerEvent>,
    countdown: Option<TimerHandle>,
    time_up_level: String,
}

impl LevelTimer {
    pub fn new(time_limit: u32, time_up_level: impl Into<String>) -> Self {
        Self {
            time: time_limit,
            timers: TimerManager::new(),
            countdown: None,
            time_up_level: time_up_level.into(),
        }
    }

    pub fn begin_play(&mut self) {
        self.countdown = Some(self.timers.set_timer(LevelTimerEvent::Second, 1.0, true));
    }

    pub fn end_play(&mut self) {
        self.timers.clear_all();
        self.countdown = None;
    }

    pub fn seconds_left(&self) -> u32 {
        self.time
    }

    pub fn is_running(&self) -> bool {
        self.countdown.is_some_and(|h| self.timers.is_active(h))
    }

    /// Stop counting and ask for the current level to be reopened.
    pub fn safe_level_reload(&mut self) -> LevelRequest {
        self.end_play();
        log::info!("Reloading level");
        LevelRequest::Reload
    }

    pub fn tick(&mut self, dt: f32) -> Option<LevelRequest> {
        for event in self.timers.tick(dt) {
            match event {
                LevelTimerEvent::Second if self.time > 0 => {
                    self.time -= 1;
                    log::debug!("Time = {}", self.time);
                }
                LevelTimerEvent::Second => {
                    log::info!("Timer ended");
                    self.end_play();
                    return Some(LevelRequest::Open(self.time_up_level.clone()));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_down_then_requests_time_up() {
        let mut timer = LevelTimer::new(3, "Time");
        timer.begin_play();
        assert_eq!(timer.tick(1.0), None);
        assert_eq!(timer.seconds_left(), 2);
        assert_eq!(timer.tick(2.0), None);
        assert_eq!(timer.seconds_left(), 0);
        assert_eq!(timer.tick(1.0), Some(LevelRequest::Open("Time".to_string())));
        assert!(!timer.is_running());
        assert_eq!(timer.tick(10.0), None);
    }

    #[test]
    fn not_started_does_nothing() {
        let mut timer = LevelTimer::new(1, "Time");
        assert_eq!(timer.tick(5.0), None);
        assert_eq!(timer.seconds_left(), 1);
    }

    #[test]
    fn reload_stops_countdown() {
        let mut timer = LevelTimer::new(180, "Time");
        timer.begin_play();
        timer.tick(1.0);
        assert_eq!(timer.safe_level_reload(), LevelRequest::Reload);
        assert!(!timer.is_running());
        assert_eq!(timer.tick(500.0), None);
        assert_eq!(timer.seconds_left(), 179);
    }
}
