//! Cooperative timers.
//!
//! Timers never run on their own: the owner advances them with [`TimerManager::tick`]
//! and handles whatever fired. Each actor owns its manager, so dropping or
//! clearing it cancels every pending callback.

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct Timer<E> {
    handle: TimerHandle,
    event: E,
    remaining: f32,
    interval: f32,
    looping: bool,
}

#[derive(Debug, Clone)]
pub struct TimerManager<E> {
    timers: Vec<Timer<E>>,
    next_handle: u64,
}

impl<E: Clone> TimerManager<E> {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_handle: 1,
        }
    }

    /// Schedule `event` after `delay` seconds, repeating every `delay` if `looping`.
    pub fn set_timer(&mut self, event: E, delay: f32, looping: bool) -> TimerHandle {
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.timers.push(Timer {
            handle,
            event,
            remaining: delay.max(0.0),
            interval: delay.max(0.0),
            looping,
        });
        handle
    }

    /// Cancel a timer. Returns false if it already fired or was cleared.
    pub fn clear_timer(&mut self, handle: TimerHandle) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.handle != handle);
        self.timers.len() != before
    }

    pub fn clear_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_active(&self, handle: TimerHandle) -> bool {
        self.timers.iter().any(|t| t.handle == handle)
    }

    pub fn remaining(&self, handle: TimerHandle) -> Option<f32> {
        self.timers
            .iter()
            .find(|t| t.handle == handle)
            .map(|t| t.remaining)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Advance all timers by `dt` and return the events that fired, in firing order.
    ///
    /// A looping timer whose interval is shorter than `dt` fires once per
    /// elapsed interval. A zero interval looping timer fires once per tick.
    pub fn tick(&mut self, dt: f32) -> Vec<E> {
        let mut fired: Vec<(f32, E)> = Vec::new();

        for timer in &mut self.timers {
            timer.remaining -= dt;
            while timer.remaining <= 0.0 {
                fired.push((timer.remaining, timer.event.clone()));
                if !timer.looping {
                    break;
                }
                if timer.interval <= 0.0 {
                    timer.remaining = 0.0;
                    break;
                }
                timer.remaining += timer.interval;
            }
        }

        self.timers
            .retain(|t| t.looping || t.remaining > 0.0);

        // Most overdue first
        fired.sort_by(|a, b| a.0.total_cmp(&b.0));
        fired.into_iter().map(|(_, e)| e).collect()
    }
}

impl<E: Clone> Default for TimerManager<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Ev {
        A,
        B,
    }

    #[test]
    fn one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let h = timers.set_timer(Ev::A, 1.0, false);
        assert!(timers.tick(0.5).is_empty());
        assert!(timers.is_active(h));
        assert_eq!(timers.tick(0.6), vec![Ev::A]);
        assert!(!timers.is_active(h));
        assert!(timers.tick(5.0).is_empty());
    }

    #[test]
    fn looping_fires_every_interval() {
        let mut timers = TimerManager::new();
        timers.set_timer(Ev::A, 1.0, true);
        assert_eq!(timers.tick(1.0), vec![Ev::A]);
        assert!(timers.tick(0.5).is_empty());
        assert_eq!(timers.tick(2.0), vec![Ev::A, Ev::A]);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn cleared_timer_never_fires() {
        let mut timers = TimerManager::new();
        let h = timers.set_timer(Ev::A, 1.0, false);
        assert!(timers.clear_timer(h));
        assert!(!timers.clear_timer(h));
        assert!(timers.tick(2.0).is_empty());
    }

    #[test]
    fn clear_all_cancels_everything() {
        let mut timers = TimerManager::new();
        timers.set_timer(Ev::A, 1.0, false);
        timers.set_timer(Ev::B, 1.0, true);
        timers.clear_all();
        assert!(timers.is_empty());
        assert!(timers.tick(3.0).is_empty());
    }

    #[test]
    fn fires_in_due_order() {
        let mut timers = TimerManager::new();
        timers.set_timer(Ev::B, 0.8, false);
        timers.set_timer(Ev::A, 0.2, false);
        assert_eq!(timers.tick(1.0), vec![Ev::A, Ev::B]);
    }

    #[test]
    fn remaining_counts_down() {
        let mut timers = TimerManager::new();
        let h = timers.set_timer(Ev::A, 2.0, false);
        timers.tick(0.5);
        assert!((timers.remaining(h).unwrap() - 1.5).abs() < 1e-6);
    }
}
