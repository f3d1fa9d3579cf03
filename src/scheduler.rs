// Timed tasks and the idle scheduler.
//
// The event loop owns the actual timers (`SetTimer` on Windows). Each task has
// its own arm/disarm lifecycle so the engine can tie them to state entry and
// exit instead of multiplexing one dispatcher.

use std::time::Duration;

/// Clock readout refresh period while the overlay is up.
pub const CLOCK_REFRESH: Duration = Duration::from_secs(1);
/// Shortest idle interval the scheduler will arm.
pub const MIN_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTask {
    /// Fires once per idle interval to open the overlay.
    IdleFire,
    /// Fade animation tick.
    FadeTick,
    /// Repaint to keep the clock current.
    ClockRefresh,
}

impl TimerTask {
    pub const ALL: [TimerTask; 3] = [
        TimerTask::IdleFire,
        TimerTask::FadeTick,
        TimerTask::ClockRefresh,
    ];

    /// Stable id for platform timer APIs.
    pub fn id(self) -> usize {
        match self {
            TimerTask::IdleFire => 1,
            TimerTask::FadeTick => 2,
            TimerTask::ClockRefresh => 3,
        }
    }

    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }
}

/// Repeating timers provided by the event loop.
///
/// Arming an already armed task replaces its period and restarts it.
pub trait TimerHost {
    fn arm(&mut self, task: TimerTask, period: Duration);
    fn disarm(&mut self, task: TimerTask);
}

/// One-shot-per-firing idle timer.
#[derive(Debug, Default)]
pub struct IdleScheduler {
    armed: bool,
}

impl IdleScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)arms the timer for a full interval.
    pub fn start(&mut self, timers: &mut dyn TimerHost, interval: Duration) {
        let interval = interval.max(MIN_INTERVAL);
        timers.disarm(TimerTask::IdleFire);
        timers.arm(TimerTask::IdleFire, interval);
        self.armed = true;
        tracing::debug!(secs = interval.as_secs(), "Idle scheduler armed");
    }

    pub fn stop(&mut self, timers: &mut dyn TimerHost) {
        timers.disarm(TimerTask::IdleFire);
        if self.armed {
            tracing::debug!("Idle scheduler stopped");
        }
        self.armed = false;
    }

    /// Handles an `IdleFire` tick. Returns `true` when the tick is a real
    /// firing; the scheduler stops itself so nothing can queue behind it.
    pub fn fire(&mut self, timers: &mut dyn TimerHost) -> bool {
        if !self.armed {
            timers.disarm(TimerTask::IdleFire);
            return false;
        }
        self.stop(timers);
        true
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTimers;

    #[test]
    fn task_ids_round_trip() {
        for task in TimerTask::ALL {
            assert_eq!(TimerTask::from_id(task.id()), Some(task));
        }
        assert_eq!(TimerTask::from_id(0), None);
        assert_eq!(TimerTask::from_id(99), None);
    }

    #[test]
    fn start_arms_for_whole_interval() {
        let mut timers = FakeTimers::default();
        let mut idle = IdleScheduler::new();
        idle.start(&mut timers, Duration::from_secs(15 * 60));

        assert!(idle.is_armed());
        assert_eq!(
            timers.period(TimerTask::IdleFire),
            Some(Duration::from_secs(15 * 60))
        );
    }

    #[test]
    fn zero_interval_is_clamped() {
        let mut timers = FakeTimers::default();
        let mut idle = IdleScheduler::new();
        idle.start(&mut timers, Duration::ZERO);
        assert_eq!(timers.period(TimerTask::IdleFire), Some(MIN_INTERVAL));
    }

    #[test]
    fn fire_stops_the_timer() {
        let mut timers = FakeTimers::default();
        let mut idle = IdleScheduler::new();
        idle.start(&mut timers, MIN_INTERVAL);

        assert!(idle.fire(&mut timers));
        assert!(!idle.is_armed());
        assert!(!timers.is_armed(TimerTask::IdleFire));
        // A stale tick already in the queue is swallowed.
        assert!(!idle.fire(&mut timers));
    }

    #[test]
    fn restart_replaces_previous_arming() {
        let mut timers = FakeTimers::default();
        let mut idle = IdleScheduler::new();
        idle.start(&mut timers, Duration::from_secs(5 * 60));
        idle.start(&mut timers, Duration::from_secs(7 * 60));
        assert_eq!(
            timers.period(TimerTask::IdleFire),
            Some(Duration::from_secs(7 * 60))
        );
        idle.stop(&mut timers);
        assert!(!timers.is_armed(TimerTask::IdleFire));
    }
}
