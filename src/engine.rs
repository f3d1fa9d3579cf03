// Overlay engine: the Hidden -> FadingIn -> WaitingInput -> FadingOut cycle.
//
// Everything here runs on the event-loop thread. The only state visible to
// the input hook is inside `ActivityGate`; activity comes back through the
// channel and is acted on in `on_activity`.

use crate::activity::{Activity, ActivityGate, InputDetector, OverlayState};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::fade::{Fade, FadeDirection, FADE_TICK};
use crate::monitor::MonitorEnumerator;
use crate::scheduler::{IdleScheduler, TimerHost, TimerTask, CLOCK_REFRESH};
use crate::session::{OverlaySession, OverlayWindows};
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Faded out after user activity; the idle scheduler was resumed.
    Natural,
    /// Torn down by `hide`; the scheduler is left alone unless asked.
    Forced,
}

/// Notifications for the owning collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayEvent {
    Opened { windows: usize },
    Closed(CloseReason),
    /// Input observation could not be installed; dismiss-on-activity is
    /// unavailable until a later arm succeeds.
    DetectorDegraded,
}

/// Platform services the engine drives.
pub struct Services {
    pub monitors: Box<dyn MonitorEnumerator>,
    pub windows: Box<dyn OverlayWindows>,
    pub detector: Box<dyn InputDetector>,
    pub timers: Box<dyn TimerHost>,
}

pub struct OverlayEngine {
    config: AppConfig,
    gate: Arc<ActivityGate>,
    activity: Receiver<Activity>,
    session: Option<OverlaySession>,
    idle: IdleScheduler,
    monitors: Box<dyn MonitorEnumerator>,
    windows: Box<dyn OverlayWindows>,
    detector: Box<dyn InputDetector>,
    timers: Box<dyn TimerHost>,
    events: VecDeque<OverlayEvent>,
}

impl OverlayEngine {
    pub fn new(
        services: Services,
        config: AppConfig,
        gate: ActivityGate,
        activity: Receiver<Activity>,
    ) -> Self {
        Self {
            config: config.normalized(),
            gate: Arc::new(gate),
            activity,
            session: None,
            idle: IdleScheduler::new(),
            monitors: services.monitors,
            windows: services.windows,
            detector: services.detector,
            timers: services.timers,
            events: VecDeque::new(),
        }
    }

    /// Arms the idle scheduler with the current interval.
    pub fn start(&mut self) {
        self.idle
            .start(self.timers.as_mut(), self.config.interval());
    }

    /// Stops the idle scheduler without touching an open overlay.
    pub fn stop(&mut self) {
        self.idle.stop(self.timers.as_mut());
    }

    /// Replaces the saved configuration. The idle timer restarts right away
    /// when the overlay is hidden; otherwise the natural close picks up the
    /// new interval.
    pub fn reconfigure(&mut self, config: AppConfig) {
        self.config = config.normalized();
        if self.is_visible() {
            tracing::debug!("Config updated while overlay is open, scheduler resumes on close");
        } else {
            self.start();
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn state(&self) -> OverlayState {
        self.gate.state()
    }

    pub fn is_visible(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&OverlaySession> {
        self.session.as_ref()
    }

    pub fn gate(&self) -> &Arc<ActivityGate> {
        &self.gate
    }

    pub fn idle_armed(&self) -> bool {
        self.idle.is_armed()
    }

    pub fn take_events(&mut self) -> Vec<OverlayEvent> {
        self.events.drain(..).collect()
    }

    /// Shows the overlay with the saved configuration.
    pub fn show(&mut self, now: Instant) -> Result<bool> {
        self.show_with_config(self.config.clone(), now)
    }

    /// Opens a session on every monitor and starts fading in.
    ///
    /// Returns `Ok(false)` without side effects when an overlay is already
    /// up. On error nothing is left open and the state stays `Hidden`.
    pub fn show_with_config(&mut self, config: AppConfig, now: Instant) -> Result<bool> {
        if self.state() != OverlayState::Hidden || self.session.is_some() {
            tracing::debug!(state = ?self.state(), "Overlay already showing, ignoring show request");
            return Ok(false);
        }

        let config = config.normalized();
        let rects = self.monitors.list_monitor_rects();
        let mut session = OverlaySession::open(self.windows.as_mut(), &rects, config)?;

        self.idle.stop(self.timers.as_mut());

        let fade_duration = session.config().fade_duration();
        session.set_fade(Some(Fade::new(
            FadeDirection::In,
            session.target_alpha(),
            now,
            fade_duration,
        )));
        let window_count = session.windows().len();
        tracing::info!(
            windows = window_count,
            target_alpha = session.target_alpha(),
            fade_ms = fade_duration.as_millis() as u64,
            "Overlay fading in"
        );

        self.session = Some(session);
        self.gate.set_state(OverlayState::FadingIn);
        self.arm_detector();

        self.timers.arm(TimerTask::FadeTick, FADE_TICK);
        self.timers.arm(TimerTask::ClockRefresh, CLOCK_REFRESH);
        if let Some(session) = &self.session {
            session.invalidate_all(self.windows.as_mut());
        }

        self.events.push_back(OverlayEvent::Opened {
            windows: window_count,
        });
        Ok(true)
    }

    /// Manual preview with a possibly unsaved config. Stops the idle timer
    /// first; a natural close resumes it like any other cycle. Refused with
    /// `Error::OverlayBusy` while a break is on screen.
    pub fn preview(&mut self, config: AppConfig, now: Instant) -> Result<()> {
        if self.is_visible() {
            return Err(Error::OverlayBusy);
        }
        self.idle.stop(self.timers.as_mut());
        match self.show_with_config(config, now) {
            Ok(_) => Ok(()),
            Err(e) => {
                self.start();
                Err(e)
            }
        }
    }

    /// Forces the overlay closed from any state. Does not resume the idle
    /// scheduler.
    pub fn hide(&mut self) {
        self.close(CloseReason::Forced);
    }

    /// Forces the overlay closed and re-arms the idle scheduler.
    pub fn hide_and_resume(&mut self) {
        self.close(CloseReason::Forced);
        self.start();
    }

    /// Dispatches a tick from the event loop.
    pub fn on_timer(&mut self, task: TimerTask, now: Instant) {
        match task {
            TimerTask::IdleFire => {
                if !self.idle.fire(self.timers.as_mut()) {
                    return;
                }
                tracing::info!("Idle interval elapsed");
                match self.show(now) {
                    Ok(_) => {}
                    Err(e) => {
                        tracing::error!(error = %e, "Could not open overlay, retrying next interval");
                        self.start();
                    }
                }
            }
            TimerTask::FadeTick => self.tick_fade(now),
            TimerTask::ClockRefresh => match &self.session {
                Some(session) => session.invalidate_all(self.windows.as_mut()),
                None => self.timers.disarm(TimerTask::ClockRefresh),
            },
        }
    }

    /// Drains detector notifications. The first one seen while waiting for
    /// input starts the fade out.
    pub fn on_activity(&mut self, now: Instant) {
        let signalled = self.activity.try_iter().count() > 0;
        if signalled && self.state() == OverlayState::WaitingInput {
            self.begin_fade_out(now);
        }
    }

    fn tick_fade(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            self.timers.disarm(TimerTask::FadeTick);
            return;
        };
        let Some(fade) = session.fade().copied() else {
            self.timers.disarm(TimerTask::FadeTick);
            return;
        };

        let frame = fade.sample(now);
        session.set_alpha_all(self.windows.as_mut(), frame.alpha);
        if !frame.done {
            return;
        }

        session.set_fade(None);
        self.timers.disarm(TimerTask::FadeTick);
        match fade.direction() {
            FadeDirection::In => self.enter_waiting_input(),
            FadeDirection::Out => self.close(CloseReason::Natural),
        }
    }

    fn enter_waiting_input(&mut self) {
        self.gate.reset_latch();
        // Anything queued during the fade in predates this arming.
        let _ = self.activity.try_iter().count();
        self.gate.set_state(OverlayState::WaitingInput);
        if !self.detector.is_armed() {
            self.arm_detector();
        }
        tracing::info!("Overlay waiting for input");
    }

    fn begin_fade_out(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.set_fade(Some(Fade::new(
            FadeDirection::Out,
            session.target_alpha(),
            now,
            session.config().fade_duration(),
        )));
        self.gate.set_state(OverlayState::FadingOut);
        self.timers.arm(TimerTask::FadeTick, FADE_TICK);
        tracing::info!("Activity detected, overlay fading out");
    }

    fn arm_detector(&mut self) {
        self.gate.reset_latch();
        if let Err(e) = self.detector.arm(&self.gate) {
            tracing::warn!(error = %e, "Input detector unavailable, overlay will not dismiss on activity");
            self.events.push_back(OverlayEvent::DetectorDegraded);
        }
    }

    fn close(&mut self, reason: CloseReason) {
        self.timers.disarm(TimerTask::FadeTick);
        self.timers.disarm(TimerTask::ClockRefresh);

        let had_session = match self.session.take() {
            Some(session) => {
                session.close(self.windows.as_mut());
                true
            }
            None => false,
        };

        self.gate.set_state(OverlayState::Hidden);
        self.detector.disarm(&self.gate);
        self.gate.reset_latch();
        let _ = self.activity.try_iter().count();

        if !had_session {
            return;
        }
        if reason == CloseReason::Natural {
            self.start();
        }
        tracing::info!(?reason, "Overlay closed");
        self.events.push_back(OverlayEvent::Closed(reason));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::MonitorRect;
    use crate::testing::{FakeDetector, FakeMonitors, FakeTimers, FakeWindows};
    use std::time::Duration;

    struct Rig {
        engine: OverlayEngine,
        windows: FakeWindows,
        monitors: FakeMonitors,
        detector: FakeDetector,
        timers: FakeTimers,
    }

    fn secs(s: f64) -> Duration {
        Duration::from_secs_f64(s)
    }

    fn one_monitor() -> Vec<MonitorRect> {
        vec![MonitorRect::new(0, 0, 1920, 1080)]
    }

    fn two_monitors() -> Vec<MonitorRect> {
        vec![
            MonitorRect::new(0, 0, 1920, 1080),
            MonitorRect::new(1920, 0, 3840, 1080),
        ]
    }

    fn scenario_config() -> AppConfig {
        AppConfig {
            interval_minutes: 1,
            fade_seconds: 5,
            opacity_percent: 60,
            ..AppConfig::default()
        }
    }

    fn rig(rects: Vec<MonitorRect>, config: AppConfig) -> Rig {
        let windows = FakeWindows::default();
        let monitors = FakeMonitors::new(rects);
        let detector = FakeDetector::default();
        let timers = FakeTimers::default();
        let (gate, rx) = ActivityGate::channel();
        let engine = OverlayEngine::new(
            Services {
                monitors: Box::new(monitors.clone()),
                windows: Box::new(windows.clone()),
                detector: Box::new(detector.clone()),
                timers: Box::new(timers.clone()),
            },
            config,
            gate,
            rx,
        );
        Rig {
            engine,
            windows,
            monitors,
            detector,
            timers,
        }
    }

    /// Drives a freshly shown overlay to WaitingInput.
    fn fade_in(rig: &mut Rig, t0: Instant) {
        rig.engine.on_timer(TimerTask::FadeTick, t0 + secs(5.0));
        assert_eq!(rig.engine.state(), OverlayState::WaitingInput);
    }

    /// Delivers one input event and lets the loop react.
    fn poke(rig: &mut Rig, at: Instant) {
        rig.engine.gate().notify_input();
        rig.engine.on_activity(at);
    }

    #[test]
    fn single_monitor_fade_in_scenario() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();

        assert!(r.engine.show(t0).unwrap());
        assert_eq!(r.engine.state(), OverlayState::FadingIn);
        assert_eq!(r.windows.live_count(), 1);
        assert_eq!(r.windows.alphas(), vec![0]);
        assert!(r.detector.armed());
        assert_eq!(r.timers.period(TimerTask::FadeTick), Some(FADE_TICK));
        assert_eq!(r.timers.period(TimerTask::ClockRefresh), Some(CLOCK_REFRESH));

        let session = r.engine.session().unwrap();
        assert_eq!(session.target_alpha(), 153);
        assert_eq!(session.windows().len(), 1);

        r.engine.on_timer(TimerTask::FadeTick, t0 + secs(2.5));
        let mid = r.windows.alphas()[0];
        assert!((76..=78).contains(&mid), "alpha {mid}");
        assert_eq!(r.engine.state(), OverlayState::FadingIn);

        r.engine.on_timer(TimerTask::FadeTick, t0 + secs(5.0));
        assert_eq!(r.windows.alphas(), vec![153]);
        assert_eq!(r.engine.session().unwrap().current_alpha(), 153);
        assert_eq!(r.engine.state(), OverlayState::WaitingInput);
        assert!(!r.timers.is_armed(TimerTask::FadeTick));
        assert_eq!(
            r.engine.take_events(),
            vec![OverlayEvent::Opened { windows: 1 }]
        );
    }

    #[test]
    fn late_tick_snaps_to_target() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();
        r.engine.show(t0).unwrap();
        // e.g. the machine slept through the fade
        r.engine.on_timer(TimerTask::FadeTick, t0 + secs(3600.0));
        assert_eq!(r.windows.alphas(), vec![153]);
        assert_eq!(r.engine.state(), OverlayState::WaitingInput);
    }

    #[test]
    fn activity_fades_out_and_resumes_scheduler() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();
        r.engine.start();
        r.engine.on_timer(TimerTask::IdleFire, t0);
        fade_in(&mut r, t0);

        let t1 = t0 + secs(30.0);
        poke(&mut r, t1);
        assert_eq!(r.engine.state(), OverlayState::FadingOut);
        assert!(r.timers.is_armed(TimerTask::FadeTick));

        r.engine.on_timer(TimerTask::FadeTick, t1 + secs(1.0));
        assert_eq!(r.windows.alphas(), vec![122]);

        r.engine.on_timer(TimerTask::FadeTick, t1 + secs(5.0));
        assert_eq!(r.engine.state(), OverlayState::Hidden);
        assert_eq!(r.windows.live_count(), 0);
        assert!(!r.detector.armed());
        assert!(r.engine.idle_armed());
        assert!(!r.timers.is_armed(TimerTask::ClockRefresh));
        assert!(!r.timers.is_armed(TimerTask::FadeTick));
        assert_eq!(
            r.engine.take_events().last(),
            Some(&OverlayEvent::Closed(CloseReason::Natural))
        );
    }

    #[test]
    fn input_during_fade_in_is_ignored() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();
        r.engine.show(t0).unwrap();

        assert!(!r.engine.gate().notify_input());
        r.engine.on_activity(t0 + secs(1.0));
        assert_eq!(r.engine.state(), OverlayState::FadingIn);

        fade_in(&mut r, t0);
        assert!(!r.engine.gate().latched());
    }

    #[test]
    fn latch_fires_once_per_arming() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();
        r.engine.show(t0).unwrap();
        fade_in(&mut r, t0);

        let gate = r.engine.gate().clone();
        let fired = (0..25).filter(|_| gate.notify_input()).count();
        assert_eq!(fired, 1);

        let t1 = t0 + secs(10.0);
        r.engine.on_activity(t1);
        r.engine.on_activity(t1 + secs(0.5));
        assert_eq!(r.engine.state(), OverlayState::FadingOut);
        // Fade start was not pushed back by the second drain.
        r.engine.on_timer(TimerTask::FadeTick, t1 + secs(5.0));
        assert_eq!(r.engine.state(), OverlayState::Hidden);
    }

    #[test]
    fn show_is_a_no_op_while_not_hidden() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();
        r.engine.show(t0).unwrap();
        r.engine.on_timer(TimerTask::FadeTick, t0 + secs(1.0));

        let other = AppConfig {
            opacity_percent: 100,
            fade_seconds: 1,
            ..AppConfig::default()
        };

        let check = |r: &mut Rig, at: Instant| {
            let state = r.engine.state();
            let alphas = r.windows.alphas();
            let created = r.windows.created_count();
            assert!(!r.engine.show_with_config(other.clone(), at).unwrap());
            assert_eq!(r.engine.state(), state);
            assert_eq!(r.windows.alphas(), alphas);
            assert_eq!(r.windows.created_count(), created);
            assert_eq!(r.engine.session().unwrap().target_alpha(), 153);
        };

        check(&mut r, t0 + secs(1.5));
        fade_in(&mut r, t0);
        check(&mut r, t0 + secs(6.0));
        poke(&mut r, t0 + secs(7.0));
        assert_eq!(r.engine.state(), OverlayState::FadingOut);
        check(&mut r, t0 + secs(8.0));
    }

    #[test]
    fn hide_from_any_state_releases_everything() {
        let t0 = Instant::now();
        let drive: [fn(&mut Rig, Instant); 4] = [
            |_, _| {},
            |r, t0| {
                r.engine.show(t0).unwrap();
            },
            |r, t0| {
                r.engine.show(t0).unwrap();
                fade_in(r, t0);
            },
            |r, t0| {
                r.engine.show(t0).unwrap();
                fade_in(r, t0);
                poke(r, t0 + secs(6.0));
                r.engine.on_timer(TimerTask::FadeTick, t0 + secs(7.0));
            },
        ];

        for setup in drive {
            let mut r = rig(two_monitors(), scenario_config());
            setup(&mut r, t0);
            r.engine.hide();

            assert_eq!(r.engine.state(), OverlayState::Hidden);
            assert_eq!(r.windows.live_count(), 0);
            assert!(!r.engine.is_visible());
            assert!(!r.detector.armed());
            assert!(!r.engine.idle_armed());
            assert!(!r.timers.is_armed(TimerTask::FadeTick));
            assert!(!r.timers.is_armed(TimerTask::ClockRefresh));
        }
    }

    #[test]
    fn forced_hide_does_not_resume_unless_asked() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();
        r.engine.start();
        r.engine.on_timer(TimerTask::IdleFire, t0);
        r.engine.hide();
        assert!(!r.engine.idle_armed());
        assert_eq!(
            r.engine.take_events().last(),
            Some(&OverlayEvent::Closed(CloseReason::Forced))
        );

        r.engine.show(t0).unwrap();
        r.engine.hide_and_resume();
        assert!(r.engine.idle_armed());
        assert_eq!(r.windows.live_count(), 0);
    }

    #[test]
    fn two_monitors_open_and_close_together() {
        let mut r = rig(two_monitors(), scenario_config());
        let t0 = Instant::now();
        r.engine.show(t0).unwrap();
        assert_eq!(r.windows.live_count(), 2);

        r.engine.on_timer(TimerTask::FadeTick, t0 + secs(2.0));
        let alphas = r.windows.alphas();
        assert_eq!(alphas.len(), 2);
        assert_eq!(alphas[0], alphas[1]);

        r.engine.hide();
        assert_eq!(r.windows.live_count(), 0);
        assert_eq!(r.windows.destroyed_count(), 2);
    }

    #[test]
    fn failed_second_window_leaves_nothing_behind() {
        let mut r = rig(two_monitors(), scenario_config());
        r.windows.fail_on_create(1);

        let res = r.engine.show(Instant::now());

        assert!(res.is_err());
        assert_eq!(r.windows.live_count(), 0);
        assert_eq!(r.engine.state(), OverlayState::Hidden);
        assert!(!r.engine.is_visible());
        assert!(!r.detector.armed());
        assert!(!r.timers.is_armed(TimerTask::FadeTick));
        assert!(!r.timers.is_armed(TimerTask::ClockRefresh));
        assert!(r.engine.take_events().is_empty());
    }

    #[test]
    fn idle_timer_stays_quiet_until_natural_close() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();
        r.engine.start();
        assert_eq!(
            r.timers.period(TimerTask::IdleFire),
            Some(Duration::from_secs(60))
        );

        r.engine.on_timer(TimerTask::IdleFire, t0);
        assert_eq!(r.engine.state(), OverlayState::FadingIn);
        assert!(!r.engine.idle_armed());
        assert!(!r.timers.is_armed(TimerTask::IdleFire));

        // A tick that was already queued does not reopen anything.
        r.engine.on_timer(TimerTask::IdleFire, t0 + secs(60.0));
        assert_eq!(r.windows.created_count(), 1);

        fade_in(&mut r, t0);
        r.engine.on_timer(TimerTask::IdleFire, t0 + secs(120.0));
        assert_eq!(r.windows.created_count(), 1);
        assert!(!r.timers.is_armed(TimerTask::IdleFire));

        let t1 = t0 + secs(180.0);
        poke(&mut r, t1);
        r.engine.on_timer(TimerTask::FadeTick, t1 + secs(5.0));
        assert!(r.timers.is_armed(TimerTask::IdleFire));
        assert_eq!(r.timers.times_armed(TimerTask::IdleFire), 2);
    }

    #[test]
    fn failed_idle_open_retries_next_interval() {
        let mut r = rig(vec![], scenario_config());
        r.engine.start();
        r.engine.on_timer(TimerTask::IdleFire, Instant::now());
        assert_eq!(r.engine.state(), OverlayState::Hidden);
        assert!(r.engine.idle_armed());

        r.monitors.set(one_monitor());
        r.engine.on_timer(TimerTask::IdleFire, Instant::now());
        assert_eq!(r.engine.state(), OverlayState::FadingIn);
    }

    #[test]
    fn degraded_detector_still_opens() {
        let mut r = rig(one_monitor(), scenario_config());
        r.detector.fail_next_arm();
        let t0 = Instant::now();

        assert!(r.engine.show(t0).unwrap());
        assert_eq!(r.windows.live_count(), 1);
        assert!(!r.detector.armed());
        assert!(r
            .engine
            .take_events()
            .contains(&OverlayEvent::DetectorDegraded));

        // Reaching WaitingInput retries the arm.
        fade_in(&mut r, t0);
        assert!(r.detector.armed());
        assert_eq!(r.detector.arm_count(), 1);
    }

    #[test]
    fn preview_uses_candidate_and_resumes_on_natural_close() {
        let mut r = rig(one_monitor(), scenario_config());
        r.engine.start();
        let candidate = AppConfig {
            interval_minutes: 90,
            fade_seconds: 2,
            opacity_percent: 100,
            text: "unsaved preview".into(),
            ..AppConfig::default()
        };
        let t0 = Instant::now();

        r.engine.preview(candidate, t0).unwrap();
        assert!(!r.engine.idle_armed());
        let window = r.engine.session().unwrap().windows()[0];
        assert_eq!(r.windows.text(window).as_deref(), Some("unsaved preview"));
        assert_eq!(r.engine.session().unwrap().target_alpha(), 255);

        r.engine.on_timer(TimerTask::FadeTick, t0 + secs(2.0));
        assert_eq!(r.engine.state(), OverlayState::WaitingInput);
        poke(&mut r, t0 + secs(3.0));
        r.engine.on_timer(TimerTask::FadeTick, t0 + secs(5.0));

        assert_eq!(r.engine.state(), OverlayState::Hidden);
        // Saved interval, not the preview's.
        assert_eq!(
            r.timers.period(TimerTask::IdleFire),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn preview_while_visible_is_refused_and_changes_nothing() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();
        r.engine.show(t0).unwrap();
        r.engine.start();

        let res = r.engine.preview(AppConfig::default(), t0);
        assert!(matches!(res, Err(crate::error::Error::OverlayBusy)));
        assert!(r.engine.idle_armed());
        assert_eq!(r.windows.created_count(), 1);
    }

    #[test]
    fn failed_preview_restarts_scheduler() {
        let mut r = rig(vec![], scenario_config());
        r.engine.start();
        let res = r.engine.preview(AppConfig::default(), Instant::now());
        assert!(matches!(res, Err(crate::error::Error::NoMonitors)));
        assert!(r.engine.idle_armed());
    }

    #[test]
    fn reconfigure_rearms_only_when_hidden() {
        let mut r = rig(one_monitor(), scenario_config());
        r.engine.start();
        r.engine.reconfigure(AppConfig {
            interval_minutes: 20,
            ..scenario_config()
        });
        assert_eq!(
            r.timers.period(TimerTask::IdleFire),
            Some(Duration::from_secs(20 * 60))
        );

        let t0 = Instant::now();
        r.engine.show(t0).unwrap();
        r.engine.reconfigure(AppConfig {
            interval_minutes: 0,
            ..scenario_config()
        });
        assert!(!r.timers.is_armed(TimerTask::IdleFire));
        assert_eq!(r.engine.config().interval_minutes, 1);

        fade_in(&mut r, t0);
        poke(&mut r, t0 + secs(6.0));
        r.engine.on_timer(TimerTask::FadeTick, t0 + secs(11.0));
        assert_eq!(
            r.timers.period(TimerTask::IdleFire),
            Some(Duration::from_secs(60))
        );
    }

    #[test]
    fn clock_refresh_repaints_only_while_open() {
        let mut r = rig(two_monitors(), scenario_config());
        let t0 = Instant::now();
        r.engine.show(t0).unwrap();
        let window = r.engine.session().unwrap().windows()[1];
        let before = r.windows.invalidations(window);

        r.engine.on_timer(TimerTask::ClockRefresh, t0 + secs(1.0));
        assert_eq!(r.windows.invalidations(window), before + 1);

        r.engine.hide();
        r.engine.on_timer(TimerTask::ClockRefresh, t0 + secs(2.0));
        assert!(!r.timers.is_armed(TimerTask::ClockRefresh));
    }

    #[test]
    fn stale_activity_does_not_leak_into_next_cycle() {
        let mut r = rig(one_monitor(), scenario_config());
        let t0 = Instant::now();
        r.engine.show(t0).unwrap();
        fade_in(&mut r, t0);
        r.engine.gate().notify_input();
        // Forced close before the loop drained the notification.
        r.engine.hide();

        let t1 = t0 + secs(100.0);
        r.engine.show(t1).unwrap();
        fade_in(&mut r, t1);
        r.engine.on_activity(t1 + secs(6.0));
        assert_eq!(r.engine.state(), OverlayState::WaitingInput);
        assert_eq!(r.detector.disarm_count(), 1);
    }
}
