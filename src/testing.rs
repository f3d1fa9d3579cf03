// In-memory stand-ins for the platform services, used by unit tests.
//
// Each fake is a cheap handle over shared state so a test can keep a clone
// after handing one to the engine.

use crate::activity::{ActivityGate, InputDetector};
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::monitor::{MonitorEnumerator, MonitorRect};
use crate::scheduler::{TimerHost, TimerTask};
use crate::session::{OverlayWindows, WindowHandle};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct FakeTimers {
    armed: Rc<RefCell<HashMap<TimerTask, Duration>>>,
    arm_log: Rc<RefCell<Vec<TimerTask>>>,
}

impl FakeTimers {
    pub fn is_armed(&self, task: TimerTask) -> bool {
        self.armed.borrow().contains_key(&task)
    }

    pub fn period(&self, task: TimerTask) -> Option<Duration> {
        self.armed.borrow().get(&task).copied()
    }

    pub fn times_armed(&self, task: TimerTask) -> usize {
        self.arm_log.borrow().iter().filter(|t| **t == task).count()
    }
}

impl TimerHost for FakeTimers {
    fn arm(&mut self, task: TimerTask, period: Duration) {
        self.armed.borrow_mut().insert(task, period);
        self.arm_log.borrow_mut().push(task);
    }

    fn disarm(&mut self, task: TimerTask) {
        self.armed.borrow_mut().remove(&task);
    }
}

#[derive(Debug, Default)]
struct FakeWindow {
    rect: MonitorRect,
    alpha: u8,
    shown: bool,
    invalidations: usize,
    text: String,
}

#[derive(Debug, Default)]
struct WindowsState {
    next_id: isize,
    attempts: usize,
    live: HashMap<WindowHandle, FakeWindow>,
    created: usize,
    destroyed: usize,
    fail_on: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeWindows {
    inner: Rc<RefCell<WindowsState>>,
}

impl FakeWindows {
    /// Makes the `n`th creation attempt (0-based, counted across the fake's
    /// lifetime) fail.
    pub fn fail_on_create(&self, n: usize) {
        self.inner.borrow_mut().fail_on = Some(n);
    }

    pub fn live_count(&self) -> usize {
        self.inner.borrow().live.len()
    }

    pub fn created_count(&self) -> usize {
        self.inner.borrow().created
    }

    pub fn destroyed_count(&self) -> usize {
        self.inner.borrow().destroyed
    }

    pub fn alpha(&self, window: WindowHandle) -> Option<u8> {
        self.inner.borrow().live.get(&window).map(|w| w.alpha)
    }

    pub fn is_shown(&self, window: WindowHandle) -> bool {
        self.inner
            .borrow()
            .live
            .get(&window)
            .is_some_and(|w| w.shown)
    }

    pub fn rect(&self, window: WindowHandle) -> Option<MonitorRect> {
        self.inner.borrow().live.get(&window).map(|w| w.rect)
    }

    pub fn text(&self, window: WindowHandle) -> Option<String> {
        self.inner.borrow().live.get(&window).map(|w| w.text.clone())
    }

    pub fn invalidations(&self, window: WindowHandle) -> usize {
        self.inner
            .borrow()
            .live
            .get(&window)
            .map_or(0, |w| w.invalidations)
    }

    /// Alpha of every live window, in creation order.
    pub fn alphas(&self) -> Vec<u8> {
        let state = self.inner.borrow();
        let mut entries: Vec<_> = state.live.iter().map(|(h, w)| (h.0, w.alpha)).collect();
        entries.sort_unstable();
        entries.into_iter().map(|(_, a)| a).collect()
    }
}

impl OverlayWindows for FakeWindows {
    fn create(&mut self, rect: &MonitorRect, config: &AppConfig) -> Result<WindowHandle> {
        let mut state = self.inner.borrow_mut();
        let attempt = state.attempts;
        state.attempts += 1;
        if state.fail_on == Some(attempt) {
            state.fail_on = None;
            return Err(Error::WindowCreation {
                index: attempt,
                reason: "injected failure".into(),
            });
        }
        state.created += 1;
        state.next_id += 1;
        let handle = WindowHandle(state.next_id);
        state.live.insert(
            handle,
            FakeWindow {
                rect: *rect,
                text: config.text.clone(),
                ..FakeWindow::default()
            },
        );
        Ok(handle)
    }

    fn show(&mut self, window: WindowHandle) {
        if let Some(w) = self.inner.borrow_mut().live.get_mut(&window) {
            w.shown = true;
        }
    }

    fn set_alpha(&mut self, window: WindowHandle, alpha: u8) {
        if let Some(w) = self.inner.borrow_mut().live.get_mut(&window) {
            w.alpha = alpha;
        }
    }

    fn invalidate(&mut self, window: WindowHandle) {
        if let Some(w) = self.inner.borrow_mut().live.get_mut(&window) {
            w.invalidations += 1;
        }
    }

    fn destroy(&mut self, window: WindowHandle) {
        let mut state = self.inner.borrow_mut();
        if state.live.remove(&window).is_some() {
            state.destroyed += 1;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeMonitors {
    rects: Rc<RefCell<Vec<MonitorRect>>>,
}

impl FakeMonitors {
    pub fn new(rects: Vec<MonitorRect>) -> Self {
        Self {
            rects: Rc::new(RefCell::new(rects)),
        }
    }

    pub fn set(&self, rects: Vec<MonitorRect>) {
        *self.rects.borrow_mut() = rects;
    }
}

impl MonitorEnumerator for FakeMonitors {
    fn list_monitor_rects(&self) -> Vec<MonitorRect> {
        self.rects.borrow().clone()
    }
}

#[derive(Debug, Default)]
struct DetectorState {
    armed: bool,
    arms: usize,
    disarms: usize,
    fail_next_arm: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeDetector {
    inner: Rc<RefCell<DetectorState>>,
}

impl FakeDetector {
    pub fn fail_next_arm(&self) {
        self.inner.borrow_mut().fail_next_arm = true;
    }

    pub fn armed(&self) -> bool {
        self.inner.borrow().armed
    }

    pub fn arm_count(&self) -> usize {
        self.inner.borrow().arms
    }

    pub fn disarm_count(&self) -> usize {
        self.inner.borrow().disarms
    }
}

impl InputDetector for FakeDetector {
    fn arm(&mut self, _gate: &Arc<ActivityGate>) -> Result<()> {
        let mut state = self.inner.borrow_mut();
        if std::mem::take(&mut state.fail_next_arm) {
            return Err(Error::HookInstall("injected failure".into()));
        }
        state.armed = true;
        state.arms += 1;
        Ok(())
    }

    fn disarm(&mut self, _gate: &Arc<ActivityGate>) {
        let mut state = self.inner.borrow_mut();
        if state.armed {
            state.disarms += 1;
        }
        state.armed = false;
    }

    fn is_armed(&self) -> bool {
        self.inner.borrow().armed
    }
}
