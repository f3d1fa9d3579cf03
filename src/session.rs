// Overlay session: the set of per-monitor windows for one display cycle.
//
// Windows are created together and destroyed together. `open` is a small
// transaction: if any window fails, every window from that attempt is
// destroyed before the error is returned.

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::fade::Fade;
use crate::monitor::MonitorRect;

/// Opaque platform window handle (an `HWND` value on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub isize);

/// Factory and operations for borderless, click-through, topmost,
/// non-activating overlay windows.
pub trait OverlayWindows {
    /// Creates a window covering `rect`, not yet shown, at alpha 0.
    fn create(&mut self, rect: &MonitorRect, config: &AppConfig) -> Result<WindowHandle>;
    /// Shows the window without taking focus.
    fn show(&mut self, window: WindowHandle);
    fn set_alpha(&mut self, window: WindowHandle, alpha: u8);
    fn invalidate(&mut self, window: WindowHandle);
    fn destroy(&mut self, window: WindowHandle);
}

pub struct OverlaySession {
    windows: Vec<WindowHandle>,
    config: AppConfig,
    target_alpha: u8,
    current_alpha: u8,
    fade: Option<Fade>,
}

impl OverlaySession {
    /// Creates and shows one window per rect at alpha 0.
    pub fn open(
        backend: &mut dyn OverlayWindows,
        rects: &[MonitorRect],
        config: AppConfig,
    ) -> Result<Self> {
        if rects.is_empty() {
            return Err(Error::NoMonitors);
        }

        let mut windows = Vec::with_capacity(rects.len());
        for (index, rect) in rects.iter().enumerate() {
            match backend.create(rect, &config) {
                Ok(window) => windows.push(window),
                Err(e) => {
                    let e = match e {
                        Error::WindowCreation { reason, .. } => {
                            Error::WindowCreation { index, reason }
                        }
                        other => other,
                    };
                    tracing::error!(index, error = %e, "Overlay window creation failed, rolling back");
                    for created in windows.drain(..) {
                        backend.destroy(created);
                    }
                    return Err(e);
                }
            }
        }

        for &window in &windows {
            backend.set_alpha(window, 0);
        }
        for &window in &windows {
            backend.show(window);
        }

        Ok(Self {
            windows,
            target_alpha: config.target_alpha(),
            config,
            current_alpha: 0,
            fade: None,
        })
    }

    /// Applies `alpha` to every window before returning.
    pub fn set_alpha_all(&mut self, backend: &mut dyn OverlayWindows, alpha: u8) {
        for &window in &self.windows {
            backend.set_alpha(window, alpha);
        }
        self.current_alpha = alpha;
    }

    pub fn invalidate_all(&self, backend: &mut dyn OverlayWindows) {
        for &window in &self.windows {
            backend.invalidate(window);
        }
    }

    /// Destroys every window.
    pub fn close(mut self, backend: &mut dyn OverlayWindows) {
        for window in self.windows.drain(..) {
            backend.destroy(window);
        }
    }

    pub fn windows(&self) -> &[WindowHandle] {
        &self.windows
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn target_alpha(&self) -> u8 {
        self.target_alpha
    }

    pub fn current_alpha(&self) -> u8 {
        self.current_alpha
    }

    pub fn fade(&self) -> Option<&Fade> {
        self.fade.as_ref()
    }

    pub(crate) fn set_fade(&mut self, fade: Option<Fade>) {
        self.fade = fade;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeWindows;

    fn two_monitors() -> Vec<MonitorRect> {
        vec![
            MonitorRect::new(0, 0, 1920, 1080),
            MonitorRect::new(1920, 0, 3840, 1080),
        ]
    }

    #[test]
    fn opens_one_window_per_monitor_at_zero_alpha() {
        let mut backend = FakeWindows::default();
        let session =
            OverlaySession::open(&mut backend, &two_monitors(), AppConfig::default()).unwrap();

        assert_eq!(session.windows().len(), 2);
        assert_eq!(backend.live_count(), 2);
        for &w in session.windows() {
            assert_eq!(backend.alpha(w), Some(0));
            assert!(backend.is_shown(w));
        }
        assert_eq!(backend.rect(session.windows()[1]).unwrap().left, 1920);
    }

    #[test]
    fn failure_on_second_window_rolls_back() {
        let mut backend = FakeWindows::default();
        backend.fail_on_create(1);

        let res = OverlaySession::open(&mut backend, &two_monitors(), AppConfig::default());

        assert!(matches!(res, Err(Error::WindowCreation { index: 1, .. })));
        assert_eq!(backend.live_count(), 0);
        assert_eq!(backend.destroyed_count(), 1);
    }

    #[test]
    fn empty_layout_is_an_error() {
        let mut backend = FakeWindows::default();
        let res = OverlaySession::open(&mut backend, &[], AppConfig::default());
        assert!(matches!(res, Err(Error::NoMonitors)));
        assert_eq!(backend.created_count(), 0);
    }

    #[test]
    fn alpha_and_invalidate_reach_every_window() {
        let mut backend = FakeWindows::default();
        let mut session =
            OverlaySession::open(&mut backend, &two_monitors(), AppConfig::default()).unwrap();

        session.set_alpha_all(&mut backend, 99);
        session.invalidate_all(&mut backend);

        assert_eq!(session.current_alpha(), 99);
        for &w in session.windows() {
            assert_eq!(backend.alpha(w), Some(99));
            assert_eq!(backend.invalidations(w), 1);
        }
    }

    #[test]
    fn close_destroys_all() {
        let mut backend = FakeWindows::default();
        let session =
            OverlaySession::open(&mut backend, &two_monitors(), AppConfig::default()).unwrap();
        session.close(&mut backend);
        assert_eq!(backend.live_count(), 0);
        assert_eq!(backend.destroyed_count(), 2);
    }
}
