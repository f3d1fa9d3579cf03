// Window timers backing the engine's timer tasks. Each task maps to its own
// SetTimer id on the main window, and WM_TIMER routes back via
// `TimerTask::from_id`.

use crate::scheduler::{TimerHost, TimerTask};
use std::time::Duration;
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::WindowsAndMessaging::{KillTimer, SetTimer, USER_TIMER_MINIMUM};

pub struct WindowTimers {
    hwnd: isize,
}

impl WindowTimers {
    pub fn new(hwnd: HWND) -> Self {
        Self {
            hwnd: hwnd.0 as isize,
        }
    }

    fn hwnd(&self) -> HWND {
        HWND(self.hwnd as *mut std::ffi::c_void)
    }
}

impl TimerHost for WindowTimers {
    fn arm(&mut self, task: TimerTask, period: Duration) {
        let ms = period
            .as_millis()
            .clamp(u128::from(USER_TIMER_MINIMUM), u128::from(u32::MAX)) as u32;
        // Re-arming an existing id replaces its period.
        let id = unsafe { SetTimer(Some(self.hwnd()), task.id(), ms, None) };
        if id == 0 {
            tracing::error!(
                ?task,
                error = %windows::core::Error::from_win32(),
                "SetTimer failed"
            );
        }
    }

    fn disarm(&mut self, task: TimerTask) {
        unsafe {
            let _ = KillTimer(Some(self.hwnd()), task.id());
        }
    }
}
