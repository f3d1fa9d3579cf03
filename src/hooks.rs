// Low-level keyboard and mouse hooks feeding the activity gate.
//
// The hook procedures run synchronously in the system input pipeline on the
// installing thread's message pump. They do one atomic check through
// `ActivityGate::notify_input` and always pass the event on.

use crate::activity::{ActivityGate, InputDetector};
use crate::error::{Error, Result};
use std::sync::{Arc, OnceLock};
use windows::Win32::Foundation::{LPARAM, LRESULT, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, SetWindowsHookExW, UnhookWindowsHookEx, HC_ACTION, HHOOK, HOOKPROC,
    WH_KEYBOARD_LL, WH_MOUSE_LL, WINDOWS_HOOK_ID,
};

/// Gate the hook procedures report to. Bound on first arm.
static GATE: OnceLock<Arc<ActivityGate>> = OnceLock::new();

unsafe extern "system" fn input_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION as i32 {
        if let Some(gate) = GATE.get() {
            gate.notify_input();
        }
    }
    CallNextHookEx(None, code, wparam, lparam)
}

/// Unhooks on drop.
struct HookGuard {
    handle: HHOOK,
    hook_type: &'static str,
}

impl HookGuard {
    fn install(
        hook_id: WINDOWS_HOOK_ID,
        callback: HOOKPROC,
        hook_type: &'static str,
    ) -> windows::core::Result<Self> {
        let handle = unsafe { SetWindowsHookExW(hook_id, callback, None, 0)? };
        tracing::debug!(hook_type, "Hook installed");
        Ok(Self { handle, hook_type })
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        match unsafe { UnhookWindowsHookEx(self.handle) } {
            Ok(()) => tracing::debug!(hook_type = self.hook_type, "Hook removed"),
            Err(e) => tracing::error!(hook_type = self.hook_type, error = ?e, "Failed to unhook"),
        }
    }
}

/// `WH_KEYBOARD_LL` + `WH_MOUSE_LL`. Armed while at least one is installed.
#[derive(Default)]
pub struct LowLevelInputDetector {
    keyboard: Option<HookGuard>,
    mouse: Option<HookGuard>,
}

impl LowLevelInputDetector {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputDetector for LowLevelInputDetector {
    fn arm(&mut self, gate: &Arc<ActivityGate>) -> Result<()> {
        let bound = GATE.get_or_init(|| gate.clone());
        if !Arc::ptr_eq(bound, gate) {
            tracing::warn!("Input hooks already bound to another gate");
        }
        gate.reset_latch();
        if self.is_armed() {
            return Ok(());
        }

        let keyboard = HookGuard::install(WH_KEYBOARD_LL, Some(input_hook_proc), "keyboard_ll");
        let mouse = HookGuard::install(WH_MOUSE_LL, Some(input_hook_proc), "mouse_ll");

        match (keyboard, mouse) {
            (Err(kb), Err(ms)) => Err(Error::HookInstall(format!("keyboard: {kb}; mouse: {ms}"))),
            (keyboard, mouse) => {
                self.keyboard = keyboard
                    .map_err(|e| tracing::warn!(error = %e, "Keyboard hook unavailable"))
                    .ok();
                self.mouse = mouse
                    .map_err(|e| tracing::warn!(error = %e, "Mouse hook unavailable"))
                    .ok();
                Ok(())
            }
        }
    }

    fn disarm(&mut self, gate: &Arc<ActivityGate>) {
        self.keyboard = None;
        self.mouse = None;
        gate.reset_latch();
    }

    fn is_armed(&self) -> bool {
        self.keyboard.is_some() || self.mouse.is_some()
    }
}
