// Win32 application shell.
//
// A hidden top-level window owns the tray icon, the engine's timers and the
// activity wake-up message. The engine lives in a thread-local on the UI
// thread; every entry from the window procedure goes through `with_app`,
// which refuses re-entrant access instead of panicking (modal loops such as
// MessageBoxW keep dispatching WM_TIMER).

use crate::activity::ActivityGate;
use crate::autostart;
use crate::config::{self, AppConfig};
use crate::engine::{CloseReason, OverlayEngine, OverlayEvent, Services};
use crate::error::{Error, Result};
use crate::hooks::LowLevelInputDetector;
use crate::overlay::{Win32Monitors, Win32OverlayWindows};
use crate::scheduler::TimerTask;
use crate::timers::WindowTimers;
use crate::tray;
use crate::ui;
use std::cell::RefCell;
use std::path::PathBuf;
use std::time::Instant;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::{CreateMutexW, OpenMutexW, SYNCHRONIZATION_ACCESS_RIGHTS};
use windows::Win32::UI::Shell::ShellExecuteW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetMessageW, MessageBoxW,
    PostMessageW, PostQuitMessage, RegisterClassW, TranslateMessage, MB_ICONWARNING, MB_OK, MSG,
    SW_SHOWNORMAL, WINDOW_EX_STYLE, WM_APP, WM_COMMAND, WM_DESTROY, WM_LBUTTONDBLCLK,
    WM_RBUTTONUP, WM_TIMER, WNDCLASSW, WS_OVERLAPPED,
};

const SINGLE_INSTANCE_MUTEX: &str = "EyeBreakMutex\0";
const CLASS_NAME: PCWSTR = w!("EyeBreakMain");

/// Posted by the activity gate's waker so the loop drains the channel.
pub const WM_APP_ACTIVITY: u32 = WM_APP + 2;

struct App {
    hwnd: HWND,
    engine: OverlayEngine,
    config_path: PathBuf,
}

thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn with_app<R>(f: impl FnOnce(&mut App) -> R) -> Option<R> {
    APP.with(|cell| match cell.try_borrow_mut() {
        Ok(mut app) => app.as_mut().map(f),
        Err(_) => {
            tracing::debug!("Engine busy, dropping re-entrant message");
            None
        }
    })
}

/// Runs until Exit is chosen from the tray.
pub fn run() -> Result<()> {
    if is_already_running() {
        tracing::info!("Another instance is already running");
        return Ok(());
    }

    let config_path = config::config_path();
    let config = config::load_config(&config_path);
    if let Err(e) = config::ensure_config_file(&config_path, &config) {
        tracing::warn!(error = %e, "Could not write default config");
    }
    if let Err(e) = autostart::apply(config.auto_start) {
        tracing::warn!(error = %e, "Could not sync autostart");
    }

    let hwnd = create_main_window()?;
    let engine = build_engine(hwnd, config);

    APP.with(|cell| {
        *cell.borrow_mut() = Some(App {
            hwnd,
            engine,
            config_path,
        })
    });
    with_app(|app| {
        app.engine.start();
        tracing::info!(
            interval_minutes = app.engine.config().interval_minutes,
            "EyeBreak running"
        );
    });

    if !tray::add_tray_icon(hwnd) {
        tracing::warn!("Could not add tray icon");
    }

    // Win32 message loop
    unsafe {
        let mut msg = MSG::default();
        while GetMessageW(&mut msg, None, 0, 0).as_bool() {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    // Exit normally tears everything down already; this covers WM_QUIT from
    // elsewhere.
    if let Some(mut app) = APP.with(|cell| cell.borrow_mut().take()) {
        app.engine.stop();
        app.engine.hide();
        tray::remove_tray_icon(app.hwnd);
    }
    Ok(())
}

fn build_engine(hwnd: HWND, config: AppConfig) -> OverlayEngine {
    let raw = hwnd.0 as isize;
    let (gate, activity) = ActivityGate::channel();
    let gate = gate.with_waker(move || unsafe {
        let _ = PostMessageW(
            Some(HWND(raw as *mut std::ffi::c_void)),
            WM_APP_ACTIVITY,
            WPARAM(0),
            LPARAM(0),
        );
    });
    let services = Services {
        monitors: Box::new(Win32Monitors),
        windows: Box::new(Win32OverlayWindows::new()),
        detector: Box::new(LowLevelInputDetector::new()),
        timers: Box::new(WindowTimers::new(hwnd)),
    };
    OverlayEngine::new(services, config, gate, activity)
}

fn create_main_window() -> Result<HWND> {
    unsafe {
        let hinstance = GetModuleHandleW(PCWSTR::null())?;
        let wc = WNDCLASSW {
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance.into(),
            lpszClassName: CLASS_NAME,
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            return Err(windows::core::Error::from_win32().into());
        }
        // Never shown; exists to receive timer, tray and wake-up messages.
        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            CLASS_NAME,
            w!("EyeBreak"),
            WS_OVERLAPPED,
            0,
            0,
            0,
            0,
            None,
            None,
            Some(hinstance.into()),
            None,
        )?;
        Ok(hwnd)
    }
}

/// Check if another instance is already running
fn is_already_running() -> bool {
    let name: Vec<u16> = SINGLE_INSTANCE_MUTEX.encode_utf16().collect();

    unsafe {
        let existing = OpenMutexW(
            SYNCHRONIZATION_ACCESS_RIGHTS(0x001F0001), // MUTEX_ALL_ACCESS
            false,
            PCWSTR(name.as_ptr()),
        );
        if existing.is_ok() {
            return true;
        }

        // Held (and leaked) for the life of the process
        let _ = CreateMutexW(None, true, PCWSTR(name.as_ptr()));
        false
    }
}

unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_TIMER => {
            if let Some(task) = TimerTask::from_id(wparam.0) {
                with_app(|app| {
                    app.engine.on_timer(task, Instant::now());
                    app.report_events();
                });
            }
            LRESULT(0)
        }
        WM_APP_ACTIVITY => {
            with_app(|app| {
                app.engine.on_activity(Instant::now());
                app.report_events();
            });
            LRESULT(0)
        }
        tray::WM_TRAY_ICON => {
            match lparam.0 as u32 {
                WM_RBUTTONUP => {
                    // Menu runs a modal loop; query state first, then release the engine.
                    let visible = with_app(|app| app.engine.is_visible()).unwrap_or(false);
                    tray::show_context_menu(hwnd, visible);
                }
                WM_LBUTTONDBLCLK => open_settings_window(hwnd),
                _ => {}
            }
            LRESULT(0)
        }
        WM_COMMAND => {
            match (wparam.0 & 0xFFFF) as u32 {
                tray::IDM_SETTINGS => open_settings_window(hwnd),
                tray::IDM_PREVIEW => preview(hwnd),
                tray::IDM_DISMISS => {
                    with_app(|app| {
                        app.engine.hide_and_resume();
                        app.report_events();
                    });
                }
                tray::IDM_OPEN_SETTINGS => open_settings(hwnd),
                tray::IDM_RELOAD => reload(hwnd),
                tray::IDM_EXIT => exit(hwnd),
                _ => {}
            }
            LRESULT(0)
        }
        WM_DESTROY => {
            PostQuitMessage(0);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

impl App {
    fn report_events(&mut self) {
        for event in self.engine.take_events() {
            match event {
                OverlayEvent::Opened { windows } => {
                    tracing::debug!(windows, "Break started");
                    tray::set_tooltip(self.hwnd, "EyeBreak (break in progress)");
                }
                OverlayEvent::Closed(reason) => {
                    tracing::debug!(natural = reason == CloseReason::Natural, "Break ended");
                    tray::set_tooltip(self.hwnd, tray::TOOLTIP);
                }
                OverlayEvent::DetectorDegraded => {
                    tray::set_tooltip(self.hwnd, "EyeBreak (close the break from this menu)");
                }
            }
        }
    }

    fn settings_from_file(&self) -> Result<AppConfig> {
        config::read_config(&self.config_path)?.validated()
    }

    /// Persists `config` and makes it the running configuration. The idle
    /// timer restarts with the new interval unless a break is showing.
    fn save(&mut self, config: AppConfig) -> Result<()> {
        config::write_config(&self.config_path, &config)?;
        if let Err(e) = autostart::apply(config.auto_start) {
            tracing::warn!(error = %e, "Could not update autostart");
        }
        self.engine.reconfigure(config);
        tracing::info!(
            interval_minutes = self.engine.config().interval_minutes,
            "Settings saved"
        );
        Ok(())
    }
}

pub(crate) fn warn_box(hwnd: HWND, text: &str) {
    let text: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
    unsafe {
        MessageBoxW(
            Some(hwnd),
            PCWSTR(text.as_ptr()),
            w!("EyeBreak"),
            MB_OK | MB_ICONWARNING,
        );
    }
}

fn start_preview(hwnd: HWND, pick: impl FnOnce(&App) -> Result<AppConfig>) {
    let outcome = with_app(|app| {
        let result = pick(app).and_then(|cfg| app.engine.preview(cfg, Instant::now()));
        app.report_events();
        result
    });
    // The box is modal, so it runs with the engine released
    match outcome {
        Some(Err(Error::OverlayBusy)) => {
            warn_box(hwnd, "Cannot preview while a break is showing.");
        }
        Some(Err(e)) => warn_box(hwnd, &format!("Cannot preview: {e}")),
        _ => {}
    }
}

/// Shows the settings file's current contents without applying them.
fn preview(hwnd: HWND) {
    start_preview(hwnd, App::settings_from_file);
}

/// Shows unsaved values from the settings window.
pub(crate) fn preview_settings(owner: HWND, config: AppConfig) {
    start_preview(owner, move |_| Ok(config));
}

pub(crate) fn save_settings(config: AppConfig) -> Result<()> {
    with_app(|app| app.save(config)).unwrap_or_else(|| {
        Err(Error::Validation(
            "EyeBreak is busy, try again in a moment.".into(),
        ))
    })
}

fn open_settings_window(hwnd: HWND) {
    let Some(mut config) = with_app(|app| app.engine.config().clone()) else {
        return;
    };
    // The registry is the source of truth for the toggle
    config.auto_start = autostart::is_enabled();
    if let Err(e) = ui::show_settings(hwnd, &config) {
        tracing::error!(error = %e, "Could not open settings window");
        warn_box(hwnd, &format!("Cannot open settings: {e}"));
    }
}

fn reload(hwnd: HWND) {
    let outcome = with_app(|app| {
        let cfg = app.settings_from_file()?;
        if let Err(e) = autostart::apply(cfg.auto_start) {
            tracing::warn!(error = %e, "Could not update autostart");
        }
        app.engine.reconfigure(cfg);
        tracing::info!(
            interval_minutes = app.engine.config().interval_minutes,
            "Settings reloaded"
        );
        Ok::<_, crate::error::Error>(())
    });
    if let Some(Err(e)) = outcome {
        warn_box(hwnd, &format!("Settings not applied: {e}"));
    }
}

fn open_settings(hwnd: HWND) {
    let Some(path) = with_app(|app| app.config_path.clone()) else {
        return;
    };
    let wide: Vec<u16> = path
        .as_os_str()
        .to_string_lossy()
        .encode_utf16()
        .chain(std::iter::once(0))
        .collect();
    let result = unsafe {
        ShellExecuteW(
            Some(hwnd),
            w!("open"),
            PCWSTR(wide.as_ptr()),
            PCWSTR::null(),
            PCWSTR::null(),
            SW_SHOWNORMAL,
        )
    };
    // Values above 32 mean success
    if result.0 as isize <= 32 {
        tracing::warn!(path = %path.display(), "Could not open settings file");
    }
}

fn exit(hwnd: HWND) {
    if let Some(mut app) = APP.with(|cell| cell.try_borrow_mut().ok().and_then(|mut a| a.take())) {
        app.engine.stop();
        app.engine.hide();
        tray::remove_tray_icon(app.hwnd);
        tracing::info!("Exiting");
    }
    unsafe {
        let _ = DestroyWindow(hwnd);
    }
}
