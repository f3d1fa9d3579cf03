// Win32 overlay windows and monitor enumeration.
//
// One layered, click-through, topmost, non-activating popup per monitor.
// Alpha goes through SetLayeredWindowAttributes so the whole window fades
// as a unit. Painting reads a per-window snapshot (color + message) kept in
// a thread-local map, never the engine, so a WM_PAINT dispatched while the
// engine is mid-update cannot observe it half-changed.

use crate::config::{AppConfig, Rgb};
use crate::error::{Error, Result};
use crate::monitor::{MonitorEnumerator, MonitorRect};
use crate::render::{self, Rect, CLOCK_POINT_SIZE, MESSAGE_POINT_SIZE};
use crate::session::{OverlayWindows, WindowHandle};
use std::cell::RefCell;
use std::collections::HashMap;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::HiDpi::GetDpiForWindow;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetClientRect, RegisterClassW,
    SetLayeredWindowAttributes, SetWindowPos, ShowWindow, CS_HREDRAW, CS_VREDRAW, HWND_TOPMOST,
    LWA_ALPHA, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_SHOWWINDOW, SW_SHOWNOACTIVATE,
    WM_ERASEBKGND, WM_PAINT, WNDCLASSW, WS_EX_LAYERED, WS_EX_NOACTIVATE, WS_EX_TOOLWINDOW,
    WS_EX_TOPMOST, WS_EX_TRANSPARENT, WS_POPUP,
};

const CLASS_NAME: PCWSTR = w!("EyeBreakOverlay");
const TEXT_COLOR: COLORREF = COLORREF(0x00FF_FFFF);

/// What a window paints, captured when the session opens.
struct PaintSnapshot {
    background: COLORREF,
    text: Vec<u16>,
}

thread_local! {
    static SNAPSHOTS: RefCell<HashMap<isize, PaintSnapshot>> = RefCell::new(HashMap::new());
}

pub(crate) fn colorref(c: Rgb) -> COLORREF {
    COLORREF(u32::from(c.r) | (u32::from(c.g) << 8) | (u32::from(c.b) << 16))
}

fn to_hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut std::ffi::c_void)
}

// ── Monitors ────────────────────────────────────────────────────────────────

/// `EnumDisplayMonitors` over the whole virtual screen.
#[derive(Debug, Default)]
pub struct Win32Monitors;

unsafe extern "system" fn monitor_enum_proc(
    hmonitor: HMONITOR,
    _hdc: HDC,
    _lprect: *mut RECT,
    lparam: LPARAM,
) -> windows::core::BOOL {
    let rects = &mut *(lparam.0 as *mut Vec<MonitorRect>);
    let mut mi = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    if GetMonitorInfoW(hmonitor, &mut mi).as_bool() {
        let r = mi.rcMonitor;
        rects.push(MonitorRect::new(r.left, r.top, r.right, r.bottom));
    }
    windows::core::BOOL::from(true)
}

impl MonitorEnumerator for Win32Monitors {
    fn list_monitor_rects(&self) -> Vec<MonitorRect> {
        let mut rects: Vec<MonitorRect> = Vec::new();
        unsafe {
            let _ = EnumDisplayMonitors(
                None,
                None,
                Some(monitor_enum_proc),
                LPARAM(&mut rects as *mut Vec<MonitorRect> as isize),
            );
        }
        tracing::debug!(count = rects.len(), "Enumerated monitors");
        rects
    }
}

// ── Windows ─────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct Win32OverlayWindows {
    class_registered: bool,
}

impl Win32OverlayWindows {
    pub fn new() -> Self {
        Self::default()
    }

    fn register_class(&mut self) -> Result<()> {
        if self.class_registered {
            return Ok(());
        }
        unsafe {
            let hinstance = GetModuleHandleW(PCWSTR::null()).unwrap_or_default();
            let wc = WNDCLASSW {
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(window_proc),
                hInstance: hinstance.into(),
                lpszClassName: CLASS_NAME,
                ..Default::default()
            };
            if RegisterClassW(&wc) == 0 {
                return Err(Error::WindowCreation {
                    index: 0,
                    reason: windows::core::Error::from_win32().to_string(),
                });
            }
        }
        self.class_registered = true;
        Ok(())
    }
}

impl OverlayWindows for Win32OverlayWindows {
    fn create(&mut self, rect: &MonitorRect, config: &AppConfig) -> Result<WindowHandle> {
        self.register_class()?;

        let hwnd = unsafe {
            let hinstance = GetModuleHandleW(PCWSTR::null()).unwrap_or_default();
            CreateWindowExW(
                WS_EX_LAYERED
                    | WS_EX_TRANSPARENT
                    | WS_EX_TOOLWINDOW
                    | WS_EX_NOACTIVATE
                    | WS_EX_TOPMOST,
                CLASS_NAME,
                PCWSTR::null(),
                WS_POPUP,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                None,
                None,
                Some(hinstance.into()),
                None,
            )
        }
        .map_err(|e| Error::WindowCreation {
            index: 0,
            reason: e.to_string(),
        })?;

        unsafe {
            let _ = SetLayeredWindowAttributes(hwnd, COLORREF(0), 0, LWA_ALPHA);
        }

        let handle = WindowHandle(hwnd.0 as isize);
        SNAPSHOTS.with(|s| {
            s.borrow_mut().insert(
                handle.0,
                PaintSnapshot {
                    background: colorref(config.background_color),
                    text: config.text.encode_utf16().collect(),
                },
            )
        });
        Ok(handle)
    }

    fn show(&mut self, window: WindowHandle) {
        let hwnd = to_hwnd(window);
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
            let _ = SetWindowPos(
                hwnd,
                Some(HWND_TOPMOST),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE | SWP_SHOWWINDOW,
            );
        }
    }

    fn set_alpha(&mut self, window: WindowHandle, alpha: u8) {
        unsafe {
            let _ = SetLayeredWindowAttributes(to_hwnd(window), COLORREF(0), alpha, LWA_ALPHA);
        }
    }

    fn invalidate(&mut self, window: WindowHandle) {
        unsafe {
            let _ = InvalidateRect(Some(to_hwnd(window)), None, false);
        }
    }

    fn destroy(&mut self, window: WindowHandle) {
        SNAPSHOTS.with(|s| s.borrow_mut().remove(&window.0));
        unsafe {
            if let Err(e) = DestroyWindow(to_hwnd(window)) {
                tracing::warn!(hwnd = window.0, error = %e, "DestroyWindow failed");
            }
        }
    }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            paint(hwnd);
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Painting ────────────────────────────────────────────────────────────────

fn create_font(height: i32, weight: i32) -> HFONT {
    let face: Vec<u16> = "Segoe UI".encode_utf16().chain(std::iter::once(0)).collect();
    unsafe {
        let mut lf = LOGFONTW {
            lfHeight: height,
            lfWeight: weight,
            lfQuality: CLEARTYPE_QUALITY,
            lfCharSet: DEFAULT_CHARSET,
            ..Default::default()
        };
        let len = face.len().min(32);
        lf.lfFaceName[..len].copy_from_slice(&face[..len]);
        CreateFontIndirectW(&lf)
    }
}

fn measure(hdc: HDC, text: &mut [u16], font: HFONT, width: i32, format: DRAW_TEXT_FORMAT) -> i32 {
    unsafe {
        let old_font = SelectObject(hdc, HGDIOBJ::from(font));
        let mut r = RECT {
            left: 0,
            top: 0,
            right: width,
            bottom: 0,
        };
        DrawTextW(hdc, text, &mut r, format | DT_CALCRECT);
        SelectObject(hdc, old_font);
        r.bottom - r.top
    }
}

fn draw_text(hdc: HDC, text: &mut [u16], font: HFONT, r: &Rect, format: DRAW_TEXT_FORMAT) {
    unsafe {
        let old_font = SelectObject(hdc, HGDIOBJ::from(font));
        let mut rc = RECT {
            left: r.left,
            top: r.top,
            right: r.right,
            bottom: r.bottom,
        };
        DrawTextW(hdc, text, &mut rc, format);
        SelectObject(hdc, old_font);
    }
}

fn fill(hdc: HDC, r: &RECT, color: COLORREF) {
    unsafe {
        let brush = CreateSolidBrush(color);
        FillRect(hdc, r, brush);
        let _ = DeleteObject(HGDIOBJ::from(brush));
    }
}

fn draw_overlay(hdc: HDC, client: &RECT, dpi: u32, snapshot: &PaintSnapshot) {
    fill(hdc, client, snapshot.background);
    unsafe {
        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, TEXT_COLOR);
    }

    let clock_font = create_font(render::font_height(CLOCK_POINT_SIZE, dpi), FW_SEMIBOLD.0 as i32);
    let message_font = create_font(render::font_height(MESSAGE_POINT_SIZE, dpi), FW_NORMAL.0 as i32);

    let bounds = Rect::new(client.left, client.top, client.right, client.bottom);
    let width = render::available_width(&bounds, dpi);

    let mut clock: Vec<u16> = render::local_clock_text().encode_utf16().collect();
    let clock_h = measure(hdc, &mut clock, clock_font, width, DT_SINGLELINE | DT_NOPREFIX);

    let mut message = snapshot.text.clone();
    let message_h = (!message.is_empty())
        .then(|| measure(hdc, &mut message, message_font, width, DT_WORDBREAK | DT_NOPREFIX));

    let layout = render::layout(&bounds, dpi, clock_h, message_h);
    draw_text(
        hdc,
        &mut clock,
        clock_font,
        &layout.clock,
        DT_CENTER | DT_SINGLELINE | DT_NOPREFIX,
    );
    if let Some(r) = layout.message {
        draw_text(
            hdc,
            &mut message,
            message_font,
            &r,
            DT_CENTER | DT_WORDBREAK | DT_NOPREFIX,
        );
    }

    unsafe {
        let _ = DeleteObject(HGDIOBJ::from(clock_font));
        let _ = DeleteObject(HGDIOBJ::from(message_font));
    }
}

unsafe fn paint(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    let hdc = BeginPaint(hwnd, &mut ps);

    // Double-buffer to avoid flicker
    let mut client = RECT::default();
    let _ = GetClientRect(hwnd, &mut client);
    let dpi = match GetDpiForWindow(hwnd) {
        0 => render::BASE_DPI,
        dpi => dpi,
    };

    let mem_dc = CreateCompatibleDC(Some(hdc));
    let mem_bmp = CreateCompatibleBitmap(hdc, client.right, client.bottom);
    let old_bmp = SelectObject(mem_dc, HGDIOBJ::from(mem_bmp));

    SNAPSHOTS.with(|s| match s.borrow().get(&(hwnd.0 as isize)) {
        Some(snapshot) => draw_overlay(mem_dc, &client, dpi, snapshot),
        None => fill(mem_dc, &client, COLORREF(0)),
    });

    let _ = BitBlt(
        hdc,
        0,
        0,
        client.right,
        client.bottom,
        Some(mem_dc),
        0,
        0,
        SRCCOPY,
    );

    SelectObject(mem_dc, old_bmp);
    let _ = DeleteObject(HGDIOBJ::from(mem_bmp));
    let _ = DeleteDC(mem_dc);
    let _ = EndPaint(hwnd, &ps);
}
