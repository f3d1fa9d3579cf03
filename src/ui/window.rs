// Settings window: owner-drawn cards around native edit controls.

use super::controls::*;
use super::form::{self, SettingsForm};
use super::painting;
use super::theme::*;
use crate::config::{AppConfig, Rgb};
use crate::error::Result;
use crate::render::Rect;
use std::cell::RefCell;
use std::ffi::c_void;
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Gdi::*;
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::Dialogs::{ChooseColorW, CC_FULLOPEN, CC_RGBINIT, CHOOSECOLORW};
use windows::Win32::UI::Input::KeyboardAndMouse::{ReleaseCapture, SetCapture};
use windows::Win32::UI::WindowsAndMessaging::*;

const CLASS_NAME: PCWSTR = w!("EyeBreakSettings");
const TOAST_TIMER_ID: usize = 100;

// Child control ids
const ID_INTERVAL: u16 = 201;
const ID_FADE: u16 = 202;
const ID_OPACITY: u16 = 203;
const ID_COLOR: u16 = 204;
const ID_TEXT: u16 = 205;

// Edit control styles and messages
const EDIT_NUMBER: u32 = 0x2000;
const EDIT_MULTILINE: u32 = 0x0004;
const EDIT_AUTOVSCROLL: u32 = 0x0040;
const EDIT_WANTRETURN: u32 = 0x1000;
const EDIT_SETLIMITTEXT: u32 = 0x00C5;
const EDIT_CHANGE: u32 = 0x0300;

#[derive(Clone, Copy)]
struct Edits {
    interval: isize,
    fade: isize,
    opacity: isize,
    color: isize,
    text: isize,
}

struct SettingsWindow {
    hwnd: isize,
    ui: UiState,
    edits: Edits,
    edit_font: HFONT,
    edit_brush: HBRUSH,
    custom_colors: [COLORREF; 16],
}

thread_local! {
    static SETTINGS: RefCell<Option<SettingsWindow>> = const { RefCell::new(None) };
}

fn with_settings<R>(f: impl FnOnce(&mut SettingsWindow) -> R) -> Option<R> {
    SETTINGS.with(|cell| match cell.try_borrow_mut() {
        Ok(mut state) => state.as_mut().map(f),
        Err(_) => None,
    })
}

fn hwnd_of(raw: isize) -> HWND {
    HWND(raw as *mut c_void)
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn get_text(edit: isize) -> String {
    unsafe {
        let hwnd = hwnd_of(edit);
        let len = GetWindowTextLengthW(hwnd).max(0) as usize;
        let mut buf = vec![0u16; len + 1];
        let copied = GetWindowTextW(hwnd, &mut buf).max(0) as usize;
        String::from_utf16_lossy(&buf[..copied.min(len)])
    }
}

// Fires EN_CHANGE back into `wnd_proc`; never call with SETTINGS borrowed.
fn set_text(edit: isize, text: &str) {
    let text = wide(text);
    unsafe {
        let _ = SetWindowTextW(hwnd_of(edit), PCWSTR(text.as_ptr()));
    }
}

/// Opens the settings window with `config` in its fields. A window that is
/// already on screen is only brought to the front so unsaved edits survive.
pub fn show_settings(owner: HWND, config: &AppConfig) -> Result<()> {
    let existing = with_settings(|s| s.hwnd);
    let hwnd = match existing {
        Some(raw) => hwnd_of(raw),
        None => create_window(owner)?,
    };

    let visible = unsafe { IsWindowVisible(hwnd).as_bool() };
    if !visible {
        fill(&SettingsForm::from_config(config));
    }
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
    }
    Ok(())
}

fn hide_window(hwnd: HWND) {
    unsafe {
        let _ = ShowWindow(hwnd, SW_HIDE);
    }
}

fn invalidate(hwnd: HWND) {
    unsafe {
        let _ = InvalidateRect(Some(hwnd), None, true);
    }
}

fn show_toast(hwnd: HWND, message: &str) {
    with_settings(|s| {
        s.ui.toast_message = message.to_string();
        s.ui.toast_visible = true;
    });
    invalidate(hwnd);
    unsafe {
        SetTimer(Some(hwnd), TOAST_TIMER_ID, 2000, None);
    }
}

fn create_window(owner: HWND) -> Result<HWND> {
    unsafe {
        let hinstance: HINSTANCE = GetModuleHandleW(PCWSTR::null())?.into();

        let wc = WNDCLASSW {
            style: CS_HREDRAW | CS_VREDRAW,
            lpfnWndProc: Some(wnd_proc),
            hInstance: hinstance,
            lpszClassName: CLASS_NAME,
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            hIcon: LoadIconW(None, IDI_APPLICATION).unwrap_or_default(),
            ..Default::default()
        };
        if RegisterClassW(&wc) == 0 {
            tracing::debug!("Settings class already registered");
        }

        // Calculate window size to get desired client area
        let mut wr = RECT {
            left: 0,
            top: 0,
            right: WINDOW_WIDTH,
            bottom: WINDOW_HEIGHT,
        };
        let style = WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU | WS_MINIMIZEBOX;
        let _ = AdjustWindowRectEx(&mut wr, style, false, WINDOW_EX_STYLE::default());

        let hwnd = CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            CLASS_NAME,
            w!("EyeBreak Settings"),
            style,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            wr.right - wr.left,
            wr.bottom - wr.top,
            Some(owner),
            None,
            Some(hinstance),
            None,
        )?;

        let edit_font = painting::create_edit_font();
        let number = |id, row| {
            let r = Rect::new(
                INNER_RIGHT - NUMBER_EDIT_WIDTH,
                row,
                INNER_RIGHT,
                row + EDIT_HEIGHT,
            );
            create_edit(hwnd, hinstance, id, EDIT_NUMBER, r, edit_font)
        };
        let interval = number(ID_INTERVAL, ROW_INTERVAL)?;
        let fade = number(ID_FADE, ROW_FADE)?;
        let opacity = number(ID_OPACITY, ROW_OPACITY)?;

        let color_left = INNER_RIGHT - PICK_BUTTON_WIDTH - 8 - COLOR_EDIT_WIDTH;
        let color = create_edit(
            hwnd,
            hinstance,
            ID_COLOR,
            0,
            Rect::new(
                color_left,
                ROW_COLOR,
                color_left + COLOR_EDIT_WIDTH,
                ROW_COLOR + EDIT_HEIGHT,
            ),
            edit_font,
        )?;
        let text = create_edit(
            hwnd,
            hinstance,
            ID_TEXT,
            EDIT_MULTILINE | EDIT_AUTOVSCROLL | EDIT_WANTRETURN | WS_VSCROLL.0,
            Rect::new(INNER_X, TEXT_TOP, INNER_RIGHT, TEXT_TOP + TEXT_HEIGHT),
            edit_font,
        )?;

        for (edit, limit) in [
            (interval, form::INTERVAL_MAX_CHARS),
            (fade, form::FADE_MAX_CHARS),
            (opacity, form::OPACITY_MAX_CHARS),
            (color, form::COLOR_MAX_CHARS),
            (text, form::TEXT_MAX_CHARS),
        ] {
            SendMessageW(
                edit,
                EDIT_SETLIMITTEXT,
                Some(WPARAM(limit as usize)),
                None,
            );
        }

        let state = SettingsWindow {
            hwnd: hwnd.0 as isize,
            ui: UiState::new(),
            edits: Edits {
                interval: interval.0 as isize,
                fade: fade.0 as isize,
                opacity: opacity.0 as isize,
                color: color.0 as isize,
                text: text.0 as isize,
            },
            edit_font,
            edit_brush: CreateSolidBrush(CLR_INPUT),
            custom_colors: [COLORREF(0x00FFFFFF); 16],
        };
        SETTINGS.with(|cell| *cell.borrow_mut() = Some(state));
        tracing::debug!("Settings window created");
        Ok(hwnd)
    }
}

unsafe fn create_edit(
    parent: HWND,
    hinstance: HINSTANCE,
    id: u16,
    style: u32,
    r: Rect,
    font: HFONT,
) -> Result<HWND> {
    let edit = CreateWindowExW(
        WINDOW_EX_STYLE::default(),
        w!("EDIT"),
        PCWSTR::null(),
        WS_CHILD | WS_VISIBLE | WS_TABSTOP | WS_BORDER | WINDOW_STYLE(style),
        r.left,
        r.top,
        r.width(),
        r.height(),
        Some(parent),
        Some(HMENU(id as usize as *mut c_void)),
        Some(hinstance),
        None,
    )?;
    SendMessageW(
        edit,
        WM_SETFONT,
        Some(WPARAM(font.0 as usize)),
        Some(LPARAM(1)),
    );
    Ok(edit)
}

/// Loads `form` into the controls.
fn fill(form: &SettingsForm) {
    let Some(edits) = with_settings(|s| s.edits) else {
        return;
    };
    set_text(edits.interval, &form.interval);
    set_text(edits.fade, &form.fade);
    set_text(edits.opacity, &form.opacity);
    set_text(edits.color, &form.color);
    set_text(edits.text, &form.text);

    let hwnd = with_settings(|s| {
        s.ui.slider.value = form::opacity_from_edit(&form.opacity);
        s.ui.autostart_toggle.checked = form.auto_start;
        s.ui.swatch = Rgb::parse_hex(&form.color);
        s.ui.char_count = form::char_count_label(&form.text);
        s.ui.toast_visible = false;
        hwnd_of(s.hwnd)
    });
    if let Some(hwnd) = hwnd {
        invalidate(hwnd);
    }
}

/// Reads the controls back into a form.
fn read_form() -> Option<SettingsForm> {
    let (edits, auto_start) = with_settings(|s| (s.edits, s.ui.autostart_toggle.checked))?;
    Some(SettingsForm {
        interval: get_text(edits.interval),
        fade: get_text(edits.fade),
        opacity: get_text(edits.opacity),
        color: get_text(edits.color),
        text: get_text(edits.text),
        auto_start,
    })
}

fn on_edit_change(hwnd: HWND, id: u16, edit: isize) {
    let text = get_text(edit);
    let changed = with_settings(|s| match id {
        ID_OPACITY => {
            s.ui.slider.value = form::opacity_from_edit(&text);
            true
        }
        ID_COLOR => {
            s.ui.swatch = Rgb::parse_hex(&text);
            true
        }
        ID_TEXT => {
            s.ui.char_count = form::char_count_label(&text);
            true
        }
        _ => false,
    });
    if changed == Some(true) {
        invalidate(hwnd);
    }
}

fn pick_color(hwnd: HWND) {
    let Some((edit, current, mut custom)) =
        with_settings(|s| (s.edits.color, s.ui.swatch, s.custom_colors))
    else {
        return;
    };
    let mut cc = CHOOSECOLORW {
        lStructSize: std::mem::size_of::<CHOOSECOLORW>() as u32,
        hwndOwner: hwnd,
        rgbResult: current.map(crate::overlay::colorref).unwrap_or_default(),
        lpCustColors: custom.as_mut_ptr(),
        Flags: CC_FULLOPEN | CC_RGBINIT,
        ..Default::default()
    };
    // Modal; the dialog runs its own message loop
    if unsafe { ChooseColorW(&mut cc) }.as_bool() {
        with_settings(|s| s.custom_colors = custom);
        let c = cc.rgbResult.0;
        let picked = Rgb::new(c as u8, (c >> 8) as u8, (c >> 16) as u8);
        set_text(edit, &picked.to_hex());
    }
}

fn preview(hwnd: HWND) {
    let Some(form) = read_form() else {
        return;
    };
    match form.candidate() {
        Ok(config) => crate::app::preview_settings(hwnd, config),
        Err(e) => crate::app::warn_box(hwnd, &e.to_string()),
    }
}

fn save(hwnd: HWND) {
    let Some(form) = read_form() else {
        return;
    };
    let outcome = form.candidate().and_then(crate::app::save_settings);
    match outcome {
        Ok(()) => show_toast(hwnd, "Settings saved"),
        Err(e) => crate::app::warn_box(hwnd, &format!("Settings not saved: {e}")),
    }
}

enum Click {
    Slider { edit: isize, value: i64 },
    Toggle,
    PickColor,
    Preview,
    Save,
}

fn hit_test(s: &mut SettingsWindow, x: i32, y: i32) -> Option<Click> {
    let ui = &mut s.ui;
    if point_in_rect(x, y, &ui.slider.thumb_rect) {
        ui.slider.dragging = true;
        ui.slider.value = ui.slider.value_from_x(x);
        return Some(Click::Slider {
            edit: s.edits.opacity,
            value: ui.slider.value,
        });
    }
    if point_in_rect(x, y, &ui.autostart_toggle.rect) {
        ui.autostart_toggle.checked = !ui.autostart_toggle.checked;
        return Some(Click::Toggle);
    }
    if point_in_rect(x, y, &ui.pick_color_btn.rect) {
        return Some(Click::PickColor);
    }
    if point_in_rect(x, y, &ui.preview_btn.rect) {
        return Some(Click::Preview);
    }
    if point_in_rect(x, y, &ui.save_btn.rect) {
        return Some(Click::Save);
    }
    None
}

fn mouse_pos(lparam: LPARAM) -> (i32, i32) {
    let x = (lparam.0 & 0xFFFF) as i16 as i32;
    let y = ((lparam.0 >> 16) & 0xFFFF) as i16 as i32;
    (x, y)
}

/// Window procedure
unsafe extern "system" fn wnd_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);

            // Double-buffer to avoid flicker
            let mut client = RECT::default();
            let _ = GetClientRect(hwnd, &mut client);

            let mem_dc = CreateCompatibleDC(Some(hdc));
            let mem_bmp = CreateCompatibleBitmap(hdc, client.right, client.bottom);
            let old_bmp = SelectObject(mem_dc, HGDIOBJ::from(mem_bmp));

            with_settings(|s| painting::paint(mem_dc, &client, &mut s.ui));

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
            LRESULT(0)
        }

        WM_CTLCOLOREDIT => {
            let hdc = HDC(wparam.0 as *mut c_void);
            match with_settings(|s| s.edit_brush) {
                Some(brush) => {
                    SetTextColor(hdc, CLR_FOREGROUND);
                    SetBkColor(hdc, CLR_INPUT);
                    LRESULT(brush.0 as isize)
                }
                None => DefWindowProcW(hwnd, msg, wparam, lparam),
            }
        }

        WM_COMMAND => {
            let id = (wparam.0 & 0xFFFF) as u16;
            let code = ((wparam.0 >> 16) & 0xFFFF) as u32;
            if code == EDIT_CHANGE {
                on_edit_change(hwnd, id, lparam.0);
            }
            LRESULT(0)
        }

        WM_LBUTTONDOWN => {
            let (x, y) = mouse_pos(lparam);
            match with_settings(|s| hit_test(s, x, y)).flatten() {
                Some(Click::Slider { edit, value }) => {
                    SetCapture(hwnd);
                    set_text(edit, &value.to_string());
                    invalidate(hwnd);
                }
                Some(Click::Toggle) => invalidate(hwnd),
                Some(Click::PickColor) => pick_color(hwnd),
                Some(Click::Preview) => preview(hwnd),
                Some(Click::Save) => save(hwnd),
                None => {}
            }
            LRESULT(0)
        }

        WM_MOUSEMOVE => {
            let (x, y) = mouse_pos(lparam);
            let update = with_settings(|s| {
                let mut repaint = false;
                for btn in s.ui.buttons_mut() {
                    let hover = point_in_rect(x, y, &btn.rect);
                    repaint |= btn.hover != hover;
                    btn.hover = hover;
                }
                let mut drag = None;
                if s.ui.slider.dragging {
                    let value = s.ui.slider.value_from_x(x);
                    if value != s.ui.slider.value {
                        s.ui.slider.value = value;
                        drag = Some((s.edits.opacity, value));
                    }
                }
                (repaint, drag)
            });
            if let Some((repaint, drag)) = update {
                if let Some((edit, value)) = drag {
                    set_text(edit, &value.to_string());
                }
                if repaint || drag.is_some() {
                    invalidate(hwnd);
                }
            }
            LRESULT(0)
        }

        WM_LBUTTONUP => {
            let was_dragging = with_settings(|s| std::mem::take(&mut s.ui.slider.dragging));
            if was_dragging == Some(true) {
                let _ = ReleaseCapture();
            }
            LRESULT(0)
        }

        WM_TIMER if wparam.0 == TOAST_TIMER_ID => {
            with_settings(|s| {
                s.ui.toast_visible = false;
                s.ui.toast_message.clear();
            });
            let _ = KillTimer(Some(hwnd), TOAST_TIMER_ID);
            invalidate(hwnd);
            LRESULT(0)
        }

        WM_CLOSE => {
            // Unsaved edits are dropped; the next open reloads from config
            hide_window(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            if let Some(state) = SETTINGS.with(|cell| cell.try_borrow_mut().ok().and_then(|mut s| s.take())) {
                let _ = DeleteObject(HGDIOBJ::from(state.edit_font));
                let _ = DeleteObject(HGDIOBJ::from(state.edit_brush));
            }
            LRESULT(0)
        }

        WM_ERASEBKGND => {
            // Handled in WM_PAINT with double buffering
            LRESULT(1)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
