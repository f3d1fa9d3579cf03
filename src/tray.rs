// System tray icon with context menu

use windows::core::PCWSTR;
use windows::Win32::Foundation::{HWND, LPARAM, POINT, WPARAM};
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NIM_MODIFY,
    NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, DestroyMenu, GetCursorPos, LoadIconW, PostMessageW,
    SetForegroundWindow, TrackPopupMenu, IDI_APPLICATION, MENU_ITEM_FLAGS, MF_GRAYED,
    MF_SEPARATOR, MF_STRING, TPM_BOTTOMALIGN, TPM_LEFTALIGN, WM_APP, WM_NULL,
};

/// Custom message ID for tray icon callbacks
pub const WM_TRAY_ICON: u32 = WM_APP + 1;

/// Menu item IDs
pub const IDM_PREVIEW: u32 = 1001;
pub const IDM_DISMISS: u32 = 1002;
pub const IDM_OPEN_SETTINGS: u32 = 1003;
pub const IDM_RELOAD: u32 = 1004;
pub const IDM_EXIT: u32 = 1005;
pub const IDM_SETTINGS: u32 = 1006;

pub const TOOLTIP: &str = "EyeBreak";

fn wide_str(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn notify_data(hwnd: HWND) -> NOTIFYICONDATAW {
    NOTIFYICONDATAW {
        cbSize: std::mem::size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd,
        uID: 1,
        ..Default::default()
    }
}

fn set_tip(nid: &mut NOTIFYICONDATAW, text: &str) {
    let tip = wide_str(text);
    // Keep the terminating NUL inside the 128-slot buffer
    let len = tip.len().min(nid.szTip.len() - 1);
    nid.szTip[..len].copy_from_slice(&tip[..len]);
    nid.szTip[len] = 0;
}

/// Add the system tray icon
pub fn add_tray_icon(hwnd: HWND) -> bool {
    unsafe {
        let mut nid = notify_data(hwnd);
        nid.uFlags = NIF_ICON | NIF_MESSAGE | NIF_TIP;
        nid.uCallbackMessage = WM_TRAY_ICON;
        if let Ok(icon) = LoadIconW(None, IDI_APPLICATION) {
            nid.hIcon = icon;
        }
        set_tip(&mut nid, TOOLTIP);

        Shell_NotifyIconW(NIM_ADD, &nid).as_bool()
    }
}

/// Replace the hover text
pub fn set_tooltip(hwnd: HWND, text: &str) {
    unsafe {
        let mut nid = notify_data(hwnd);
        nid.uFlags = NIF_TIP;
        set_tip(&mut nid, text);
        let _ = Shell_NotifyIconW(NIM_MODIFY, &nid);
    }
}

/// Remove the system tray icon
pub fn remove_tray_icon(hwnd: HWND) {
    unsafe {
        let nid = notify_data(hwnd);
        let _ = Shell_NotifyIconW(NIM_DELETE, &nid);
    }
}

/// Show the tray context menu. "Close overlay" is greyed out while nothing
/// is on screen.
pub fn show_context_menu(hwnd: HWND, overlay_visible: bool) {
    unsafe {
        let menu = match CreatePopupMenu() {
            Ok(menu) => menu,
            Err(e) => {
                tracing::error!(error = %e, "CreatePopupMenu failed");
                return;
            }
        };

        let dismiss_flags = if overlay_visible {
            MF_STRING
        } else {
            MF_STRING | MF_GRAYED
        };
        let items: [(MENU_ITEM_FLAGS, u32, &str); 6] = [
            (MF_STRING, IDM_SETTINGS, "Settings..."),
            (MF_STRING, IDM_PREVIEW, "Preview break"),
            (dismiss_flags, IDM_DISMISS, "Close overlay"),
            (MF_STRING, IDM_OPEN_SETTINGS, "Open settings file"),
            (MF_STRING, IDM_RELOAD, "Reload settings"),
            (MF_STRING, IDM_EXIT, "Exit"),
        ];
        for (flags, id, label) in items {
            if id == IDM_EXIT {
                let _ = AppendMenuW(menu, MF_SEPARATOR, 0, PCWSTR::null());
            }
            let text = wide_str(label);
            let _ = AppendMenuW(menu, flags, id as usize, PCWSTR(text.as_ptr()));
        }

        let mut pt = POINT::default();
        let _ = GetCursorPos(&mut pt);

        // Required for TrackPopupMenu to work correctly with tray icons
        let _ = SetForegroundWindow(hwnd);

        let _ = TrackPopupMenu(
            menu,
            TPM_LEFTALIGN | TPM_BOTTOMALIGN,
            pt.x,
            pt.y,
            Some(0),
            hwnd,
            None,
        );
        let _ = PostMessageW(Some(hwnd), WM_NULL, WPARAM(0), LPARAM(0));

        let _ = DestroyMenu(menu);
    }
}
