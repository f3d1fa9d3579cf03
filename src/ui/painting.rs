// GDI owner-draw rendering for the settings window

use super::controls::*;
use super::theme::*;
use crate::overlay::colorref;
use crate::render::Rect;
use windows::Win32::Foundation::{COLORREF, RECT, SIZE};
use windows::Win32::Graphics::Gdi::*;

// ── Helpers ──────────────────────────────────────────────────────────────────

fn create_font(size: i32, weight: i32) -> HFONT {
    let face: Vec<u16> = FONT_NAME.encode_utf16().chain(std::iter::once(0)).collect();
    unsafe {
        let mut lf = LOGFONTW {
            lfHeight: size,
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

fn win_rect(r: &Rect) -> RECT {
    RECT {
        left: r.left,
        top: r.top,
        right: r.right,
        bottom: r.bottom,
    }
}

fn fill_rect_color(hdc: HDC, r: &RECT, color: COLORREF) {
    unsafe {
        let brush = CreateSolidBrush(color);
        FillRect(hdc, r, brush);
        let _ = DeleteObject(HGDIOBJ::from(brush));
    }
}

fn draw_rounded_rect(hdc: HDC, r: &RECT, radius: i32, fill: COLORREF, border: COLORREF) {
    unsafe {
        let fill_brush = CreateSolidBrush(fill);
        let border_pen = CreatePen(PS_SOLID, 1, border);
        let old_brush = SelectObject(hdc, HGDIOBJ::from(fill_brush));
        let old_pen = SelectObject(hdc, HGDIOBJ::from(border_pen));
        let _ = RoundRect(hdc, r.left, r.top, r.right, r.bottom, radius, radius);
        SelectObject(hdc, old_pen);
        SelectObject(hdc, old_brush);
        let _ = DeleteObject(HGDIOBJ::from(fill_brush));
        let _ = DeleteObject(HGDIOBJ::from(border_pen));
    }
}

fn draw_text_simple(hdc: HDC, text: &str, x: i32, y: i32, color: COLORREF, font: HFONT) {
    unsafe {
        let old_font = SelectObject(hdc, HGDIOBJ::from(font));
        SetTextColor(hdc, color);
        SetBkMode(hdc, TRANSPARENT);
        let wide: Vec<u16> = text.encode_utf16().collect();
        let _ = TextOutW(hdc, x, y, &wide);
        SelectObject(hdc, old_font);
    }
}

fn measure_text(hdc: HDC, text: &str, font: HFONT) -> (i32, i32) {
    unsafe {
        let old_font = SelectObject(hdc, HGDIOBJ::from(font));
        let wide: Vec<u16> = text.encode_utf16().collect();
        let mut size = SIZE::default();
        let _ = GetTextExtentPoint32W(hdc, &wide, &mut size);
        SelectObject(hdc, old_font);
        (size.cx, size.cy)
    }
}

fn draw_text_right(hdc: HDC, text: &str, right_x: i32, y: i32, color: COLORREF, font: HFONT) {
    let (w, _) = measure_text(hdc, text, font);
    draw_text_simple(hdc, text, right_x - w, y, color, font);
}

fn draw_circle(hdc: HDC, cx: i32, cy: i32, r: i32, color: COLORREF) {
    unsafe {
        let brush = CreateSolidBrush(color);
        let pen = CreatePen(PS_SOLID, 0, color);
        let old_brush = SelectObject(hdc, HGDIOBJ::from(brush));
        let old_pen = SelectObject(hdc, HGDIOBJ::from(pen));
        let _ = Ellipse(hdc, cx - r, cy - r, cx + r, cy + r);
        SelectObject(hdc, old_pen);
        SelectObject(hdc, old_brush);
        let _ = DeleteObject(HGDIOBJ::from(brush));
        let _ = DeleteObject(HGDIOBJ::from(pen));
    }
}

// ── Main paint function ─────────────────────────────────────────────────────

pub fn paint(hdc: HDC, client: &RECT, state: &mut UiState) {
    fill_rect_color(hdc, client, CLR_BACKGROUND);

    let fonts = Fonts::create();

    draw_header(hdc, &fonts);
    draw_schedule_card(hdc, &fonts);
    draw_appearance_card(hdc, state, &fonts);
    draw_message_card(hdc, state, &fonts);
    draw_startup_card(hdc, state, &fonts);
    draw_action_buttons(hdc, state, &fonts);

    if state.toast_visible {
        draw_toast(hdc, client, state, &fonts);
    }

    fonts.destroy();
}

// ── Font cache ──────────────────────────────────────────────────────────────

struct Fonts {
    title: HFONT,
    small: HFONT,
    small_bold: HFONT,
    xs: HFONT,
}

impl Fonts {
    fn create() -> Self {
        Self {
            title: create_font(FONT_SIZE_TITLE, 600),
            small: create_font(FONT_SIZE_SMALL, 400),
            small_bold: create_font(FONT_SIZE_SMALL, 500),
            xs: create_font(FONT_SIZE_XS, 400),
        }
    }

    fn destroy(&self) {
        unsafe {
            let _ = DeleteObject(HGDIOBJ::from(self.title));
            let _ = DeleteObject(HGDIOBJ::from(self.small));
            let _ = DeleteObject(HGDIOBJ::from(self.small_bold));
            let _ = DeleteObject(HGDIOBJ::from(self.xs));
        }
    }
}

/// Font handed to the native edit children. Lives as long as the window.
pub fn create_edit_font() -> HFONT {
    create_font(FONT_SIZE_SMALL, 400)
}

// ── Section renderers ───────────────────────────────────────────────────────

fn card(hdc: HDC, top: i32, height: i32, title: &str, fonts: &Fonts) {
    let rect = RECT {
        left: PADDING,
        top,
        right: PADDING + CONTENT_WIDTH,
        bottom: top + height,
    };
    draw_rounded_rect(hdc, &rect, CARD_RADIUS, CLR_BACKGROUND, CLR_BORDER);
    draw_text_simple(hdc, title, INNER_X, top + 12, CLR_FOREGROUND, fonts.small_bold);
}

fn row_label(hdc: HDC, text: &str, row: i32, fonts: &Fonts) {
    draw_text_simple(hdc, text, INNER_X, row + 4, CLR_MUTED_FG, fonts.small);
}

fn draw_header(hdc: HDC, fonts: &Fonts) {
    draw_text_simple(
        hdc,
        "EyeBreak",
        PADDING,
        PADDING,
        CLR_FOREGROUND,
        fonts.title,
    );
    draw_text_simple(
        hdc,
        "Changes take effect when you press Save",
        PADDING,
        PADDING + 26,
        CLR_MUTED_FG,
        fonts.xs,
    );
}

fn draw_schedule_card(hdc: HDC, fonts: &Fonts) {
    card(hdc, SCHEDULE_CARD_TOP, SCHEDULE_CARD_HEIGHT, "Schedule", fonts);
    row_label(hdc, "Break every (minutes)", ROW_INTERVAL, fonts);
    row_label(hdc, "Fade duration (seconds)", ROW_FADE, fonts);
}

fn draw_appearance_card(hdc: HDC, state: &mut UiState, fonts: &Fonts) {
    card(
        hdc,
        APPEARANCE_CARD_TOP,
        APPEARANCE_CARD_HEIGHT,
        "Appearance",
        fonts,
    );
    row_label(hdc, "Opacity (%)", ROW_OPACITY, fonts);

    // Slider
    let thumb_r = 9;
    state.slider.rect = Rect::new(INNER_X, SLIDER_TOP, INNER_RIGHT, SLIDER_TOP + TRACK_HEIGHT);
    let track_rect = win_rect(&state.slider.rect);
    draw_rounded_rect(hdc, &track_rect, 4, CLR_SECONDARY, CLR_SECONDARY);

    let thumb_x = state.slider.thumb_x();
    if thumb_x > INNER_X {
        let fill_rect = RECT {
            right: thumb_x,
            ..track_rect
        };
        draw_rounded_rect(hdc, &fill_rect, 4, CLR_BRAND, CLR_BRAND);
    }
    draw_circle(
        hdc,
        thumb_x,
        SLIDER_TOP + TRACK_HEIGHT / 2,
        thumb_r,
        CLR_FOREGROUND,
    );
    state.slider.thumb_rect = Rect::new(
        INNER_X - thumb_r,
        SLIDER_TOP - thumb_r - 4,
        INNER_RIGHT + thumb_r,
        SLIDER_TOP + TRACK_HEIGHT + thumb_r + 4,
    );

    row_label(hdc, "Background color", ROW_COLOR, fonts);

    // Swatch left of the hex edit; hollow while the edit is not a color
    let swatch_right = INNER_RIGHT - PICK_BUTTON_WIDTH - 8 - COLOR_EDIT_WIDTH - 8;
    let swatch = RECT {
        left: swatch_right - EDIT_HEIGHT,
        top: ROW_COLOR,
        right: swatch_right,
        bottom: ROW_COLOR + EDIT_HEIGHT,
    };
    match state.swatch {
        Some(rgb) => draw_rounded_rect(hdc, &swatch, 6, colorref(rgb), CLR_BORDER),
        None => draw_rounded_rect(hdc, &swatch, 6, CLR_BACKGROUND, CLR_MUTED_FG),
    }

    let pick = Rect::new(
        INNER_RIGHT - PICK_BUTTON_WIDTH,
        ROW_COLOR,
        INNER_RIGHT,
        ROW_COLOR + EDIT_HEIGHT,
    );
    draw_button(hdc, &mut state.pick_color_btn, pick, false, fonts);
}

fn draw_message_card(hdc: HDC, state: &UiState, fonts: &Fonts) {
    card(
        hdc,
        MESSAGE_CARD_TOP,
        MESSAGE_CARD_HEIGHT,
        "Message",
        fonts,
    );
    draw_text_right(
        hdc,
        "Shown under the clock",
        INNER_RIGHT,
        MESSAGE_CARD_TOP + 13,
        CLR_MUTED_FG,
        fonts.xs,
    );
    draw_text_right(
        hdc,
        &state.char_count,
        INNER_RIGHT,
        TEXT_TOP + TEXT_HEIGHT + 6,
        CLR_MUTED_FG,
        fonts.xs,
    );
}

fn draw_startup_card(hdc: HDC, state: &mut UiState, fonts: &Fonts) {
    let top = STARTUP_CARD_TOP;
    let rect = RECT {
        left: PADDING,
        top,
        right: PADDING + CONTENT_WIDTH,
        bottom: top + STARTUP_CARD_HEIGHT,
    };
    draw_rounded_rect(hdc, &rect, CARD_RADIUS, CLR_BACKGROUND, CLR_BORDER);
    draw_text_simple(
        hdc,
        "Start with Windows",
        INNER_X,
        top + 10,
        CLR_FOREGROUND,
        fonts.small_bold,
    );
    draw_text_simple(
        hdc,
        "Launch EyeBreak when you sign in",
        INNER_X,
        top + 28,
        CLR_MUTED_FG,
        fonts.xs,
    );
    state.autostart_toggle.rect = draw_toggle(
        hdc,
        INNER_RIGHT - 44,
        top + 16,
        state.autostart_toggle.checked,
    );
}

fn draw_action_buttons(hdc: HDC, state: &mut UiState, fonts: &Fonts) {
    let right = PADDING + CONTENT_WIDTH;
    let save = button_rect(hdc, &state.save_btn.text, right, fonts);
    draw_button(hdc, &mut state.save_btn, save, true, fonts);

    let preview = button_rect(hdc, &state.preview_btn.text, save.left - 8, fonts);
    draw_button(hdc, &mut state.preview_btn, preview, false, fonts);
}

fn button_rect(hdc: HDC, text: &str, right: i32, fonts: &Fonts) -> Rect {
    let (bw, bh) = measure_text(hdc, text, fonts.xs);
    let w = (bw + 28).max(80);
    Rect::new(right - w, BUTTON_ROW, right, BUTTON_ROW + bh + 14)
}

fn draw_button(hdc: HDC, btn: &mut ButtonState, rect: Rect, primary: bool, fonts: &Fonts) {
    let (bg, border) = match (primary, btn.hover) {
        (true, _) => (CLR_BRAND, CLR_BRAND),
        (false, true) => (CLR_MUTED_FG, CLR_MUTED_FG),
        (false, false) => (CLR_SECONDARY, CLR_BORDER),
    };
    draw_rounded_rect(hdc, &win_rect(&rect), CARD_RADIUS, bg, border);

    let (tw, th) = measure_text(hdc, &btn.text, fonts.xs);
    draw_text_simple(
        hdc,
        &btn.text,
        rect.left + (rect.width() - tw) / 2,
        rect.top + (rect.height() - th) / 2,
        CLR_FOREGROUND,
        fonts.xs,
    );
    btn.rect = rect;
}

fn draw_toggle(hdc: HDC, x: i32, y: i32, checked: bool) -> Rect {
    let w = 44;
    let h = 24;
    let rect = Rect::new(x, y, x + w, y + h);

    let track_color = if checked { CLR_BRAND } else { CLR_INPUT };
    draw_rounded_rect(hdc, &win_rect(&rect), h / 2, track_color, track_color);

    let thumb_r = 10;
    let thumb_x = if checked {
        x + w - 2 - thumb_r
    } else {
        x + 2 + thumb_r
    };
    draw_circle(hdc, thumb_x, y + h / 2, thumb_r, CLR_FOREGROUND);

    rect
}

fn draw_toast(hdc: HDC, client: &RECT, state: &UiState, fonts: &Fonts) {
    let msg = &state.toast_message;
    if msg.is_empty() {
        return;
    }

    let (tw, th) = measure_text(hdc, msg, fonts.small_bold);
    let toast_w = tw + 48;
    let toast_h = th + 24;
    let toast_x = (client.right - toast_w) / 2;
    let toast_y = client.bottom - toast_h - 56;

    let toast_rect = RECT {
        left: toast_x,
        top: toast_y,
        right: toast_x + toast_w,
        bottom: toast_y + toast_h,
    };
    draw_rounded_rect(
        hdc,
        &toast_rect,
        CARD_RADIUS,
        CLR_FOREGROUND,
        CLR_FOREGROUND,
    );
    draw_text_simple(
        hdc,
        msg,
        toast_x + (toast_w - tw) / 2,
        toast_y + (toast_h - th) / 2,
        CLR_BACKGROUND,
        fonts.small_bold,
    );
}
