use windows::Win32::Foundation::COLORREF;

// ── Color palette (dark) ─────────────────────────────────────────────────────

/// Background: #030711
pub const CLR_BACKGROUND: COLORREF = COLORREF(0x00110703);

/// Foreground / primary text: #F8FAFC
pub const CLR_FOREGROUND: COLORREF = COLORREF(0x00FCFAF8);

/// Secondary / muted bg: #1E293B
pub const CLR_SECONDARY: COLORREF = COLORREF(0x003B291E);

/// Muted foreground (descriptions, labels): #94A3B8
pub const CLR_MUTED_FG: COLORREF = COLORREF(0x00B8A394);

/// Accent green, matches the default break color: #10B981
pub const CLR_BRAND: COLORREF = COLORREF(0x0081B910);

pub const CLR_BORDER: COLORREF = COLORREF(0x003B291E);

/// Input/toggle background
pub const CLR_INPUT: COLORREF = COLORREF(0x003B291E);

// ── Dimensions ───────────────────────────────────────────────────────────────

/// Client area
pub const WINDOW_WIDTH: i32 = 420;
pub const WINDOW_HEIGHT: i32 = 632;

pub const PADDING: i32 = 24;
pub const CONTENT_WIDTH: i32 = WINDOW_WIDTH - 2 * PADDING;
pub const INNER_X: i32 = PADDING + 16;
pub const INNER_RIGHT: i32 = PADDING + CONTENT_WIDTH - 16;

pub const CARD_RADIUS: i32 = 8;
pub const GAP: i32 = 12;

// ── Rows (top edges, client coordinates) ─────────────────────────────────────

pub const SCHEDULE_CARD_TOP: i32 = 72;
pub const ROW_INTERVAL: i32 = SCHEDULE_CARD_TOP + 40;
pub const ROW_FADE: i32 = SCHEDULE_CARD_TOP + 72;
pub const SCHEDULE_CARD_HEIGHT: i32 = 108;

pub const APPEARANCE_CARD_TOP: i32 = SCHEDULE_CARD_TOP + SCHEDULE_CARD_HEIGHT + GAP;
pub const ROW_OPACITY: i32 = APPEARANCE_CARD_TOP + 40;
pub const SLIDER_TOP: i32 = APPEARANCE_CARD_TOP + 80;
pub const ROW_COLOR: i32 = APPEARANCE_CARD_TOP + 104;
pub const APPEARANCE_CARD_HEIGHT: i32 = 144;

pub const MESSAGE_CARD_TOP: i32 = APPEARANCE_CARD_TOP + APPEARANCE_CARD_HEIGHT + GAP;
pub const TEXT_TOP: i32 = MESSAGE_CARD_TOP + 36;
pub const TEXT_HEIGHT: i32 = 88;
pub const MESSAGE_CARD_HEIGHT: i32 = 152;

pub const STARTUP_CARD_TOP: i32 = MESSAGE_CARD_TOP + MESSAGE_CARD_HEIGHT + GAP;
pub const STARTUP_CARD_HEIGHT: i32 = 56;

pub const BUTTON_ROW: i32 = STARTUP_CARD_TOP + STARTUP_CARD_HEIGHT + 16;

/// Native edit sizes
pub const EDIT_HEIGHT: i32 = 24;
pub const NUMBER_EDIT_WIDTH: i32 = 64;
pub const COLOR_EDIT_WIDTH: i32 = 84;
/// Gap left for the "Pick..." button right of the color edit
pub const PICK_BUTTON_WIDTH: i32 = 64;

pub const TRACK_HEIGHT: i32 = 8;

// ── Font sizes (logical units, negative for character height) ────────────────

pub const FONT_SIZE_TITLE: i32 = -18;
pub const FONT_SIZE_SMALL: i32 = -12;
pub const FONT_SIZE_XS: i32 = -11;

pub const FONT_NAME: &str = "Segoe UI";
