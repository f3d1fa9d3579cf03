// Overlay layout: a clock above an optional word-wrapped message, centered
// as one block. Text measurement belongs to the platform painter; this module
// only turns measured heights into rectangles so it can be tested anywhere.

use chrono::Timelike;

/// Reference DPI the pixel constants below are expressed in.
pub const BASE_DPI: u32 = 96;
/// Horizontal margin on each side, at 96 DPI.
pub const MARGIN_X: i32 = 80;
/// Gap between the clock and the message, at 96 DPI.
pub const GAP: i32 = 18;
pub const CLOCK_POINT_SIZE: i32 = 72;
pub const MESSAGE_POINT_SIZE: i32 = 36;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub clock: Rect,
    pub message: Option<Rect>,
}

/// `a * b / c` rounded to nearest.
pub fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    if c == 0 {
        return 0;
    }
    ((i64::from(a) * i64::from(b)) as f64 / f64::from(c)).round() as i32
}

pub fn scale(px: i32, dpi: u32) -> i32 {
    mul_div(px, dpi as i32, BASE_DPI as i32)
}

/// GDI `LOGFONT` height for a point size (negative selects character height).
pub fn font_height(points: i32, dpi: u32) -> i32 {
    -mul_div(points, dpi as i32, 72)
}

/// Width text is wrapped/measured against.
pub fn available_width(client: &Rect, dpi: u32) -> i32 {
    (client.width() - scale(MARGIN_X, dpi) * 2).max(1)
}

/// Positions the clock and message given their measured heights.
/// `message_height` is `None` when the message is empty.
pub fn layout(client: &Rect, dpi: u32, clock_height: i32, message_height: Option<i32>) -> Layout {
    let margin = scale(MARGIN_X, dpi);
    let gap = scale(GAP, dpi);
    let message_height = message_height.filter(|h| *h > 0);

    let combined = clock_height + message_height.map_or(0, |h| gap + h);
    let start_y = (client.top + (client.height() - combined) / 2).max(client.top);

    let clock = Rect::new(
        client.left + margin,
        start_y,
        client.right - margin,
        start_y + clock_height,
    );
    let message = message_height.map(|h| {
        let top = clock.bottom + gap;
        Rect::new(client.left + margin, top, client.right - margin, top + h)
    });

    Layout { clock, message }
}

/// `HH:MM:SS`.
pub fn clock_text<T: Timelike>(time: &T) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        time.hour(),
        time.minute(),
        time.second()
    )
}

pub fn local_clock_text() -> String {
    clock_text(&chrono::Local::now())
}
