// UI control state tracking and hit-testing

use crate::config::Rgb;
use crate::render::Rect;

/// Opacity slider, 0-100.
#[derive(Debug, Clone)]
pub struct SliderState {
    pub value: i64,
    pub dragging: bool,
    pub rect: Rect,       // full track rect
    pub thumb_rect: Rect, // grab area around the track
}

impl SliderState {
    pub fn new(value: i64) -> Self {
        Self {
            value: value.clamp(0, 100),
            dragging: false,
            rect: Rect::default(),
            thumb_rect: Rect::default(),
        }
    }

    /// Get x position of slider thumb based on current value
    pub fn thumb_x(&self) -> i32 {
        self.rect.left + (self.value as f32 / 100.0 * self.rect.width() as f32) as i32
    }

    /// Calculate value from an x position within the slider track
    pub fn value_from_x(&self, x: i32) -> i64 {
        let track_width = self.rect.width();
        if track_width <= 0 {
            return self.value;
        }
        let rel_x = (x - self.rect.left).clamp(0, track_width);
        ((rel_x as f32 / track_width as f32) * 100.0).round() as i64
    }
}

#[derive(Debug, Clone)]
pub struct ToggleState {
    pub checked: bool,
    pub rect: Rect,
}

impl ToggleState {
    pub fn new(checked: bool) -> Self {
        Self {
            checked,
            rect: Rect::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ButtonState {
    pub rect: Rect,
    pub hover: bool,
    pub text: String,
}

impl ButtonState {
    pub fn new(text: &str) -> Self {
        Self {
            rect: Rect::default(),
            hover: false,
            text: text.to_string(),
        }
    }
}

/// Everything the settings window paints itself. Text fields live in
/// native edit controls and are not mirrored here.
pub struct UiState {
    pub slider: SliderState,
    pub autostart_toggle: ToggleState,
    pub pick_color_btn: ButtonState,
    pub preview_btn: ButtonState,
    pub save_btn: ButtonState,

    /// Parsed color edit, `None` while it holds no valid hex value
    pub swatch: Option<Rgb>,
    pub char_count: String,

    pub toast_message: String,
    pub toast_visible: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self {
            slider: SliderState::new(0),
            autostart_toggle: ToggleState::new(false),
            pick_color_btn: ButtonState::new("Pick..."),
            preview_btn: ButtonState::new("Preview"),
            save_btn: ButtonState::new("Save"),
            swatch: None,
            char_count: String::new(),
            toast_message: String::new(),
            toast_visible: false,
        }
    }

    pub fn buttons_mut(&mut self) -> [&mut ButtonState; 3] {
        [
            &mut self.pick_color_btn,
            &mut self.preview_btn,
            &mut self.save_btn,
        ]
    }
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if a point is inside a rect
pub fn point_in_rect(x: i32, y: i32, r: &Rect) -> bool {
    x >= r.left && x < r.right && y >= r.top && y < r.bottom
}
