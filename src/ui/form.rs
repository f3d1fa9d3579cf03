// Values typed into the settings window, before they become a config.

use crate::config::{AppConfig, Rgb, MSG_COLOR, MSG_FADE, MSG_INTERVAL, MSG_OPACITY, TEXT_MAX_LEN};
use crate::error::{Error, Result};

/// Character limits for the edit controls.
pub const INTERVAL_MAX_CHARS: u32 = 4;
pub const FADE_MAX_CHARS: u32 = 3;
pub const OPACITY_MAX_CHARS: u32 = 3;
pub const COLOR_MAX_CHARS: u32 = 7;
pub const TEXT_MAX_CHARS: u32 = TEXT_MAX_LEN as u32;

/// Raw contents of the settings controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub interval: String,
    pub fade: String,
    pub opacity: String,
    pub color: String,
    /// Message as the edit control holds it, with `\r\n` line breaks
    pub text: String,
    pub auto_start: bool,
}

impl SettingsForm {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            interval: config.interval_minutes.to_string(),
            fade: config.fade_seconds.to_string(),
            opacity: config.opacity_percent.to_string(),
            color: config.background_color.to_hex(),
            text: to_edit_text(&config.text),
            auto_start: config.auto_start,
        }
    }

    /// Builds the config these values describe, or the message to show
    /// next to the first bad field.
    pub fn candidate(&self) -> Result<AppConfig> {
        let interval_minutes = parse_number(&self.interval, MSG_INTERVAL)?;
        let fade_seconds = parse_number(&self.fade, MSG_FADE)?;
        let opacity_percent = parse_number(&self.opacity, MSG_OPACITY)?;
        let background_color =
            Rgb::parse_hex(&self.color).ok_or_else(|| Error::Validation(MSG_COLOR.into()))?;

        AppConfig {
            interval_minutes,
            opacity_percent,
            fade_seconds,
            background_color,
            auto_start: self.auto_start,
            text: from_edit_text(&self.text),
        }
        .validated()
    }
}

fn parse_number(input: &str, message: &str) -> Result<i64> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::Validation(message.into()))
}

/// Slider position for whatever is in the opacity edit.
pub fn opacity_from_edit(input: &str) -> i64 {
    input.trim().parse::<i64>().map_or(0, |v| v.clamp(0, 100))
}

/// Live counter under the message box, e.g. `42/500`.
pub fn char_count_label(text: &str) -> String {
    format!("{}/{}", from_edit_text(text).chars().count(), TEXT_MAX_LEN)
}

fn to_edit_text(text: &str) -> String {
    from_edit_text(text).replace('\n', "\r\n")
}

fn from_edit_text(text: &str) -> String {
    text.replace("\r\n", "\n")
}
