use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum message length, in code points.
pub const TEXT_MAX_LEN: usize = 500;

pub const MSG_INTERVAL: &str = "Interval must be at least 1 minute.";
pub const MSG_FADE: &str = "Fade duration must be at least 1 second.";
pub const MSG_OPACITY: &str = "Opacity must be between 0 and 100.";
pub const MSG_COLOR: &str = "Background color must be a hex value like #008040.";

/// Overlay background color, persisted as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or `RRGGBB`, ignoring surrounding whitespace.
    pub fn parse_hex(input: &str) -> Option<Self> {
        let s = input.trim();
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Application configuration stored in JSON.
///
/// One value of this type is the snapshot an overlay cycle runs with;
/// the engine never observes later edits to the file. Numbers are kept
/// signed so out-of-range input survives parsing and is dealt with by
/// `normalize` or `validated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct AppConfig {
    pub interval_minutes: i64,
    pub opacity_percent: i64,
    pub fade_seconds: i64,
    pub background_color: Rgb,
    pub auto_start: bool,
    /// Message shown under the clock; empty hides it
    pub text: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 15,
            opacity_percent: 60,
            fade_seconds: 5,
            background_color: Rgb::new(0x00, 0x80, 0x40),
            auto_start: false,
            text: "Look up, gaze into the distance, and give your eyes a break.".into(),
        }
    }
}

impl AppConfig {
    /// Clamps every field into its valid range.
    pub fn normalize(&mut self) {
        self.interval_minutes = self.interval_minutes.max(1);
        self.fade_seconds = self.fade_seconds.max(1);
        self.opacity_percent = self.opacity_percent.clamp(0, 100);
        truncate_text(&mut self.text);
    }

    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Settings-boundary check: numeric fields out of range are rejected
    /// with a user-facing message instead of being clamped. Overlong text
    /// is still truncated.
    pub fn validated(mut self) -> Result<Self> {
        if self.interval_minutes < 1 {
            return Err(Error::Validation(MSG_INTERVAL.into()));
        }
        if self.fade_seconds < 1 {
            return Err(Error::Validation(MSG_FADE.into()));
        }
        if !(0..=100).contains(&self.opacity_percent) {
            return Err(Error::Validation(MSG_OPACITY.into()));
        }
        truncate_text(&mut self.text);
        Ok(self)
    }

    /// Fully faded-in alpha, `round(opacity% * 255)`.
    pub fn target_alpha(&self) -> u8 {
        let pct = self.opacity_percent.clamp(0, 100) as f64;
        (pct * 255.0 / 100.0).round() as u8
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs((self.interval_minutes.max(1) as u64).saturating_mul(60))
    }

    pub fn fade_duration(&self) -> Duration {
        Duration::from_secs(self.fade_seconds.max(1) as u64)
    }
}

/// The file as written, one raw JSON value per field. A field that is
/// missing, null or of the wrong shape falls back to its own default and
/// leaves the others alone. A document that is not an object (or array)
/// still fails as a whole.
#[derive(Deserialize, Default)]
#[serde(default)]
struct RawConfig {
    interval_minutes: Value,
    opacity_percent: Value,
    fade_seconds: Value,
    background_color: Value,
    auto_start: Value,
    text: Value,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = AppConfig::default();
        Self {
            interval_minutes: field(
                "interval_minutes",
                &raw.interval_minutes,
                number,
                defaults.interval_minutes,
            ),
            opacity_percent: field(
                "opacity_percent",
                &raw.opacity_percent,
                number,
                defaults.opacity_percent,
            ),
            fade_seconds: field("fade_seconds", &raw.fade_seconds, number, defaults.fade_seconds),
            background_color: field(
                "background_color",
                &raw.background_color,
                |v| v.as_str().and_then(Rgb::parse_hex),
                defaults.background_color,
            ),
            auto_start: field("auto_start", &raw.auto_start, Value::as_bool, defaults.auto_start),
            text: field(
                "text",
                &raw.text,
                |v| v.as_str().map(str::to_owned),
                defaults.text,
            ),
        }
    }
}

fn field<T>(name: &str, value: &Value, parse: impl FnOnce(&Value) -> Option<T>, default: T) -> T {
    if value.is_null() {
        return default;
    }
    match parse(value) {
        Some(parsed) => parsed,
        None => {
            tracing::warn!(field = name, value = %value, "Ignoring invalid config value");
            default
        }
    }
}

/// Any JSON number, rounded to a whole number (saturating).
fn number(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.round() as i64))
}

fn truncate_text(text: &mut String) {
    if let Some((cut, _)) = text.char_indices().nth(TEXT_MAX_LEN) {
        text.truncate(cut);
    }
}

pub fn config_path() -> PathBuf {
    let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("EyeBreak").join("config.json")
}

/// Loads the config at `path`, falling back to defaults when the file is
/// missing or unreadable. The result is always normalized.
pub fn load_config(path: &Path) -> AppConfig {
    if !path.exists() {
        return AppConfig::default();
    }
    match read_config(path) {
        Ok(cfg) => cfg.normalized(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Config unreadable, using defaults");
            AppConfig::default()
        }
    }
}

/// Reads a config file without normalizing it, so the caller can decide
/// between clamping and validation.
pub fn read_config(path: &Path) -> Result<AppConfig> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

pub fn write_config(path: &Path, config: &AppConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let data = serde_json::to_string_pretty(config)?;
    fs::write(path, data)?;
    Ok(())
}

/// Writes `config` on first run so there is a file to edit. An existing
/// file is left untouched.
pub fn ensure_config_file(path: &Path, config: &AppConfig) -> Result<()> {
    if !path.exists() {
        write_config(path, config)?;
        tracing::info!(path = %path.display(), "Created default config");
    }
    Ok(())
}
