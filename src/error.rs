// Error taxonomy shared by the overlay core and the Win32 shell.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no monitors reported by the display enumerator")]
    NoMonitors,

    #[error("failed to create overlay window {index}: {reason}")]
    WindowCreation { index: usize, reason: String },

    #[error("cannot preview while a break is showing")]
    OverlayBusy,

    #[error("failed to install input hook: {0}")]
    HookInstall(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error("autostart error: {0}")]
    Autostart(String),

    #[error("unsupported platform: {0}")]
    Unsupported(String),

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    Win32(#[from] windows::core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_creation_mentions_index() {
        let err = Error::WindowCreation {
            index: 1,
            reason: "class not registered".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to create overlay window 1: class not registered"
        );
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = Error::Validation("Interval must be at least 1 minute.".into());
        assert_eq!(err.to_string(), "Interval must be at least 1 minute.");
    }

    #[test]
    fn busy_overlay_explains_refused_preview() {
        assert_eq!(
            Error::OverlayBusy.to_string(),
            "cannot preview while a break is showing"
        );
    }

    #[test]
    fn unsupported_names_the_platform() {
        let err = Error::Unsupported("linux".into());
        assert_eq!(err.to_string(), "unsupported platform: linux");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");
        let err: Error = io.into();
        assert!(err.to_string().contains("config missing"));
    }
}
