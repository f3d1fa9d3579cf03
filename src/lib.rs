// EyeBreak: a periodic full-screen break reminder.
//
// The overlay core (scheduler, fade, session, engine) is platform-neutral and
// driven through the service traits in `engine::Services`. The Win32 shell
// provides the real services and the event loop.

pub mod activity;
pub mod config;
pub mod engine;
pub mod error;
pub mod fade;
pub mod monitor;
pub mod render;
pub mod scheduler;
pub mod session;
pub mod ui;

#[cfg(windows)]
pub mod app;
#[cfg(windows)]
pub mod autostart;
#[cfg(windows)]
pub mod hooks;
#[cfg(windows)]
pub mod overlay;
#[cfg(windows)]
pub mod timers;
#[cfg(windows)]
pub mod tray;

#[cfg(test)]
mod testing;

pub use activity::{ActivityGate, InputDetector, OverlayState};
pub use config::AppConfig;
pub use engine::{CloseReason, OverlayEngine, OverlayEvent, Services};
pub use error::{Error, Result};
