// Settings window. The form model and control geometry are portable; the
// window itself is Win32 only.

pub mod controls;
pub mod form;

#[cfg(windows)]
mod painting;
#[cfg(windows)]
mod theme;
#[cfg(windows)]
mod window;

#[cfg(windows)]
pub use window::show_settings;
