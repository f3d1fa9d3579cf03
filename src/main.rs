// Prevents console window in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("eyebreak=info")),
        )
        .init();

    if let Err(e) = run() {
        tracing::error!(error = %e, "EyeBreak stopped");
        std::process::exit(1);
    }
}

#[cfg(windows)]
fn run() -> eyebreak::Result<()> {
    eyebreak::app::run()
}

#[cfg(not(windows))]
fn run() -> eyebreak::Result<()> {
    Err(eyebreak::Error::Unsupported(format!(
        "{}, EyeBreak only runs on Windows",
        std::env::consts::OS
    )))
}
