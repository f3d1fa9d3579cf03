// Registry-based autostart for Windows
// Uses HKCU\Software\Microsoft\Windows\CurrentVersion\Run

use crate::error::{Error, Result};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{ERROR_FILE_NOT_FOUND, WIN32_ERROR};
use windows::Win32::System::Registry::{
    RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY,
    HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_SAM_FLAGS, REG_SZ,
};

const RUN_KEY: &str = "Software\\Microsoft\\Windows\\CurrentVersion\\Run";
const VALUE_NAME: &str = "EyeBreak";

fn wide_string(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn registry_error(op: &str, code: WIN32_ERROR) -> Error {
    Error::Autostart(format!(
        "{op}: {}",
        windows::core::Error::from(code.to_hresult())
    ))
}

/// Run key handle, closed on drop.
struct RunKey(HKEY);

impl RunKey {
    fn open(access: REG_SAM_FLAGS) -> Result<Self> {
        let key_path = wide_string(RUN_KEY);
        let mut hkey = HKEY::default();
        let status = unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR(key_path.as_ptr()),
                Some(0),
                access,
                &mut hkey,
            )
        };
        if status.is_ok() {
            Ok(Self(hkey))
        } else {
            Err(registry_error("open Run key", status))
        }
    }
}

impl Drop for RunKey {
    fn drop(&mut self) {
        unsafe {
            let _ = RegCloseKey(self.0);
        }
    }
}

/// Quoted path of the running executable, as stored in the Run value.
fn launch_command() -> Result<String> {
    let exe_path = std::env::current_exe()?;
    Ok(format!("\"{}\"", exe_path.display()))
}

/// Point the Run value at the current executable
pub fn enable() -> Result<()> {
    let key = RunKey::open(KEY_WRITE)?;
    let value_name = wide_string(VALUE_NAME);
    let data = wide_string(&launch_command()?);
    let data_bytes =
        unsafe { std::slice::from_raw_parts(data.as_ptr() as *const u8, data.len() * 2) };

    let status = unsafe {
        RegSetValueExW(
            key.0,
            PCWSTR(value_name.as_ptr()),
            Some(0),
            REG_SZ,
            Some(data_bytes),
        )
    };
    if status.is_ok() {
        tracing::info!("Autostart enabled");
        Ok(())
    } else {
        Err(registry_error("write Run value", status))
    }
}

/// Remove the Run value. Already absent counts as success.
pub fn disable() -> Result<()> {
    let key = RunKey::open(KEY_WRITE)?;
    let value_name = wide_string(VALUE_NAME);
    let status = unsafe { RegDeleteValueW(key.0, PCWSTR(value_name.as_ptr())) };
    if status.is_ok() || status == ERROR_FILE_NOT_FOUND {
        tracing::info!("Autostart disabled");
        Ok(())
    } else {
        Err(registry_error("delete Run value", status))
    }
}

/// Check if autostart is currently enabled
pub fn is_enabled() -> bool {
    let Ok(key) = RunKey::open(KEY_READ) else {
        return false;
    };
    let value_name = wide_string(VALUE_NAME);
    unsafe { RegQueryValueExW(key.0, PCWSTR(value_name.as_ptr()), None, None, None, None) }
        .is_ok()
}

/// Bring the registry in line with the `auto_start` setting.
pub fn apply(enabled: bool) -> Result<()> {
    if enabled == is_enabled() {
        return Ok(());
    }
    if enabled {
        enable()
    } else {
        disable()
    }
}
