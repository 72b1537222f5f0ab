//! Start-with-Windows registration.
//!
//! Manages the mixer's value under the per-user `Run` key.

use thiserror::Error;
use windows::core::PCWSTR;
use windows::Win32::System::Registry::{
    RegCloseKey, RegDeleteValueW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY,
    HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_SZ,
};

/// Startup registration error types.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Failed to open Run key")]
    RunKeyUnavailable,

    #[error("Failed to locate the executable: {0}")]
    ExecutablePath(#[source] std::io::Error),

    #[error("Failed to write Run value")]
    WriteFailed,
}

/// Registry-based startup registration.
pub struct StartupRegistration {
    run_key_path: Vec<u16>,
    value_name: Vec<u16>,
}

impl StartupRegistration {
    const RUN_KEY: &'static str = r"Software\Microsoft\Windows\CurrentVersion\Run";
    const APP_NAME: &'static str = "VolumeMixer";

    pub fn new() -> Self {
        Self {
            run_key_path: Self::to_wide(Self::RUN_KEY),
            value_name: Self::to_wide(Self::APP_NAME),
        }
    }

    fn to_wide(s: &str) -> Vec<u16> {
        s.encode_utf16().chain(std::iter::once(0)).collect()
    }

    fn open_run_key(&self, access: windows::Win32::System::Registry::REG_SAM_FLAGS) -> Option<HKEY> {
        unsafe {
            let mut hkey = HKEY::default();
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR::from_raw(self.run_key_path.as_ptr()),
                0,
                access,
                &mut hkey,
            )
            .ok()
            .ok()?;
            Some(hkey)
        }
    }

    /// Check whether the Run value exists.
    pub fn is_enabled(&self) -> bool {
        let Some(hkey) = self.open_run_key(KEY_READ) else {
            return false;
        };

        unsafe {
            let mut data_size = 0u32;
            let result = RegQueryValueExW(
                hkey,
                PCWSTR::from_raw(self.value_name.as_ptr()),
                None,
                None,
                None,
                Some(&mut data_size),
            );

            let _ = RegCloseKey(hkey);

            result.is_ok() && data_size > 0
        }
    }

    /// Point the Run value at the current executable, or remove it.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), StartupError> {
        let hkey = self
            .open_run_key(KEY_WRITE)
            .ok_or(StartupError::RunKeyUnavailable)?;

        let result = if enabled {
            let exe_path = match std::env::current_exe() {
                Ok(path) => path,
                Err(e) => {
                    unsafe {
                        let _ = RegCloseKey(hkey);
                    }
                    return Err(StartupError::ExecutablePath(e));
                }
            };
            let exe_path_wide = Self::to_wide(&exe_path.to_string_lossy());

            unsafe {
                RegSetValueExW(
                    hkey,
                    PCWSTR::from_raw(self.value_name.as_ptr()),
                    0,
                    REG_SZ,
                    Some(std::slice::from_raw_parts(
                        exe_path_wide.as_ptr() as *const u8,
                        exe_path_wide.len() * 2,
                    )),
                )
            }
        } else {
            unsafe { RegDeleteValueW(hkey, PCWSTR::from_raw(self.value_name.as_ptr())) }
        };

        unsafe {
            let _ = RegCloseKey(hkey);
        }

        // Deleting a value that was never set is fine
        if result.is_err() && enabled {
            Err(StartupError::WriteFailed)
        } else {
            tracing::info!(enabled, "updated startup registration");
            Ok(())
        }
    }
}

impl Default for StartupRegistration {
    fn default() -> Self {
        Self::new()
    }
}
