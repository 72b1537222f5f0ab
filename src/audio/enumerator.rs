//! Session enumeration using the Windows audio session API.
//!
//! Provides COM initialization and the `SessionProvider` backed by
//! IAudioSessionManager2 on the default playback endpoint.

use super::capture::SessionMeter;
use super::session::{AudioError, AudioSession, SessionProcess, SessionProvider};
use super::volume::SessionVolume;
use windows::core::{Interface, PWSTR};
use windows::Win32::Foundation::{CloseHandle, MAX_PATH};
use windows::Win32::Media::Audio::{
    eMultimedia, eRender, AudioSessionStateExpired, IAudioSessionControl, IAudioSessionControl2,
    IAudioSessionManager2, IMMDeviceEnumerator, MMDeviceEnumerator,
};
use windows::Win32::System::Com::{
    CoCreateInstance, CoInitializeEx, CoUninitialize, CLSCTX_ALL, COINIT_APARTMENTTHREADED,
};
use windows::Win32::System::Threading::{
    OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32, PROCESS_QUERY_LIMITED_INFORMATION,
};

/// COM initialization guard that uninitializes COM on drop.
pub struct ComGuard {
    initialized: bool,
}

impl ComGuard {
    /// Initialize COM for the current thread.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            // Use apartment-threaded for UI compatibility
            CoInitializeEx(None, COINIT_APARTMENTTHREADED)
                .ok()
                .map_err(AudioError::ComInitFailed)?;
        }
        Ok(Self { initialized: true })
    }
}

impl Drop for ComGuard {
    fn drop(&mut self) {
        if self.initialized {
            unsafe {
                CoUninitialize();
            }
        }
    }
}

/// Session enumerator for the default playback device.
pub struct SessionEnumerator {
    enumerator: IMMDeviceEnumerator,
}

impl SessionEnumerator {
    /// Create a new SessionEnumerator.
    ///
    /// Note: COM must be initialized before calling this function.
    pub fn new() -> Result<Self, AudioError> {
        unsafe {
            let enumerator: IMMDeviceEnumerator =
                CoCreateInstance(&MMDeviceEnumerator, None, CLSCTX_ALL)
                    .map_err(AudioError::EnumerationFailed)?;

            Ok(Self { enumerator })
        }
    }

    /// Activate the session manager of the current default render device.
    ///
    /// Queried on every call so a change of default device is picked up.
    fn session_manager(&self) -> Result<IAudioSessionManager2, AudioError> {
        unsafe {
            let device = self
                .enumerator
                .GetDefaultAudioEndpoint(eRender, eMultimedia)
                .map_err(|_| AudioError::NoDefaultDevice)?;

            device
                .Activate(CLSCTX_ALL, None)
                .map_err(AudioError::EnumerationFailed)
        }
    }

    /// Wrap one session control, or `None` if it is expired or lacks controls.
    fn to_audio_session(control: IAudioSessionControl) -> Option<AudioSession> {
        unsafe {
            if control.GetState().ok()? == AudioSessionStateExpired {
                return None;
            }

            let control2: IAudioSessionControl2 = control.cast().ok()?;
            let process_id = control2.GetProcessId().unwrap_or(0);

            // pid 0 is the system sounds session
            let process = if process_id == 0 {
                None
            } else {
                let name = process_image_name(process_id)
                    .unwrap_or_else(|| format!("Process {}", process_id));
                Some(SessionProcess {
                    name,
                    id: process_id,
                })
            };

            let volume = SessionVolume::new(&control).ok()?;
            let meter = SessionMeter::new(&control).ok()?;

            Some(AudioSession::new(process, Box::new(volume), Box::new(meter)))
        }
    }
}

impl SessionProvider for SessionEnumerator {
    fn list_sessions(&self) -> Result<Vec<AudioSession>, AudioError> {
        let manager = self.session_manager()?;

        unsafe {
            let sessions = manager
                .GetSessionEnumerator()
                .map_err(AudioError::EnumerationFailed)?;
            let count = sessions.GetCount().map_err(AudioError::EnumerationFailed)?;

            let mut result = Vec::with_capacity(count.max(0) as usize);
            for i in 0..count {
                let control = sessions.GetSession(i).map_err(AudioError::EnumerationFailed)?;
                match Self::to_audio_session(control) {
                    Some(session) => result.push(session),
                    None => tracing::trace!(index = i, "skipping session without controls"),
                }
            }

            Ok(result)
        }
    }
}

/// Executable file name of a process, e.g. `chrome.exe`.
fn process_image_name(pid: u32) -> Option<String> {
    unsafe {
        let handle = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;
        let mut buffer = [0u16; MAX_PATH as usize];
        let mut size = buffer.len() as u32;

        let queried = QueryFullProcessImageNameW(
            handle,
            PROCESS_NAME_WIN32,
            PWSTR(buffer.as_mut_ptr()),
            &mut size,
        );
        let _ = CloseHandle(handle);
        queried.ok()?;

        let full_path = String::from_utf16_lossy(&buffer[..size as usize]);
        full_path
            .rsplit('\\')
            .next()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
    }
}
