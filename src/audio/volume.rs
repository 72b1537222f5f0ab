//! Session volume control using ISimpleAudioVolume.

use super::session::{AudioError, VolumeControl};
use windows::core::{Interface, GUID};
use windows::Win32::Media::Audio::{IAudioSessionControl, ISimpleAudioVolume};

/// Event context passed with our own volume writes.
pub const MIXER_EVENT_CONTEXT: GUID = GUID::from_u128(0x5c2f1e8a_93b4_4d71_a0c6_2e7d9b1f4a30);

/// Volume controller for a specific audio session.
pub struct SessionVolume {
    simple_volume: ISimpleAudioVolume,
}

impl SessionVolume {
    /// Create a new SessionVolume for the given session control.
    pub fn new(control: &IAudioSessionControl) -> Result<Self, AudioError> {
        let simple_volume: ISimpleAudioVolume = control
            .cast()
            .map_err(|_| AudioError::VolumeNotAvailable)?;

        Ok(Self { simple_volume })
    }
}

impl VolumeControl for SessionVolume {
    fn volume(&self) -> Result<f32, AudioError> {
        unsafe {
            self.simple_volume
                .GetMasterVolume()
                .map_err(AudioError::WindowsError)
        }
    }

    fn set_volume(&self, level: f32) -> Result<(), AudioError> {
        let level = level.clamp(0.0, 1.0);
        unsafe {
            self.simple_volume
                .SetMasterVolume(level, &MIXER_EVENT_CONTEXT)
                .map_err(AudioError::WindowsError)
        }
    }
}
