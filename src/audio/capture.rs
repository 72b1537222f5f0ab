//! Session level metering.
//!
//! Provides peak metering using IAudioMeterInformation.

use super::session::{AudioError, PeakMeter};
use windows::core::Interface;
use windows::Win32::Media::Audio::{Endpoints::IAudioMeterInformation, IAudioSessionControl};

/// Level meter for a specific audio session.
pub struct SessionMeter {
    meter_info: IAudioMeterInformation,
}

impl SessionMeter {
    /// Create a new SessionMeter for the given session control.
    pub fn new(control: &IAudioSessionControl) -> Result<Self, AudioError> {
        let meter_info: IAudioMeterInformation = control
            .cast()
            .map_err(|_| AudioError::MeterNotAvailable)?;

        Ok(Self { meter_info })
    }
}

impl PeakMeter for SessionMeter {
    fn peak(&self) -> Result<f32, AudioError> {
        unsafe {
            self.meter_info
                .GetPeakValue()
                .map_err(AudioError::WindowsError)
        }
    }
}
