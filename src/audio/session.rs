//! Audio session data models.
//!
//! Defines what the mixer consumes from the operating system: a list of
//! audio sessions, each bound to a process and exposing a volume control and
//! a peak meter. The Windows implementation lives in `enumerator`.

use thiserror::Error;

/// Volume control for a single audio session.
pub trait VolumeControl {
    /// Get the current master volume (0.0 to 1.0).
    fn volume(&self) -> Result<f32, AudioError>;

    /// Set the master volume (0.0 to 1.0).
    fn set_volume(&self, level: f32) -> Result<(), AudioError>;
}

/// Peak meter for a single audio session.
pub trait PeakMeter {
    /// Get the peak amplitude of the most recent buffer (0.0 to 1.0).
    fn peak(&self) -> Result<f32, AudioError>;
}

/// Source of the currently active audio sessions.
pub trait SessionProvider {
    /// Enumerate all sessions on the default playback endpoint.
    fn list_sessions(&self) -> Result<Vec<AudioSession>, AudioError>;
}

/// Process that owns an audio session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProcess {
    /// Executable file name, e.g. `chrome.exe`
    pub name: String,

    /// Process ID
    pub id: u32,
}

/// An audio session as seen on one tick.
///
/// The capability handles are only valid until the next enumeration.
pub struct AudioSession {
    /// Backing process, `None` for the system sounds session
    pub process: Option<SessionProcess>,

    pub volume: Box<dyn VolumeControl>,

    pub meter: Box<dyn PeakMeter>,
}

impl AudioSession {
    /// Create a new AudioSession.
    pub fn new(
        process: Option<SessionProcess>,
        volume: Box<dyn VolumeControl>,
        meter: Box<dyn PeakMeter>,
    ) -> Self {
        Self {
            process,
            volume,
            meter,
        }
    }
}

impl std::fmt::Debug for AudioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioSession")
            .field("process", &self.process)
            .finish_non_exhaustive()
    }
}

/// Scale a 0.0..=1.0 level to a rounded 0..=100 percentage.
pub fn level_to_percent(level: f32) -> u8 {
    (level.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Audio service error types.
#[derive(Debug, Error)]
pub enum AudioError {
    #[cfg(windows)]
    #[error("COM initialization failed: {0}")]
    ComInitFailed(#[source] windows::core::Error),

    #[cfg(windows)]
    #[error("Failed to enumerate sessions: {0}")]
    EnumerationFailed(#[source] windows::core::Error),

    #[error("No default playback device available")]
    NoDefaultDevice,

    #[error("Volume control not available for session")]
    VolumeNotAvailable,

    #[error("Level meter not available for session")]
    MeterNotAvailable,

    #[error("Audio session has expired")]
    SessionExpired,

    #[cfg(windows)]
    #[error("Windows API error: {0}")]
    WindowsError(#[source] windows::core::Error),
}
