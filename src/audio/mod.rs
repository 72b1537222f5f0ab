//! Audio module for Windows audio session interactions.
//!
//! This module provides the session abstraction consumed by the mixer and,
//! on Windows, its implementation over the Core Audio session API.

#[cfg(windows)]
pub mod capture;
#[cfg(windows)]
pub mod enumerator;
pub mod session;
#[cfg(windows)]
pub mod volume;

#[cfg(windows)]
pub use enumerator::{ComGuard, SessionEnumerator};
pub use session::{
    level_to_percent, AudioError, AudioSession, PeakMeter, SessionProcess, SessionProvider,
    VolumeControl,
};
