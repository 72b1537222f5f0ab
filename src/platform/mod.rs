//! Platform module for settings and Windows utilities.
//!
//! This module contains the settings file and, on Windows, startup
//! registration and tray icon generation.

#[cfg(windows)]
pub mod icons;
#[cfg(windows)]
pub mod registry;
pub mod settings;

#[cfg(windows)]
pub use registry::{StartupError, StartupRegistration};
pub use settings::{Settings, SettingsError, SettingsFile, WindowGeometry};
