//! Volume Mixer - Library
//!
//! A per-application volume mixer overlay for Windows.
//!
//! ## Features
//!
//! - One row per program, merging all of its audio sessions
//! - Volume slider, mute button and peak level meter per program
//! - Friendly names and exclusions for well-known executables
//! - Programs appear and disappear as their sessions come and go
//! - Tray icon with Restore, Start with Windows and Quit
//! - Window geometry remembered between runs

pub mod app;
pub mod audio;
pub mod mixer;
pub mod platform;
#[cfg(windows)]
pub mod ui;

pub use app::{AppState, ProgramRow, RowAction};
pub use audio::{AudioError, AudioSession, SessionProvider};
pub use mixer::{CommandOutcome, Mixer, MixerEvent, MixerListener, ProgramResolver};
pub use platform::{Settings, SettingsError, SettingsFile};
#[cfg(windows)]
pub use ui::{MixerWindow, TrayEvent, TrayManager};
