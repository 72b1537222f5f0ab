//! UI module for the mixer window and system tray.
//!
//! This module provides the overlay window, the tray icon and the
//! reusable row components.

pub mod components;
pub mod theme;
pub mod tray;
pub mod window;

pub use theme::Theme;
pub use tray::{MenuItemId, TrayError, TrayEvent, TrayManager};
pub use window::MixerWindow;
