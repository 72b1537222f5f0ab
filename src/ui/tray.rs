//! System tray icon management.
//!
//! Manages the tray icon, its tooltip and the Restore / Start with Windows /
//! Quit context menu.

use crate::platform::icons;
use std::sync::mpsc::{channel, Receiver, Sender};
use thiserror::Error;
use tray_icon::{
    menu::{CheckMenuItem, Menu, MenuEvent, MenuId, MenuItem, PredefinedMenuItem},
    TrayIcon, TrayIconBuilder, TrayIconEvent,
};

/// Default tooltip text.
pub const TOOLTIP: &str = "Volume Mixer";

/// Events from the system tray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrayEvent {
    /// Left-click on tray icon
    LeftClick,

    /// Menu item selected
    MenuItemClicked { id: MenuItemId },
}

/// Menu item identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuItemId {
    Restore,
    StartWithWindows,
    Quit,
}

/// Tray service error types.
#[derive(Debug, Error)]
pub enum TrayError {
    #[error("Failed to create tray icon: {0}")]
    CreateFailed(String),

    #[error("Failed to load icon: {0}")]
    IconLoadFailed(String),

    #[error("Tray icon not initialized")]
    NotInitialized,

    #[error("Failed to create menu: {0}")]
    MenuFailed(String),
}

/// System tray manager.
pub struct TrayManager {
    tray_icon: Option<TrayIcon>,
    event_sender: Sender<TrayEvent>,
    event_receiver: Receiver<TrayEvent>,
    menu_ids: Vec<(MenuId, MenuItemId)>,
    startup_item: Option<CheckMenuItem>,
}

impl TrayManager {
    /// Create a new TrayManager.
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            tray_icon: None,
            event_sender: sender,
            event_receiver: receiver,
            menu_ids: Vec::new(),
            startup_item: None,
        }
    }

    /// Create and show the tray icon.
    pub fn create(&mut self, start_with_windows: bool) -> Result<(), TrayError> {
        let icon = icons::create_tray_icon().map_err(TrayError::IconLoadFailed)?;

        let menu = Menu::new();

        let restore_item = MenuItem::new("Restore", true, None);
        self.menu_ids
            .push((restore_item.id().clone(), MenuItemId::Restore));
        menu.append(&restore_item)
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        let startup_item =
            CheckMenuItem::new("Start with Windows", true, start_with_windows, None);
        self.menu_ids
            .push((startup_item.id().clone(), MenuItemId::StartWithWindows));
        self.startup_item = Some(startup_item.clone());
        menu.append(&startup_item)
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        let quit_item = MenuItem::new("Quit", true, None);
        self.menu_ids.push((quit_item.id().clone(), MenuItemId::Quit));
        menu.append(&quit_item)
            .map_err(|e| TrayError::MenuFailed(e.to_string()))?;

        let tray_icon = TrayIconBuilder::new()
            .with_icon(icon)
            .with_tooltip(TOOLTIP)
            .with_menu(Box::new(menu))
            .build()
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;

        self.tray_icon = Some(tray_icon);

        Ok(())
    }

    /// Process tray icon events. Call this from the event loop.
    pub fn process_events(&self) {
        while let Ok(event) = TrayIconEvent::receiver().try_recv() {
            if let TrayIconEvent::Click {
                button: tray_icon::MouseButton::Left,
                button_state: tray_icon::MouseButtonState::Up,
                ..
            } = event
            {
                let _ = self.event_sender.send(TrayEvent::LeftClick);
            }
        }

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            if let Some((_, id)) = self.menu_ids.iter().find(|(menu_id, _)| *menu_id == event.id) {
                let _ = self
                    .event_sender
                    .send(TrayEvent::MenuItemClicked { id: *id });
            }
        }
    }

    /// Get the event receiver for tray events.
    pub fn events(&self) -> &Receiver<TrayEvent> {
        &self.event_receiver
    }

    /// Update the tooltip text.
    pub fn set_tooltip(&mut self, text: &str) -> Result<(), TrayError> {
        let tray = self.tray_icon.as_mut().ok_or(TrayError::NotInitialized)?;
        tray.set_tooltip(Some(text))
            .map_err(|e| TrayError::CreateFailed(e.to_string()))?;
        Ok(())
    }

    /// Update the "Start with Windows" menu item checkmark.
    pub fn set_startup_checked(&mut self, checked: bool) {
        if let Some(ref item) = self.startup_item {
            item.set_checked(checked);
        }
    }
}

impl Default for TrayManager {
    fn default() -> Self {
        Self::new()
    }
}
