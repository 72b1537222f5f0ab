//! Overlay window implementation using eframe/egui.
//!
//! Frameless, transparent window listing one row per program. Dragging the
//! background moves the window; closing it saves the geometry and quits.

use super::components::ProgramRowView;
use super::tray::{MenuItemId, TrayEvent, TrayManager};
use super::Theme;
use crate::app::AppState;
use crate::audio::SessionProvider;
use crate::platform::{SettingsFile, StartupRegistration, WindowGeometry};
use eframe::egui;
use std::time::Instant;

/// Overlay window state.
pub struct MixerWindow<P> {
    app: AppState<P>,
    tray: TrayManager,
    startup: StartupRegistration,
    settings_file: Option<SettingsFile>,
    theme: Theme,
    saved: bool,
}

impl<P: SessionProvider> MixerWindow<P> {
    /// Create the window around the application state.
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        app: AppState<P>,
        settings_file: Option<SettingsFile>,
    ) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);

        let startup = StartupRegistration::new();
        let mut tray = TrayManager::new();
        if let Err(e) = tray.create(startup.is_enabled()) {
            tracing::error!(error = %e, "failed to create tray icon");
        }

        Self {
            app,
            tray,
            startup,
            settings_file,
            theme,
            saved: false,
        }
    }

    fn handle_tray(&mut self, ctx: &egui::Context) {
        self.tray.process_events();

        while let Ok(event) = self.tray.events().try_recv() {
            match event {
                TrayEvent::LeftClick
                | TrayEvent::MenuItemClicked {
                    id: MenuItemId::Restore,
                } => {
                    ctx.send_viewport_cmd(egui::ViewportCommand::Visible(true));
                    ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(false));
                    ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
                }
                TrayEvent::MenuItemClicked {
                    id: MenuItemId::StartWithWindows,
                } => self.toggle_startup(),
                TrayEvent::MenuItemClicked {
                    id: MenuItemId::Quit,
                } => self.app.should_exit = true,
            }
        }
    }

    fn toggle_startup(&mut self) {
        let enabled = !self.startup.is_enabled();
        match self.startup.set_enabled(enabled) {
            Ok(()) => {
                self.app.settings.start_with_windows = enabled;
                self.save_settings();
            }
            Err(e) => tracing::warn!(error = %e, "failed to update startup registration"),
        }
        self.tray.set_startup_checked(self.startup.is_enabled());
    }

    fn remember_geometry(&mut self, ctx: &egui::Context) {
        if let Some(rect) = ctx.input(|i| i.viewport().outer_rect) {
            self.app.settings.window = Some(WindowGeometry {
                x: rect.min.x,
                y: rect.min.y,
                width: rect.width(),
                height: rect.height(),
            });
        }
    }

    fn save_settings(&self) {
        let Some(ref file) = self.settings_file else {
            return;
        };
        match file.save(&self.app.settings) {
            Ok(()) => tracing::debug!(path = %file.path().display(), "saved settings"),
            Err(e) => tracing::warn!(error = %e, "failed to save settings"),
        }
    }

    fn shutdown(&mut self, ctx: &egui::Context) {
        if self.saved {
            return;
        }
        self.remember_geometry(ctx);
        self.save_settings();
        self.saved = true;
    }

    fn show_rows(&mut self, ctx: &egui::Context) {
        let mut actions = Vec::new();

        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(egui::Color32::TRANSPARENT))
            .show(ctx, |ui| {
                // Background drag moves the frameless window
                let drag = ui.interact(
                    ui.max_rect(),
                    ui.id().with("window_drag"),
                    egui::Sense::drag(),
                );
                if drag.drag_started() {
                    ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
                }

                for row in self.app.rows.iter() {
                    if let Some(action) = ProgramRowView::show(ui, &self.theme, row) {
                        actions.push(action);
                    }
                }
            });

        for action in actions {
            self.app.apply_action(action);
        }
    }
}

impl<P: SessionProvider> eframe::App for MixerWindow<P> {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        egui::Rgba::TRANSPARENT.to_array()
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_tray(ctx);

        let now = Instant::now();
        if self.app.tick(now) {
            if let Err(e) = self.tray.set_tooltip(&self.app.tooltip()) {
                tracing::debug!(error = %e, "failed to update tooltip");
            }
        }

        self.show_rows(ctx);

        if ctx.input(|i| i.viewport().close_requested()) {
            self.shutdown(ctx);
        }

        if self.app.should_exit {
            self.shutdown(ctx);
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        ctx.request_repaint_after(self.app.scheduler.time_until_next(Instant::now()));
    }
}
