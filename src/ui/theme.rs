//! Overlay styling and theme colors.

use eframe::egui;

/// Overlay theme colors.
pub struct Theme {
    /// Row background behind the name label
    pub surface: egui::Color32,

    /// Primary accent color
    pub accent: egui::Color32,

    /// Text primary color
    pub text_primary: egui::Color32,

    /// Mute button when not muted
    pub button: egui::Color32,

    /// Level meter fill
    pub meter: egui::Color32,

    /// Level meter track (translucent)
    pub meter_background: egui::Color32,

    /// Warning color (yellow)
    pub warning: egui::Color32,

    /// Error/muted color (red)
    pub error: egui::Color32,

    /// Border color
    pub border: egui::Color32,
}

impl Theme {
    /// Create the dark overlay theme.
    pub fn dark() -> Self {
        Self {
            surface: egui::Color32::from_rgb(51, 51, 51),
            accent: egui::Color32::from_rgb(176, 196, 222),
            text_primary: egui::Color32::WHITE,
            button: egui::Color32::from_rgb(85, 85, 85),
            meter: egui::Color32::from_rgb(102, 205, 170),
            meter_background: egui::Color32::from_rgba_unmultiplied(224, 224, 224, 150),
            warning: egui::Color32::from_rgb(245, 158, 11),
            error: egui::Color32::from_rgb(220, 38, 38),
            border: egui::Color32::from_rgb(153, 153, 153),
        }
    }

    /// Apply the theme to an egui context.
    pub fn apply(&self, ctx: &egui::Context) {
        let mut style = (*ctx.style()).clone();

        // Transparent panels, rows paint their own backgrounds
        style.visuals.panel_fill = egui::Color32::TRANSPARENT;
        style.visuals.window_fill = egui::Color32::TRANSPARENT;

        // Slider track and handle
        style.visuals.widgets.inactive.bg_fill = self.accent;
        style.visuals.widgets.hovered.bg_fill = egui::Color32::WHITE;
        style.visuals.widgets.active.bg_fill = egui::Color32::WHITE;
        style.visuals.selection.bg_fill = self.accent;

        style.visuals.widgets.noninteractive.fg_stroke.color = self.text_primary;

        ctx.set_style(style);
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
