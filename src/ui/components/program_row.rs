//! Program row UI component.
//!
//! Renders one program: name, mute button, volume slider and level meter.

use super::LevelMeter;
use crate::app::{ProgramRow, RowAction};
use crate::ui::Theme;
use eframe::egui::{self, SliderClamping};

const NAME_WIDTH: f32 = 120.0;
const ROW_HEIGHT: f32 = 30.0;
const SLIDER_WIDTH: f32 = 200.0;
const METER_WIDTH: f32 = 100.0;

/// Program row component.
pub struct ProgramRowView;

impl ProgramRowView {
    /// Render a program row and return the action triggered, if any.
    pub fn show(ui: &mut egui::Ui, theme: &Theme, row: &ProgramRow) -> Option<RowAction> {
        let mut action = None;

        egui::Frame::none()
            .inner_margin(5.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    // Name label
                    egui::Frame::none()
                        .fill(theme.surface)
                        .rounding(5.0)
                        .inner_margin(5.0)
                        .show(ui, |ui| {
                            ui.set_width(NAME_WIDTH - 10.0);
                            ui.add(
                                egui::Label::new(
                                    egui::RichText::new(&row.name)
                                        .strong()
                                        .size(15.0)
                                        .color(theme.text_primary),
                                )
                                .truncate(),
                            );
                        });

                    // Mute button
                    let fill = if row.muted {
                        theme.error
                    } else {
                        theme.button
                    };
                    let mute = egui::Button::new(egui::RichText::new("M").color(theme.text_primary))
                        .fill(fill)
                        .rounding(ROW_HEIGHT / 2.0)
                        .min_size(egui::vec2(ROW_HEIGHT, ROW_HEIGHT));
                    if ui.add(mute).on_hover_text("Mute").clicked() {
                        action = Some(RowAction::ToggleMute(row.name.clone()));
                    }

                    // Volume slider
                    let mut volume = row.volume_pct;
                    ui.spacing_mut().slider_width = SLIDER_WIDTH;
                    let response = ui.add(
                        egui::Slider::new(&mut volume, 0..=100)
                            .show_value(false)
                            .clamping(SliderClamping::Always),
                    );
                    if response.changed() {
                        action = Some(RowAction::SetVolume(row.name.clone(), volume));
                    }

                    ui.add_space(10.0);
                    LevelMeter::show(ui, theme, row.meter_pct, METER_WIDTH, ROW_HEIGHT / 2.0);
                });
            });

        action
    }
}
