//! Navigation controls module.
//!
//! This module handles the rendering and interaction of the bottom bar:
//! day stepping, the Today and next-event jumps, the tick toggle and the
//! legend for the slot markers.

use eframe::egui;

use crate::core::config::Palette;
use crate::core::days::DayDescriptor;

/// User actions that can be triggered from the controls panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    /// Scroll one day back
    PreviousDay,
    /// Scroll one day forward
    NextDay,
    /// Scroll to today's slot
    JumpToToday,
    /// Scroll to the next event from today
    JumpToNextEvent,
    /// Turn the crossing tick on or off
    ToggleSound,
    /// Drop the selected event
    ClearSelection,
}

/// Renders navigation controls and returns any action triggered by the user.
pub struct ControlsRenderer<'a> {
    /// Day currently under the center lens
    centered: Option<&'a DayDescriptor>,
    /// Total number of days on the timeline
    total_days: usize,
    /// Number of days that carry an event
    event_days: usize,
    /// Whether the crossing tick is enabled
    sound_enabled: bool,
    /// Whether an event is selected
    has_selection: bool,
    colors: &'a Palette,
}

impl<'a> ControlsRenderer<'a> {
    pub fn new(
        centered: Option<&'a DayDescriptor>,
        total_days: usize,
        event_days: usize,
        sound_enabled: bool,
        has_selection: bool,
        colors: &'a Palette,
    ) -> Self {
        Self {
            centered,
            total_days,
            event_days,
            sound_enabled,
            has_selection,
            colors,
        }
    }

    /// Render the controls and return any triggered action.
    pub fn render(&self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action: Option<ControlAction> = None;

        ui.horizontal(|ui| {
            action = self.render_navigation_buttons(ui).or(action);
            ui.separator();
            self.render_position(ui);
            ui.separator();
            action = self.render_toggles(ui).or(action);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                self.render_legend(ui);
            });
        });

        action
    }

    fn render_navigation_buttons(&self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action: Option<ControlAction> = None;

        if ui.button("◀").on_hover_text("Previous day (←)").clicked() {
            action = Some(ControlAction::PreviousDay);
        }
        if ui.button("Today").on_hover_text("Go to today (T)").clicked() {
            action = Some(ControlAction::JumpToToday);
        }
        ui.add_enabled_ui(self.event_days > 0, |ui| {
            if ui
                .button("Next event")
                .on_hover_text("Go to the next event from today (E)")
                .clicked()
            {
                action = Some(ControlAction::JumpToNextEvent);
            }
        });
        if ui.button("▶").on_hover_text("Next day (→)").clicked() {
            action = Some(ControlAction::NextDay);
        }

        action
    }

    /// Current day and its position in the range.
    fn render_position(&self, ui: &mut egui::Ui) {
        match self.centered {
            Some(day) => ui.label(format!(
                "{}  ({} / {})",
                day.date.format("%Y-%m-%d"),
                day.index + 1,
                self.total_days
            )),
            None => ui.label("No days"),
        };
    }

    fn render_toggles(&self, ui: &mut egui::Ui) -> Option<ControlAction> {
        let mut action: Option<ControlAction> = None;

        let mut sound_enabled = self.sound_enabled;
        if ui
            .checkbox(&mut sound_enabled, "Tick")
            .on_hover_text("Flash the center lens on every day crossed")
            .changed()
        {
            action = Some(ControlAction::ToggleSound);
        }

        ui.add_enabled_ui(self.has_selection, |ui| {
            if ui.button("Clear selection").clicked() {
                action = Some(ControlAction::ClearSelection);
            }
        });

        action
    }

    /// Legend for the slot markers (laid out right to left).
    fn render_legend(&self, ui: &mut egui::Ui) {
        ui.label("Today");
        legend_swatch(ui, self.colors.today.color());
        ui.add_space(8.0);
        ui.label("Event");
        legend_swatch(ui, self.colors.event_marker.color());
    }
}

fn legend_swatch(ui: &mut egui::Ui, color: egui::Color32) {
    let (rect, _) = ui.allocate_exact_size(egui::vec2(10.0, 10.0), egui::Sense::hover());
    ui.painter().circle_filled(rect.center(), 4.0, color);
}
