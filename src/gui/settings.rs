//! Settings window.
//!
//! Edits a draft copy of the timeline settings; nothing reaches the engine
//! until the user applies it.

use eframe::egui;

use crate::core::config::{
    BUFFER_ITEMS_RANGE, ITEM_WIDTH_RANGE, TimelineSettings, YEAR_RANGE,
};

/// Actions that can be triggered from the settings window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsAction {
    /// Push the draft to the timeline and save it
    Apply,
    /// Forget the recent files list
    ClearRecentFiles,
    /// Restore every setting to its default
    ResetDefaults,
}

/// State of the settings window.
#[derive(Debug, Clone, Default)]
pub struct SettingsWindowState {
    open: bool,
    /// Settings being edited
    draft: TimelineSettings,
}

impl SettingsWindowState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the window on a copy of the current settings.
    pub fn open(&mut self, current: &TimelineSettings) {
        self.draft = current.clone();
        self.open = true;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn draft(&self) -> &TimelineSettings {
        &self.draft
    }

    /// Whether the draft differs from the settings in use.
    pub fn is_dirty(&self, current: &TimelineSettings) -> bool {
        &self.draft != current
    }
}

/// Renderer for the settings window.
pub struct SettingsRenderer<'a> {
    state: &'a mut SettingsWindowState,
    current: &'a TimelineSettings,
    has_recent_files: bool,
}

impl<'a> SettingsRenderer<'a> {
    pub fn new(
        state: &'a mut SettingsWindowState,
        current: &'a TimelineSettings,
        has_recent_files: bool,
    ) -> Self {
        Self {
            state,
            current,
            has_recent_files,
        }
    }

    /// Render the window and return the action taken, if any.
    pub fn render(&mut self, ctx: &egui::Context) -> Option<SettingsAction> {
        if !self.state.is_open() {
            return None;
        }

        let mut action: Option<SettingsAction> = None;
        let mut open = self.state.open;

        egui::Window::new("Settings")
            .id(egui::Id::new("settings_window"))
            .open(&mut open)
            .default_width(360.0)
            .resizable(false)
            .collapsible(false)
            .show(ctx, |ui| {
                self.render_fields(ui);

                ui.add_space(8.0);
                ui.separator();

                ui.horizontal(|ui| {
                    ui.add_enabled_ui(self.has_recent_files, |ui| {
                        if ui.button("Clear recent files").clicked() {
                            action = Some(SettingsAction::ClearRecentFiles);
                        }
                    });

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let dirty = self.state.is_dirty(self.current);
                        if ui.add_enabled(dirty, egui::Button::new("Apply")).clicked() {
                            action = Some(SettingsAction::Apply);
                        }
                        if ui
                            .button("Reset defaults")
                            .on_hover_text("Also forgets the recent files")
                            .clicked()
                        {
                            action = Some(SettingsAction::ResetDefaults);
                            self.state.draft = TimelineSettings::default();
                        }
                    });
                });
            });

        self.state.open = open;
        action
    }

    fn render_fields(&mut self, ui: &mut egui::Ui) {
        let draft = &mut self.state.draft;

        egui::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Day width");
                let mut item_width = draft.item_width;
                if ui
                    .add(
                        egui::Slider::new(&mut item_width, ITEM_WIDTH_RANGE.0..=ITEM_WIDTH_RANGE.1)
                            .suffix(" px"),
                    )
                    .changed()
                {
                    draft.set_item_width(item_width);
                }
                ui.end_row();

                ui.label("Buffer days");
                let mut buffer_items = draft.buffer_items;
                if ui
                    .add(egui::Slider::new(
                        &mut buffer_items,
                        BUFFER_ITEMS_RANGE.0..=BUFFER_ITEMS_RANGE.1,
                    ))
                    .on_hover_text("Days kept ready on each side of the view")
                    .changed()
                {
                    draft.set_buffer_items(buffer_items);
                }
                ui.end_row();

                ui.label("Years");
                let (mut first_year, mut last_year) = (draft.first_year, draft.last_year);
                let changed = ui
                    .horizontal(|ui| {
                        let first = ui.add(
                            egui::DragValue::new(&mut first_year).range(YEAR_RANGE.0..=YEAR_RANGE.1),
                        );
                        ui.label("to");
                        let last = ui.add(
                            egui::DragValue::new(&mut last_year).range(YEAR_RANGE.0..=YEAR_RANGE.1),
                        );
                        first.changed() || last.changed()
                    })
                    .inner;
                if changed {
                    draft.set_years(first_year, last_year);
                }
                ui.end_row();

                ui.label("Spring stiffness");
                ui.add(egui::Slider::new(&mut draft.spring_stiffness, 1.0..=500.0));
                ui.end_row();

                ui.label("Spring damping");
                ui.add(egui::Slider::new(&mut draft.spring_damping, 0.0..=100.0));
                ui.end_row();

                ui.label("Edge resistance");
                ui.add(egui::Slider::new(&mut draft.drag_elastic, 0.0..=1.0))
                    .on_hover_text("Share of the drag applied past either end");
                ui.end_row();
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_window_starts_closed() {
        let state = SettingsWindowState::new();
        assert!(!state.is_open());
    }

    #[test]
    fn test_open_copies_current_settings() {
        let mut current = TimelineSettings::default();
        current.set_item_width(300.0);

        let mut state = SettingsWindowState::new();
        state.open(&current);

        assert!(state.is_open());
        assert_eq!(state.draft(), &current);
        assert!(!state.is_dirty(&current));
    }

    #[test]
    fn test_edited_draft_is_dirty() {
        let current = TimelineSettings::default();
        let mut state = SettingsWindowState::new();
        state.open(&current);

        state.draft.set_buffer_items(4);
        assert!(state.is_dirty(&current));
    }
}
