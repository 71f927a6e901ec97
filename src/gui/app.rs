//! Main application state and GUI logic.
//!
//! This module defines the main application struct and implements the
//! eframe::App trait. The app owns the selected event id (the parent side of
//! the selection sync), feeds it to the [`Timeline`] every frame and reacts
//! to the events the timeline reports back.

use chrono::{Local, NaiveDate};
use eframe::egui;
use std::path::{Path, PathBuf};

use crate::core::config::{AppSettings, TimelineSettings};
use crate::core::crossing::TickSound;
use crate::core::days::{DaySequence, EventRecord};
use crate::core::error::{AppError, TimelineError};
use crate::core::motion::MotionState;
use crate::core::parser;
use crate::core::timeline::{Timeline, TimelineEvent};

use super::controls::{ControlAction, ControlsRenderer};
use super::dialogs::{ErrorDialogAction, ErrorDialogRenderer, ErrorDialogState};
use super::settings::{SettingsAction, SettingsRenderer, SettingsWindowState};
use super::timeline::{PulseTick, StripInput, TimelineRenderer};

/// Longest frame step fed to the motion controller, in seconds.
const MAX_FRAME_DT: f32 = 0.1;

/// Rate at which the center lens flash fades (per second).
const PULSE_DECAY: f32 = 6.0;

/// Application state indicating whether an event file is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AppState {
    /// Bare calendar, no event file loaded yet
    #[default]
    NoFileLoaded,
    /// An event file has been loaded onto the timeline
    Ready,
}

impl AppState {
    /// Returns true if the events side panel has anything to list.
    pub fn show_event_list(&self) -> bool {
        matches!(self, AppState::Ready)
    }
}

/// Kind of status message to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Success message (shown in green)
    Success,
    /// Error message (shown in red)
    Error,
}

/// A status message with its kind and timestamp.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    /// When the message was created (for auto-dismiss)
    pub created_at: std::time::Instant,
}

impl StatusMessage {
    /// Duration to show status messages before auto-dismissing.
    const DISPLAY_DURATION: std::time::Duration = std::time::Duration::from_secs(5);

    pub fn new(text: impl Into<String>, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: std::time::Instant::now(),
        }
    }

    /// Check if the message should still be displayed.
    pub fn is_visible(&self) -> bool {
        self.created_at.elapsed() < Self::DISPLAY_DURATION
    }
}

/// Build the day sequence for the configured calendar range.
fn build_days(
    settings: &TimelineSettings,
    events: &[EventRecord],
) -> Result<DaySequence, TimelineError> {
    let (first_year, last_year) = settings.year_range();
    DaySequence::for_years(events, first_year, last_year)
}

/// Crossing sink for the timeline, or none when the tick is switched off.
fn tick_sink(pulse: &PulseTick, enabled: bool) -> Option<Box<dyn TickSound>> {
    enabled.then(|| Box::new(pulse.clone()) as Box<dyn TickSound>)
}

fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "file".to_string())
}

/// Main application state and GUI logic.
pub struct DayTimelineApp {
    settings: AppSettings,
    state: AppState,
    timeline: Timeline,
    /// Loaded events, sorted by date
    events: Vec<EventRecord>,
    loaded_file_path: Option<PathBuf>,
    /// File to load again when the error dialog's retry is pressed
    retry_path: Option<PathBuf>,
    /// The externally owned selection fed to the timeline
    selected_event: Option<String>,
    status_message: Option<StatusMessage>,
    error_dialog: ErrorDialogState,
    settings_window: SettingsWindowState,
    /// Crossing sink shared with the timeline
    pulse: PulseTick,
    /// Center lens flash strength
    pulse_level: f32,
    today: NaiveDate,
}

impl DayTimelineApp {
    /// Create the application with an empty calendar centered on today.
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Result<Self, AppError> {
        let days = build_days(&settings.timeline, &[])?;
        let pulse = PulseTick::new();
        let timeline = Timeline::new(
            days,
            settings.timeline.to_timeline_config(),
            tick_sink(&pulse, settings.sound_enabled),
        );
        let today = Local::now().date_naive();

        let mut app = Self {
            settings,
            state: AppState::NoFileLoaded,
            timeline,
            events: Vec::new(),
            loaded_file_path: None,
            retry_path: None,
            selected_event: None,
            status_message: None,
            error_dialog: ErrorDialogState::new(),
            settings_window: SettingsWindowState::new(),
            pulse,
            pulse_level: 0.0,
            today,
        };

        let start = app.timeline.days().index_of_date(today).unwrap_or(0);
        let events = app.timeline.center_on(start);
        app.handle_timeline_events(events);
        // The initial placement is not a crossing the user should notice
        app.pulse.take();

        Ok(app)
    }

    /// Open a file dialog and load the selected event file.
    fn open_file_dialog(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Event list JSON", &["json"])
            .set_title("Open Event File")
            .pick_file()
        {
            self.load_file(path);
        }
    }

    /// Load an event file and rebuild the timeline around it.
    fn load_file(&mut self, path: PathBuf) {
        log::info!("Loading event file {}", path.display());

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                self.retry_path = Some(path.clone());
                self.error_dialog.show(AppError::from_io(path, e));
                return;
            }
        };

        let parsed = match parser::parse_events(&content) {
            Ok(parsed) => parsed,
            Err(e) => {
                self.error_dialog.show(AppError::from_parse(Some(path), &e));
                return;
            }
        };

        let days = match build_days(&self.settings.timeline, &parsed.events) {
            Ok(days) => days,
            Err(e) => {
                self.error_dialog.show(e.into());
                return;
            }
        };

        let on_timeline = days.event_day_count();
        let events = self.timeline.replace_days(days);
        self.handle_timeline_events(events);

        let mut records = parsed.events;
        records.sort_by_key(|e| e.date);
        if let Some(id) = self.selected_event.as_deref()
            && !records.iter().any(|e| e.id == id)
        {
            self.selected_event = None;
        }

        self.status_message = Some(StatusMessage::new(
            format!(
                "Loaded: {} ({} events, {} event days in range, {} skipped)",
                file_display_name(&path),
                records.len(),
                on_timeline,
                parsed.skipped
            ),
            StatusKind::Success,
        ));

        self.events = records;
        self.state = AppState::Ready;
        self.settings.add_recent_file(path.clone());
        self.loaded_file_path = Some(path);
        self.save_settings();
    }

    fn save_settings(&mut self) {
        if let Err(e) = self.settings.save() {
            self.status_message = Some(StatusMessage::new(e.brief_description(), StatusKind::Error));
        }
    }

    /// Switch to new timeline settings, rebuilding the days when the
    /// calendar range moved.
    fn apply_timeline_settings(&mut self, timeline: TimelineSettings) {
        let range_changed = timeline.year_range() != self.settings.timeline.year_range();
        self.settings.timeline = timeline;

        let events = self
            .timeline
            .set_config(self.settings.timeline.to_timeline_config());
        self.handle_timeline_events(events);

        if range_changed {
            match build_days(&self.settings.timeline, &self.events) {
                Ok(days) => {
                    let events = self.timeline.replace_days(days);
                    self.handle_timeline_events(events);
                }
                Err(e) => self.error_dialog.show(e.into()),
            }
        }

        self.save_settings();
    }

    fn handle_settings_action(&mut self, action: SettingsAction) {
        match action {
            SettingsAction::Apply => {
                let draft = self.settings_window.draft().clone();
                self.apply_timeline_settings(draft);
                self.status_message =
                    Some(StatusMessage::new("Settings applied", StatusKind::Success));
            }
            SettingsAction::ClearRecentFiles => {
                self.settings.clear_recent_files();
                self.save_settings();
            }
            SettingsAction::ResetDefaults => {
                let previous = self.settings.timeline.clone();
                self.settings.reset();
                let defaults = std::mem::replace(&mut self.settings.timeline, previous);
                self.timeline
                    .set_tick_sound(tick_sink(&self.pulse, self.settings.sound_enabled));
                self.apply_timeline_settings(defaults);
            }
        }
    }

    /// React to what the timeline reported.
    fn handle_timeline_events(&mut self, events: Vec<TimelineEvent>) {
        for event in events {
            match event {
                TimelineEvent::DaySelected(id) => {
                    self.selected_event = Some(id);
                }
                TimelineEvent::MonthChanged(label) => {
                    log::debug!("Header month {}", label);
                }
                TimelineEvent::WindowChanged(window) => {
                    log::trace!("Drawing {} slots from {}", window.len(), window.start_index);
                }
                TimelineEvent::CenteredIndexChanged { .. }
                | TimelineEvent::ScrollStarted { .. }
                | TimelineEvent::Settled { .. } => {}
            }
        }
    }

    /// Feed pointer gestures captured on the strip into the engine.
    fn apply_strip_input(&mut self, input: StripInput) {
        let mut events = self.timeline.set_viewport_width(input.viewport_width);

        if input.drag_started {
            self.timeline.drag_start();
        }
        if input.drag_delta != 0.0 {
            events.extend(self.timeline.drag_move(input.drag_delta));
        }
        if input.drag_released {
            self.timeline.drag_end();
        }
        if let Some(index) = input.clicked_index {
            events.extend(self.timeline.click(index));
        }

        self.handle_timeline_events(events);
    }

    /// Handle a control action triggered by user interaction.
    fn handle_control_action(&mut self, action: ControlAction) {
        let events = match action {
            ControlAction::PreviousDay => {
                let index = self.timeline.destination_index().saturating_sub(1);
                self.timeline.scroll_to_index(index)
            }
            ControlAction::NextDay => {
                let index = self.timeline.destination_index() + 1;
                self.timeline.scroll_to_index(index)
            }
            ControlAction::JumpToToday => {
                let events = self.timeline.jump_to_today(self.today);
                if events.is_empty() {
                    self.status_message = Some(StatusMessage::new(
                        "Today is outside the calendar range",
                        StatusKind::Error,
                    ));
                }
                events
            }
            ControlAction::JumpToNextEvent => {
                let events = self.timeline.jump_to_next_event(self.today);
                if events.is_empty() {
                    self.status_message = Some(StatusMessage::new(
                        "No events on the timeline",
                        StatusKind::Error,
                    ));
                }
                events
            }
            ControlAction::ToggleSound => {
                self.settings.sound_enabled = !self.settings.sound_enabled;
                self.timeline
                    .set_tick_sound(tick_sink(&self.pulse, self.settings.sound_enabled));
                self.save_settings();
                Vec::new()
            }
            ControlAction::ClearSelection => {
                self.selected_event = None;
                Vec::new()
            }
        };

        self.handle_timeline_events(events);
    }

    /// Handle keyboard shortcuts.
    fn handle_keyboard_shortcuts(&self, ctx: &egui::Context) -> Option<ControlAction> {
        if self.error_dialog.is_open() || ctx.wants_keyboard_input() {
            return None;
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowLeft) {
                return Some(ControlAction::PreviousDay);
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                return Some(ControlAction::NextDay);
            }
            if i.key_pressed(egui::Key::T) {
                return Some(ControlAction::JumpToToday);
            }
            if i.key_pressed(egui::Key::E) {
                return Some(ControlAction::JumpToNextEvent);
            }
            if i.key_pressed(egui::Key::Escape) {
                return Some(ControlAction::ClearSelection);
            }
            None
        })
    }

    /// Load the first dropped `.json` file, if any.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .find(|path| {
                    path.extension()
                        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
                })
        });

        if let Some(path) = dropped {
            self.load_file(path);
        }
    }
}

impl eframe::App for DayTimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.today = Local::now().date_naive();

        self.handle_dropped_files(ctx);
        if let Some(action) = self.handle_keyboard_shortcuts(ctx) {
            self.handle_control_action(action);
        }

        let dt = ctx.input(|i| i.stable_dt).min(MAX_FRAME_DT);
        let events = self.timeline.tick(dt);
        self.handle_timeline_events(events);

        let events = self
            .timeline
            .set_selected_event(self.selected_event.as_deref());
        self.handle_timeline_events(events);

        self.render_toolbar(ctx);
        self.render_controls(ctx);
        self.render_event_list(ctx);
        self.render_timeline(ctx);
        self.render_settings(ctx);
        self.render_error_dialog(ctx);

        if self.pulse.take() {
            self.pulse_level = 1.0;
        } else {
            self.pulse_level = (self.pulse_level - dt * PULSE_DECAY).max(0.0);
        }

        if let Some(rect) = ctx.input(|i| i.viewport().inner_rect) {
            self.settings.set_window_size(rect.width(), rect.height());
        }

        // Keep frames coming while anything moves; drags need them for velocity
        if self.timeline.motion_state() != MotionState::Idle || self.pulse_level > 0.0 {
            ctx.request_repaint();
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Err(e) = self.settings.save() {
            log::warn!("{}", e.brief_description());
        }
    }
}

impl DayTimelineApp {
    /// Render the top toolbar: file loading, recent files and status.
    fn render_toolbar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Day Timeline");
                ui.separator();

                if ui.button("📂 Open Events").clicked() {
                    self.open_file_dialog();
                }

                let mut recent_choice: Option<PathBuf> = None;
                ui.add_enabled_ui(!self.settings.recent_files.is_empty(), |ui| {
                    ui.menu_button("Recent", |ui| {
                        for path in &self.settings.recent_files {
                            if ui.button(file_display_name(path)).clicked() {
                                recent_choice = Some(path.clone());
                                ui.close();
                            }
                        }
                    });
                });
                if let Some(path) = recent_choice {
                    self.load_file(path);
                }

                if ui.button("⚙ Settings").clicked() {
                    self.settings_window.open(&self.settings.timeline);
                }

                if let Some(ref path) = self.loaded_file_path {
                    ui.separator();
                    ui.label(format!("File: {}", file_display_name(path)));
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    self.render_status_message(ui);
                });
            });
        });
    }

    /// Render the status message if one is active.
    fn render_status_message(&mut self, ui: &mut egui::Ui) {
        if self
            .status_message
            .as_ref()
            .is_some_and(|msg| !msg.is_visible())
        {
            self.status_message = None;
            return;
        }

        let msg_info = self.status_message.as_ref().map(|msg| {
            let color = match msg.kind {
                StatusKind::Success => self.settings.colors.status_success.color(),
                StatusKind::Error => self.settings.colors.status_error.color(),
            };
            (color, msg.text.clone())
        });

        if let Some((color, text)) = msg_info {
            let mut dismiss_clicked = false;
            ui.horizontal(|ui| {
                if ui.small_button("✕").clicked() {
                    dismiss_clicked = true;
                }
                ui.colored_label(color, &text);
            });
            if dismiss_clicked {
                self.status_message = None;
            }
        }
    }

    /// Render the bottom navigation bar.
    fn render_controls(&mut self, ctx: &egui::Context) {
        let mut action: Option<ControlAction> = None;

        egui::TopBottomPanel::bottom("controls")
            .min_height(36.0)
            .show(ctx, |ui| {
                let days = self.timeline.days();
                let renderer = ControlsRenderer::new(
                    self.timeline.centered_day(),
                    days.len(),
                    days.event_day_count(),
                    self.settings.sound_enabled,
                    self.selected_event.is_some(),
                    &self.settings.colors,
                );
                action = renderer.render(ui);
            });

        if let Some(action) = action {
            self.handle_control_action(action);
        }
    }

    /// Render the side list of loaded events; picking one selects it.
    fn render_event_list(&mut self, ctx: &egui::Context) {
        if !self.state.show_event_list() {
            return;
        }

        let mut picked: Option<String> = None;

        egui::SidePanel::right("events")
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Events");
                ui.separator();

                egui::ScrollArea::vertical().show(ui, |ui| {
                    for event in &self.events {
                        let in_range = self.timeline.days().index_of_event(&event.id).is_some();
                        let selected = self.selected_event.as_deref() == Some(event.id.as_str());
                        let text = format!(
                            "{}  {}",
                            event.date.format("%Y-%m-%d"),
                            event.title.as_deref().unwrap_or(&event.id)
                        );

                        ui.add_enabled_ui(in_range, |ui| {
                            if ui.selectable_label(selected, text).clicked() {
                                picked = Some(event.id.clone());
                            }
                        });
                    }
                });
            });

        if picked.is_some() {
            self.selected_event = picked;
        }
    }

    /// Render the central strip and the details of the centered day.
    fn render_timeline(&mut self, ctx: &egui::Context) {
        let mut input = StripInput::default();

        egui::CentralPanel::default().show(ctx, |ui| {
            let renderer = TimelineRenderer::new(
                &self.timeline,
                &self.settings.colors,
                self.selected_event.as_deref(),
                self.today,
                self.pulse_level,
            );
            input = renderer.render(ui);

            ui.add_space(12.0);
            self.render_day_details(ui);
        });

        self.apply_strip_input(input);
    }

    /// Events taking place on the centered day.
    fn render_day_details(&self, ui: &mut egui::Ui) {
        let Some(day) = self.timeline.centered_day() else {
            return;
        };

        let on_day: Vec<&EventRecord> = self.events.iter().filter(|e| e.date == day.date).collect();

        if on_day.is_empty() {
            let hint = match self.state {
                AppState::NoFileLoaded => {
                    "Drag and drop an event file (.json) here, or use \"Open Events\"."
                }
                AppState::Ready => "No events on this day.",
            };
            ui.colored_label(self.settings.colors.text_dim.color(), hint);
            return;
        }

        for event in on_day {
            ui.horizontal(|ui| {
                ui.strong(event.title.as_deref().unwrap_or(&event.id));
                if let Some(ref location) = event.location {
                    ui.separator();
                    ui.label(format!("📍 {}", location));
                }
            });
        }
    }

    fn render_settings(&mut self, ctx: &egui::Context) {
        let action = SettingsRenderer::new(
            &mut self.settings_window,
            &self.settings.timeline,
            !self.settings.recent_files.is_empty(),
        )
        .render(ctx);

        if let Some(action) = action {
            self.handle_settings_action(action);
        }
    }

    fn render_error_dialog(&mut self, ctx: &egui::Context) {
        let success = self.settings.colors.status_success.color();
        let action = ErrorDialogRenderer::new(&mut self.error_dialog, success).render(ctx);

        match action {
            Some(ErrorDialogAction::Retry) => {
                if let Some(path) = self.retry_path.take() {
                    self.load_file(path);
                }
            }
            Some(ErrorDialogAction::Close) => {
                self.retry_path = None;
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_default() {
        assert_eq!(AppState::default(), AppState::NoFileLoaded);
        assert!(!AppState::NoFileLoaded.show_event_list());
        assert!(AppState::Ready.show_event_list());
    }

    #[test]
    fn test_status_message_is_visible_when_new() {
        let message = StatusMessage::new("Loaded", StatusKind::Success);
        assert!(message.is_visible());
        assert_eq!(message.kind, StatusKind::Success);
    }

    #[test]
    fn test_build_days_uses_configured_years() {
        let mut settings = TimelineSettings::default();
        settings.set_years(2025, 2025);

        let days = build_days(&settings, &[]).unwrap();
        assert_eq!(days.len(), 365);
        assert_eq!(days.start(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn test_default_range_covers_seven_years() {
        let days = build_days(&TimelineSettings::default(), &[]).unwrap();
        // 2024 and 2028 are leap years
        assert_eq!(days.len(), 7 * 365 + 2);
    }

    #[test]
    fn test_file_display_name() {
        assert_eq!(file_display_name(Path::new("/a/b/events.json")), "events.json");
    }
}
