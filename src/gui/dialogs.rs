//! Modal error dialog.
//!
//! Shows an [`AppError`] with an expandable report and, when loading the
//! same file again might help, a retry button.

use eframe::egui;
use std::time::{Duration, Instant};

use crate::core::error::AppError;

/// How long the "copied" confirmation stays visible.
const COPY_FEEDBACK_DURATION: Duration = Duration::from_secs(2);

/// Button pressed in the error dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDialogAction {
    /// Load the same file again
    Retry,
    /// Dialog dismissed
    Close,
}

/// What the error dialog shows, and how far it is unfolded.
#[derive(Debug, Clone, Default)]
pub struct ErrorDialogState {
    /// The error on display; the dialog is open while this is set
    error: Option<AppError>,
    /// Report section unfolded
    details_expanded: bool,
    /// Last copy of the report to the clipboard
    copied_at: Option<Instant>,
}

impl ErrorDialogState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the dialog with the given error, replacing any previous one.
    pub fn show(&mut self, error: AppError) {
        log::warn!("{}: {}", error.dialog_title(), error.brief_description());
        self.error = Some(error);
        self.details_expanded = false;
        self.copied_at = None;
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.error.is_some()
    }

    #[allow(dead_code)] // Only read by tests; the renderer reads the field directly
    pub fn error(&self) -> Option<&AppError> {
        self.error.as_ref()
    }

    fn copy_feedback_visible(&self) -> bool {
        self.copied_at
            .is_some_and(|at| at.elapsed() < COPY_FEEDBACK_DURATION)
    }
}

/// Renders the open error, if any, as a modal.
pub struct ErrorDialogRenderer<'a> {
    state: &'a mut ErrorDialogState,
    success_color: egui::Color32,
}

impl<'a> ErrorDialogRenderer<'a> {
    pub fn new(state: &'a mut ErrorDialogState, success_color: egui::Color32) -> Self {
        Self {
            state,
            success_color,
        }
    }

    /// Render the dialog and return the action taken, if any.
    ///
    /// Escape and clicks on the backdrop close recoverable errors.
    pub fn render(&mut self, ctx: &egui::Context) -> Option<ErrorDialogAction> {
        let error = self.state.error.clone()?;

        let modal = egui::Modal::new(egui::Id::new("error_dialog")).show(ctx, |ui| {
            ui.set_width(420.0);
            ui.heading(format!("⚠ {}", error.dialog_title()));
            ui.add_space(8.0);

            ui.label(egui::RichText::new(error.brief_description()).size(14.0));
            if let Some(path) = error.file_path() {
                ui.label(egui::RichText::new(path.display().to_string()).weak().monospace());
            }
            ui.add_space(8.0);

            self.render_details(ui, &error);
            ui.separator();
            self.render_buttons(ui, &error)
        });

        let action = modal.inner.or_else(|| {
            (modal.should_close() && error.is_recoverable()).then_some(ErrorDialogAction::Close)
        });

        if action.is_some() {
            self.state.close();
        }
        action
    }

    /// Collapsible report with a copy button.
    fn render_details(&mut self, ui: &mut egui::Ui, error: &AppError) {
        let arrow = if self.state.details_expanded { "▼" } else { "▶" };
        if ui
            .add(egui::Button::new(format!("{} Details", arrow)).frame(false))
            .clicked()
        {
            self.state.details_expanded = !self.state.details_expanded;
        }

        if !self.state.details_expanded {
            return;
        }

        let report = error.detailed_info();
        egui::Frame::new()
            .fill(ui.visuals().extreme_bg_color)
            .inner_margin(8.0)
            .corner_radius(4.0)
            .show(ui, |ui| {
                ui.add(egui::Label::new(egui::RichText::new(&report).monospace()).wrap());
            });

        ui.horizontal(|ui| {
            if ui.button("📋 Copy").on_hover_text("Copy the report").clicked() {
                ui.ctx().copy_text(report.clone());
                self.state.copied_at = Some(Instant::now());
            }
            if self.state.copy_feedback_visible() {
                ui.colored_label(self.success_color, "Copied");
                ui.ctx().request_repaint_after(COPY_FEEDBACK_DURATION);
            }
        });
        ui.add_space(4.0);
    }

    fn render_buttons(&self, ui: &mut egui::Ui, error: &AppError) -> Option<ErrorDialogAction> {
        let mut action = None;

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if error.is_recoverable() && ui.button("Close").clicked() {
                action = Some(ErrorDialogAction::Close);
            }
            if error.supports_retry()
                && ui
                    .button("🔄 Retry")
                    .on_hover_text("Load the file again")
                    .clicked()
            {
                action = Some(ErrorDialogAction::Retry);
            }
        });

        action
    }
}
