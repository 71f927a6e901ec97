//! GUI module for the day timeline.
//!
//! This module contains the egui-based user interface: the main application
//! window, the day strip renderer, the navigation bar, the settings window and the error dialog.

mod app;
mod controls;
mod dialogs;
mod settings;
mod timeline;

pub use app::DayTimelineApp;
