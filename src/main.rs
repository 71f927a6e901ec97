//! Day Timeline - a draggable, virtualized strip of calendar days.

mod core;
mod gui;

use core::config::AppSettings;
use gui::DayTimelineApp;

fn main() -> eframe::Result<()> {
    // Respects RUST_LOG when set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .filter_module("egui", log::LevelFilter::Info) // Suppress egui DEBUG spam
        .filter_module("eframe", log::LevelFilter::Info)
        .format_timestamp_millis()
        .init();

    let settings = AppSettings::load();
    log::info!(
        "Day Timeline starting (config: {})",
        AppSettings::settings_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<none>".to_string())
    );

    let (width, height) = settings.window_size.unwrap_or((1200.0, 520.0));
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([width, height])
            .with_min_inner_size([480.0, 360.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Day Timeline",
        options,
        Box::new(|cc| Ok(Box::new(DayTimelineApp::new(cc, settings)?))),
    )
}
