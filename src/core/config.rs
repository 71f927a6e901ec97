//! Configuration and settings module.
//!
//! This module handles persistent settings: timeline geometry and feel,
//! color customization, recent files, and saving/loading them to disk.

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::error::{AppError, SettingsOperation};
use super::motion::{MotionConfig, SpringConfig};
use super::timeline::{DEFAULT_BUFFER_ITEMS, DEFAULT_ITEM_WIDTH, TimelineConfig};

/// Directory name under the user's config directory.
const SETTINGS_DIR: &str = "day-timeline";

/// Settings filename for persistence.
const SETTINGS_FILENAME: &str = "config.json";

/// Maximum number of recent files to track.
const MAX_RECENT_FILES: usize = 10;

/// Allowed slot widths in pixels.
pub const ITEM_WIDTH_RANGE: (f32, f32) = (80.0, 480.0);
/// Allowed number of buffer slots per side.
pub const BUFFER_ITEMS_RANGE: (usize, usize) = (1, 60);
/// Calendar years the timeline can span.
pub const YEAR_RANGE: (i32, i32) = (1900, 2200);

/// An sRGB color, stored in the settings file as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub fn color(self) -> Color32 {
        let [r, g, b] = self.0;
        Color32::from_rgb(r, g, b)
    }

    /// Same color with straight (unmultiplied) alpha.
    pub fn alpha(self, alpha: u8) -> Color32 {
        let [r, g, b] = self.0;
        Color32::from_rgba_unmultiplied(r, g, b, alpha)
    }
}

/// Colors used by the strip, the bars and the status line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Rgb,
    pub header_background: Rgb,
    /// Fill of an ordinary day slot
    pub slot: Rgb,
    /// Dot on days that carry an event
    pub event_marker: Rgb,
    /// Center lens
    pub accent: Rgb,
    /// Outline of the selected event day
    pub selection: Rgb,
    pub today: Rgb,
    pub text_primary: Rgb,
    /// Weekday names and hints
    pub text_dim: Rgb,
    pub status_success: Rgb,
    pub status_error: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb([24, 24, 27]),
            header_background: Rgb([39, 39, 42]),
            slot: Rgb([52, 52, 58]),
            event_marker: Rgb([59, 130, 246]),
            accent: Rgb([234, 88, 12]),
            selection: Rgb([96, 165, 250]),
            today: Rgb([249, 115, 22]),
            text_primary: Rgb([228, 228, 231]),
            text_dim: Rgb([113, 113, 122]),
            status_success: Rgb([76, 175, 80]),
            status_error: Rgb([244, 67, 54]),
        }
    }
}

/// Timeline geometry, calendar range and drag feel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineSettings {
    /// Width of one day slot in pixels
    pub item_width: f32,
    /// Extra slots rendered on each side of the viewport
    pub buffer_items: usize,
    /// First calendar year shown (from January 1)
    pub first_year: i32,
    /// Last calendar year shown (through December 31)
    pub last_year: i32,
    /// Spring stiffness for settles and programmatic scrolls
    pub spring_stiffness: f32,
    /// Spring damping for settles and programmatic scrolls
    pub spring_damping: f32,
    /// Fraction of pointer movement applied past either end (0.0 to 1.0)
    pub drag_elastic: f32,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            item_width: DEFAULT_ITEM_WIDTH,
            buffer_items: DEFAULT_BUFFER_ITEMS,
            first_year: 2024,
            last_year: 2030,
            spring_stiffness: 50.0,
            spring_damping: 15.0,
            drag_elastic: 0.1,
        }
    }
}

impl TimelineSettings {
    /// Engine configuration with every value pulled into its valid range.
    pub fn to_timeline_config(&self) -> TimelineConfig {
        let motion = MotionConfig {
            spring: SpringConfig {
                stiffness: self.spring_stiffness.clamp(1.0, 500.0),
                damping: self.spring_damping.clamp(0.0, 100.0),
                ..SpringConfig::default()
            },
            drag_elastic: self.drag_elastic.clamp(0.0, 1.0),
            ..MotionConfig::default()
        };

        TimelineConfig {
            item_width: self.item_width.clamp(ITEM_WIDTH_RANGE.0, ITEM_WIDTH_RANGE.1),
            buffer_items: self
                .buffer_items
                .clamp(BUFFER_ITEMS_RANGE.0, BUFFER_ITEMS_RANGE.1),
            motion,
        }
    }

    /// Calendar range as (first, last) year, ordered and clamped.
    pub fn year_range(&self) -> (i32, i32) {
        let first = self.first_year.clamp(YEAR_RANGE.0, YEAR_RANGE.1);
        let last = self.last_year.clamp(YEAR_RANGE.0, YEAR_RANGE.1);
        (first.min(last), first.max(last))
    }

    pub fn set_item_width(&mut self, width: f32) {
        self.item_width = width.clamp(ITEM_WIDTH_RANGE.0, ITEM_WIDTH_RANGE.1);
    }

    pub fn set_buffer_items(&mut self, count: usize) {
        self.buffer_items = count.clamp(BUFFER_ITEMS_RANGE.0, BUFFER_ITEMS_RANGE.1);
    }

    /// Set the calendar range; a reversed pair is swapped.
    pub fn set_years(&mut self, first_year: i32, last_year: i32) {
        self.first_year = first_year;
        self.last_year = last_year;
        (self.first_year, self.last_year) = self.year_range();
    }
}

/// Application settings including timeline tuning and user preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Timeline geometry and feel.
    #[serde(default)]
    pub timeline: TimelineSettings,

    /// Strip and status colors.
    #[serde(default)]
    pub colors: Palette,

    /// Whether crossings produce the tick pulse.
    #[serde(default = "default_sound_enabled")]
    pub sound_enabled: bool,

    /// Recently opened event files (most recent first).
    #[serde(default)]
    pub recent_files: Vec<PathBuf>,

    /// Window size to restore on startup (width, height).
    #[serde(default)]
    pub window_size: Option<(f32, f32)>,
}

fn default_sound_enabled() -> bool {
    true
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            timeline: TimelineSettings::default(),
            colors: Palette::default(),
            sound_enabled: default_sound_enabled(),
            recent_files: Vec::new(),
            window_size: None,
        }
    }
}

impl AppSettings {
    /// `<config dir>/day-timeline/config.json`, if the platform has a config dir.
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(SETTINGS_DIR).join(SETTINGS_FILENAME))
    }

    /// Load settings from disk.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error.
    pub fn try_load() -> Result<Self, AppError> {
        let Some(path) = Self::settings_path() else {
            return Ok(Self::default());
        };
        let failed = |e: &dyn std::fmt::Display| {
            AppError::settings(SettingsOperation::Load, format!("{}: {}", path.display(), e))
        };

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).map_err(|e| failed(&e)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(failed(&e)),
        }
    }

    /// Load settings from disk, returning defaults if loading fails.
    pub fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            log::warn!("{}", e.brief_description());
            Self::default()
        })
    }

    /// Save settings to disk, creating the config directory on first use.
    pub fn save(&self) -> Result<(), AppError> {
        let save_error = |reason: String| AppError::settings(SettingsOperation::Save, reason);

        let path = Self::settings_path()
            .ok_or_else(|| save_error("no config directory on this system".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| save_error(format!("{}: {}", parent.display(), e)))?;
        }

        let content = serde_json::to_string_pretty(self).map_err(|e| save_error(e.to_string()))?;
        std::fs::write(&path, content)
            .map_err(|e| save_error(format!("{}: {}", path.display(), e)))?;

        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Put `path` first in the recent list, dropping older duplicates and
    /// anything past the cap.
    pub fn add_recent_file(&mut self, path: PathBuf) {
        self.recent_files.retain(|p| p != &path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }

    pub fn clear_recent_files(&mut self) {
        self.recent_files.clear();
    }

    pub fn set_window_size(&mut self, width: f32, height: f32) {
        self.window_size = Some((width, height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_conversion() {
        let color = Rgb([255, 128, 64]);
        assert_eq!(color.color(), Color32::from_rgb(255, 128, 64));
        assert_eq!(
            color.alpha(100),
            Color32::from_rgba_unmultiplied(255, 128, 64, 100)
        );
    }

    #[test]
    fn test_settings_path_ends_with_app_dir() {
        if let Some(path) = AppSettings::settings_path() {
            assert!(path.ends_with("day-timeline/config.json"));
        }
    }

    #[test]
    fn test_app_settings_default() {
        let settings = AppSettings::default();
        assert_eq!(settings.colors, Palette::default());
        assert_eq!(settings.timeline, TimelineSettings::default());
        assert!(settings.sound_enabled);
        assert!(settings.recent_files.is_empty());
        assert!(settings.window_size.is_none());
    }

    #[test]
    fn test_default_timeline_config_matches_engine_defaults() {
        let config = TimelineSettings::default().to_timeline_config();
        assert_eq!(config, TimelineConfig::default());
        assert_eq!(TimelineSettings::default().year_range(), (2024, 2030));
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let settings = TimelineSettings {
            item_width: 5.0,
            buffer_items: 0,
            spring_stiffness: -3.0,
            spring_damping: 1000.0,
            drag_elastic: 4.0,
            ..TimelineSettings::default()
        };

        let config = settings.to_timeline_config();
        assert_eq!(config.item_width, 80.0);
        assert_eq!(config.buffer_items, 1);
        assert_eq!(config.motion.spring.stiffness, 1.0);
        assert_eq!(config.motion.spring.damping, 100.0);
        assert_eq!(config.motion.drag_elastic, 1.0);
    }

    #[test]
    fn test_setters_clamp() {
        let mut settings = TimelineSettings::default();

        settings.set_item_width(1000.0);
        assert_eq!(settings.item_width, 480.0);

        settings.set_buffer_items(500);
        assert_eq!(settings.buffer_items, 60);

        settings.set_years(2030, 2020);
        assert_eq!((settings.first_year, settings.last_year), (2020, 2030));

        settings.set_years(1000, 9999);
        assert_eq!((settings.first_year, settings.last_year), (1900, 2200));
    }

    #[test]
    fn test_app_settings_reset() {
        let mut settings = AppSettings::default();
        settings.colors.accent = Rgb([0, 0, 0]);
        settings.timeline.item_width = 300.0;
        settings.sound_enabled = false;
        settings.recent_files.push(PathBuf::from("/test/events.json"));
        settings.window_size = Some((800.0, 600.0));

        settings.reset();

        assert_eq!(settings.colors.accent, Rgb([234, 88, 12]));
        assert_eq!(settings.timeline.item_width, 220.0);
        assert!(settings.sound_enabled);
        assert!(settings.recent_files.is_empty());
        assert!(settings.window_size.is_none());
    }

    #[test]
    fn test_settings_serialization() {
        let mut settings = AppSettings::default();
        settings.timeline.set_years(2025, 2026);
        settings.sound_enabled = false;
        settings.recent_files.push(PathBuf::from("/test/events.json"));
        settings.window_size = Some((1024.0, 768.0));

        let json = serde_json::to_string(&settings).unwrap();
        let restored: AppSettings = serde_json::from_str(&json).unwrap();

        assert_eq!(settings.colors, restored.colors);
        assert_eq!(restored.timeline.year_range(), (2025, 2026));
        assert!(!restored.sound_enabled);
        assert_eq!(restored.recent_files.len(), 1);
        assert_eq!(restored.window_size, Some((1024.0, 768.0)));
    }

    #[test]
    fn test_recent_files_add() {
        let mut settings = AppSettings::default();

        settings.add_recent_file(PathBuf::from("/test/a.json"));
        settings.add_recent_file(PathBuf::from("/test/b.json"));
        assert_eq!(settings.recent_files[0], PathBuf::from("/test/b.json"));

        // Re-adding moves to front without duplicating
        settings.add_recent_file(PathBuf::from("/test/a.json"));
        assert_eq!(settings.recent_files.len(), 2);
        assert_eq!(settings.recent_files[0], PathBuf::from("/test/a.json"));
        assert_eq!(settings.recent_files[1], PathBuf::from("/test/b.json"));
    }

    #[test]
    fn test_recent_files_max_limit() {
        let mut settings = AppSettings::default();
        for i in 0..15 {
            settings.add_recent_file(PathBuf::from(format!("/test/events{}.json", i)));
        }

        assert_eq!(settings.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(
            settings.recent_files[0],
            PathBuf::from("/test/events14.json")
        );

        settings.clear_recent_files();
        assert!(settings.recent_files.is_empty());
    }

    #[test]
    fn test_partial_config_deserialization() {
        // Files written before a field existed still load
        let old_json = r#"{"timeline":{"item_width":180.0},"colors":{"accent":[1,2,3]}}"#;

        let settings: AppSettings = serde_json::from_str(old_json).unwrap();

        assert_eq!(settings.timeline.item_width, 180.0);
        assert_eq!(settings.timeline.buffer_items, 15);
        assert_eq!(settings.colors.accent, Rgb([1, 2, 3]));
        assert_eq!(settings.colors.background, Palette::default().background);
        assert!(settings.sound_enabled);
        assert!(settings.window_size.is_none());
    }

    #[test]
    fn test_empty_config_deserialization() {
        let settings: AppSettings = serde_json::from_str("{}").unwrap();
        assert_eq!(settings.timeline, TimelineSettings::default());
    }
}
