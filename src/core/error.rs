//! Error types for the timeline engine and user-facing error handling.
//!
//! `TimelineError` covers construction failures of the day model. `AppError`
//! wraps everything the GUI can surface in an error dialog, with detailed
//! information and recovery options.

use chrono::NaiveDate;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::parser::{ParseError, SUPPORTED_VERSION};

/// Errors raised while building the timeline model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimelineError {
    /// The requested range ends before it starts.
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange {
        /// First day of the requested range
        start: NaiveDate,
        /// Last day of the requested range
        end: NaiveDate,
    },

    /// A year-based range could not be turned into calendar dates.
    #[error("invalid year range: {first_year}..={last_year}")]
    InvalidYears { first_year: i32, last_year: i32 },
}

/// Which side of the settings round trip failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsOperation {
    Load,
    Save,
}

impl fmt::Display for SettingsOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load => f.write_str("load"),
            Self::Save => f.write_str("save"),
        }
    }
}

/// Line and column of a syntax error in an event file (both 1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextPosition {
    pub line: usize,
    pub column: usize,
}

/// Everything the app can report to the user.
#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("event file not found: {}", .path.display())]
    EventFileNotFound { path: PathBuf },

    #[error("cannot read event file {}: {reason}", .path.display())]
    EventFileUnreadable { path: PathBuf, reason: String },

    /// The file is not a usable event list
    #[error("malformed event file: {message}")]
    MalformedEventFile {
        path: Option<PathBuf>,
        message: String,
        /// Where the JSON parser gave up, when it knows
        position: Option<TextPosition>,
    },

    #[error("unsupported event file version {found}")]
    UnsupportedVersion { path: Option<PathBuf>, found: u32 },

    /// The configured years cannot produce a timeline
    #[error(transparent)]
    Calendar(#[from] TimelineError),

    #[error("could not {operation} settings: {reason}")]
    Settings {
        operation: SettingsOperation,
        reason: String,
    },
}

impl AppError {
    /// Build the error for a failed read of an event file.
    pub fn from_io(path: PathBuf, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::EventFileNotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::EventFileUnreadable {
                path,
                reason: "permission denied".to_string(),
            },
            _ => Self::EventFileUnreadable {
                path,
                reason: error.to_string(),
            },
        }
    }

    /// Build the error for event file content the parser rejected.
    pub fn from_parse(path: Option<PathBuf>, error: &ParseError) -> Self {
        match error {
            ParseError::JsonSyntax(e) => Self::MalformedEventFile {
                path,
                message: e.to_string(),
                // serde_json reports line 0 for errors without a position
                position: (e.line() > 0).then(|| TextPosition {
                    line: e.line(),
                    column: e.column(),
                }),
            },
            ParseError::MissingField { field, position } => Self::MalformedEventFile {
                path,
                message: format!("event #{} has no \"{}\"", position, field),
                position: None,
            },
            ParseError::UnsupportedVersion { version } => Self::UnsupportedVersion {
                path,
                found: *version,
            },
        }
    }

    pub fn settings(operation: SettingsOperation, reason: impl fmt::Display) -> Self {
        Self::Settings {
            operation,
            reason: reason.to_string(),
        }
    }

    /// False when dismissing the dialog would leave nothing to browse.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Calendar(_))
    }

    /// Whether loading the same file again might succeed.
    pub fn supports_retry(&self) -> bool {
        matches!(
            self,
            Self::EventFileNotFound { .. } | Self::EventFileUnreadable { .. }
        )
    }

    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::EventFileNotFound { path } | Self::EventFileUnreadable { path, .. } => {
                Some(path)
            }
            Self::MalformedEventFile { path, .. } | Self::UnsupportedVersion { path, .. } => {
                path.as_deref()
            }
            Self::Calendar(_) | Self::Settings { .. } => None,
        }
    }

    pub fn dialog_title(&self) -> &'static str {
        match self {
            Self::EventFileNotFound { .. } => "Event File Not Found",
            Self::EventFileUnreadable { .. } => "Cannot Read Event File",
            Self::MalformedEventFile { .. } => "Invalid Event File",
            Self::UnsupportedVersion { .. } => "Unsupported Version",
            Self::Calendar(_) => "Invalid Calendar Range",
            Self::Settings { .. } => "Settings Error",
        }
    }

    /// One sentence for the dialog body and the status bar.
    pub fn brief_description(&self) -> String {
        match self {
            Self::EventFileNotFound { path } => {
                format!("'{}' does not exist.", short_name(path))
            }
            Self::EventFileUnreadable { path, .. } => {
                format!("'{}' could not be read.", short_name(path))
            }
            Self::MalformedEventFile { message, .. } => message.clone(),
            Self::UnsupportedVersion { found, .. } => format!(
                "Event file version {} is not supported (expected {}).",
                found, SUPPORTED_VERSION
            ),
            Self::Calendar(e) => e.to_string(),
            Self::Settings { .. } => self.to_string(),
        }
    }

    /// Multi-line report for the dialog's details section.
    pub fn detailed_info(&self) -> String {
        let mut fields: Vec<(&str, String)> = vec![
            ("Error", self.dialog_title().to_string()),
            ("Summary", self.brief_description()),
        ];

        if let Some(path) = self.file_path() {
            fields.push(("Path", path.display().to_string()));
        }

        match self {
            Self::EventFileUnreadable { reason, .. } | Self::Settings { reason, .. } => {
                fields.push(("Reason", reason.clone()));
            }
            Self::MalformedEventFile {
                position: Some(position),
                ..
            } => {
                fields.push(("Line", position.line.to_string()));
                fields.push(("Column", position.column.to_string()));
            }
            Self::UnsupportedVersion { found, .. } => {
                fields.push(("Found", found.to_string()));
                fields.push(("Supported", SUPPORTED_VERSION.to_string()));
            }
            _ => {}
        }

        fields
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn short_name(path: &Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}
