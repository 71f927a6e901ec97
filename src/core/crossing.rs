//! Center-crossing detection.
//!
//! Watches the centered index as the offset changes and reports each
//! transition into a different index exactly once. Several indices skipped
//! within one update are reported as a single crossing into the final index.

use chrono::{Datelike, Month, NaiveDate};
use std::fmt;

/// Fire-and-forget feedback played on every crossing.
///
/// Implementations must return promptly and swallow their own failures; the
/// timeline works the same with no sink at all.
pub trait TickSound {
    fn play_tick(&self);
}

/// Remembers the last index a crossing was reported for.
#[derive(Debug, Clone, Default)]
pub struct CrossingDetector {
    last_fired: Option<usize>,
}

impl CrossingDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe the current centered index.
    ///
    /// Returns `Some(index)` when it differs from the last reported one. The
    /// very first observation always fires.
    pub fn observe(&mut self, index: usize) -> Option<usize> {
        if self.last_fired == Some(index) {
            return None;
        }
        self.last_fired = Some(index);
        Some(index)
    }

    pub fn last_fired(&self) -> Option<usize> {
        self.last_fired
    }

    /// Forget the last crossing, so the next observation fires again.
    pub fn reset(&mut self) {
        self.last_fired = None;
    }
}

/// Month and year shown in the timeline header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MonthLabel {
    pub year: i32,
    /// 1..=12
    pub month: u32,
}

impl MonthLabel {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Full English month name.
    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("")
    }
}

impl fmt::Display for MonthLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month_name(), self.year)
    }
}

/// Reports the header label whenever the centered day enters another month.
#[derive(Debug, Clone, Default)]
pub struct MonthTracker {
    current: Option<MonthLabel>,
}

impl MonthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<MonthLabel> {
        self.current
    }

    pub fn observe(&mut self, date: NaiveDate) -> Option<MonthLabel> {
        let label = MonthLabel::of(date);
        if self.current == Some(label) {
            return None;
        }
        self.current = Some(label);
        Some(label)
    }

    pub fn reset(&mut self) {
        self.current = None;
    }
}
