//! Day index model.
//!
//! Turns a calendar range and an event list into the gapless sequence of
//! day slots that every other part of the timeline addresses by index.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::TimelineError;

/// An event supplied by the data source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Stable event identifier
    pub id: String,
    /// Calendar day the event takes place on
    pub date: NaiveDate,
    /// Optional venue
    #[serde(default)]
    pub location: Option<String>,
    /// Optional display title
    #[serde(default)]
    pub title: Option<String>,
}

impl EventRecord {
    /// Create an event with only the required fields.
    pub fn new(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            date,
            location: None,
            title: None,
        }
    }
}

/// One slot of the timeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DayDescriptor {
    /// Calendar day of this slot
    pub date: NaiveDate,
    /// Position in the sequence (0-based)
    pub index: usize,
    /// Whether an event takes place on this day
    pub has_event: bool,
    /// Id of the event attached to this day, if any
    pub event_id: Option<String>,
}

impl DayDescriptor {
    /// Event id of this day when it carries one.
    pub fn event(&self) -> Option<&str> {
        self.event_id.as_deref()
    }
}

/// Immutable, gapless sequence of days covering an inclusive date range.
///
/// When several events share a day, the first one in input order is the one
/// attached to the slot. Every in-range event id can still be resolved to its
/// day through [`DaySequence::index_of_event`].
#[derive(Clone, Debug)]
pub struct DaySequence {
    days: Vec<DayDescriptor>,
    event_index: HashMap<String, usize>,
}

impl DaySequence {
    /// Build the sequence for `start..=end`.
    ///
    /// Events outside the range are ignored.
    pub fn build(
        events: &[EventRecord],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self, TimelineError> {
        if start > end {
            return Err(TimelineError::InvalidRange { start, end });
        }

        let mut first_by_date: HashMap<NaiveDate, &str> = HashMap::new();
        let mut event_index: HashMap<String, usize> = HashMap::new();

        for event in events.iter().filter(|e| e.date >= start && e.date <= end) {
            first_by_date.entry(event.date).or_insert(event.id.as_str());

            let index = (event.date - start).num_days() as usize;
            event_index.entry(event.id.clone()).or_insert(index);
        }

        let days = start
            .iter_days()
            .take_while(|date| *date <= end)
            .enumerate()
            .map(|(index, date)| {
                let event_id = first_by_date.get(&date).map(|id| id.to_string());
                DayDescriptor {
                    date,
                    index,
                    has_event: event_id.is_some(),
                    event_id,
                }
            })
            .collect::<Vec<_>>();

        log::debug!(
            "Built day sequence {}..={} ({} days, {} events in range)",
            start,
            end,
            days.len(),
            event_index.len()
        );

        Ok(Self { days, event_index })
    }

    /// Build the sequence from January 1 of `first_year` through December 31
    /// of `last_year`.
    pub fn for_years(
        events: &[EventRecord],
        first_year: i32,
        last_year: i32,
    ) -> Result<Self, TimelineError> {
        let invalid = TimelineError::InvalidYears {
            first_year,
            last_year,
        };
        if first_year > last_year {
            return Err(invalid);
        }

        let start = NaiveDate::from_ymd_opt(first_year, 1, 1).ok_or_else(|| invalid.clone())?;
        let end = NaiveDate::from_ymd_opt(last_year, 12, 31).ok_or(invalid)?;
        Self::build(events, start, end)
    }

    /// Number of days in the sequence.
    pub fn len(&self) -> usize {
        self.days.len()
    }

    /// Always false for a successfully built sequence.
    #[allow(dead_code)] // Pairs with len(); nothing needs it while sequences are never empty
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// All days in order.
    #[allow(dead_code)] // Only read by tests; callers index through get()
    pub fn days(&self) -> &[DayDescriptor] {
        &self.days
    }

    /// Day at `index`, if it exists.
    pub fn get(&self, index: usize) -> Option<&DayDescriptor> {
        self.days.get(index)
    }

    /// First day of the range.
    pub fn start(&self) -> NaiveDate {
        self.days[0].date
    }

    /// Last day of the range.
    pub fn end(&self) -> NaiveDate {
        self.days[self.days.len() - 1].date
    }

    /// Index of `date`, or `None` when it lies outside the range.
    pub fn index_of_date(&self, date: NaiveDate) -> Option<usize> {
        if date < self.start() || date > self.end() {
            return None;
        }
        Some((date - self.start()).num_days() as usize)
    }

    /// Index of the day an event takes place on.
    pub fn index_of_event(&self, event_id: &str) -> Option<usize> {
        self.event_index.get(event_id).copied()
    }

    /// First event day on or after `date`, wrapping around to the earliest
    /// event day when nothing lies ahead.
    pub fn next_event_from(&self, date: NaiveDate) -> Option<usize> {
        let mut event_days = self.days.iter().filter(|d| d.has_event);
        let first = event_days.clone().next()?;

        event_days
            .find(|d| d.date >= date)
            .or(Some(first))
            .map(|d| d.index)
    }

    /// Number of days that carry an event.
    pub fn event_day_count(&self) -> usize {
        self.days.iter().filter(|d| d.has_event).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_build_is_gapless_and_indexed() {
        let seq = DaySequence::build(&[], date(2024, 2, 27), date(2024, 3, 2)).unwrap();

        // 2024 is a leap year: 27, 28, 29 Feb, 1, 2 Mar
        assert_eq!(seq.len(), 5);
        for (i, day) in seq.days().iter().enumerate() {
            assert_eq!(day.index, i);
            assert!(!day.has_event);
        }
        assert_eq!(seq.get(2).unwrap().date, date(2024, 2, 29));
        assert_eq!(seq.start(), date(2024, 2, 27));
        assert_eq!(seq.end(), date(2024, 3, 2));
    }

    #[test]
    fn test_build_single_day() {
        let seq = DaySequence::build(&[], date(2025, 6, 1), date(2025, 6, 1)).unwrap();
        assert_eq!(seq.len(), 1);
        assert!(!seq.is_empty());
    }

    #[test]
    fn test_build_rejects_inverted_range() {
        let result = DaySequence::build(&[], date(2025, 6, 2), date(2025, 6, 1));
        assert!(matches!(result, Err(TimelineError::InvalidRange { .. })));
    }

    #[test]
    fn test_events_outside_range_are_ignored() {
        let events = vec![
            EventRecord::new("before", date(2023, 12, 31)),
            EventRecord::new("inside", date(2024, 1, 3)),
            EventRecord::new("after", date(2024, 2, 1)),
        ];
        let seq = DaySequence::build(&events, date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(seq.event_day_count(), 1);
        assert_eq!(seq.get(2).unwrap().event(), Some("inside"));
        assert_eq!(seq.index_of_event("before"), None);
        assert_eq!(seq.index_of_event("after"), None);
    }

    #[test]
    fn test_first_event_of_a_day_wins() {
        let events = vec![
            EventRecord::new("b", date(2024, 1, 5)),
            EventRecord::new("a", date(2024, 1, 5)),
        ];
        let seq = DaySequence::build(&events, date(2024, 1, 1), date(2024, 1, 10)).unwrap();

        assert_eq!(seq.get(4).unwrap().event(), Some("b"));
        // The shadowed event still resolves to its day
        assert_eq!(seq.index_of_event("a"), Some(4));
        assert_eq!(seq.index_of_event("b"), Some(4));
    }

    #[test]
    fn test_build_is_deterministic() {
        let events = vec![
            EventRecord::new("x", date(2024, 3, 1)),
            EventRecord::new("y", date(2024, 3, 1)),
            EventRecord::new("z", date(2024, 3, 9)),
        ];
        let a = DaySequence::build(&events, date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        let b = DaySequence::build(&events, date(2024, 3, 1), date(2024, 3, 31)).unwrap();
        assert_eq!(a.days(), b.days());
    }

    #[test]
    fn test_for_years_covers_full_years() {
        let seq = DaySequence::for_years(&[], 2024, 2030).unwrap();
        // 2024 and 2028 are leap years
        assert_eq!(seq.len(), 7 * 365 + 2);
        assert_eq!(seq.start(), date(2024, 1, 1));
        assert_eq!(seq.end(), date(2030, 12, 31));

        assert!(matches!(
            DaySequence::for_years(&[], 2030, 2024),
            Err(TimelineError::InvalidYears { .. })
        ));
    }

    #[test]
    fn test_index_of_date() {
        let seq = DaySequence::build(&[], date(2024, 1, 1), date(2024, 12, 31)).unwrap();
        assert_eq!(seq.index_of_date(date(2024, 1, 1)), Some(0));
        assert_eq!(seq.index_of_date(date(2024, 3, 1)), Some(60));
        assert_eq!(seq.index_of_date(date(2025, 1, 1)), None);
    }

    #[test]
    fn test_next_event_from_prefers_upcoming() {
        let events = vec![
            EventRecord::new("past", date(2024, 1, 2)),
            EventRecord::new("future", date(2024, 1, 20)),
        ];
        let seq = DaySequence::build(&events, date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(seq.next_event_from(date(2024, 1, 10)), Some(19));
        assert_eq!(seq.next_event_from(date(2024, 1, 20)), Some(19));
    }

    #[test]
    fn test_next_event_from_wraps_to_first() {
        let events = vec![
            EventRecord::new("first", date(2024, 1, 2)),
            EventRecord::new("second", date(2024, 1, 5)),
        ];
        let seq = DaySequence::build(&events, date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert_eq!(seq.next_event_from(date(2024, 1, 25)), Some(1));
    }

    #[test]
    fn test_next_event_from_without_events() {
        let seq = DaySequence::build(&[], date(2024, 1, 1), date(2024, 1, 31)).unwrap();
        assert_eq!(seq.next_event_from(date(2024, 1, 1)), None);
    }
}
