//! Selection sync between the timeline and the externally owned selection.
//!
//! Clicking an event day emits its id upward; the parent typically feeds the
//! same id straight back as the new selection. That echo must not scroll the
//! strip again, while a genuinely new external selection must.

use super::days::DayDescriptor;

/// What to do about an externally supplied selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// Same value as last time; nothing to do
    Unchanged,
    /// The parent echoed back the id this timeline just emitted
    EchoOfClick,
    /// The selection was removed
    Cleared,
    /// A new selection that should be scrolled into view
    Scroll(String),
}

/// Tracks which selection ids came from outside and which from our own clicks.
#[derive(Debug, Clone, Default)]
pub struct SelectionSync {
    last_external: Option<String>,
    last_internal: Option<String>,
}

impl SelectionSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last selection received from the parent.
    pub fn last_external(&self) -> Option<&str> {
        self.last_external.as_deref()
    }

    /// Record a click on `day`.
    ///
    /// Returns the event id to report as selected, or `None` for days without
    /// an event.
    pub fn record_click(&mut self, day: &DayDescriptor) -> Option<String> {
        let id = day.event_id.clone()?;
        self.last_internal = Some(id.clone());
        Some(id)
    }

    /// Classify a selection value supplied by the parent.
    ///
    /// A click only matches the next differing value; whatever that value
    /// is, the click is spent.
    pub fn apply_external(&mut self, selected: Option<&str>) -> SelectionChange {
        if self.last_external.as_deref() == selected {
            return SelectionChange::Unchanged;
        }
        self.last_external = selected.map(str::to_string);
        let clicked = self.last_internal.take();

        let Some(id) = selected else {
            return SelectionChange::Cleared;
        };

        if clicked.as_deref() == Some(id) {
            return SelectionChange::EchoOfClick;
        }

        SelectionChange::Scroll(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(index: usize, event_id: Option<&str>) -> DayDescriptor {
        DayDescriptor {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(index as u64),
            index,
            has_event: event_id.is_some(),
            event_id: event_id.map(str::to_string),
        }
    }

    #[test]
    fn test_click_on_event_day_emits_id() {
        let mut sync = SelectionSync::new();
        assert_eq!(sync.record_click(&day(4, Some("evt-4"))), Some("evt-4".to_string()));
        assert_eq!(sync.last_internal.as_deref(), Some("evt-4"));
    }

    #[test]
    fn test_click_on_empty_day_emits_nothing() {
        let mut sync = SelectionSync::new();
        assert_eq!(sync.record_click(&day(7, None)), None);
        assert_eq!(sync.last_internal.as_deref(), None);
    }

    #[test]
    fn test_echo_of_click_is_not_a_scroll() {
        let mut sync = SelectionSync::new();
        sync.record_click(&day(4, Some("evt-4")));

        assert_eq!(sync.apply_external(Some("evt-4")), SelectionChange::EchoOfClick);
        assert_eq!(sync.last_internal.as_deref(), None);
        // Re-rendering with the same value is not a change either
        assert_eq!(sync.apply_external(Some("evt-4")), SelectionChange::Unchanged);
    }

    #[test]
    fn test_external_change_requests_scroll() {
        let mut sync = SelectionSync::new();
        assert_eq!(
            sync.apply_external(Some("evt-50")),
            SelectionChange::Scroll("evt-50".to_string())
        );
        assert_eq!(sync.last_external(), Some("evt-50"));
        assert_eq!(sync.apply_external(Some("evt-50")), SelectionChange::Unchanged);
    }

    #[test]
    fn test_external_differs_from_click() {
        let mut sync = SelectionSync::new();
        sync.record_click(&day(4, Some("evt-4")));

        assert_eq!(
            sync.apply_external(Some("evt-9")),
            SelectionChange::Scroll("evt-9".to_string())
        );
        // The parent overrode the click; a later evt-4 is a real change
        assert_eq!(sync.last_internal.as_deref(), None);
        assert_eq!(
            sync.apply_external(Some("evt-4")),
            SelectionChange::Scroll("evt-4".to_string())
        );
    }

    #[test]
    fn test_click_on_already_selected_event_leaves_nothing_behind() {
        let mut sync = SelectionSync::new();
        sync.apply_external(Some("evt-4"));
        sync.record_click(&day(4, Some("evt-4")));

        // The echo carries the value the parent already had
        assert_eq!(sync.apply_external(Some("evt-4")), SelectionChange::Unchanged);
        assert_eq!(
            sync.apply_external(Some("evt-9")),
            SelectionChange::Scroll("evt-9".to_string())
        );
        assert_eq!(
            sync.apply_external(Some("evt-4")),
            SelectionChange::Scroll("evt-4".to_string())
        );
    }

    #[test]
    fn test_clearing_selection() {
        let mut sync = SelectionSync::new();
        sync.apply_external(Some("evt-1"));
        assert_eq!(sync.apply_external(None), SelectionChange::Cleared);
        assert_eq!(sync.apply_external(None), SelectionChange::Unchanged);
    }

    #[test]
    fn test_reselecting_after_browsing_away_scrolls_again() {
        let mut sync = SelectionSync::new();
        sync.apply_external(Some("evt-1"));
        sync.apply_external(None);
        assert_eq!(
            sync.apply_external(Some("evt-1")),
            SelectionChange::Scroll("evt-1".to_string())
        );
    }
}
