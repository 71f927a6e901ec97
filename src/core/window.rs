//! Virtualization window.
//!
//! Only the slots around the viewport are materialized. The window is the
//! centered index widened by the slots that can intersect the viewport plus a
//! fixed buffer on each side, so its size never depends on the total day count.

use std::ops::Range;

use super::position::offset_to_centered_index;

/// Half-open range of slot indices that must be rendered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VisibleWindow {
    /// First index to render
    pub start_index: usize,
    /// One past the last index to render
    pub end_index: usize,
}

impl VisibleWindow {
    /// Number of slots in the window.
    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    /// Whether the window holds no slot.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `index` falls inside the window.
    #[allow(dead_code)] // Only read by tests; renderers iterate range()
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }

    /// The window as a range, for iteration and slicing.
    pub fn range(&self) -> Range<usize> {
        self.start_index..self.end_index
    }
}

/// Slots on one side of the centered slot that can intersect the viewport.
fn half_span(viewport_width: f32, item_width: f32) -> usize {
    if item_width <= 0.0 || viewport_width <= 0.0 {
        return 0;
    }
    (viewport_width / (2.0 * item_width)).ceil() as usize
}

/// Upper bound on slots that can be visible at once: the centered slot plus
/// the partially visible ones on both sides.
pub fn visible_slot_count(viewport_width: f32, item_width: f32) -> usize {
    2 * half_span(viewport_width, item_width) + 1
}

/// Window of indices to render for the given scroll state.
pub fn compute_window(
    offset: f32,
    item_width: f32,
    viewport_width: f32,
    total_count: usize,
    buffer_count: usize,
) -> VisibleWindow {
    if total_count == 0 {
        return VisibleWindow::default();
    }

    let center = offset_to_centered_index(offset, item_width, viewport_width, total_count);
    let reach = visible_slot_count(viewport_width, item_width) / 2 + buffer_count;

    VisibleWindow {
        start_index: center.saturating_sub(reach),
        end_index: (center + reach + 1).min(total_count),
    }
}

/// Recomputes the window only when the scroll state moved enough to matter.
///
/// A recompute happens when the offset moved more than half a slot since the
/// last one, when the viewport width changed, or when the day count changed.
#[derive(Debug, Clone)]
pub struct WindowTracker {
    buffer_count: usize,
    last_offset: Option<f32>,
    last_viewport_width: f32,
    last_total_count: usize,
    window: VisibleWindow,
}

impl WindowTracker {
    /// Create a tracker with the given buffer on each side.
    pub fn new(buffer_count: usize) -> Self {
        Self {
            buffer_count,
            last_offset: None,
            last_viewport_width: 0.0,
            last_total_count: 0,
            window: VisibleWindow::default(),
        }
    }

    /// Current window.
    pub fn window(&self) -> VisibleWindow {
        self.window
    }

    /// Buffer size on each side.
    #[allow(dead_code)] // Only read by tests; the timeline rebuilds the tracker on change
    pub fn buffer_count(&self) -> usize {
        self.buffer_count
    }

    /// Forget the last computation so the next update always recomputes.
    pub fn invalidate(&mut self) {
        self.last_offset = None;
    }

    /// Feed the latest scroll state; returns the new window when it changed.
    pub fn update(
        &mut self,
        offset: f32,
        item_width: f32,
        viewport_width: f32,
        total_count: usize,
    ) -> Option<VisibleWindow> {
        let stale = match self.last_offset {
            None => true,
            Some(last) => {
                (offset - last).abs() > item_width / 2.0
                    || viewport_width != self.last_viewport_width
                    || total_count != self.last_total_count
            }
        };
        if !stale {
            return None;
        }

        self.last_offset = Some(offset);
        self.last_viewport_width = viewport_width;
        self.last_total_count = total_count;

        let window = compute_window(
            offset,
            item_width,
            viewport_width,
            total_count,
            self.buffer_count,
        );
        if window == self.window {
            return None;
        }

        log::trace!(
            "Visible window {}..{} (offset {:.1})",
            window.start_index,
            window.end_index,
            offset
        );
        self.window = window;
        Some(window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::position::{index_to_offset, offset_bounds, slot_screen_left};
    use proptest::prelude::*;

    const W: f32 = 220.0;
    const VW: f32 = 1000.0;

    #[test]
    fn test_visible_slot_count() {
        // 1000 / 440 = 2.27 -> 3 slots each side
        assert_eq!(visible_slot_count(VW, W), 7);
        assert_eq!(visible_slot_count(440.0, W), 3);
        assert_eq!(visible_slot_count(0.0, W), 1);
    }

    #[test]
    fn test_window_around_center() {
        let offset = index_to_offset(100, W, VW);
        let window = compute_window(offset, W, VW, 2000, 15);

        assert_eq!(window.start_index, 100 - 3 - 15);
        assert_eq!(window.end_index, 100 + 3 + 15 + 1);
        assert!(window.contains(100));
    }

    #[test]
    fn test_window_clamped_at_edges() {
        let start = compute_window(index_to_offset(0, W, VW), W, VW, 2000, 15);
        assert_eq!(start.start_index, 0);
        assert_eq!(start.end_index, 19);

        let end = compute_window(index_to_offset(1999, W, VW), W, VW, 2000, 15);
        assert_eq!(end.end_index, 2000);
        assert_eq!(end.start_index, 1999 - 18);
    }

    #[test]
    fn test_window_empty_for_no_days() {
        assert!(compute_window(0.0, W, VW, 0, 15).is_empty());
    }

    #[test]
    fn test_window_covers_every_visible_slot() {
        let n = 500;
        let bounds = offset_bounds(W, VW, n);
        let mut offset = bounds.min - 300.0;

        while offset <= bounds.max + 300.0 {
            let window = compute_window(offset, W, VW, n, 0);
            for index in 0..n {
                let left = slot_screen_left(index, offset, W);
                let visible = left + W > 0.0 && left < VW;
                if visible {
                    assert!(
                        window.contains(index),
                        "slot {} visible at offset {} but window is {:?}",
                        index,
                        offset,
                        window
                    );
                }
            }
            offset += 17.0;
        }
    }

    #[test]
    fn test_tracker_debounces_small_moves() {
        let mut tracker = WindowTracker::new(2);
        let offset = index_to_offset(50, W, VW);

        let first = tracker.update(offset, W, VW, 100);
        assert!(first.is_some());

        // Sub half-slot moves never recompute
        assert!(tracker.update(offset + 40.0, W, VW, 100).is_none());
        assert!(tracker.update(offset + 109.0, W, VW, 100).is_none());

        // A full slot moves the window by one
        let moved = tracker.update(offset + W, W, VW, 100).unwrap();
        assert_eq!(moved.start_index, first.unwrap().start_index + 1);
    }

    #[test]
    fn test_tracker_recomputes_on_resize() {
        let mut tracker = WindowTracker::new(2);
        let offset = index_to_offset(50, W, VW);
        tracker.update(offset, W, VW, 100);

        let resized = tracker.update(offset, W, 2000.0, 100).unwrap();
        assert_eq!(resized.len(), visible_slot_count(2000.0, W) + 4);
    }

    #[test]
    fn test_tracker_invalidate_forces_recompute() {
        let mut tracker = WindowTracker::new(2);
        tracker.update(0.0, W, VW, 100);
        tracker.invalidate();
        // Same inputs: recomputed but unchanged, so nothing is reported
        assert!(tracker.update(0.0, W, VW, 100).is_none());
        assert_eq!(tracker.window(), compute_window(0.0, W, VW, 100, 2));
    }

    proptest! {
        #[test]
        fn window_size_is_independent_of_total(
            item_width in 40.0f32..400.0,
            viewport_width in 200.0f32..3000.0,
            buffer in 0usize..30,
            offset in -5.0e4f32..2.0e6,
        ) {
            let bound = visible_slot_count(viewport_width, item_width) + 2 * buffer + 1;
            for total in [100usize, 5000] {
                let window = compute_window(offset, item_width, viewport_width, total, buffer);
                prop_assert!(window.len() <= bound);
                prop_assert!(window.end_index <= total);
            }
        }
    }
}
