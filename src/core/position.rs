//! Conversions between scroll offset, day index and screen placement.
//!
//! The offset is the distance the strip is scrolled: slot `i` covers
//! `[i * item_width, (i + 1) * item_width)` in strip space and is drawn at
//! `i * item_width - offset` on screen. A larger offset therefore centers a
//! later day.

/// Scroll offset that places the center of slot `index` at the viewport midpoint.
pub fn index_to_offset(index: usize, item_width: f32, viewport_width: f32) -> f32 {
    index as f32 * item_width + item_width / 2.0 - viewport_width / 2.0
}

/// Fractional slot position under the viewport midpoint (unclamped).
pub fn centered_position(offset: f32, item_width: f32, viewport_width: f32) -> f32 {
    if item_width <= 0.0 {
        return 0.0;
    }
    (offset + viewport_width / 2.0 - item_width / 2.0) / item_width
}

/// Index of the slot nearest the viewport midpoint, clamped to `[0, total_count)`.
///
/// Rounds to the nearest integer, so it is the exact inverse of
/// [`index_to_offset`] for every valid index.
pub fn offset_to_centered_index(
    offset: f32,
    item_width: f32,
    viewport_width: f32,
    total_count: usize,
) -> usize {
    if total_count == 0 {
        return 0;
    }

    let position = centered_position(offset, item_width, viewport_width).round();
    if position.is_nan() || position <= 0.0 {
        0
    } else {
        (position as usize).min(total_count - 1)
    }
}

/// Screen x of the left edge of slot `index`, relative to the viewport's left edge.
pub fn slot_screen_left(index: usize, offset: f32, item_width: f32) -> f32 {
    index as f32 * item_width - offset
}

/// Offsets at which the first and last day sit under the viewport midpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OffsetBounds {
    /// Offset centering the first day
    pub min: f32,
    /// Offset centering the last day
    pub max: f32,
}

impl OffsetBounds {
    /// Clamp an offset into the bounds.
    pub fn clamp(&self, offset: f32) -> f32 {
        offset.clamp(self.min, self.max)
    }

    /// Whether the offset lies within the bounds.
    pub fn contains(&self, offset: f32) -> bool {
        offset >= self.min && offset <= self.max
    }

    /// Signed distance past the nearest bound; zero inside.
    pub fn overshoot(&self, offset: f32) -> f32 {
        if offset < self.min {
            offset - self.min
        } else if offset > self.max {
            offset - self.max
        } else {
            0.0
        }
    }
}

/// Drag bounds for a strip of `total_count` slots.
pub fn offset_bounds(item_width: f32, viewport_width: f32, total_count: usize) -> OffsetBounds {
    let min = index_to_offset(0, item_width, viewport_width);
    let max = index_to_offset(total_count.saturating_sub(1), item_width, viewport_width);
    OffsetBounds { min, max }
}

/// Visual weight of a slot based on its distance from the viewport center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlotEmphasis {
    /// Scale factor, peaking at 1.8 on the centered slot
    pub scale: f32,
    /// Opacity between 0.2 and 1.0
    pub opacity: f32,
}

/// Emphasis for a slot whose center is `distance` pixels from the viewport center.
pub fn slot_emphasis(distance: f32) -> SlotEmphasis {
    let distance = distance.abs();
    SlotEmphasis {
        scale: (1.8 - distance / 300.0).max(0.7),
        opacity: (1.0 - distance / 500.0).max(0.2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const W: f32 = 220.0;
    const VW: f32 = 1000.0;

    #[test]
    fn test_index_to_offset_centers_slot() {
        // Slot 0 center (110) sits at the midpoint (500) when offset = -390
        assert_eq!(index_to_offset(0, W, VW), -390.0);
        assert_eq!(index_to_offset(1, W, VW), -170.0);

        let offset = index_to_offset(7, W, VW);
        let center_on_screen = slot_screen_left(7, offset, W) + W / 2.0;
        assert_eq!(center_on_screen, VW / 2.0);
    }

    #[test]
    fn test_offset_to_centered_index_rounds_to_nearest() {
        let base = index_to_offset(10, W, VW);
        assert_eq!(offset_to_centered_index(base, W, VW, 100), 10);
        assert_eq!(offset_to_centered_index(base + W * 0.49, W, VW, 100), 10);
        assert_eq!(offset_to_centered_index(base + W * 0.51, W, VW, 100), 11);
        assert_eq!(offset_to_centered_index(base - W * 0.51, W, VW, 100), 9);
    }

    #[test]
    fn test_offset_to_centered_index_clamps() {
        assert_eq!(offset_to_centered_index(-1.0e6, W, VW, 100), 0);
        assert_eq!(offset_to_centered_index(1.0e9, W, VW, 100), 99);
        assert_eq!(offset_to_centered_index(f32::NAN, W, VW, 100), 0);
        assert_eq!(offset_to_centered_index(500.0, W, VW, 0), 0);
    }

    #[test]
    fn test_offset_bounds() {
        let bounds = offset_bounds(W, VW, 10);
        assert_eq!(bounds.min, index_to_offset(0, W, VW));
        assert_eq!(bounds.max, index_to_offset(9, W, VW));
        assert_eq!(bounds.clamp(-1.0e6), bounds.min);
        assert!(bounds.contains(0.0));
        assert_eq!(bounds.overshoot(bounds.min - 30.0), -30.0);
        assert_eq!(bounds.overshoot(bounds.max + 12.0), 12.0);
        assert_eq!(bounds.overshoot(0.0), 0.0);
    }

    #[test]
    fn test_single_day_bounds_collapse() {
        let bounds = offset_bounds(W, VW, 1);
        assert_eq!(bounds.min, bounds.max);
    }

    #[test]
    fn test_slot_emphasis_peaks_at_center() {
        let center = slot_emphasis(0.0);
        assert_eq!(center.scale, 1.8);
        assert_eq!(center.opacity, 1.0);

        let far = slot_emphasis(-2000.0);
        assert_eq!(far.scale, 0.7);
        assert_eq!(far.opacity, 0.2);

        let near = slot_emphasis(150.0);
        assert!(near.scale < center.scale && near.scale > far.scale);
    }

    #[test]
    fn test_centered_index_visits_every_index_in_order() {
        let n = 200;
        let bounds = offset_bounds(W, VW, n);
        let mut visited: Vec<usize> = Vec::new();

        let mut offset = bounds.min;
        while offset <= bounds.max {
            let index = offset_to_centered_index(offset, W, VW, n);
            if visited.last() != Some(&index) {
                visited.push(index);
            }
            offset += 3.7;
        }
        let last = offset_to_centered_index(bounds.max, W, VW, n);
        if visited.last() != Some(&last) {
            visited.push(last);
        }

        let expected: Vec<usize> = (0..n).collect();
        assert_eq!(visited, expected);
    }

    proptest! {
        #[test]
        fn round_trip_is_idempotent(
            n in 1usize..5000,
            item_width in 20.0f32..400.0,
            viewport_width in 100.0f32..4000.0,
            seed in any::<usize>(),
        ) {
            let index = seed % n;
            let offset = index_to_offset(index, item_width, viewport_width);
            prop_assert_eq!(
                offset_to_centered_index(offset, item_width, viewport_width, n),
                index
            );
        }

        #[test]
        fn centered_index_is_monotonic(
            item_width in 20.0f32..400.0,
            viewport_width in 100.0f32..4000.0,
            a in -1.0e5f32..1.0e6,
            b in -1.0e5f32..1.0e6,
        ) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(
                offset_to_centered_index(lo, item_width, viewport_width, 3000)
                    <= offset_to_centered_index(hi, item_width, viewport_width, 3000)
            );
        }
    }
}
