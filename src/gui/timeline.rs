//! Day strip rendering module.
//!
//! Draws the materialized window of day slots around the center lens and
//! turns pointer gestures on the strip into [`StripInput`] for the engine.

use chrono::{Datelike, NaiveDate};
use eframe::egui::{self, Align2, FontId, Painter, Pos2, Rect, Sense, Stroke};
use std::cell::Cell;
use std::rc::Rc;

use crate::core::config::Palette;
use crate::core::crossing::TickSound;
use crate::core::days::DayDescriptor;
use crate::core::timeline::Timeline;

/// Height of the month header above the slots.
const HEADER_HEIGHT: f32 = 36.0;

/// Height of the slot area.
const STRIP_HEIGHT: f32 = 180.0;

/// Inset between neighbouring slot cards.
const SLOT_PADDING: f32 = 6.0;

/// Base font size of the day number before emphasis scaling.
const DAY_FONT_SIZE: f32 = 18.0;

/// Crossing feedback for the GUI: a flash of the center lens.
///
/// The engine calls [`TickSound::play_tick`] on every crossing; the app
/// drains the flag once per frame and restarts the pulse animation.
#[derive(Debug, Clone, Default)]
pub struct PulseTick {
    fired: Rc<Cell<bool>>,
}

impl PulseTick {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tick fired since the last call.
    pub fn take(&self) -> bool {
        self.fired.replace(false)
    }
}

impl TickSound for PulseTick {
    fn play_tick(&self) {
        log::trace!("tick");
        self.fired.set(true);
    }
}

/// Pointer gestures captured on the strip during one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StripInput {
    /// Width of the slot area
    pub viewport_width: f32,
    /// The pointer grabbed the strip this frame
    pub drag_started: bool,
    /// Offset change caused by the pointer (positive moves to later days)
    pub drag_delta: f32,
    /// The pointer let go of the strip this frame
    pub drag_released: bool,
    /// Slot under a click (a press and release without dragging)
    pub clicked_index: Option<usize>,
}

/// Draws the visible window of the timeline.
pub struct TimelineRenderer<'a> {
    timeline: &'a Timeline,
    colors: &'a Palette,
    selected: Option<&'a str>,
    today: NaiveDate,
    /// Center lens flash, 1.0 right after a crossing and fading to 0.0
    pulse: f32,
}

impl<'a> TimelineRenderer<'a> {
    pub fn new(
        timeline: &'a Timeline,
        colors: &'a Palette,
        selected: Option<&'a str>,
        today: NaiveDate,
        pulse: f32,
    ) -> Self {
        Self {
            timeline,
            colors,
            selected,
            today,
            pulse: pulse.clamp(0.0, 1.0),
        }
    }

    /// Render the strip and report what the pointer did to it.
    pub fn render(&self, ui: &mut egui::Ui) -> StripInput {
        let width = ui.available_width();
        let (response, painter) = ui.allocate_painter(
            egui::vec2(width, HEADER_HEIGHT + STRIP_HEIGHT),
            Sense::click_and_drag(),
        );

        let rect = response.rect;
        let header_rect = Rect::from_min_size(rect.min, egui::vec2(rect.width(), HEADER_HEIGHT));
        let strip_rect = Rect::from_min_max(
            Pos2::new(rect.left(), rect.top() + HEADER_HEIGHT),
            rect.max,
        );

        // Slots are drawn relative to the strip, never outside it
        let strip_painter = painter.with_clip_rect(strip_rect);

        painter.rect_filled(rect, 0.0, self.colors.background.color());
        self.draw_header(&painter, header_rect);
        self.draw_slots(&strip_painter, strip_rect);
        self.draw_center_lens(&strip_painter, strip_rect);

        let clicked_index = if response.clicked() {
            response
                .interact_pointer_pos()
                .filter(|pos| strip_rect.contains(*pos))
                .and_then(|pos| self.timeline.index_at(pos.x - strip_rect.left()))
        } else {
            None
        };

        StripInput {
            viewport_width: strip_rect.width(),
            drag_started: response.drag_started(),
            // Dragging the strip right reveals earlier days
            drag_delta: if response.dragged() {
                -response.drag_delta().x
            } else {
                0.0
            },
            drag_released: response.drag_stopped(),
            clicked_index,
        }
    }

    fn draw_header(&self, painter: &Painter, rect: Rect) {
        painter.rect_filled(rect, 0.0, self.colors.header_background.color());

        let label = self
            .timeline
            .month_label()
            .map(|label| label.to_string())
            .unwrap_or_default();
        painter.text(
            Pos2::new(rect.left() + 16.0, rect.center().y),
            Align2::LEFT_CENTER,
            label,
            FontId::proportional(20.0),
            self.colors.text_primary.color(),
        );

        if let Some(day) = self.timeline.centered_day() {
            painter.text(
                Pos2::new(rect.right() - 16.0, rect.center().y),
                Align2::RIGHT_CENTER,
                day.date.format("%A, %-d %B %Y").to_string(),
                FontId::proportional(13.0),
                self.colors.text_dim.color(),
            );
        }

        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(1.0, self.colors.slot.color()),
        );
    }

    /// Draw every slot of the current window.
    fn draw_slots(&self, painter: &Painter, rect: Rect) {
        let item_width = self.timeline.item_width();
        let window = self.timeline.window();
        if window.is_empty() {
            return;
        }

        for index in window.range() {
            let Some(day) = self.timeline.days().get(index) else {
                continue;
            };

            let left = rect.left() + self.timeline.slot_left(index);
            if left + item_width < rect.left() || left > rect.right() {
                continue;
            }

            let slot_rect = Rect::from_min_size(
                Pos2::new(left + SLOT_PADDING, rect.top() + SLOT_PADDING),
                egui::vec2(
                    item_width - SLOT_PADDING * 2.0,
                    rect.height() - SLOT_PADDING * 2.0,
                ),
            );
            self.draw_slot(painter, slot_rect, day);
        }
    }

    fn draw_slot(&self, painter: &Painter, rect: Rect, day: &DayDescriptor) {
        let emphasis = self.timeline.emphasis(day.index);
        let alpha = (emphasis.opacity * 255.0).round() as u8;

        painter.rect_filled(rect, 8.0, self.colors.slot.alpha(alpha / 2));

        if day.date == self.today {
            painter.rect_stroke(
                rect,
                8.0,
                Stroke::new(2.0, self.colors.today.color().gamma_multiply(emphasis.opacity)),
                egui::StrokeKind::Inside,
            );
        }

        if self.timeline.is_selected(day.index, self.selected) {
            painter.rect_stroke(
                rect.shrink(3.0),
                6.0,
                Stroke::new(2.0, self.colors.selection.color()),
                egui::StrokeKind::Inside,
            );
        }

        let center = rect.center();
        let text = self.colors.text_primary.alpha(alpha);

        painter.text(
            Pos2::new(center.x, rect.top() + 18.0),
            Align2::CENTER_CENTER,
            day.date.format("%a").to_string().to_uppercase(),
            FontId::proportional(11.0),
            self.colors.text_dim.color().gamma_multiply(emphasis.opacity),
        );

        painter.text(
            center,
            Align2::CENTER_CENTER,
            day.date.day().to_string(),
            FontId::proportional(DAY_FONT_SIZE * emphasis.scale),
            text,
        );

        if day.has_event {
            let marker = Pos2::new(center.x, rect.bottom() - 20.0);
            painter.circle_filled(
                marker,
                3.0 + 1.5 * emphasis.scale,
                self.colors.event_marker.color().gamma_multiply(emphasis.opacity),
            );
        }
    }

    /// Outline marking the centered slot.
    fn draw_center_lens(&self, painter: &Painter, rect: Rect) {
        let item_width = self.timeline.item_width();
        let lens = Rect::from_center_size(
            rect.center(),
            egui::vec2(item_width - 4.0, rect.height() - 4.0),
        );

        let width = 2.0 + 2.0 * self.pulse;
        painter.rect_stroke(
            lens,
            10.0,
            Stroke::new(width, self.colors.accent.color()),
            egui::StrokeKind::Inside,
        );

        if self.pulse > 0.0 {
            let alpha = (self.pulse * 60.0).round() as u8;
            painter.rect_filled(lens, 10.0, self.colors.accent.alpha(alpha));
        }
    }
}
