//! The timeline engine.
//!
//! [`Timeline`] owns the day sequence and wires the motion controller, the
//! crossing detector, the window tracker and the selection sync together.
//! Every input returns the [`TimelineEvent`]s it caused, in the order they
//! happened, so the host can update its header, renderer and parent state.

use chrono::NaiveDate;

use super::crossing::{CrossingDetector, MonthLabel, MonthTracker, TickSound};
use super::days::{DayDescriptor, DaySequence};
use super::motion::{MotionConfig, MotionController, MotionState};
use super::position::{
    SlotEmphasis, index_to_offset, offset_bounds, offset_to_centered_index, slot_emphasis,
    slot_screen_left,
};
use super::selection::{SelectionChange, SelectionSync};
use super::window::{VisibleWindow, WindowTracker};

/// Default slot width in pixels.
pub const DEFAULT_ITEM_WIDTH: f32 = 220.0;

/// Default number of extra slots materialized on each side of the viewport.
pub const DEFAULT_BUFFER_ITEMS: usize = 15;

/// Width assumed for geometry until the host reports the real viewport.
const FALLBACK_VIEWPORT_WIDTH: f32 = 1000.0;

/// Geometry and feel of the timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineConfig {
    pub item_width: f32,
    pub buffer_items: usize,
    pub motion: MotionConfig,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            item_width: DEFAULT_ITEM_WIDTH,
            buffer_items: DEFAULT_BUFFER_ITEMS,
            motion: MotionConfig::default(),
        }
    }
}

/// Something observable that happened inside the timeline.
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent {
    /// A different day is now under the viewport center
    CenteredIndexChanged { index: usize, date: NaiveDate },
    /// The header month changed
    MonthChanged(MonthLabel),
    /// The renderer must materialize a different range of slots
    WindowChanged(VisibleWindow),
    /// The user picked an event day
    DaySelected(String),
    /// A programmatic scroll towards `index` began
    ScrollStarted { index: usize },
    /// A settle or programmatic scroll came to rest on `index`
    Settled { index: usize },
}

/// Draggable, virtualized strip of days.
pub struct Timeline {
    days: DaySequence,
    config: TimelineConfig,
    /// Width reported by the host; zero until the first layout
    viewport_width: f32,
    motion: MotionController,
    crossing: CrossingDetector,
    months: MonthTracker,
    window: WindowTracker,
    selection: SelectionSync,
    /// Selection received before the viewport width was known
    pending_selection: Option<Option<String>>,
    tick_sound: Option<Box<dyn TickSound>>,
}

impl Timeline {
    /// Create a timeline resting on the first day.
    pub fn new(
        days: DaySequence,
        config: TimelineConfig,
        tick_sound: Option<Box<dyn TickSound>>,
    ) -> Self {
        let bounds = offset_bounds(config.item_width, FALLBACK_VIEWPORT_WIDTH, days.len());
        Self {
            motion: MotionController::new(config.motion, bounds),
            window: WindowTracker::new(config.buffer_items),
            days,
            config,
            viewport_width: 0.0,
            crossing: CrossingDetector::new(),
            months: MonthTracker::new(),
            selection: SelectionSync::new(),
            pending_selection: None,
            tick_sound,
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn days(&self) -> &DaySequence {
        &self.days
    }

    pub fn item_width(&self) -> f32 {
        self.config.item_width
    }

    /// Viewport width reported by the host (zero before the first layout).
    #[allow(dead_code)] // Headless query; the GUI reports the width but never reads it back
    pub fn viewport_width(&self) -> f32 {
        self.viewport_width
    }

    #[allow(dead_code)] // Headless query; the renderer goes through slot_left
    pub fn offset(&self) -> f32 {
        self.motion.offset()
    }

    pub fn motion_state(&self) -> MotionState {
        self.motion.state()
    }

    /// Index of the day nearest the viewport center.
    pub fn centered_index(&self) -> usize {
        offset_to_centered_index(
            self.motion.offset(),
            self.config.item_width,
            self.effective_width(),
            self.days.len(),
        )
    }

    pub fn centered_day(&self) -> Option<&DayDescriptor> {
        self.days.get(self.centered_index())
    }

    /// Day the strip is heading to: the target of a running settle or
    /// scroll, otherwise the centered day.
    pub fn destination_index(&self) -> usize {
        match self.motion.target() {
            Some(target) => offset_to_centered_index(
                target,
                self.config.item_width,
                self.effective_width(),
                self.days.len(),
            ),
            None => self.centered_index(),
        }
    }

    /// Slots the renderer should draw.
    pub fn window(&self) -> VisibleWindow {
        self.window.window()
    }

    /// Header label of the last reported crossing.
    pub fn month_label(&self) -> Option<MonthLabel> {
        self.months.current()
    }

    /// Screen x of a slot's left edge relative to the viewport.
    pub fn slot_left(&self, index: usize) -> f32 {
        slot_screen_left(index, self.motion.offset(), self.config.item_width)
    }

    /// Emphasis of a slot based on its distance from the viewport center.
    pub fn emphasis(&self, index: usize) -> SlotEmphasis {
        let center = self.slot_left(index) + self.config.item_width / 2.0;
        slot_emphasis(center - self.effective_width() / 2.0)
    }

    /// Slot under a viewport-relative x position.
    pub fn index_at(&self, x: f32) -> Option<usize> {
        let strip_x = x + self.motion.offset();
        if !strip_x.is_finite() || strip_x < 0.0 || self.config.item_width <= 0.0 {
            return None;
        }
        let index = (strip_x / self.config.item_width).floor() as usize;
        (index < self.days.len()).then_some(index)
    }

    /// Whether the slot carries the currently selected event.
    pub fn is_selected(&self, index: usize, selected: Option<&str>) -> bool {
        match (self.days.get(index), selected) {
            (Some(day), Some(id)) => day.has_event && day.event() == Some(id),
            _ => false,
        }
    }

    // ------------------------------------------------------------------
    // Inputs
    // ------------------------------------------------------------------

    /// Apply new geometry and feel, keeping the centered day in place.
    ///
    /// Any running motion is dropped.
    pub fn set_config(&mut self, config: TimelineConfig) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        if config == self.config {
            return events;
        }

        let centered = self.centered_index();
        self.config = config;
        self.motion.set_config(config.motion);
        self.motion.set_bounds(offset_bounds(
            config.item_width,
            self.effective_width(),
            self.days.len(),
        ));
        self.motion.jump_to(self.offset_of(centered));
        self.window = WindowTracker::new(config.buffer_items);

        self.offset_changed(&mut events);
        events
    }

    /// Plug in or remove the crossing feedback.
    pub fn set_tick_sound(&mut self, tick_sound: Option<Box<dyn TickSound>>) {
        self.tick_sound = tick_sound;
    }

    /// The viewport was laid out or resized.
    ///
    /// The centered day (and the destination of a running scroll) stays the
    /// same across the resize.
    pub fn set_viewport_width(&mut self, viewport_width: f32) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        if !viewport_width.is_finite() || viewport_width <= 0.0 {
            return events;
        }
        if viewport_width == self.viewport_width {
            return events;
        }

        let centered = self.centered_index();
        let target_index = self.motion.target().map(|target| {
            offset_to_centered_index(
                target,
                self.config.item_width,
                self.effective_width(),
                self.days.len(),
            )
        });

        log::debug!(
            "Viewport width {:.0} -> {:.0}",
            self.viewport_width,
            viewport_width
        );
        self.viewport_width = viewport_width;
        self.motion.set_bounds(offset_bounds(
            self.config.item_width,
            viewport_width,
            self.days.len(),
        ));

        match (self.motion.state(), target_index) {
            (MotionState::Idle, _) => {
                self.motion.jump_to(self.offset_of(centered));
            }
            (MotionState::Settling | MotionState::Animating, Some(index)) => {
                self.motion.scroll_to(self.offset_of(index));
            }
            _ => {}
        }

        if let Some(selected) = self.pending_selection.take() {
            events.extend(self.apply_selection(selected.as_deref()));
        }

        self.offset_changed(&mut events);
        events
    }

    /// The pointer grabbed the strip; any running animation stops here.
    pub fn drag_start(&mut self) {
        self.motion.drag_start();
    }

    /// The pointer moved the strip by `delta` pixels of offset.
    pub fn drag_move(&mut self, delta: f32) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        if self.motion.drag_move(delta) {
            self.offset_changed(&mut events);
        }
        events
    }

    /// The pointer released the strip; it coasts to the nearest day.
    pub fn drag_end(&mut self) {
        let item_width = self.config.item_width;
        let viewport_width = self.effective_width();
        let total = self.days.len();

        self.motion.drag_end(|projected| {
            let index = offset_to_centered_index(projected, item_width, viewport_width, total);
            index_to_offset(index, item_width, viewport_width)
        });
    }

    /// Animate to `index`, clamped into the range.
    pub fn scroll_to_index(&mut self, index: usize) -> Vec<TimelineEvent> {
        let index = index.min(self.days.len().saturating_sub(1));
        self.motion.scroll_to(self.offset_of(index));
        log::debug!("Scrolling to day {}", index);
        vec![TimelineEvent::ScrollStarted { index }]
    }

    /// Place `index` under the center immediately.
    pub fn center_on(&mut self, index: usize) -> Vec<TimelineEvent> {
        let index = index.min(self.days.len().saturating_sub(1));
        let mut events = Vec::new();
        self.motion.jump_to(self.offset_of(index));
        self.offset_changed(&mut events);
        events
    }

    /// The user clicked a slot.
    ///
    /// The day is scrolled to the center; event days are also reported as
    /// selected.
    pub fn click(&mut self, index: usize) -> Vec<TimelineEvent> {
        let index = index.min(self.days.len().saturating_sub(1));
        let mut events = Vec::new();

        if let Some(day) = self.days.get(index)
            && let Some(id) = self.selection.record_click(day)
        {
            log::debug!("Day {} selected event {}", index, id);
            events.push(TimelineEvent::DaySelected(id));
        }

        events.extend(self.scroll_to_index(index));
        events
    }

    /// The parent's selected event id, fed on every render.
    ///
    /// Only genuine external changes scroll; an echo of this timeline's own
    /// click does not.
    pub fn set_selected_event(&mut self, selected: Option<&str>) -> Vec<TimelineEvent> {
        if self.viewport_width <= 0.0 {
            self.pending_selection = Some(selected.map(str::to_string));
            return Vec::new();
        }
        self.apply_selection(selected)
    }

    /// Scroll to `today` when it lies within the range.
    pub fn jump_to_today(&mut self, today: NaiveDate) -> Vec<TimelineEvent> {
        match self.days.index_of_date(today) {
            Some(index) => self.scroll_to_index(index),
            None => Vec::new(),
        }
    }

    /// Scroll to the next event day from `today`, wrapping to the first one.
    pub fn jump_to_next_event(&mut self, today: NaiveDate) -> Vec<TimelineEvent> {
        match self.days.next_event_from(today) {
            Some(index) => self.scroll_to_index(index),
            None => Vec::new(),
        }
    }

    /// Advance animations by `dt` seconds.
    pub fn tick(&mut self, dt: f32) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        if let Some(step) = self.motion.tick(dt) {
            self.offset_changed(&mut events);
            if step.arrived {
                let index = self.centered_index();
                log::debug!("Settled on day {}", index);
                events.push(TimelineEvent::Settled { index });
            }
        }
        events
    }

    /// Swap in a rebuilt day sequence, keeping the centered date in view.
    ///
    /// If the selected event moved to a different day (or only now falls
    /// inside the range) the strip scrolls to it.
    pub fn replace_days(&mut self, days: DaySequence) -> Vec<TimelineEvent> {
        let mut events = Vec::new();
        let centered_date = self.centered_day().map(|d| d.date);
        let destination_date = self
            .motion
            .target()
            .and_then(|_| self.days.get(self.destination_index()))
            .map(|d| d.date);
        let selected = self.selection.last_external().map(str::to_string);
        let old_selected_index = selected
            .as_deref()
            .and_then(|id| self.days.index_of_event(id));

        // Indices are renumbered when the range moves
        if days.start() != self.days.start() {
            self.crossing.reset();
            self.months.reset();
        }
        self.days = days;
        self.window.invalidate();
        self.motion.set_bounds(offset_bounds(
            self.config.item_width,
            self.effective_width(),
            self.days.len(),
        ));

        let keep = centered_date
            .and_then(|date| self.days.index_of_date(date))
            .unwrap_or(0);
        if self.motion.is_idle() {
            self.motion.jump_to(self.offset_of(keep));
        } else if let Some(date) = destination_date {
            // The running motion heads for a date, not for an old index
            let index = self.days.index_of_date(date).unwrap_or(keep);
            self.motion.scroll_to(self.offset_of(index));
        }

        let new_selected_index = selected
            .as_deref()
            .and_then(|id| self.days.index_of_event(id));
        if let Some(index) = new_selected_index
            && new_selected_index != old_selected_index
        {
            events.extend(self.scroll_to_index(index));
        }

        self.offset_changed(&mut events);
        events
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn effective_width(&self) -> f32 {
        if self.viewport_width > 0.0 {
            self.viewport_width
        } else {
            FALLBACK_VIEWPORT_WIDTH
        }
    }

    fn offset_of(&self, index: usize) -> f32 {
        index_to_offset(index, self.config.item_width, self.effective_width())
    }

    fn apply_selection(&mut self, selected: Option<&str>) -> Vec<TimelineEvent> {
        match self.selection.apply_external(selected) {
            SelectionChange::Scroll(id) => match self.days.index_of_event(&id) {
                Some(index) => self.scroll_to_index(index),
                None => {
                    log::debug!("Selected event {} is not on the timeline", id);
                    Vec::new()
                }
            },
            SelectionChange::Unchanged | SelectionChange::EchoOfClick | SelectionChange::Cleared => {
                Vec::new()
            }
        }
    }

    /// Run the observers of the offset, in order.
    fn offset_changed(&mut self, events: &mut Vec<TimelineEvent>) {
        let index = self.centered_index();
        let previous = self.crossing.last_fired();

        if let Some(index) = self.crossing.observe(index)
            && let Some(day) = self.days.get(index)
        {
            let date = day.date;
            if let Some(sound) = &self.tick_sound {
                sound.play_tick();
            }
            log::trace!("Crossed {:?} -> {} ({})", previous, index, date);
            events.push(TimelineEvent::CenteredIndexChanged { index, date });

            if let Some(label) = self.months.observe(date) {
                events.push(TimelineEvent::MonthChanged(label));
            }
        }

        if let Some(window) = self.window.update(
            self.motion.offset(),
            self.config.item_width,
            self.effective_width(),
            self.days.len(),
        ) {
            events.push(TimelineEvent::WindowChanged(window));
        }
    }
}
