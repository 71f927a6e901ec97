//! Drag and momentum controller.
//!
//! Owns the scroll offset. Pointer drags move it directly (with elastic
//! resistance past the ends), releases hand over to a spring that carries the
//! release momentum to a resting slot, and programmatic scrolls animate with
//! the same spring. Time only advances through [`MotionController::tick`], so
//! a canceled animation has nothing left that could fire later.

use super::position::OffsetBounds;

/// Most spring steps integrated by one `tick`; a quarter second at 120 Hz.
const MAX_SUBSTEPS: u32 = 30;

/// Controller state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MotionState {
    /// At rest on a slot
    #[default]
    Idle,
    /// The pointer is holding the strip
    Dragging,
    /// Coasting to rest after a release
    Settling,
    /// Programmatic scroll in flight
    Animating,
}

/// Damped spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 50.0,
            damping: 15.0,
            mass: 1.0,
        }
    }
}

impl SpringConfig {
    /// Acceleration of a body at `offset` moving with `velocity` towards `target`.
    fn acceleration(&self, offset: f32, velocity: f32, target: f32) -> f32 {
        let mass = self.mass.max(f32::EPSILON);
        (-self.stiffness * (offset - target) - self.damping * velocity) / mass
    }
}

/// Tuning for drag feel, momentum and rest detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionConfig {
    pub spring: SpringConfig,
    /// Fraction of pointer movement applied past the ends (0 = hard stop, 1 = free)
    pub drag_elastic: f32,
    /// Share of release velocity projected into the resting position
    pub momentum_power: f32,
    /// Seconds of coasting used to project the release velocity
    pub momentum_time_constant: f32,
    /// Distance to target (px) under which the motion may come to rest
    pub rest_distance: f32,
    /// Speed (px/s) under which the motion may come to rest
    pub rest_speed: f32,
    /// Largest integration step in seconds
    pub max_step: f32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            spring: SpringConfig::default(),
            drag_elastic: 0.1,
            momentum_power: 0.8,
            momentum_time_constant: 0.35,
            rest_distance: 0.5,
            rest_speed: 5.0,
            max_step: 1.0 / 120.0,
        }
    }
}

/// Outcome of advancing an in-flight motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTick {
    /// Offset after the step
    pub offset: f32,
    /// The motion reached its target and the controller is idle again
    pub arrived: bool,
    /// Generation of the motion that produced this step
    pub generation: u64,
}

/// Single owner and writer of the scroll offset.
#[derive(Debug, Clone)]
pub struct MotionController {
    config: MotionConfig,
    bounds: OffsetBounds,
    state: MotionState,
    offset: f32,
    velocity: f32,
    target: Option<f32>,
    /// Unresisted drag position; the visible offset is its elastic image
    drag_raw: f32,
    /// Offset at the previous tick while dragging, for release velocity
    drag_sample: f32,
    generation: u64,
}

impl MotionController {
    /// Create an idle controller resting at the lower bound.
    pub fn new(config: MotionConfig, bounds: OffsetBounds) -> Self {
        Self {
            config,
            bounds,
            state: MotionState::Idle,
            offset: bounds.min,
            velocity: 0.0,
            target: None,
            drag_raw: bounds.min,
            drag_sample: bounds.min,
            generation: 0,
        }
    }

    pub fn offset(&self) -> f32 {
        self.offset
    }

    #[allow(dead_code)] // Inspected by tests; the facade only needs the offset
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn state(&self) -> MotionState {
        self.state
    }

    /// Resting offset of the current settle or animation.
    pub fn target(&self) -> Option<f32> {
        self.target
    }

    /// Counter bumped every time a motion starts or is canceled.
    #[allow(dead_code)] // Inspected by tests; ticks carry the generation to callers
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_idle(&self) -> bool {
        self.state == MotionState::Idle
    }

    /// Replace the tuning; takes effect on the next step.
    pub fn set_config(&mut self, config: MotionConfig) {
        self.config = config;
    }

    /// Replace the bounds (resize or new day count).
    ///
    /// An idle offset and any pending target are pulled back inside.
    pub fn set_bounds(&mut self, bounds: OffsetBounds) {
        self.bounds = bounds;
        if let Some(target) = self.target {
            self.target = Some(bounds.clamp(target));
        }
        if self.state == MotionState::Idle {
            self.offset = bounds.clamp(self.offset);
        }
    }

    /// Place the strip instantly, canceling whatever was in flight.
    ///
    /// Returns true when the offset changed.
    pub fn jump_to(&mut self, offset: f32) -> bool {
        if !offset.is_finite() {
            return false;
        }
        let offset = self.bounds.clamp(offset);
        let moved = offset != self.offset;

        self.cancel();
        self.offset = offset;
        moved
    }

    /// The pointer grabbed the strip.
    ///
    /// Any settle or animation is dropped on the spot: the offset freezes
    /// where it is and no velocity survives.
    pub fn drag_start(&mut self) {
        if self.state != MotionState::Idle && self.state != MotionState::Dragging {
            log::debug!(
                "Drag interrupted {:?} at offset {:.1}",
                self.state,
                self.offset
            );
        }
        self.cancel();
        self.state = MotionState::Dragging;
        self.drag_raw = self.unresist(self.offset);
        self.drag_sample = self.offset;
    }

    /// Move the strip by `delta` pixels of offset.
    ///
    /// Returns true when the offset changed. Ignored unless dragging.
    pub fn drag_move(&mut self, delta: f32) -> bool {
        if self.state != MotionState::Dragging || !delta.is_finite() || delta == 0.0 {
            return false;
        }
        self.drag_raw += delta;
        let offset = self.resist(self.drag_raw);
        let moved = offset != self.offset;
        self.offset = offset;
        moved
    }

    /// The pointer released the strip.
    ///
    /// The release velocity is projected forward, clamped into bounds and
    /// handed to `snap` to pick the resting offset; the spring then carries
    /// the strip there starting from the release velocity.
    pub fn drag_end(&mut self, snap: impl FnOnce(f32) -> f32) {
        if self.state != MotionState::Dragging {
            return;
        }

        let projection =
            self.velocity * self.config.momentum_power * self.config.momentum_time_constant;
        let projected = self.bounds.clamp(self.offset + projection);
        let target = self.bounds.clamp(snap(projected));

        self.generation += 1;
        self.state = MotionState::Settling;
        self.target = Some(target);

        log::trace!(
            "Released at {:.1} with {:.1} px/s, settling to {:.1}",
            self.offset,
            self.velocity,
            target
        );
    }

    /// Animate to `target`, clamped into bounds.
    ///
    /// Retargeting a running settle or animation keeps its velocity so the
    /// motion stays continuous; interrupting a drag starts from rest.
    pub fn scroll_to(&mut self, target: f32) {
        if !target.is_finite() {
            return;
        }
        if self.state == MotionState::Dragging {
            self.velocity = 0.0;
        }

        self.generation += 1;
        self.state = MotionState::Animating;
        self.target = Some(self.bounds.clamp(target));
    }

    /// Advance time by `dt` seconds.
    ///
    /// Returns the step result while a settle or animation is running, `None`
    /// when idle or dragging.
    pub fn tick(&mut self, dt: f32) -> Option<MotionTick> {
        if !dt.is_finite() || dt <= 0.0 {
            return None;
        }

        match self.state {
            MotionState::Idle => None,
            MotionState::Dragging => {
                self.sample_drag_velocity(dt);
                None
            }
            MotionState::Settling | MotionState::Animating => {
                let target = match self.target {
                    Some(target) => target,
                    None => {
                        self.cancel();
                        return None;
                    }
                };

                self.integrate(dt, target);

                let arrived = (self.offset - target).abs() < self.config.rest_distance
                    && self.velocity.abs() < self.config.rest_speed;
                let generation = self.generation;
                if arrived {
                    self.offset = target;
                    self.cancel();
                }

                Some(MotionTick {
                    offset: self.offset,
                    arrived,
                    generation,
                })
            }
        }
    }

    /// Drop any motion and rest where the strip is.
    fn cancel(&mut self) {
        if self.state != MotionState::Idle {
            self.generation += 1;
        }
        self.state = MotionState::Idle;
        self.target = None;
        self.velocity = 0.0;
    }

    /// Advance the spring by `dt`, at most [`MAX_SUBSTEPS`] steps of `max_step`.
    ///
    /// Time beyond that is dropped, so a long stall costs one bounded frame.
    fn integrate(&mut self, dt: f32, target: f32) {
        let step = self.config.max_step.max(1.0e-4);
        let steps = (dt / step).ceil().clamp(1.0, MAX_SUBSTEPS as f32) as u32;
        let h = dt.min(step * steps as f32) / steps as f32;
        for _ in 0..steps {
            let acceleration = self
                .config
                .spring
                .acceleration(self.offset, self.velocity, target);
            self.velocity += acceleration * h;
            self.offset += self.velocity * h;
        }
    }

    fn sample_drag_velocity(&mut self, dt: f32) {
        let instantaneous = (self.offset - self.drag_sample) / dt;
        self.velocity = 0.8 * instantaneous + 0.2 * self.velocity;
        self.drag_sample = self.offset;
    }

    /// Elastic image of an unresisted drag position.
    fn resist(&self, raw: f32) -> f32 {
        if self.bounds.contains(raw) {
            return raw;
        }
        let overshoot = self.bounds.overshoot(raw);
        raw - overshoot + overshoot * self.config.drag_elastic
    }

    /// Inverse of [`Self::resist`].
    fn unresist(&self, offset: f32) -> f32 {
        let overshoot = self.bounds.overshoot(offset);
        if overshoot == 0.0 || self.config.drag_elastic <= 0.0 {
            offset
        } else {
            offset - overshoot + overshoot / self.config.drag_elastic
        }
    }
}
