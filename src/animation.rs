//! Axis oscillators and the frame scheduler that drives them.

use indexmap::IndexMap;
use log::debug;

use crate::ValueKey;

/// Default number of frames for one end-to-end traversal.
pub const DEFAULT_TRAVERSAL_FRAMES: u32 = 240;

/// Direction an oscillator is currently moving in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    /// Towards `max`
    #[default]
    Up,
    /// Towards `min`
    Down,
}

impl Direction {
    /// `+1.0` or `-1.0`.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Up => 1.0,
            Direction::Down => -1.0,
        }
    }

    /// The opposite direction.
    #[inline]
    pub fn reversed(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }
}

/// One animated axis value bouncing between its bounds.
#[derive(Clone, Debug, PartialEq)]
pub struct Oscillator {
    pub key: ValueKey,
    pub min: f64,
    pub max: f64,
    pub direction: Direction,
    pub value: f64,
}

impl Oscillator {
    /// Create an oscillator moving up from `value`.
    pub fn new(key: ValueKey, min: f64, max: f64, value: f64) -> Self {
        Self {
            key,
            min,
            max,
            direction: Direction::Up,
            value: value.clamp(min, max),
        }
    }

    /// Advance one frame.
    ///
    /// The speed covers the full range in `traversal_frames` frames. On
    /// reaching a bound the value is pinned to it and the direction flips.
    ///
    /// ```rust
    /// use vfaxis_core_view::{AxisTag, Direction, Oscillator, ValueKey};
    ///
    /// let mut osc = Oscillator::new(ValueKey::shared(AxisTag::WEIGHT), 100.0, 700.0, 695.0);
    /// osc.advance(240);
    /// assert_eq!(osc.value, 697.5);
    /// osc.advance(240);
    /// assert_eq!(osc.value, 700.0);
    /// assert_eq!(osc.direction, Direction::Down);
    /// ```
    pub fn advance(&mut self, traversal_frames: u32) -> f64 {
        let speed = (self.max - self.min) / f64::from(traversal_frames.max(1));
        self.value += speed * self.direction.sign();
        if self.value >= self.max || self.value <= self.min {
            self.value = self.value.clamp(self.min, self.max);
            self.direction = self.direction.reversed();
        }
        self.value
    }
}

/// Whether a frame chain is alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// No frame is pending and nothing animates
    Stopped,
    /// Exactly one frame request is outstanding
    Running,
}

/// What the host should do after a scheduler call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// Request one animation frame and call `tick` from it
    RequestFrame,
    /// Do nothing; either a frame is already pending or nothing animates
    Idle,
}

/// Values produced by one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameStep {
    /// New value per animated key, in start order
    pub values: Vec<(ValueKey, f64)>,
    /// Whether another frame is needed
    pub schedule: Schedule,
}

/// Platform-agnostic scheduler for axis oscillators.
///
/// The scheduler does not own a timer. It tells the caller when to request
/// a frame, and the caller invokes [`tick`](Self::tick) from that frame.
/// There is never more than one outstanding frame request.
///
/// ## Example
///
/// ```rust
/// use vfaxis_core_view::{AnimationScheduler, AxisTag, Schedule, SchedulerState, ValueKey};
///
/// let mut scheduler = AnimationScheduler::new(240);
/// let key = ValueKey::shared(AxisTag::WEIGHT);
///
/// assert_eq!(scheduler.start(key, 100.0, 900.0, 400.0), Schedule::RequestFrame);
/// assert_eq!(scheduler.state(), SchedulerState::Running);
///
/// // Called from the requested frame
/// let step = scheduler.tick().unwrap();
/// assert_eq!(step.values.len(), 1);
/// assert_eq!(step.schedule, Schedule::RequestFrame);
///
/// scheduler.stop(key);
/// assert!(scheduler.tick().is_none());
/// assert_eq!(scheduler.state(), SchedulerState::Stopped);
/// ```
#[derive(Clone, Debug)]
pub struct AnimationScheduler {
    oscillators: IndexMap<ValueKey, Oscillator>,
    traversal_frames: u32,
    frame_pending: bool,
    frames: u64,
}

impl AnimationScheduler {
    /// Create a scheduler with the given end-to-end traversal length.
    pub fn new(traversal_frames: u32) -> Self {
        Self {
            oscillators: IndexMap::new(),
            traversal_frames: traversal_frames.max(1),
            frame_pending: false,
            frames: 0,
        }
    }

    /// Current state.
    #[inline]
    pub fn state(&self) -> SchedulerState {
        if self.frame_pending {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Returns `true` if `key` is animating.
    #[inline]
    pub fn is_animating(&self, key: ValueKey) -> bool {
        self.oscillators.contains_key(&key)
    }

    /// Number of live oscillators.
    #[inline]
    pub fn len(&self) -> usize {
        self.oscillators.len()
    }

    /// Returns `true` when nothing animates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.oscillators.is_empty()
    }

    /// Frames ticked since creation.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Get a live oscillator.
    pub fn oscillator(&self, key: ValueKey) -> Option<&Oscillator> {
        self.oscillators.get(&key)
    }

    /// Start animating `key` from `value`.
    ///
    /// Returns [`Schedule::RequestFrame`] only if no frame chain is alive.
    /// Starting a key that already animates changes nothing.
    pub fn start(&mut self, key: ValueKey, min: f64, max: f64, value: f64) -> Schedule {
        if !self.oscillators.contains_key(&key) {
            self.oscillators.insert(key, Oscillator::new(key, min, max, value));
        }
        if self.frame_pending {
            Schedule::Idle
        } else {
            debug!("Animation loop started");
            self.frame_pending = true;
            Schedule::RequestFrame
        }
    }

    /// Stop animating `key`, returning its last value.
    ///
    /// A pending frame is left to run out; it finds nothing to do and ends
    /// the chain.
    pub fn stop(&mut self, key: ValueKey) -> Option<f64> {
        self.oscillators.shift_remove(&key).map(|o| o.value)
    }

    /// Stop every oscillator.
    pub fn stop_all(&mut self) {
        self.oscillators.clear();
    }

    /// Keep only oscillators for which `keep` returns `true`.
    pub fn retain<F: FnMut(&Oscillator) -> bool>(&mut self, mut keep: F) {
        self.oscillators.retain(|_, osc| keep(osc));
    }

    /// Update an oscillator's bounds, pinning its value into them.
    pub fn set_bounds(&mut self, key: ValueKey, min: f64, max: f64) {
        if let Some(osc) = self.oscillators.get_mut(&key) {
            osc.min = min;
            osc.max = max;
            osc.value = osc.value.clamp(min, max);
        }
    }

    /// Move an oscillator to a value set from outside (e.g. a slider drag).
    ///
    /// Non-finite values are ignored.
    pub fn set_value(&mut self, key: ValueKey, value: f64) {
        if !value.is_finite() {
            return;
        }
        if let Some(osc) = self.oscillators.get_mut(&key) {
            osc.value = value.clamp(osc.min, osc.max);
        }
    }

    /// Forget the pending frame after the host failed to schedule it.
    ///
    /// The next [`start`](Self::start) requests a new frame.
    pub fn abandon_frame(&mut self) {
        if self.frame_pending {
            debug!("Frame request abandoned");
            self.frame_pending = false;
        }
    }

    /// Run one frame.
    ///
    /// Returns `None` and ends the frame chain if nothing animates; the
    /// caller must not request another frame in that case.
    pub fn tick(&mut self) -> Option<FrameStep> {
        self.frame_pending = false;
        if self.oscillators.is_empty() {
            debug!("Animation loop stopped after {} frames", self.frames);
            return None;
        }

        self.frames += 1;
        let frames = self.traversal_frames;
        let values = self
            .oscillators
            .values_mut()
            .map(|osc| (osc.key, osc.advance(frames)))
            .collect();

        self.frame_pending = true;
        Some(FrameStep {
            values,
            schedule: Schedule::RequestFrame,
        })
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_TRAVERSAL_FRAMES)
    }
}
