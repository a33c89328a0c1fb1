// Auto-rotation schedule: one full revolution, time-sliced evenly across the frames.
// The index advance multiplies the tick count by the eased fraction, which gives the
// accelerating/decelerating sweep the widget is known for.

use crate::easing::TimingFunction;

pub const DEFAULT_DURATION_MS: f64 = 1000.0;

/// State of one auto-rotation cycle.
pub struct AutoRotation {
    start_index: usize,
    number_of_frames: usize,
    ticks: usize,
    easing: Box<dyn TimingFunction>,
}

/// Result of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub index: usize,
    /// Set on the last tick of the revolution.
    pub finished: bool,
}

impl AutoRotation {
    pub fn new(
        start_index: usize,
        number_of_frames: usize,
        easing: Box<dyn TimingFunction>,
    ) -> Self {
        AutoRotation {
            start_index,
            number_of_frames: number_of_frames.max(1),
            ticks: 0,
            easing,
        }
    }

    /// Timer period: the duration split evenly over one tick per frame.
    pub fn interval_ms(duration_ms: f64, number_of_frames: usize) -> f64 {
        duration_ms / number_of_frames.max(1) as f64
    }

    pub fn ticks(&self) -> usize {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.ticks >= self.number_of_frames
    }

    /// Advance one tick. Returns `None` once the revolution is complete.
    pub fn advance(&mut self) -> Option<Tick> {
        if self.is_finished() {
            return None;
        }
        self.ticks += 1;

        let n = self.number_of_frames as i64;
        let fraction = self.ticks as f64 / self.number_of_frames as f64;
        let eased = self.easing.ease(fraction);
        let step = (self.ticks as f64 * eased).floor();
        // Custom curves may dip below zero or produce NaN; treat NaN as no advance.
        let step = if step.is_finite() { step as i64 } else { 0 };
        let index = (self.start_index as i64 + step).rem_euclid(n) as usize;

        Some(Tick {
            index,
            finished: self.is_finished(),
        })
    }
}

impl std::fmt::Debug for AutoRotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoRotation")
            .field("start_index", &self.start_index)
            .field("number_of_frames", &self.number_of_frames)
            .field("ticks", &self.ticks)
            .finish()
    }
}
