// Cubic Bézier timing functions (CSS `cubic-bezier(x1, y1, x2, y2)` semantics).
// x is solved for t with Newton-Raphson from a sampled guess, falling back to bisection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;

const NEWTON_ITERATIONS: usize = 4;
const NEWTON_MIN_SLOPE: f64 = 0.001;
const SUBDIVISION_PRECISION: f64 = 0.000_000_1;
const SUBDIVISION_MAX_ITERATIONS: usize = 10;

const SPLINE_TABLE_SIZE: usize = 11;
const SAMPLE_STEP_SIZE: f64 = 1.0 / (SPLINE_TABLE_SIZE as f64 - 1.0);

/// A cubic Bézier curve from (0,0) to (1,1) with two control points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    samples: [f64; SPLINE_TABLE_SIZE],
}

impl CubicBezier {
    /// Build a curve. The x coordinates must lie in [0, 1] so the curve is a function of x.
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Result<Self, ViewerError> {
        let in_unit = |v: f64| (0.0..=1.0).contains(&v);
        if !(in_unit(x1) && in_unit(x2)) || !y1.is_finite() || !y2.is_finite() {
            return Err(ViewerError::InvalidEasing(format!(
                "cubic-bezier({}, {}, {}, {})",
                x1, y1, x2, y2
            )));
        }
        Ok(Self::build(x1, y1, x2, y2))
    }

    fn build(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let mut samples = [0.0; SPLINE_TABLE_SIZE];
        for (i, sample) in samples.iter_mut().enumerate() {
            *sample = calc_bezier(i as f64 * SAMPLE_STEP_SIZE, x1, x2);
        }

        CubicBezier {
            x1,
            y1,
            x2,
            y2,
            samples,
        }
    }

    /// Control points as `(x1, y1, x2, y2)`.
    pub fn control_points(&self) -> (f64, f64, f64, f64) {
        (self.x1, self.y1, self.x2, self.y2)
    }

    /// Progress at time fraction `x`. Exact at 0 and 1; may overshoot in between.
    pub fn at(&self, x: f64) -> f64 {
        if self.x1 == self.y1 && self.x2 == self.y2 {
            return x;
        }
        if x == 0.0 || x == 1.0 {
            return x;
        }
        calc_bezier(self.t_for_x(x), self.y1, self.y2)
    }

    fn t_for_x(&self, x: f64) -> f64 {
        let last_sample = SPLINE_TABLE_SIZE - 1;
        let mut interval_start = 0.0;
        let mut current = 1;

        while current != last_sample && self.samples[current] <= x {
            interval_start += SAMPLE_STEP_SIZE;
            current += 1;
        }
        current -= 1;

        // Interpolate to provide an initial guess for t.
        let dist = (x - self.samples[current]) / (self.samples[current + 1] - self.samples[current]);
        let guess = interval_start + dist * SAMPLE_STEP_SIZE;

        let initial_slope = slope(guess, self.x1, self.x2);
        if initial_slope >= NEWTON_MIN_SLOPE {
            newton_raphson(x, guess, self.x1, self.x2)
        } else if initial_slope == 0.0 {
            guess
        } else {
            binary_subdivide(x, interval_start, interval_start + SAMPLE_STEP_SIZE, self.x1, self.x2)
        }
    }
}

fn coeff_a(a1: f64, a2: f64) -> f64 {
    1.0 - 3.0 * a2 + 3.0 * a1
}

fn coeff_b(a1: f64, a2: f64) -> f64 {
    3.0 * a2 - 6.0 * a1
}

fn coeff_c(a1: f64) -> f64 {
    3.0 * a1
}

fn calc_bezier(t: f64, a1: f64, a2: f64) -> f64 {
    ((coeff_a(a1, a2) * t + coeff_b(a1, a2)) * t + coeff_c(a1)) * t
}

fn slope(t: f64, a1: f64, a2: f64) -> f64 {
    3.0 * coeff_a(a1, a2) * t * t + 2.0 * coeff_b(a1, a2) * t + coeff_c(a1)
}

fn newton_raphson(x: f64, mut guess: f64, x1: f64, x2: f64) -> f64 {
    for _ in 0..NEWTON_ITERATIONS {
        let current_slope = slope(guess, x1, x2);
        if current_slope == 0.0 {
            return guess;
        }
        let current_x = calc_bezier(guess, x1, x2) - x;
        guess -= current_x / current_slope;
    }
    guess
}

fn binary_subdivide(x: f64, mut a: f64, mut b: f64, x1: f64, x2: f64) -> f64 {
    let mut t = a;
    for _ in 0..SUBDIVISION_MAX_ITERATIONS {
        t = a + (b - a) / 2.0;
        let current_x = calc_bezier(t, x1, x2) - x;
        if current_x > 0.0 {
            b = t;
        } else {
            a = t;
        }
        if current_x.abs() <= SUBDIVISION_PRECISION {
            break;
        }
    }
    t
}

/// Named timing curves for auto-rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Easing {
    #[serde(rename = "EASE_LINEAR")]
    Linear,
    Ease,
    EaseIn,
    EaseInOut,
    /// Overshoots slightly past 1 before settling.
    #[default]
    EaseOut,
}

impl Easing {
    pub const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::Ease,
        Easing::EaseIn,
        Easing::EaseInOut,
        Easing::EaseOut,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "EASE_LINEAR",
            Easing::Ease => "EASE",
            Easing::EaseIn => "EASE_IN",
            Easing::EaseInOut => "EASE_IN_OUT",
            Easing::EaseOut => "EASE_OUT",
        }
    }

    pub fn curve(&self) -> CubicBezier {
        let (x1, y1, x2, y2) = match self {
            Easing::Linear => (0.0, 0.0, 1.0, 1.0),
            Easing::Ease => (0.25, 0.1, 0.25, 1.0),
            Easing::EaseIn => (0.0, 0.0, 1.0, 0.5),
            Easing::EaseInOut => (0.42, 0.0, 0.58, 1.0),
            Easing::EaseOut => (0.61, 0.26, 0.08, 1.46),
        };
        CubicBezier::build(x1, y1, x2, y2)
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|easing| easing.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ViewerError::InvalidEasing(s.to_string()))
    }
}

/// Anything that maps a time fraction in [0, 1] to progress.
pub trait TimingFunction {
    fn ease(&self, fraction: f64) -> f64;
}

impl TimingFunction for CubicBezier {
    fn ease(&self, fraction: f64) -> f64 {
        self.at(fraction)
    }
}

impl From<Easing> for CubicBezier {
    fn from(easing: Easing) -> Self {
        easing.curve()
    }
}
