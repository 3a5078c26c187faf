//! Vertical frequency scale of the spectrum display.
//!
//! The axis is `f(p) = a · (b^p − 1)` for `p` in `[0, 1]` measured from the bottom of the strip.
//! It passes through `f(0) = 0`, `f(1) = max_frequency` and puts 1 kHz at the reference
//! position, so moving the reference blends between a linear and a logarithmic scale.

/// Frequency pinned to the reference position.
pub const REFERENCE_FREQUENCY: f32 = 1_000.0;

const SOLVE_RANGE: f64 = 700.0;
const SOLVE_ITERATIONS: usize = 200;
const LINEAR_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Curve {
    Linear,
    /// `a · expm1(x · p)`, where `x = ln b`.
    Exponential { a: f64, x: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyAxis {
    max_frequency: f32,
    curve: Curve,
}

impl FrequencyAxis {
    /// Build the axis for a top frequency and the position of 1 kHz.
    pub fn new(max_frequency: f32, reference_position: f32) -> Self {
        let max_frequency = max_frequency.max(0.0);
        let curve = solve_curve(max_frequency as f64, reference_position as f64);
        Self {
            max_frequency,
            curve,
        }
    }

    pub fn max_frequency(&self) -> f32 {
        self.max_frequency
    }

    pub fn is_linear(&self) -> bool {
        self.curve == Curve::Linear
    }

    /// Frequency in Hz at `position`, clamped into `[0, 1]`.
    pub fn frequency_at(&self, position: f32) -> f32 {
        let p = position.clamp(0.0, 1.0) as f64;
        let frequency = match self.curve {
            Curve::Linear => self.max_frequency as f64 * p,
            Curve::Exponential { a, x } => a * (x * p).exp_m1(),
        };
        frequency as f32
    }
}

fn solve_curve(max_frequency: f64, reference_position: f64) -> Curve {
    let reference = REFERENCE_FREQUENCY as f64;
    if max_frequency <= reference || !(reference_position > 0.0 && reference_position < 1.0) {
        return Curve::Linear;
    }
    let ratio = reference / max_frequency;
    if (reference_position - ratio).abs() < LINEAR_TOLERANCE {
        return Curve::Linear;
    }

    // `shape` falls monotonically from 1 to 0 as `x` grows.
    let shape = |x: f64| {
        if x.abs() < 1e-12 {
            reference_position
        } else {
            (x * reference_position).exp_m1() / x.exp_m1()
        }
    };
    let (mut lo, mut hi) = (-SOLVE_RANGE, SOLVE_RANGE);
    for _ in 0..SOLVE_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        if shape(mid) > ratio {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    let x = 0.5 * (lo + hi);
    if x.abs() < 1e-12 {
        return Curve::Linear;
    }
    Curve::Exponential {
        a: max_frequency / x.exp_m1(),
        x,
    }
}
