//! Scalar helpers shared by the scroll engine and the uniform derivations.

/// Linear interpolation from `a` towards `b` by the factor `n`.
///
/// Written as `a + (b - a) * n` so that `lerp(x, x, n)` is exactly `x`.
pub fn lerp(a: f32, b: f32, n: f32) -> f32 {
    if n >= 1.0 {
        return b;
    }
    a + (b - a) * n
}

/// Linearly remaps `value` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// The result is not clamped; values outside the input domain extrapolate.
pub fn map_range(value: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    let span = in_max - in_min;
    if span == 0.0 {
        return out_min;
    }
    out_min + (value - in_min) / span * (out_max - out_min)
}

/// Describes a linear routing from an input interval to an output interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeMapping {
    pub domain: (f32, f32),
    pub range: (f32, f32),
}

impl RangeMapping {
    pub fn new(domain: (f32, f32), range: (f32, f32)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, value: f32) -> f32 {
        map_range(value, self.domain.0, self.domain.1, self.range.0, self.range.1)
    }
}
