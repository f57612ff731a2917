//! # Eased Interpolation
//!
//! Cosine easing between two stages: `eased = (1 - cos(p * π)) / 2`.
//! The blend has zero velocity at both ends, so a transition starts and
//! stops smoothly instead of snapping to a linear ramp.

use crate::types::Color;
use std::f64::consts::PI;

/// Map linear progress in `[0, 1]` to eased progress in `[0, 1]`.
///
/// Out-of-range input is clamped first.
#[must_use]
pub fn ease(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    (1.0 - (p * PI).cos()) / 2.0
}

/// Blend two scalars at `progress`.
#[must_use]
pub fn interpolate(start: f64, end: f64, progress: f64) -> f64 {
    start + (end - start) * ease(progress)
}

/// Blend two colors channel by channel.
#[must_use]
pub fn interpolate_color(start: Color, end: Color, progress: f64) -> Color {
    let [r0, g0, b0] = start.channels();
    let [r1, g1, b1] = end.channels();
    Color::new(
        interpolate(r0, r1, progress),
        interpolate(g0, g1, progress),
        interpolate(b0, b1, progress),
    )
}
