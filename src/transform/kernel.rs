//! Per-pixel absorbance kernel
//!
//! Frames are transformed in double precision and only narrowed to `f32`
//! for storage, so tiny positive transmissions keep a finite absorbance.

use ndarray::{Array, Dimension};

/// Absorbance of a single transmission value: `-ln(x)`.
///
/// No clamping is applied. `x == 0` gives `+inf`, negative values and NaN
/// give NaN.
#[inline]
pub fn minus_ln(value: f64) -> f64 {
    -value.ln()
}

/// Absorbance of every element, narrowed to `f32`.
///
/// Returns the output frame together with how many of its values are not
/// finite.
pub fn minus_ln_frame<D: Dimension>(frame: &Array<f64, D>) -> (Array<f32, D>, u64) {
    let mut non_finite = 0u64;
    let out = frame.mapv(|value| {
        let out = minus_ln(value) as f32;
        if !out.is_finite() {
            non_finite += 1;
        }
        out
    });
    (out, non_finite)
}
