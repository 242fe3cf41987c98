//! Complex-number conversions
//!
//! `num_complex::Complex64` is the rectangular complex type used everywhere.
//! This module adds the polar constructors, degree-valued phases and the
//! finiteness checks that callers are expected to run before trusting a
//! result (division by a zero magnitude yields Inf/NaN, never an error).

use num_complex::Complex64;
use std::f64::consts::PI;

/// Magnitude of a complex number
#[inline]
pub fn magnitude(z: Complex64) -> f64 {
    z.norm()
}

/// Phase of a complex number in radians, in (-pi, pi]
#[inline]
pub fn phase_rad(z: Complex64) -> f64 {
    z.arg()
}

/// Phase of a complex number in degrees
#[inline]
pub fn phase_deg(z: Complex64) -> f64 {
    radian_2_degree(z.arg())
}

/// Rectangular complex number from magnitude and phase in radians
#[inline]
pub fn polar_rad(magnitude: f64, phase: f64) -> Complex64 {
    Complex64::from_polar(magnitude, phase)
}

/// Rectangular complex number from magnitude and phase in degrees
#[inline]
pub fn polar_deg(magnitude: f64, phase: f64) -> Complex64 {
    Complex64::from_polar(magnitude, degree_2_radian(phase))
}

/// Convert radians to degrees
#[inline]
pub fn radian_2_degree(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Convert degrees to radians
#[inline]
pub fn degree_2_radian(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Convert a frequency in Hz to a radial frequency
#[inline]
pub fn frequency_2_radial(frequency: f64) -> f64 {
    2.0 * PI * frequency
}

/// Convert a radial frequency to a frequency in Hz
#[inline]
pub fn radial_2_frequency(omega: f64) -> f64 {
    omega / (2.0 * PI)
}

/// True if either part is NaN
#[inline]
pub fn is_nan(z: Complex64) -> bool {
    z.re.is_nan() || z.im.is_nan()
}

/// True if either part is infinite
#[inline]
pub fn is_infinite(z: Complex64) -> bool {
    z.re.is_infinite() || z.im.is_infinite()
}

/// Magnitude, phase (rad) and phase (deg) of each element
pub fn polar_components(values: &[Complex64]) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
    let mags = values.iter().map(|z| z.norm()).collect();
    let rads: Vec<f64> = values.iter().map(|z| z.arg()).collect();
    let degs = rads.iter().map(|&r| radian_2_degree(r)).collect();
    (mags, rads, degs)
}

/// Round to a fixed number of decimal places
///
/// Values outside `[1e-3, 1e7)` are rounded in the mantissa of their
/// scientific form, so small capacitances keep their significant digits.
pub fn truncate(value: f64, places: i32) -> f64 {
    if !value.is_finite() || value == 0.0 {
        return value;
    }
    let scale = 10f64.powi(places);
    if (1e-3..1e7).contains(&value.abs()) {
        return (value * scale).round() / scale;
    }
    let exponent = value.abs().log10().floor() as i32;
    let power = 10f64.powi(exponent);
    ((value / power) * scale).round() / scale * power
}
