//! Impedance primitives and two-element combinators
//!
//! Every function here is total: a zero capacitance or frequency gives an
//! infinite or NaN component instead of an error.

use num_complex::Complex64;

// ============================================================================
// Single elements
// ============================================================================

/// Impedance of a resistance
#[inline]
pub fn resistance(r: f64) -> Complex64 {
    Complex64::new(r, 0.0)
}

/// Impedance of a capacitance at radial frequency `omega`, -j/(C omega)
#[inline]
pub fn capacitance(c: f64, omega: f64) -> Complex64 {
    Complex64::new(0.0, -1.0 / (c * omega))
}

/// Impedance of an inductance at radial frequency `omega`, j L omega
#[inline]
pub fn inductance(l: f64, omega: f64) -> Complex64 {
    Complex64::new(0.0, l * omega)
}

/// Infinite (semi-infinite diffusion) Warburg impedance, sigma/sqrt(omega) (1 - j)
pub fn infinite_warburg(sigma: f64, omega: f64) -> Complex64 {
    let term = sigma / omega.sqrt();
    Complex64::new(term, -term)
}

/// Finite Warburg impedance
///
/// `(1 - j) sigma sqrt(omega) tanh(delta sqrt(j omega))`
pub fn finite_warburg(sigma: f64, delta: f64, omega: f64) -> Complex64 {
    let amplitude = Complex64::new(sigma * omega.sqrt(), 0.0);
    let root = Complex64::new(0.0, omega).sqrt();
    let tanh = (root * delta).tanh();
    Complex64::new(1.0, -1.0) * amplitude * tanh
}

/// Constant phase element, sigma (j omega)^(-alpha)
pub fn constant_phase(sigma: f64, alpha: f64, omega: f64) -> Complex64 {
    Complex64::new(0.0, omega).powf(-alpha) * sigma
}

// ============================================================================
// Combinators
// ============================================================================

/// Two impedances in series
#[inline]
pub fn series(z1: Complex64, z2: Complex64) -> Complex64 {
    z1 + z2
}

/// Two impedances in parallel, z1 z2 / (z1 + z2)
#[inline]
pub fn parallel(z1: Complex64, z2: Complex64) -> Complex64 {
    (z1 * z2) / (z1 + z2)
}

/// Resistance in series with a capacitance
pub fn r_series_c(r: f64, c: f64, omega: f64) -> Complex64 {
    Complex64::new(r, -1.0 / (c * omega))
}

/// Resistance in series with an inductance
pub fn r_series_l(r: f64, l: f64, omega: f64) -> Complex64 {
    Complex64::new(r, l * omega)
}

/// Capacitance in series with an inductance
pub fn c_series_l(c: f64, l: f64, omega: f64) -> Complex64 {
    capacitance(c, omega) + inductance(l, omega)
}

/// Resistance in parallel with a capacitance
pub fn r_parallel_c(r: f64, c: f64, omega: f64) -> Complex64 {
    parallel(capacitance(c, omega), resistance(r))
}

/// Resistance in parallel with an inductance
pub fn r_parallel_l(r: f64, l: f64, omega: f64) -> Complex64 {
    parallel(inductance(l, omega), resistance(r))
}

/// Capacitance in parallel with an inductance
pub fn c_parallel_l(c: f64, l: f64, omega: f64) -> Complex64 {
    parallel(capacitance(c, omega), inductance(l, omega))
}
