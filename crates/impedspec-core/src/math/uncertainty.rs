//! First-order error propagation for complex quantities
//!
//! Weights entered with measured data are standard errors of the real and
//! imaginary parts (or of magnitude and phase). Converting between encodings
//! propagates them linearly, treating the input components as independent.

use num_complex::Complex64;

/// A complex value with independent standard errors on its real and
/// imaginary parts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComplexUncertain {
    pub value: Complex64,
    pub re_err: f64,
    pub im_err: f64,
}

impl ComplexUncertain {
    pub fn new(value: Complex64, re_err: f64, im_err: f64) -> Self {
        Self {
            value,
            re_err,
            im_err,
        }
    }

    /// Build from magnitude and phase (radians) with their standard errors
    ///
    /// re = m cos(theta), im = m sin(theta)
    pub fn from_polar(magnitude: f64, mag_err: f64, phase: f64, phase_err: f64) -> Self {
        let (s, c) = phase.sin_cos();
        let re_err = (c * mag_err).hypot(magnitude * s * phase_err);
        let im_err = (s * mag_err).hypot(magnitude * c * phase_err);
        Self {
            value: Complex64::from_polar(magnitude, phase),
            re_err,
            im_err,
        }
    }

    /// Errors of f(z) for a holomorphic f with derivative `dfdz` at z
    ///
    /// A real perturbation d shifts f by dfdz*d, an imaginary one by j*dfdz*d.
    pub fn propagate(dfdz: Complex64, re_err: f64, im_err: f64) -> (f64, f64) {
        let re = (dfdz.re * re_err).hypot(dfdz.im * im_err);
        let im = (dfdz.im * re_err).hypot(dfdz.re * im_err);
        (re, im)
    }
}

/// Impedance from the voltage divider Z = zref*v/(vapp - v), with the
/// errors of v and of the (real) applied voltage propagated to Z
pub fn divider_impedance(
    zref: Complex64,
    v: ComplexUncertain,
    vapp: Complex64,
    vapp_err: f64,
) -> ComplexUncertain {
    let denom = vapp - v.value;
    let z = zref * v.value / denom;

    // dZ/dV = zref*vapp/(vapp - v)^2, dZ/dVapp = -zref*v/(vapp - v)^2
    let d2 = denom * denom;
    let dz_dv = zref * vapp / d2;
    let dz_dvapp = -zref * v.value / d2;

    let (re_v, im_v) = ComplexUncertain::propagate(dz_dv, v.re_err, v.im_err);
    let (re_a, im_a) = ComplexUncertain::propagate(dz_dvapp, vapp_err, 0.0);

    ComplexUncertain::new(z, re_v.hypot(re_a), im_v.hypot(im_a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_from_polar_on_real_axis() {
        // At theta = 0 the magnitude error maps onto the real part and the
        // phase error, scaled by m, onto the imaginary part
        let z = ComplexUncertain::from_polar(2.0, 0.1, 0.0, 0.05);
        assert_relative_eq!(z.value.re, 2.0, epsilon = 1e-12);
        assert_relative_eq!(z.re_err, 0.1, epsilon = 1e-12);
        assert_relative_eq!(z.im_err, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_errors_stay_zero() {
        let v = ComplexUncertain::new(Complex64::new(0.3, -0.2), 0.0, 0.0);
        let z = divider_impedance(Complex64::new(100.0, 0.0), v, Complex64::new(1.0, 0.0), 0.0);
        assert_eq!(z.re_err, 0.0);
        assert_eq!(z.im_err, 0.0);
    }

    #[test]
    fn test_divider_value() {
        // v = vapp/2 gives Z = zref
        let v = ComplexUncertain::new(Complex64::new(0.5, 0.0), 0.0, 0.0);
        let z = divider_impedance(Complex64::new(50.0, 0.0), v, Complex64::new(1.0, 0.0), 0.0);
        assert_relative_eq!(z.value.re, 50.0, epsilon = 1e-12);
        assert_relative_eq!(z.value.im, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_divider_error_matches_finite_difference() {
        let zref = Complex64::new(100.0, 0.0);
        let vapp = Complex64::new(1.0, 0.0);
        let v0 = Complex64::new(0.4, -0.1);
        let err = 1e-4;
        let z = divider_impedance(zref, ComplexUncertain::new(v0, err, 0.0), vapp, 0.0);

        let f = |v: Complex64| zref * v / (vapp - v);
        let dz = f(v0 + Complex64::new(err, 0.0)) - f(v0);
        assert_relative_eq!(z.re_err, dz.re.abs(), max_relative = 1e-3);
        assert_relative_eq!(z.im_err, dz.im.abs(), max_relative = 1e-3);
    }
}
