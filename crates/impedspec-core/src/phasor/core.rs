//! Phasor - a complex quantity held as magnitude and phase
//!
//! Addition and subtraction go through the rectangular form. Multiplication,
//! division, powers and roots act on magnitude and phase directly, so phases
//! accumulate without being wrapped into (-180, 180].

use std::fmt;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

use num_complex::Complex64;

use crate::circuit::elements;
use crate::error::{ImpedanceError, Result};
use crate::math::conversions::{degree_2_radian, frequency_2_radial, polar_deg, radian_2_degree};

/// Magnitude and phase (degrees) representation of a complex number
///
/// A negative magnitude is allowed and means a half-turn of extra phase.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Phasor {
    magnitude: f64,
    phase_deg: f64,
}

impl Phasor {
    /// Create from magnitude and phase in degrees
    pub fn new(magnitude: f64, phase_deg: f64) -> Self {
        Self {
            magnitude,
            phase_deg,
        }
    }

    /// Magnitude with zero phase
    pub fn from_magnitude(magnitude: f64) -> Self {
        Self::new(magnitude, 0.0)
    }

    /// Create from magnitude and phase in radians
    pub fn from_polar_rad(magnitude: f64, phase_rad: f64) -> Self {
        Self::new(magnitude, radian_2_degree(phase_rad))
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn one() -> Self {
        Self::new(1.0, 0.0)
    }

    pub fn minus_one() -> Self {
        Self::new(-1.0, 0.0)
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn phase_deg(&self) -> f64 {
        self.phase_deg
    }

    pub fn phase_rad(&self) -> f64 {
        degree_2_radian(self.phase_deg)
    }

    /// Absolute value of the magnitude
    pub fn abs(&self) -> f64 {
        self.magnitude.abs()
    }

    pub fn set_magnitude(&mut self, magnitude: f64) {
        self.magnitude = magnitude;
    }

    pub fn set_phase_deg(&mut self, phase_deg: f64) {
        self.phase_deg = phase_deg;
    }

    /// Real part
    pub fn re(&self) -> f64 {
        self.to_complex().re
    }

    /// Imaginary part
    pub fn im(&self) -> f64 {
        self.to_complex().im
    }

    /// Rectangular form
    pub fn to_complex(&self) -> Complex64 {
        polar_deg(self.magnitude, self.phase_deg)
    }

    // ========================================================================
    // Unary functions
    // ========================================================================

    pub fn conjugate(&self) -> Self {
        Self::new(self.magnitude, -self.phase_deg)
    }

    /// 1 / self
    pub fn inverse(&self) -> Self {
        Self::new(1.0 / self.magnitude, -self.phase_deg)
    }

    pub fn sqrt(&self) -> Self {
        Self::new(self.magnitude.sqrt(), self.phase_deg / 2.0)
    }

    /// n-th root; `n` must be positive
    pub fn nth_root(&self, n: u32) -> Result<Self> {
        if n == 0 {
            return Err(ImpedanceError::InvalidArgument(
                "The root, 0, must be greater than zero".to_string(),
            ));
        }
        let n = n as f64;
        Ok(Self::new(self.magnitude.powf(1.0 / n), self.phase_deg / n))
    }

    pub fn square(&self) -> Self {
        Self::new(self.magnitude * self.magnitude, 2.0 * self.phase_deg)
    }

    pub fn powi(&self, n: i32) -> Self {
        Self::new(self.magnitude.powi(n), n as f64 * self.phase_deg)
    }

    pub fn powf(&self, n: f64) -> Self {
        Self::new(self.magnitude.powf(n), n * self.phase_deg)
    }

    /// Complex power, principal branch
    pub fn powc(&self, n: Complex64) -> Self {
        Self::from(self.to_complex().powc(n))
    }

    pub fn exp(&self) -> Self {
        Self::from(self.to_complex().exp())
    }

    /// Natural logarithm, principal branch
    pub fn ln(&self) -> Self {
        Self::from(self.to_complex().ln())
    }

    pub fn sin(&self) -> Self {
        if self.phase_deg == 0.0 {
            return Self::from_magnitude(self.magnitude.sin());
        }
        Self::from(self.to_complex().sin())
    }

    pub fn cos(&self) -> Self {
        if self.phase_deg == 0.0 {
            return Self::from_magnitude(self.magnitude.cos());
        }
        Self::from(self.to_complex().cos())
    }

    pub fn tan(&self) -> Self {
        if self.phase_deg == 0.0 {
            return Self::from_magnitude(self.magnitude.tan());
        }
        Self::from(self.to_complex().tan())
    }

    /// Multiply by exp(j omega t)
    pub fn rotate_omega_time(&self, omega: f64, time: f64) -> Self {
        Self::new(self.magnitude, self.phase_deg + radian_2_degree(omega * time))
    }

    // ========================================================================
    // Tests
    // ========================================================================

    pub fn is_real(&self) -> bool {
        self.phase_deg == 0.0
    }

    pub fn is_zero(&self) -> bool {
        self.magnitude == 0.0 || self.phase_deg == f64::NEG_INFINITY
    }

    pub fn is_nan(&self) -> bool {
        self.magnitude.is_nan() || self.phase_deg.is_nan()
    }

    pub fn is_infinite(&self) -> bool {
        self.magnitude.is_infinite() || self.phase_deg.is_infinite()
    }

    /// True if magnitudes and phases each differ by less than `fract` of the larger one
    pub fn equals_within_limits(&self, other: &Phasor, fract: f64) -> bool {
        let relative = |a: f64, b: f64| {
            let big = a.abs().max(b.abs());
            if big == 0.0 {
                0.0
            } else {
                (a - b).abs() / big
            }
        };
        relative(self.magnitude, other.magnitude) < fract
            && relative(self.phase_deg, other.phase_deg) < fract
    }

    // ========================================================================
    // Circuit elements at an explicit frequency (Hz)
    // ========================================================================

    pub fn resistance(r: f64) -> Self {
        Self::from_magnitude(r)
    }

    pub fn inductance(l: f64, frequency: f64) -> Self {
        Self::from(elements::inductance(l, frequency_2_radial(frequency)))
    }

    pub fn capacitance(c: f64, frequency: f64) -> Self {
        Self::from(elements::capacitance(c, frequency_2_radial(frequency)))
    }

    pub fn infinite_warburg(sigma: f64, frequency: f64) -> Self {
        Self::from(elements::infinite_warburg(sigma, frequency_2_radial(frequency)))
    }

    pub fn finite_warburg(sigma: f64, delta: f64, frequency: f64) -> Self {
        Self::from(elements::finite_warburg(sigma, delta, frequency_2_radial(frequency)))
    }

    pub fn constant_phase(sigma: f64, alpha: f64, frequency: f64) -> Self {
        Self::from(elements::constant_phase(sigma, alpha, frequency_2_radial(frequency)))
    }
}

impl From<Complex64> for Phasor {
    fn from(z: Complex64) -> Self {
        Self::from_polar_rad(z.norm(), z.arg())
    }
}

impl From<Phasor> for Complex64 {
    fn from(p: Phasor) -> Self {
        p.to_complex()
    }
}

impl From<f64> for Phasor {
    fn from(x: f64) -> Self {
        Self::from_magnitude(x)
    }
}

impl fmt::Display for Phasor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}<{}deg", self.magnitude, self.phase_deg)
    }
}

/// Parses `magnitude<phase`, with `L` accepted for `<` and an optional
/// `deg` or `rad` suffix; a bare phase is in degrees.
impl FromStr for Phasor {
    type Err = ImpedanceError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bad = || ImpedanceError::InvalidArgument(format!("cannot parse phasor from '{}'", s));
        let (mag, phase) = s.split_once('<').or_else(|| s.split_once('L')).ok_or_else(bad)?;
        let magnitude: f64 = mag.trim().parse().map_err(|_| bad())?;

        let phase = phase.trim().to_ascii_lowercase();
        let radians = phase.ends_with("rad");
        let value = phase.trim_end_matches("rad").trim_end_matches("deg");
        let value: f64 = value.trim().parse().map_err(|_| bad())?;

        Ok(if radians {
            Self::from_polar_rad(magnitude, value)
        } else {
            Self::new(magnitude, value)
        })
    }
}

// ============================================================================
// Operators
// ============================================================================

impl Neg for Phasor {
    type Output = Phasor;

    fn neg(self) -> Phasor {
        Phasor::new(-self.magnitude, self.phase_deg)
    }
}

impl Add for Phasor {
    type Output = Phasor;

    fn add(self, rhs: Phasor) -> Phasor {
        Phasor::from(self.to_complex() + rhs.to_complex())
    }
}

impl Sub for Phasor {
    type Output = Phasor;

    fn sub(self, rhs: Phasor) -> Phasor {
        Phasor::from(self.to_complex() - rhs.to_complex())
    }
}

impl Mul for Phasor {
    type Output = Phasor;

    fn mul(self, rhs: Phasor) -> Phasor {
        Phasor::new(self.magnitude * rhs.magnitude, self.phase_deg + rhs.phase_deg)
    }
}

impl Div for Phasor {
    type Output = Phasor;

    fn div(self, rhs: Phasor) -> Phasor {
        Phasor::new(self.magnitude / rhs.magnitude, self.phase_deg - rhs.phase_deg)
    }
}

impl Mul<f64> for Phasor {
    type Output = Phasor;

    fn mul(self, rhs: f64) -> Phasor {
        Phasor::new(self.magnitude * rhs, self.phase_deg)
    }
}

impl Div<f64> for Phasor {
    type Output = Phasor;

    fn div(self, rhs: f64) -> Phasor {
        Phasor::new(self.magnitude / rhs, self.phase_deg)
    }
}

impl Add<f64> for Phasor {
    type Output = Phasor;

    fn add(self, rhs: f64) -> Phasor {
        Phasor::from(self.to_complex() + rhs)
    }
}

impl Sub<f64> for Phasor {
    type Output = Phasor;

    fn sub(self, rhs: f64) -> Phasor {
        Phasor::from(self.to_complex() - rhs)
    }
}

macro_rules! complex_rhs {
    ($($tr:ident $method:ident),*) => {
        $(
            impl $tr<Complex64> for Phasor {
                type Output = Phasor;

                fn $method(self, rhs: Complex64) -> Phasor {
                    $tr::$method(self, Phasor::from(rhs))
                }
            }
        )*
    };
}

complex_rhs!(Add add, Sub sub, Mul mul, Div div);

macro_rules! assign_ops {
    ($rhs:ty; $($tr:ident $method:ident $op:tt),*) => {
        $(
            impl $tr<$rhs> for Phasor {
                fn $method(&mut self, rhs: $rhs) {
                    *self = *self $op rhs;
                }
            }
        )*
    };
}

assign_ops!(Phasor; AddAssign add_assign +, SubAssign sub_assign -, MulAssign mul_assign *, DivAssign div_assign /);
assign_ops!(Complex64; AddAssign add_assign +, SubAssign sub_assign -, MulAssign mul_assign *, DivAssign div_assign /);
assign_ops!(f64; AddAssign add_assign +, SubAssign sub_assign -, MulAssign mul_assign *, DivAssign div_assign /);
