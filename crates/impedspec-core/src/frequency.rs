//! Frequency sweeps
//!
//! A `Frequency` holds frequencies in Hz alongside the radial frequencies the
//! circuit models are evaluated at. Measured frequencies keep the order the
//! caller entered them in; generated sweeps run from low to high.

use std::f64::consts::PI;

/// Spacing of a generated sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SweepType {
    Linear,
    #[default]
    Log10,
}

impl SweepType {
    pub fn from_log_flag(log: bool) -> Self {
        if log {
            SweepType::Log10
        } else {
            SweepType::Linear
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Frequency {
    /// Hz
    f: Vec<f64>,
    /// rad/s
    omega: Vec<f64>,
}

impl Frequency {
    /// `npoints` frequencies from `low` to `high` Hz
    ///
    /// The end points are exact. A log10 sweep needs positive bounds.
    ///
    /// # Example
    /// ```
    /// use impedspec_core::frequency::{Frequency, SweepType};
    /// let sweep = Frequency::sweep(1.0, 1e5, 51, SweepType::Log10);
    /// assert_eq!(sweep.npoints(), 51);
    /// assert_eq!(sweep.f()[50], 1e5);
    /// ```
    pub fn sweep(low: f64, high: f64, npoints: usize, sweep_type: SweepType) -> Self {
        if npoints < 2 {
            return Self::from_hz(vec![low; npoints]);
        }
        let last = npoints - 1;
        let position = |i: usize| i as f64 / last as f64;
        let f = (0..npoints)
            .map(|i| match (i, sweep_type) {
                (0, _) => low,
                (i, _) if i == last => high,
                (i, SweepType::Linear) => low + (high - low) * position(i),
                (i, SweepType::Log10) => {
                    10f64.powf(low.log10() + (high.log10() - low.log10()) * position(i))
                }
            })
            .collect();
        Self::from_hz(f)
    }

    /// Measured frequencies in Hz, order kept
    pub fn from_hz(f: Vec<f64>) -> Self {
        let omega = f.iter().map(|&x| 2.0 * PI * x).collect();
        Self { f, omega }
    }

    #[inline]
    pub fn f(&self) -> &[f64] {
        &self.f
    }

    #[inline]
    pub fn omega(&self) -> &[f64] {
        &self.omega
    }

    pub fn log10_f(&self) -> Vec<f64> {
        self.f.iter().map(|x| x.log10()).collect()
    }

    #[inline]
    pub fn npoints(&self) -> usize {
        self.f.len()
    }

    pub fn min(&self) -> f64 {
        self.f.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.f.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Dense sweep from the lowest to the highest frequency, used for the
    /// fitted curve of a plot
    pub fn spanning(&self, npoints: usize, sweep_type: SweepType) -> Frequency {
        Frequency::sweep(self.min(), self.max(), npoints, sweep_type)
    }
}
