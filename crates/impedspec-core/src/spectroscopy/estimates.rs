//! Automatic initial estimates for the built-in models 1 to 28
//!
//! Each model has its own closed-form seed built from aggregate features of
//! the measured spectrum (extremes of Re[Z] and Im[Z], the frequency of the
//! most negative Im[Z], averaged element values). The seeds only need to put
//! the simplex in the right basin; they are not exact inverses.

use std::f64::consts::PI;

use num_complex::Complex64;
use tracing::{debug, warn};

use crate::circuit::CircuitModel;
use crate::constants::MAX_AUTO_ESTIMATE_MODEL;
use crate::error::{ImpedanceError, Result};

/// Starting point and initial simplex steps for a fit
#[derive(Debug, Clone, PartialEq)]
pub struct InitialEstimates {
    pub estimates: Vec<f64>,
    pub steps: Vec<f64>,
}

/// Features of a measured spectrum shared by the heuristics
struct SpectrumSummary<'a> {
    f: &'a [f64],
    omega: &'a [f64],
    re: Vec<f64>,
    im: Vec<f64>,
    mean_re: f64,
    min_re: f64,
    max_re: f64,
    index_min_im: usize,
    index_max_im: usize,
    imag_big: f64,
    big_index: usize,
    geometric_log_f: f64,
}

fn first_index_of(values: &[f64], target: f64) -> Option<usize> {
    values.iter().position(|&v| v == target)
}

fn fold_min(values: &[f64]) -> f64 {
    values.iter().cloned().fold(f64::INFINITY, f64::min)
}

fn fold_max(values: &[f64]) -> f64 {
    values.iter().cloned().fold(f64::NEG_INFINITY, f64::max)
}

fn geometric_mean(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    (values.iter().map(|v| v.ln()).sum::<f64>() / n).exp()
}

impl<'a> SpectrumSummary<'a> {
    fn new(f: &'a [f64], omega: &'a [f64], z: &[Complex64]) -> Self {
        let n = z.len();
        let re: Vec<f64> = z.iter().map(|c| c.re).collect();
        let im: Vec<f64> = z.iter().map(|c| c.im).collect();

        let mean_re = re.iter().sum::<f64>() / n as f64;
        let min_re = fold_min(&re);
        let max_re = fold_max(&re);
        let min_im = fold_min(&im);
        let max_im = fold_max(&im);
        let index_min_im = first_index_of(&im, min_im).unwrap_or(0);
        let index_max_im = first_index_of(&im, max_im).unwrap_or(0);

        let imag_big = min_im.abs().max(max_im.abs());
        let big_index = first_index_of(&im, imag_big)
            .or_else(|| first_index_of(&im, -imag_big))
            .unwrap_or(n / 2);

        let log_f: Vec<f64> = f.iter().map(|x| x.log10()).collect();
        let geometric_log_f = geometric_mean(&log_f);

        Self {
            f,
            omega,
            re,
            im,
            mean_re,
            min_re,
            max_re,
            index_min_im,
            index_max_im,
            imag_big,
            big_index,
            geometric_log_f,
        }
    }

    fn n(&self) -> usize {
        self.re.len()
    }

    /// Mean of 1/|Im[Z] w|
    fn mean_capacitance(&self) -> f64 {
        let sum: f64 = self
            .im
            .iter()
            .zip(self.omega)
            .map(|(im, w)| 1.0 / (im * w).abs())
            .sum();
        sum / self.n() as f64
    }

    /// Mean of |Im[Z]/w|
    fn mean_inductance(&self) -> f64 {
        let sum: f64 = self
            .im
            .iter()
            .zip(self.omega)
            .map(|(im, w)| (im / w).abs())
            .sum();
        sum / self.n() as f64
    }

    /// Sum of |Re[Z] sqrt(w)| + |Im[Z] sqrt(w)| from `from` onwards
    fn warburg_sum(&self, from: usize) -> f64 {
        (from..self.n())
            .map(|i| {
                let s = self.omega[i].sqrt();
                (self.re[i] * s).abs() + (self.im[i] * s).abs()
            })
            .sum()
    }

    /// Series L-C from successive pairs of points: (L, C)
    fn series_lc(&self) -> (f64, f64) {
        let (f, im) = (self.f, &self.im);
        let mut sum_l = 0.0;
        let mut sum_c = 0.0;
        for i in 1..self.n() {
            let c = ((f[i] - f[i - 1]) / f[i]) / (im[i] * f[i - 1] - im[i - 1] * f[i]);
            let l = (im[i] + 1.0 / (c * f[i])) / f[i];
            sum_l += l;
            sum_c += c;
        }
        let m = (self.n() - 1) as f64;
        (sum_l / m, sum_c / m)
    }

    /// Parallel L-C seeded from the frequency of the most negative Im[Z]: (L, C)
    fn parallel_lc(&self) -> (f64, f64) {
        let c_l = 1.0 / self.f[self.index_min_im];
        let mut sum_l = 0.0;
        let mut sum_c = 0.0;
        for i in 1..self.n() {
            let c = self.im[i] * (self.f[i] * c_l - 1.0 / self.f[i]);
            sum_l += c;
            sum_c += c_l / c;
        }
        let n = self.n() as f64;
        (sum_l / n, sum_c / n)
    }

    /// CPE (sigma, alpha) from the mean phase of the points from `from`
    ///
    /// The amplitude match raises w to `power`, or to the estimated alpha
    /// when `power` is `None`.
    fn cpe(&self, from: usize, power: Option<f64>) -> (f64, f64) {
        let count = (self.n() - from) as f64;
        let mean_ratio = (from..self.n()).map(|i| self.im[i] / self.re[i]).sum::<f64>() / count;
        let theta = mean_ratio.atan().abs();
        let (sin_t, cos_t) = theta.sin_cos();
        let alpha = theta / (PI / 2.0);
        let power = power.unwrap_or(alpha);
        let sigma: f64 = (from..self.n())
            .map(|i| {
                let wp = self.omega[i].powf(power);
                (self.re[i] / (cos_t * wp)).abs() + (self.im[i] / (sin_t * wp)).abs()
            })
            .sum();
        (sigma / (2.0 * count), alpha)
    }

    /// Whether the most negative Im[Z] leaves at least three points above it
    fn peak_in_range(&self) -> bool {
        self.index_min_im + 3 < self.n()
    }

    fn f_at_min_im(&self) -> f64 {
        self.f[self.index_min_im]
    }
}

/// Initial estimates and steps for a built-in model from a measured spectrum
///
/// `steps` are `step_fraction` of each estimate; a zero step is replaced by a
/// default chosen from the leading letters of the parameter symbol.
pub fn automatic_estimates(
    model: CircuitModel,
    frequencies: &[f64],
    omegas: &[f64],
    impedances: &[Complex64],
    step_fraction: f64,
) -> Result<InitialEstimates> {
    let number = model.number();
    if number > MAX_AUTO_ESTIMATE_MODEL {
        return Err(ImpedanceError::NoAutomaticEstimates(number));
    }
    let np = model.n_parameters();
    let n = impedances.len();
    if n <= np {
        return Err(ImpedanceError::InvalidDegreesOfFreedom(n as isize - np as isize));
    }

    let s = SpectrumSummary::new(frequencies, omegas, impedances);
    let mut e = vec![0.0; np];

    match number {
        1 => e[0] = s.mean_re,
        2 => e[0] = s.mean_capacitance(),
        3 => e[0] = s.mean_inductance(),
        4 => e[0] = s.warburg_sum(0) / (2.0 * n as f64),
        5 => {
            e[0] = s.warburg_sum(0) / (2.0 * n as f64);
            e[1] = (s.mean_re / e[0]).abs();
        }
        6 => {
            let (sigma, alpha) = s.cpe(0, None);
            e[0] = sigma;
            e[1] = alpha;
        }
        7 => {
            e[0] = s.mean_re;
            e[1] = s.mean_capacitance();
        }
        8 => {
            e[0] = s.mean_re;
            e[1] = s.mean_inductance();
        }
        9 => {
            let (l, c) = s.series_lc();
            e[0] = l;
            e[1] = c;
        }
        10 => {
            e[0] = s.max_re;
            e[1] = 1.0 / (s.max_re * s.f_at_min_im());
        }
        11 => {
            e[0] = s.max_re;
            e[1] = s.max_re / s.f[s.index_max_im];
        }
        12 => {
            let (l, c) = s.parallel_lc();
            e[0] = l;
            e[1] = c;
        }
        13 => {
            e[2] = s.min_re;
            e[0] = s.max_re - s.min_re;
            e[1] = 1.0 / (e[0] * s.f_at_min_im());
        }
        14 => {
            e[2] = s.min_re;
            e[0] = s.max_re - s.min_re;
            let (l, c) = s.series_lc();
            e[3] = l;
            e[1] = c;
        }
        15 => {
            e[2] = s.min_re;
            e[0] = s.max_re - s.min_re;
            let (l, c) = s.parallel_lc();
            e[3] = l;
            e[1] = c;
        }
        16 => {
            e[0] = s.max_re;
            e[1] = 2.0 * s.mean_capacitance();
            e[2] = e[1];
        }
        17 => {
            e[0] = s.max_re;
            e[1] = s.mean_capacitance() / 2.0;
            e[2] = e[1];
        }
        18 => {
            e[0] = s.min_re;
            e[2] = s.max_re - s.min_re;
            e[1] = 2.0 * s.mean_capacitance();
            e[3] = e[1];
        }
        19 => {
            e[0] = s.max_re / 2.0;
            e[2] = e[0];
            e[1] = 2.0 / (e[0] * s.f_at_min_im());
            e[3] = e[1];
        }
        20 => {
            e[4] = s.min_re;
            e[0] = (s.max_re - s.min_re) / 2.0;
            e[2] = e[0];
            e[1] = 2.0 / (e[0] * s.f_at_min_im());
            e[3] = e[1];
        }
        21 => {
            e[4] = s.min_re;
            e[0] = (s.max_re - s.min_re) / 2.0;
            e[2] = e[0];
            e[1] = s.mean_capacitance() / 2.0;
            e[3] = e[1];
        }
        22 => {
            e[0] = s.max_re / 3.0;
            e[2] = e[0];
            e[4] = e[0];
            e[1] = 3.0 / (e[0] * s.f_at_min_im());
            e[3] = e[1];
            e[5] = e[1];
        }
        23 => {
            e[6] = s.min_re;
            e[0] = (s.max_re - s.min_re) / 3.0;
            e[2] = e[0];
            e[4] = e[0];
            e[1] = 3.0 / (e[0] * s.f_at_min_im());
            e[3] = e[1];
            e[5] = e[1];
        }
        24 => {
            e[3] = s.min_re;
            e[0] = s.max_re - s.min_re;
            if s.peak_in_range() {
                let from = s.index_min_im;
                e[1] = 1.0 / (e[0] * s.f_at_min_im());
                e[2] = s.warburg_sum(from) / (2.0 * (n - from) as f64);
            } else {
                e[1] = 1.0 / (e[0] * s.geometric_log_f);
                e[2] = s.warburg_sum(0) / (2.0 * n as f64);
            }
        }
        25 => {
            e[4] = s.min_re;
            e[0] = s.max_re - s.min_re;
            if s.peak_in_range() {
                let from = s.index_min_im;
                e[1] = 1.0 / (e[0] * s.f_at_min_im());
                e[2] = s.warburg_sum(from) / (2.0 * (n - from) as f64);
            } else {
                e[1] = 1.0 / (e[0] * s.geometric_log_f);
                e[2] = s.warburg_sum(0) / (2.0 * n as f64);
            }
            e[3] = (s.mean_re / e[2]).abs();
        }
        26 => {
            e[4] = s.min_re;
            e[0] = s.max_re - s.min_re;
            let from = if s.peak_in_range() {
                e[1] = 1.0 / (e[0] * s.f_at_min_im());
                s.index_min_im
            } else {
                e[1] = 1.0 / (e[0] * s.geometric_log_f);
                0
            };
            // amplitude match raises w to the C1 seed
            let (sigma, alpha) = s.cpe(from, Some(e[1]));
            e[2] = sigma;
            e[3] = alpha;
        }
        27 => {
            e[0] = s.max_re / 2.0;
            e[2] = e[0];
            let freq = if s.peak_in_range() {
                s.f_at_min_im()
            } else {
                s.geometric_log_f
            };
            e[1] = 2.0 / (e[0] * freq);
            e[3] = e[1];
            let sum = s.warburg_sum(s.index_min_im);
            e[4] = if s.peak_in_range() {
                sum / (2.0 * (n - s.index_min_im) as f64)
            } else {
                sum / (2.0 * n as f64)
            };
        }
        28 => {
            e[6] = s.min_re;
            e[0] = (s.max_re - s.min_re) / 2.0;
            e[2] = e[0];
            let freq = if s.peak_in_range() {
                s.f_at_min_im()
            } else {
                s.geometric_log_f
            };
            e[1] = 3.0 / (e[0] * freq);
            e[3] = e[1];
            e[5] = e[1];
            let sum = s.warburg_sum(s.index_min_im);
            e[4] = if s.peak_in_range() {
                sum / (2.0 * (n - s.index_min_im) as f64)
            } else {
                sum / (2.0 * n as f64)
            };
        }
        _ => return Err(ImpedanceError::NoAutomaticEstimates(number)),
    }

    if !s.peak_in_range() && (24..=28).contains(&number) && !s.geometric_log_f.is_finite() {
        warn!(
            model = number,
            "the capacitance seed uses the geometric mean of log10(f), which is undefined below 1 Hz"
        );
    }
    for (symbol, value) in model.symbols().iter().zip(&e) {
        if !value.is_finite() {
            warn!(model = number, symbol, "automatic initial estimate is not finite");
        }
    }

    let steps = default_steps(model.symbols(), &e, step_fraction, &s);
    debug!(model = number, estimates = ?e, steps = ?steps, "automatic initial estimates");

    Ok(InitialEstimates { estimates: e, steps })
}

/// `step_fraction` of each estimate, with zero steps replaced by a default
/// scaled to the spectrum and chosen by symbol prefix
fn default_steps(
    symbols: &[&str],
    estimates: &[f64],
    step_fraction: f64,
    s: &SpectrumSummary<'_>,
) -> Vec<f64> {
    let f_big = s.f[s.big_index];
    estimates
        .iter()
        .zip(symbols)
        .map(|(&est, symbol)| {
            let step = (est * step_fraction).abs();
            if step != 0.0 {
                return step;
            }
            let symbol = symbol.trim();
            if symbol.starts_with('R') {
                s.max_re * 0.01
            } else if symbol.starts_with('C') {
                0.01 / (s.imag_big * f_big)
            } else if symbol.starts_with('L') {
                s.imag_big * 0.01 / f_big
            } else if symbol.starts_with('W')
                || symbol.starts_with("Fs")
                || symbol.starts_with("Qs")
            {
                0.01 / (s.imag_big * f_big.sqrt())
            } else if symbol.starts_with("Fd") {
                0.05
            } else if symbol.starts_with("Qa") {
                0.005
            } else {
                step
            }
        })
        .collect()
}
