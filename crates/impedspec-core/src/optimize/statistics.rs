//! Parameter statistics at a least-squares minimum
//!
//! The covariance matrix is estimated from a central-difference Hessian of
//! the objective: `cov = (H/2)^-1`, scaled by the residual variance
//! `SS/dof` when the data carry no weights.

use ndarray::Array2;
use tracing::warn;

use crate::constants::DIFFERENTIATION_STEP;
use crate::math::linalg::symmetric_inverse;

/// Uncertainty estimates for a fitted parameter vector
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterStatistics {
    /// Covariance matrix, `None` if the Hessian could not be inverted
    pub covariance: Option<Array2<f64>>,
    pub standard_deviations: Vec<f64>,
    /// 100 sd / |value|, in percent
    pub coefficients_of_variation: Vec<f64>,
    /// Correlation coefficients; NaN throughout if the covariance is unavailable
    pub correlation: Array2<f64>,
    /// One-sided gradients below each parameter's minimum
    pub pre_minimum_gradients: Vec<f64>,
    /// One-sided gradients above each parameter's minimum
    pub post_minimum_gradients: Vec<f64>,
}

/// Differentiation step for each parameter
fn deltas(best: &[f64]) -> Vec<f64> {
    best.iter()
        .map(|&p| {
            let d = (p * DIFFERENTIATION_STEP).abs();
            if d == 0.0 {
                DIFFERENTIATION_STEP
            } else {
                d
            }
        })
        .collect()
}

/// Central-difference Hessian of `f` at `p`
pub fn hessian<F: FnMut(&[f64]) -> f64>(mut f: F, p: &[f64], delta: &[f64]) -> Array2<f64> {
    let n = p.len();
    let f0 = f(p);
    let mut h = Array2::<f64>::zeros((n, n));
    let mut x = p.to_vec();

    for i in 0..n {
        let di = delta[i];
        x[i] = p[i] + di;
        let fp = f(&x);
        x[i] = p[i] - di;
        let fm = f(&x);
        x[i] = p[i];
        h[[i, i]] = (fp - 2.0 * f0 + fm) / (di * di);

        for j in (i + 1)..n {
            let dj = delta[j];
            let mut corner = |si: f64, sj: f64| {
                x[i] = p[i] + si * di;
                x[j] = p[j] + sj * dj;
                let v = f(&x);
                x[i] = p[i];
                x[j] = p[j];
                v
            };
            let fpp = corner(1.0, 1.0);
            let fpm = corner(1.0, -1.0);
            let fmp = corner(-1.0, 1.0);
            let fmm = corner(-1.0, -1.0);
            let hij = (fpp - fpm - fmp + fmm) / (4.0 * di * dj);
            h[[i, j]] = hij;
            h[[j, i]] = hij;
        }
    }
    h
}

/// One-sided gradients either side of `p`: (pre, post)
pub fn one_sided_gradients<F: FnMut(&[f64]) -> f64>(
    mut f: F,
    p: &[f64],
    delta: &[f64],
) -> (Vec<f64>, Vec<f64>) {
    let f0 = f(p);
    let mut x = p.to_vec();
    let mut pre = Vec::with_capacity(p.len());
    let mut post = Vec::with_capacity(p.len());
    for i in 0..p.len() {
        x[i] = p[i] - delta[i];
        pre.push((f0 - f(&x)) / delta[i]);
        x[i] = p[i] + delta[i];
        post.push((f(&x) - f0) / delta[i]);
        x[i] = p[i];
    }
    (pre, post)
}

/// Statistics of `best`, the minimum of the sum of squares `f`
///
/// `variance_scale` multiplies the inverse half-Hessian: `SS/dof` for
/// unweighted data, 1 for weighted data.
pub fn parameter_statistics<F: FnMut(&[f64]) -> f64>(
    mut f: F,
    best: &[f64],
    variance_scale: f64,
) -> ParameterStatistics {
    let n = best.len();
    let delta = deltas(best);
    let h = hessian(&mut f, best, &delta);
    let (pre, post) = one_sided_gradients(&mut f, best, &delta);

    let covariance = symmetric_inverse(&(h / 2.0)).map(|inv| inv * variance_scale);
    let (standard_deviations, correlation) = match &covariance {
        Some(cov) => {
            let sd: Vec<f64> = (0..n).map(|i| cov[[i, i]].sqrt()).collect();
            let corr = Array2::from_shape_fn((n, n), |(i, j)| cov[[i, j]] / (sd[i] * sd[j]));
            (sd, corr)
        }
        None => {
            warn!("Hessian at the minimum is singular; standard deviations are unavailable");
            (vec![f64::NAN; n], Array2::from_elem((n, n), f64::NAN))
        }
    };
    let coefficients_of_variation = standard_deviations
        .iter()
        .zip(best)
        .map(|(sd, p)| 100.0 * sd / p.abs())
        .collect();

    ParameterStatistics {
        covariance,
        standard_deviations,
        coefficients_of_variation,
        correlation,
        pre_minimum_gradients: pre,
        post_minimum_gradients: post,
    }
}
