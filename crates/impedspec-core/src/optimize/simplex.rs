//! Nelder-Mead simplex minimization with bound penalties
//!
//! Iteration counting follows every objective evaluation after the initial
//! simplex: one per reflection, extension or contraction, and `n + 1` for a
//! shrink. On convergence the simplex is rebuilt around the minimum with the
//! original steps and the search restarts; `restarts` is the number of such
//! rebuilds.
//!
//! Bound violations are measured in units of each parameter's initial step,
//! so a parameter of order 1e-20 is held by the penalty as firmly as one of
//! order 1e3. The returned point always satisfies the bounds.

use tracing::{debug, warn};

use crate::config::RegressionConfig;
use crate::constants::PENALTY_WEIGHT;
use crate::error::{ImpedanceError, Result};

/// Side of a single-parameter constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundDirection {
    /// The parameter may not fall below the boundary
    Lower,
    /// The parameter may not rise above the boundary
    Upper,
}

/// A constraint on one parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bound {
    pub index: usize,
    pub direction: BoundDirection,
    pub value: f64,
}

impl Bound {
    pub fn lower(index: usize, value: f64) -> Self {
        Self {
            index,
            direction: BoundDirection::Lower,
            value,
        }
    }

    pub fn upper(index: usize, value: f64) -> Self {
        Self {
            index,
            direction: BoundDirection::Upper,
            value,
        }
    }

    /// Distance by which `params` lies on the wrong side, if it does
    fn violation(&self, params: &[f64]) -> Option<f64> {
        let x = params[self.index];
        match self.direction {
            BoundDirection::Lower if x < self.value => Some(self.value - x),
            BoundDirection::Upper if x > self.value => Some(x - self.value),
            _ => None,
        }
    }
}

/// Nelder-Mead coefficients and exit criteria
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexSettings {
    pub tolerance: f64,
    pub max_iterations: usize,
    pub restarts: usize,
    pub reflection: f64,
    pub extension: f64,
    pub contraction: f64,
}

impl Default for SimplexSettings {
    fn default() -> Self {
        Self::from(&RegressionConfig::default())
    }
}

impl From<&RegressionConfig> for SimplexSettings {
    fn from(config: &RegressionConfig) -> Self {
        Self {
            tolerance: config.tolerance,
            max_iterations: config.max_iterations,
            restarts: config.restarts,
            reflection: config.reflection,
            extension: config.extension,
            contraction: config.contraction,
        }
    }
}

/// Result of one simplex minimization
#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOutcome {
    /// Parameters at the lowest vertex
    pub parameters: Vec<f64>,
    /// Objective value there
    pub minimum: f64,
    /// Objective evaluations after the initial simplex
    pub iterations: usize,
    /// Simplex rebuilds actually taken
    pub restarts_taken: usize,
    /// False if the iteration cap was hit first
    pub converged: bool,
    /// Standard deviation of the vertex values at exit
    pub simplex_sd: f64,
}

/// Objective wrapped with the bound penalties
///
/// A point outside a bound is not evaluated; it scores the last unconstrained
/// value plus the weighted squared violations, each divided by the scale of
/// its parameter. The lowest point inside every bound is remembered.
struct Penalized<'a, F> {
    objective: F,
    bounds: &'a [Bound],
    scale: &'a [f64],
    last_unconstrained: f64,
    best_feasible: Option<(f64, Vec<f64>)>,
}

impl<F: FnMut(&[f64]) -> f64> Penalized<'_, F> {
    fn value(&mut self, params: &[f64]) -> f64 {
        if !self.is_feasible(params) {
            let penalty: f64 = self
                .bounds
                .iter()
                .filter_map(|b| b.violation(params).map(|v| v / self.scale[b.index]))
                .map(|v| PENALTY_WEIGHT * v * v)
                .sum();
            return self.last_unconstrained + penalty;
        }
        let value = (self.objective)(params);
        self.last_unconstrained = value;
        if self.best_feasible.as_ref().map_or(!value.is_nan(), |(y, _)| value < *y) {
            self.best_feasible = Some((value, params.to_vec()));
        }
        value
    }

    fn is_feasible(&self, params: &[f64]) -> bool {
        self.bounds.iter().all(|b| b.violation(params).is_none())
    }

    /// `params` moved onto every bound it violates
    fn clamp(&self, params: &[f64]) -> Vec<f64> {
        let mut clamped = params.to_vec();
        for b in self.bounds {
            if b.violation(&clamped).is_some() {
                clamped[b.index] = b.value;
            }
        }
        clamped
    }
}

/// Nelder-Mead minimizer
#[derive(Debug, Clone, Default)]
pub struct NelderMead {
    settings: SimplexSettings,
    bounds: Vec<Bound>,
}

impl NelderMead {
    pub fn new(settings: SimplexSettings) -> Self {
        Self {
            settings,
            bounds: Vec::new(),
        }
    }

    /// Replace the bound constraints
    pub fn with_bounds(mut self, bounds: Vec<Bound>) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn settings(&self) -> &SimplexSettings {
        &self.settings
    }

    pub fn bounds(&self) -> &[Bound] {
        &self.bounds
    }

    /// Minimize `objective` from `start` with initial simplex steps `step`
    ///
    /// A zero step becomes 10% of its start value, or 1.0 for a zero start.
    pub fn minimize<F>(&self, objective: F, start: &[f64], step: &[f64]) -> Result<SimplexOutcome>
    where
        F: FnMut(&[f64]) -> f64,
    {
        let np = start.len();
        if np == 0 {
            return Err(ImpedanceError::InvalidArgument(
                "no parameters to minimize".to_string(),
            ));
        }
        if step.len() != np {
            return Err(ImpedanceError::DimensionMismatch {
                expected_what: "initial estimates".to_string(),
                expected: np,
                found_what: "initial steps".to_string(),
                found: step.len(),
            });
        }
        if let Some(b) = self.bounds.iter().find(|b| b.index >= np) {
            return Err(ImpedanceError::InvalidArgument(format!(
                "constraint on parameter index {} but only {} parameters",
                b.index, np
            )));
        }

        let step: Vec<f64> = step
            .iter()
            .zip(start)
            .map(|(&s, &x)| match (s == 0.0, x == 0.0) {
                (false, _) => s,
                (true, false) => 0.1 * x,
                (true, true) => {
                    warn!("zero step for a zero initial estimate; using a step of unity");
                    1.0
                }
            })
            .collect();

        let scale: Vec<f64> = step.iter().map(|s| s.abs()).collect();
        let mut f = Penalized {
            objective,
            bounds: &self.bounds,
            scale: &scale,
            last_unconstrained: 0.0,
            best_feasible: None,
        };
        let SimplexSettings {
            tolerance,
            max_iterations,
            restarts,
            reflection,
            extension,
            contraction,
        } = self.settings;
        let nnp = np + 1;

        let (mut pp, mut yy) = initial_simplex(start, &step, &mut f);
        let mut iterations = 0usize;
        let mut restarts_left = restarts;
        let mut restarts_taken = 0usize;
        let mut converged = true;
        let mut simplex_sd;

        loop {
            let (ilo, ihi) = extremes(&yy);
            let ylo = yy[ilo];

            // Centroid of all vertices but the highest
            let mut pbar = vec![0.0; np];
            for (j, v) in pp.iter().enumerate() {
                if j != ihi {
                    for i in 0..np {
                        pbar[i] += v[i];
                    }
                }
            }
            pbar.iter_mut().for_each(|x| *x /= np as f64);

            // Reflection
            let pstar: Vec<f64> = (0..np)
                .map(|i| (1.0 + reflection) * pbar[i] - reflection * pp[ihi][i])
                .collect();
            let ystar = f.value(&pstar);
            iterations += 1;

            if ystar < ylo {
                // Extension
                let p2star: Vec<f64> = (0..np)
                    .map(|i| pstar[i] * (1.0 + extension) - extension * pbar[i])
                    .collect();
                let y2star = f.value(&p2star);
                iterations += 1;
                if y2star < ylo {
                    pp[ihi] = p2star;
                    yy[ihi] = y2star;
                } else {
                    pp[ihi] = pstar;
                    yy[ihi] = ystar;
                }
            } else {
                let higher = (0..nnp).filter(|&i| i != ihi && ystar > yy[i]).count();
                if higher == np {
                    if ystar <= yy[ihi] {
                        pp[ihi] = pstar;
                        yy[ihi] = ystar;
                    }
                    // Contraction
                    let p2star: Vec<f64> = (0..np)
                        .map(|i| contraction * pp[ihi][i] + (1.0 - contraction) * pbar[i])
                        .collect();
                    let y2star = f.value(&p2star);
                    iterations += 1;
                    if y2star > yy[ihi] {
                        // Shrink towards the lowest vertex
                        let low = pp[ilo].clone();
                        for j in 0..nnp {
                            for i in 0..np {
                                pp[j][i] = 0.5 * (pp[j][i] + low[i]);
                            }
                            yy[j] = f.value(&pp[j]);
                        }
                        iterations += nnp;
                    } else {
                        pp[ihi] = p2star;
                        yy[ihi] = y2star;
                    }
                } else {
                    pp[ihi] = pstar;
                    yy[ihi] = ystar;
                }
            }

            simplex_sd = vertex_sd(&yy, np);
            if simplex_sd < tolerance {
                if restarts_left == 0 {
                    break;
                }
                restarts_left -= 1;
                let (ilo, _) = extremes(&yy);
                let base = pp[ilo].clone();
                debug!(minimum = yy[ilo], iterations, "simplex converged; restarting from the minimum");
                (pp, yy) = initial_simplex(&base, &step, &mut f);
                restarts_taken += 1;
            }

            if iterations > max_iterations {
                warn!(
                    iterations,
                    max_iterations, "simplex stopped at the iteration limit without converging"
                );
                converged = false;
                break;
            }
        }

        let (ilo, _) = extremes(&yy);
        let (minimum, parameters) = if f.is_feasible(&pp[ilo]) {
            (yy[ilo], pp[ilo].clone())
        } else if let Some(best) = f.best_feasible.take() {
            debug!(minimum = best.0, "lowest vertex violates a bound; returning the best feasible point");
            best
        } else {
            warn!("no point inside the bounds was evaluated; clamping the lowest vertex");
            let clamped = f.clamp(&pp[ilo]);
            ((f.objective)(&clamped), clamped)
        };
        Ok(SimplexOutcome {
            parameters,
            minimum,
            iterations,
            restarts_taken,
            converged,
            simplex_sd,
        })
    }
}

/// Start point as the last vertex, preceded by one vertex displaced along each axis
fn initial_simplex<F: FnMut(&[f64]) -> f64>(
    base: &[f64],
    step: &[f64],
    f: &mut Penalized<'_, F>,
) -> (Vec<Vec<f64>>, Vec<f64>) {
    let np = base.len();
    let mut pp = Vec::with_capacity(np + 1);
    let mut yy = Vec::with_capacity(np + 1);
    for j in 0..np {
        let mut v = base.to_vec();
        v[j] += step[j];
        yy.push(f.value(&v));
        pp.push(v);
    }
    yy.push(f.value(base));
    pp.push(base.to_vec());
    (pp, yy)
}

/// Indices of the lowest and highest vertex values
fn extremes(yy: &[f64]) -> (usize, usize) {
    let mut ilo = 0;
    let mut ihi = 0;
    for (i, &y) in yy.iter().enumerate().skip(1) {
        if y < yy[ilo] {
            ilo = i;
        }
        if y > yy[ihi] {
            ihi = i;
        }
    }
    (ilo, ihi)
}

/// sqrt(sum((y - mean)^2) / np) over the n + 1 vertex values
fn vertex_sd(yy: &[f64], np: usize) -> f64 {
    let mean = yy.iter().sum::<f64>() / yy.len() as f64;
    let ss: f64 = yy.iter().map(|y| (y - mean) * (y - mean)).sum();
    (ss / np as f64).sqrt()
}
