//! Impedance spectroscopy regression
//!
//! Fits a measured spectrum to a built-in circuit model or to a user-supplied
//! one. The fit is two simplex passes over the sum of squared (optionally
//! weighted) residuals of Re[Z] and Im[Z]: the first from the initial
//! estimates and steps, the second restarted from the first pass's minimum
//! with steps rescaled to the new estimates.
//!
//! # Example
//! ```
//! use impedspec_core::circuit::CircuitModel;
//! use impedspec_core::spectroscopy::SpectroscopyRegression;
//!
//! let f: Vec<f64> = (0..30).map(|i| 10f64.powf(i as f64 / 6.0)).collect();
//! let (re, im): (Vec<f64>, Vec<f64>) = f
//!     .iter()
//!     .map(|&f| {
//!         let z = CircuitModel::SeriesRc
//!             .impedance(&[220.0, 4.7e-6], 2.0 * std::f64::consts::PI * f)
//!             .unwrap();
//!         (z.re, z.im)
//!     })
//!     .unzip();
//!
//! let mut fit = SpectroscopyRegression::new();
//! fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
//! fit.set_model(7).unwrap();
//! let result = fit.regression().unwrap();
//! assert!((result.best_estimates[0] - 220.0).abs() < 1e-3);
//! ```

use std::path::{Path, PathBuf};

use ndarray::Array2;
use num_complex::Complex64;
use tracing::{debug, info, warn};

use super::constraints::ConstraintSet;
use super::data::{DataEntryType, MeasurementSet, Quantity};
use super::estimates::{automatic_estimates, InitialEstimates};
use super::plot::{PlotData, PlotKind, PlotSink};
use super::report::{save_regression_report, ReportFormat};
use super::{Circuit, VoltageDivider};
use crate::circuit::{CircuitModel, ImpedanceModel};
use crate::config::RegressionConfig;
use crate::error::{ImpedanceError, Result};
use crate::frequency::{Frequency, SweepType};
use crate::math::conversions::polar_components;
use crate::optimize::{parameter_statistics, BoundDirection, NelderMead, SimplexSettings};

pub(crate) const PROGRAM: &str = "SpectroscopyRegression";

// ============================================================================
// Fit result
// ============================================================================

/// Everything a completed regression produces
#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
    pub title: String,
    /// Built-in model number, `None` for a user-supplied model
    pub model_number: Option<usize>,
    pub(crate) model_description: String,
    pub symbols: Vec<String>,
    pub initial_estimates: Vec<f64>,
    pub initial_steps: Vec<f64>,

    pub best_estimates: Vec<f64>,
    pub standard_deviations: Vec<f64>,
    /// 100 sd / |estimate|
    pub coefficients_of_variation: Vec<f64>,
    pub covariance: Option<Array2<f64>>,
    pub correlation: Array2<f64>,
    pub pre_minimum_gradients: Vec<f64>,
    pub post_minimum_gradients: Vec<f64>,

    pub number_of_frequencies: usize,
    pub degrees_of_freedom: usize,
    /// Unweighted sum of squares of the Re[Z] and Im[Z] residuals
    pub sum_of_squares: f64,
    pub reduced_sum_of_squares: f64,
    /// Present only for weighted data
    pub chi_square: Option<f64>,
    pub reduced_chi_square: Option<f64>,
    pub first_iterations: usize,
    pub second_iterations: usize,
    pub max_iterations: usize,
    /// False if either simplex pass stopped at the iteration limit
    pub converged: bool,

    pub entry_type: DataEntryType,
    pub frequency: Frequency,
    /// Voltages or impedances as entered, rectangular form
    pub entered_values: Vec<Complex64>,
    pub measured_impedances: Vec<Complex64>,
    /// Errors of Re[Z] and Im[Z] used as weights
    pub impedance_weights: Option<Vec<(f64, f64)>>,
    pub calculated_impedances: Vec<Complex64>,
    /// Measured minus calculated Re[Z]
    pub real_residuals: Vec<f64>,
    /// Measured minus calculated Im[Z]
    pub imag_residuals: Vec<f64>,

    pub applied_voltage: Option<f64>,
    pub reference_impedance: Option<Complex64>,
    /// Present when a reference impedance and an applied voltage were set
    pub calculated_voltages: Option<Vec<Complex64>>,
}

impl FitResult {
    /// Magnitudes and phases (radians, degrees) of the calculated impedances
    pub fn calculated_polar(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        polar_components(&self.calculated_impedances)
    }

    /// Magnitudes and phases (radians, degrees) of the measured impedances
    pub fn measured_polar(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        polar_components(&self.measured_impedances)
    }
}

// ============================================================================
// Regression
// ============================================================================

/// Fits measured impedance or voltage spectra to a circuit
///
/// Data, model, divider and constraints are assembled through setters; any
/// change discards a previous result.
#[derive(Debug, Default)]
pub struct SpectroscopyRegression {
    title: String,
    config: RegressionConfig,
    data: Option<MeasurementSet>,
    reference: Option<Complex64>,
    applied_voltage: Option<f64>,
    applied_voltage_error: f64,
    circuit: Option<Circuit>,
    symbols: Vec<String>,
    initial: Option<InitialEstimates>,
    /// Recompute estimates whenever new data arrive
    auto_estimates: bool,
    constraints: ConstraintSet,
    result: Option<FitResult>,
}

impl SpectroscopyRegression {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: RegressionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn config(&self) -> &RegressionConfig {
        &self.config
    }

    fn invalidate(&mut self) {
        self.result = None;
    }

    // ------------------------------------------------------------------------
    // Voltage divider
    // ------------------------------------------------------------------------

    pub fn set_applied_voltage(&mut self, voltage: f64) -> Result<()> {
        self.set_applied_voltage_with_error(voltage, 0.0)
    }

    /// Applied voltage and its standard error
    pub fn set_applied_voltage_with_error(&mut self, voltage: f64, error: f64) -> Result<()> {
        self.applied_voltage = Some(voltage);
        self.applied_voltage_error = error;
        self.divider_changed()
    }

    pub fn set_reference_impedance(&mut self, impedance: Complex64) -> Result<()> {
        self.reference = Some(impedance);
        self.divider_changed()
    }

    pub fn set_reference_resistance(&mut self, resistance: f64) -> Result<()> {
        self.set_reference_impedance(Complex64::new(resistance, 0.0))
    }

    fn divider_changed(&mut self) -> Result<()> {
        self.invalidate();
        let voltage_data = self
            .data
            .as_ref()
            .is_some_and(|d| d.quantity() == Quantity::Voltage);
        if voltage_data && self.auto_estimates {
            self.initial = self.compute_estimates()?;
        }
        Ok(())
    }

    /// The divider, once both the reference and the applied voltage are set
    pub fn divider(&self) -> Option<VoltageDivider> {
        match (self.reference, self.applied_voltage) {
            (Some(reference), Some(applied)) => Some(VoltageDivider {
                reference,
                applied,
                applied_error: self.applied_voltage_error,
            }),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Data entry
    // ------------------------------------------------------------------------

    /// Replace the measured data
    pub fn set_measurements(&mut self, data: MeasurementSet) -> Result<()> {
        self.data = Some(data);
        self.invalidate();
        if self.auto_estimates {
            self.initial = self.compute_estimates()?;
        }
        Ok(())
    }

    pub fn measurements(&self) -> Option<&MeasurementSet> {
        self.data.as_ref()
    }

    /// Voltages as real and imaginary parts, optional errors of each part
    pub fn voltage_data_as_complex(
        &mut self,
        frequencies: &[f64],
        real: &[f64],
        imag: &[f64],
        weights: Option<(&[f64], &[f64])>,
    ) -> Result<()> {
        let data =
            MeasurementSet::from_real_imag(Quantity::Voltage, frequencies, real, imag, weights)?;
        self.set_measurements(data)
    }

    /// Complex voltages, optional complex weights
    pub fn voltage_data_as_complex_values(
        &mut self,
        frequencies: &[f64],
        voltages: &[Complex64],
        weights: Option<&[Complex64]>,
    ) -> Result<()> {
        let data = MeasurementSet::from_complex(Quantity::Voltage, frequencies, voltages, weights)?;
        self.set_measurements(data)
    }

    /// Voltage magnitudes and phases in radians
    pub fn voltage_data_as_phasor_rad(
        &mut self,
        frequencies: &[f64],
        magnitudes: &[f64],
        phases: &[f64],
        weights: Option<(&[f64], &[f64])>,
    ) -> Result<()> {
        let data = MeasurementSet::from_polar(
            Quantity::Voltage,
            frequencies,
            magnitudes,
            phases,
            weights,
            false,
        )?;
        self.set_measurements(data)
    }

    /// Voltage magnitudes and phases in degrees
    pub fn voltage_data_as_phasor_deg(
        &mut self,
        frequencies: &[f64],
        magnitudes: &[f64],
        phases: &[f64],
        weights: Option<(&[f64], &[f64])>,
    ) -> Result<()> {
        let data = MeasurementSet::from_polar(
            Quantity::Voltage,
            frequencies,
            magnitudes,
            phases,
            weights,
            true,
        )?;
        self.set_measurements(data)
    }

    /// Impedances as real and imaginary parts, optional errors of each part
    pub fn impedance_data_as_complex(
        &mut self,
        frequencies: &[f64],
        real: &[f64],
        imag: &[f64],
        weights: Option<(&[f64], &[f64])>,
    ) -> Result<()> {
        let data =
            MeasurementSet::from_real_imag(Quantity::Impedance, frequencies, real, imag, weights)?;
        self.set_measurements(data)
    }

    /// Complex impedances, optional complex weights
    pub fn impedance_data_as_complex_values(
        &mut self,
        frequencies: &[f64],
        impedances: &[Complex64],
        weights: Option<&[Complex64]>,
    ) -> Result<()> {
        let data =
            MeasurementSet::from_complex(Quantity::Impedance, frequencies, impedances, weights)?;
        self.set_measurements(data)
    }

    /// Impedance magnitudes and phases in radians
    pub fn impedance_data_as_phasor_rad(
        &mut self,
        frequencies: &[f64],
        magnitudes: &[f64],
        phases: &[f64],
        weights: Option<(&[f64], &[f64])>,
    ) -> Result<()> {
        let data = MeasurementSet::from_polar(
            Quantity::Impedance,
            frequencies,
            magnitudes,
            phases,
            weights,
            false,
        )?;
        self.set_measurements(data)
    }

    /// Impedance magnitudes and phases in degrees
    pub fn impedance_data_as_phasor_deg(
        &mut self,
        frequencies: &[f64],
        magnitudes: &[f64],
        phases: &[f64],
        weights: Option<(&[f64], &[f64])>,
    ) -> Result<()> {
        let data = MeasurementSet::from_polar(
            Quantity::Impedance,
            frequencies,
            magnitudes,
            phases,
            weights,
            true,
        )?;
        self.set_measurements(data)
    }

    /// Measured impedances and their errors, derived through the divider
    /// for voltage data
    pub fn impedances(&self) -> Result<(Vec<Complex64>, Option<Vec<(f64, f64)>>)> {
        let data = self.data.as_ref().ok_or_else(no_data)?;
        data.impedances(self.divider().as_ref())
    }

    // ------------------------------------------------------------------------
    // Model
    // ------------------------------------------------------------------------

    /// Built-in model with automatically calculated initial estimates
    ///
    /// The estimates are computed as soon as impedances are available.
    pub fn set_model(&mut self, model_number: usize) -> Result<()> {
        let model = CircuitModel::from_number(model_number)?;
        if model_number > crate::constants::MAX_AUTO_ESTIMATE_MODEL {
            return Err(ImpedanceError::NoAutomaticEstimates(model_number));
        }
        self.install_builtin(model);
        self.auto_estimates = true;
        self.initial = self.compute_estimates()?;
        Ok(())
    }

    /// Built-in model with caller-supplied estimates; steps default to
    /// `step_fraction` of each estimate
    pub fn set_model_with_estimates(
        &mut self,
        model_number: usize,
        estimates: &[f64],
        steps: Option<&[f64]>,
    ) -> Result<()> {
        let model = CircuitModel::from_number(model_number)?;
        let initial = self.explicit_estimates(model.n_parameters(), estimates, steps)?;
        self.install_builtin(model);
        self.initial = Some(initial);
        Ok(())
    }

    /// User-supplied model with its parameter symbols and estimates
    pub fn set_user_model<M, S>(
        &mut self,
        model: M,
        symbols: &[S],
        estimates: &[f64],
        steps: Option<&[f64]>,
    ) -> Result<()>
    where
        M: ImpedanceModel + 'static,
        S: AsRef<str>,
    {
        let initial = self.explicit_estimates(symbols.len(), estimates, steps)?;
        self.circuit = Some(Circuit::User(Box::new(model)));
        self.symbols = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        self.initial = Some(initial);
        self.auto_estimates = false;
        self.invalidate();
        Ok(())
    }

    fn install_builtin(&mut self, model: CircuitModel) {
        self.circuit = Some(Circuit::BuiltIn(model));
        self.symbols = model.symbols().iter().map(|s| s.to_string()).collect();
        self.auto_estimates = false;
        self.initial = None;
        self.invalidate();
    }

    fn explicit_estimates(
        &self,
        n_parameters: usize,
        estimates: &[f64],
        steps: Option<&[f64]>,
    ) -> Result<InitialEstimates> {
        if estimates.len() != n_parameters {
            return Err(ImpedanceError::DimensionMismatch {
                expected_what: "parameters".to_string(),
                expected: n_parameters,
                found_what: "initial estimates".to_string(),
                found: estimates.len(),
            });
        }
        let steps = match steps {
            Some(s) if s.len() != n_parameters => {
                return Err(ImpedanceError::DimensionMismatch {
                    expected_what: "parameters".to_string(),
                    expected: n_parameters,
                    found_what: "initial steps".to_string(),
                    found: s.len(),
                })
            }
            Some(s) => s.to_vec(),
            None => estimates
                .iter()
                .map(|e| (e * self.config.step_fraction).abs())
                .collect(),
        };
        Ok(InitialEstimates {
            estimates: estimates.to_vec(),
            steps,
        })
    }

    /// Automatic estimates, or `None` while impedances are not yet resolvable
    fn compute_estimates(&self) -> Result<Option<InitialEstimates>> {
        let model = match &self.circuit {
            Some(Circuit::BuiltIn(model)) => *model,
            _ => return Ok(None),
        };
        let data = match &self.data {
            Some(data) => data,
            None => return Ok(None),
        };
        let divider = self.divider();
        if data.quantity() == Quantity::Voltage && divider.is_none() {
            return Ok(None);
        }
        let (z, _) = data.impedances(divider.as_ref())?;
        let freq = data.frequency();
        automatic_estimates(model, freq.f(), freq.omega(), &z, self.config.step_fraction).map(Some)
    }

    pub fn initial_estimates(&self) -> Result<&[f64]> {
        self.initial
            .as_ref()
            .map(|i| i.estimates.as_slice())
            .ok_or_else(no_estimates)
    }

    pub fn initial_steps(&self) -> Result<&[f64]> {
        self.initial
            .as_ref()
            .map(|i| i.steps.as_slice())
            .ok_or_else(no_estimates)
    }

    /// Parameter symbols of the current model
    pub fn circuit_components(&self) -> &[String] {
        &self.symbols
    }

    // ------------------------------------------------------------------------
    // Constraints and settings
    // ------------------------------------------------------------------------

    pub fn add_constraint(&mut self, parameter: usize, direction: BoundDirection, boundary: f64) {
        self.constraints.add(parameter, direction, boundary);
        self.invalidate();
    }

    /// Constrain a parameter by its symbol
    pub fn add_constraint_for(
        &mut self,
        symbol: &str,
        direction: BoundDirection,
        boundary: f64,
    ) -> Result<()> {
        self.constraints
            .add_by_symbol(&self.symbols, symbol, direction, boundary)?;
        self.invalidate();
        Ok(())
    }

    pub fn remove_default_constraints(&mut self) {
        self.constraints.remove_default();
        self.invalidate();
    }

    pub fn restore_default_constraints(&mut self) {
        self.constraints.restore_default();
        self.invalidate();
    }

    pub fn remove_added_constraints(&mut self) {
        self.constraints.remove_added();
        self.invalidate();
    }

    pub fn remove_all_constraints(&mut self) {
        self.constraints.remove_all();
        self.invalidate();
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn reset_maximum_number_of_iterations(&mut self, max: usize) {
        self.config.max_iterations = max;
        self.invalidate();
    }

    pub fn reset_tolerance(&mut self, tolerance: f64) {
        self.config.tolerance = tolerance;
        self.invalidate();
    }

    pub fn tolerance(&self) -> f64 {
        self.config.tolerance
    }

    pub fn set_linear_plot(&mut self) {
        self.config.log_plot = false;
    }

    pub fn set_log10_plot(&mut self) {
        self.config.log_plot = true;
    }

    // ------------------------------------------------------------------------
    // Fitting
    // ------------------------------------------------------------------------

    /// Run the two-pass fit
    ///
    /// Every call refits from the initial estimates and replaces the stored
    /// result. [`fit_result`](Self::fit_result),
    /// [`best_estimates`](Self::best_estimates) and
    /// [`standard_deviations`](Self::standard_deviations) reuse the stored
    /// result and only fit when there is none.
    ///
    /// A pass that reaches the iteration limit is logged with `warn!` and
    /// clears [`FitResult::converged`]; the best point found so far is still
    /// reported.
    pub fn regression(&mut self) -> Result<&FitResult> {
        self.invalidate();
        let n = self.data.as_ref().ok_or_else(no_data)?.npoints();
        if self.circuit.is_none() {
            return Err(ImpedanceError::MissingData(
                "No model number or user model has been entered".to_string(),
            ));
        }
        let np = self.symbols.len();
        let dof = n as isize - np as isize;
        if dof <= 0 {
            return Err(ImpedanceError::InvalidDegreesOfFreedom(dof));
        }
        let dof = dof as usize;

        if self.initial.is_none() {
            self.initial = self.compute_estimates()?;
        }
        let initial = self.initial.clone().ok_or_else(no_estimates)?;

        let (data, circuit) = match (&self.data, &self.circuit) {
            (Some(data), Some(circuit)) => (data, circuit),
            _ => return Err(no_data()),
        };
        let divider = self.divider();
        let (measured, errors) = data.impedances(divider.as_ref())?;
        let weights = match errors {
            Some(e) if e.iter().any(|&(re, im)| re == 0.0 || im == 0.0) => {
                warn!("a zero weight was entered; fitting without weights");
                None
            }
            other => other,
        };
        let omegas = data.frequency().omega();

        let residual_sum = |p: &[f64], weighted: bool| -> f64 {
            omegas
                .iter()
                .zip(&measured)
                .enumerate()
                .map(|(i, (&w, &z))| {
                    let r = z - circuit.impedance(p, w);
                    match (&weights, weighted) {
                        (Some(e), true) => (r.re / e[i].0).powi(2) + (r.im / e[i].1).powi(2),
                        _ => r.re * r.re + r.im * r.im,
                    }
                })
                .sum()
        };
        let objective = |p: &[f64]| residual_sum(p, true);

        let nm = NelderMead::new(SimplexSettings::from(&self.config))
            .with_bounds(self.constraints.bounds(&self.symbols));

        debug!(start = ?initial.estimates, steps = ?initial.steps, "first simplex pass");
        let first = nm.minimize(&objective, &initial.estimates, &initial.steps)?;
        debug!(
            minimum = first.minimum,
            iterations = first.iterations,
            "first simplex pass finished"
        );

        let steps: Vec<f64> = first
            .parameters
            .iter()
            .map(|p| (p * self.config.step_fraction).abs())
            .collect();
        let second = nm.minimize(&objective, &first.parameters, &steps)?;
        debug!(
            minimum = second.minimum,
            iterations = second.iterations,
            "second simplex pass finished"
        );

        let converged = first.converged && second.converged;
        if !converged {
            warn!(
                first_pass = first.converged,
                second_pass = second.converged,
                max_iterations = self.config.max_iterations,
                "regression did not converge within the iteration limit"
            );
        }

        let best = second.parameters;
        let sum_of_squares = residual_sum(&best, false);
        let chi_square = weights.as_ref().map(|_| objective(&best));
        let variance_scale = match chi_square {
            Some(_) => 1.0,
            None => sum_of_squares / dof as f64,
        };
        let stats = parameter_statistics(&objective, &best, variance_scale);

        let calculated: Vec<Complex64> = omegas.iter().map(|&w| circuit.impedance(&best, w)).collect();
        let (real_residuals, imag_residuals) = measured
            .iter()
            .zip(&calculated)
            .map(|(m, c)| (m.re - c.re, m.im - c.im))
            .unzip();
        let calculated_voltages = divider
            .as_ref()
            .map(|d| calculated.iter().map(|&z| d.voltage(z)).collect());

        info!(
            model = ?circuit.model_number(),
            sum_of_squares,
            degrees_of_freedom = dof,
            converged,
            "regression complete"
        );

        let result = FitResult {
            title: self.title.clone(),
            model_number: circuit.model_number(),
            model_description: circuit.description(),
            symbols: self.symbols.clone(),
            initial_estimates: initial.estimates,
            initial_steps: initial.steps,
            best_estimates: best,
            standard_deviations: stats.standard_deviations,
            coefficients_of_variation: stats.coefficients_of_variation,
            covariance: stats.covariance,
            correlation: stats.correlation,
            pre_minimum_gradients: stats.pre_minimum_gradients,
            post_minimum_gradients: stats.post_minimum_gradients,
            number_of_frequencies: n,
            degrees_of_freedom: dof,
            sum_of_squares,
            reduced_sum_of_squares: sum_of_squares / dof as f64,
            chi_square,
            reduced_chi_square: chi_square.map(|c| c / dof as f64),
            first_iterations: first.iterations,
            second_iterations: second.iterations,
            max_iterations: self.config.max_iterations,
            converged,
            entry_type: data.entry_type(),
            frequency: data.frequency().clone(),
            entered_values: data.values().to_vec(),
            measured_impedances: measured.clone(),
            impedance_weights: weights.clone(),
            calculated_impedances: calculated,
            real_residuals,
            imag_residuals,
            applied_voltage: self.applied_voltage,
            reference_impedance: self.reference,
            calculated_voltages,
        };
        Ok(self.result.insert(result))
    }

    /// The result of the last regression, if it is still current
    pub fn result(&self) -> Option<&FitResult> {
        self.result.as_ref()
    }

    /// The current result, running the regression first if needed
    pub fn fit_result(&mut self) -> Result<&FitResult> {
        if self.result.is_none() {
            self.regression()?;
        }
        self.result.as_ref().ok_or_else(no_data)
    }

    pub fn best_estimates(&mut self) -> Result<&[f64]> {
        Ok(&self.fit_result()?.best_estimates)
    }

    pub fn standard_deviations(&mut self) -> Result<&[f64]> {
        Ok(&self.fit_result()?.standard_deviations)
    }

    pub fn first_number_of_iterations(&self) -> Option<usize> {
        self.result.as_ref().map(|r| r.first_iterations)
    }

    pub fn second_number_of_iterations(&self) -> Option<usize> {
        self.result.as_ref().map(|r| r.second_iterations)
    }

    // ------------------------------------------------------------------------
    // Plots
    // ------------------------------------------------------------------------

    pub fn plot_cole_cole(&mut self, sink: &mut dyn PlotSink) -> Result<()> {
        self.plot(PlotKind::ColeCole, sink)
    }

    pub fn plot_impedance_magnitudes(&mut self, sink: &mut dyn PlotSink) -> Result<()> {
        self.plot(PlotKind::ImpedanceMagnitude, sink)
    }

    pub fn plot_impedance_phases(&mut self, sink: &mut dyn PlotSink) -> Result<()> {
        self.plot(PlotKind::ImpedancePhase, sink)
    }

    pub fn plot_voltage_magnitudes(&mut self, sink: &mut dyn PlotSink) -> Result<()> {
        self.plot(PlotKind::VoltageMagnitude, sink)
    }

    pub fn plot_voltage_phases(&mut self, sink: &mut dyn PlotSink) -> Result<()> {
        self.plot(PlotKind::VoltagePhase, sink)
    }

    /// Measured points plus the fitted line over the measured frequency range
    fn plot(&mut self, kind: PlotKind, sink: &mut dyn PlotSink) -> Result<()> {
        self.fit_result()?;
        let (result, circuit) = match (&self.result, &self.circuit) {
            (Some(result), Some(circuit)) => (result, circuit),
            _ => return Err(no_data()),
        };
        let log = self.config.log_plot;
        let line = result
            .frequency
            .spanning(self.config.line_points, SweepType::from_log_flag(log));
        let line_z: Vec<Complex64> = line
            .omega()
            .iter()
            .map(|&w| circuit.impedance(&result.best_estimates, w))
            .collect();

        let (points, line_values) = match kind {
            PlotKind::VoltageMagnitude | PlotKind::VoltagePhase => {
                let divider = self.divider().ok_or_else(|| {
                    ImpedanceError::MissingData(
                        "the voltages cannot be plotted as no reference impedance or applied voltage has been entered"
                            .to_string(),
                    )
                })?;
                let measured = match result.entry_type.quantity() {
                    Quantity::Voltage => result.entered_values.clone(),
                    Quantity::Impedance => result
                        .measured_impedances
                        .iter()
                        .map(|&z| divider.voltage(z))
                        .collect(),
                };
                let fitted = line_z.iter().map(|&z| divider.voltage(z)).collect();
                (measured, fitted)
            }
            _ => (result.measured_impedances.clone(), line_z),
        };

        let data = PlotData::new(kind, PROGRAM, &self.title, log)
            .with_points(kind.series(result.frequency.f(), &points, log))
            .with_line(kind.series(line.f(), &line_values, log));
        sink.plot(data);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------------

    /// Write the plain-text report; ".txt" is appended to a name without an
    /// extension
    pub fn print_to_text_file<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<PathBuf> {
        let result = self.fit_result()?;
        save_regression_report(path.as_ref(), result, ReportFormat::Text)
    }

    /// Write the tab-delimited report with a ".xls" extension
    pub fn print_to_excel_file<P: AsRef<Path>>(&mut self, path: P) -> anyhow::Result<PathBuf> {
        let result = self.fit_result()?;
        save_regression_report(path.as_ref(), result, ReportFormat::Tab)
    }
}

fn no_data() -> ImpedanceError {
    ImpedanceError::MissingData("No impedances or voltages have been entered".to_string())
}

fn no_estimates() -> ImpedanceError {
    ImpedanceError::MissingData(
        "No initial estimates have been entered or calculated".to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series_rc_data(n: usize) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let f: Vec<f64> = (0..n).map(|i| 10f64.powf(1.0 + i as f64 * 0.25)).collect();
        let (re, im) = f
            .iter()
            .map(|&f| {
                let z = CircuitModel::SeriesRc
                    .impedance(&[100.0, 1e-6], 2.0 * std::f64::consts::PI * f)
                    .unwrap();
                (z.re, z.im)
            })
            .unzip();
        (f, re, im)
    }

    #[test]
    fn test_missing_data() {
        let mut fit = SpectroscopyRegression::new();
        fit.set_model(7).unwrap();
        assert!(matches!(fit.regression(), Err(ImpedanceError::MissingData(_))));
    }

    #[test]
    fn test_missing_model() {
        let (f, re, im) = series_rc_data(10);
        let mut fit = SpectroscopyRegression::new();
        fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
        assert!(matches!(fit.regression(), Err(ImpedanceError::MissingData(_))));
    }

    #[test]
    fn test_degrees_of_freedom_guard() {
        let (f, re, im) = series_rc_data(2);
        let mut fit = SpectroscopyRegression::new();
        fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
        fit.set_model_with_estimates(7, &[90.0, 1.1e-6], None).unwrap();
        assert!(matches!(
            fit.regression(),
            Err(ImpedanceError::InvalidDegreesOfFreedom(0))
        ));
        assert!(fit.result().is_none());
    }

    #[test]
    fn test_estimates_follow_the_data() {
        let (f, re, im) = series_rc_data(12);
        let mut fit = SpectroscopyRegression::new();
        fit.set_model(7).unwrap();
        assert!(fit.initial_estimates().is_err());
        fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
        let est = fit.initial_estimates().unwrap();
        assert!((est[0] - 100.0).abs() < 1e-9);
        assert_eq!(fit.circuit_components(), &["R1".to_string(), "C1".to_string()]);
    }

    #[test]
    fn test_automatic_estimates_limited_to_28() {
        let mut fit = SpectroscopyRegression::new();
        assert!(matches!(
            fit.set_model(29),
            Err(ImpedanceError::NoAutomaticEstimates(29))
        ));
        assert!(matches!(fit.set_model(45), Err(ImpedanceError::UnknownModel(45))));
    }

    #[test]
    fn test_estimate_count_checked() {
        let mut fit = SpectroscopyRegression::new();
        let err = fit.set_model_with_estimates(13, &[1.0, 2.0], None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "The number of parameters, 3, does not equal the number of initial estimates, 2"
        );
    }

    #[test]
    fn test_default_steps_are_a_tenth() {
        let mut fit = SpectroscopyRegression::new();
        fit.set_model_with_estimates(7, &[50.0, -2e-6], None).unwrap();
        let steps = fit.initial_steps().unwrap();
        assert!((steps[0] - 5.0).abs() < 1e-12);
        assert!((steps[1] - 2e-7).abs() < 1e-18);
    }

    #[test]
    fn test_symbol_constraint_needs_model() {
        let mut fit = SpectroscopyRegression::new();
        assert!(fit
            .add_constraint_for("R1", BoundDirection::Lower, 0.0)
            .is_err());
        fit.set_model(7).unwrap();
        assert!(fit
            .add_constraint_for("R1", BoundDirection::Lower, 0.0)
            .is_ok());
        assert!(matches!(
            fit.add_constraint_for("Q1", BoundDirection::Lower, 0.0),
            Err(ImpedanceError::SymbolNotFound(_))
        ));
    }
}
