//! Impedance spectroscopy simulation
//!
//! Evaluates a built-in or user-supplied circuit over a linear or log10
//! frequency sweep. With a reference impedance and an applied voltage set,
//! the voltage across the circuit under test is produced as well.

use std::path::{Path, PathBuf};

use num_complex::Complex64;
use tracing::debug;

use super::plot::{PlotData, PlotKind, PlotSink};
use super::report::{save_simulation_report, ReportFormat};
use super::{Circuit, VoltageDivider};
use crate::circuit::{CircuitModel, ImpedanceModel};
use crate::config::SimulationConfig;
use crate::error::{ImpedanceError, Result};
use crate::frequency::{Frequency, SweepType};
use crate::math::conversions::{polar_components, radial_2_frequency};

pub(crate) const PROGRAM: &str = "SpectroscopySimulation";

/// A simulated spectrum, possibly subsampled
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResults {
    pub title: String,
    pub(crate) model_description: String,
    pub model_number: Option<usize>,
    pub symbols: Vec<String>,
    pub parameters: Vec<f64>,
    /// Hz
    pub frequencies: Vec<f64>,
    pub omegas: Vec<f64>,
    pub impedances: Vec<Complex64>,
    pub applied_voltage: Option<f64>,
    pub reference_impedance: Option<Complex64>,
    /// Voltage across the circuit under test, when the divider is set
    pub voltages: Option<Vec<Complex64>>,
}

impl SimulationResults {
    pub fn log10_frequencies(&self) -> Vec<f64> {
        self.frequencies.iter().map(|f| f.log10()).collect()
    }

    /// Magnitudes and phases (radians, degrees) of the impedances
    pub fn impedance_polar(&self) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        polar_components(&self.impedances)
    }

    pub fn voltage_polar(&self) -> Option<(Vec<f64>, Vec<f64>, Vec<f64>)> {
        self.voltages.as_deref().map(polar_components)
    }
}

/// Forward evaluation of a circuit over a frequency sweep
#[derive(Debug, Default)]
pub struct SpectroscopySimulation {
    title: String,
    config: SimulationConfig,
    /// Hz
    low: Option<f64>,
    high: Option<f64>,
    circuit: Option<Circuit>,
    symbols: Vec<String>,
    parameters: Vec<f64>,
    reference: Option<Complex64>,
    applied_voltage: Option<f64>,
    impedances: Option<Vec<Complex64>>,
}

impl SpectroscopySimulation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    // ------------------------------------------------------------------------
    // Sweep
    // ------------------------------------------------------------------------

    pub fn set_scan_range_hz(&mut self, low: f64, high: f64) {
        self.low = Some(low);
        self.high = Some(high);
        self.impedances = None;
    }

    pub fn set_scan_range_radians(&mut self, low: f64, high: f64) {
        self.set_scan_range_hz(radial_2_frequency(low), radial_2_frequency(high));
    }

    pub fn set_low_frequency(&mut self, low: f64) {
        self.low = Some(low);
        self.impedances = None;
    }

    pub fn set_low_radial_frequency(&mut self, low: f64) {
        self.set_low_frequency(radial_2_frequency(low));
    }

    pub fn set_high_frequency(&mut self, high: f64) {
        self.high = Some(high);
        self.impedances = None;
    }

    pub fn set_high_radial_frequency(&mut self, high: f64) {
        self.set_high_frequency(radial_2_frequency(high));
    }

    pub fn set_number_of_points(&mut self, points: usize) {
        self.config.points = points;
        self.impedances = None;
    }

    pub fn set_linear_plot(&mut self) {
        self.config.log_spacing = false;
        self.impedances = None;
    }

    pub fn set_log10_plot(&mut self) {
        self.config.log_spacing = true;
        self.impedances = None;
    }

    /// The sweep, once both bounds are known
    pub fn frequency(&self) -> Result<Frequency> {
        let (low, high) = match (self.low, self.high) {
            (Some(low), Some(high)) => (low, high),
            _ => {
                return Err(ImpedanceError::MissingData(
                    "No frequency range has been entered".to_string(),
                ))
            }
        };
        if self.config.points < 2 {
            return Err(ImpedanceError::InvalidArgument(format!(
                "a sweep needs at least two points, {} requested",
                self.config.points
            )));
        }
        let sweep = SweepType::from_log_flag(self.config.log_spacing);
        if sweep == SweepType::Log10 && (low <= 0.0 || high <= 0.0) {
            return Err(ImpedanceError::InvalidArgument(format!(
                "a log10 sweep needs positive bounds, found {} to {} Hz",
                low, high
            )));
        }
        Ok(Frequency::sweep(low, high, self.config.points, sweep))
    }

    // ------------------------------------------------------------------------
    // Divider
    // ------------------------------------------------------------------------

    pub fn set_applied_voltage(&mut self, voltage: f64) {
        self.applied_voltage = Some(voltage);
    }

    pub fn set_reference_impedance(&mut self, impedance: Complex64) {
        self.reference = Some(impedance);
    }

    pub fn set_reference_resistance(&mut self, resistance: f64) {
        self.set_reference_impedance(Complex64::new(resistance, 0.0));
    }

    pub fn divider(&self) -> Option<VoltageDivider> {
        match (self.reference, self.applied_voltage) {
            (Some(reference), Some(applied)) => Some(VoltageDivider::new(reference, applied)),
            _ => None,
        }
    }

    // ------------------------------------------------------------------------
    // Model
    // ------------------------------------------------------------------------

    pub fn set_model(&mut self, model_number: usize, parameters: &[f64]) -> Result<()> {
        let model = CircuitModel::from_number(model_number)?;
        let symbols: Vec<String> = model.symbols().iter().map(|s| s.to_string()).collect();
        self.install(Circuit::BuiltIn(model), symbols, parameters)
    }

    /// Built-in model with caller-chosen parameter symbols
    pub fn set_model_with_symbols<S: AsRef<str>>(
        &mut self,
        model_number: usize,
        parameters: &[f64],
        symbols: &[S],
    ) -> Result<()> {
        let model = CircuitModel::from_number(model_number)?;
        if symbols.len() != model.n_parameters() {
            return Err(ImpedanceError::DimensionMismatch {
                expected_what: "parameters".to_string(),
                expected: model.n_parameters(),
                found_what: "symbols".to_string(),
                found: symbols.len(),
            });
        }
        let symbols = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        self.install(Circuit::BuiltIn(model), symbols, parameters)
    }

    /// User model; parameters are labelled P1, P2, ...
    pub fn set_user_model<M: ImpedanceModel + 'static>(
        &mut self,
        model: M,
        parameters: &[f64],
    ) -> Result<()> {
        let symbols = (1..=parameters.len()).map(|i| format!("P{}", i)).collect();
        self.install(Circuit::User(Box::new(model)), symbols, parameters)
    }

    pub fn set_user_model_with_symbols<M, S>(
        &mut self,
        model: M,
        parameters: &[f64],
        symbols: &[S],
    ) -> Result<()>
    where
        M: ImpedanceModel + 'static,
        S: AsRef<str>,
    {
        let symbols = symbols.iter().map(|s| s.as_ref().to_string()).collect();
        self.install(Circuit::User(Box::new(model)), symbols, parameters)
    }

    fn install(&mut self, circuit: Circuit, symbols: Vec<String>, parameters: &[f64]) -> Result<()> {
        if parameters.len() != symbols.len() {
            return Err(ImpedanceError::DimensionMismatch {
                expected_what: "parameters".to_string(),
                expected: symbols.len(),
                found_what: "parameter values".to_string(),
                found: parameters.len(),
            });
        }
        self.circuit = Some(circuit);
        self.symbols = symbols;
        self.parameters = parameters.to_vec();
        self.impedances = None;
        Ok(())
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn parameters(&self) -> &[f64] {
        &self.parameters
    }

    // ------------------------------------------------------------------------
    // Evaluation
    // ------------------------------------------------------------------------

    /// Impedances over the whole sweep
    pub fn calculate_impedances(&mut self) -> Result<&[Complex64]> {
        let frequency = self.frequency()?;
        let circuit = self.circuit.as_ref().ok_or_else(|| {
            ImpedanceError::MissingData("No model or model parameters have been entered".to_string())
        })?;
        let z: Vec<Complex64> = frequency
            .omega()
            .iter()
            .map(|&w| circuit.impedance(&self.parameters, w))
            .collect();
        debug!(
            points = z.len(),
            model = ?circuit.model_number(),
            "simulated impedance spectrum"
        );
        Ok(self.impedances.insert(z))
    }

    /// Every point of the sweep, impedances recalculated if stale
    fn full_results(&mut self) -> Result<(Frequency, Vec<Complex64>)> {
        if self.impedances.is_none() {
            self.calculate_impedances()?;
        }
        let z = self.impedances.clone().ok_or_else(|| {
            ImpedanceError::MissingData("No impedances have been calculated".to_string())
        })?;
        Ok((self.frequency()?, z))
    }

    /// `n_points` evenly spaced samples of the spectrum, first and last
    /// frequencies always included
    pub fn simulation_results(&mut self, n_points: usize) -> Result<SimulationResults> {
        if n_points == 0 {
            return Err(ImpedanceError::InvalidArgument(
                "at least one point must be requested".to_string(),
            ));
        }
        let (frequency, z) = self.full_results()?;
        let points = sample_points(z.len(), n_points);

        let impedances: Vec<Complex64> = points.iter().map(|&i| z[i]).collect();
        let voltages = self
            .divider()
            .map(|d| impedances.iter().map(|&z| d.voltage(z)).collect());
        let (model_number, model_description) = match &self.circuit {
            Some(c) => (c.model_number(), c.description()),
            None => (None, String::new()),
        };

        Ok(SimulationResults {
            title: self.title.clone(),
            model_description,
            model_number,
            symbols: self.symbols.clone(),
            parameters: self.parameters.clone(),
            frequencies: points.iter().map(|&i| frequency.f()[i]).collect(),
            omegas: points.iter().map(|&i| frequency.omega()[i]).collect(),
            impedances,
            applied_voltage: self.applied_voltage,
            reference_impedance: self.reference,
            voltages,
        })
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

    fn plot(&mut self, kind: PlotKind, sink: &mut dyn PlotSink) -> Result<()> {
        let (frequency, z) = self.full_results()?;
        let values = match kind {
            PlotKind::VoltageMagnitude | PlotKind::VoltagePhase => {
                let divider = self.divider().ok_or_else(|| {
                    ImpedanceError::MissingData(
                        "the voltages cannot be plotted as no reference impedance or applied voltage has been entered"
                            .to_string(),
                    )
                })?;
                z.iter().map(|&z| divider.voltage(z)).collect()
            }
            _ => z,
        };
        let log = self.config.log_spacing;
        let data = PlotData::new(kind, PROGRAM, &self.title, log)
            .with_line(kind.series(frequency.f(), &values, log));
        sink.plot(data);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Reports
    // ------------------------------------------------------------------------

    /// Plain-text report of `n_points` samples
    pub fn print_to_text_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        n_points: usize,
    ) -> anyhow::Result<PathBuf> {
        let results = self.simulation_results(n_points)?;
        save_simulation_report(path.as_ref(), &results, ReportFormat::Text)
    }

    /// Tab-delimited report of `n_points` samples
    pub fn print_to_excel_file<P: AsRef<Path>>(
        &mut self,
        path: P,
        n_points: usize,
    ) -> anyhow::Result<PathBuf> {
        let results = self.simulation_results(n_points)?;
        save_simulation_report(path.as_ref(), &results, ReportFormat::Tab)
    }
}

/// Indices of `requested` samples out of `total`, stepping by the rounded
/// ratio; the last index is always `total - 1`
///
/// A ratio that rounds down leaves the samples bunched at the start with a
/// gap before the last one: 5 of 7 gives 0, 1, 2, 3, 6.
pub(crate) fn sample_points(total: usize, requested: usize) -> Vec<usize> {
    let n = requested.min(total);
    if n == 0 {
        return Vec::new();
    }
    let increment = (total as f64 / n as f64).round() as usize;
    let mut points: Vec<usize> = (0..n).map(|i| (i * increment).min(total - 1)).collect();
    points[n - 1] = total - 1;
    points
}
