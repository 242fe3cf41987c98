//! Spectroscopy module - fitting and simulation of impedance spectra
//!
//! [`SpectroscopyRegression`] fits measured spectra to a built-in or a
//! user-supplied circuit; [`SpectroscopySimulation`] evaluates a circuit over a
//! frequency sweep. Both share the voltage-divider arrangement used to turn
//! measured test-circuit voltages into impedances and back.

pub mod constraints;
pub mod data;
pub mod estimates;
pub mod plot;
pub mod regression;
pub mod report;
pub mod simulation;

use num_complex::Complex64;

use crate::circuit::{CircuitModel, ImpedanceModel};
use crate::math::uncertainty::{divider_impedance, ComplexUncertain};

pub use constraints::ConstraintSet;
pub use data::{DataEntryType, MeasurementSet, Quantity};
pub use estimates::{automatic_estimates, InitialEstimates};
pub use plot::{PlotData, PlotKind, PlotSeries, PlotSink};
pub use regression::{FitResult, SpectroscopyRegression};
pub use simulation::{SimulationResults, SpectroscopySimulation};

// ============================================================================
// Circuit under test
// ============================================================================

/// The circuit a regression or simulation evaluates
pub(crate) enum Circuit {
    BuiltIn(CircuitModel),
    User(Box<dyn ImpedanceModel>),
}

impl Circuit {
    pub(crate) fn impedance(&self, parameters: &[f64], omega: f64) -> Complex64 {
        match self {
            Circuit::BuiltIn(model) => model.impedance_at(parameters, omega),
            Circuit::User(model) => model.impedance_at(parameters, omega),
        }
    }

    pub(crate) fn model_number(&self) -> Option<usize> {
        match self {
            Circuit::BuiltIn(model) => Some(model.number()),
            Circuit::User(_) => None,
        }
    }

    /// Header line used by the reports
    pub(crate) fn description(&self) -> String {
        match self {
            Circuit::BuiltIn(model) => format!("Circuit - model number {}", model.number()),
            Circuit::User(_) => "Circuit supplied by the user".to_string(),
        }
    }
}

impl std::fmt::Debug for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Circuit::BuiltIn(model) => write!(f, "Circuit::BuiltIn({})", model.number()),
            Circuit::User(_) => write!(f, "Circuit::User"),
        }
    }
}

// ============================================================================
// Voltage divider
// ============================================================================

/// Reference impedance in series with the test circuit across an applied
/// voltage; the measured voltage is taken across the test circuit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoltageDivider {
    pub reference: Complex64,
    /// Applied voltage (real)
    pub applied: f64,
    /// Standard error of the applied voltage
    pub applied_error: f64,
}

impl VoltageDivider {
    pub fn new(reference: Complex64, applied: f64) -> Self {
        Self {
            reference,
            applied,
            applied_error: 0.0,
        }
    }

    /// Test-circuit impedance from the voltage across it: Zref*V/(Vapp - V)
    pub fn impedance(&self, voltage: Complex64) -> Complex64 {
        self.reference * voltage / (Complex64::new(self.applied, 0.0) - voltage)
    }

    /// Impedance with the voltage and applied-voltage errors propagated
    pub fn impedance_with_errors(&self, voltage: ComplexUncertain) -> ComplexUncertain {
        divider_impedance(
            self.reference,
            voltage,
            Complex64::new(self.applied, 0.0),
            self.applied_error,
        )
    }

    /// Voltage across a test circuit of impedance `z`: Vapp*Z/(Z + Zref)
    pub fn voltage(&self, z: Complex64) -> Complex64 {
        Complex64::new(self.applied, 0.0) * z / (z + self.reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_divider_inverts() {
        let d = VoltageDivider::new(Complex64::new(1000.0, 0.0), 2.0);
        let z = Complex64::new(350.0, -720.0);
        let back = d.impedance(d.voltage(z));
        assert_relative_eq!(back.re, z.re, max_relative = 1e-12);
        assert_relative_eq!(back.im, z.im, max_relative = 1e-12);
    }

    #[test]
    fn test_equal_arms_halve_the_voltage() {
        let d = VoltageDivider::new(Complex64::new(50.0, 0.0), 1.0);
        let v = d.voltage(Complex64::new(50.0, 0.0));
        assert_relative_eq!(v.re, 0.5, epsilon = 1e-15);
        assert_relative_eq!(v.im, 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_user_circuit_dispatch() {
        let c = Circuit::User(Box::new(|p: &[f64], w: f64| Complex64::new(p[0], w)));
        assert_eq!(c.impedance(&[3.0], 2.0), Complex64::new(3.0, 2.0));
        assert_eq!(c.model_number(), None);
        assert_eq!(c.description(), "Circuit supplied by the user");
    }
}
