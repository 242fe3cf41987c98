//! Circuit module - equivalent-circuit impedance models
//!
//! Provides the element primitives, the 44-model built-in library, and the
//! [`ImpedanceModel`] seam through which the simulation and regression engines
//! evaluate either a built-in or a caller-supplied circuit.

pub mod elements;
pub mod geometry;
mod models;
pub mod resistivity;

use num_complex::Complex64;

pub use models::{model_components, model_impedance, CircuitModel};
pub use resistivity::Metal;

/// Anything that maps a parameter vector and a radial frequency to an impedance
pub trait ImpedanceModel {
    fn impedance_at(&self, parameters: &[f64], omega: f64) -> Complex64;
}

impl<F> ImpedanceModel for F
where
    F: Fn(&[f64], f64) -> Complex64,
{
    fn impedance_at(&self, parameters: &[f64], omega: f64) -> Complex64 {
        self(parameters, omega)
    }
}

impl ImpedanceModel for CircuitModel {
    fn impedance_at(&self, parameters: &[f64], omega: f64) -> Complex64 {
        self.eval(parameters, omega)
    }
}
