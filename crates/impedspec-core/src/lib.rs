//! impedspec-core: impedance spectroscopy library
//!
//! Equivalent-circuit modelling, simulation and simplex regression of
//! measured impedance spectra.
//!
//! ## Modules
//!
//! - `circuit` - Element impedances and the 44 built-in circuit models
//! - `spectroscopy` - Regression and simulation engines, plots and reports
//! - `optimize` - Nelder-Mead simplex and fit statistics
//! - `phasor` - Magnitude/phase arithmetic and phasor matrices
//! - `frequency` - Frequency sweeps
//! - `math` - Complex conversions, error propagation, linear algebra
//! - `config` - Serializable regression and simulation settings

pub mod circuit;
pub mod config;
pub mod constants;
pub mod error;
pub mod frequency;
pub mod math;
pub mod optimize;
pub mod phasor;
pub mod spectroscopy;

pub use circuit::{CircuitModel, ImpedanceModel};
pub use config::{RegressionConfig, SimulationConfig};
pub use error::{ImpedanceError, Result};
pub use frequency::Frequency;
pub use phasor::{Phasor, PhasorMatrix};
pub use spectroscopy::{FitResult, SpectroscopyRegression, SpectroscopySimulation};
