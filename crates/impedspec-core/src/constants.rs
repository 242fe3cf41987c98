//! Numerical and physical constants
//!
//! Provides standardized tolerance values, fitting defaults and the physical
//! constants used by the geometry formulas.

// ============================================================================
// Numerical tolerances
// ============================================================================

/// Replacement for an exactly zero pivot during LU decomposition.
pub const LU_TINY: f64 = 1e-30;

/// Weight applied to the squared violation of a parameter bound, in units of
/// the parameter's initial simplex step.
pub const PENALTY_WEIGHT: f64 = 1.0e30;

/// Fractional step used for the numerical Hessian and gradients at a minimum.
pub const DIFFERENTIATION_STEP: f64 = 1e-4;

// ============================================================================
// Fitting defaults
// ============================================================================

/// Default simplex exit tolerance (standard deviation of the vertex values).
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

/// Default maximum number of simplex iterations per pass.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Initial step as a fraction of the magnitude of each estimate.
pub const DEFAULT_STEP_FRACTION: f64 = 0.1;

/// Number of frequencies used for the fitted lines of the plots.
pub const DEFAULT_LINE_POINTS: usize = 8000;

/// Default number of points in a simulated sweep.
pub const DEFAULT_SIMULATION_POINTS: usize = 800;

/// Number of circuit models in the built-in library.
pub const NUMBER_OF_MODELS: usize = 44;

/// Highest model number with automatic initial estimates.
pub const MAX_AUTO_ESTIMATE_MODEL: usize = 28;

// ============================================================================
// Physical constants (SI)
// ============================================================================

/// Molar gas constant, J/(mol K)
pub const R_GAS: f64 = 8.314_472;

/// Faraday constant, C/mol
pub const F_FARADAY: f64 = 96_485.341_5;

/// Absolute zero in degrees Celsius
pub const T_ABS: f64 = -273.15;

/// Permittivity of free space, F/m
pub const EPSILON_0: f64 = 8.854_187_817e-12;

/// Permeability of free space, H/m
pub const MU_0: f64 = 4.0e-7 * std::f64::consts::PI;
