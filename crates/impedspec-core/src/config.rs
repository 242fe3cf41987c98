//! Fitting and simulation configuration
//!
//! Both configurations carry sensible defaults and round-trip through JSON.

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_LINE_POINTS, DEFAULT_MAX_ITERATIONS, DEFAULT_SIMULATION_POINTS,
    DEFAULT_STEP_FRACTION, DEFAULT_TOLERANCE,
};
use crate::error::Result;

/// Settings for the two-pass simplex regression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegressionConfig {
    /// Exit tolerance on the standard deviation of the simplex vertex values
    pub tolerance: f64,
    /// Maximum number of iterations allowed in each simplex pass
    pub max_iterations: usize,
    /// Step size of the refinement pass as a fraction of each estimate
    pub step_fraction: f64,
    /// Number of points on the fitted plot lines
    pub line_points: usize,
    /// Log10 spacing of the fitted plot lines (linear when false)
    pub log_plot: bool,
    /// Number of simplex restarts from a putative minimum
    pub restarts: usize,
    /// Nelder-Mead reflection coefficient
    pub reflection: f64,
    /// Nelder-Mead extension coefficient
    pub extension: f64,
    /// Nelder-Mead contraction coefficient
    pub contraction: f64,
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            step_fraction: DEFAULT_STEP_FRACTION,
            line_points: DEFAULT_LINE_POINTS,
            log_plot: true,
            restarts: 3,
            reflection: 1.0,
            extension: 2.0,
            contraction: 0.5,
        }
    }
}

impl RegressionConfig {
    /// Parse from a JSON document; missing fields take their defaults
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Settings for a forward simulation sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Number of frequencies in the sweep
    pub points: usize,
    /// Log10 spacing of the sweep (linear when false)
    pub log_spacing: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            points: DEFAULT_SIMULATION_POINTS,
            log_spacing: true,
        }
    }
}

impl SimulationConfig {
    /// Parse from a JSON document; missing fields take their defaults
    pub fn from_json_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regression_defaults() {
        let cfg = RegressionConfig::default();
        assert_eq!(cfg.tolerance, 1e-9);
        assert_eq!(cfg.max_iterations, 10_000);
        assert_eq!(cfg.line_points, 8000);
        assert!(cfg.log_plot);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg = RegressionConfig::from_json_str(r#"{"max_iterations": 500}"#).unwrap();
        assert_eq!(cfg.max_iterations, 500);
        assert_eq!(cfg.tolerance, 1e-9);
        assert_eq!(cfg.contraction, 0.5);
    }

    #[test]
    fn test_json_round_trip() {
        let cfg = SimulationConfig {
            points: 120,
            log_spacing: false,
        };
        let text = cfg.to_json_string().unwrap();
        let back = SimulationConfig::from_json_str(&text).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn test_malformed_json_is_config_error() {
        let err = RegressionConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, crate::error::ImpedanceError::Config(_)));
    }
}
