//! Parameter constraints for the regression
//!
//! Two sources feed the simplex bounds: constraints added by the caller and
//! the in-built defaults (every parameter non-negative, CPE exponents `Qa*`
//! at most one). A caller-added bound on a parameter replaces the default
//! boundary value on the same side. Either source can be suppressed.

use crate::error::{ImpedanceError, Result};
use crate::optimize::{Bound, BoundDirection};

/// Caller-added constraints plus the suppression switches
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConstraintSet {
    added: Vec<Bound>,
    suppress_default: bool,
}

impl ConstraintSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain parameter `index`
    pub fn add(&mut self, index: usize, direction: BoundDirection, boundary: f64) {
        self.added.push(Bound {
            index,
            direction,
            value: boundary,
        });
    }

    /// Constrain the parameter named `symbol` in `symbols`
    pub fn add_by_symbol<S: AsRef<str>>(
        &mut self,
        symbols: &[S],
        symbol: &str,
        direction: BoundDirection,
        boundary: f64,
    ) -> Result<()> {
        if symbols.is_empty() {
            return Err(ImpedanceError::MissingData(
                "No model number or model parameters entered".to_string(),
            ));
        }
        let index = symbols
            .iter()
            .rposition(|s| s.as_ref().trim() == symbol.trim())
            .ok_or_else(|| ImpedanceError::SymbolNotFound(symbol.to_string()))?;
        self.add(index, direction, boundary);
        Ok(())
    }

    pub fn remove_default(&mut self) {
        self.suppress_default = true;
    }

    pub fn restore_default(&mut self) {
        self.suppress_default = false;
    }

    /// Drop every caller-added constraint
    pub fn remove_added(&mut self) {
        self.added.clear();
    }

    pub fn remove_all(&mut self) {
        self.remove_added();
        self.remove_default();
    }

    pub fn added(&self) -> &[Bound] {
        &self.added
    }

    pub fn defaults_suppressed(&self) -> bool {
        self.suppress_default
    }

    /// Bounds handed to the minimizer for a model with these `symbols`
    pub fn bounds<S: AsRef<str>>(&self, symbols: &[S]) -> Vec<Bound> {
        let mut bounds = self.added.clone();

        if !self.suppress_default {
            for (i, symbol) in symbols.iter().enumerate() {
                let mut lower = 0.0;
                let mut upper = 1.0;
                for b in self.added.iter().filter(|b| b.index == i) {
                    match b.direction {
                        BoundDirection::Upper => upper = b.value,
                        BoundDirection::Lower => lower = b.value,
                    }
                }
                bounds.push(Bound::lower(i, lower));
                if symbol.as_ref().trim().starts_with("Qa") {
                    bounds.push(Bound::upper(i, upper));
                }
            }
        }
        bounds
    }
}
