//! Optimize module - derivative-free minimization and fit statistics

pub mod simplex;
pub mod statistics;

pub use simplex::{Bound, BoundDirection, NelderMead, SimplexOutcome, SimplexSettings};
pub use statistics::{parameter_statistics, ParameterStatistics};
