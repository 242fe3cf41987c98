//! Mathematical functions module
//!
//! Complex-number helpers, error propagation and the dense linear algebra
//! behind the regression statistics.

pub mod conversions;
pub mod linalg;
pub mod uncertainty;

pub use conversions::*;
