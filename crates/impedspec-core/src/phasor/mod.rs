//! Phasor module - magnitude/phase arithmetic and phasor linear algebra
//!
//! An alternate numeric substrate to `Complex64`; circuit element phasors are
//! built at an explicit frequency passed by the caller.

mod core;
mod matrix;

pub use self::core::Phasor;
pub use matrix::{PhasorLu, PhasorMatrix};
