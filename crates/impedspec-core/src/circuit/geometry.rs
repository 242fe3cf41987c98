//! Element values derived from physical geometry
//!
//! Lengths in metres, areas in square metres, temperatures in degrees Celsius.

use std::f64::consts::{PI, SQRT_2};

use crate::constants::{EPSILON_0, F_FARADAY, MU_0, R_GAS, T_ABS};

/// Warburg coefficient, sigma, for semi-infinite diffusion
///
/// # Arguments
/// * `electrode_area` - electrode area
/// * `oxidant_diff_coeff`, `oxidant_concn` - oxidant diffusion coefficient and bulk concentration
/// * `reductant_diff_coeff`, `reductant_concn` - the same for the reductant
/// * `temp_celsius` - temperature
/// * `electrons_transferred` - electrons per redox event
pub fn warburg_sigma(
    electrode_area: f64,
    oxidant_diff_coeff: f64,
    oxidant_concn: f64,
    reductant_diff_coeff: f64,
    reductant_concn: f64,
    temp_celsius: f64,
    electrons_transferred: u32,
) -> f64 {
    let nf = electrons_transferred as f64 * F_FARADAY;
    let first = R_GAS * (temp_celsius - T_ABS) / (nf * nf * electrode_area * SQRT_2);
    let oxidant = 1.0 / (oxidant_concn * oxidant_diff_coeff.sqrt());
    let reductant = 1.0 / (reductant_concn * reductant_diff_coeff.sqrt());
    first * (oxidant + reductant)
}

/// Capacitance of a parallel plate capacitor of given plate area
pub fn parallel_plate_capacitance(plate_area: f64, separation: f64, relative_permittivity: f64) -> f64 {
    plate_area * relative_permittivity * EPSILON_0 / separation
}

/// Capacitance of a parallel plate capacitor of given plate length and width
pub fn parallel_plate_capacitance_lw(
    length: f64,
    width: f64,
    separation: f64,
    relative_permittivity: f64,
) -> f64 {
    parallel_plate_capacitance(length * width, separation, relative_permittivity)
}

/// Capacitance of coaxial cylinders
pub fn coaxial_capacitance(length: f64, inner_radius: f64, outer_radius: f64, relative_permittivity: f64) -> f64 {
    2.0 * PI * relative_permittivity * EPSILON_0 * length / (outer_radius / inner_radius).ln()
}

/// Capacitance of two parallel wires
pub fn parallel_wires_capacitance(length: f64, wire_radius: f64, separation: f64, relative_permittivity: f64) -> f64 {
    PI * relative_permittivity * EPSILON_0 * length / ((separation - wire_radius) / wire_radius).ln()
}

/// Inductance of parallel plates
pub fn parallel_plate_inductance(length: f64, width: f64, separation: f64, relative_permeability: f64) -> f64 {
    relative_permeability * MU_0 * separation * length / width
}

/// Inductance of coaxial cylinders
pub fn coaxial_inductance(length: f64, inner_radius: f64, outer_radius: f64, relative_permeability: f64) -> f64 {
    relative_permeability * MU_0 * length * (outer_radius / inner_radius).ln() / (2.0 * PI)
}

/// Inductance of two parallel wires
pub fn parallel_wires_inductance(length: f64, wire_radius: f64, separation: f64, relative_permeability: f64) -> f64 {
    relative_permeability * MU_0 * length * ((separation - wire_radius) / wire_radius).ln() / PI
}
