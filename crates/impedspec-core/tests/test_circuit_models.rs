//! Circuit model library tests
//!
//! Closed-form checks of the simple models against hand-derived formulas,
//! plus the table invariants shared by all 44 models.

use approx::assert_relative_eq;
use impedspec_core::circuit::elements::{
    capacitance, constant_phase, finite_warburg, inductance, parallel, r_parallel_c, series,
};
use impedspec_core::circuit::{model_components, model_impedance, CircuitModel};
use impedspec_core::ImpedanceError;
use num_complex::Complex64;
use std::f64::consts::PI;

const OMEGA: f64 = 2.0 * PI * 1234.5;

fn assert_complex_eq(a: Complex64, b: Complex64) {
    assert_relative_eq!(a.re, b.re, max_relative = 1e-12, epsilon = 1e-12);
    assert_relative_eq!(a.im, b.im, max_relative = 1e-12, epsilon = 1e-12);
}

// ============================================================================
// Simple models, 1 to 12
// ============================================================================

#[test]
fn test_model_7_series_rc_is_exact() {
    let (r, c) = (220.0, 4.7e-6);
    let z = model_impedance(&[r, c], OMEGA, 7).unwrap();
    assert_eq!(z, Complex64::new(r, -1.0 / (c * OMEGA)));
}

#[test]
fn test_single_elements() {
    assert_complex_eq(
        model_impedance(&[47.0], OMEGA, 1).unwrap(),
        Complex64::new(47.0, 0.0),
    );
    assert_complex_eq(
        model_impedance(&[1e-6], OMEGA, 2).unwrap(),
        Complex64::new(0.0, -1.0 / (1e-6 * OMEGA)),
    );
    assert_complex_eq(
        model_impedance(&[1e-3], OMEGA, 3).unwrap(),
        Complex64::new(0.0, 1e-3 * OMEGA),
    );
}

#[test]
fn test_infinite_warburg() {
    let sigma = 30.0;
    let z = model_impedance(&[sigma], OMEGA, 4).unwrap();
    let term = sigma / OMEGA.sqrt();
    assert_complex_eq(z, Complex64::new(term, -term));
    // phase is -45 degrees at every frequency
    assert_relative_eq!(z.arg(), -PI / 4.0, epsilon = 1e-12);
}

#[test]
fn test_finite_warburg() {
    let (sigma, delta) = (30.0, 0.05);
    let z = model_impedance(&[sigma, delta], OMEGA, 5).unwrap();
    let expected = Complex64::new(1.0, -1.0)
        * sigma
        * OMEGA.sqrt()
        * (Complex64::new(0.0, OMEGA).sqrt() * delta).tanh();
    assert_complex_eq(z, expected);
    assert_complex_eq(z, finite_warburg(sigma, delta, OMEGA));
}

#[test]
fn test_constant_phase_element() {
    let (sigma, alpha) = (1e5, 0.8);
    let z = model_impedance(&[sigma, alpha], OMEGA, 6).unwrap();
    assert_relative_eq!(z.norm(), sigma * OMEGA.powf(-alpha), max_relative = 1e-12);
    assert_relative_eq!(z.arg(), -alpha * PI / 2.0, epsilon = 1e-12);
    assert_complex_eq(z, constant_phase(sigma, alpha, OMEGA));
}

#[test]
fn test_two_element_models() {
    let (r, c, l) = (100.0, 2e-6, 5e-3);
    assert_complex_eq(
        model_impedance(&[r, l], OMEGA, 8).unwrap(),
        Complex64::new(r, l * OMEGA),
    );
    // models 9 and 12 evaluate their first parameter as the capacitance
    assert_complex_eq(
        model_impedance(&[c, l], OMEGA, 9).unwrap(),
        Complex64::new(0.0, l * OMEGA - 1.0 / (c * OMEGA)),
    );

    let zc = capacitance(c, OMEGA);
    let zl = inductance(l, OMEGA);
    let zr = Complex64::new(r, 0.0);
    assert_complex_eq(
        model_impedance(&[r, c], OMEGA, 10).unwrap(),
        zr * zc / (zr + zc),
    );
    assert_complex_eq(
        model_impedance(&[r, l], OMEGA, 11).unwrap(),
        zr * zl / (zr + zl),
    );
    assert_complex_eq(
        model_impedance(&[c, l], OMEGA, 12).unwrap(),
        zl * zc / (zl + zc),
    );
}

#[test]
fn test_parallel_rc_limits() {
    let (r, c) = (1000.0, 1e-6);
    let low = model_impedance(&[r, c], 1e-3, 10).unwrap();
    let high = model_impedance(&[r, c], 1e9, 10).unwrap();
    assert_relative_eq!(low.re, r, max_relative = 1e-6);
    assert!(high.norm() < 1e-2);
}

#[test]
fn test_model_13_adds_series_resistance() {
    let (r1, c1, r2) = (1000.0, 1e-6, 50.0);
    let z = model_impedance(&[r1, c1, r2], OMEGA, 13).unwrap();
    assert_complex_eq(z, series(r_parallel_c(r1, c1, OMEGA), Complex64::new(r2, 0.0)));
}

#[test]
fn test_combinators() {
    let a = Complex64::new(3.0, 4.0);
    let b = Complex64::new(1.0, -2.0);
    assert_eq!(series(a, b), Complex64::new(4.0, 2.0));
    assert_complex_eq(parallel(a, b), a * b / (a + b));
}

// ============================================================================
// Table invariants
// ============================================================================

#[test]
fn test_component_lists_fix_parameter_counts() {
    for model in CircuitModel::ALL {
        let n = model.number();
        let symbols = model_components(n).unwrap();
        assert_eq!(symbols.len(), model.n_parameters());

        let too_few = vec![1.0; symbols.len() - 1];
        assert!(matches!(
            model_impedance(&too_few, OMEGA, n),
            Err(ImpedanceError::DimensionMismatch { .. })
        ));
    }
}

#[test]
fn test_unknown_model_numbers() {
    for n in [0, 45, 100] {
        assert!(matches!(
            model_impedance(&[1.0], OMEGA, n),
            Err(ImpedanceError::UnknownModel(m)) if m == n
        ));
        assert!(model_components(n).is_err());
    }
}

#[test]
fn test_symbol_prefixes_are_known_elements() {
    for model in CircuitModel::ALL {
        for symbol in model.symbols() {
            let first = symbol.chars().next().unwrap();
            assert!(
                "RCLWFQ".contains(first),
                "model {} has unexpected symbol {}",
                model.number(),
                symbol
            );
        }
    }
}
