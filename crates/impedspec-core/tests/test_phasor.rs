//! Phasor and PhasorMatrix tests
//!
//! Checks the phasor substrate against the same computations done in
//! rectangular `Complex64` form.

use approx::assert_relative_eq;
use impedspec_core::circuit::CircuitModel;
use impedspec_core::phasor::{Phasor, PhasorMatrix};
use impedspec_core::ImpedanceError;
use num_complex::Complex64;
use std::f64::consts::PI;

fn assert_phasor_eq(a: Phasor, b: Complex64) {
    let a = a.to_complex();
    assert_relative_eq!(a.re, b.re, max_relative = 1e-9, epsilon = 1e-12);
    assert_relative_eq!(a.im, b.im, max_relative = 1e-9, epsilon = 1e-12);
}

fn sample_matrix() -> PhasorMatrix {
    PhasorMatrix::from_rows(&[
        vec![Phasor::new(2.0, 30.0), Phasor::new(1.0, -45.0), Phasor::new(0.5, 90.0)],
        vec![Phasor::new(1.5, 0.0), Phasor::new(3.0, 60.0), Phasor::new(1.0, 180.0)],
        vec![Phasor::new(0.2, -120.0), Phasor::new(1.0, 10.0), Phasor::new(4.0, -20.0)],
    ])
    .unwrap()
}

#[test]
fn test_arithmetic_matches_complex() {
    let a = Phasor::new(3.0, 40.0);
    let b = Phasor::new(1.5, -75.0);
    let (ca, cb) = (a.to_complex(), b.to_complex());

    assert_phasor_eq(a + b, ca + cb);
    assert_phasor_eq(a - b, ca - cb);
    assert_phasor_eq(a * b, ca * cb);
    assert_phasor_eq(a / b, ca / cb);
    assert_phasor_eq(a.conjugate(), ca.conj());
    assert_phasor_eq(a.inverse(), ca.inv());
}

#[test]
fn test_multiplication_adds_phases() {
    let p = Phasor::new(2.0, 30.0) * Phasor::new(3.0, 45.0);
    assert_relative_eq!(p.magnitude(), 6.0, epsilon = 1e-12);
    assert_relative_eq!(p.phase_deg(), 75.0, epsilon = 1e-9);
}

#[test]
fn test_element_phasors_match_models() {
    let f = 250.0;
    let omega = 2.0 * PI * f;
    let c = Phasor::capacitance(1e-6, f);
    let expected = CircuitModel::Capacitor.impedance(&[1e-6], omega).unwrap();
    assert_phasor_eq(c, expected);
    assert_relative_eq!(c.phase_deg(), -90.0, epsilon = 1e-9);

    let rc = Phasor::resistance(100.0) + c;
    let expected = CircuitModel::SeriesRc.impedance(&[100.0, 1e-6], omega).unwrap();
    assert_phasor_eq(rc, expected);
}

#[test]
fn test_solve_linear_set() {
    let m = sample_matrix();
    let x = vec![Phasor::new(1.0, 0.0), Phasor::new(2.0, 45.0), Phasor::new(0.5, -30.0)];

    // b = m x in complex arithmetic
    let mc = m.to_complex();
    let b: Vec<Phasor> = (0..3)
        .map(|i| {
            let s: Complex64 = (0..3).map(|j| mc[[i, j]] * x[j].to_complex()).sum();
            Phasor::from(s)
        })
        .collect();

    let solved = m.solve_linear_set(&b).unwrap();
    for (s, e) in solved.iter().zip(&x) {
        assert_phasor_eq(*s, e.to_complex());
    }
}

#[test]
fn test_inverse_gives_identity() {
    let m = sample_matrix();
    let product = m.times(&m.inverse().unwrap()).unwrap();
    for i in 0..3 {
        for j in 0..3 {
            let expected = if i == j {
                Complex64::new(1.0, 0.0)
            } else {
                Complex64::new(0.0, 0.0)
            };
            let got = product[(i, j)].to_complex();
            assert!((got - expected).norm() < 1e-9, "({}, {}) = {}", i, j, got);
        }
    }
}

#[test]
fn test_determinant_of_triangular_matrix() {
    let mut m = PhasorMatrix::identity(3);
    m[(0, 0)] = Phasor::new(2.0, 10.0);
    m[(1, 1)] = Phasor::new(3.0, 20.0);
    m[(2, 2)] = Phasor::new(0.5, -50.0);
    m[(0, 2)] = Phasor::new(7.0, 33.0);
    let det = m.determinant().unwrap();
    assert_relative_eq!(det.magnitude(), 3.0, max_relative = 1e-9);
    assert_relative_eq!(det.phase_deg(), -20.0, epsilon = 1e-6);

    let ln_det = m.log_determinant().unwrap().to_complex();
    assert_relative_eq!(ln_det.re, 3f64.ln(), max_relative = 1e-9);
}

#[test]
fn test_singular_and_non_square_matrices() {
    let singular = PhasorMatrix::from_rows(&[
        vec![Phasor::new(1.0, 0.0), Phasor::new(2.0, 0.0)],
        vec![Phasor::new(2.0, 0.0), Phasor::new(4.0, 0.0)],
    ])
    .unwrap();
    assert!(singular.determinant().is_err() || singular.determinant().unwrap().magnitude() < 1e-9);

    let rect = PhasorMatrix::zeros(2, 3);
    assert!(rect.inverse().is_err());
    assert!(matches!(
        rect.times(&PhasorMatrix::zeros(2, 3)),
        Err(ImpedanceError::InvalidArgument(_))
    ));
}

#[test]
fn test_norms_and_transpose() {
    let m = sample_matrix();
    let t = m.transpose();
    assert_relative_eq!(t[(0, 2)].magnitude(), m[(2, 0)].magnitude());
    assert_relative_eq!(m.frobenius_norm(), t.frobenius_norm(), max_relative = 1e-12);
    assert_relative_eq!(m.one_norm(), t.infinity_norm(), max_relative = 1e-12);
    assert_relative_eq!(
        m.adjoin()[(1, 0)].phase_deg(),
        -m[(0, 1)].phase_deg(),
        epsilon = 1e-9
    );
}
