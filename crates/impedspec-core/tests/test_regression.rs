//! Regression engine tests
//!
//! Simulate-then-fit round trips, the equivalence of the data entry
//! encodings, the fitting guards and the optional statistics.

use approx::assert_relative_eq;
use impedspec_core::circuit::CircuitModel;
use impedspec_core::optimize::BoundDirection;
use impedspec_core::spectroscopy::report::{write_regression_report, ReportFormat};
use impedspec_core::spectroscopy::{PlotData, PlotKind, SpectroscopyRegression};
use impedspec_core::{ImpedanceError, SpectroscopySimulation};
use num_complex::Complex64;
use std::f64::consts::PI;

/// Log-spaced frequencies, 1 Hz to 1 MHz
fn sweep(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 10f64.powf(6.0 * i as f64 / (n - 1) as f64))
        .collect()
}

fn spectrum(model: CircuitModel, p: &[f64], f: &[f64]) -> Vec<Complex64> {
    f.iter()
        .map(|&f| model.impedance(p, 2.0 * PI * f).unwrap())
        .collect()
}

fn split(z: &[Complex64]) -> (Vec<f64>, Vec<f64>) {
    z.iter().map(|z| (z.re, z.im)).unzip()
}

fn fit_model(model_number: usize, truth: &[f64]) -> SpectroscopyRegression {
    let model = CircuitModel::from_number(model_number).unwrap();
    let f = sweep(40);
    let (re, im) = split(&spectrum(model, truth, &f));
    let mut fit = SpectroscopyRegression::with_title(format!("model {}", model_number));
    fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
    fit.set_model(model_number).unwrap();
    fit
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_round_trip_resistor() {
    let mut fit = fit_model(1, &[470.0]);
    let result = fit.regression().unwrap();
    assert_relative_eq!(result.best_estimates[0], 470.0, max_relative = 1e-6);
    assert!(result.sum_of_squares < 1e-6);
    assert_eq!(result.degrees_of_freedom, 39);
}

#[test]
fn test_round_trip_series_rc() {
    let truth = [220.0, 4.7e-6];
    let mut fit = fit_model(7, &truth);
    let result = fit.regression().unwrap();
    for (fitted, expected) in result.best_estimates.iter().zip(&truth) {
        assert_relative_eq!(*fitted, *expected, max_relative = 1e-3);
    }
    assert!(result.first_iterations > 0);
    assert!(result.chi_square.is_none());
}

#[test]
fn test_round_trip_parallel_rc() {
    let truth = [1000.0, 1e-6];
    let mut fit = fit_model(10, &truth);
    let best = fit.best_estimates().unwrap().to_vec();
    assert_relative_eq!(best[0], truth[0], max_relative = 1e-2);
    assert_relative_eq!(best[1], truth[1], max_relative = 1e-2);
}

#[test]
fn test_round_trip_parallel_rc_series_r() {
    let truth = [1000.0, 1e-6, 50.0];
    let mut fit = fit_model(13, &truth);
    let result = fit.regression().unwrap();
    for (fitted, expected) in result.best_estimates.iter().zip(&truth) {
        assert_relative_eq!(*fitted, *expected, max_relative = 1e-2);
    }
    let residual_max = result
        .real_residuals
        .iter()
        .chain(&result.imag_residuals)
        .fold(0.0f64, |m, r| m.max(r.abs()));
    assert!(residual_max < 5.0);
}

#[test]
fn test_user_model_round_trip() {
    let f = sweep(30);
    let truth = [330.0, 2.2e-6];
    let (re, im) = split(&spectrum(CircuitModel::SeriesRc, &truth, &f));

    let mut fit = SpectroscopyRegression::new();
    fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
    let model = |p: &[f64], w: f64| Complex64::new(p[0], -1.0 / (p[1] * w));
    fit.set_user_model(model, &["R", "C"], &[300.0, 2e-6], None)
        .unwrap();

    let result = fit.regression().unwrap();
    assert_eq!(result.model_number, None);
    assert_relative_eq!(result.best_estimates[0], truth[0], max_relative = 1e-3);
    assert_relative_eq!(result.best_estimates[1], truth[1], max_relative = 1e-3);
}

#[test]
fn test_voltage_data_round_trip() {
    let truth = [220.0, 4.7e-6];
    let mut sim = SpectroscopySimulation::new();
    sim.set_scan_range_hz(1.0, 1e6);
    sim.set_number_of_points(30);
    sim.set_model(7, &truth).unwrap();
    sim.set_reference_resistance(100.0);
    sim.set_applied_voltage(1.0);
    let results = sim.simulation_results(30).unwrap();
    let voltages = results.voltages.clone().unwrap();

    let mut fit = SpectroscopyRegression::new();
    fit.set_reference_resistance(100.0).unwrap();
    fit.set_applied_voltage(1.0).unwrap();
    fit.voltage_data_as_complex_values(&results.frequencies, &voltages, None)
        .unwrap();
    fit.set_model(7).unwrap();

    let (z, _) = fit.impedances().unwrap();
    for (derived, expected) in z.iter().zip(&results.impedances) {
        assert_relative_eq!(derived.re, expected.re, max_relative = 1e-9);
        assert_relative_eq!(derived.im, expected.im, max_relative = 1e-9);
    }

    let result = fit.regression().unwrap();
    assert_relative_eq!(result.best_estimates[0], truth[0], max_relative = 1e-3);
    assert_relative_eq!(result.best_estimates[1], truth[1], max_relative = 1e-3);
    let calculated = result.calculated_voltages.as_ref().unwrap();
    assert_relative_eq!(calculated[0].norm(), voltages[0].norm(), max_relative = 1e-3);
}

/// How a round trip is judged
#[derive(Clone, Copy)]
enum Recovered {
    /// Every fitted parameter matches its true value
    Parameters,
    /// Only the fitted spectrum matches; equal elements may swap places
    Spectrum,
}

/// Truth per built-in model with automatic estimates, time constants well
/// inside 1 Hz to 1 MHz. Models 12 and 15 are covered separately below.
fn round_trip_cases() -> Vec<(usize, Vec<f64>, Recovered)> {
    use Recovered::{Parameters, Spectrum};
    vec![
        (1, vec![470.0], Parameters),
        (2, vec![1e-6], Parameters),
        (3, vec![1e-3], Parameters),
        (4, vec![50.0], Parameters),
        (5, vec![50.0, 0.5], Parameters),
        (6, vec![1e4, 0.8], Parameters),
        (7, vec![220.0, 4.7e-6], Parameters),
        (8, vec![100.0, 1e-3], Parameters),
        (9, vec![1e-6, 1e-3], Parameters),
        (10, vec![1000.0, 1e-6], Parameters),
        (11, vec![100.0, 1e-3], Parameters),
        (13, vec![1000.0, 1e-6, 50.0], Parameters),
        (14, vec![1000.0, 1e-6, 50.0, 1e-5], Parameters),
        (16, vec![1000.0, 1e-6, 1e-5], Parameters),
        (17, vec![1000.0, 1e-6, 1e-7], Parameters),
        (18, vec![1000.0, 1e-6, 100.0, 1e-5], Parameters),
        (19, vec![1000.0, 1e-6, 200.0, 1e-8], Spectrum),
        (20, vec![1000.0, 1e-6, 200.0, 1e-8, 50.0], Spectrum),
        (21, vec![1000.0, 1e-6, 100.0, 1e-8, 20.0], Parameters),
        (22, vec![1000.0, 1e-5, 1000.0, 1e-7, 1000.0, 1e-9], Spectrum),
        (23, vec![1000.0, 1e-5, 1000.0, 1e-7, 1000.0, 1e-9, 50.0], Spectrum),
        (24, vec![100.0, 1e-6, 50.0, 10.0], Parameters),
        (25, vec![100.0, 1e-6, 50.0, 0.5, 10.0], Parameters),
        (26, vec![100.0, 1e-6, 1e3, 0.8, 10.0], Parameters),
        (27, vec![1000.0, 1e-6, 200.0, 1e-8, 50.0], Spectrum),
        (28, vec![1000.0, 1e-6, 1000.0, 1e-8, 50.0, 1e-9, 10.0], Spectrum),
    ]
}

#[test]
fn test_round_trip_models_with_automatic_estimates() {
    for (number, truth, recovered) in round_trip_cases() {
        let mut fit = fit_model(number, &truth);
        let result = fit.regression().unwrap();
        assert!(result.converged, "model {} did not converge", number);

        match recovered {
            Recovered::Parameters => {
                for (fitted, expected) in result.best_estimates.iter().zip(&truth) {
                    assert_relative_eq!(*fitted, *expected, max_relative = 1e-3);
                }
            }
            Recovered::Spectrum => {
                for (calculated, measured) in result
                    .calculated_impedances
                    .iter()
                    .zip(&result.measured_impedances)
                {
                    let deviation = (calculated - measured).norm() / measured.norm();
                    assert!(deviation < 1e-3, "model {}: relative deviation {:e}", number, deviation);
                }
            }
        }
    }
}

#[test]
fn test_round_trip_resonant_models_from_nearby_estimates() {
    // the parallel-LC estimates rarely land between the right pair of
    // frequencies, and the resonance walls the simplex in
    let cases: [(usize, &[f64]); 3] = [
        (12, &[1e-6, 7.33e-4]),
        (15, &[1000.0, 1e-6, 50.0, 1e-3]),
        (15, &[500.0, 1e-7, 20.0, 1e-2]),
    ];
    for (number, truth) in cases {
        for factor in [0.9, 1.1] {
            let seed: Vec<f64> = truth.iter().map(|p| p * factor).collect();
            let mut fit = fit_model(number, truth);
            fit.set_model_with_estimates(number, &seed, None).unwrap();
            let result = fit.regression().unwrap();
            assert!(result.converged);
            for (fitted, expected) in result.best_estimates.iter().zip(truth) {
                assert_relative_eq!(*fitted, *expected, max_relative = 1e-3);
            }
        }
    }
}

#[test]
fn test_resonant_models_stay_inside_default_bounds() {
    let cases: [(usize, &[f64]); 5] = [
        (12, &[1e-6, 7.33e-4]),
        (15, &[1000.0, 1e-6, 50.0, 1e-3]),
        (15, &[100.0, 1e-5, 10.0, 1e-4]),
        (15, &[1000.0, 1e-6, 50.0, 1e-5]),
        (
            15,
            &[13.5039826429064, 6.5092110708595445e-6, 92.54978935317192, 2.3590379177036184e-3],
        ),
    ];
    for (number, truth) in cases {
        let mut fit = fit_model(number, truth);
        let result = fit.regression().unwrap();
        for (symbol, value) in result.symbols.iter().zip(&result.best_estimates) {
            assert!(
                *value >= 0.0,
                "model {}: {} fitted to {:e} below its default bound",
                number,
                symbol,
                value
            );
        }
        assert!(result.sum_of_squares.is_finite());
    }
}

// ============================================================================
// Data entry
// ============================================================================

#[test]
fn test_entry_encodings_agree() {
    let f = sweep(20);
    let z = spectrum(CircuitModel::ParallelRcSeriesR, &[1000.0, 1e-6, 50.0], &f);
    let (re, im) = split(&z);
    let mags: Vec<f64> = z.iter().map(|z| z.norm()).collect();
    let rads: Vec<f64> = z.iter().map(|z| z.arg()).collect();
    let degs: Vec<f64> = rads.iter().map(|r| r.to_degrees()).collect();

    let mut fit = SpectroscopyRegression::new();
    fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
    let (rect, _) = fit.impedances().unwrap();
    fit.impedance_data_as_phasor_rad(&f, &mags, &rads, None)
        .unwrap();
    let (polar_rad, _) = fit.impedances().unwrap();
    fit.impedance_data_as_phasor_deg(&f, &mags, &degs, None)
        .unwrap();
    let (polar_deg, _) = fit.impedances().unwrap();
    fit.impedance_data_as_complex_values(&f, &z, None).unwrap();
    let (complex, _) = fit.impedances().unwrap();

    for i in 0..f.len() {
        for other in [&polar_rad, &polar_deg, &complex] {
            assert_relative_eq!(rect[i].re, other[i].re, max_relative = 1e-12, epsilon = 1e-9);
            assert_relative_eq!(rect[i].im, other[i].im, max_relative = 1e-12, epsilon = 1e-9);
        }
    }
}

#[test]
fn test_mismatched_lengths_fail() {
    let f = sweep(10);
    let mut fit = SpectroscopyRegression::new();
    let err = fit
        .impedance_data_as_complex(&f, &[1.0; 10], &[1.0; 9], None)
        .unwrap_err();
    assert!(matches!(err, ImpedanceError::DimensionMismatch { .. }));
    assert!(fit.measurements().is_none());

    assert!(fit
        .voltage_data_as_phasor_deg(&f, &[1.0; 11], &[1.0; 10], None)
        .is_err());
    assert!(fit
        .impedance_data_as_complex(&f, &[1.0; 10], &[1.0; 10], Some((&[1.0; 10][..], &[1.0; 8][..])))
        .is_err());
}

#[test]
fn test_voltage_data_needs_divider() {
    let f = sweep(10);
    let mut fit = SpectroscopyRegression::new();
    fit.voltage_data_as_complex(&f, &[0.5; 10], &[0.1; 10], None)
        .unwrap();
    fit.set_model_with_estimates(1, &[10.0], None).unwrap();
    assert!(matches!(fit.regression(), Err(ImpedanceError::MissingData(_))));
}

// ============================================================================
// Guards and statistics
// ============================================================================

#[test]
fn test_degrees_of_freedom_guard() {
    let f = sweep(3);
    let z = spectrum(CircuitModel::ParallelRcSeriesR, &[1000.0, 1e-6, 50.0], &f);
    let (re, im) = split(&z);
    let mut fit = SpectroscopyRegression::new();
    fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
    fit.set_model_with_estimates(13, &[900.0, 1.2e-6, 40.0], None)
        .unwrap();
    assert!(matches!(
        fit.regression(),
        Err(ImpedanceError::InvalidDegreesOfFreedom(0))
    ));
}

#[test]
fn test_chi_square_only_with_weights() {
    let f = sweep(25);
    let (re, im) = split(&spectrum(CircuitModel::SeriesRc, &[220.0, 4.7e-6], &f));
    let w_re = vec![0.5; f.len()];
    let w_im = vec![0.5; f.len()];

    let mut fit = SpectroscopyRegression::new();
    fit.impedance_data_as_complex(&f, &re, &im, Some((w_re.as_slice(), w_im.as_slice())))
        .unwrap();
    fit.set_model(7).unwrap();
    let result = fit.regression().unwrap();
    let chi = result.chi_square.unwrap();
    assert_relative_eq!(chi, result.sum_of_squares / 0.25, max_relative = 1e-6, epsilon = 1e-12);
    assert_relative_eq!(
        result.reduced_chi_square.unwrap(),
        chi / result.degrees_of_freedom as f64,
        max_relative = 1e-12
    );

    fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
    let result = fit.regression().unwrap();
    assert!(result.chi_square.is_none());
    assert!(result.reduced_chi_square.is_none());
}

#[test]
fn test_zero_weight_falls_back_to_unweighted() {
    let f = sweep(15);
    let (re, im) = split(&spectrum(CircuitModel::SeriesRc, &[220.0, 4.7e-6], &f));
    let mut w_re = vec![1.0; f.len()];
    w_re[3] = 0.0;
    let w_im = vec![1.0; f.len()];

    let mut fit = SpectroscopyRegression::new();
    fit.impedance_data_as_complex(&f, &re, &im, Some((w_re.as_slice(), w_im.as_slice())))
        .unwrap();
    fit.set_model(7).unwrap();
    let result = fit.regression().unwrap();
    assert!(result.chi_square.is_none());
    assert!(result.impedance_weights.is_none());
}

#[test]
fn test_default_constraints_keep_parameters_non_negative() {
    let f = sweep(10);
    let re = vec![-50.0; f.len()];
    let im = vec![0.0; f.len()];

    let mut fit = SpectroscopyRegression::new();
    fit.impedance_data_as_complex(&f, &re, &im, None).unwrap();
    fit.set_model_with_estimates(1, &[10.0], None).unwrap();
    let bounded = fit.regression().unwrap().best_estimates[0];
    assert!(bounded >= -1e-9, "default bound violated: {}", bounded);

    fit.remove_default_constraints();
    let free = fit.regression().unwrap().best_estimates[0];
    assert_relative_eq!(free, -50.0, max_relative = 1e-6);

    fit.restore_default_constraints();
    fit.add_constraint(0, BoundDirection::Upper, 5.0);
    let capped = fit.regression().unwrap().best_estimates[0];
    assert!((-1e-9..=5.0 + 1e-9).contains(&capped));
}

#[test]
fn test_added_constraint_by_symbol() {
    let truth = [220.0, 4.7e-6];
    let mut fit = fit_model(7, &truth);
    fit.set_model_with_estimates(7, &[150.0, 4e-6], None).unwrap();
    fit.add_constraint_for("R1", BoundDirection::Upper, 200.0)
        .unwrap();
    let r = fit.regression().unwrap().best_estimates[0];
    assert!(r <= 200.0 + 1e-6);
    assert!(r > 150.0);

    fit.remove_added_constraints();
    let r = fit.regression().unwrap().best_estimates[0];
    assert_relative_eq!(r, truth[0], max_relative = 1e-3);
}

#[test]
fn test_iteration_cap_is_recorded() {
    let mut fit = fit_model(13, &[1000.0, 1e-6, 50.0]);
    fit.reset_maximum_number_of_iterations(50);
    fit.reset_tolerance(1e-12);
    assert_eq!(fit.tolerance(), 1e-12);
    let result = fit.regression().unwrap();
    assert_eq!(result.max_iterations, 50);
    assert!(result.first_iterations <= 50 + 10);
    assert!(!result.converged);

    let mut buf = Vec::new();
    write_regression_report(&mut buf, result, ReportFormat::Text).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert!(text.contains("stopped at the iteration limit without converging"));

    fit.reset_maximum_number_of_iterations(10_000);
    fit.reset_tolerance(1e-9);
    assert!(fit.regression().unwrap().converged);
}

// ============================================================================
// Plots and reports
// ============================================================================

#[test]
fn test_plots() {
    let mut fit = fit_model(7, &[220.0, 4.7e-6]);
    let mut sink: Vec<PlotData> = Vec::new();
    fit.plot_cole_cole(&mut sink).unwrap();
    fit.plot_impedance_magnitudes(&mut sink).unwrap();
    fit.set_linear_plot();
    fit.plot_impedance_phases(&mut sink).unwrap();

    assert_eq!(sink.len(), 3);
    assert_eq!(sink[0].kind, PlotKind::ColeCole);
    assert_eq!(sink[0].points.as_ref().unwrap().len(), 40);
    assert_eq!(sink[0].line.as_ref().unwrap().len(), 8000);
    assert_eq!(sink[1].x_legend, "Log10[Frequency / Hz]");
    assert_eq!(sink[2].x_legend, "Frequency / Hz");

    assert!(matches!(
        fit.plot_voltage_magnitudes(&mut sink),
        Err(ImpedanceError::MissingData(_))
    ));
    fit.set_reference_resistance(100.0).unwrap();
    fit.set_applied_voltage(2.0).unwrap();
    fit.plot_voltage_phases(&mut sink).unwrap();
    assert_eq!(sink.len(), 4);
}

#[test]
fn test_text_report() {
    let mut fit = fit_model(7, &[220.0, 4.7e-6]);
    let result = fit.regression().unwrap();
    let mut buf = Vec::new();
    write_regression_report(&mut buf, result, ReportFormat::Text).unwrap();
    let text = String::from_utf8(buf).unwrap();

    assert!(text.starts_with("SpectroscopyRegression Program Output File:  model 7"));
    assert!(text.contains("Circuit - model number 7"));
    assert!(text.contains("Degrees of freedom: 38"));
    assert!(!text.contains("Chi square"));
    assert!(text.contains("Entered data type:  Complex impedance (as real and imaginary parts)"));
    // header, two parameter rows and per-frequency rows
    assert!(text.lines().filter(|l| l.starts_with("R1")).count() == 2);
}

#[test]
fn test_report_file() {
    let mut fit = fit_model(1, &[470.0]);
    let base = std::env::temp_dir().join(format!("impedspec_report_{}", std::process::id()));
    let text = fit.print_to_text_file(&base).unwrap();
    assert_eq!(text.extension().unwrap(), "txt");
    let tab = fit.print_to_excel_file(&base).unwrap();
    assert_eq!(tab.extension().unwrap(), "xls");

    let content = std::fs::read_to_string(&tab).unwrap();
    assert!(content.contains("Parameter\tBest\tStandard"));
    std::fs::remove_file(text).unwrap();
    std::fs::remove_file(tab).unwrap();
}
