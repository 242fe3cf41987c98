//! Regression and simulation reports
//!
//! Two layouts share one writer: a plain-text report with fixed-width,
//! space-padded columns and a tab-delimited one for spreadsheet import.
//! Numbers are rounded to four places (in the mantissa for very small or
//! large values).

use std::fmt::Display;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use num_complex::Complex64;

use super::regression::{FitResult, PROGRAM as REGRESSION_PROGRAM};
use super::simulation::{SimulationResults, PROGRAM as SIMULATION_PROGRAM};
use crate::math::conversions::{polar_components, truncate};

pub const REGRESSION_TEXT_FILE: &str = "ImpedSpecRegressionOutput.txt";
pub const REGRESSION_TAB_FILE: &str = "ImpedSpecRegressionOutput.xls";
pub const SIMULATION_TEXT_FILE: &str = "ImpedSpecSimulationOutput.txt";
pub const SIMULATION_TAB_FILE: &str = "ImpedSpecSimulationOutput.xls";

const PLACES: i32 = 4;
const REGRESSION_FIELD: usize = 11;
const SIMULATION_FIELD: usize = 14;
const PARAMETER_FIELD: usize = 10;

/// Report layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Space-padded columns, ".txt"
    Text,
    /// Tab-separated columns, ".xls"
    Tab,
}

impl ReportFormat {
    /// File path actually written for a requested `path`
    ///
    /// Text reports gain ".txt" only when the name has no extension; tab
    /// reports always end in ".xls".
    pub fn report_path(&self, path: &Path) -> PathBuf {
        match self {
            ReportFormat::Text if path.extension().is_none() => path.with_extension("txt"),
            ReportFormat::Text => path.to_path_buf(),
            ReportFormat::Tab => path.with_extension("xls"),
        }
    }
}

// ============================================================================
// Formatting helpers
// ============================================================================

/// Decimal form in `[1e-3, 1e7)`, scientific outside it
fn number(value: f64) -> String {
    if value == 0.0 || !value.is_finite() || (1e-3..1e7).contains(&value.abs()) {
        return format!("{:?}", truncate(value, PLACES));
    }
    let exponent = value.abs().log10().floor() as i32;
    let mantissa = truncate(value / 10f64.powi(exponent), PLACES);
    format!("{:?}e{}", mantissa, exponent)
}

fn complex(z: Complex64) -> String {
    let sign = if z.im < 0.0 { '-' } else { '+' };
    format!("{} {} j{}", number(z.re), sign, number(z.im.abs()))
}

struct Table<'a, W: Write> {
    out: &'a mut W,
    format: ReportFormat,
    field: usize,
}

impl<'a, W: Write> Table<'a, W> {
    fn new(out: &'a mut W, format: ReportFormat, field: usize) -> Self {
        Self { out, format, field }
    }

    /// One line; the final cell is never padded
    fn row<S: Display>(&mut self, cells: &[S]) -> std::io::Result<()> {
        let last = cells.len().saturating_sub(1);
        for (i, cell) in cells.iter().enumerate() {
            if i == last {
                write!(self.out, "{}", cell)?;
            } else {
                match self.format {
                    ReportFormat::Text => {
                        write!(self.out, "{:<width$}", cell.to_string(), width = self.field)?
                    }
                    ReportFormat::Tab => write!(self.out, "{}\t", cell)?,
                }
            }
        }
        writeln!(self.out)
    }
}

fn create<P: AsRef<Path>>(path: P) -> anyhow::Result<BufWriter<File>> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create report file {}", path.display()))?;
    Ok(BufWriter::new(file))
}

// ============================================================================
// Regression report
// ============================================================================

/// Write a regression report
pub fn write_regression_report<W: Write>(
    out: &mut W,
    result: &FitResult,
    format: ReportFormat,
) -> std::io::Result<()> {
    writeln!(out, "{} Program Output File:  {}", REGRESSION_PROGRAM, result.title)?;
    writeln!(out)?;
    writeln!(out, "{}", result.model_description)?;
    writeln!(out)?;

    writeln!(out, "Circuit Parameters")?;
    writeln!(out, "Best Estimates")?;
    {
        let mut t = Table::new(out, format, REGRESSION_FIELD);
        t.row(&["Parameter", "Best", "Standard", "Coeff. of", "Pre-", "Post-"])?;
        t.row(&["   ", "estimate", "deviation", "variation", "gradient", "gradient"])?;
        for (i, symbol) in result.symbols.iter().enumerate() {
            t.row(&[
                symbol.clone(),
                number(result.best_estimates[i]),
                number(result.standard_deviations[i]),
                number(result.coefficients_of_variation[i]),
                number(result.pre_minimum_gradients[i]),
                number(result.post_minimum_gradients[i]),
            ])?;
        }
    }
    writeln!(out)?;

    writeln!(out, "Initial Estimates")?;
    {
        let mut t = Table::new(out, format, REGRESSION_FIELD);
        t.row(&["Parameter", "Initial", "initial"])?;
        t.row(&["   ", "estimate", "step size"])?;
        for (i, symbol) in result.symbols.iter().enumerate() {
            t.row(&[
                symbol.clone(),
                number(result.initial_estimates[i]),
                number(result.initial_steps[i]),
            ])?;
        }
    }
    writeln!(out)?;

    writeln!(
        out,
        "Sum of squares of the Real[Z] and Imag[Z] residuals:         {}",
        number(result.sum_of_squares)
    )?;
    writeln!(
        out,
        "Reduced sum of squares of the Real[Z] and Imag[Z] residuals: {}",
        number(result.reduced_sum_of_squares)
    )?;
    writeln!(out, "Degrees of freedom: {}", result.degrees_of_freedom)?;
    if let (Some(chi), Some(reduced)) = (result.chi_square, result.reduced_chi_square) {
        writeln!(out, "Chi square:         {}", number(chi))?;
        writeln!(out, "Reduced chi square: {}", number(reduced))?;
    }
    writeln!(
        out,
        "Number of iterations taken in the first regression:      {}",
        result.first_iterations
    )?;
    writeln!(
        out,
        "Number of iterations taken in the second regression:     {}",
        result.second_iterations
    )?;
    writeln!(
        out,
        "Maximum number of iterations allowed in each regression: {}",
        result.max_iterations
    )?;
    if !result.converged {
        writeln!(
            out,
            "The regression stopped at the iteration limit without converging"
        )?;
    }
    writeln!(out)?;

    if let Some(v) = result.applied_voltage {
        writeln!(out, "Applied voltage: {}", number(v))?;
    }
    if let Some(z) = result.reference_impedance {
        writeln!(out, "Reference impedance: {}", complex(z))?;
    }
    writeln!(out)?;

    writeln!(out, "Fitted and entered data [frequencies, calculated impedances, data as entered]")?;
    writeln!(out, "Entered data type:  {}", result.entry_type.name())?;
    writeln!(out)?;

    let (names, units) = result.entry_type.entered_headings();
    let mut first = vec!["Frequency", "Experimental", "Calculated", "Experimental", "Calculated"];
    first.extend_from_slice(names);
    let mut second = vec!["Frequency", "Real[Z]", "Real[Z]", "Imag[Z]", "Imag[Z]"];
    second.extend_from_slice(units);

    let entered = entered_columns(result);
    let mut t = Table::new(out, format, REGRESSION_FIELD);
    t.row(first.as_slice())?;
    t.row(second.as_slice())?;
    for i in 0..result.number_of_frequencies {
        let measured = result.measured_impedances[i];
        let calculated = result.calculated_impedances[i];
        let mut cells = vec![
            number(result.frequency.f()[i]),
            number(measured.re),
            number(calculated.re),
            number(measured.im),
            number(calculated.im),
        ];
        cells.extend(entered[i].iter().cloned());
        t.row(cells.as_slice())?;
    }
    Ok(())
}

/// Entered data, in the form the caller supplied them
fn entered_columns(result: &FitResult) -> Vec<Vec<String>> {
    let (names, _) = result.entry_type.entered_headings();
    let (mags, rads, degs) = polar_components(&result.entered_values);
    result
        .entered_values
        .iter()
        .enumerate()
        .map(|(i, &v)| match names {
            ["Complex"] => vec![complex(v)],
            [_, "Phase (rad)"] => vec![number(mags[i]), number(rads[i])],
            [_, "Phase (deg)"] => vec![number(mags[i]), number(degs[i])],
            _ => vec![number(v.re), number(v.im)],
        })
        .collect()
}

/// Write a regression report to `path`, returning the path written
pub fn save_regression_report(
    path: &Path,
    result: &FitResult,
    format: ReportFormat,
) -> anyhow::Result<PathBuf> {
    let path = format.report_path(path);
    let mut out = create(&path)?;
    write_regression_report(&mut out, result, format)
        .and_then(|_| out.flush())
        .with_context(|| format!("failed to write regression report {}", path.display()))?;
    Ok(path)
}

// ============================================================================
// Simulation report
// ============================================================================

/// Write a simulation report
pub fn write_simulation_report<W: Write>(
    out: &mut W,
    results: &SimulationResults,
    format: ReportFormat,
) -> std::io::Result<()> {
    writeln!(out, "{} Program Output File:  {}", SIMULATION_PROGRAM, results.title)?;
    writeln!(out)?;
    writeln!(out, "{}", results.model_description)?;
    writeln!(out)?;

    writeln!(out, "Circuit Parameters")?;
    {
        let mut t = Table::new(out, format, PARAMETER_FIELD);
        t.row(&["Parameters", "Value (SI unit)"])?;
        for (symbol, value) in results.symbols.iter().zip(&results.parameters) {
            t.row(&[symbol.clone(), value.to_string()])?;
        }
    }
    writeln!(out)?;

    writeln!(out, "Frequency - Impedance data")?;
    spectrum_table(out, results, &results.impedances, "Z", "/ohms", format)?;
    writeln!(out)?;

    if let (Some(voltages), Some(applied), Some(reference)) = (
        &results.voltages,
        results.applied_voltage,
        results.reference_impedance,
    ) {
        writeln!(out, "Applied voltage: {} volts", applied)?;
        writeln!(out)?;
        writeln!(out, "Reference impedance: {} ohms", complex(reference))?;
        writeln!(out)?;
        writeln!(out, "Frequency - Voltage data")?;
        spectrum_table(out, results, voltages, "V", "/volts", format)?;
    }
    Ok(())
}

fn spectrum_table<W: Write>(
    out: &mut W,
    results: &SimulationResults,
    values: &[Complex64],
    symbol: &str,
    unit: &str,
    format: ReportFormat,
) -> std::io::Result<()> {
    let (mags, rads, degs) = polar_components(values);
    let real = format!("Real[{}]", symbol);
    let imag = format!("Imag[{}]", symbol);

    let mut t = Table::new(out, format, SIMULATION_FIELD);
    t.row(&[
        "Frequency", "Magnitude", "Phase", "Phase", &real, &imag, "Log10(freq)", "Radial frequency",
    ])?;
    t.row(&["/Hz [freq]", "  ", "/degrees", "/radians", unit, unit, "  ", "/radians"])?;
    for (i, v) in values.iter().enumerate() {
        t.row(&[
            number(results.frequencies[i]),
            number(mags[i]),
            number(degs[i]),
            number(rads[i]),
            number(v.re),
            number(v.im),
            number(results.frequencies[i].log10()),
            number(results.omegas[i]),
        ])?;
    }
    Ok(())
}

/// Write a simulation report to `path`, returning the path written
pub fn save_simulation_report(
    path: &Path,
    results: &SimulationResults,
    format: ReportFormat,
) -> anyhow::Result<PathBuf> {
    let path = format.report_path(path);
    let mut out = create(&path)?;
    write_simulation_report(&mut out, results, format)
        .and_then(|_| out.flush())
        .with_context(|| format!("failed to write simulation report {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_path() {
        let text = ReportFormat::Text;
        assert_eq!(text.report_path(Path::new("fit")), PathBuf::from("fit.txt"));
        assert_eq!(text.report_path(Path::new("fit.dat")), PathBuf::from("fit.dat"));
        let tab = ReportFormat::Tab;
        assert_eq!(tab.report_path(Path::new("fit")), PathBuf::from("fit.xls"));
        assert_eq!(tab.report_path(Path::new("fit.txt")), PathBuf::from("fit.xls"));
    }

    #[test]
    fn test_number_format() {
        assert_eq!(number(100.0), "100.0");
        assert_eq!(number(3.14159), "3.1416");
        assert_eq!(number(4.712345e-6), "4.7123e-6");
        assert_eq!(number(f64::NAN), "NaN");
        assert_eq!(complex(Complex64::new(1.0, -2.0)), "1.0 - j2.0");
    }

    #[test]
    fn test_table_layout() {
        let mut buf = Vec::new();
        Table::new(&mut buf, ReportFormat::Text, 6)
            .row(&["a", "b", "c"])
            .unwrap();
        Table::new(&mut buf, ReportFormat::Tab, 6)
            .row(&["a", "b", "c"])
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "a     b     c\na\tb\tc\n");
    }
}
