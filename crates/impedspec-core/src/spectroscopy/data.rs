//! Measured spectra
//!
//! A [`MeasurementSet`] holds N frequencies, each paired with a measured
//! voltage or impedance and optional standard errors. Data may arrive in any
//! of eight encodings ([`DataEntryType`]); internally the values are kept in
//! rectangular form and the entered errors are propagated to errors of the
//! real and imaginary parts.

use num_complex::Complex64;

use super::VoltageDivider;
use crate::error::{check_len, ImpedanceError, Result};
use crate::frequency::Frequency;
use crate::math::conversions::{degree_2_radian, polar_rad};
use crate::math::uncertainty::ComplexUncertain;

/// Quantity measured at each frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantity {
    /// Voltage across the test circuit in a voltage divider
    Voltage,
    /// Impedance of the test circuit
    Impedance,
}

/// How the measured data were entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataEntryType {
    VoltageRealImag,
    VoltageComplex,
    VoltagePolarRad,
    VoltagePolarDeg,
    ImpedanceRealImag,
    ImpedanceComplex,
    ImpedancePolarRad,
    ImpedancePolarDeg,
}

impl DataEntryType {
    pub const ALL: [DataEntryType; 8] = [
        DataEntryType::VoltageRealImag,
        DataEntryType::VoltageComplex,
        DataEntryType::VoltagePolarRad,
        DataEntryType::VoltagePolarDeg,
        DataEntryType::ImpedanceRealImag,
        DataEntryType::ImpedanceComplex,
        DataEntryType::ImpedancePolarRad,
        DataEntryType::ImpedancePolarDeg,
    ];

    /// Position in [`DataEntryType::ALL`], 0 to 7
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn quantity(&self) -> Quantity {
        if self.index() < 4 {
            Quantity::Voltage
        } else {
            Quantity::Impedance
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataEntryType::VoltageRealImag => "Complex voltage (as real and imaginary parts)",
            DataEntryType::VoltageComplex => "Complex voltage (as Complex)",
            DataEntryType::VoltagePolarRad => "Voltage Magnitude and phase (in radians)",
            DataEntryType::VoltagePolarDeg => "Voltage Magnitude and phase (in degrees)",
            DataEntryType::ImpedanceRealImag => "Complex impedance (as real and imaginary parts)",
            DataEntryType::ImpedanceComplex => "Complex impedance (as Complex)",
            DataEntryType::ImpedancePolarRad => "Magnitude and phase (in radians)",
            DataEntryType::ImpedancePolarDeg => "Magnitude and phase (in degrees)",
        }
    }

    fn new(quantity: Quantity, offset: usize) -> Self {
        let base = match quantity {
            Quantity::Voltage => 0,
            Quantity::Impedance => 4,
        };
        Self::ALL[base + offset]
    }

    /// Column headings for the data as entered, two header rows
    pub(crate) fn entered_headings(&self) -> (&'static [&'static str], &'static [&'static str]) {
        let unit: &'static [&'static str] = match (self.quantity(), self.index() % 4) {
            (Quantity::Voltage, 1) => &["voltage"],
            (Quantity::Voltage, _) => &["[voltage]", "[voltage]"],
            (Quantity::Impedance, 1) => &["impedance"],
            (Quantity::Impedance, _) => &["[impedance]", "[impedance]"],
        };
        let names: &'static [&'static str] = match self.index() % 4 {
            0 => &["Real", "Imag"],
            1 => &["Complex"],
            2 => &["Magnitude", "Phase (rad)"],
            _ => &["Magnitude", "Phase (deg)"],
        };
        (names, unit)
    }
}

impl std::fmt::Display for DataEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Measured spectrum as entered
#[derive(Debug, Clone, PartialEq)]
pub struct MeasurementSet {
    frequency: Frequency,
    entry_type: DataEntryType,
    /// Entered values in rectangular form
    values: Vec<Complex64>,
    /// Standard errors of the real and imaginary parts
    errors: Option<Vec<(f64, f64)>>,
    /// Errors in the form they were entered
    entered_errors: Option<(Vec<f64>, Vec<f64>)>,
}

impl MeasurementSet {
    /// Real and imaginary parts, with optional errors of each part
    pub fn from_real_imag(
        quantity: Quantity,
        frequencies: &[f64],
        real: &[f64],
        imag: &[f64],
        weights: Option<(&[f64], &[f64])>,
    ) -> Result<Self> {
        let n = frequencies.len();
        let (re_what, im_what) = match quantity {
            Quantity::Voltage => ("Real[voltages]", "Imag[voltages]"),
            Quantity::Impedance => ("Real[impedances]", "Imag[impedances]"),
        };
        check_len(re_what, n, real.len())?;
        check_len(im_what, n, imag.len())?;
        let values = real
            .iter()
            .zip(imag)
            .map(|(&re, &im)| Complex64::new(re, im))
            .collect();

        let (errors, entered_errors) = match weights {
            Some((re_w, im_w)) => {
                check_len("real weights", n, re_w.len())?;
                check_len("imag weights", n, im_w.len())?;
                let errors = re_w.iter().zip(im_w).map(|(&a, &b)| (a, b)).collect();
                (Some(errors), Some((re_w.to_vec(), im_w.to_vec())))
            }
            None => (None, None),
        };

        Ok(Self {
            frequency: Frequency::from_hz(frequencies.to_vec()),
            entry_type: DataEntryType::new(quantity, 0),
            values,
            errors,
            entered_errors,
        })
    }

    /// Complex values, with optional complex weights whose real and imaginary
    /// parts are the errors of the real and imaginary parts
    pub fn from_complex(
        quantity: Quantity,
        frequencies: &[f64],
        values: &[Complex64],
        weights: Option<&[Complex64]>,
    ) -> Result<Self> {
        let n = frequencies.len();
        let what = match quantity {
            Quantity::Voltage => "voltages",
            Quantity::Impedance => "impedances",
        };
        check_len(what, n, values.len())?;

        let (errors, entered_errors) = match weights {
            Some(w) => {
                check_len("weights", n, w.len())?;
                let errors = w.iter().map(|c| (c.re, c.im)).collect();
                let entered = (w.iter().map(|c| c.re).collect(), w.iter().map(|c| c.im).collect());
                (Some(errors), Some(entered))
            }
            None => (None, None),
        };

        Ok(Self {
            frequency: Frequency::from_hz(frequencies.to_vec()),
            entry_type: DataEntryType::new(quantity, 1),
            values: values.to_vec(),
            errors,
            entered_errors,
        })
    }

    /// Magnitudes and phases, the phases in degrees when `degrees` is set
    ///
    /// Errors of magnitude and phase (same angular unit as the phases) are
    /// propagated to the real and imaginary parts.
    pub fn from_polar(
        quantity: Quantity,
        frequencies: &[f64],
        magnitudes: &[f64],
        phases: &[f64],
        weights: Option<(&[f64], &[f64])>,
        degrees: bool,
    ) -> Result<Self> {
        let n = frequencies.len();
        check_len("magnitudes", n, magnitudes.len())?;
        check_len("phases", n, phases.len())?;
        let to_rad = |x: f64| if degrees { degree_2_radian(x) } else { x };

        let values = magnitudes
            .iter()
            .zip(phases)
            .map(|(&m, &p)| polar_rad(m, to_rad(p)))
            .collect();

        let (errors, entered_errors) = match weights {
            Some((mag_w, phase_w)) => {
                check_len("magnitude weights", n, mag_w.len())?;
                check_len("phase weights", n, phase_w.len())?;
                let errors = (0..n)
                    .map(|i| {
                        let z = ComplexUncertain::from_polar(
                            magnitudes[i],
                            mag_w[i],
                            to_rad(phases[i]),
                            to_rad(phase_w[i]),
                        );
                        (z.re_err, z.im_err)
                    })
                    .collect();
                (Some(errors), Some((mag_w.to_vec(), phase_w.to_vec())))
            }
            None => (None, None),
        };

        Ok(Self {
            frequency: Frequency::from_hz(frequencies.to_vec()),
            entry_type: DataEntryType::new(quantity, if degrees { 3 } else { 2 }),
            values,
            errors,
            entered_errors,
        })
    }

    pub fn frequency(&self) -> &Frequency {
        &self.frequency
    }

    pub fn npoints(&self) -> usize {
        self.values.len()
    }

    pub fn entry_type(&self) -> DataEntryType {
        self.entry_type
    }

    pub fn quantity(&self) -> Quantity {
        self.entry_type.quantity()
    }

    /// Entered voltages or impedances in rectangular form
    pub fn values(&self) -> &[Complex64] {
        &self.values
    }

    pub fn is_weighted(&self) -> bool {
        self.errors.is_some()
    }

    /// Errors of the real and imaginary parts of the entered values
    pub fn errors(&self) -> Option<&[(f64, f64)]> {
        self.errors.as_deref()
    }

    /// Errors exactly as entered (real/imag or magnitude/phase)
    pub fn entered_errors(&self) -> Option<(&[f64], &[f64])> {
        self.entered_errors
            .as_ref()
            .map(|(a, b)| (a.as_slice(), b.as_slice()))
    }

    /// Impedances and their errors
    ///
    /// Voltage data need the divider that produced them.
    pub fn impedances(
        &self,
        divider: Option<&VoltageDivider>,
    ) -> Result<(Vec<Complex64>, Option<Vec<(f64, f64)>>)> {
        match self.quantity() {
            Quantity::Impedance => Ok((self.values.clone(), self.errors.clone())),
            Quantity::Voltage => {
                let divider = divider.ok_or_else(|| {
                    ImpedanceError::MissingData(
                        "voltage data need both a reference impedance and an applied voltage"
                            .to_string(),
                    )
                })?;
                match &self.errors {
                    Some(errors) => {
                        let (z, e): (Vec<_>, Vec<_>) = self
                            .values
                            .iter()
                            .zip(errors)
                            .map(|(&v, &(re, im))| {
                                let z = divider.impedance_with_errors(ComplexUncertain::new(v, re, im));
                                (z.value, (z.re_err, z.im_err))
                            })
                            .unzip();
                        Ok((z, Some(e)))
                    }
                    None => Ok((
                        self.values.iter().map(|&v| divider.impedance(v)).collect(),
                        None,
                    )),
                }
            }
        }
    }
}
