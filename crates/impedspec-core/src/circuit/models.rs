//! The built-in equivalent-circuit library
//!
//! Each of the 44 circuits is a [`CircuitModel`] variant carrying its ordered
//! parameter symbols and a closed-form impedance. The numbering is part of
//! the public contract: model `n` in reports and data files is
//! `CircuitModel::from_number(n)`.
//!
//! Notation in the variant docs: `+` is series, `||` is parallel, `Q` is a
//! constant phase element (`Qsigma`, `Qalpha`), `W` an infinite Warburg and
//! `F` a finite Warburg (`Fsigma`, `Fdelta`).

use num_complex::Complex64;

use super::elements::{
    capacitance, constant_phase, finite_warburg, inductance, infinite_warburg, parallel,
    r_parallel_c, r_series_c, resistance,
};
use crate::constants::NUMBER_OF_MODELS;
use crate::error::{ImpedanceError, Result};

/// A built-in equivalent circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CircuitModel {
    /// R1
    Resistor,
    /// C1
    Capacitor,
    /// L1
    Inductor,
    /// W1
    InfiniteWarburg,
    /// F1
    FiniteWarburg,
    /// Q1
    ConstantPhase,
    /// R1 + C1
    SeriesRc,
    /// R1 + L1
    SeriesRl,
    /// C + L, the first parameter is the capacitance
    SeriesLc,
    /// R1 || C1
    ParallelRc,
    /// R1 || L1
    ParallelRl,
    /// C || L, the first parameter is the capacitance
    ParallelLc,
    /// (R1 || C1) + R2
    ParallelRcSeriesR,
    /// (R1 || C1) + R2 + L1
    ParallelRcSeriesRl,
    /// ((R1 || C1) + R2) || L1
    ParallelRcSeriesRParallelL,
    /// (R1 || C1) + C2
    ParallelRcSeriesC,
    /// (R1 + C1) || C2
    SeriesRcParallelC,
    /// (R1 || C1) + R2 + C2
    ParallelRcSeriesRc,
    /// (R1 || C1) + (R2 || C2)
    TwoParallelRc,
    /// (R1 || C1) + (R2 || C2) + R3
    TwoParallelRcSeriesR,
    /// (((R1 || C1) + R2) || C2) + R3
    NestedParallelRcSeriesR,
    /// (R1 || C1) + (R2 || C2) + (R3 || C3)
    ThreeParallelRc,
    /// (R1 || C1) + (R2 || C2) + (R3 || C3) + R4
    ThreeParallelRcSeriesR,
    /// ((R1 + W1) || C1) + R2
    RandlesInfiniteWarburg,
    /// ((R1 + F1) || C1) + R2
    RandlesFiniteWarburg,
    /// ((R1 + Q1) || C1) + R2
    RandlesConstantPhase,
    /// (R1 || C1) + (R2 || C2) + W1
    TwoParallelRcSeriesWarburg,
    /// (R1 || C1) + (R2 || C2) + (W || C3) + R4
    TwoParallelRcWarburgParallelCSeriesR,
    /// (R1 || C1) + (R2 || Q1)
    ParallelRcParallelRq,
    /// (R1 || C1) + (R2 || Q1) + R3
    ParallelRcParallelRqSeriesR,
    /// (R1 || Q1) + (R2 || Q2) + (R3 || Q3)
    ThreeParallelRq,
    /// (R1 || Q1) + (R2 || Q2) + (R3 || Q3) + R4
    ThreeParallelRqSeriesR,
    /// ((R1 || Q1) + (R2 || Q2) + (R3 || Q3) + R4) || C1
    ThreeParallelRqSeriesRParallelC,
    /// (C1 || Q1) + (C2 || Q2) + (C3 || Q3)
    ThreeParallelCq,
    /// (C1 || Q1) + (C2 || Q2) + (C3 || Q3) + R1
    ThreeParallelCqSeriesR,
    /// ((R1 + Q1) || C1) + ((R2 + Q2) || C2) + ((R3 + Q3) || C3)
    ThreeRandlesCpe,
    /// ((R1 + Q1) || C1) + ((R2 + Q2) || C2) + ((R3 + Q3) || C3) + R4
    ThreeRandlesCpeSeriesR,
    /// ((R1 + Q1) || C1) + ((R2 + Q2) || C2)
    TwoRandlesCpe,
    /// ((R2 + Q2) || C2) + R3
    ///
    /// R1, Q1 and C1 are carried as parameters but do not reach the result.
    TwoRandlesCpeSeriesR,
    /// (((R1 || Q1) + (R2 || Q2) + (R3 || Q3)) || C1) + R4
    ThreeParallelRqShuntCSeriesR,
    /// (((R1 || Q1) + (R2 || C2) + (R3 || Q3)) || C1) + R4
    MixedParallelRqRcShuntCSeriesR,
    /// (R1 || Q1) + (R2 || C2) + (R3 || Q3) + R4
    MixedParallelRqRcSeriesR,
    /// Same circuit as model 33
    ThreeParallelRqSeriesRShuntC,
    /// ((R1 || Q1) + (R2 || Q2) + R3) || C1
    TwoParallelRqSeriesRShuntC,
}

use CircuitModel::*;

impl CircuitModel {
    /// All models, in model-number order
    pub const ALL: [CircuitModel; NUMBER_OF_MODELS] = [
        Resistor,
        Capacitor,
        Inductor,
        InfiniteWarburg,
        FiniteWarburg,
        ConstantPhase,
        SeriesRc,
        SeriesRl,
        SeriesLc,
        ParallelRc,
        ParallelRl,
        ParallelLc,
        ParallelRcSeriesR,
        ParallelRcSeriesRl,
        ParallelRcSeriesRParallelL,
        ParallelRcSeriesC,
        SeriesRcParallelC,
        ParallelRcSeriesRc,
        TwoParallelRc,
        TwoParallelRcSeriesR,
        NestedParallelRcSeriesR,
        ThreeParallelRc,
        ThreeParallelRcSeriesR,
        RandlesInfiniteWarburg,
        RandlesFiniteWarburg,
        RandlesConstantPhase,
        TwoParallelRcSeriesWarburg,
        TwoParallelRcWarburgParallelCSeriesR,
        ParallelRcParallelRq,
        ParallelRcParallelRqSeriesR,
        ThreeParallelRq,
        ThreeParallelRqSeriesR,
        ThreeParallelRqSeriesRParallelC,
        ThreeParallelCq,
        ThreeParallelCqSeriesR,
        ThreeRandlesCpe,
        ThreeRandlesCpeSeriesR,
        TwoRandlesCpe,
        TwoRandlesCpeSeriesR,
        ThreeParallelRqShuntCSeriesR,
        MixedParallelRqRcShuntCSeriesR,
        MixedParallelRqRcSeriesR,
        ThreeParallelRqSeriesRShuntC,
        TwoParallelRqSeriesRShuntC,
    ];

    /// Look up a model by its number, 1 to 44
    pub fn from_number(number: usize) -> Result<Self> {
        if number == 0 || number > NUMBER_OF_MODELS {
            return Err(ImpedanceError::UnknownModel(number));
        }
        Ok(Self::ALL[number - 1])
    }

    /// The model number, 1 to 44
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    /// Number of parameters
    pub fn n_parameters(&self) -> usize {
        self.symbols().len()
    }

    /// Ordered parameter symbols
    pub fn symbols(&self) -> &'static [&'static str] {
        match self {
            Resistor => &["R1"],
            Capacitor => &["C1"],
            Inductor => &["L1"],
            InfiniteWarburg => &["W1"],
            FiniteWarburg => &["Fsigma1", "Fdelta1"],
            ConstantPhase => &["Qsigma1", "Qalpha1"],
            SeriesRc => &["R1", "C1"],
            SeriesRl => &["R1", "L1"],
            SeriesLc => &["L1", "C1"],
            ParallelRc => &["R1", "C1"],
            ParallelRl => &["R1", "L1"],
            ParallelLc => &["L1", "C1"],
            ParallelRcSeriesR => &["R1", "C1", "R2"],
            ParallelRcSeriesRl | ParallelRcSeriesRParallelL => &["R1", "C1", "R2", "L1"],
            ParallelRcSeriesC | SeriesRcParallelC => &["R1", "C1", "C2"],
            ParallelRcSeriesRc | TwoParallelRc => &["R1", "C1", "R2", "C2"],
            TwoParallelRcSeriesR | NestedParallelRcSeriesR => &["R1", "C1", "R2", "C2", "R3"],
            ThreeParallelRc => &["R1", "C1", "R2", "C2", "R3", "C3"],
            ThreeParallelRcSeriesR => &["R1", "C1", "R2", "C2", "R3", "C3", "R4"],
            RandlesInfiniteWarburg => &["R1", "C1", "W1", "R2"],
            RandlesFiniteWarburg => &["R1", "C1", "Fsigma1", "Fdelta1", "R2"],
            RandlesConstantPhase => &["R1", "C1", "Qsigma1", "Qalpha1", "R2"],
            TwoParallelRcSeriesWarburg => &["R1", "C1", "R2", "C2", "W1"],
            TwoParallelRcWarburgParallelCSeriesR => &["R1", "C1", "R2", "C2", "W3", "C3", "R4"],
            ParallelRcParallelRq => &["R1", "C1", "R2", "Qsigma1", "Qalpha1"],
            ParallelRcParallelRqSeriesR => &["R1", "C1", "R2", "Qsigma1", "Qalpha1", "R3"],
            ThreeParallelRq => &[
                "R1", "Qsigma1", "Qalpha1", "R2", "Qsigma2", "Qalpha2", "R3", "Qsigma3", "Qalpha3",
            ],
            ThreeParallelRqSeriesR => &[
                "R1", "Qsigma1", "Qalpha1", "R2", "Qsigma2", "Qalpha2", "R3", "Qsigma3", "Qalpha3",
                "R4",
            ],
            ThreeParallelRqSeriesRParallelC
            | ThreeParallelRqShuntCSeriesR
            | ThreeParallelRqSeriesRShuntC => &[
                "R1", "Qsigma1", "Qalpha1", "R2", "Qsigma2", "Qalpha2", "R3", "Qsigma3", "Qalpha3",
                "R4", "C1",
            ],
            ThreeParallelCq => &[
                "C1", "Qsigma1", "Qalpha1", "C2", "Qsigma2", "Qalpha2", "C3", "Qsigma3", "Qalpha3",
            ],
            ThreeParallelCqSeriesR => &[
                "C1", "Qsigma1", "Qalpha1", "C2", "Qsigma2", "Qalpha2", "C3", "Qsigma3", "Qalpha3",
                "R1",
            ],
            ThreeRandlesCpe => &[
                "R1", "Qsigma1", "Qalpha1", "C1", "R2", "Qsigma2", "Qalpha2", "C2", "R3",
                "Qsigma3", "Qalpha3", "C3",
            ],
            ThreeRandlesCpeSeriesR => &[
                "R1", "Qsigma1", "Qalpha1", "C1", "R2", "Qsigma2", "Qalpha2", "C2", "R3",
                "Qsigma3", "Qalpha3", "C3", "R4",
            ],
            TwoRandlesCpe => &["R1", "Qsigma1", "Qalpha1", "C1", "R2", "Qsigma2", "Qalpha2", "C2"],
            TwoRandlesCpeSeriesR => &[
                "R1", "Qsigma1", "Qalpha1", "C1", "R2", "Qsigma2", "Qalpha2", "C2", "R3",
            ],
            MixedParallelRqRcShuntCSeriesR => &[
                "R1", "Qsigma1", "Qalpha1", "R2", "C2", "R3", "Qsigma3", "Qalpha3", "R4", "C1",
            ],
            MixedParallelRqRcSeriesR => &[
                "R1", "Qsigma1", "Qalpha1", "R2", "C2", "R3", "Qsigma3", "Qalpha3", "R4",
            ],
            TwoParallelRqSeriesRShuntC => &[
                "R1", "Qsigma1", "Qalpha1", "R2", "Qsigma2", "Qalpha2", "R3", "C1",
            ],
        }
    }

    /// Impedance at radial frequency `omega`
    ///
    /// Fails if `parameters` does not hold exactly one value per symbol.
    pub fn impedance(&self, parameters: &[f64], omega: f64) -> Result<Complex64> {
        let expected = self.n_parameters();
        if parameters.len() != expected {
            return Err(ImpedanceError::DimensionMismatch {
                expected_what: format!("model {} parameters", self.number()),
                expected,
                found_what: "parameter values".to_string(),
                found: parameters.len(),
            });
        }
        Ok(self.eval(parameters, omega))
    }

    /// Impedance without the length check; `p` must hold `n_parameters()` values
    pub(crate) fn eval(&self, p: &[f64], omega: f64) -> Complex64 {
        let rc = |r: usize, c: usize| r_parallel_c(p[r], p[c], omega);
        let cap = |c: usize| capacitance(p[c], omega);
        let cpe = |s: usize, a: usize| constant_phase(p[s], p[a], omega);
        // R || Q with the resistance first
        let rq = |r: usize| parallel(cpe(r + 1, r + 2), resistance(p[r]));
        // (R + Q) || C with the capacitance after the CPE pair
        let randles = |r: usize| parallel(cpe(r + 1, r + 2) + p[r], cap(r + 3));

        match self {
            Resistor => resistance(p[0]),
            Capacitor => cap(0),
            Inductor => inductance(p[0], omega),
            InfiniteWarburg => infinite_warburg(p[0], omega),
            FiniteWarburg => finite_warburg(p[0], p[1], omega),
            ConstantPhase => cpe(0, 1),
            SeriesRc => r_series_c(p[0], p[1], omega),
            SeriesRl => Complex64::new(p[0], p[1] * omega),
            SeriesLc => cap(0) + inductance(p[1], omega),
            ParallelRc => rc(0, 1),
            ParallelRl => parallel(resistance(p[0]), inductance(p[1], omega)),
            ParallelLc => parallel(cap(0), inductance(p[1], omega)),
            ParallelRcSeriesR => rc(0, 1) + p[2],
            ParallelRcSeriesRl => rc(0, 1) + p[2] + inductance(p[3], omega),
            ParallelRcSeriesRParallelL => parallel(rc(0, 1) + p[2], inductance(p[3], omega)),
            ParallelRcSeriesC => rc(0, 1) + cap(2),
            SeriesRcParallelC => parallel(r_series_c(p[0], p[1], omega), cap(2)),
            ParallelRcSeriesRc => rc(0, 1) + r_series_c(p[2], p[3], omega),
            TwoParallelRc => rc(0, 1) + rc(2, 3),
            TwoParallelRcSeriesR => rc(0, 1) + rc(2, 3) + p[4],
            NestedParallelRcSeriesR => parallel(rc(0, 1) + p[2], cap(3)) + p[4],
            ThreeParallelRc => rc(0, 1) + rc(2, 3) + rc(4, 5),
            ThreeParallelRcSeriesR => rc(0, 1) + rc(2, 3) + rc(4, 5) + p[6],
            RandlesInfiniteWarburg => {
                parallel(infinite_warburg(p[2], omega) + p[0], cap(1)) + p[3]
            }
            RandlesFiniteWarburg => {
                parallel(finite_warburg(p[2], p[3], omega) + p[0], cap(1)) + p[4]
            }
            RandlesConstantPhase => parallel(cpe(2, 3) + p[0], cap(1)) + p[4],
            TwoParallelRcSeriesWarburg => rc(0, 1) + rc(2, 3) + infinite_warburg(p[4], omega),
            TwoParallelRcWarburgParallelCSeriesR => {
                rc(0, 1) + rc(2, 3) + parallel(infinite_warburg(p[4], omega), cap(5)) + p[6]
            }
            ParallelRcParallelRq => rc(0, 1) + parallel(cpe(3, 4), resistance(p[2])),
            ParallelRcParallelRqSeriesR => {
                rc(0, 1) + parallel(cpe(3, 4), resistance(p[2])) + p[5]
            }
            ThreeParallelRq => rq(0) + rq(3) + rq(6),
            ThreeParallelRqSeriesR => rq(0) + rq(3) + rq(6) + p[9],
            ThreeParallelRqSeriesRParallelC | ThreeParallelRqSeriesRShuntC => {
                parallel(rq(0) + rq(3) + rq(6) + p[9], cap(10))
            }
            ThreeParallelCq => {
                parallel(cap(0), cpe(1, 2)) + parallel(cap(3), cpe(4, 5)) + parallel(cap(6), cpe(7, 8))
            }
            ThreeParallelCqSeriesR => {
                parallel(cap(0), cpe(1, 2))
                    + parallel(cap(3), cpe(4, 5))
                    + parallel(cap(6), cpe(7, 8))
                    + p[9]
            }
            ThreeRandlesCpe => randles(0) + randles(4) + randles(8),
            ThreeRandlesCpeSeriesR => randles(0) + randles(4) + randles(8) + p[12],
            TwoRandlesCpe => randles(0) + randles(4),
            TwoRandlesCpeSeriesR => randles(4) + p[8],
            ThreeParallelRqShuntCSeriesR => parallel(rq(0) + rq(3) + rq(6), cap(10)) + p[9],
            MixedParallelRqRcShuntCSeriesR => {
                let rc_mid = parallel(cap(4), resistance(p[3]));
                parallel(rq(0) + rc_mid + rq(5), cap(9)) + p[8]
            }
            MixedParallelRqRcSeriesR => {
                let rc_mid = parallel(cap(4), resistance(p[3]));
                rq(0) + rc_mid + rq(5) + p[8]
            }
            TwoParallelRqSeriesRShuntC => parallel(rq(0) + rq(3) + p[6], cap(7)),
        }
    }
}

impl std::fmt::Display for CircuitModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "model {}", self.number())
    }
}

/// Impedance of built-in model `model_number` at radial frequency `omega`
pub fn model_impedance(parameters: &[f64], omega: f64, model_number: usize) -> Result<Complex64> {
    CircuitModel::from_number(model_number)?.impedance(parameters, omega)
}

/// Ordered parameter symbols of built-in model `model_number`
pub fn model_components(model_number: usize) -> Result<&'static [&'static str]> {
    Ok(CircuitModel::from_number(model_number)?.symbols())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_numbering_round_trips() {
        for n in 1..=NUMBER_OF_MODELS {
            assert_eq!(CircuitModel::from_number(n).unwrap().number(), n);
        }
        assert!(matches!(
            CircuitModel::from_number(0),
            Err(ImpedanceError::UnknownModel(0))
        ));
        assert!(matches!(
            CircuitModel::from_number(45),
            Err(ImpedanceError::UnknownModel(45))
        ));
    }

    #[test]
    fn test_wrong_parameter_count_is_rejected() {
        let err = model_impedance(&[1.0, 2.0], 10.0, 13).unwrap_err();
        assert!(matches!(
            err,
            ImpedanceError::DimensionMismatch { expected: 3, found: 2, .. }
        ));
    }

    #[test]
    fn test_every_model_evaluates_finite_at_typical_values() {
        for model in CircuitModel::ALL {
            let p: Vec<f64> = model
                .symbols()
                .iter()
                .map(|s| match s.chars().next() {
                    Some('R') => 100.0,
                    Some('C') => 1e-6,
                    Some('L') => 1e-3,
                    _ if s.starts_with("Qa") => 0.8,
                    _ if s.starts_with("Fd") => 0.5,
                    _ => 50.0,
                })
                .collect();
            let z = model.impedance(&p, 2.0 * std::f64::consts::PI * 317.0).unwrap();
            assert!(z.re.is_finite() && z.im.is_finite(), "{} gave {}", model, z);
        }
    }

    #[test]
    fn test_model_28_keeps_w3_symbol() {
        assert_eq!(model_components(28).unwrap()[4], "W3");
    }

    #[test]
    fn test_model_33_and_43_coincide() {
        let p = [10.0, 5.0, 0.7, 20.0, 8.0, 0.6, 30.0, 9.0, 0.9, 4.0, 1e-5];
        let a = model_impedance(&p, 123.0, 33).unwrap();
        let b = model_impedance(&p, 123.0, 43).unwrap();
        assert_relative_eq!(a.re, b.re);
        assert_relative_eq!(a.im, b.im);
    }

    #[test]
    fn test_model_39_ignores_first_branch() {
        let mut p = [10.0, 5.0, 0.7, 1e-6, 20.0, 8.0, 0.6, 2e-6, 4.0];
        let a = model_impedance(&p, 50.0, 39).unwrap();
        p[0] = 1e4;
        p[3] = 1e-3;
        let b = model_impedance(&p, 50.0, 39).unwrap();
        assert_eq!(a, b);
    }
}
