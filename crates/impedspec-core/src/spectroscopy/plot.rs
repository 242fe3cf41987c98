//! Plot data for impedance spectra
//!
//! Rendering is left to the caller: the regression and the simulation build
//! [`PlotData`] (data points, a fitted or simulated line, titles and axis
//! legends) and hand it to a [`PlotSink`].

use num_complex::Complex64;

use crate::math::conversions::phase_deg;

/// The four chart types, voltage charts split into magnitude and phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    /// -Im[Z] against Re[Z]
    ColeCole,
    ImpedanceMagnitude,
    ImpedancePhase,
    VoltageMagnitude,
    VoltagePhase,
}

impl PlotKind {
    pub fn title(&self) -> &'static str {
        match self {
            PlotKind::ColeCole => "Cole - Cole plot",
            PlotKind::ImpedanceMagnitude => "Impedance magnitude versus frequency plot",
            PlotKind::ImpedancePhase => "Impedance phase versus frequency plot",
            PlotKind::VoltageMagnitude => "Voltage magnitude versus frequency plot",
            PlotKind::VoltagePhase => "Voltage phase versus frequency plot",
        }
    }

    fn x_legend(&self, log: bool) -> &'static str {
        match (self, log) {
            (PlotKind::ColeCole, _) => "Real[Impedance / ohms]",
            (_, true) => "Log10[Frequency / Hz]",
            (_, false) => "Frequency / Hz",
        }
    }

    fn y_legend(&self) -> &'static str {
        match self {
            PlotKind::ColeCole => "-Imag[Impedance / ohms]",
            PlotKind::ImpedanceMagnitude => "Impedance Magnitude",
            PlotKind::ImpedancePhase => "Impedance Phase / degrees",
            PlotKind::VoltageMagnitude => "Voltage Magnitude",
            PlotKind::VoltagePhase => "Voltage Phase / degrees",
        }
    }

    /// x/y data for `values` (impedances or voltages) at frequencies `f` in Hz
    ///
    /// Cole-Cole points run from the highest to the lowest frequency.
    pub fn series(&self, f: &[f64], values: &[Complex64], log: bool) -> PlotSeries {
        match self {
            PlotKind::ColeCole => PlotSeries {
                x: values.iter().rev().map(|z| z.re).collect(),
                y: values.iter().rev().map(|z| -z.im).collect(),
            },
            _ => {
                let x = if log {
                    f.iter().map(|v| v.log10()).collect()
                } else {
                    f.to_vec()
                };
                let y = match self {
                    PlotKind::ImpedancePhase | PlotKind::VoltagePhase => {
                        values.iter().map(|&z| phase_deg(z)).collect()
                    }
                    _ => values.iter().map(|z| z.norm()).collect(),
                };
                PlotSeries { x, y }
            }
        }
    }
}

/// One x/y data set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlotSeries {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl PlotSeries {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// A chart ready for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    pub kind: PlotKind,
    pub title: String,
    pub subtitle: String,
    pub x_legend: String,
    pub y_legend: String,
    /// Measured data, drawn as points
    pub points: Option<PlotSeries>,
    /// Fitted or simulated curve, drawn as a line
    pub line: Option<PlotSeries>,
}

impl PlotData {
    pub fn new(kind: PlotKind, program: &str, subtitle: &str, log: bool) -> Self {
        Self {
            kind,
            title: format!("{}:  {}", program, kind.title()),
            subtitle: subtitle.to_string(),
            x_legend: kind.x_legend(log).to_string(),
            y_legend: kind.y_legend().to_string(),
            points: None,
            line: None,
        }
    }

    pub fn with_points(mut self, points: PlotSeries) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_line(mut self, line: PlotSeries) -> Self {
        self.line = Some(line);
        self
    }
}

/// Receiver of finished charts
pub trait PlotSink {
    fn plot(&mut self, data: PlotData);
}

/// Collects charts in memory
impl PlotSink for Vec<PlotData> {
    fn plot(&mut self, data: PlotData) {
        self.push(data);
    }
}
