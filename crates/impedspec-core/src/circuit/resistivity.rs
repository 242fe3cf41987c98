//! Resistance of metal wires, cables and plates
//!
//! Resistivities (ohm metre) and temperature coefficients (per degree Celsius)
//! are quoted at 20 C. Sources: S. A. Nasar, Electric Power Systems (1990);
//! Handbook of Chemistry and Physics, 37th edition (1955).

/// Metals and alloys with tabulated resistivity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metal {
    Aluminium,
    HardDrawnCopper,
    AnnealedCopper,
    Iron,
    ManganeseSteel,
    SiemensMartinSteel,
    BbSteel,
    EbbSteel,
    Brass,
    DrawnTungsten,
    Silver,
    Gold,
    Platinum,
    Nickel,
    Molybdenum,
    PhosphorBronze,
    Tin,
    Nichrome,
    Palladium,
    Tantalum,
    Therlo,
    MonelMetal,
    Manganan,
    Constantan,
    Antimony,
    Cobalt,
    Magnesium,
    Zinc,
    Mercury,
    Lead,
    GermanSilver,
}

impl Metal {
    /// (resistivity at 20 C, temperature coefficient)
    pub fn coefficients(&self) -> (f64, f64) {
        match self {
            Metal::Aluminium => (2.824e-8, 0.0039),
            Metal::HardDrawnCopper => (1.771e-8, 0.00382),
            Metal::AnnealedCopper => (1.7241e-8, 0.00393),
            Metal::Iron => (10.0e-8, 0.005),
            Metal::ManganeseSteel => (70.0e-8, 0.001),
            Metal::SiemensMartinSteel => (18.0e-8, 0.003),
            Metal::BbSteel => (11.9e-8, 0.004),
            Metal::EbbSteel => (10.4e-8, 0.005),
            Metal::Brass => (7.4e-8, 0.002),
            Metal::DrawnTungsten => (5.6e-8, 0.0045),
            Metal::Silver => (1.59e-8, 0.0038),
            Metal::Gold => (2.84e-8, 0.0034),
            Metal::Platinum => (10.0e-8, 0.003),
            Metal::Nickel => (7.8e-8, 0.006),
            Metal::Molybdenum => (5.7e-8, 0.004),
            Metal::PhosphorBronze => (11.0e-8, 0.0033),
            Metal::Tin => (11.5e-8, 0.0042),
            Metal::Nichrome => (100.0e-8, 0.0004),
            Metal::Palladium => (11.0e-8, 0.0033),
            Metal::Tantalum => (15.5e-8, 0.0031),
            Metal::Therlo => (47.0e-8, 0.00001),
            Metal::MonelMetal => (42.0e-8, 0.002),
            Metal::Manganan => (44.0e-8, 0.00001),
            Metal::Constantan => (49.0e-8, 0.00001),
            Metal::Antimony => (41.7e-8, 0.0036),
            Metal::Cobalt => (9.8e-8, 0.0033),
            Metal::Magnesium => (4.6e-8, 0.004),
            Metal::Zinc => (5.8e-8, 0.0037),
            Metal::Mercury => (95.738e-8, 0.00089),
            Metal::Lead => (22.0e-8, 0.0039),
            Metal::GermanSilver => (33.0e-8, 0.0004),
        }
    }

    /// Resistance of a conductor of this metal at `temp_celsius`
    pub fn resistance(&self, length: f64, area: f64, temp_celsius: f64) -> f64 {
        let (rho, alpha) = self.coefficients();
        resistivity_to_resistance_at(rho, alpha, length, area, temp_celsius)
    }
}

/// Resistance from resistivity `rho` (at 20 C) and temperature coefficient `alpha`
pub fn resistivity_to_resistance_at(rho: f64, alpha: f64, length: f64, area: f64, temp_celsius: f64) -> f64 {
    resistivity_to_resistance(rho, length, area) * (1.0 + alpha * (temp_celsius - 20.0))
}

/// Resistance from resistivity, no temperature correction
pub fn resistivity_to_resistance(rho: f64, length: f64, area: f64) -> f64 {
    rho * length / area
}

/// Resistivity from a measured resistance
pub fn resistance_to_resistivity(resistance: f64, length: f64, area: f64) -> f64 {
    resistance * area / length
}
