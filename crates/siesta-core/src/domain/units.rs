use serde::Serialize;
use std::fmt::{Display, Formatter};

pub const BOHR_IN_ANGSTROM: f64 = 0.529_177_210_903;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Unit {
    #[serde(rename = "angstrom")]
    Angstrom,
    #[serde(rename = "electron_volt")]
    ElectronVolt,
    #[serde(rename = "1 / electron_volt")]
    PerElectronVolt,
    #[serde(rename = "electron_volt / angstrom")]
    ElectronVoltPerAngstrom,
    #[serde(rename = "electron_volt / angstrom ** 3")]
    ElectronVoltPerAngstromCubed,
    #[serde(rename = "kilobar")]
    Kilobar,
    #[serde(rename = "debye")]
    Debye,
}

impl Unit {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Angstrom => "Ang",
            Self::ElectronVolt => "eV",
            Self::PerElectronVolt => "1/eV",
            Self::ElectronVoltPerAngstrom => "eV/Ang",
            Self::ElectronVoltPerAngstromCubed => "eV/Ang**3",
            Self::Kilobar => "kbar",
            Self::Debye => "Debye",
        }
    }
}

impl Display for Unit {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).symbol())
    }
}

/// A magnitude tagged with the unit it was extracted in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quantity<T> {
    pub value: T,
    pub unit: Unit,
}

impl<T> Quantity<T> {
    pub const fn new(value: T, unit: Unit) -> Self {
        Self { value, unit }
    }
}

#[cfg(test)]
mod tests {
    use super::Unit;

    #[test]
    fn unit_display_uses_siesta_symbols() {
        assert_eq!(Unit::ElectronVoltPerAngstrom.to_string(), "eV/Ang");
        assert_eq!(Unit::ElectronVoltPerAngstromCubed.to_string(), "eV/Ang**3");
    }
}
